use std::collections::HashSet;

use sqlx::{Sqlite, Transaction};

use super::{SqliteStore, placeholders};
use crate::error::Result;
use crate::types::{EdgeInsert, GraphEdge};

type EdgeRow = (String, String, String, String, String, f64, String);

/// Ids per `edges_from` query. Each id binds twice, keeping every statement
/// far below SQLite's host parameter limit.
const IDS_PER_QUERY: usize = 400;

const SELECT_EDGES: &str = "SELECT id, collection_id, source_id, target_id, relation_type, weight, created_at \
                            FROM knowledge_graph";

impl SqliteStore {
    /// Insert or replace a graph edge by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn upsert_edge(&self, edge: &EdgeInsert<'_>) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO knowledge_graph \
             (id, collection_id, source_id, target_id, relation_type, weight) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(edge.id)
        .bind(edge.collection_id)
        .bind(edge.source_id)
        .bind(edge.target_id)
        .bind(edge.relation_type)
        .bind(f64::from(edge.weight))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Write a batch of edges in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; the batch is rolled back.
    pub async fn upsert_edges(&self, edges: &[EdgeInsert<'_>]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        insert_edges(&mut tx, edges).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Swap a collection's edges for `edges` atomically. Returns how many old
    /// edges were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete or any insert fails; the previous edges
    /// are kept then.
    pub async fn replace_edges(&self, collection_id: &str, edges: &[EdgeInsert<'_>]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM knowledge_graph WHERE collection_id = ?")
            .bind(collection_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        insert_edges(&mut tx, edges).await?;
        tx.commit().await?;
        Ok(removed)
    }

    /// Edges of one collection, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn edges(&self, collection_id: &str) -> Result<Vec<GraphEdge>> {
        let rows: Vec<EdgeRow> =
            sqlx::query_as(&format!("{SELECT_EDGES} WHERE collection_id = ? ORDER BY id"))
                .bind(collection_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(edge_from_row).collect())
    }

    /// Edges touching any of `ids` at either endpoint, strongest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn edges_from(
        &self,
        ids: &[String],
        relation_type: Option<&str>,
    ) -> Result<Vec<GraphEdge>> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for chunk in ids.chunks(IDS_PER_QUERY) {
            let list = placeholders(chunk.len());
            let sql = format!(
                "{SELECT_EDGES} WHERE (source_id IN ({list}) OR target_id IN ({list})) \
                 AND (? IS NULL OR relation_type = ?)"
            );
            let mut query = sqlx::query_as::<_, EdgeRow>(&sql);
            for id in chunk.iter().chain(chunk) {
                query = query.bind(id);
            }
            let rows = query
                .bind(relation_type)
                .bind(relation_type)
                .fetch_all(&self.pool)
                .await?;
            // An edge can join ids from two chunks.
            edges.extend(
                rows.into_iter()
                    .map(edge_from_row)
                    .filter(|e| seen.insert(e.id.clone())),
            );
        }
        edges.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.id.cmp(&b.id)));
        Ok(edges)
    }
}

async fn insert_edges(tx: &mut Transaction<'_, Sqlite>, edges: &[EdgeInsert<'_>]) -> Result<()> {
    for edge in edges {
        sqlx::query(
            "INSERT OR REPLACE INTO knowledge_graph \
             (id, collection_id, source_id, target_id, relation_type, weight) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(edge.id)
        .bind(edge.collection_id)
        .bind(edge.source_id)
        .bind(edge.target_id)
        .bind(edge.relation_type)
        .bind(f64::from(edge.weight))
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn edge_from_row(row: EdgeRow) -> GraphEdge {
    let (id, collection_id, source_id, target_id, relation_type, weight, created_at) = row;
    GraphEdge {
        id,
        collection_id,
        source_id,
        target_id,
        relation_type,
        weight: weight as f32,
        created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::store;
    use super::*;

    fn edge<'a>(id: &'a str, source: &'a str, target: &'a str, weight: f32) -> EdgeInsert<'a> {
        EdgeInsert {
            id,
            collection_id: "c",
            source_id: source,
            target_id: target,
            relation_type: "similar",
            weight,
        }
    }

    #[tokio::test]
    async fn edges_roundtrip_weight() {
        let s = store().await;
        s.upsert_edge(&edge("e1", "a", "b", 0.75)).await.unwrap();
        let edges = s.edges("c").await.unwrap();
        assert_eq!(edges.len(), 1);
        assert!((edges[0].weight - 0.75).abs() < f32::EPSILON);
        assert_eq!(edges[0].relation_type, "similar");
    }

    #[tokio::test]
    async fn edges_from_either_endpoint_strongest_first() {
        let s = store().await;
        s.upsert_edges(&[
            edge("e1", "a", "b", 0.8),
            edge("e2", "c", "a", 0.95),
            edge("e3", "c", "d", 0.9),
        ])
        .await
        .unwrap();

        let touching_a = s.edges_from(&["a".into()], None).await.unwrap();
        let ids: Vec<_> = touching_a.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e2", "e1"]);

        assert!(
            s.edges_from(&["a".into()], Some("cites"))
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            s.edges_from(&["a".into(), "d".into()], Some("similar"))
                .await
                .unwrap()
                .len(),
            3
        );
    }

    #[tokio::test]
    async fn edges_from_large_id_list() {
        let s = store().await;
        let ids: Vec<String> = (0..2_500).map(|i| format!("n{i:04}")).collect();
        let mut inserts = Vec::new();
        let edge_ids: Vec<String> = (0..ids.len() - 1).map(|i| format!("e{i:04}")).collect();
        for (i, id) in edge_ids.iter().enumerate() {
            inserts.push(edge(id, &ids[i], &ids[i + 1], 0.8));
        }
        s.upsert_edges(&inserts).await.unwrap();

        let all = s.edges_from(&ids, Some("similar")).await.unwrap();
        assert_eq!(all.len(), edge_ids.len());
        let mut unique: Vec<_> = all.iter().map(|e| e.id.as_str()).collect();
        unique.dedup();
        assert_eq!(unique.len(), all.len());
    }

    #[tokio::test]
    async fn failed_replace_keeps_previous_edges() {
        let s = store().await;
        s.upsert_edge(&edge("old", "a", "b", 0.8)).await.unwrap();
        sqlx::query(
            "CREATE TRIGGER reject_bad BEFORE INSERT ON knowledge_graph \
             WHEN NEW.id = 'bad' BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(s.pool())
        .await
        .unwrap();

        let result = s
            .replace_edges("c", &[edge("new", "a", "c", 0.9), edge("bad", "b", "c", 0.9)])
            .await;
        assert!(result.is_err());
        let ids: Vec<_> = s.edges("c").await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["old".to_string()]);

        let removed = s.replace_edges("c", &[edge("new", "a", "c", 0.9)]).await.unwrap();
        assert_eq!(removed, 1);
        let ids: Vec<_> = s.edges("c").await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["new".to_string()]);
    }

    #[tokio::test]
    async fn replace_edges_scoped_to_collection() {
        let s = store().await;
        s.upsert_edge(&edge("e1", "a", "b", 0.8)).await.unwrap();
        s.upsert_edge(&EdgeInsert {
            collection_id: "other",
            ..edge("e2", "x", "y", 0.8)
        })
        .await
        .unwrap();

        assert_eq!(s.replace_edges("c", &[]).await.unwrap(), 1);
        assert!(s.edges("c").await.unwrap().is_empty());
        assert_eq!(s.edges("other").await.unwrap().len(), 1);
    }
}
