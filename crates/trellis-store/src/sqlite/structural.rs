use std::collections::BTreeSet;

use super::SqliteStore;
use crate::error::{Result, StoreError};
use crate::types::{RecordKind, StructuralHit, StructuralInsert, StructuralRecord};

type StructuralRow = (String, String, String, String, String, String, String);
type StructuralHitRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
);

impl SqliteStore {
    /// Insert or replace a structural index entry by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn upsert_structural(&self, record: &StructuralInsert<'_>) -> Result<()> {
        let tags = serde_json::to_string(record.tags)?;
        sqlx::query(
            "INSERT OR REPLACE INTO structural_index \
             (id, collection_id, node_id, hierarchy_path, tags, content_hash) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(record.collection_id)
        .bind(record.node_id)
        .bind(record.hierarchy_path)
        .bind(tags)
        .bind(record.content_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Structural entries of a collection, ordered by hierarchy path.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or tags cannot be decoded.
    pub async fn structural(&self, collection_id: &str) -> Result<Vec<StructuralRecord>> {
        let rows: Vec<StructuralRow> = sqlx::query_as(
            "SELECT id, collection_id, node_id, hierarchy_path, tags, content_hash, created_at \
             FROM structural_index WHERE collection_id = ? ORDER BY hierarchy_path, id",
        )
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(structural_from_row).collect()
    }

    /// Entries whose hierarchy path, tags, or joined vector content contain
    /// `needle`, compared case-insensitively.
    ///
    /// Returns nothing for a blank needle.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn structural_matches(
        &self,
        collection_id: Option<&str>,
        kind: Option<RecordKind>,
        needle: &str,
    ) -> Result<Vec<StructuralHit>> {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        // SQLite's lower() folds ASCII only, so matching happens here.
        let rows: Vec<StructuralHitRow> = sqlx::query_as(
            "SELECT s.id, s.collection_id, s.node_id, s.hierarchy_path, s.tags, s.content_hash, \
                    s.created_at, v.kind, v.content, v.metadata \
             FROM structural_index s JOIN vectors v ON v.id = s.id \
             WHERE (?1 IS NULL OR s.collection_id = ?1) \
               AND (?2 IS NULL OR v.kind = ?2) \
             ORDER BY s.id",
        )
        .bind(collection_id)
        .bind(kind.map(RecordKind::as_str))
        .fetch_all(&self.pool)
        .await?;

        let mut hits = Vec::new();
        for (id, coll, node, path, tags, hash, created, kind, content, metadata) in rows {
            let record = structural_from_row((id, coll, node, path, tags, hash, created))?;
            if !contains_folded(&record, &content, &needle) {
                continue;
            }
            let kind = kind.parse::<RecordKind>().map_err(|reason| StoreError::Corrupt {
                id: record.id.clone(),
                reason,
            })?;
            hits.push(StructuralHit {
                record,
                kind,
                content,
                metadata: serde_json::from_str(&metadata)?,
            });
        }
        Ok(hits)
    }
}

/// `needle` must already be lowercased.
fn contains_folded(record: &StructuralRecord, content: &str, needle: &str) -> bool {
    record.hierarchy_path.to_lowercase().contains(needle)
        || record.tags.iter().any(|t| t.to_lowercase().contains(needle))
        || content.to_lowercase().contains(needle)
}

fn structural_from_row(row: StructuralRow) -> Result<StructuralRecord> {
    let (id, collection_id, node_id, hierarchy_path, tags, content_hash, created_at) = row;
    let tags: BTreeSet<String> = serde_json::from_str(&tags)?;
    Ok(StructuralRecord {
        id,
        collection_id,
        node_id,
        hierarchy_path,
        tags,
        content_hash,
        created_at,
    })
}
