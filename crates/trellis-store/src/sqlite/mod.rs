mod graph;
mod structural;
mod vectors;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::{Result, StoreError};
use crate::types::StoreCounts;

/// Handle to one record database. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    dimensions: usize,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run migrations.
    ///
    /// `":memory:"` opens a private in-memory database, isolated from every
    /// other store in the process.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub async fn new(path: &str, dimensions: usize) -> Result<Self> {
        let url = if path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{path}?mode=rwc")
        };

        let opts = SqliteConnectOptions::from_str(&url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        sqlx::migrate!().run(&pool).await?;
        tracing::debug!(path, dimensions, "record store opened");

        Ok(Self { pool, dimensions })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Embedding length every vector record must have.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Row counts, optionally scoped to one collection.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn counts(&self, collection_id: Option<&str>) -> Result<StoreCounts> {
        Ok(StoreCounts {
            vectors: self.count_rows("vectors", collection_id).await?,
            structural: self.count_rows("structural_index", collection_id).await?,
            edges: self.count_rows("knowledge_graph", collection_id).await?,
        })
    }

    async fn count_rows(&self, table: &'static str, collection_id: Option<&str>) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE (?1 IS NULL OR collection_id = ?1)");
        let n: i64 = sqlx::query_scalar(&sql)
            .bind(collection_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    /// Delete every record of `collection_id` across all three families.
    /// Returns how many rows were removed from each.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails; nothing is deleted then.
    pub async fn clear_collection(&self, collection_id: &str) -> Result<StoreCounts> {
        let mut tx = self.pool.begin().await?;

        let vectors = sqlx::query("DELETE FROM vectors WHERE collection_id = ?")
            .bind(collection_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let structural = sqlx::query("DELETE FROM structural_index WHERE collection_id = ?")
            .bind(collection_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let edges = sqlx::query("DELETE FROM knowledge_graph WHERE collection_id = ?")
            .bind(collection_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        tracing::info!(collection = collection_id, vectors, structural, edges, "collection cleared");

        Ok(StoreCounts {
            vectors,
            structural,
            edges,
        })
    }
}

pub(crate) fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub(crate) fn decode_embedding(id: &str, blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(StoreError::Corrupt {
            id: id.to_string(),
            reason: format!("embedding blob of {} bytes", blob.len()),
        });
    }
    Ok(blob
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// `?, ?, ?` with `n` placeholders.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeSet;

    use super::SqliteStore;
    use crate::types::{RecordKind, RecordMetadata, StructuralInsert, VectorInsert};

    pub async fn store() -> SqliteStore {
        SqliteStore::new(":memory:", 3).await.unwrap()
    }

    pub async fn put(store: &SqliteStore, id: &str, collection: &str, content: &str, path: &str) {
        let tags: BTreeSet<String> = ["lang:typescript".to_string()].into();
        let metadata = RecordMetadata {
            source: "hierarchy".into(),
            hierarchy_path: Some(path.to_string()),
            tags: tags.clone(),
            ..RecordMetadata::default()
        };
        store
            .upsert_vector(&VectorInsert {
                id,
                collection_id: collection,
                kind: RecordKind::Codebase,
                content,
                embedding: &[1.0, 0.0, 0.0],
                metadata: &metadata,
            })
            .await
            .unwrap();
        store
            .upsert_structural(&StructuralInsert {
                id,
                collection_id: collection,
                node_id: id,
                hierarchy_path: path,
                tags: &tags,
                content_hash: "h",
            })
            .await
            .unwrap();
    }
}
