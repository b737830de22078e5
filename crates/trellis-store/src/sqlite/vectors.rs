use super::{SqliteStore, decode_embedding, encode_embedding, placeholders};
use crate::error::{Result, StoreError};
use crate::types::{RecordKind, VectorInsert, VectorRecord};

type VectorRow = (String, String, String, String, Vec<u8>, String, String);

const SELECT_VECTORS: &str =
    "SELECT id, collection_id, kind, content, embedding, metadata, created_at FROM vectors";

impl SqliteStore {
    /// Insert or replace a vector record by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DimensionMismatch`] if the embedding length differs
    /// from the store's dimensionality, or a database error.
    pub async fn upsert_vector(&self, record: &VectorInsert<'_>) -> Result<()> {
        if record.embedding.len() != self.dimensions {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimensions,
                actual: record.embedding.len(),
            });
        }
        let metadata = serde_json::to_string(record.metadata)?;

        sqlx::query(
            "INSERT OR REPLACE INTO vectors (id, collection_id, kind, content, embedding, metadata) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(record.collection_id)
        .bind(record.kind.as_str())
        .bind(record.content)
        .bind(encode_embedding(record.embedding))
        .bind(metadata)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// All vector records matching the optional filters, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn vectors(
        &self,
        collection_id: Option<&str>,
        kind: Option<RecordKind>,
    ) -> Result<Vec<VectorRecord>> {
        let rows: Vec<VectorRow> = sqlx::query_as(&format!(
            "{SELECT_VECTORS} WHERE (?1 IS NULL OR collection_id = ?1) \
             AND (?2 IS NULL OR kind = ?2) ORDER BY id"
        ))
        .bind(collection_id)
        .bind(kind.map(RecordKind::as_str))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(vector_from_row).collect()
    }

    /// Vector records with the given ids. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn vectors_by_ids(&self, ids: &[String]) -> Result<Vec<VectorRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "{SELECT_VECTORS} WHERE id IN ({}) ORDER BY id",
            placeholders(ids.len())
        );
        let mut query = sqlx::query_as::<_, VectorRow>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.into_iter().map(vector_from_row).collect()
    }

    /// Ids of vector records in a collection, ordered.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn vector_ids(&self, collection_id: &str) -> Result<Vec<String>> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT id FROM vectors WHERE collection_id = ? ORDER BY id")
                .bind(collection_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }
}

fn vector_from_row(row: VectorRow) -> Result<VectorRecord> {
    let (id, collection_id, kind, content, blob, metadata, created_at) = row;
    let kind = kind
        .parse::<RecordKind>()
        .map_err(|reason| StoreError::Corrupt {
            id: id.clone(),
            reason,
        })?;
    let embedding = decode_embedding(&id, &blob)?;
    let metadata = serde_json::from_str(&metadata)?;
    Ok(VectorRecord {
        id,
        collection_id,
        kind,
        content,
        embedding,
        metadata,
        created_at,
    })
}
