//! Chunk rows for a locally persisted topic index.

use crate::{Result, StorageError};
use sqlx::{Row, SqlitePool};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredChunk {
    pub id: String,
    pub source_id: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Inserts or refreshes a chunk. An existing id keeps its insertion order.
pub async fn upsert_chunk(pool: &SqlitePool, chunk: &StoredChunk) -> Result<()> {
    let embedding = serde_json::to_string(&chunk.embedding).map_err(|e| StorageError::Corrupt {
        id: chunk.id.clone(),
        reason: e.to_string(),
    })?;
    sqlx::query(
        r#"
        INSERT INTO chunks (id, source_id, text, embedding)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(id) DO UPDATE SET
            source_id = excluded.source_id,
            text = excluded.text,
            embedding = excluded.embedding
        "#,
    )
    .bind(&chunk.id)
    .bind(&chunk.source_id)
    .bind(&chunk.text)
    .bind(embedding)
    .execute(pool)
    .await?;
    Ok(())
}

/// All chunks in insertion order.
pub async fn load_chunks(pool: &SqlitePool) -> Result<Vec<StoredChunk>> {
    let rows = sqlx::query("SELECT id, source_id, text, embedding FROM chunks ORDER BY seq")
        .fetch_all(pool)
        .await?;
    let mut chunks = Vec::with_capacity(rows.len());
    for row in rows {
        let id: String = row.try_get("id")?;
        let raw: String = row.try_get("embedding")?;
        let embedding: Vec<f32> =
            serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                id: id.clone(),
                reason: e.to_string(),
            })?;
        chunks.push(StoredChunk {
            id,
            source_id: row.try_get("source_id")?,
            text: row.try_get("text")?,
            embedding,
        });
    }
    Ok(chunks)
}

pub async fn count_chunks(pool: &SqlitePool) -> Result<u64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
        .fetch_one(pool)
        .await?;
    Ok(n.max(0) as u64)
}
