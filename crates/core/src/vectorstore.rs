//! Nearest-neighbour lookup over embedded document chunks.
//!
//! Each topic (site content, regulations) lives in its own index. Backends:
//! an in-memory index, a SQLite file, or a Qdrant collection. Results are
//! ordered by descending cosine similarity; equal scores keep insertion order
//! for the local backends.

use crate::models::{DocumentChunk, ScoredChunk};
use providers::qdrant::{QdrantClient, QdrantPoint, SearchResult};
use providers::ProviderError;
use sqlx::SqlitePool;
use std::collections::HashMap;
use storage::chunks::{self, StoredChunk};
use storage::StorageError;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("vector backend request failed: {0}")]
    Backend(#[from] ProviderError),
    #[error("index storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("embedding dimension mismatch in '{index}': query has {query}, chunk has {stored}")]
    DimensionMismatch {
        index: String,
        query: usize,
        stored: usize,
    },
    #[error("search hit without chunk text: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub chunk: DocumentChunk,
    pub vector: Vec<f32>,
}

#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    fn name(&self) -> &str;
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), IndexError>;
    /// Returns at most `k` chunks, most similar first.
    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>, IndexError>;
}

/// Content-addressed chunk id, stable across re-indexing.
pub fn chunk_id(chunk: &DocumentChunk) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(chunk.source_id.as_bytes());
    hasher.update(&[0]);
    hasher.update(chunk.text.as_bytes());
    hasher.finalize().to_hex().to_string()
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a < 1e-8 || norm_b < 1e-8 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Exhaustive top-k scan. `sort_by` is stable, so ties keep input order.
fn rank(
    index: &str,
    entries: impl IntoIterator<Item = (DocumentChunk, Vec<f32>)>,
    query: &[f32],
    k: usize,
) -> Result<Vec<ScoredChunk>, IndexError> {
    if k == 0 {
        return Ok(Vec::new());
    }
    let mut scored = Vec::new();
    for (chunk, vector) in entries {
        if vector.len() != query.len() {
            return Err(IndexError::DimensionMismatch {
                index: index.to_string(),
                query: query.len(),
                stored: vector.len(),
            });
        }
        let score = cosine_similarity(query, &vector);
        scored.push(ScoredChunk { chunk, score });
    }
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(k);
    Ok(scored)
}

/// In-process index, used for tests and small corpora.
pub struct MemoryIndex {
    name: String,
    entries: RwLock<Vec<(String, VectorRecord)>>,
}

impl MemoryIndex {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl VectorIndex for MemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), IndexError> {
        let mut entries = self.entries.write().await;
        for record in records {
            let id = chunk_id(&record.chunk);
            match entries.iter_mut().find(|(existing, _)| *existing == id) {
                Some(slot) => slot.1 = record,
                None => entries.push((id, record)),
            }
        }
        Ok(())
    }

    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>, IndexError> {
        let entries = self.entries.read().await;
        rank(
            &self.name,
            entries
                .iter()
                .map(|(_, r)| (r.chunk.clone(), r.vector.clone())),
            vector,
            k,
        )
    }
}

/// Index persisted in its own SQLite file (one file per topic).
pub struct SqliteIndex {
    name: String,
    pool: SqlitePool,
}

impl SqliteIndex {
    /// Opens (creating if needed) and migrates the database at `path`.
    pub async fn open(name: &str, path: &str) -> Result<Self, IndexError> {
        let pool = storage::connect(path).await?;
        storage::migrate(&pool).await?;
        Ok(Self {
            name: name.to_string(),
            pool,
        })
    }

    pub async fn count(&self) -> Result<u64, IndexError> {
        Ok(chunks::count_chunks(&self.pool).await?)
    }
}

#[async_trait::async_trait]
impl VectorIndex for SqliteIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), IndexError> {
        for record in records {
            let stored = StoredChunk {
                id: chunk_id(&record.chunk),
                source_id: record.chunk.source_id,
                text: record.chunk.text,
                embedding: record.vector,
            };
            chunks::upsert_chunk(&self.pool, &stored).await?;
        }
        Ok(())
    }

    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>, IndexError> {
        let stored = chunks::load_chunks(&self.pool).await?;
        rank(
            &self.name,
            stored.into_iter().map(|c| {
                (
                    DocumentChunk {
                        text: c.text,
                        source_id: c.source_id,
                    },
                    c.embedding,
                )
            }),
            vector,
            k,
        )
    }
}

pub struct QdrantIndex {
    name: String,
    client: QdrantClient,
}

impl QdrantIndex {
    pub fn new(name: &str, client: QdrantClient) -> Self {
        Self {
            name: name.to_string(),
            client,
        }
    }
}

/// Qdrant only accepts UUIDs or integers as point ids.
fn point_uuid(id_hex: &str) -> String {
    let h = &id_hex[..32.min(id_hex.len())];
    if h.len() < 32 {
        return h.to_string();
    }
    format!(
        "{}-{}-{}-{}-{}",
        &h[0..8],
        &h[8..12],
        &h[12..16],
        &h[16..20],
        &h[20..32]
    )
}

fn hit_to_chunk(hit: SearchResult) -> Result<ScoredChunk, IndexError> {
    let payload = hit.payload.unwrap_or_default();
    let text = payload
        .get("text")
        .or_else(|| payload.get("page_content"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| IndexError::InvalidPayload(hit.id.to_string()))?;
    let source_id = payload
        .get("source_id")
        .and_then(|s| s.as_str())
        .unwrap_or_default();
    Ok(ScoredChunk {
        chunk: DocumentChunk {
            text: text.to_string(),
            source_id: source_id.to_string(),
        },
        score: hit.score,
    })
}

#[async_trait::async_trait]
impl VectorIndex for QdrantIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), IndexError> {
        let points: Vec<QdrantPoint> = records
            .into_iter()
            .map(|r| {
                let id = point_uuid(&chunk_id(&r.chunk));
                let mut payload = HashMap::new();
                payload.insert("text".to_string(), serde_json::json!(r.chunk.text));
                payload.insert("source_id".to_string(), serde_json::json!(r.chunk.source_id));
                QdrantPoint {
                    id,
                    vector: r.vector,
                    payload,
                }
            })
            .collect();
        if points.is_empty() {
            return Ok(());
        }
        self.client.upsert(points).await?;
        Ok(())
    }

    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>, IndexError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        debug!(collection = self.client.collection(), k, "qdrant search");
        let resp = self.client.search(vector.to_vec(), k as u64).await?;
        resp.result.into_iter().map(hit_to_chunk).collect()
    }
}
