//! Context retrieval: embed the question, pull the nearest chunks from one
//! topic index and join them into the context block handed to the generator.

use crate::embeddings;
use crate::error::AssistantError;
use crate::models::ScoredChunk;
use crate::vectorstore::VectorIndex;
use providers::EmbeddingProvider;
use tracing::debug;

pub const DEFAULT_TOP_K: usize = 4;

pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Top-`k` chunks for `query`, most similar first. An index with no matches
/// yields an empty list.
pub async fn retrieve(
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    query: &str,
    k: usize,
) -> Result<Vec<ScoredChunk>, AssistantError> {
    let vector = embeddings::embed_query(embedder, query).await?;
    let hits = index.search(&vector, k).await?;
    debug!(index = index.name(), k, hits = hits.len(), "retrieved context");
    Ok(hits)
}

pub fn join_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentChunk;
    use crate::vectorstore::{MemoryIndex, VectorRecord};
    use providers::{EmbedResponse, ProviderError};

    /// Embeds everything to the same fixed vector.
    struct FixedEmbedder(Vec<f32>);

    #[async_trait::async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
            Ok(EmbedResponse {
                vectors: vec![self.0.clone(); texts.len()],
            })
        }
    }

    struct DownEmbedder;

    #[async_trait::async_trait]
    impl EmbeddingProvider for DownEmbedder {
        async fn embed(&self, _texts: &[String]) -> Result<EmbedResponse, ProviderError> {
            Err(ProviderError::RequestFailed("connection refused".into()))
        }
    }

    fn scored(text: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: DocumentChunk {
                text: text.to_string(),
                source_id: "s".to_string(),
            },
            score: 1.0,
        }
    }

    #[test]
    fn join_uses_blank_line() {
        let ctx = join_context(&[scored("un"), scored("deux"), scored("trois")]);
        assert_eq!(ctx, "un\n\ndeux\n\ntrois");
        assert_eq!(join_context(&[]), "");
    }

    #[tokio::test]
    async fn near_identical_embedding_is_top_result() {
        let index = MemoryIndex::new("site");
        index
            .upsert(vec![
                VectorRecord {
                    chunk: DocumentChunk {
                        text: "Frais de scolarité".into(),
                        source_id: "a".into(),
                    },
                    vector: vec![0.0, 1.0, 0.0],
                },
                VectorRecord {
                    chunk: DocumentChunk {
                        text: "Nos campus : Paris, Lyon, Nantes".into(),
                        source_id: "b".into(),
                    },
                    vector: vec![0.2, 0.1, 0.95],
                },
            ])
            .await
            .unwrap();

        let embedder = FixedEmbedder(vec![0.21, 0.1, 0.94]);
        let hits = retrieve(&embedder, &index, "campus ?", DEFAULT_TOP_K)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.text, "Nos campus : Paris, Lyon, Nantes");
    }

    #[tokio::test]
    async fn embedding_failure_propagates() {
        let index = MemoryIndex::new("site");
        let err = retrieve(&DownEmbedder, &index, "q", 4).await.unwrap_err();
        assert!(matches!(err, AssistantError::Embedding(_)));
    }
}
