//! Local sentence-transformers embeddings via fastembed (ONNX runtime).

use crate::{EmbedResponse, EmbeddingProvider, ProviderError};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub struct LocalEmbeddingProvider {
    model: Arc<Mutex<TextEmbedding>>,
}

impl LocalEmbeddingProvider {
    /// Loads `all-MiniLM-L6-v2`, downloading it into the fastembed cache on first use.
    pub fn mini_lm() -> Result<Self, ProviderError> {
        info!("loading local embedding model all-MiniLM-L6-v2");
        let model = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::AllMiniLML6V2))
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        let vectors = tokio::task::spawn_blocking(move || {
            let mut guard = model
                .lock()
                .map_err(|_| ProviderError::RequestFailed("embedding model poisoned".into()))?;
            guard
                .embed(texts, None)
                .map_err(|e| ProviderError::RequestFailed(e.to_string()))
        })
        .await
        .map_err(|e| ProviderError::RequestFailed(e.to_string()))??;
        Ok(EmbedResponse { vectors })
    }
}
