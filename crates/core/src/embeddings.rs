use crate::error::AssistantError;
use providers::EmbeddingProvider;

#[derive(Debug, Clone)]
pub struct EmbeddingRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingResult {
    pub vectors: Vec<Vec<f32>>,
}

pub async fn embed(
    req: EmbeddingRequest,
    provider: &dyn EmbeddingProvider,
) -> Result<EmbeddingResult, AssistantError> {
    let resp = provider
        .embed(&req.texts)
        .await
        .map_err(AssistantError::Embedding)?;
    Ok(EmbeddingResult {
        vectors: resp.vectors,
    })
}

/// Embeds a single query string.
pub async fn embed_query(
    provider: &dyn EmbeddingProvider,
    query: &str,
) -> Result<Vec<f32>, AssistantError> {
    let result = embed(
        EmbeddingRequest {
            texts: vec![query.to_string()],
        },
        provider,
    )
    .await?;
    result.vectors.into_iter().next().ok_or_else(|| {
        AssistantError::Embedding(providers::ProviderError::InvalidResponse(
            "no vector returned for query".into(),
        ))
    })
}
