use crate::vectorstore::IndexError;
use providers::ProviderError;
use storage::StorageError;
use thiserror::Error;

/// Failures surfaced by the router. Only an unrecognised intent is handled
/// gracefully; everything here propagates to the caller.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("intent classification failed: {0}")]
    Classification(#[source] ProviderError),
    #[error("query embedding failed: {0}")]
    Embedding(#[source] ProviderError),
    #[error("context retrieval failed: {0}")]
    Retrieval(#[from] IndexError),
    #[error("answer generation failed: {0}")]
    Generation(#[source] ProviderError),
    #[error("action extraction failed: {0}")]
    Extraction(#[source] ProviderError),
    #[error("failed to record action: {0}")]
    Persistence(#[from] StorageError),
}
