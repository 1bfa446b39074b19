//! Wiring: turns an `AppConfig` plus environment secrets into a ready router.

use crate::action::CsvActionLog;
use crate::config::{AppConfig, IndexBackend, IndexConfig};
use crate::models::Domain;
use crate::router::Router;
use crate::vectorstore::{MemoryIndex, QdrantIndex, SqliteIndex, VectorIndex};
use anyhow::Context;
use providers::gemini::{self, GeminiConfig, GeminiProvider};
use providers::noop::NoopProvider;
use providers::openai::{OpenAiConfig, OpenAiProvider};
use providers::qdrant::{QdrantClient, QdrantConfig};
use providers::ProviderRegistry;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const OPENAI_CHAT_MODEL: &str = "gpt-4o-mini";
const QDRANT_URL: &str = "http://localhost:6333";

/// Credentials and endpoints that never live in config files.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub qdrant_api_key: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            gemini_api_key: var("GEMINI_API_KEY"),
            openai_api_key: var("OPENAI_API_KEY"),
            openai_base_url: var("OPENAI_BASE_URL"),
            qdrant_api_key: var("QDRANT_API_KEY"),
        }
    }
}

/// Registers every provider the secrets allow and marks the configured ones
/// as preferred. Selection errors are reported by the caller.
pub fn build_registry(config: &AppConfig, secrets: &Secrets) -> anyhow::Result<ProviderRegistry> {
    let noop = Arc::new(NoopProvider);
    let mut registry = ProviderRegistry::new()
        .with_llm("noop", noop.clone())
        .with_embedding("noop", noop);
    let timeout = config.llm.timeout_secs.map(Duration::from_secs);

    if let Some(key) = &secrets.gemini_api_key {
        let provider = GeminiProvider::new(GeminiConfig {
            api_key: key.clone(),
            base_url: gemini::DEFAULT_BASE_URL.to_string(),
            model: config.llm.model.clone(),
            timeout,
        })
        .context("gemini client")?;
        registry = registry.with_llm("gemini", Arc::new(provider));
    }

    if let Some(key) = &secrets.openai_api_key {
        let chat_model = if config.llm.provider == "openai" {
            config.llm.model.clone()
        } else {
            OPENAI_CHAT_MODEL.to_string()
        };
        let provider = Arc::new(
            OpenAiProvider::new(OpenAiConfig {
                api_key: key.clone(),
                base_url: secrets
                    .openai_base_url
                    .clone()
                    .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
                embedding_model: config.embeddings.model.clone(),
                chat_model,
                timeout,
            })
            .context("openai client")?,
        );
        registry = registry
            .with_llm("openai", provider.clone())
            .with_embedding("openai", provider);
    }

    if config.embeddings.provider == "local" {
        registry = with_local_embeddings(registry)?;
    }

    Ok(registry
        .set_preferred_llm(&config.llm.provider)
        .set_preferred_embedding(&config.embeddings.provider))
}

#[cfg(feature = "local-embeddings")]
fn with_local_embeddings(registry: ProviderRegistry) -> anyhow::Result<ProviderRegistry> {
    let provider = providers::local::LocalEmbeddingProvider::mini_lm()
        .context("load local embedding model")?;
    Ok(registry.with_embedding("local", Arc::new(provider)))
}

#[cfg(not(feature = "local-embeddings"))]
fn with_local_embeddings(registry: ProviderRegistry) -> anyhow::Result<ProviderRegistry> {
    warn!("local embeddings requested but the local-embeddings feature is off");
    Ok(registry)
}

pub async fn build_index(
    domain: Domain,
    config: &IndexConfig,
    secrets: &Secrets,
) -> anyhow::Result<Arc<dyn VectorIndex>> {
    let name = domain.as_str();
    let index: Arc<dyn VectorIndex> = match config.backend {
        IndexBackend::Sqlite => Arc::new(
            SqliteIndex::open(name, &config.path)
                .await
                .with_context(|| format!("open {name} index at {}", config.path))?,
        ),
        IndexBackend::Qdrant => {
            let client = QdrantClient::new(QdrantConfig {
                url: config.url.clone().unwrap_or_else(|| QDRANT_URL.to_string()),
                collection: config.collection.clone().unwrap_or_else(|| name.to_string()),
                api_key: secrets.qdrant_api_key.clone(),
            });
            Arc::new(QdrantIndex::new(name, client))
        }
        IndexBackend::Memory => {
            warn!(index = name, "using an empty in-memory index");
            Arc::new(MemoryIndex::new(name))
        }
    };
    info!(index = name, backend = ?config.backend, "index ready");
    Ok(index)
}

pub async fn build_router(config: &AppConfig, secrets: &Secrets) -> anyhow::Result<Router> {
    let registry = build_registry(config, secrets)?;
    let llm = registry
        .llm(None)
        .with_context(|| missing_provider_hint("llm", &config.llm.provider))?;
    let embedder = registry
        .embedding(None)
        .with_context(|| missing_provider_hint("embedding", &config.embeddings.provider))?;
    let site = build_index(Domain::Site, &config.indexes.site, secrets).await?;
    let regulation = build_index(Domain::Regulation, &config.indexes.regulation, secrets).await?;
    let recorder = Arc::new(CsvActionLog::new(&config.actions.log_path));

    Ok(Router::new(llm, embedder, site, regulation, recorder).with_top_k(config.retrieval.top_k))
}

fn missing_provider_hint(kind: &str, name: &str) -> String {
    let hint = match name {
        "gemini" => " (set GEMINI_API_KEY)",
        "openai" => " (set OPENAI_API_KEY)",
        "local" => " (build with the local-embeddings feature)",
        _ => "",
    };
    format!("{kind} provider `{name}` is not available{hint}")
}
