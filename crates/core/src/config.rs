use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG: &str = "config/default";
pub const ENV_PREFIX: &str = "ASSISTANT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub embeddings: EmbeddingConfig,
    pub indexes: IndexesConfig,
    pub retrieval: RetrievalConfig,
    pub actions: ActionsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".into(),
            model: "gemini-2.0-flash".into(),
            timeout_secs: Some(60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "text-embedding-3-small".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Sqlite,
    Qdrant,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub backend: IndexBackend,
    /// SQLite file (or `sqlite:` URL) for the `sqlite` backend.
    pub path: String,
    /// Qdrant base URL for the `qdrant` backend.
    pub url: Option<String>,
    pub collection: Option<String>,
}

impl IndexConfig {
    pub fn sqlite(path: &str) -> Self {
        Self {
            backend: IndexBackend::Sqlite,
            path: path.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexesConfig {
    pub site: IndexConfig,
    pub regulation: IndexConfig,
}

impl Default for IndexesConfig {
    fn default() -> Self {
        Self {
            site: IndexConfig::sqlite("data/index/site.db"),
            regulation: IndexConfig::sqlite("data/index/reglement.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: crate::retriever::DEFAULT_TOP_K,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    pub log_path: String,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            log_path: "data/demandes.csv".into(),
        }
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    load_with_env(
        path,
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    )
}

/// Layers defaults, the file at `path` (or the optional default file) and
/// `env` overrides, in that order.
pub fn load_with_env(path: Option<&str>, env: config::Environment) -> anyhow::Result<AppConfig> {
    let defaults = IndexesConfig::default();
    let mut settings = config::Config::builder()
        .set_default("indexes.site.path", defaults.site.path)?
        .set_default("indexes.regulation.path", defaults.regulation.path)?;
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name(DEFAULT_CONFIG).required(false));
    }
    let cfg = settings.add_source(env).build()?;
    Ok(cfg.try_deserialize()?)
}
