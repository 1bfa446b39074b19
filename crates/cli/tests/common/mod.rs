#![allow(dead_code)]

use assistant_core::action::CsvActionLog;
use assistant_core::models::DocumentChunk;
use assistant_core::router::Router;
use assistant_core::vectorstore::{MemoryIndex, VectorIndex, VectorRecord};
use providers::{EmbedResponse, EmbeddingProvider, LlmProvider, ProviderError};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const SITE_CHUNKS: [&str; 3] = [
    "L'école dispose de trois campus : Paris, Lyon et Bordeaux.",
    "Les inscriptions en informatique ouvrent en mars.",
    "La bibliothèque est ouverte du lundi au samedi.",
];

pub const REGULATION_CHUNKS: [&str; 2] = [
    "Tout retard de plus de quinze minutes doit être justifié.",
    "Les absences répétées entraînent un avertissement.",
];

const KEYWORDS: [&str; 5] = ["campus", "inscri", "retard", "absence", "biblioth"];

/// Plays back canned model replies and keeps the prompts it received.
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::RequestFailed("no scripted reply left".into()))
    }
}

/// One dimension per keyword so retrieval is predictable.
pub struct KeywordEmbedder;

impl KeywordEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        KEYWORDS
            .iter()
            .map(|k| if lower.contains(k) { 1.0 } else { 0.0 })
            .collect()
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        Ok(EmbedResponse {
            vectors: texts.iter().map(|t| Self::vector(t)).collect(),
        })
    }
}

pub async fn seeded(name: &str, texts: &[&str]) -> Arc<MemoryIndex> {
    let index = MemoryIndex::new(name);
    let records = texts
        .iter()
        .map(|t| VectorRecord {
            chunk: DocumentChunk {
                text: t.to_string(),
                source_id: name.to_string(),
            },
            vector: KeywordEmbedder::vector(t),
        })
        .collect();
    index.upsert(records).await.unwrap();
    Arc::new(index)
}

pub fn log_path(dir: &Path) -> PathBuf {
    dir.join("data").join("demandes.csv")
}

/// Router over seeded in-memory indices with the CSV log under `dir`.
pub async fn router(llm: Arc<ScriptedLlm>, dir: &Path) -> Router {
    Router::new(
        llm,
        Arc::new(KeywordEmbedder),
        seeded("site", &SITE_CHUNKS).await,
        seeded("regulation", &REGULATION_CHUNKS).await,
        Arc::new(CsvActionLog::new(log_path(dir))),
    )
}
