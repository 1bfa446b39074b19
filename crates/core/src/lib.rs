//! Core library: intent classification, retrieval, answer generation and
//! action recording behind a single router.

pub mod action;
pub mod classifier;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod generator;
pub mod history;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod retriever;
pub mod router;
pub mod vectorstore;

#[cfg(test)]
mod fakes;

pub use error::AssistantError;
pub use models::{Domain, Intent, RouterReply};
pub use router::Router;
