//! Per-session conversation history, owned by the front-end.
//!
//! The router appends to it but never reads it; routing decisions depend on
//! the current message only.

use crate::models::{ConversationEntry, RouterReply};

#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    entries: Vec<ConversationEntry>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, question: &str, reply: &RouterReply) {
        self.entries.push(ConversationEntry {
            question: question.to_string(),
            answer: reply.answer.clone(),
            intent: reply.intent,
        });
    }

    /// Oldest first.
    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
