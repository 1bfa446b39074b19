use assistant_core::history::ConversationHistory;
use assistant_core::models::{Intent, RouterReply, ScoredChunk};

pub fn badge(intent: Intent) -> &'static str {
    match intent {
        Intent::Web => "🌐",
        Intent::Doc => "📄",
        Intent::Action => "📝",
        Intent::None => "❓",
    }
}

pub fn reply(reply: &RouterReply) -> String {
    format!("{} [{}] {}", badge(reply.intent), reply.intent, reply.answer)
}

pub fn reply_json(reply: &RouterReply) -> serde_json::Value {
    let mut value = serde_json::json!({
        "intent": reply.intent,
        "answer": reply.answer,
    });
    if let Some(summary) = &reply.summary {
        value["summary"] = serde_json::json!(summary);
    }
    value
}

/// One block per exchange, oldest first.
pub fn history(history: &ConversationHistory) -> String {
    if history.is_empty() {
        return "(aucun échange)".to_string();
    }
    history
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| format!("{}. {} {}\n   {}", i + 1, badge(e.intent), e.question, e.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn hits(hits: &[ScoredChunk]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, h)| {
            format!(
                "{}. [{:.3}] ({}) {}",
                i + 1,
                h.score,
                h.chunk.source_id,
                h.chunk.text.replace('\n', " ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
