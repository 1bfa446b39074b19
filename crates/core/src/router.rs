//! Request routing.
//!
//! Each call runs `Start -> Classified -> {Answering, Recording, Rejected} ->
//! Done` from scratch: classify, then either answer from one topic index,
//! record an administrative request, or reply with the fixed apology. Nothing
//! survives between calls except the action log and the caller's history.

use crate::action::{self, ActionRecorder};
use crate::classifier;
use crate::error::AssistantError;
use crate::generator;
use crate::history::ConversationHistory;
use crate::models::{Domain, Intent, RouterReply, ScoredChunk};
use crate::prompts::REJECTION_MESSAGE;
use crate::retriever::{self, DEFAULT_TOP_K};
use crate::vectorstore::VectorIndex;
use providers::{EmbeddingProvider, LlmProvider};
use std::sync::Arc;
use tracing::{debug, info, instrument, Span};

/// Handler chosen once the intent is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Answering(Domain),
    Recording,
    Rejected,
}

impl Route {
    pub fn for_intent(intent: Intent) -> Route {
        match intent {
            Intent::Web => Route::Answering(Domain::Site),
            Intent::Doc => Route::Answering(Domain::Regulation),
            Intent::Action => Route::Recording,
            Intent::None => Route::Rejected,
        }
    }
}

pub struct Router {
    llm: Arc<dyn LlmProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    site_index: Arc<dyn VectorIndex>,
    regulation_index: Arc<dyn VectorIndex>,
    recorder: Arc<dyn ActionRecorder>,
    top_k: usize,
}

impl Router {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        site_index: Arc<dyn VectorIndex>,
        regulation_index: Arc<dyn VectorIndex>,
        recorder: Arc<dyn ActionRecorder>,
    ) -> Self {
        Self {
            llm,
            embedder,
            site_index,
            regulation_index,
            recorder,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn index(&self, domain: Domain) -> &dyn VectorIndex {
        match domain {
            Domain::Site => self.site_index.as_ref(),
            Domain::Regulation => self.regulation_index.as_ref(),
        }
    }

    pub async fn classify(&self, user_text: &str) -> Result<Intent, AssistantError> {
        Ok(classifier::classify(user_text, self.llm.as_ref())
            .await?
            .intent)
    }

    /// Chunks the answering path would use for `query`.
    pub async fn retrieve(
        &self,
        domain: Domain,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, AssistantError> {
        retriever::retrieve(self.embedder.as_ref(), self.index(domain), query, k).await
    }

    #[instrument(name = "route", skip(self, user_text), fields(intent))]
    pub async fn route(&self, user_text: &str) -> Result<RouterReply, AssistantError> {
        // The classifier needs something to classify.
        let intent = if user_text.trim().is_empty() {
            Intent::None
        } else {
            self.classify(user_text).await?
        };
        Span::current().record("intent", intent.label());
        let route = Route::for_intent(intent);
        info!(?route, "routing message");
        debug!(message = %user_text, "routed message text");

        let (answer, summary) = match route {
            Route::Answering(domain) => (self.answer_from(domain, user_text).await?, None),
            Route::Recording => {
                let recorded = action::extract_and_record(
                    self.llm.as_ref(),
                    self.recorder.as_ref(),
                    user_text,
                )
                .await?;
                (recorded.confirmation, Some(recorded.summary))
            }
            Route::Rejected => (REJECTION_MESSAGE.to_string(), None),
        };
        Ok(RouterReply {
            intent,
            answer,
            summary,
        })
    }

    /// Routes and appends the exchange to the session history on success.
    pub async fn handle(
        &self,
        user_text: &str,
        history: &mut ConversationHistory,
    ) -> Result<RouterReply, AssistantError> {
        let reply = self.route(user_text).await?;
        history.push(user_text, &reply);
        Ok(reply)
    }

    async fn answer_from(&self, domain: Domain, question: &str) -> Result<String, AssistantError> {
        let chunks = self.retrieve(domain, question, self.top_k).await?;
        let context = retriever::join_context(&chunks);
        generator::answer(self.llm.as_ref(), domain, question, &context).await
    }
}
