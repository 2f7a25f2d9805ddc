//! One chat request end to end: retrieval, prompt, streamed answer, history.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tracing::{debug, error, info};

use crate::Result;
use crate::catalog::{Catalog, TourRecord};
use crate::history::{ConversationTurn, HistoryStore};
use crate::language::Language;
use crate::llm::{CompletionService, TextStream};
use crate::prompt::{PromptInput, assemble_prompt, format_context};
use crate::retrieval::{
    Intent, KeywordTranslator, TranslationOutcome, classify_intent, extract_keywords, rank_tours,
};

/// Text chunks for the caller; failures have already been replaced by the
/// language's error message.
pub type ReplyStream = BoxStream<'static, String>;

/// Everything derived from a request before the model is called
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    pub intent: Intent,
    pub keywords: Vec<String>,
    /// `None` when retrieval was skipped for a general inquiry
    pub translation: Option<TranslationOutcome>,
    pub tours: Vec<TourRecord>,
    pub context: String,
    pub messages: Vec<ConversationTurn>,
}

pub struct ChatService {
    catalog: Arc<Catalog>,
    completion: Arc<dyn CompletionService>,
    translator: KeywordTranslator,
    history: Arc<dyn HistoryStore>,
    max_history_turns: usize,
}

impl ChatService {
    pub fn new(
        catalog: Arc<Catalog>,
        completion: Arc<dyn CompletionService>,
        translator: KeywordTranslator,
        history: Arc<dyn HistoryStore>,
        max_history_turns: usize,
    ) -> Self {
        Self {
            catalog,
            completion,
            translator,
            history,
            max_history_turns,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Classify, retrieve and assemble the prompt for one utterance
    pub async fn prepare(
        &self,
        history: &[ConversationTurn],
        utterance: &str,
        language: Language,
    ) -> PreparedPrompt {
        let intent = classify_intent(utterance, language);
        info!("Detected intent: {}", intent.as_str());

        let (keywords, translation, tours, context) = if intent == Intent::General {
            (Vec::new(), None, Vec::new(), String::new())
        } else {
            let keywords: Vec<String> = extract_keywords(history, utterance, language)
                .into_iter()
                .collect();
            let translation = self.translator.translate(&keywords, language).await;
            let ranked = rank_tours(&self.catalog, translation.keywords(), intent);
            debug!(
                "Keywords {:?} -> {:?}, {} tours selected",
                keywords,
                translation.keywords(),
                ranked.len()
            );
            let context = format_context(&ranked, language);
            let tours = ranked.into_iter().cloned().collect();
            (keywords, Some(translation), tours, context)
        };

        let destinations = self.catalog.destination_names();
        let messages = assemble_prompt(&PromptInput {
            history,
            context: &context,
            utterance,
            language,
            intent,
            destinations: &destinations,
        });

        PreparedPrompt {
            intent,
            keywords,
            translation,
            tours,
            context,
            messages,
        }
    }

    /// Answer one utterance as a stream. The exchange is written to history
    /// only after the model finished without error.
    #[tracing::instrument(name = "chat_respond", skip(self, utterance))]
    pub async fn respond(
        &self,
        session_id: &str,
        utterance: &str,
        language: Language,
    ) -> Result<ReplyStream> {
        let history = self.history.recent(session_id, self.max_history_turns).await?;
        info!("Loaded {} history turns", history.len());

        let prepared = self.prepare(&history, utterance, language).await;
        let error_message = language.profile().error_message;

        let upstream = match self.completion.stream(prepared.messages).await {
            Ok(upstream) => upstream,
            Err(e) => {
                error!("Completion request failed: {}", e);
                return Ok(stream::once(async move { error_message.to_string() }).boxed());
            }
        };

        let relay = Relay {
            upstream,
            answer: String::new(),
            history: Arc::clone(&self.history),
            session_id: session_id.to_string(),
            utterance: utterance.to_string(),
            error_message,
            failed: false,
        };

        Ok(stream::unfold(relay, |mut relay| async move {
            if relay.failed {
                return None;
            }
            match relay.upstream.next().await {
                Some(Ok(chunk)) => {
                    relay.answer.push_str(&chunk);
                    Some((chunk, relay))
                }
                Some(Err(e)) => {
                    error!("Completion stream failed: {}", e);
                    relay.failed = true;
                    Some((relay.error_message.to_string(), relay))
                }
                None => {
                    relay.persist().await;
                    None
                }
            }
        })
        .boxed())
    }
}

/// Forwards model chunks while collecting the full answer for history
struct Relay {
    upstream: TextStream,
    answer: String,
    history: Arc<dyn HistoryStore>,
    session_id: String,
    utterance: String,
    error_message: &'static str,
    failed: bool,
}

impl Relay {
    async fn persist(self) {
        match self
            .history
            .append_exchange(&self.session_id, &self.utterance, &self.answer)
            .await
        {
            Ok(()) => info!("Saved exchange for session {}", self.session_id),
            Err(e) => error!("Failed to save exchange for session {}: {}", self.session_id, e),
        }
    }
}
