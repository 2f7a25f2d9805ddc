use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::history::ConversationTurn;
use crate::language::{CATALOG_LANGUAGE, Language};
use crate::llm::CompletionService;

/// Result of normalizing keywords to the catalog language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    Translated(Vec<String>),
    /// Translation was not possible; `keywords` are the untranslated input
    Fallback { keywords: Vec<String>, reason: String },
}

impl TranslationOutcome {
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        match self {
            TranslationOutcome::Translated(keywords) => keywords,
            TranslationOutcome::Fallback { keywords, .. } => keywords,
        }
    }

    #[must_use]
    pub fn into_keywords(self) -> Vec<String> {
        match self {
            TranslationOutcome::Translated(keywords) => keywords,
            TranslationOutcome::Fallback { keywords, .. } => keywords,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, TranslationOutcome::Fallback { .. })
    }
}

/// Best-effort keyword translator backed by a completion service.
/// Makes at most one call per request.
pub struct KeywordTranslator {
    completion: Arc<dyn CompletionService>,
    timeout: Duration,
}

impl KeywordTranslator {
    pub fn new(completion: Arc<dyn CompletionService>, timeout: Duration) -> Self {
        Self {
            completion,
            timeout,
        }
    }

    pub async fn translate(&self, keywords: &[String], source: Language) -> TranslationOutcome {
        if keywords.is_empty() {
            return TranslationOutcome::Translated(Vec::new());
        }
        if source == CATALOG_LANGUAGE {
            debug!("Keywords already in {}: {:?}", CATALOG_LANGUAGE, keywords);
            return TranslationOutcome::Translated(keywords.to_vec());
        }

        let prompt = translation_prompt(keywords, source);
        let request = [ConversationTurn::user(prompt)];

        let reply = match tokio::time::timeout(self.timeout, self.completion.complete(&request)).await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => return fallback(keywords, e.to_string()),
            Err(_) => {
                return fallback(
                    keywords,
                    format!("no reply within {}ms", self.timeout.as_millis()),
                );
            }
        };

        let translated = parse_translation(&reply);
        if translated.is_empty() {
            return fallback(keywords, format!("unusable reply: {reply:?}"));
        }

        debug!("Translated keywords ({}): {:?}", CATALOG_LANGUAGE, translated);
        TranslationOutcome::Translated(translated)
    }
}

fn fallback(keywords: &[String], reason: String) -> TranslationOutcome {
    warn!("Keyword translation failed, using originals: {}", reason);
    TranslationOutcome::Fallback {
        keywords: keywords.to_vec(),
        reason,
    }
}

fn translation_prompt(keywords: &[String], source: Language) -> String {
    format!(
        "Translate the following {} travel keywords to {}. Provide only the most relevant, \
         single-word {} equivalent for each. Return as a comma-separated list. Keywords: '{}'",
        source.english_name(),
        CATALOG_LANGUAGE.english_name(),
        CATALOG_LANGUAGE.english_name(),
        keywords.join(", ")
    )
}

/// Comma-separated reply to trimmed, lower-cased, non-empty entries
#[must_use]
pub fn parse_translation(reply: &str) -> Vec<String> {
    reply
        .split(',')
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::TextStream;
    use crate::{Result, TourChatError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Reply {
        Text(&'static str),
        Fail,
        Hang,
    }

    struct FakeCompletion {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl FakeCompletion {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CompletionService for FakeCompletion {
        async fn complete(&self, messages: &[ConversationTurn]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(messages[0].content.contains("Spanish travel keywords to English"));
            match self.reply {
                Reply::Text(text) => Ok(text.to_string()),
                Reply::Fail => Err(TourChatError::api("quota exceeded")),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok("late".to_string())
                }
            }
        }

        async fn stream(&self, _messages: Vec<ConversationTurn>) -> Result<TextStream> {
            unimplemented!("translation never streams")
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_english_source_passes_through_without_call() {
        let fake = FakeCompletion::new(Reply::Fail);
        let translator = KeywordTranslator::new(fake.clone(), Duration::from_secs(1));

        let outcome = translator.translate(&words(&["canyon"]), Language::En).await;
        assert_eq!(outcome, TranslationOutcome::Translated(words(&["canyon"])));
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_call() {
        let fake = FakeCompletion::new(Reply::Fail);
        let translator = KeywordTranslator::new(fake.clone(), Duration::from_secs(1));

        let outcome = translator.translate(&[], Language::Es).await;
        assert_eq!(outcome, TranslationOutcome::Translated(Vec::new()));
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reply_is_normalized() {
        let fake = FakeCompletion::new(Reply::Text(" Canyon, CONDOR ,, price\n"));
        let translator = KeywordTranslator::new(fake.clone(), Duration::from_secs(1));

        let outcome = translator
            .translate(&words(&["cañón", "cóndor", "precio"]), Language::Es)
            .await;
        assert_eq!(
            outcome,
            TranslationOutcome::Translated(words(&["canyon", "condor", "price"]))
        );
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_service_error_falls_back_to_originals() {
        let translator =
            KeywordTranslator::new(FakeCompletion::new(Reply::Fail), Duration::from_secs(1));
        let outcome = translator.translate(&words(&["cañón"]), Language::Es).await;

        assert!(outcome.is_fallback());
        assert_eq!(outcome.keywords(), words(&["cañón"]).as_slice());
    }

    #[tokio::test]
    async fn test_blank_reply_falls_back() {
        let translator =
            KeywordTranslator::new(FakeCompletion::new(Reply::Text(" , ")), Duration::from_secs(1));
        let outcome = translator.translate(&words(&["cañón"]), Language::Es).await;
        assert!(outcome.is_fallback());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let translator =
            KeywordTranslator::new(FakeCompletion::new(Reply::Hang), Duration::from_millis(200));
        let outcome = translator.translate(&words(&["cañón"]), Language::Es).await;

        match outcome {
            TranslationOutcome::Fallback { keywords, reason } => {
                assert_eq!(keywords, words(&["cañón"]));
                assert!(reason.contains("200ms"));
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }
}
