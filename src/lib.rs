//! `TourChat` - conversational tour recommendations backed by Gemini
//!
//! This library provides the retrieval engine (intent classification,
//! keyword extraction and translation, lexical ranking), prompt assembly,
//! conversation storage and the HTTP service around them.

pub mod api;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod history;
pub mod language;
pub mod llm;
pub mod logging;
pub mod prompt;
pub mod retrieval;
pub mod users;
pub mod web;

// Re-export core types for public API
pub use catalog::{Catalog, CatalogLoader, TourRecord};
pub use chat::{ChatService, PreparedPrompt};
pub use config::TourChatConfig;
pub use error::TourChatError;
pub use history::{ConversationTurn, HistoryStore, InMemoryStore, PersistentStore, Role};
pub use language::{Language, LanguageProfile};
pub use llm::{CompletionService, GeminiClient};
pub use retrieval::{Intent, KeywordTranslator, TranslationOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TourChatError>;

/// Languages whose static profile is missing material, with the missing fields
#[must_use]
pub fn incomplete_language_profiles() -> Vec<(Language, Vec<&'static str>)> {
    Language::ALL
        .into_iter()
        .map(|language| (language, language.profile().missing_fields()))
        .filter(|(_, missing)| !missing.is_empty())
        .collect()
}
