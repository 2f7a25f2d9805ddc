//! Retrieval: utterance and history in, ranked catalog records out.

pub mod intent;
pub mod keywords;
pub mod ranker;
pub mod translator;

pub use intent::{Intent, classify_intent};
pub use keywords::{extract_keywords, extract_keywords_for_tag};
pub use ranker::{ScoredCandidate, rank_tours, score_catalog, score_record};
pub use translator::{KeywordTranslator, TranslationOutcome};
