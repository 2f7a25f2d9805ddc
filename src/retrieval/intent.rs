use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::catalog::SPECIALTY_QUERY_TERMS;
use crate::language::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Names the flagship region; always wins over the other two
    SpecialtyDestination,
    /// Greetings and open "what do you offer" questions
    General,
    Specific,
}

impl Intent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::SpecialtyDestination => "specialty_destination",
            Intent::General => "general",
            Intent::Specific => "specific",
        }
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).expect("general-inquiry pattern is valid"))
        .collect()
}

static SPANISH_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(Language::Es.profile().general_patterns));
static ENGLISH_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(Language::En.profile().general_patterns));

fn general_patterns(language: Language) -> &'static [Regex] {
    match language {
        Language::Es => &SPANISH_PATTERNS,
        Language::En => &ENGLISH_PATTERNS,
    }
}

/// Classify an utterance
#[must_use]
pub fn classify_intent(utterance: &str, language: Language) -> Intent {
    let text = utterance.to_lowercase();

    if SPECIALTY_QUERY_TERMS.iter().any(|term| text.contains(term)) {
        return Intent::SpecialtyDestination;
    }

    if general_patterns(language)
        .iter()
        .any(|pattern| pattern.is_match(&text))
    {
        return Intent::General;
    }

    Intent::Specific
}
