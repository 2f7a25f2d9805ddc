use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::Result;
use crate::history::{ConversationTurn, Role};
use crate::language::Language;

/// User turns from history that contribute keywords
const USER_TURNS_CONSIDERED: usize = 2;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w{3,}\b").expect("word pattern is valid"));

/// Keywords from the last two user turns plus the current utterance,
/// lower-cased and without the language's stop words.
#[must_use]
pub fn extract_keywords(
    history: &[ConversationTurn],
    utterance: &str,
    language: Language,
) -> BTreeSet<String> {
    let profile = language.profile();

    let mut recent_user: Vec<&str> = history
        .iter()
        .rev()
        .filter(|turn| turn.role == Role::User)
        .take(USER_TURNS_CONSIDERED)
        .map(|turn| turn.content.as_str())
        .collect();
    recent_user.reverse();
    recent_user.push(utterance);

    let text = recent_user.join(" ").to_lowercase();

    WORD.find_iter(&text)
        .map(|m| m.as_str())
        .filter(|word| !profile.is_stopword(word))
        .map(str::to_string)
        .collect()
}

/// Same as [`extract_keywords`] for a raw language tag
pub fn extract_keywords_for_tag(
    history: &[ConversationTurn],
    utterance: &str,
    tag: &str,
) -> Result<BTreeSet<String>> {
    let language = Language::from_tag(tag)?;
    Ok(extract_keywords(history, utterance, language))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TourChatError;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_utterance_only_when_history_empty() {
        let keywords = extract_keywords(&[], "Quiero un tour al Cañón del Colca", Language::Es);
        assert_eq!(keywords, set(&["tour", "cañón", "del", "colca"]));
    }

    #[test]
    fn test_uses_last_two_user_turns() {
        let history = vec![
            ConversationTurn::user("machu picchu"),
            ConversationTurn::model("great choice"),
            ConversationTurn::user("arequipa"),
            ConversationTurn::model("lovely city"),
            ConversationTurn::user("colca canyon"),
            ConversationTurn::model("condors"),
        ];

        let keywords = extract_keywords(&history, "prices", Language::En);
        assert_eq!(keywords, set(&["arequipa", "colca", "canyon", "prices"]));
    }

    #[test]
    fn test_drops_stopwords_and_short_tokens() {
        let keywords = extract_keywords(&[], "What tours are in the Sacred Valley? ok", Language::En);
        assert_eq!(keywords, set(&["tours", "sacred", "valley"]));
    }

    #[test]
    fn test_order_of_words_does_not_matter() {
        let a = extract_keywords(&[], "uyuni salt flats", Language::En);
        let b = extract_keywords(&[], "flats SALT uyuni uyuni", Language::En);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_tag_fails_fast() {
        let err = extract_keywords_for_tag(&[], "bonjour", "fr").unwrap_err();
        assert!(matches!(err, TourChatError::UnsupportedLanguage { .. }));

        let ok = extract_keywords_for_tag(&[], "islas uros", "es").unwrap();
        assert_eq!(ok, set(&["islas", "uros"]));
    }
}
