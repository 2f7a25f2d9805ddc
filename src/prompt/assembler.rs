use crate::history::ConversationTurn;
use crate::language::{Language, PromptTemplates};
use crate::retrieval::Intent;

/// Final user-turn template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    GeneralFirstTurn,
    SpecialtyDestination,
    SpecificWithContext,
    FallbackGeneral,
}

impl TemplateId {
    fn text(self, templates: &PromptTemplates) -> &'static str {
        match self {
            TemplateId::GeneralFirstTurn => templates.general_first_turn,
            TemplateId::SpecialtyDestination => templates.specialty_destination,
            TemplateId::SpecificWithContext => templates.specific_with_context,
            TemplateId::FallbackGeneral => templates.fallback_general,
        }
    }
}

/// Template for every `(intent, first turn)` combination.
///
/// Only a *first-turn* general inquiry lists the destinations; later general
/// inquiries get the shorter reminder template.
#[must_use]
pub fn select_template(intent: Intent, is_first_turn: bool) -> TemplateId {
    match (intent, is_first_turn) {
        (Intent::General, true) => TemplateId::GeneralFirstTurn,
        (Intent::General, false) => TemplateId::FallbackGeneral,
        (Intent::SpecialtyDestination, true | false) => TemplateId::SpecialtyDestination,
        (Intent::Specific, true | false) => TemplateId::SpecificWithContext,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub history: &'a [ConversationTurn],
    pub context: &'a str,
    pub utterance: &'a str,
    pub language: Language,
    pub intent: Intent,
    pub destinations: &'a [String],
}

/// Build the message sequence sent to the model
#[must_use]
pub fn assemble_prompt(input: &PromptInput<'_>) -> Vec<ConversationTurn> {
    let profile = input.language.profile();
    let is_first_turn = input.history.is_empty();

    let mut messages = Vec::with_capacity(input.history.len() + 3);
    messages.push(ConversationTurn::user(profile.system_instruction));
    messages.push(ConversationTurn::model(if is_first_turn {
        profile.greeting
    } else {
        profile.continuation
    }));
    messages.extend_from_slice(input.history);

    let template = select_template(input.intent, is_first_turn).text(&profile.templates);
    let destinations = input.destinations.join(", ");
    messages.push(ConversationTurn::user(render(template, |name| match name {
        "destinations" => Some(destinations.as_str()),
        "context" => Some(input.context),
        "question" => Some(input.utterance),
        _ => None,
    })));

    messages
}

/// Substitute `{name}` placeholders in one pass. Inserted values are never
/// scanned again, and unknown names are left as written.
fn render<'v>(template: &str, lookup: impl Fn(&str) -> Option<&'v str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}').and_then(|close| Some((close, lookup(&after[..close])?))) {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Role;
    use rstest::rstest;

    fn input<'a>(
        history: &'a [ConversationTurn],
        intent: Intent,
        destinations: &'a [String],
    ) -> PromptInput<'a> {
        PromptInput {
            history,
            context: "CTX",
            utterance: "Q?",
            language: Language::En,
            intent,
            destinations,
        }
    }

    #[rstest]
    #[case(Intent::General, true, TemplateId::GeneralFirstTurn)]
    #[case(Intent::General, false, TemplateId::FallbackGeneral)]
    #[case(Intent::SpecialtyDestination, true, TemplateId::SpecialtyDestination)]
    #[case(Intent::SpecialtyDestination, false, TemplateId::SpecialtyDestination)]
    #[case(Intent::Specific, true, TemplateId::SpecificWithContext)]
    #[case(Intent::Specific, false, TemplateId::SpecificWithContext)]
    fn test_template_table(
        #[case] intent: Intent,
        #[case] first: bool,
        #[case] expected: TemplateId,
    ) {
        assert_eq!(select_template(intent, first), expected);
    }

    #[test]
    fn test_first_turn_layout() {
        let destinations = vec!["Cusco".to_string(), "Puno".to_string()];
        let messages = assemble_prompt(&input(&[], Intent::General, &destinations));
        let profile = Language::En.profile();

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], ConversationTurn::user(profile.system_instruction));
        assert_eq!(messages[1], ConversationTurn::model(profile.greeting));
        assert_eq!(messages[2].role, Role::User);
        assert!(messages[2].content.contains("Other destinations: Cusco, Puno."));
        assert!(messages[2].content.ends_with("User Question: Q?"));
    }

    #[test]
    fn test_history_is_kept_verbatim_after_continuation() {
        let history = vec![
            ConversationTurn::user("earlier"),
            ConversationTurn::model("answer"),
        ];
        let messages = assemble_prompt(&input(&history, Intent::Specific, &[]));

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1].content, Language::En.profile().continuation);
        assert_eq!(&messages[2..4], history.as_slice());
        assert!(messages[4].content.starts_with("CTX\n\n"));
    }

    #[test]
    fn test_continuation_follows_active_language() {
        let history = vec![ConversationTurn::user("hola"), ConversationTurn::model("¡hola!")];
        let mut prompt = input(&history, Intent::General, &[]);
        prompt.language = Language::Es;

        let messages = assemble_prompt(&prompt);
        assert_eq!(messages[1].content, Language::Es.profile().continuation);
        assert!(messages[4].content.starts_with("Consulta general."));
    }

    #[test]
    fn test_specialty_template_embeds_context() {
        let messages = assemble_prompt(&input(&[], Intent::SpecialtyDestination, &[]));
        assert!(messages[2].content.contains("(our specialty) 🌊:\nCTX\n"));
    }

    #[test]
    fn test_render_is_single_pass() {
        let rendered = render("{context} / {question} / {other}", |name| match name {
            "context" => Some("{question}"),
            "question" => Some("why?"),
            _ => None,
        });
        assert_eq!(rendered, "{question} / why? / {other}");
        assert_eq!(render("no braces {", |_| Some("x")), "no braces {");
    }
}
