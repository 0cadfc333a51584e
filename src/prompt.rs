use std::collections::HashMap;

use crate::markers::FactCategory;
use crate::profile::{Tier, Turn};

/// How many history turns of context the responder receives.
pub const CONTEXT_TURNS: usize = 2;

/// Builds the system context handed to an external responder: a tier-specific
/// instruction, the known personal facts (sorted for determinism), and the
/// formatted history turns. Pure function, so any responder backend can be
/// substituted without touching the engine.
pub fn build_context_prompt(
    tier: Tier,
    facts: &HashMap<FactCategory, String>,
    recent: &[Turn],
) -> String {
    let mut prompt = String::from("Tu es un assistant conversationnel empathique et adaptatif. ");

    match tier {
        Tier::Formal => {
            prompt.push_str("Utilise le vouvoiement et reste professionnel mais chaleureux. ");
        }
        Tier::Friendly => {
            prompt.push_str("Sois amical et utilise le tutoiement avec respect. ");
        }
        Tier::Familiar => {
            prompt.push_str("Sois familier et chaleureux. ");
            if let Some(name) = facts
                .get(&FactCategory::Name)
                .and_then(|snippet| snippet.split_whitespace().last())
            {
                prompt.push_str(&format!("L'utilisateur s'appelle {}. ", name));
            }
        }
        Tier::Close => {
            prompt.push_str("Sois proche et empathique. Montre de la compréhension émotionnelle. ");
        }
        Tier::Intimate => {
            prompt.push_str("Sois très proche et complice. Cette personne te fait confiance. ");
        }
    }

    if !facts.is_empty() {
        let mut entries: Vec<_> = facts.iter().collect();
        entries.sort_by_key(|(category, _)| **category);

        let known = entries
            .iter()
            .map(|(category, snippet)| format!("{}: {}", category, snippet))
            .collect::<Vec<_>>()
            .join(", ");
        prompt.push_str(&format!("Informations personnelles connues: {}. ", known));
    }

    if !recent.is_empty() {
        prompt.push_str("Contexte récent: ");
        for turn in recent {
            prompt.push_str(&format!(
                "User: {} | Assistant: {} | ",
                turn.user_text, turn.assistant_text
            ));
        }
    }

    prompt
}

/// Final prompt for one generation call.
pub fn build_responder_prompt(context: &str, user_input: &str) -> String {
    format!("{}\n\nRéponds naturellement à: {}", context, user_input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_instruction_varies() {
        let facts = HashMap::new();
        let formal = build_context_prompt(Tier::Formal, &facts, &[]);
        let intimate = build_context_prompt(Tier::Intimate, &facts, &[]);

        assert!(formal.contains("vouvoiement"));
        assert!(intimate.contains("complice"));
        assert_ne!(formal, intimate);
    }

    #[test]
    fn test_facts_are_listed_in_category_order() {
        let mut facts = HashMap::new();
        facts.insert(FactCategory::Mood, "je me sens bien".to_string());
        facts.insert(FactCategory::Name, "je m'appelle Marie".to_string());

        let prompt = build_context_prompt(Tier::Friendly, &facts, &[]);
        let name_at = prompt.find("name: je m'appelle Marie").unwrap();
        let mood_at = prompt.find("mood: je me sens bien").unwrap();
        assert!(name_at < mood_at);
    }

    #[test]
    fn test_familiar_names_the_user() {
        let mut facts = HashMap::new();
        facts.insert(FactCategory::Name, "je m'appelle Marie".to_string());

        let prompt = build_context_prompt(Tier::Familiar, &facts, &[]);
        assert!(prompt.contains("L'utilisateur s'appelle Marie."));
    }

    #[test]
    fn test_history_turns_are_formatted_as_pairs() {
        let turns = vec![
            Turn::new("Bonjour", "Bonjour ! Comment puis-je vous aider ?", 1.0),
            Turn::new("je m'appelle Marie", "Enchanté, Marie.", 1.0),
        ];

        let prompt = build_context_prompt(Tier::Formal, &HashMap::new(), &turns);
        assert!(prompt.contains("Contexte récent: "));
        assert!(prompt.contains("User: Bonjour | Assistant: Bonjour ! Comment puis-je vous aider ? | "));
        assert!(prompt.contains("User: je m'appelle Marie | Assistant: Enchanté, Marie. | "));
    }

    #[test]
    fn test_empty_history_omits_context_section() {
        let prompt = build_context_prompt(Tier::Formal, &HashMap::new(), &[]);
        assert!(!prompt.contains("Contexte récent"));
    }

    #[test]
    fn test_responder_prompt_carries_the_input() {
        let prompt = build_responder_prompt("contexte", "je te fais confiance");
        assert!(prompt.ends_with("Réponds naturellement à: je te fais confiance"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let mut facts = HashMap::new();
        facts.insert(FactCategory::Name, "je m'appelle Marie".to_string());
        facts.insert(FactCategory::Hobby, "j'aime le vélo".to_string());
        facts.insert(FactCategory::Location, "j'habite à Lyon".to_string());

        let a = build_context_prompt(Tier::Close, &facts, &[]);
        let b = build_context_prompt(Tier::Close, &facts, &[]);
        assert_eq!(a, b);
    }
}
