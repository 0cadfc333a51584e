use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Categories of personal facts picked up from user messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactCategory {
    Name,
    Mood,
    Activity,
    Location,
    Family,
    Hobby,
}

impl std::fmt::Display for FactCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FactCategory::Name => write!(f, "name"),
            FactCategory::Mood => write!(f, "mood"),
            FactCategory::Activity => write!(f, "activity"),
            FactCategory::Location => write!(f, "location"),
            FactCategory::Family => write!(f, "family"),
            FactCategory::Hobby => write!(f, "hobby"),
        }
    }
}

// Cue phrases per category. Domain data, not logic: swap this table to
// localize the extractor.
const MARKER_CUES: &[(FactCategory, &[&str])] = &[
    (FactCategory::Name, &["je m'appelle", "je suis", "mon nom"]),
    (
        FactCategory::Mood,
        &["je me sens", "je suis triste", "je suis heureux", "je suis content"],
    ),
    (FactCategory::Activity, &["je travaille", "je fais", "j'étudie"]),
    (FactCategory::Location, &["je vis à", "j'habite", "je suis de"]),
    (
        FactCategory::Family,
        &["ma famille", "mes parents", "mon mari", "ma femme"],
    ),
    (FactCategory::Hobby, &["j'aime", "je pratique", "mon hobby"]),
];

const SNIPPET_CHARS: usize = 80;

/// Scans the text for personal markers and returns one snippet per matched
/// category. Matching is case-insensitive; the first cue found for a category
/// wins and the rest of that category's cues are skipped. Pure function.
pub fn extract(text: &str) -> HashMap<FactCategory, String> {
    let lower = text.to_lowercase();
    let mut facts = HashMap::new();

    for (category, cues) in MARKER_CUES {
        for cue in *cues {
            if let Some(pos) = lower.find(cue) {
                facts.insert(*category, snippet_at(text, pos));
                break;
            }
        }
    }

    facts
}

// Window of up to SNIPPET_CHARS characters starting at the match position.
// Lowercasing can shift byte offsets for a handful of characters, so the
// position is nudged back to the nearest char boundary before slicing.
fn snippet_at(text: &str, pos: usize) -> String {
    let mut start = pos.min(text.len());
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }

    let end = text[start..]
        .char_indices()
        .nth(SNIPPET_CHARS)
        .map(|(i, _)| start + i)
        .unwrap_or(text.len());

    text[start..end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_name() {
        let facts = extract("je m'appelle Marie");
        assert_eq!(facts.get(&FactCategory::Name).unwrap(), "je m'appelle Marie");
    }

    #[test]
    fn test_extract_is_case_insensitive_and_keeps_original_case() {
        let facts = extract("Je M'appelle Marie Dupont");
        let snippet = facts.get(&FactCategory::Name).unwrap();
        assert!(snippet.contains("Marie Dupont"));
    }

    #[test]
    fn test_extract_multiple_categories_in_one_call() {
        let facts = extract("Je suis triste et je travaille à Paris");
        assert!(facts.contains_key(&FactCategory::Name));
        assert!(facts.contains_key(&FactCategory::Mood));
        assert!(facts.contains_key(&FactCategory::Activity));
    }

    #[test]
    fn test_extract_no_match_is_empty() {
        assert!(extract("Bonjour").is_empty());
    }

    #[test]
    fn test_extract_is_idempotent() {
        let text = "j'habite à Lyon et j'aime le vélo";
        assert_eq!(extract(text), extract(text));
    }

    #[test]
    fn test_snippet_truncated_near_end_of_text() {
        let facts = extract("Le tricot, c'est mon hobby");
        assert_eq!(facts.get(&FactCategory::Hobby).unwrap(), "mon hobby");
    }

    #[test]
    fn test_snippet_window_is_bounded() {
        let tail = "x".repeat(200);
        let text = format!("je m'appelle Marie {}", tail);
        let snippet = facts_name(&text);
        assert_eq!(snippet.chars().count(), SNIPPET_CHARS);
    }

    fn facts_name(text: &str) -> String {
        extract(text).remove(&FactCategory::Name).unwrap()
    }

    #[test]
    fn test_accented_text_matches() {
        let facts = extract("J'étudie la médecine");
        assert!(facts.contains_key(&FactCategory::Activity));
    }
}
