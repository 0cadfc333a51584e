use std::collections::HashMap;

use crate::markers::FactCategory;
use crate::profile::Tier;

/// Marker prefix carried by operational failure replies. Such replies pass
/// through the adapter untouched so errors are never dressed up.
pub const WARNING_SIGIL: &str = "⚠️";

const GREETINGS: &[&str] = &["bonjour", "bonsoir", "salut", "hello", "coucou"];

const DISTRESS_WORDS: &[&str] = &["triste", "difficile", "problème", "peur"];

// The first entry is the one used; see DESIGN.md on selection policy.
const EMPATHETIC_LEAD_INS: &[&str] = &[
    "Je comprends ce que tu ressens... ",
    "Ça me touche que tu me dises ça... ",
    "Je sens que c'est important pour toi... ",
];

/// Restyles a base reply for the given tier. Deterministic pure transform;
/// the reply text itself always survives inside the result.
pub fn adapt(reply: &str, tier: Tier, facts: &HashMap<FactCategory, String>) -> String {
    if reply.starts_with(WARNING_SIGIL) {
        return reply.to_string();
    }

    match tier {
        Tier::Formal => {
            let mut out = formalize_pronouns(reply);
            if !opens_with_greeting(&out) {
                out = format!("Bonjour ! {}", out);
            }
            out
        }
        Tier::Friendly => {
            if opens_with_greeting(reply) {
                reply.to_string()
            } else {
                format!("Salut ! {}", reply)
            }
        }
        Tier::Familiar => {
            let mut out = reply.to_string();
            if let Some(name) = display_name(facts) {
                if !reply.to_lowercase().contains(&name.to_lowercase()) {
                    out = format!("Salut {} ! {}", name, out);
                }
            }
            out.push_str(" 😊");
            out
        }
        Tier::Close => {
            let lower = reply.to_lowercase();
            let mut out = if DISTRESS_WORDS.iter().any(|word| lower.contains(word)) {
                format!("{}{}", EMPATHETIC_LEAD_INS[0], reply)
            } else {
                reply.to_string()
            };
            out.push_str(" ❤️");
            out
        }
        Tier::Intimate => {
            format!("{} 💙 Tu sais que tu peux toujours compter sur moi.", reply)
        }
    }
}

fn opens_with_greeting(reply: &str) -> bool {
    let lower = reply.trim_start().to_lowercase();
    GREETINGS.iter().any(|greeting| lower.starts_with(greeting))
}

/// Last whitespace-separated token of the name snippet, e.g.
/// "je m'appelle Marie" -> "Marie".
fn display_name(facts: &HashMap<FactCategory, String>) -> Option<&str> {
    facts
        .get(&FactCategory::Name)
        .and_then(|snippet| snippet.split_whitespace().last())
}

// Word-boundary-aware "tu" -> "vous". A raw substring replace corrupts words
// like "tuer" or "battu", so only standalone tokens are rewritten; elided
// forms ("t'...") are left alone. Best-effort cosmetic transform.
fn formalize_pronouns(reply: &str) -> String {
    let mut out = String::with_capacity(reply.len() + 8);
    let mut word = String::new();

    for ch in reply.chars() {
        if ch.is_alphabetic() {
            word.push(ch);
        } else {
            flush_word(&mut out, &word);
            word.clear();
            out.push(ch);
        }
    }
    flush_word(&mut out, &word);

    out
}

fn flush_word(out: &mut String, word: &str) {
    match word {
        "tu" => out.push_str("vous"),
        "Tu" => out.push_str("Vous"),
        "TU" => out.push_str("VOUS"),
        _ => out.push_str(word),
    }
}
