use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::markers::FactCategory;

pub const MIN_LEVEL: f64 = 1.0;
pub const MAX_LEVEL: f64 = 5.0;

/// Turns kept per profile; the oldest is evicted past this cap.
pub const MAX_HISTORY: usize = 10;

/// Per-user relationship state. Created lazily on first contact, mutated only
/// through the engine, removed only by an explicit reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub intimacy_level: f64,
    pub interaction_count: u32,
    pub personal_facts: HashMap<FactCategory, String>,
    pub conversation_history: Vec<Turn>,
    /// Opaque tag carried for future use; no logic reads it yet.
    pub emotional_state: String,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            intimacy_level: MIN_LEVEL,
            interaction_count: 0,
            personal_facts: HashMap::new(),
            conversation_history: Vec::new(),
            emotional_state: "neutral".to_string(),
        }
    }
}

impl Profile {
    pub fn tier(&self) -> Tier {
        Tier::from_level(self.intimacy_level)
    }

    /// Raises the intimacy level by `delta`, clamped to the ceiling. The level
    /// never decreases; non-positive deltas are ignored.
    pub fn raise_level(&mut self, delta: f64) {
        if delta > 0.0 {
            self.intimacy_level = (self.intimacy_level + delta).min(MAX_LEVEL);
        }
    }

    /// Appends a turn, evicting the oldest past the history cap (FIFO).
    pub fn push_turn(&mut self, turn: Turn) {
        self.conversation_history.push(turn);
        if self.conversation_history.len() > MAX_HISTORY {
            let excess = self.conversation_history.len() - MAX_HISTORY;
            self.conversation_history.drain(0..excess);
        }
    }

    /// Last `n` turns, oldest first.
    pub fn recent_turns(&self, n: usize) -> &[Turn] {
        let start = self.conversation_history.len().saturating_sub(n);
        &self.conversation_history[start..]
    }
}

/// One completed exchange. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub timestamp: DateTime<Utc>,
    pub user_text: String,
    pub assistant_text: String,
    pub intimacy_level: f64,
}

impl Turn {
    pub fn new(
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
        intimacy_level: f64,
    ) -> Self {
        Turn {
            timestamp: Utc::now(),
            user_text: user_text.into(),
            assistant_text: assistant_text.into(),
            intimacy_level,
        }
    }
}

/// Presentation band derived from the intimacy level. Never stored;
/// recomputed on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Formal,
    Friendly,
    Familiar,
    Close,
    Intimate,
}

impl Tier {
    /// Bands are closed at the top: exactly 1.5 is still Formal.
    pub fn from_level(level: f64) -> Self {
        if level <= 1.5 {
            Tier::Formal
        } else if level <= 2.5 {
            Tier::Friendly
        } else if level <= 3.5 {
            Tier::Familiar
        } else if level <= 4.5 {
            Tier::Close
        } else {
            Tier::Intimate
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Formal => write!(f, "formal"),
            Tier::Friendly => write!(f, "friendly"),
            Tier::Familiar => write!(f, "familiar"),
            Tier::Close => write!(f, "close"),
            Tier::Intimate => write!(f, "intimate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_starts_formal() {
        let profile = Profile::default();
        assert!((profile.intimacy_level - MIN_LEVEL).abs() < f64::EPSILON);
        assert_eq!(profile.interaction_count, 0);
        assert_eq!(profile.tier(), Tier::Formal);
        assert!(profile.personal_facts.is_empty());
        assert!(profile.conversation_history.is_empty());
    }

    #[test]
    fn test_tier_boundaries_are_closed_low() {
        assert_eq!(Tier::from_level(1.0), Tier::Formal);
        assert_eq!(Tier::from_level(1.5), Tier::Formal);
        assert_eq!(Tier::from_level(1.5000001), Tier::Friendly);
        assert_eq!(Tier::from_level(2.5), Tier::Friendly);
        assert_eq!(Tier::from_level(3.5), Tier::Familiar);
        assert_eq!(Tier::from_level(4.5), Tier::Close);
        assert_eq!(Tier::from_level(4.6), Tier::Intimate);
        assert_eq!(Tier::from_level(5.0), Tier::Intimate);
    }

    #[test]
    fn test_raise_level_clamps_to_ceiling() {
        let mut profile = Profile::default();
        profile.raise_level(10.0);
        assert!((profile.intimacy_level - MAX_LEVEL).abs() < f64::EPSILON);
    }

    #[test]
    fn test_raise_level_ignores_non_positive_delta() {
        let mut profile = Profile::default();
        profile.raise_level(0.3);
        let before = profile.intimacy_level;
        profile.raise_level(0.0);
        profile.raise_level(-1.0);
        assert!((profile.intimacy_level - before).abs() < f64::EPSILON);
    }

    #[test]
    fn test_history_evicts_oldest_first() {
        let mut profile = Profile::default();
        for i in 1..=12 {
            profile.push_turn(Turn::new(format!("u{}", i), format!("a{}", i), 1.0));
        }

        assert_eq!(profile.conversation_history.len(), MAX_HISTORY);
        assert_eq!(profile.conversation_history[0].user_text, "u3");
        assert_eq!(profile.conversation_history[9].user_text, "u12");
    }

    #[test]
    fn test_recent_turns_are_oldest_first() {
        let mut profile = Profile::default();
        for i in 1..=5 {
            profile.push_turn(Turn::new(format!("u{}", i), format!("a{}", i), 1.0));
        }

        let recent = profile.recent_turns(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].user_text, "u4");
        assert_eq!(recent[1].user_text, "u5");
    }

    #[test]
    fn test_recent_turns_handles_short_history() {
        let mut profile = Profile::default();
        profile.push_turn(Turn::new("u1", "a1", 1.0));
        assert_eq!(profile.recent_turns(2).len(), 1);
    }
}
