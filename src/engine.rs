use crate::markers;
use crate::profile::{Profile, Tier, Turn};
use crate::scoring;
use crate::store::{ProfileStore, Result};

/// Every `BONUS_EVERY`th interaction earns a flat level bonus, independent of
/// message content.
const BONUS_EVERY: u32 = 5;
const BONUS_AMOUNT: f64 = 0.1;

/// Orchestrates one relationship per user id over an injected store handle.
/// Methods take `&mut self`, so calls for one user are naturally serialized;
/// profiles for different user ids are independent.
pub struct IntimacyEngine<S: ProfileStore> {
    store: S,
}

/// What one processed interaction produced, with a snapshot of the updated
/// profile for the tone adapter and prompt builder.
#[derive(Debug, Clone)]
pub struct InteractionOutcome {
    pub tier: Tier,
    pub boost: f64,
    pub bonus_applied: bool,
    pub profile: Profile,
}

impl<S: ProfileStore> IntimacyEngine<S> {
    pub fn new(store: S) -> Self {
        IntimacyEngine { store }
    }

    /// One interaction: counts it, merges extracted facts, applies the scored
    /// boost and the engagement bonus, persists, and reports the resulting
    /// tier. A store failure aborts the whole call before anything is
    /// persisted, leaving the stored profile unchanged.
    ///
    /// Blank input is the caller's problem: validation lives at the CLI
    /// boundary, not here.
    pub fn process(&mut self, user_id: &str, text: &str) -> Result<InteractionOutcome> {
        let mut profile = self.store.get(user_id)?.unwrap_or_default();

        profile.interaction_count += 1;

        for (category, snippet) in markers::extract(text) {
            profile.personal_facts.insert(category, snippet);
        }

        let boost = scoring::intimacy_boost(text);
        profile.raise_level(boost);

        let bonus_applied = profile.interaction_count % BONUS_EVERY == 0;
        if bonus_applied {
            profile.raise_level(BONUS_AMOUNT);
        }

        self.store.put(user_id, profile.clone())?;

        Ok(InteractionOutcome {
            tier: profile.tier(),
            boost,
            bonus_applied,
            profile,
        })
    }

    /// Appends a completed exchange to the history, stamped with the current
    /// intimacy level. Oldest turns are evicted past the history cap.
    pub fn record_turn(
        &mut self,
        user_id: &str,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<()> {
        let mut profile = self.store.get(user_id)?.unwrap_or_default();
        let level = profile.intimacy_level;
        profile.push_turn(Turn::new(user_text, assistant_text, level));
        self.store.put(user_id, profile)
    }

    pub fn profile(&self, user_id: &str) -> Result<Option<Profile>> {
        self.store.get(user_id)
    }

    /// Forgets the user entirely, returning them to the initial formal tier
    /// on next contact.
    pub fn reset(&mut self, user_id: &str) -> Result<()> {
        self.store.delete(user_id)
    }
}
