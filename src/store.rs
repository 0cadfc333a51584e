use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::profile::Profile;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Keyed profile storage with last-write-wins semantics. Any implementation
/// meeting this contract can back the engine.
pub trait ProfileStore {
    fn get(&self, user_id: &str) -> Result<Option<Profile>>;
    fn put(&mut self, user_id: &str, profile: Profile) -> Result<()>;
    fn delete(&mut self, user_id: &str) -> Result<()>;
}

/// Profile store persisted as a single JSON object keyed by user id and
/// rewritten in full on every change.
pub struct JsonProfileStore {
    profiles: HashMap<String, Profile>,
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let profiles = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            HashMap::new()
        };

        Ok(JsonProfileStore { profiles, path })
    }

    pub fn profiles(&self) -> &HashMap<String, Profile> {
        &self.profiles
    }

    // The file is written before the map is swapped in, so a failed write
    // leaves both untouched.
    fn commit(&mut self, next: HashMap<String, Profile>) -> Result<()> {
        let content = serde_json::to_string_pretty(&next)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content)?;
        self.profiles = next;
        Ok(())
    }
}

impl ProfileStore for JsonProfileStore {
    fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(self.profiles.get(user_id).cloned())
    }

    fn put(&mut self, user_id: &str, profile: Profile) -> Result<()> {
        let mut next = self.profiles.clone();
        next.insert(user_id.to_string(), profile);
        self.commit(next)
    }

    fn delete(&mut self, user_id: &str) -> Result<()> {
        if !self.profiles.contains_key(user_id) {
            return Ok(());
        }
        let mut next = self.profiles.clone();
        next.remove(user_id);
        self.commit(next)
    }
}

/// In-memory store for ephemeral sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: HashMap<String, Profile>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(self.profiles.get(user_id).cloned())
    }

    fn put(&mut self, user_id: &str, profile: Profile) -> Result<()> {
        self.profiles.insert(user_id.to_string(), profile);
        Ok(())
    }

    fn delete(&mut self, user_id: &str) -> Result<()> {
        self.profiles.remove(user_id);
        Ok(())
    }
}
