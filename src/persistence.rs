use std::sync::Mutex;

use crate::{error::PersistenceError, story::Story};

/// Best-effort backing store for the story collection.
///
/// The store calls `save` after every mutation and `load` once at construction.
/// Failures are logged by the caller and never stop the in-memory store from working.
pub trait StoryPersistence: Send + Sync {
    fn save(&self, stories: &[Story]) -> Result<(), PersistenceError>;
    fn load(&self) -> Result<Vec<Story>, PersistenceError>;
}

/// Keeps nothing. Only logs what would have been written.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPersistence;

impl StoryPersistence for NullPersistence {
    fn save(&self, stories: &[Story]) -> Result<(), PersistenceError> {
        tracing::debug!(count = stories.len(), "skipping story save");
        Ok(())
    }

    fn load(&self) -> Result<Vec<Story>, PersistenceError> {
        tracing::debug!("no persisted stories to load");
        Ok(Vec::new())
    }
}

/// Holds the last saved snapshot as JSON in memory.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    snapshot: Mutex<Option<String>>,
}

impl MemoryPersistence {
    pub fn with_stories(stories: &[Story]) -> Result<Self, PersistenceError> {
        Ok(MemoryPersistence {
            snapshot: Mutex::new(Some(serde_json::to_string(stories)?)),
        })
    }

    pub fn snapshot(&self) -> Option<String> {
        self.snapshot.lock().ok().and_then(|s| s.clone())
    }
}

impl StoryPersistence for MemoryPersistence {
    fn save(&self, stories: &[Story]) -> Result<(), PersistenceError> {
        let encoded = serde_json::to_string(stories)?;
        let mut snapshot = self
            .snapshot
            .lock()
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        *snapshot = Some(encoded);
        Ok(())
    }

    fn load(&self) -> Result<Vec<Story>, PersistenceError> {
        let snapshot = self
            .snapshot
            .lock()
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        match snapshot.as_deref() {
            Some(encoded) => Ok(serde_json::from_str(encoded)?),
            None => Ok(Vec::new()),
        }
    }
}
