//! Client-side state handed between the start, interview and results views.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use serde_json::Value;
use shared::{domain::SessionId, protocol::SessionStarted};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    SessionId,
    Skills,
    Results,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::SessionId => "bee_session_id",
            StoreKey::Skills => "bee_skills",
            StoreKey::Results => "bee_results",
        }
    }
}

/// Opaque string key/value store scoped to one browsing session. Typed
/// accessors are provided on top of the three raw operations.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: StoreKey) -> Option<String>;
    fn set(&self, key: StoreKey, value: String);
    fn remove(&self, key: StoreKey);

    fn session_id(&self) -> Option<SessionId> {
        self.get(StoreKey::SessionId).and_then(SessionId::new)
    }

    fn skills(&self) -> Vec<String> {
        let Some(raw) = self.get(StoreKey::Skills) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(error = %err, "stored skills are not a json list");
            Vec::new()
        })
    }

    fn results(&self) -> Option<Value> {
        let raw = self.get(StoreKey::Results)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(error = %err, "stored results are not valid json");
                None
            }
        }
    }

    fn save_session(&self, started: &SessionStarted) {
        self.set(StoreKey::SessionId, started.session_id.0.clone());
        self.set(StoreKey::Skills, Value::from(started.skills.clone()).to_string());
    }

    fn save_results(&self, results: &Value) {
        self.set(StoreKey::Results, results.to_string());
    }

    fn clear_results(&self) {
        self.remove(StoreKey::Results);
    }
}

/// In-process store; its contents die with the process, like a browser tab's
/// session storage.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<StoreKey, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: StoreKey) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    fn set(&self, key: StoreKey, value: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }

    fn remove(&self, key: StoreKey) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn session_round_trips_through_typed_accessors() {
        let store = MemorySessionStore::new();
        store.save_session(&SessionStarted {
            session_id: SessionId("s-1".into()),
            skills: vec!["python".into(), "pytorch".into()],
        });

        assert_eq!(store.session_id(), Some(SessionId("s-1".into())));
        assert_eq!(store.skills(), vec!["python".to_string(), "pytorch".to_string()]);
    }

    #[test]
    fn blank_session_id_reads_as_missing() {
        let store = MemorySessionStore::new();
        store.set(StoreKey::SessionId, String::new());
        assert_eq!(store.session_id(), None);
    }

    #[test]
    fn corrupt_entries_read_as_absent() {
        let store = MemorySessionStore::new();
        store.set(StoreKey::Skills, "not json".into());
        store.set(StoreKey::Results, "{".into());
        assert!(store.skills().is_empty());
        assert_eq!(store.results(), None);
    }

    #[test]
    fn clear_results_keeps_session() {
        let store = MemorySessionStore::new();
        store.set(StoreKey::SessionId, "s-1".into());
        store.save_results(&json!({"percentage": 50}));
        store.clear_results();
        assert_eq!(store.results(), None);
        assert!(store.session_id().is_some());
    }
}
