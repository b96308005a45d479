//! In-memory backend.
//!
//! Profiles are held in a bounded cache and dropped once idle for as long as
//! the cookie session that binds them, so abandoned browsers do not pile up.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use moka::sync::Cache;
use tokio::sync::broadcast;

use super::{ChangeKind, KeyValueStore, StoreError, StoreEvent, event_channel, publish, validate_component};

/// Idle time after which a profile is forgotten. Matches the cookie session
/// expiry.
pub const PROFILE_IDLE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Most profiles kept at once.
pub const MAX_PROFILES: u64 = 100_000;

type Entries = Arc<RwLock<HashMap<String, String>>>;

/// Values keyed by profile then key, lost on restart.
pub struct MemoryStore {
    profiles: Cache<String, Entries>,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(MAX_PROFILES, PROFILE_IDLE)
    }

    /// Store holding at most `max_profiles`, each dropped after `idle`
    /// without a read or write.
    #[must_use]
    pub fn with_limits(max_profiles: u64, idle: Duration) -> Self {
        let profiles = Cache::builder()
            .max_capacity(max_profiles)
            .time_to_idle(idle)
            .eviction_listener(|profile: Arc<String>, _, cause| {
                tracing::debug!(profile = %profile, ?cause, "Profile evicted");
            })
            .build();
        Self {
            profiles,
            events: event_channel(),
        }
    }

    /// Number of resident profiles, after pending evictions are applied.
    #[must_use]
    pub fn profile_count(&self) -> u64 {
        self.profiles.run_pending_tasks();
        self.profiles.entry_count()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, profile: &str, key: &str) -> Result<Option<String>, StoreError> {
        validate_component(key)?;
        let Some(entries) = self.profiles.get(profile) else {
            return Ok(None);
        };
        let entries = entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, profile: &str, key: &str, value: &str) -> Result<(), StoreError> {
        validate_component(profile)?;
        validate_component(key)?;
        let entries = self.profiles.get_with(profile.to_owned(), Entries::default);
        entries
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(key.to_owned(), value.to_owned());
        publish(&self.events, profile, key, ChangeKind::Set);
        Ok(())
    }

    fn remove(&self, profile: &str, key: &str) -> Result<(), StoreError> {
        validate_component(key)?;
        let Some(entries) = self.profiles.get(profile) else {
            return Ok(());
        };
        let (removed, now_empty) = {
            let mut entries = entries.write().map_err(|_| StoreError::Poisoned)?;
            (entries.remove(key).is_some(), entries.is_empty())
        };
        if now_empty {
            self.profiles.invalidate(profile);
        }
        if removed {
            publish(&self.events, profile, key, ChangeKind::Removed);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get("p", "k").unwrap().is_none());
        store.set("p", "k", "v1").unwrap();
        store.set("p", "k", "v2").unwrap();
        assert_eq!(store.get("p", "k").unwrap().as_deref(), Some("v2"));
        store.remove("p", "k").unwrap();
        assert!(store.get("p", "k").unwrap().is_none());
        // removing again is fine
        store.remove("p", "k").unwrap();
    }

    #[test]
    fn test_rejects_invalid_key() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.set("p", "bad/key", "v"),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_remove_missing_key_publishes_nothing() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();
        store.remove("p", "nothing").unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_profiles_are_isolated() {
        let store = MemoryStore::new();
        store.set("a", "k", "1").unwrap();
        store.set("b", "k", "2").unwrap();
        assert_eq!(store.get("a", "k").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b", "k").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_idle_profile_is_evicted() {
        let store = MemoryStore::with_limits(16, Duration::from_millis(50));
        store.set("idle", "home-care-auth", "{}").unwrap();
        store.set("idle", "isLoggedIn", "true").unwrap();
        assert_eq!(store.profile_count(), 1);

        std::thread::sleep(Duration::from_millis(200));
        assert!(store.get("idle", "isLoggedIn").unwrap().is_none());
        assert_eq!(store.profile_count(), 0);
    }

    #[test]
    fn test_profile_count_is_bounded() {
        let store = MemoryStore::with_limits(4, PROFILE_IDLE);
        for i in 0..64 {
            store.set(&format!("p{i}"), "isLoggedIn", "true").unwrap();
        }
        assert!(store.profile_count() <= 4);
    }

    #[test]
    fn test_removing_last_key_drops_profile() {
        let store = MemoryStore::new();
        store.set("p", "k", "v").unwrap();
        store.remove("p", "k").unwrap();
        assert_eq!(store.profile_count(), 0);
    }
}
