//! Profile-scoped key-value storage.
//!
//! Every browser (or the fixed kiosk profile) owns an isolated namespace.
//! Records are JSON strings under well-known keys, see [`keys`].
//!
//! # Backends
//!
//! - [`MemoryStore`] - process lifetime, idle profiles expire; the default
//! - [`FileStore`] - one JSON file per key under `<data_dir>/<profile>/`
//!
//! Handlers never talk to a backend directly; they go through a
//! [`LocalStore`] bound to the request's profile.

mod file;
mod memory;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::broadcast;

pub use file::FileStore;
pub use memory::{MemoryStore, PROFILE_IDLE};

/// Well-known record keys.
pub mod keys {
    /// Serialized [`homecare_core::Session`].
    pub const SESSION: &str = "home-care-auth";
    /// Serialized `Vec<UserRecord>`.
    pub const USERS: &str = "home-care-users";
    /// Serialized `Vec<Task>`.
    pub const TASKS: &str = "home-care-tasks";
    /// `"true"` while logged in.
    pub const LEGACY_LOGGED_IN: &str = "isLoggedIn";
    /// Plain email of the logged-in user.
    pub const LEGACY_USER_EMAIL: &str = "userEmail";
}

/// Capacity of the change event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Errors from storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Profile or key contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid key component: {0:?}")]
    InvalidKey(String),

    /// A writer panicked while holding the lock.
    #[error("store lock poisoned")]
    Poisoned,
}

/// What happened to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Set,
    Removed,
}

/// Broadcast whenever a key is written or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreEvent {
    pub profile: String,
    pub key: String,
    pub kind: ChangeKind,
}

/// A synchronous string key-value store partitioned by profile.
pub trait KeyValueStore: Send + Sync {
    /// Read a raw value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backend fails.
    fn get(&self, profile: &str, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a raw value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backend fails.
    fn set(&self, profile: &str, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backend fails.
    fn remove(&self, profile: &str, key: &str) -> Result<(), StoreError>;

    /// Subscribe to change events across all profiles.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}

/// Create the event channel shared by the backends.
fn event_channel() -> broadcast::Sender<StoreEvent> {
    let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    tx
}

/// Send an event, ignoring the case where nobody is listening.
fn publish(tx: &broadcast::Sender<StoreEvent>, profile: &str, key: &str, kind: ChangeKind) {
    let _ = tx.send(StoreEvent {
        profile: profile.to_owned(),
        key: key.to_owned(),
        kind,
    });
}

/// Check that a profile or key is non-empty and uses only `[A-Za-z0-9_-]`.
///
/// # Errors
///
/// Returns [`StoreError::InvalidKey`] otherwise.
pub fn validate_component(component: &str) -> Result<(), StoreError> {
    let valid = !component.is_empty()
        && component
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(component.to_owned()))
    }
}

/// Typed access to one profile's namespace.
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KeyValueStore>,
    profile: String,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl LocalStore {
    /// Bind a backend to a profile.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] if the profile name is not a valid
    /// key component.
    pub fn new(backend: Arc<dyn KeyValueStore>, profile: impl Into<String>) -> Result<Self, StoreError> {
        let profile = profile.into();
        validate_component(&profile)?;
        Ok(Self { backend, profile })
    }

    #[must_use]
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.backend.get(&self.profile, key)
    }

    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.backend.set(&self.profile, key, value)
    }

    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.backend.remove(&self.profile, key)
    }

    /// Read and deserialize a record.
    ///
    /// A stored value that does not parse is logged and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend fails.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(profile = %self.profile, key, error = %e, "Ignoring malformed record");
                Ok(None)
            }
        }
    }

    /// Serialize and write a record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend fails.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, &raw)
    }

    /// Subscribe to change events of every profile on the backend.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.backend.subscribe()
    }
}
