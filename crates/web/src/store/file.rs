//! Directory-backed store: `<root>/<profile>/<key>.json`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::broadcast;

use super::{ChangeKind, KeyValueStore, StoreError, StoreEvent, event_channel, publish, validate_component};

/// Persists each key as its own file.
///
/// Writes go to a temporary sibling and are renamed into place, so a reader
/// never sees a half-written record.
pub struct FileStore {
    root: PathBuf,
    events: broadcast::Sender<StoreEvent>,
}

impl FileStore {
    /// Open (and create if needed) a data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            events: event_channel(),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, profile: &str, key: &str) -> Result<PathBuf, StoreError> {
        validate_component(profile)?;
        validate_component(key)?;
        Ok(self.root.join(profile).join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, profile: &str, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(profile, key)?;
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, profile: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(profile, key)?;
        let dir = self.root.join(profile);
        std::fs::create_dir_all(&dir)?;

        let tmp = dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;

        publish(&self.events, profile, key, ChangeKind::Set);
        Ok(())
    }

    fn remove(&self, profile: &str, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(profile, key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                publish(&self.events, profile, key, ChangeKind::Removed);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
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
    fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set("kiosk", "home-care-tasks", "[]").unwrap();
        }
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            store.get("kiosk", "home-care-tasks").unwrap().as_deref(),
            Some("[]")
        );
        assert!(dir.path().join("kiosk").join("home-care-tasks.json").exists());
    }

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.get("kiosk", "home-care-users").unwrap().is_none());
        store.remove("kiosk", "home-care-users").unwrap();
    }

    #[test]
    fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.set("..", "home-care-auth", "{}"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(
            store.get("kiosk", "../../secret"),
            Err(StoreError::InvalidKey(_))
        ));
    }
}
