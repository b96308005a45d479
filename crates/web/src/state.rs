//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::config::HomecareConfig;
use crate::services::analyses::AnalysisInbox;
use crate::services::classifier::{CannedClassifier, IssueClassifier};
use crate::services::reminders::CardSchedule;
use crate::store::{FileStore, KeyValueStore, LocalStore, MemoryStore, StoreError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: HomecareConfig,
    backend: Arc<dyn KeyValueStore>,
    classifier: Arc<dyn IssueClassifier>,
    analyses: AnalysisInbox,
    schedule: CardSchedule,
}

impl AppState {
    /// Build the state from configuration.
    ///
    /// Uses a [`FileStore`] when `data_dir` is set, a [`MemoryStore`]
    /// otherwise, and the canned classifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn new(config: HomecareConfig) -> Result<Self, StoreError> {
        let backend: Arc<dyn KeyValueStore> = match &config.data_dir {
            Some(dir) => {
                tracing::info!(data_dir = %dir.display(), "Using file store");
                Arc::new(FileStore::open(dir)?)
            }
            None => {
                tracing::info!("Using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };
        let classifier = Arc::new(CannedClassifier::new(config.delays.analysis));
        Ok(Self::with_parts(config, backend, classifier))
    }

    /// Build the state from explicit parts.
    #[must_use]
    pub fn with_parts(
        config: HomecareConfig,
        backend: Arc<dyn KeyValueStore>,
        classifier: Arc<dyn IssueClassifier>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                classifier,
                analyses: AnalysisInbox::new(),
                schedule: CardSchedule::default(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &HomecareConfig {
        &self.inner.config
    }

    /// The shared storage backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.inner.backend
    }

    /// Store accessor scoped to `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] for a malformed profile name.
    pub fn store_for(&self, profile: &str) -> Result<LocalStore, StoreError> {
        LocalStore::new(Arc::clone(&self.inner.backend), profile)
    }

    #[must_use]
    pub fn classifier(&self) -> &dyn IssueClassifier {
        self.inner.classifier.as_ref()
    }

    #[must_use]
    pub fn analyses(&self) -> &AnalysisInbox {
        &self.inner.analyses
    }

    #[must_use]
    pub fn card_schedule(&self) -> &CardSchedule {
        &self.inner.schedule
    }

    /// Log every store change at debug level until the backend goes away.
    pub fn start_event_logging(&self) -> tokio::task::JoinHandle<()> {
        let mut events = self.inner.backend.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => tracing::debug!(
                        profile = %event.profile,
                        key = %event.key,
                        kind = ?event.kind,
                        "Store changed"
                    ),
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "Store event logger fell behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
