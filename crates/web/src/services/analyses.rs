//! Analyses waiting for the user to accept or dismiss them.
//!
//! Results live in memory only and expire after 15 minutes. Each entry is
//! tied to the profile that uploaded the photo; other profiles cannot see it.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use homecare_core::AnalysisResult;

const PENDING_TTL: Duration = Duration::from_secs(15 * 60);
const PENDING_CAPACITY: u64 = 10_000;

/// An analysis shown on the result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnalysis {
    pub profile: String,
    pub file_name: Option<String>,
    pub result: AnalysisResult,
}

/// In-memory holding area for analysis results.
#[derive(Clone)]
pub struct AnalysisInbox {
    inner: Arc<Cache<Uuid, PendingAnalysis>>,
}

impl Default for AnalysisInbox {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisInbox {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(PENDING_CAPACITY)
            .time_to_live(PENDING_TTL)
            .build();
        Self {
            inner: Arc::new(cache),
        }
    }

    /// Store a result and return its id.
    pub async fn stash(&self, pending: PendingAnalysis) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.insert(id, pending).await;
        id
    }

    /// Look up a result owned by `profile`.
    pub async fn get(&self, profile: &str, id: Uuid) -> Option<PendingAnalysis> {
        self.inner
            .get(&id)
            .await
            .filter(|pending| pending.profile == profile)
    }

    /// Remove and return a result owned by `profile`.
    pub async fn take(&self, profile: &str, id: Uuid) -> Option<PendingAnalysis> {
        let pending = self.get(profile, id).await?;
        self.inner.invalidate(&id).await;
        Some(pending)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::classifier::canned_results;

    fn pending(profile: &str) -> PendingAnalysis {
        PendingAnalysis {
            profile: profile.to_owned(),
            file_name: Some("faucet.png".to_owned()),
            result: canned_results().remove(2),
        }
    }

    #[tokio::test]
    async fn test_stash_and_take() {
        let inbox = AnalysisInbox::new();
        let id = inbox.stash(pending("alice")).await;
        assert!(inbox.get("alice", id).await.is_some());

        let taken = inbox.take("alice", id).await.unwrap();
        assert_eq!(taken.result.issue, "Leaky Faucet");
        assert!(inbox.get("alice", id).await.is_none());
        assert!(inbox.take("alice", id).await.is_none());
    }

    #[tokio::test]
    async fn test_other_profiles_cannot_see_result() {
        let inbox = AnalysisInbox::new();
        let id = inbox.stash(pending("alice")).await;
        assert!(inbox.get("bob", id).await.is_none());
        assert!(inbox.take("bob", id).await.is_none());
        assert!(inbox.get("alice", id).await.is_some());
    }
}
