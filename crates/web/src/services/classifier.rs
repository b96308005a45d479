//! Photo "analysis".
//!
//! [`IssueClassifier`] is the seam a real model would plug into. The only
//! implementation, [`CannedClassifier`], ignores the image and returns one of
//! four fixed findings after a simulated delay.

use std::time::Duration;

use futures::future::BoxFuture;
use rand::Rng;
use thiserror::Error;

use homecare_core::{AnalysisResult, Area, Category, Cost, Priority, SuggestedTask};

use super::auth::simulate_latency;

/// Largest accepted photo.
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// Rejections of an upload before it reaches a classifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Please choose a photo to analyze.")]
    Empty,

    #[error("Only image files can be analyzed (got {0}).")]
    NotAnImage(String),

    #[error("Photos must be 10 MB or smaller.")]
    TooLarge,
}

/// A validated image upload.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// Accept a non-empty `image/*` upload of at most [`MAX_PHOTO_BYTES`].
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] for empty, oversized or non-image uploads.
    pub fn new(
        file_name: Option<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > MAX_PHOTO_BYTES {
            return Err(UploadError::TooLarge);
        }
        let content_type = content_type.unwrap_or_default();
        if !content_type.starts_with("image/") {
            let shown = if content_type.is_empty() {
                "unknown type".to_owned()
            } else {
                content_type
            };
            return Err(UploadError::NotAnImage(shown));
        }
        Ok(Self {
            file_name: file_name.filter(|n| !n.is_empty()),
            content_type,
            bytes,
        })
    }
}

/// Turns a photo into a detected issue with a suggested task.
pub trait IssueClassifier: Send + Sync {
    /// Analyze a photo. Never fails.
    fn analyze<'a>(&'a self, photo: &'a PhotoUpload) -> BoxFuture<'a, AnalysisResult>;
}

/// Picks one of [`canned_results`] uniformly at random.
#[derive(Debug, Clone)]
pub struct CannedClassifier {
    delay: Duration,
}

impl CannedClassifier {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl IssueClassifier for CannedClassifier {
    fn analyze<'a>(&'a self, photo: &'a PhotoUpload) -> BoxFuture<'a, AnalysisResult> {
        Box::pin(async move {
            let mut results = canned_results();
            let index = rand::rng().random_range(0..results.len());
            simulate_latency(self.delay).await;
            tracing::debug!(
                file_name = ?photo.file_name,
                size = photo.bytes.len(),
                index,
                "Returning canned analysis"
            );
            results.swap_remove(index)
        })
    }
}

/// The four findings the demo knows about.
#[must_use]
pub fn canned_results() -> Vec<AnalysisResult> {
    let result = |confidence: u8,
                  issue: &str,
                  description: &str,
                  title: &str,
                  category: Category,
                  priority: Priority,
                  cost: u32,
                  room: Area,
                  task_description: &str| AnalysisResult {
        confidence,
        issue: issue.to_owned(),
        description: description.to_owned(),
        suggested_task: SuggestedTask {
            title: title.to_owned(),
            category,
            priority,
            estimated_cost: Cost::dollars(cost),
            room,
            description: task_description.to_owned(),
        },
    };

    vec![
        result(
            92,
            "Clogged Gutter",
            "Debris accumulation detected in gutter system. Recommended cleaning to prevent water damage.",
            "Clean Gutters - Debris Removal",
            Category::Maintenance,
            Priority::High,
            150,
            Area::Exterior,
            "Remove accumulated debris from gutters to prevent water damage and ensure proper drainage.",
        ),
        result(
            88,
            "Smoke Detector Battery",
            "Low battery indicator visible on smoke detector. Immediate replacement recommended.",
            "Replace Smoke Detector Battery",
            Category::Safety,
            Priority::High,
            15,
            Area::LivingRoom,
            "Replace low battery in smoke detector to ensure proper safety protection.",
        ),
        result(
            85,
            "Leaky Faucet",
            "Water stains and dripping detected around faucet area. Requires repair to prevent water waste.",
            "Repair Leaky Kitchen Faucet",
            Category::Plumbing,
            Priority::Medium,
            75,
            Area::Kitchen,
            "Fix dripping faucet to prevent water waste and potential damage.",
        ),
        result(
            79,
            "Outlet Cover Damage",
            "Damaged electrical outlet cover detected. Safety hazard that requires immediate attention.",
            "Replace Damaged Outlet Cover",
            Category::Electrical,
            Priority::High,
            25,
            Area::Bedroom,
            "Replace damaged electrical outlet cover to ensure safety and proper functionality.",
        ),
    ]
}
