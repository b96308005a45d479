//! Result of analysing a snapped photo.

use serde::{Deserialize, Serialize};

use super::catalog::{Area, Category};
use super::cost::Cost;
use super::status::Priority;

/// A detected issue together with the task that would fix it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Percentage, 0 to 100.
    pub confidence: u8,
    pub issue: String,
    pub description: String,
    pub suggested_task: SuggestedTask,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedTask {
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    pub estimated_cost: Cost,
    pub room: Area,
    pub description: String,
}
