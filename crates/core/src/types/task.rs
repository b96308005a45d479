//! Maintenance task record.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{Area, Category};
use super::cost::Cost;
use super::id::TaskId;
use super::status::{Priority, TaskStatus};

/// A home-maintenance to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub room: Area,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub assignee: String,
    #[serde(default)]
    pub cost: Cost,
    pub created_at: DateTime<Utc>,
    /// Created by accepting a photo analysis.
    #[serde(default)]
    pub ai_generated: bool,
}

impl Task {
    /// Due date as an instant: midnight UTC of the calendar day.
    #[must_use]
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_date
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Due strictly before `now`.
    #[must_use]
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at().is_some_and(|due| due < now)
    }
}
