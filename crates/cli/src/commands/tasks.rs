//! Task commands.

use chrono::Utc;

use homecare_core::{TaskId, TaskStatus};
use homecare_web::services::reminders::{self, CardSchedule};
use homecare_web::services::tasks::{SortDirection, SortField, SortSpec, TaskFilter, TaskStore};
use homecare_web::store::LocalStore;

use super::{CliError, parse_arg};

/// Flags of `tasks list`.
#[derive(Debug, Default)]
pub struct ListArgs {
    pub search: String,
    pub status: Option<String>,
    pub summary: String,
    pub sort: Option<String>,
    pub desc: bool,
}

impl ListArgs {
    fn filter(&self) -> Result<TaskFilter, CliError> {
        Ok(TaskFilter {
            search: self.search.clone(),
            status: self
                .status
                .as_deref()
                .map(|s| parse_arg("status", s))
                .transpose()?,
            summary: parse_arg("summary", &self.summary)?,
            facet: None,
        })
    }

    fn sort(&self) -> Result<Option<SortSpec>, CliError> {
        let Some(field) = self.sort.as_deref() else {
            return Ok(None);
        };
        Ok(Some(SortSpec {
            field: parse_arg::<SortField>("sort", field)?,
            direction: if self.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
        }))
    }
}

/// Log the tasks matching `args`.
///
/// # Errors
///
/// Returns an error for an unparseable flag or a store failure.
pub fn list(store: &LocalStore, args: &ListArgs) -> Result<(), CliError> {
    let now = Utc::now();
    let tasks = TaskStore::new(store).list(&args.filter()?, args.sort()?, now)?;
    tracing::info!(count = tasks.len(), "Tasks");
    for task in tasks {
        let due = task
            .due_date
            .map_or_else(|| "-".to_owned(), |d| d.to_string());
        tracing::info!(
            "  {:>14}  {:<36} {:<12} {:<7} {:<10} {:<12} {}",
            task.id,
            task.title,
            task.status.label(),
            task.priority.label(),
            due,
            task.room.label(),
            task.cost
        );
    }
    Ok(())
}

/// Change a task's status.
///
/// # Errors
///
/// Returns an error for an unknown status or id, or a store failure.
pub fn set_status(store: &LocalStore, id: i64, status: &str) -> Result<(), CliError> {
    let status: TaskStatus = parse_arg("status", status)?;
    let task = TaskStore::new(store).update_status(TaskId::new(id), status, Utc::now())?;
    tracing::info!(title = %task.title, status = %task.status, "Task updated");
    Ok(())
}

/// Log the summary counts.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn summary(store: &LocalStore) -> Result<(), CliError> {
    let summary = TaskStore::new(store).summary(Utc::now())?;
    tracing::info!(
        total = summary.total,
        overdue = summary.overdue,
        due_this_week = summary.due_this_week,
        high_priority = summary.high_priority,
        completed = summary.completed,
        completion_rate = summary.completion_rate,
        total_cost = %summary.total_cost,
        "Summary"
    );
    Ok(())
}

/// Log the reminder cards as of now.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn reminders(store: &LocalStore) -> Result<(), CliError> {
    let now = Utc::now();
    let tasks = TaskStore::new(store).load(now)?;
    let cards = reminders::build(&tasks, now, &CardSchedule::default());
    if cards.is_empty() {
        tracing::info!("No reminders");
    }
    for card in cards.cards {
        tracing::info!(
            "  {:<12} {:<36} {:<12} due {}",
            card.badge,
            card.title,
            card.room,
            card.due_date
        );
    }
    Ok(())
}
