//! Task list mirrored to the profile store.
//!
//! Every load runs the overdue pass: a `pending` task whose due date lies in
//! the past becomes `overdue`. The pass never moves a task back.

use std::cmp::Ordering;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use homecare_core::{
    AnalysisResult, Area, Category, Cost, Priority, Task, TaskId, TaskStatus, next_id,
};

use crate::store::{LocalStore, StoreError, keys};

/// Days until a new task is due when no date is given.
pub const DEFAULT_DUE_DAYS: u64 = 7;
/// Assignee of tasks created without one.
pub const DEFAULT_ASSIGNEE: &str = "Me";

/// Errors from task operations.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task title is required.")]
    MissingTitle,

    #[error("Task {0} not found.")]
    NotFound(TaskId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

// =============================================================================
// Filtering
// =============================================================================

/// Derived bucket shown in the summary cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryFilter {
    #[default]
    All,
    Overdue,
    DueThisWeek,
    HighPriority,
}

impl SummaryFilter {
    pub const ALL: [Self; 4] = [Self::All, Self::Overdue, Self::DueThisWeek, Self::HighPriority];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Overdue => "overdue",
            Self::DueThisWeek => "due_this_week",
            Self::HighPriority => "high_priority",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All Tasks",
            Self::Overdue => "Overdue",
            Self::DueThisWeek => "Due This Week",
            Self::HighPriority => "High Priority",
        }
    }

    /// Whether `task` falls in this bucket at `now`.
    #[must_use]
    pub fn matches(self, task: &Task, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Overdue => is_overdue_bucket(task, now),
            Self::DueThisWeek => is_due_this_week(task, now),
            Self::HighPriority => task.priority == Priority::High && !task.is_completed(),
        }
    }
}

impl std::str::FromStr for SummaryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("invalid summary filter: {s}"))
    }
}

/// Due strictly before `now` and not completed.
#[must_use]
pub fn is_overdue_bucket(task: &Task, now: DateTime<Utc>) -> bool {
    !task.is_completed() && task.is_past_due(now)
}

/// Due within the next seven days (inclusive) and not completed.
#[must_use]
pub fn is_due_this_week(task: &Task, now: DateTime<Utc>) -> bool {
    let week_end = now + chrono::Duration::days(7);
    !task.is_completed()
        && task
            .due_at()
            .is_some_and(|due| due >= now && due <= week_end)
}

/// Explorer facet a list can be narrowed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Category(Category),
    Area(Area),
}

impl Facet {
    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::Category(category) => task.category == category,
            Self::Area(area) => task.room == area,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Category(category) => category.label(),
            Self::Area(area) => area.label(),
        }
    }
}

/// Everything the task list can be narrowed by.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Case-insensitive substring over title, description and assignee.
    pub search: String,
    pub status: Option<TaskStatus>,
    pub summary: SummaryFilter,
    pub facet: Option<Facet>,
}

impl TaskFilter {
    /// Select a summary bucket the way the summary cards do.
    ///
    /// Selecting the active bucket goes back to `all`; selecting any other
    /// bucket than `all` clears the status filter.
    pub fn toggle_summary(&mut self, bucket: SummaryFilter) {
        if bucket != SummaryFilter::All && self.summary == bucket {
            self.summary = SummaryFilter::All;
            return;
        }
        self.summary = bucket;
        if bucket != SummaryFilter::All {
            self.status = None;
        }
    }

    #[must_use]
    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> bool {
        self.matches_search(task)
            && self.status.is_none_or(|status| task.status == status)
            && self.summary.matches(task, now)
            && self.facet.is_none_or(|facet| facet.matches(task))
    }

    fn matches_search(&self, task: &Task) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        task.title.to_lowercase().contains(&needle)
            || task.description.to_lowercase().contains(&needle)
            || task.assignee.to_lowercase().contains(&needle)
    }
}

// =============================================================================
// Sorting
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    Status,
    Priority,
    DueDate,
    Room,
    Category,
    Assignee,
    Cost,
    CreatedAt,
}

impl SortField {
    pub const ALL: [Self; 9] = [
        Self::Title,
        Self::Status,
        Self::Priority,
        Self::DueDate,
        Self::Room,
        Self::Category,
        Self::Assignee,
        Self::Cost,
        Self::CreatedAt,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Status => "status",
            Self::Priority => "priority",
            Self::DueDate => "due_date",
            Self::Room => "room",
            Self::Category => "category",
            Self::Assignee => "assignee",
            Self::Cost => "cost",
            Self::CreatedAt => "created_at",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Task",
            Self::Status => "Status",
            Self::Priority => "Priority",
            Self::DueDate => "Due Date",
            Self::Room => "Room",
            Self::Category => "Category",
            Self::Assignee => "Assignee",
            Self::Cost => "Cost",
            Self::CreatedAt => "Created",
        }
    }

    /// Compare two tasks by this field. Missing values are greater than any
    /// present value, so they sort last when ascending.
    #[must_use]
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            Self::Status => a.status.cmp(&b.status),
            Self::Priority => a.priority.cmp(&b.priority),
            Self::DueDate => nulls_last(a.due_date, b.due_date),
            Self::Room => a.room.label().cmp(b.room.label()),
            Self::Category => a.category.label().cmp(b.category.label()),
            Self::Assignee => a.assignee.to_lowercase().cmp(&b.assignee.to_lowercase()),
            Self::Cost => a.cost.cmp(&b.cost),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("invalid sort field: {s}"))
    }
}

fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("invalid sort direction: {s}")),
        }
    }
}

/// Active sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    #[must_use]
    pub const fn ascending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    /// The sort a click on `field`'s header produces: the active field while
    /// ascending flips to descending, anything else starts ascending.
    #[must_use]
    pub fn toggled(current: Option<Self>, field: SortField) -> Self {
        match current {
            Some(spec) if spec.field == field && spec.direction == SortDirection::Asc => Self {
                field,
                direction: SortDirection::Desc,
            },
            _ => Self::ascending(field),
        }
    }

    /// Stable sort in place.
    pub fn apply(self, tasks: &mut [Task]) {
        tasks.sort_by(|a, b| {
            let ordering = self.field.compare(a, b);
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Counts shown above the task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    /// Past due and not completed.
    pub overdue: usize,
    pub due_this_week: usize,
    pub high_priority: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// Tasks whose stored status is `overdue`.
    pub status_overdue: usize,
    /// Percentage of completed tasks, rounded.
    pub completion_rate: u32,
    /// Sum over all tasks.
    pub total_cost: Cost,
}

impl TaskSummary {
    #[must_use]
    pub fn count_for(&self, bucket: SummaryFilter) -> usize {
        match bucket {
            SummaryFilter::All => self.total,
            SummaryFilter::Overdue => self.overdue,
            SummaryFilter::DueThisWeek => self.due_this_week,
            SummaryFilter::HighPriority => self.high_priority,
        }
    }
}

/// Compute summary counts.
#[must_use]
pub fn summarize(tasks: &[Task], now: DateTime<Utc>) -> TaskSummary {
    let total = tasks.len();
    let completed = count(tasks, Task::is_completed);
    TaskSummary {
        total,
        overdue: count(tasks, |t| is_overdue_bucket(t, now)),
        due_this_week: count(tasks, |t| is_due_this_week(t, now)),
        high_priority: count(tasks, |t| SummaryFilter::HighPriority.matches(t, now)),
        completed,
        in_progress: count(tasks, |t| t.status == TaskStatus::InProgress),
        status_overdue: count(tasks, |t| t.status == TaskStatus::Overdue),
        completion_rate: percentage(completed, total),
        total_cost: tasks.iter().map(|t| t.cost).sum(),
    }
}

fn count(tasks: &[Task], pred: impl Fn(&Task) -> bool) -> usize {
    tasks.iter().filter(|t| pred(t)).count()
}

/// `part / whole` as a rounded percentage; zero when `whole` is zero.
#[must_use]
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let rounded = (part * 200 + whole) / (whole * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

// =============================================================================
// Overdue pass and fixtures
// =============================================================================

/// Move past-due `pending` tasks to `overdue`. Returns whether anything
/// changed.
pub fn apply_overdue(tasks: &mut [Task], now: DateTime<Utc>) -> bool {
    let mut changed = false;
    for task in tasks
        .iter_mut()
        .filter(|t| t.status == TaskStatus::Pending && t.is_past_due(now))
    {
        task.status = TaskStatus::Overdue;
        changed = true;
    }
    changed
}

/// The three tasks a new profile starts with.
#[must_use]
pub fn seed_tasks(now: DateTime<Utc>) -> Vec<Task> {
    let fixture = |id: i64,
                   title: &str,
                   description: &str,
                   status: TaskStatus,
                   priority: Priority,
                   due: (i32, u32, u32),
                   room: Area,
                   category: Category,
                   assignee: &str,
                   cost: u32| Task {
        id: TaskId::new(id),
        title: title.to_owned(),
        description: description.to_owned(),
        category,
        priority,
        room,
        status,
        due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2),
        assignee: assignee.to_owned(),
        cost: Cost::dollars(cost),
        created_at: now,
        ai_generated: false,
    };

    vec![
        fixture(
            1,
            "Replace HVAC Filter",
            "Replace air filter for better air quality",
            TaskStatus::Pending,
            Priority::High,
            (2024, 1, 15),
            Area::Basement,
            Category::HeatingCooling,
            "John",
            25,
        ),
        fixture(
            2,
            "Clean Gutters",
            "Remove debris and check for damage",
            TaskStatus::InProgress,
            Priority::Medium,
            (2024, 1, 20),
            Area::Exterior,
            Category::Maintenance,
            "Sarah",
            150,
        ),
        fixture(
            3,
            "Check Smoke Detectors",
            "Test batteries and functionality",
            TaskStatus::Completed,
            Priority::High,
            (2024, 1, 10),
            Area::WholeHome,
            Category::Safety,
            "Mike",
            0,
        ),
    ]
}

// =============================================================================
// Store
// =============================================================================

/// Input for a new task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub room: Option<Area>,
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<String>,
    pub cost: Option<Cost>,
}

/// Task operations on one profile.
pub struct TaskStore<'a> {
    store: &'a LocalStore,
}

impl<'a> TaskStore<'a> {
    #[must_use]
    pub const fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    /// Load all tasks, seeding an empty profile and applying the overdue
    /// pass. Changes made by either are persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn load(&self, now: DateTime<Utc>) -> Result<Vec<Task>, TaskError> {
        let (mut tasks, seeded) = match self.store.read::<Vec<Task>>(keys::TASKS)? {
            Some(tasks) => (tasks, false),
            None => {
                tracing::info!(profile = %self.store.profile(), "Seeding default tasks");
                (seed_tasks(now), true)
            }
        };
        let changed = apply_overdue(&mut tasks, now);
        if seeded || changed {
            self.save(&tasks)?;
        }
        Ok(tasks)
    }

    /// Filtered and optionally sorted tasks. Without a sort the stored order
    /// (newest first) is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn list(
        &self,
        filter: &TaskFilter,
        sort: Option<SortSpec>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Task>, TaskError> {
        let mut tasks: Vec<Task> = self
            .load(now)?
            .into_iter()
            .filter(|t| filter.matches(t, now))
            .collect();
        if let Some(sort) = sort {
            sort.apply(&mut tasks);
        }
        Ok(tasks)
    }

    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn summary(&self, now: DateTime<Utc>) -> Result<TaskSummary, TaskError> {
        Ok(summarize(&self.load(now)?, now))
    }

    /// Create a `pending` task at the front of the list.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::MissingTitle`] for a blank title, or a store error.
    #[instrument(skip(self, input), fields(profile = %self.store.profile()))]
    pub fn create(&self, input: NewTask, now: DateTime<Utc>) -> Result<Task, TaskError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(TaskError::MissingTitle);
        }

        let mut tasks = self.load(now)?;
        let id = next_id(now.timestamp_millis(), tasks.iter().map(|t| t.id.as_i64()));
        let assignee = input
            .assignee
            .map(|a| a.trim().to_owned())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_ASSIGNEE.to_owned());

        let mut task = Task {
            id: TaskId::new(id),
            title: title.to_owned(),
            description: input.description.trim().to_owned(),
            category: input.category,
            priority: input.priority,
            room: input.room.unwrap_or_default(),
            status: TaskStatus::Pending,
            due_date: Some(input.due_date.unwrap_or_else(|| default_due_date(now))),
            assignee,
            cost: input.cost.unwrap_or_default(),
            created_at: now,
            ai_generated: false,
        };
        // A back-dated task is overdue from the start.
        apply_overdue(std::slice::from_mut(&mut task), now);

        tasks.insert(0, task.clone());
        self.save(&tasks)?;
        tracing::info!(task_id = %task.id, title = %task.title, "Task created");
        Ok(task)
    }

    /// Turn an accepted analysis into a task.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn create_from_analysis(
        &self,
        result: &AnalysisResult,
        now: DateTime<Utc>,
    ) -> Result<Task, TaskError> {
        let suggestion = &result.suggested_task;
        let input = NewTask {
            title: suggestion.title.clone(),
            description: suggestion.description.clone(),
            category: suggestion.category,
            priority: suggestion.priority,
            room: Some(suggestion.room),
            due_date: Some(default_due_date(now)),
            assignee: Some(DEFAULT_ASSIGNEE.to_owned()),
            cost: Some(suggestion.estimated_cost),
        };
        let task = self.create(input, now)?;
        self.update(task.id, now, |t| t.ai_generated = true)
    }

    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] for an unknown id, or a store error.
    #[instrument(skip(self), fields(profile = %self.store.profile()))]
    pub fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> Result<Task, TaskError> {
        self.update(id, now, |t| t.status = status)
    }

    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] for an unknown id, or a store error.
    #[instrument(skip(self), fields(profile = %self.store.profile()))]
    pub fn delete(&self, id: TaskId, now: DateTime<Utc>) -> Result<Task, TaskError> {
        let mut tasks = self.load(now)?;
        let index = tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        let removed = tasks.remove(index);
        self.save(&tasks)?;
        tracing::info!(task_id = %id, "Task deleted");
        Ok(removed)
    }

    /// Drop every task (the next load reseeds).
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn clear(&self) -> Result<(), TaskError> {
        self.store.remove(keys::TASKS)?;
        Ok(())
    }

    fn update(
        &self,
        id: TaskId,
        now: DateTime<Utc>,
        change: impl FnOnce(&mut Task),
    ) -> Result<Task, TaskError> {
        let mut tasks = self.load(now)?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        change(task);
        let updated = task.clone();
        self.save(&tasks)?;
        Ok(updated)
    }

    fn save(&self, tasks: &[Task]) -> Result<(), TaskError> {
        self.store.write(keys::TASKS, tasks)?;
        Ok(())
    }
}

/// A week from today.
#[must_use]
pub fn default_due_date(now: DateTime<Utc>) -> NaiveDate {
    let today = now.date_naive();
    today
        .checked_add_days(Days::new(DEFAULT_DUE_DAYS))
        .unwrap_or(today)
}
