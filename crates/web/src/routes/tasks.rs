//! Task list, explorer and create-task page.
//!
//! The list view is driven entirely by its query string so every state
//! (filters, sort, explorer tab and carousel position) is a plain link.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query},
    response::{IntoResponse, Redirect},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::instrument;

use homecare_core::{Area, Category, Cost, Priority, Task, TaskId, TaskStatus};

use super::{CurrentUser, with_error, with_notice};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireSession;
use crate::services::explorer::{Carousel, FacetKind, FacetStats, facet_key, facet_stats, parse_facet};
use crate::services::task_templates::{self, TaskTemplate};
use crate::services::tasks::{
    NewTask, SortDirection, SortField, SortSpec, SummaryFilter, TaskError, TaskFilter, TaskStore,
    TaskSummary, default_due_date, summarize,
};

/// Explorer cards per carousel page when the request does not say.
const DEFAULT_PER_VIEW: usize = 4;
const MAX_PER_VIEW: usize = 12;

const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";
const DATE_DISPLAY_FORMAT: &str = "%b %-d, %Y";

// =============================================================================
// Query and form types
// =============================================================================

/// Query string of the list page. Unknown or malformed values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    #[serde(default)]
    pub search: String,
    pub status: Option<String>,
    pub summary: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub facet: Option<String>,
    pub value: Option<String>,
    pub tab: Option<String>,
    pub offset: Option<String>,
    pub per_view: Option<String>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewTaskQuery {
    pub template: Option<String>,
    pub error: Option<String>,
}

/// Create-task form data.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTaskForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub cost: String,
}

/// Status change or delete, with the list view to return to.
#[derive(Debug, Default, Deserialize)]
pub struct TaskActionForm {
    #[serde(default)]
    pub status: String,
    pub back: Option<String>,
}

fn parse_opt<T: FromStr>(value: Option<&str>) -> Option<T> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

/// Only return to the task list, never to an arbitrary URL.
fn back_target(back: Option<&str>) -> &str {
    back.filter(|b| *b == "/tasks" || b.starts_with("/tasks?"))
        .unwrap_or("/tasks")
}

// =============================================================================
// List view state
// =============================================================================

/// Typed view of [`TaskListQuery`].
#[derive(Debug, Clone)]
pub struct ListParams {
    pub filter: TaskFilter,
    pub sort: Option<SortSpec>,
    pub tab: FacetKind,
    pub offset: usize,
    pub per_view: usize,
}

impl ListParams {
    #[must_use]
    pub fn from_query(query: &TaskListQuery) -> Self {
        let facet_kind: Option<FacetKind> = parse_opt(query.facet.as_deref());
        let facet = facet_kind
            .zip(query.value.as_deref())
            .and_then(|(kind, value)| parse_facet(kind, value.trim()));
        let sort = parse_opt::<SortField>(query.sort.as_deref()).map(|field| SortSpec {
            field,
            direction: parse_opt(query.dir.as_deref()).unwrap_or_default(),
        });

        Self {
            filter: TaskFilter {
                search: query.search.trim().to_owned(),
                status: parse_opt(query.status.as_deref()),
                summary: parse_opt(query.summary.as_deref()).unwrap_or_default(),
                facet,
            },
            sort,
            tab: parse_opt(query.tab.as_deref())
                .or(facet_kind)
                .unwrap_or_default(),
            offset: parse_opt(query.offset.as_deref()).unwrap_or(0),
            per_view: parse_opt::<usize>(query.per_view.as_deref())
                .unwrap_or(DEFAULT_PER_VIEW)
                .clamp(1, MAX_PER_VIEW),
        }
    }

    /// Link to the list in this state.
    #[must_use]
    pub fn href(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if !self.filter.search.is_empty() {
            pairs.push(("search", self.filter.search.clone()));
        }
        if let Some(status) = self.filter.status {
            pairs.push(("status", status.as_str().to_owned()));
        }
        if self.filter.summary != SummaryFilter::All {
            pairs.push(("summary", self.filter.summary.as_str().to_owned()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.field.as_str().to_owned()));
            pairs.push(("dir", sort.direction.as_str().to_owned()));
        }
        if let Some(facet) = self.filter.facet {
            let (kind, value) = facet_key(facet);
            pairs.push(("facet", kind.as_str().to_owned()));
            pairs.push(("value", value.to_owned()));
        }
        if self.tab != FacetKind::default() {
            pairs.push(("tab", self.tab.as_str().to_owned()));
        }
        if self.offset > 0 {
            pairs.push(("offset", self.offset.to_string()));
        }
        if self.per_view != DEFAULT_PER_VIEW {
            pairs.push(("per_view", self.per_view.to_string()));
        }

        if pairs.is_empty() {
            return "/tasks".to_owned();
        }
        let query: Vec<String> = pairs
            .into_iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(&v)))
            .collect();
        format!("/tasks?{}", query.join("&"))
    }

    fn with(&self, change: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        change(&mut next);
        next
    }

    /// Hidden inputs that keep everything but search and status when the
    /// filter form is submitted.
    fn hidden_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if self.filter.summary != SummaryFilter::All {
            fields.push(("summary", self.filter.summary.as_str().to_owned()));
        }
        if let Some(sort) = self.sort {
            fields.push(("sort", sort.field.as_str().to_owned()));
            fields.push(("dir", sort.direction.as_str().to_owned()));
        }
        if let Some(facet) = self.filter.facet {
            let (kind, value) = facet_key(facet);
            fields.push(("facet", kind.as_str().to_owned()));
            fields.push(("value", value.to_owned()));
        }
        if self.tab != FacetKind::default() {
            fields.push(("tab", self.tab.as_str().to_owned()));
        }
        fields
    }
}

// =============================================================================
// View models
// =============================================================================

pub struct SummaryCard {
    pub label: &'static str,
    pub key: &'static str,
    pub count: usize,
    pub href: String,
    pub active: bool,
}

pub struct SortLink {
    pub label: &'static str,
    pub href: String,
    /// Arrow for the active column, empty otherwise.
    pub indicator: &'static str,
}

pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

pub struct TaskRow {
    pub task: Task,
    pub due_label: String,
    pub created_label: String,
    pub is_late: bool,
    pub status_options: Vec<SelectOption>,
}

pub struct TabLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

pub struct ExplorerCard {
    pub label: &'static str,
    pub stats: FacetStats,
    pub next_due_label: String,
    pub href: String,
    pub active: bool,
}

pub struct ExplorerView {
    pub tabs: Vec<TabLink>,
    pub cards: Vec<ExplorerCard>,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    pub total: usize,
}

fn status_options(current: Option<TaskStatus>) -> Vec<SelectOption> {
    TaskStatus::ALL
        .into_iter()
        .map(|status| SelectOption {
            value: status.as_str(),
            label: status.label(),
            selected: current == Some(status),
        })
        .collect()
}

fn due_label(date: Option<NaiveDate>) -> String {
    date.map_or_else(
        || "No due date".to_owned(),
        |d| d.format(DATE_DISPLAY_FORMAT).to_string(),
    )
}

fn summary_cards(params: &ListParams, summary: &TaskSummary) -> Vec<SummaryCard> {
    SummaryFilter::ALL
        .into_iter()
        .map(|bucket| {
            let next = params.with(|p| {
                p.filter.toggle_summary(bucket);
                p.offset = 0;
            });
            SummaryCard {
                label: bucket.label(),
                key: bucket.as_str(),
                count: summary.count_for(bucket),
                href: next.href(),
                active: params.filter.summary == bucket,
            }
        })
        .collect()
}

fn sort_links(params: &ListParams) -> Vec<SortLink> {
    SortField::ALL
        .into_iter()
        .map(|field| {
            let next = params.with(|p| p.sort = Some(SortSpec::toggled(p.sort, field)));
            let indicator = match params.sort {
                Some(spec) if spec.field == field => match spec.direction {
                    SortDirection::Asc => "▲",
                    SortDirection::Desc => "▼",
                },
                _ => "",
            };
            SortLink {
                label: field.label(),
                href: next.href(),
                indicator,
            }
        })
        .collect()
}

fn explorer_view(params: &ListParams, tasks: &[Task]) -> ExplorerView {
    let tabs = FacetKind::ALL
        .into_iter()
        .map(|kind| TabLink {
            label: kind.label(),
            href: params
                .with(|p| {
                    p.tab = kind;
                    p.offset = 0;
                })
                .href(),
            active: params.tab == kind,
        })
        .collect();

    let stats = facet_stats(tasks, params.tab);
    let total = stats.len();
    let carousel = Carousel::new(params.offset, params.per_view, total);
    let visible = carousel.visible();

    let cards = stats
        .into_iter()
        .enumerate()
        .filter(|(i, _)| visible.contains(i))
        .map(|(_, stats)| {
            let active = params.filter.facet == Some(stats.facet);
            let href = params
                .with(|p| p.filter.facet = if active { None } else { Some(stats.facet) })
                .href();
            ExplorerCard {
                label: stats.facet.label(),
                next_due_label: due_label(stats.next_due),
                stats,
                href,
                active,
            }
        })
        .collect();

    ExplorerView {
        tabs,
        cards,
        prev_href: carousel
            .can_go_prev()
            .then(|| params.with(|p| p.offset = carousel.prev()).href()),
        next_href: carousel
            .can_go_next()
            .then(|| params.with(|p| p.offset = carousel.next()).href()),
        total,
    }
}

fn task_row(task: Task, now: DateTime<Utc>) -> TaskRow {
    TaskRow {
        due_label: due_label(task.due_date),
        created_label: task.created_at.format(DATE_DISPLAY_FORMAT).to_string(),
        is_late: !task.is_completed() && task.is_past_due(now),
        status_options: status_options(Some(task.status)),
        task,
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Task list template.
#[derive(Template, WebTemplate)]
#[template(path = "tasks/index.html")]
pub struct TaskListTemplate {
    pub user: CurrentUser,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub summary: TaskSummary,
    pub summary_cards: Vec<SummaryCard>,
    pub search: String,
    pub status_filter: Vec<SelectOption>,
    pub hidden_fields: Vec<(&'static str, String)>,
    pub sort_links: Vec<SortLink>,
    pub rows: Vec<TaskRow>,
    pub explorer: ExplorerView,
    pub active_facet: Option<&'static str>,
    pub clear_facet_href: String,
    pub current_href: String,
}

/// Create-task template.
#[derive(Template, WebTemplate)]
#[template(path = "tasks/new.html")]
pub struct NewTaskTemplate {
    pub user: CurrentUser,
    pub error: Option<String>,
    pub templates: &'static [TaskTemplate],
    pub selected: Option<&'static TaskTemplate>,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub cost: String,
    pub categories: Vec<SelectOption>,
    pub priorities: Vec<SelectOption>,
    pub areas: Vec<SelectOption>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the task list.
#[instrument(skip(store, session, query))]
pub async fn index(
    RequireSession { store, session }: RequireSession,
    Query(query): Query<TaskListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let params = ListParams::from_query(&query);
    let task_store = TaskStore::new(&store);

    let all = task_store.load(now)?;
    let summary = summarize(&all, now);
    let explorer = explorer_view(&params, &all);
    let rows = task_store
        .list(&params.filter, params.sort, now)?
        .into_iter()
        .map(|task| task_row(task, now))
        .collect();

    Ok(TaskListTemplate {
        user: CurrentUser::from(&session),
        error: query.error,
        notice: query.notice,
        summary_cards: summary_cards(&params, &summary),
        summary,
        search: params.filter.search.clone(),
        status_filter: status_options(params.filter.status),
        hidden_fields: params.hidden_fields(),
        sort_links: sort_links(&params),
        rows,
        explorer,
        active_facet: params.filter.facet.map(|f| f.label()),
        clear_facet_href: params.with(|p| p.filter.facet = None).href(),
        current_href: params.href(),
    })
}

fn options<T: Copy + PartialEq>(
    all: &[T],
    selected: T,
    value: impl Fn(T) -> &'static str,
    label: impl Fn(T) -> &'static str,
) -> Vec<SelectOption> {
    all.iter()
        .map(|&item| SelectOption {
            value: value(item),
            label: label(item),
            selected: item == selected,
        })
        .collect()
}

/// Display the create-task page, prefilled from a template when one is
/// chosen.
#[instrument(skip(session, query))]
pub async fn new_task(
    RequireSession { session, .. }: RequireSession,
    Query(query): Query<NewTaskQuery>,
) -> impl IntoResponse {
    let selected = query.template.as_deref().and_then(task_templates::find);
    let due = default_due_date(Utc::now()).format(DATE_INPUT_FORMAT).to_string();

    let (title, description, category, priority, room, cost) = match selected {
        Some(t) => (
            t.title.to_owned(),
            t.description.to_owned(),
            t.category,
            t.priority,
            t.room,
            t.cost().amount().to_string(),
        ),
        None => (
            String::new(),
            String::new(),
            Category::default(),
            Priority::default(),
            Area::default(),
            String::new(),
        ),
    };

    NewTaskTemplate {
        user: CurrentUser::from(&session),
        error: query.error,
        templates: task_templates::all(),
        selected,
        title,
        description,
        due_date: due,
        cost,
        categories: options(Category::ALL, category, Category::as_str, Category::label),
        priorities: options(&Priority::ALL, priority, Priority::as_str, Priority::label),
        areas: options(Area::ALL, room, Area::as_str, Area::label),
    }
}

/// Validate the create form into service input.
fn parse_new_task(form: CreateTaskForm) -> Result<NewTask, String> {
    let category = parse_opt(Some(&form.category)).unwrap_or_default();
    let priority = parse_opt(Some(&form.priority)).unwrap_or_default();
    let room = parse_opt::<Area>(Some(&form.room));

    let due_date = match form.due_date.trim() {
        "" => None,
        raw => Some(
            NaiveDate::parse_from_str(raw, DATE_INPUT_FORMAT)
                .map_err(|_| "Please enter a valid due date.".to_owned())?,
        ),
    };
    let cost = Cost::parse_form(&form.cost).map_err(|e| format!("Invalid cost: {e}."))?;

    Ok(NewTask {
        title: form.title,
        description: form.description,
        category,
        priority,
        room,
        due_date,
        assignee: Some(form.assignee),
        cost: Some(cost),
    })
}

/// Create a task.
#[instrument(skip(store, form), fields(title = %form.title))]
pub async fn create(
    RequireSession { store, .. }: RequireSession,
    Form(form): Form<CreateTaskForm>,
) -> Result<Redirect, AppError> {
    let input = match parse_new_task(form) {
        Ok(input) => input,
        Err(message) => return Ok(Redirect::to(&with_error("/tasks/new", &message))),
    };
    match TaskStore::new(&store).create(input, Utc::now()) {
        Ok(task) => Ok(Redirect::to(&with_notice(
            "/tasks",
            &format!("Task \"{}\" created.", task.title),
        ))),
        Err(TaskError::MissingTitle) => Ok(Redirect::to(&with_error(
            "/tasks/new",
            &TaskError::MissingTitle.to_string(),
        ))),
        Err(err) => Err(err.into()),
    }
}

/// Change a task's status.
#[instrument(skip(store, form))]
pub async fn update_status(
    RequireSession { store, .. }: RequireSession,
    Path(id): Path<TaskId>,
    Form(form): Form<TaskActionForm>,
) -> Result<Redirect, AppError> {
    let status: TaskStatus = form
        .status
        .parse()
        .map_err(AppError::BadRequest)?;
    let task = TaskStore::new(&store).update_status(id, status, Utc::now())?;
    tracing::info!(task_id = %task.id, status = %task.status, "Task status changed");
    Ok(Redirect::to(back_target(form.back.as_deref())))
}

/// Delete a task.
#[instrument(skip(store, form))]
pub async fn delete(
    RequireSession { store, .. }: RequireSession,
    Path(id): Path<TaskId>,
    Form(form): Form<TaskActionForm>,
) -> Result<Redirect, AppError> {
    let removed = TaskStore::new(&store).delete(id, Utc::now())?;
    Ok(Redirect::to(&with_notice(
        back_target(form.back.as_deref()),
        &format!("Task \"{}\" deleted.", removed.title),
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::tasks::Facet;

    /// Parse a query string the way the extractor does.
    fn query(pairs: &str) -> TaskListQuery {
        let uri: axum::http::Uri = format!("/tasks?{pairs}").parse().unwrap();
        Query::<TaskListQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_params_round_trip_through_href() {
        let params = ListParams::from_query(&query(
            "search=gutter&status=pending&sort=due_date&dir=desc&facet=category&value=plumbing",
        ));
        assert_eq!(params.filter.search, "gutter");
        assert_eq!(params.filter.status, Some(TaskStatus::Pending));
        assert_eq!(
            params.sort,
            Some(SortSpec {
                field: SortField::DueDate,
                direction: SortDirection::Desc
            })
        );
        assert_eq!(params.filter.facet, Some(Facet::Category(Category::Plumbing)));

        let href = params.href();
        let again = ListParams::from_query(&query(href.trim_start_matches("/tasks?")));
        assert_eq!(again.href(), href);
    }

    #[test]
    fn test_malformed_params_are_ignored() {
        let params = ListParams::from_query(&query("status=bogus&sort=nope&facet=area&value=moon"));
        assert_eq!(params.filter.status, None);
        assert_eq!(params.sort, None);
        assert_eq!(params.filter.facet, None);
        assert_eq!(params.href(), "/tasks");
    }

    #[test]
    fn test_malformed_paging_falls_back_to_defaults() {
        let params = ListParams::from_query(&query("offset=abc&per_view=-2"));
        assert_eq!(params.offset, 0);
        assert_eq!(params.per_view, DEFAULT_PER_VIEW);

        let params = ListParams::from_query(&query("offset=8&per_view=50"));
        assert_eq!(params.offset, 8);
        assert_eq!(params.per_view, MAX_PER_VIEW);
    }

    #[test]
    fn test_summary_card_links_toggle() {
        let params = ListParams::from_query(&query("summary=overdue&status=pending"));
        let cards = summary_cards(&params, &summarize(&[], Utc::now()));
        let overdue = cards.iter().find(|c| c.key == "overdue").unwrap();
        assert!(overdue.active);
        assert_eq!(overdue.href, "/tasks?status=pending");
        let high = cards.iter().find(|c| c.key == "high_priority").unwrap();
        assert_eq!(high.href, "/tasks?summary=high_priority");
    }

    #[test]
    fn test_sort_links_toggle_direction() {
        let params = ListParams::from_query(&query("sort=title&dir=asc"));
        let links = sort_links(&params);
        let title = links.iter().find(|l| l.label == "Task").unwrap();
        assert_eq!(title.indicator, "▲");
        assert_eq!(title.href, "/tasks?sort=title&dir=desc");
        let cost = links.iter().find(|l| l.label == "Cost").unwrap();
        assert_eq!(cost.href, "/tasks?sort=cost&dir=asc");
    }

    #[test]
    fn test_back_target_stays_on_task_list() {
        assert_eq!(back_target(Some("/tasks?sort=cost&dir=asc")), "/tasks?sort=cost&dir=asc");
        assert_eq!(back_target(Some("https://evil.example")), "/tasks");
        assert_eq!(back_target(Some("/tasksomething")), "/tasks");
        assert_eq!(back_target(None), "/tasks");
    }

    #[test]
    fn test_parse_new_task() {
        let input = parse_new_task(CreateTaskForm {
            title: "Seal driveway".to_owned(),
            category: "structural".to_owned(),
            priority: "high".to_owned(),
            room: "exterior".to_owned(),
            due_date: "2024-05-01".to_owned(),
            cost: "$120".to_owned(),
            ..CreateTaskForm::default()
        })
        .unwrap();
        assert_eq!(input.category, Category::Structural);
        assert_eq!(input.priority, Priority::High);
        assert_eq!(input.room, Some(Area::Exterior));
        assert_eq!(input.due_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(input.cost, Some(Cost::dollars(120)));

        let err = parse_new_task(CreateTaskForm {
            title: "x".to_owned(),
            due_date: "next tuesday".to_owned(),
            ..CreateTaskForm::default()
        })
        .unwrap_err();
        assert_eq!(err, "Please enter a valid due date.");
    }
}
