//! Task explorer: per-category and per-area cards with carousel paging.

use std::ops::Range;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use homecare_core::{Area, Category, Cost, Priority, Task, TaskStatus};

use super::tasks::{Facet, percentage};

/// Explorer tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
    #[default]
    Category,
    Area,
}

impl FacetKind {
    pub const ALL: [Self; 2] = [Self::Category, Self::Area];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Area => "area",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Category => "By Type",
            Self::Area => "By Area",
        }
    }

    /// Every facet of this kind, in catalog order.
    fn facets(self) -> Vec<Facet> {
        match self {
            Self::Category => Category::ALL.iter().copied().map(Facet::Category).collect(),
            Self::Area => Area::ALL.iter().copied().map(Facet::Area).collect(),
        }
    }
}

impl std::str::FromStr for FacetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" | "type" => Ok(Self::Category),
            "area" => Ok(Self::Area),
            _ => Err(format!("invalid explorer tab: {s}")),
        }
    }
}

/// Parse a facet from a tab and a catalog id, as found in query strings.
#[must_use]
pub fn parse_facet(kind: FacetKind, value: &str) -> Option<Facet> {
    match kind {
        FacetKind::Category => value.parse().ok().map(Facet::Category),
        FacetKind::Area => value.parse().ok().map(Facet::Area),
    }
}

/// Tab and catalog id of a facet, the inverse of [`parse_facet`].
#[must_use]
pub const fn facet_key(facet: Facet) -> (FacetKind, &'static str) {
    match facet {
        Facet::Category(c) => (FacetKind::Category, c.as_str()),
        Facet::Area(a) => (FacetKind::Area, a.as_str()),
    }
}

/// Stats shown on one explorer card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetStats {
    pub facet: Facet,
    pub task_count: usize,
    pub completed: usize,
    pub overdue: usize,
    pub high_priority: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub total_cost: Cost,
    /// Completed share, rounded percent.
    pub progress: u32,
    /// Earliest due date among pending and in-progress tasks.
    pub next_due: Option<NaiveDate>,
}

impl FacetStats {
    fn collect(facet: Facet, tasks: &[Task]) -> Self {
        let matching: Vec<&Task> = tasks.iter().filter(|t| facet.matches(t)).collect();
        let with_status = |status: TaskStatus| matching.iter().filter(|t| t.status == status).count();
        let completed = with_status(TaskStatus::Completed);

        Self {
            facet,
            task_count: matching.len(),
            completed,
            overdue: with_status(TaskStatus::Overdue),
            high_priority: matching
                .iter()
                .filter(|t| t.priority == Priority::High)
                .count(),
            in_progress: with_status(TaskStatus::InProgress),
            pending: with_status(TaskStatus::Pending),
            total_cost: matching.iter().map(|t| t.cost).sum(),
            progress: percentage(completed, matching.len()),
            next_due: matching
                .iter()
                .filter(|t| matches!(t.status, TaskStatus::Pending | TaskStatus::InProgress))
                .filter_map(|t| t.due_date)
                .min(),
        }
    }

    /// Catalog id of the facet, used in links.
    #[must_use]
    pub const fn value(&self) -> &'static str {
        facet_key(self.facet).1
    }
}

/// Cards for every facet of `kind` that has at least one task.
#[must_use]
pub fn facet_stats(tasks: &[Task], kind: FacetKind) -> Vec<FacetStats> {
    kind.facets()
        .into_iter()
        .map(|facet| FacetStats::collect(facet, tasks))
        .filter(|stats| stats.task_count > 0)
        .collect()
}

/// A window of `per_view` items over `len`, starting at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    index: usize,
    per_view: usize,
    len: usize,
}

impl Carousel {
    /// A `per_view` of zero is treated as one. `index` is clamped.
    #[must_use]
    pub fn new(index: usize, per_view: usize, len: usize) -> Self {
        let per_view = per_view.max(1);
        let max_index = len.saturating_sub(per_view);
        Self {
            index: index.min(max_index),
            per_view,
            len,
        }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn max_index(&self) -> usize {
        self.len.saturating_sub(self.per_view)
    }

    #[must_use]
    pub const fn can_go_prev(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub const fn can_go_next(&self) -> bool {
        self.index < self.max_index()
    }

    /// Start index of the previous page.
    #[must_use]
    pub const fn prev(&self) -> usize {
        self.index.saturating_sub(self.per_view)
    }

    /// Start index of the next page.
    #[must_use]
    pub fn next(&self) -> usize {
        (self.index + self.per_view).min(self.max_index())
    }

    /// Item positions shown on the current page.
    #[must_use]
    pub fn visible(&self) -> Range<usize> {
        self.index..(self.index + self.per_view).min(self.len)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use homecare_core::TaskId;

    use super::*;

    fn task(
        category: Category,
        room: Area,
        status: TaskStatus,
        priority: Priority,
        cost: u32,
        due: Option<u32>,
    ) -> Task {
        Task {
            id: TaskId::new(1),
            title: "t".to_owned(),
            description: String::new(),
            category,
            priority,
            room,
            status,
            due_date: due.and_then(|d| NaiveDate::from_ymd_opt(2024, 1, d)),
            assignee: "Me".to_owned(),
            cost: Cost::dollars(cost),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            ai_generated: false,
        }
    }

    #[test]
    fn test_facet_stats() {
        let tasks = vec![
            task(Category::Plumbing, Area::Kitchen, TaskStatus::Completed, Priority::Low, 50, Some(5)),
            task(Category::Plumbing, Area::Bathroom, TaskStatus::Pending, Priority::High, 75, Some(20)),
            task(Category::Plumbing, Area::Kitchen, TaskStatus::InProgress, Priority::Medium, 0, Some(12)),
            task(Category::Plumbing, Area::Kitchen, TaskStatus::Overdue, Priority::High, 25, Some(2)),
            task(Category::Safety, Area::Kitchen, TaskStatus::Pending, Priority::High, 15, None),
        ];
        let stats = facet_stats(&tasks, FacetKind::Category);
        assert_eq!(stats.len(), 2);
        let plumbing = &stats[0];
        assert_eq!(plumbing.facet, Facet::Category(Category::Plumbing));
        assert_eq!(plumbing.task_count, 4);
        assert_eq!(plumbing.completed, 1);
        assert_eq!(plumbing.overdue, 1);
        assert_eq!(plumbing.high_priority, 2);
        assert_eq!(plumbing.in_progress, 1);
        assert_eq!(plumbing.pending, 1);
        assert_eq!(plumbing.total_cost, Cost::dollars(150));
        assert_eq!(plumbing.progress, 25);
        assert_eq!(plumbing.next_due, NaiveDate::from_ymd_opt(2024, 1, 12));
        assert_eq!(plumbing.value(), "plumbing");

        let areas = facet_stats(&tasks, FacetKind::Area);
        let names: Vec<&str> = areas.iter().map(FacetStats::value).collect();
        assert_eq!(names, vec!["kitchen", "bathroom"]);
    }

    #[test]
    fn test_facet_stats_empty() {
        assert!(facet_stats(&[], FacetKind::Area).is_empty());
    }

    #[test]
    fn test_parse_facet() {
        assert_eq!(
            parse_facet(FacetKind::Area, "whole_home"),
            Some(Facet::Area(Area::WholeHome))
        );
        assert_eq!(parse_facet(FacetKind::Category, "kitchen"), None);
        assert_eq!("type".parse::<FacetKind>().unwrap(), FacetKind::Category);
    }

    #[test]
    fn test_carousel_paging() {
        let c = Carousel::new(0, 3, 8);
        assert_eq!(c.max_index(), 5);
        assert!(!c.can_go_prev());
        assert_eq!(c.next(), 3);
        assert_eq!(c.visible(), 0..3);

        let c = Carousel::new(c.next(), 3, 8);
        assert_eq!(c.next(), 5);
        assert_eq!(c.prev(), 0);

        let c = Carousel::new(5, 3, 8);
        assert!(!c.can_go_next());
        assert_eq!(c.next(), 5);
        assert_eq!(c.prev(), 2);
        assert_eq!(c.visible(), 5..8);
    }

    #[test]
    fn test_carousel_clamps() {
        let c = Carousel::new(40, 6, 4);
        assert_eq!(c.index(), 0);
        assert_eq!(c.visible(), 0..4);
        assert!(!c.can_go_next());

        let c = Carousel::new(2, 0, 4);
        assert_eq!(c.visible(), 2..3);
    }
}
