//! Reminder cards for tasks that need attention soon.
//!
//! A card's life is a fixed timeline: it enters, stays visible, exits and is
//! removed. [`CardSchedule::phase`] computes where a card is at a given
//! elapsed time so that renderers (CSS animation delays, JSON clients) never
//! need their own timers.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use homecare_core::{Priority, Task, TaskId};

/// Days ahead that still count as "due soon".
pub const DUE_SOON_DAYS: i64 = 3;

/// How pressing a task is, by calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Upcoming,
    DueSoon,
    DueToday,
    Overdue,
}

impl Urgency {
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Overdue => 3,
            Self::DueToday => 2,
            Self::DueSoon => 1,
            Self::Upcoming => 0,
        }
    }

    /// Whether a card is shown for this urgency.
    #[must_use]
    pub const fn is_shown(self) -> bool {
        !matches!(self, Self::Upcoming)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::DueToday => "due_today",
            Self::DueSoon => "due_soon",
            Self::Upcoming => "upcoming",
        }
    }

    /// Classify a due date against today's date.
    #[must_use]
    pub fn classify(due: NaiveDate, today: NaiveDate) -> Self {
        let days = (due - today).num_days();
        match days {
            d if d < 0 => Self::Overdue,
            0 => Self::DueToday,
            d if d <= DUE_SOON_DAYS => Self::DueSoon,
            _ => Self::Upcoming,
        }
    }
}

/// Where a card is in its timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardPhase {
    Entering,
    Visible,
    Exiting,
    Removed,
}

/// Timing of a card group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardSchedule {
    pub stagger: Duration,
    pub visible: Duration,
    pub exit: Duration,
    /// Extra time after the last card's visible window before the group clears.
    pub linger: Duration,
    pub max_cards: usize,
}

impl Default for CardSchedule {
    fn default() -> Self {
        Self {
            stagger: Duration::from_millis(500),
            visible: Duration::from_millis(3000),
            exit: Duration::from_millis(1000),
            linger: Duration::from_millis(2000),
            max_cards: 3,
        }
    }
}

impl CardSchedule {
    /// When card `index` becomes visible.
    #[must_use]
    pub fn appear_at(&self, index: usize) -> Duration {
        self.stagger * u32::try_from(index).unwrap_or(u32::MAX)
    }

    /// When card `index` starts exiting.
    #[must_use]
    pub fn exit_at(&self, index: usize) -> Duration {
        self.appear_at(index) + self.visible
    }

    /// When card `index` is gone.
    #[must_use]
    pub fn removed_at(&self, index: usize) -> Duration {
        self.exit_at(index) + self.exit
    }

    /// When a group of `count` cards is cleared.
    #[must_use]
    pub fn group_clear(&self, count: usize) -> Duration {
        self.appear_at(count.saturating_sub(1)) + self.visible + self.linger
    }

    /// Phase of card `index` out of `count` after `elapsed`.
    #[must_use]
    pub fn phase(&self, index: usize, count: usize, elapsed: Duration) -> CardPhase {
        if index >= count || elapsed >= self.group_clear(count) {
            return CardPhase::Removed;
        }
        if elapsed < self.appear_at(index) {
            CardPhase::Entering
        } else if elapsed < self.exit_at(index) {
            CardPhase::Visible
        } else if elapsed < self.removed_at(index) {
            CardPhase::Exiting
        } else {
            CardPhase::Removed
        }
    }
}

/// One card with its timeline in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderCard {
    pub task_id: TaskId,
    pub title: String,
    pub room: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub urgency: Urgency,
    pub days_overdue: Option<i64>,
    pub badge: String,
    pub appear_at_ms: u64,
    pub exit_at_ms: u64,
    pub removed_at_ms: u64,
}

/// The cards for one page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminders {
    pub cards: Vec<ReminderCard>,
    pub group_clear_ms: u64,
}

impl Reminders {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn badge(urgency: Urgency, days_overdue: Option<i64>) -> String {
    match (urgency, days_overdue) {
        (Urgency::Overdue, Some(days)) if days > 0 => format!("{days}d overdue"),
        (Urgency::Overdue, _) => "Overdue".to_owned(),
        (Urgency::DueToday, _) => "Due Today".to_owned(),
        (Urgency::DueSoon, _) => "Due Soon".to_owned(),
        (Urgency::Upcoming, _) => "Upcoming".to_owned(),
    }
}

/// Pick and schedule the cards for `tasks`.
///
/// Completed and undated tasks are skipped, as are upcoming ones. The rest
/// are ordered by urgency then priority, most pressing first, and cut to
/// `schedule.max_cards`.
#[must_use]
pub fn build(tasks: &[Task], now: DateTime<Utc>, schedule: &CardSchedule) -> Reminders {
    let today = now.date_naive();
    let mut picked: Vec<(&Task, NaiveDate, Urgency)> = tasks
        .iter()
        .filter(|t| !t.is_completed())
        .filter_map(|t| t.due_date.map(|due| (t, due, Urgency::classify(due, today))))
        .filter(|(_, _, urgency)| urgency.is_shown())
        .collect();

    picked.sort_by(|a, b| {
        b.2.rank()
            .cmp(&a.2.rank())
            .then_with(|| b.0.priority.rank().cmp(&a.0.priority.rank()))
    });
    picked.truncate(schedule.max_cards);

    let cards: Vec<ReminderCard> = picked
        .into_iter()
        .enumerate()
        .map(|(index, (task, due, urgency))| {
            let days_overdue =
                (urgency == Urgency::Overdue).then(|| (today - due).num_days());
            ReminderCard {
                task_id: task.id,
                title: task.title.clone(),
                room: task.room.label().to_owned(),
                due_date: due,
                priority: task.priority,
                urgency,
                days_overdue,
                badge: badge(urgency, days_overdue),
                appear_at_ms: millis(schedule.appear_at(index)),
                exit_at_ms: millis(schedule.exit_at(index)),
                removed_at_ms: millis(schedule.removed_at(index)),
            }
        })
        .collect();

    let group_clear_ms = if cards.is_empty() {
        0
    } else {
        millis(schedule.group_clear(cards.len()))
    };
    Reminders {
        cards,
        group_clear_ms,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use homecare_core::{Area, Category, Cost, TaskStatus};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 20, 10, 0, 0).unwrap()
    }

    fn task(id: i64, due: Option<(u32, u32)>, priority: Priority, status: TaskStatus) -> Task {
        Task {
            id: TaskId::new(id),
            title: format!("Task {id}"),
            description: String::new(),
            category: Category::Maintenance,
            priority,
            room: Area::Kitchen,
            status,
            due_date: due.and_then(|(m, d)| NaiveDate::from_ymd_opt(2024, m, d)),
            assignee: "Me".to_owned(),
            cost: Cost::ZERO,
            created_at: now(),
            ai_generated: false,
        }
    }

    #[test]
    fn test_classify() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        assert_eq!(Urgency::classify(day(18), today), Urgency::Overdue);
        assert_eq!(Urgency::classify(day(20), today), Urgency::DueToday);
        assert_eq!(Urgency::classify(day(23), today), Urgency::DueSoon);
        assert_eq!(Urgency::classify(day(24), today), Urgency::Upcoming);
    }

    #[test]
    fn test_build_orders_by_urgency_then_priority() {
        let tasks = vec![
            task(1, Some((1, 22)), Priority::High, TaskStatus::Pending),
            task(2, Some((1, 20)), Priority::Medium, TaskStatus::Pending),
            task(3, Some((1, 18)), Priority::Low, TaskStatus::Overdue),
            task(4, Some((1, 21)), Priority::Low, TaskStatus::Pending),
            task(5, Some((1, 21)), Priority::High, TaskStatus::InProgress),
        ];
        let reminders = build(&tasks, now(), &CardSchedule::default());
        let ids: Vec<i64> = reminders.cards.iter().map(|c| c.task_id.as_i64()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(reminders.cards[0].badge, "2d overdue");
        assert_eq!(reminders.cards[0].days_overdue, Some(2));
        assert_eq!(reminders.cards[1].badge, "Due Today");
        assert_eq!(reminders.cards[2].days_overdue, None);
    }

    #[test]
    fn test_build_skips_completed_undated_and_upcoming() {
        let tasks = vec![
            task(1, Some((1, 10)), Priority::High, TaskStatus::Completed),
            task(2, None, Priority::High, TaskStatus::Pending),
            task(3, Some((2, 15)), Priority::High, TaskStatus::Pending),
        ];
        let reminders = build(&tasks, now(), &CardSchedule::default());
        assert!(reminders.is_empty());
        assert_eq!(reminders.group_clear_ms, 0);
    }

    #[test]
    fn test_schedule_timeline() {
        let tasks = vec![
            task(1, Some((1, 19)), Priority::High, TaskStatus::Pending),
            task(2, Some((1, 20)), Priority::High, TaskStatus::Pending),
            task(3, Some((1, 21)), Priority::High, TaskStatus::Pending),
        ];
        let reminders = build(&tasks, now(), &CardSchedule::default());
        let card = &reminders.cards[2];
        assert_eq!(card.appear_at_ms, 1000);
        assert_eq!(card.exit_at_ms, 4000);
        assert_eq!(card.removed_at_ms, 5000);
        assert_eq!(reminders.group_clear_ms, 6000);
    }

    #[test]
    fn test_phases_are_monotone_and_end_removed() {
        let schedule = CardSchedule::default();
        for count in 1..=3 {
            let clear = schedule.group_clear(count);
            for index in 0..count {
                let mut last = CardPhase::Entering;
                let mut ms = 0;
                while ms <= millis(clear) + 100 {
                    let phase = schedule.phase(index, count, Duration::from_millis(ms));
                    assert!(phase >= last, "card {index} went back at {ms}ms");
                    last = phase;
                    ms += 50;
                }
                assert_eq!(schedule.phase(index, count, clear), CardPhase::Removed);
            }
        }
    }

    #[test]
    fn test_phase_boundaries() {
        let schedule = CardSchedule::default();
        let at = Duration::from_millis;
        assert_eq!(schedule.phase(1, 3, at(499)), CardPhase::Entering);
        assert_eq!(schedule.phase(1, 3, at(500)), CardPhase::Visible);
        assert_eq!(schedule.phase(1, 3, at(3500)), CardPhase::Exiting);
        assert_eq!(schedule.phase(1, 3, at(4500)), CardPhase::Removed);
        assert_eq!(schedule.phase(3, 3, at(0)), CardPhase::Removed);
    }
}
