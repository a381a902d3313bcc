//! Habit and activity data model.
//!
//! [`HabitConfig`] and [`HabitsConfigEntry`] are parsed from configuration memos.
//! Everything else here ([`ContributionDay`], [`ActivityWeek`], [`ActivityWeekData`])
//! is derived view data, recomputed on every aggregation and never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque material green, used when a config line has no usable colour.
pub const DEFAULT_HABIT_COLOR: u32 = 0xFF4C_AF50;

/// One tracked habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitConfig {
    /// Canonical identifier, always `#habits/<slug>`.
    pub tag: String,
    pub label: String,
    /// ARGB colour.
    pub color: u32,
}

/// A configuration snapshot, effective from `effective_date` until the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitsConfigEntry {
    pub effective_date: NaiveDate,
    pub habits: Vec<HabitConfig>,
    pub source_memo_id: String,
}

/// What a contribution grid counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityMode {
    /// Completed habits per day, from `#habits/daily` memos.
    #[default]
    Habits,
    /// Plain posts per day.
    Posts,
}

impl ActivityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Habits => "habits",
            Self::Posts => "posts",
        }
    }
}

impl std::fmt::Display for ActivityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "habits" => Ok(Self::Habits),
            "posts" => Ok(Self::Posts),
            _ => Err(format!("unknown activity mode: {s}")),
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RangeBounds {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStatus {
    pub tag: String,
    pub label: String,
    pub done: bool,
}

/// The daily memo behind a contribution day, if one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMemoRef {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub completed_count: u32,
    pub total_habits: u32,
    /// `completed_count / total_habits`, or `0.0` when there are no habits.
    pub completion_ratio: f64,
    pub habit_statuses: Vec<HabitStatus>,
    pub daily_memo: Option<DailyMemoRef>,
    pub in_range: bool,
    pub is_clickable: bool,
}

/// Monday-to-Sunday block of days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityWeek {
    pub week_start: NaiveDate,
    pub days: Vec<ContributionDay>,
    pub weekly_count: u32,
}

impl ActivityWeek {
    /// Build a week, summing `completed_count` over its days.
    pub fn new(week_start: NaiveDate, days: Vec<ContributionDay>) -> Self {
        let weekly_count = days.iter().map(|d| d.completed_count).sum();
        Self {
            week_start,
            days,
            weekly_count,
        }
    }
}

/// Weeks covering a range plus the maxima used for chart intensity scaling.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityWeekData {
    pub weeks: Vec<ActivityWeek>,
    pub max_daily: u32,
    pub max_weekly: u32,
}

impl ActivityWeekData {
    /// Wrap weeks and derive `max_daily` / `max_weekly` from them.
    pub fn from_weeks(weeks: Vec<ActivityWeek>) -> Self {
        let max_daily = weeks
            .iter()
            .flat_map(|w| w.days.iter())
            .map(|d| d.completed_count)
            .max()
            .unwrap_or(0);
        let max_weekly = weeks.iter().map(|w| w.weekly_count).max().unwrap_or(0);
        Self {
            weeks,
            max_daily,
            max_weekly,
        }
    }
}

pub(crate) fn completion_ratio(completed: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        (completed as f64 / total as f64).clamp(0.0, 1.0)
    }
}
