//! Habit tracking and activity aggregation.
//!
//! A pure pipeline from a memo list to contribution-grid data:
//!
//! - [`parser`]: config lines, tag normalization, completed-habit extraction
//! - [`timeline`]: memo classification, config timeline, daily memo index
//! - [`aggregate`]: per-day and per-week aggregation, habit projection
//! - [`range`]: week / month / quarter / year selectors and bounds
//!
//! Nothing here performs I/O or returns errors; unrecognized input is skipped.

pub mod aggregate;
pub mod parser;
pub mod range;
pub mod timeline;
pub mod types;

pub use aggregate::{build_activity_weeks, build_day_data, ActivityIndex};
pub use parser::{
    build_daily_memo_content, build_habits_config_content, extract_completed_habits,
    normalize_habit_tag, parse_habit_config_line,
};
pub use range::{range_bounds, RangeKind, RangeSelector};
pub use timeline::{build_config_timeline, classify_memo, MemoKind};
pub use types::{
    ActivityMode, ActivityWeek, ActivityWeekData, ContributionDay, DailyMemoRef, HabitConfig,
    HabitStatus, HabitsConfigEntry, RangeBounds,
};
