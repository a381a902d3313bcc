//! Memo classification and the per-memo-list indexes the aggregator reads:
//! the habit configuration timeline, daily memos by date, and post counts by date.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::parser::{parse_habit_config_line, CONFIG_MARKER, DAILY_MARKER};
use super::types::{DailyMemoRef, HabitConfig, HabitsConfigEntry};
use crate::memo::Memo;

/// What a memo means to the activity engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoKind {
    /// Starts with `#habits/config`.
    HabitConfig,
    /// Starts with `#habits/daily <date>`.
    DailyHabit(NaiveDate),
    /// Anything else.
    Post,
}

/// Classify a memo by its content. Case-sensitive, leading whitespace ignored.
pub fn classify_memo(content: &str) -> MemoKind {
    let trimmed = content.trim();

    if trimmed.starts_with(CONFIG_MARKER) {
        return MemoKind::HabitConfig;
    }

    if let Some(rest) = trimmed.strip_prefix(DAILY_MARKER) {
        let first_line = rest.lines().next().unwrap_or("");
        if first_line.starts_with(char::is_whitespace) {
            let date = first_line
                .split_whitespace()
                .next()
                .and_then(|token| NaiveDate::parse_from_str(token, "%Y-%m-%d").ok());
            if let Some(date) = date {
                return MemoKind::DailyHabit(date);
            }
        }
    }

    MemoKind::Post
}

/// Habits declared in a config memo body. The marker line is skipped,
/// unparseable lines are dropped, and a repeated tag keeps its first line.
pub fn parse_config_body(content: &str) -> Vec<HabitConfig> {
    let mut seen = HashSet::new();
    content
        .trim_start()
        .lines()
        .skip(1)
        .filter_map(parse_habit_config_line)
        .filter(|habit| seen.insert(habit.tag.clone()))
        .collect()
}

/// Build the configuration timeline, ascending by effective date.
///
/// Config memos without any usable timestamp cannot be ordered and are left out.
/// Entries on the same date keep instant order, so the later config wins.
pub fn build_config_timeline(memos: &[Memo], offset: FixedOffset) -> Vec<HabitsConfigEntry> {
    let mut dated: Vec<(DateTime<Utc>, HabitsConfigEntry)> = Vec::new();

    for memo in memos {
        if classify_memo(&memo.content) != MemoKind::HabitConfig {
            continue;
        }
        let Some(instant) = memo.timestamp() else {
            debug!(memo_id = %memo.id, "config memo has no timestamp, skipping");
            continue;
        };
        dated.push((
            instant,
            HabitsConfigEntry {
                effective_date: instant.with_timezone(&offset).date_naive(),
                habits: parse_config_body(&memo.content),
                source_memo_id: memo.id.clone(),
            },
        ));
    }

    dated.sort_by_key(|(instant, _)| *instant);
    dated.into_iter().map(|(_, entry)| entry).collect()
}

/// The last timeline entry effective on or before `date`.
pub fn applicable_config(timeline: &[HabitsConfigEntry], date: NaiveDate) -> Option<&HabitsConfigEntry> {
    let idx = timeline.partition_point(|entry| entry.effective_date <= date);
    idx.checked_sub(1).map(|i| &timeline[i])
}

/// Daily habit memos keyed by the date written in their content.
///
/// With several memos for one date the most recently created wins; a memo with
/// a timestamp beats one without, and ties go to the later memo in the list.
pub fn index_daily_memos(memos: &[Memo]) -> HashMap<NaiveDate, DailyMemoRef> {
    let mut best: HashMap<NaiveDate, (Option<DateTime<Utc>>, DailyMemoRef)> = HashMap::new();

    for memo in memos {
        let MemoKind::DailyHabit(date) = classify_memo(&memo.content) else {
            continue;
        };
        let instant = memo.timestamp();
        let replace = best
            .get(&date)
            .map_or(true, |(current, _)| instant >= *current);
        if replace {
            best.insert(
                date,
                (
                    instant,
                    DailyMemoRef {
                        id: memo.id.clone(),
                        content: memo.content.clone(),
                    },
                ),
            );
        }
    }

    best.into_iter()
        .map(|(date, (_, memo_ref))| (date, memo_ref))
        .collect()
}

/// Count plain posts per calendar date. Timestampless posts are not counted.
pub fn count_posts_by_date(memos: &[Memo], offset: FixedOffset) -> HashMap<NaiveDate, u32> {
    let mut counts = HashMap::new();
    for memo in memos {
        if classify_memo(&memo.content) != MemoKind::Post {
            continue;
        }
        if let Some(date) = memo.date_in(offset) {
            *counts.entry(date).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn classifies_memos() {
        assert_eq!(classify_memo("  #habits/config\nRun"), MemoKind::HabitConfig);
        assert_eq!(
            classify_memo("#habits/daily 2024-01-15\n- [x] run"),
            MemoKind::DailyHabit(date(2024, 1, 15))
        );
        assert_eq!(classify_memo("#habits/daily someday"), MemoKind::Post);
        assert_eq!(classify_memo("#habits/daily\n2024-01-15"), MemoKind::Post);
        assert_eq!(classify_memo("#habits/daily2024-01-15"), MemoKind::Post);
        assert_eq!(classify_memo("#Habits/config"), MemoKind::Post);
        assert_eq!(classify_memo("just a thought"), MemoKind::Post);
    }

    #[test]
    fn config_body_skips_marker_and_junk() {
        let habits = parse_config_body("#habits/config\nRun | run\n\n | \nRead");
        let tags: Vec<&str> = habits.iter().map(|h| h.tag.as_str()).collect();
        assert_eq!(tags, vec!["#habits/run", "#habits/Read"]);
    }

    #[test]
    fn config_body_keeps_first_of_repeated_tags() {
        let habits = parse_config_body("#habits/config\nRun | run\nJog | #habits/run\nRead");
        let labels: Vec<&str> = habits.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["Run", "Read"]);
    }

    #[test]
    fn timeline_is_sorted_and_skips_timestampless() {
        let memos = vec![
            Memo::new("c3", "#habits/config\nC").created("2024-03-01T09:00:00Z"),
            Memo::new("c1", "#habits/config\nA").created("2024-01-01T09:00:00Z"),
            Memo::new("nots", "#habits/config\nX"),
            Memo::new("c2", "#habits/config\nB").updated("2024-02-01T09:00:00Z"),
            Memo::new("post", "hello").created("2024-01-05T09:00:00Z"),
        ];
        let timeline = build_config_timeline(&memos, utc());
        let ids: Vec<&str> = timeline.iter().map(|e| e.source_memo_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn applicable_config_picks_last_on_or_before() {
        let memos = vec![
            Memo::new("jan", "#habits/config\nA").created("2024-01-01T00:00:00Z"),
            Memo::new("mar", "#habits/config\nC").created("2024-03-01T00:00:00Z"),
            Memo::new("feb", "#habits/config\nB").created("2024-02-01T00:00:00Z"),
        ];
        let timeline = build_config_timeline(&memos, utc());

        assert!(applicable_config(&timeline, date(2023, 12, 31)).is_none());
        assert_eq!(applicable_config(&timeline, date(2024, 1, 1)).unwrap().source_memo_id, "jan");
        assert_eq!(applicable_config(&timeline, date(2024, 2, 15)).unwrap().source_memo_id, "feb");
        assert_eq!(applicable_config(&timeline, date(2024, 3, 1)).unwrap().source_memo_id, "mar");
    }

    #[test]
    fn same_day_configs_prefer_later_instant() {
        let memos = vec![
            Memo::new("evening", "#habits/config\nB").created("2024-01-01T20:00:00Z"),
            Memo::new("morning", "#habits/config\nA").created("2024-01-01T08:00:00Z"),
        ];
        let timeline = build_config_timeline(&memos, utc());
        assert_eq!(
            applicable_config(&timeline, date(2024, 1, 1)).unwrap().source_memo_id,
            "evening"
        );
    }

    #[test]
    fn duplicate_daily_memos_most_recent_wins() {
        let memos = vec![
            Memo::new("new", "#habits/daily 2024-01-15\n#habits/run").created("2024-01-15T20:00:00Z"),
            Memo::new("old", "#habits/daily 2024-01-15\n#habits/read").created("2024-01-15T08:00:00Z"),
            Memo::new("bare", "#habits/daily 2024-01-15"),
        ];
        let index = index_daily_memos(&memos);
        assert_eq!(index[&date(2024, 1, 15)].id, "new");
    }

    #[test]
    fn daily_memo_keyed_by_content_date() {
        let memos = vec![
            Memo::new("late", "#habits/daily 2024-01-14\n#habits/run").created("2024-01-16T08:00:00Z"),
        ];
        let index = index_daily_memos(&memos);
        assert!(index.contains_key(&date(2024, 1, 14)));
        assert!(!index.contains_key(&date(2024, 1, 16)));
    }

    #[test]
    fn post_counts_ignore_habit_memos() {
        let memos = vec![
            Memo::new("p1", "coffee").created("2024-01-15T08:00:00Z"),
            Memo::new("p2", "lunch").created("2024-01-15T12:00:00Z"),
            Memo::new("p3", "dinner").updated("2024-01-16T19:00:00Z"),
            Memo::new("p4", "undated"),
            Memo::new("d1", "#habits/daily 2024-01-15").created("2024-01-15T21:00:00Z"),
            Memo::new("c1", "#habits/config\nRun").created("2024-01-15T21:00:00Z"),
        ];
        let counts = count_posts_by_date(&memos, utc());
        assert_eq!(counts[&date(2024, 1, 15)], 2);
        assert_eq!(counts[&date(2024, 1, 16)], 1);
        assert_eq!(counts.values().sum::<u32>(), 3);
    }
}
