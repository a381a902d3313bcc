//! CLI `check` command: show or set which habits were done on a day.

use anyhow::{bail, Result};
use std::collections::HashSet;

use vibits::config::VibitsConfig;
use vibits::habits::{normalize_habit_tag, ActivityMode, ContributionDay, RangeBounds};
use vibits::state::activity::{ActivityAction, ActivityState};

use super::{activity_store, local_today, parse_day};

/// Print the day's habits, or mark exactly `tags` as done (`clear` marks none).
pub async fn check(config: &VibitsConfig, date: &str, tags: &[String], clear: bool) -> Result<()> {
    let (today, offset) = local_today();
    let date = parse_day(date, today)?;

    let editing = clear || !tags.is_empty();
    let store = activity_store(config, ActivityState::new(today, offset), editing)?;
    store.send(ActivityAction::Load);
    let state = store.settle().await;
    if let Some(error) = state.error {
        bail!("failed to load memos: {error}");
    }

    let bounds = RangeBounds::new(date, date);
    let day = state.index.build_day(date, &bounds, ActivityMode::Habits, today);
    if !editing {
        print_day(&day);
        return Ok(());
    }

    if !day.is_clickable {
        bail!("{date} cannot be edited: it is in the future or before the first habit config");
    }
    let done: HashSet<String> = tags.iter().map(|t| normalize_habit_tag(t)).collect();
    let known: HashSet<&str> = day.habit_statuses.iter().map(|s| s.tag.as_str()).collect();
    let mut unknown: Vec<&str> = done
        .iter()
        .map(String::as_str)
        .filter(|t| !known.contains(t))
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        bail!("not configured on {date}: {}", unknown.join(", "));
    }

    store.send(ActivityAction::SetDayHabits { date, done });
    let state = store.settle().await;
    if let Some(error) = state.error {
        bail!("failed to save daily memo: {error}");
    }

    let day = state.index.build_day(date, &bounds, ActivityMode::Habits, today);
    print_day(&day);
    Ok(())
}

fn print_day(day: &ContributionDay) {
    println!(
        "{}: {}/{} habits",
        day.date.format("%Y-%m-%d"),
        day.completed_count,
        day.total_habits
    );
    if day.habit_statuses.is_empty() {
        println!("  (no habits configured)");
    }
    for status in &day.habit_statuses {
        let mark = if status.done { 'x' } else { ' ' };
        println!("  [{mark}] {} ({})", status.label, status.tag);
    }
}
