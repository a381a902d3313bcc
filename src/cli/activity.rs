//! CLI `activity` command: render a contribution grid in the terminal.

use anyhow::{bail, Result};
use std::fmt::Write as _;

use vibits::config::VibitsConfig;
use vibits::habits::{normalize_habit_tag, ActivityMode, ActivityWeekData, RangeKind, RangeSelector};
use vibits::prefs::{self, ACTIVITY_MODE_KEY, RANGE_KIND_KEY};
use vibits::state::activity::{ActivityAction, ActivityState};

use super::{activity_store, local_today, parse_day, with_prefs};

/// Intensity levels, lowest first. `.` is an in-range day with nothing done.
const LEVELS: [char; 4] = ['-', '=', '+', '#'];

pub struct ActivityArgs {
    pub range: Option<RangeKind>,
    pub date: Option<String>,
    pub mode: Option<ActivityMode>,
    pub habit: Option<String>,
}

pub async fn activity(config: &VibitsConfig, args: ActivityArgs) -> Result<()> {
    let (today, offset) = local_today();
    let anchor = match &args.date {
        Some(raw) => parse_day(raw, today)?,
        None => today,
    };

    // explicit flags win, then the last choice, then config defaults
    let (mode, kind) = with_prefs(config, |store| {
        let mode = match args.mode {
            Some(mode) => mode,
            None => prefs::load_json(store, ACTIVITY_MODE_KEY)?
                .unwrap_or(config.app.default_activity_mode),
        };
        let kind = match args.range {
            Some(kind) => kind,
            None => prefs::load_json(store, RANGE_KIND_KEY)?.unwrap_or_default(),
        };
        prefs::save_json(store, ACTIVITY_MODE_KEY, &mode)?;
        prefs::save_json(store, RANGE_KIND_KEY, &kind)?;
        Ok((mode, kind))
    })?;

    let initial = ActivityState::new(today, offset)
        .with_mode(mode)
        .with_range(RangeSelector::containing(kind, anchor));
    let store = activity_store(config, initial, false)?;
    store.send(ActivityAction::Load);
    if let Some(habit) = &args.habit {
        store.send(ActivityAction::SelectHabit(Some(normalize_habit_tag(habit))));
    }
    let state = store.settle().await;
    if let Some(error) = state.error {
        bail!("failed to load memos: {error}");
    }

    let title = match &state.habit_filter {
        Some(tag) => format!("{} · {} · {tag}", state.range.label(), state.mode),
        None => format!("{} · {}", state.range.label(), state.mode),
    };
    println!("{title}");
    println!("{}", "=".repeat(title.chars().count()));
    print!("{}", render_grid(&state.data));
    println!();
    println!("Max per day:  {}", state.data.max_daily);
    println!("Max per week: {}", state.data.max_weekly);

    let recent = state.data.last_seven_days();
    if !recent.is_empty() {
        println!();
        println!("Last {} days:", recent.len());
        for day in recent {
            if state.mode == ActivityMode::Habits {
                println!(
                    "  {}  {}/{} ({:.0}%)",
                    day.date.format("%a %Y-%m-%d"),
                    day.completed_count,
                    day.total_habits,
                    day.completion_ratio * 100.0
                );
            } else {
                println!("  {}  {} posts", day.date.format("%a %Y-%m-%d"), day.completed_count);
            }
        }
    }
    Ok(())
}

/// One row per week: week start, seven cells, weekly total. Days outside
/// the range are blank; others scale against `max_daily`.
pub fn render_grid(data: &ActivityWeekData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<10} Mo Tu We Th Fr Sa Su  total", "");

    for week in &data.weeks {
        let _ = write!(out, "{}", week.week_start.format("%Y-%m-%d"));
        for day in &week.days {
            let _ = write!(out, "  {}", cell(day.completed_count, data.max_daily, day.in_range));
        }
        let _ = writeln!(out, "  {:>5}", week.weekly_count);
    }
    out
}

fn cell(count: u32, max: u32, in_range: bool) -> char {
    if !in_range {
        return ' ';
    }
    if count == 0 || max == 0 {
        return '.';
    }
    let levels = LEVELS.len() as u32;
    // ceil(count / max * levels), at least the first level
    let level = (count * levels).div_ceil(max).clamp(1, levels);
    LEVELS[(level - 1) as usize]
}
