//! Habit tag parsing: config lines, tag normalization, and completion extraction.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::types::{HabitConfig, DEFAULT_HABIT_COLOR};

/// Canonical prefix of every habit tag.
pub const HABIT_TAG_PREFIX: &str = "#habits/";
/// Older singular prefix, still accepted on input.
const LEGACY_TAG_PREFIX: &str = "#habit/";
/// First token of a habit configuration memo.
pub const CONFIG_MARKER: &str = "#habits/config";
/// First token of a daily habit memo, followed by `YYYY-MM-DD`.
pub const DAILY_MARKER: &str = "#habits/daily";

/// Markdown task line, checked or unchecked. Group 1 is the box, group 2 the text.
static CHECKBOX_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-*]\s*\[( |x|X)\]\s+(.+)$").expect("valid regex"));

static HABIT_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#habits/[^\s]+").expect("valid regex"));

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Parse one `label | tag | color` line of a configuration memo.
///
/// Returns `None` for blank lines. A single part is read as a tag when it
/// carries a habit prefix, otherwise as a label whose tag is derived from it.
pub fn parse_habit_config_line(line: &str) -> Option<HabitConfig> {
    let parts: Vec<&str> = line
        .splitn(3, '|')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [] => None,
        [single] if has_tag_prefix(single) => {
            let tag = normalize_habit_tag(single);
            let label = tag_slug(&tag).replace('_', " ");
            if label.trim().is_empty() {
                return None;
            }
            Some(HabitConfig {
                tag,
                label,
                color: DEFAULT_HABIT_COLOR,
            })
        }
        [single] => Some(HabitConfig {
            tag: normalize_habit_tag(single),
            label: (*single).to_string(),
            color: DEFAULT_HABIT_COLOR,
        }),
        [label, tag] => Some(HabitConfig {
            tag: normalize_habit_tag(tag),
            label: (*label).to_string(),
            color: DEFAULT_HABIT_COLOR,
        }),
        [label, tag, color, ..] => Some(HabitConfig {
            tag: normalize_habit_tag(tag),
            label: (*label).to_string(),
            color: parse_color(color).unwrap_or(DEFAULT_HABIT_COLOR),
        }),
    }
}

/// Canonicalize a tag to `#habits/<slug>`. Idempotent.
///
/// Strips one leading `#habits/` or `#habit/` and collapses whitespace runs to `_`.
pub fn normalize_habit_tag(raw: &str) -> String {
    let trimmed = raw.trim();
    let slug = trimmed
        .strip_prefix(HABIT_TAG_PREFIX)
        .or_else(|| trimmed.strip_prefix(LEGACY_TAG_PREFIX))
        .unwrap_or(trimmed);
    let slug = WHITESPACE_RUN.replace_all(slug.trim(), "_");
    format!("{HABIT_TAG_PREFIX}{slug}")
}

/// Which of `known_tags` the content marks as done.
///
/// If the content has any markdown checkbox line, only checked lines count and
/// each contributes the first known tag found in its text. Otherwise every
/// `#habits/...` token is matched against `known_tags`. The two modes never mix:
/// one checkbox anywhere disables plain-tag scanning for the whole memo.
pub fn extract_completed_habits(content: &str, known_tags: &[String]) -> HashSet<String> {
    let mut completed = HashSet::new();
    let mut checkbox_mode = false;

    for line in content.lines() {
        let Some(caps) = CHECKBOX_LINE.captures(line) else {
            continue;
        };
        checkbox_mode = true;
        if !caps[1].eq_ignore_ascii_case("x") {
            continue;
        }
        let text = &caps[2];
        if let Some(tag) = known_tags.iter().find(|tag| text.contains(tag.as_str())) {
            completed.insert(tag.clone());
        }
    }

    if checkbox_mode {
        return completed;
    }

    for found in HABIT_TAG.find_iter(content) {
        let tag = found.as_str();
        if tag == DAILY_MARKER {
            continue;
        }
        if known_tags.iter().any(|known| known == tag) {
            completed.insert(tag.to_string());
        }
    }

    completed
}

/// Parse `#RRGGBB` (made opaque) or `#AARRGGBB`.
pub fn parse_color(raw: &str) -> Option<u32> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    match hex.len() {
        6 => Some(0xFF00_0000 | value),
        8 => Some(value),
        _ => None,
    }
}

/// Render a colour as `#RRGGBB` when opaque, `#AARRGGBB` otherwise.
pub fn format_color(color: u32) -> String {
    if color >> 24 == 0xFF {
        format!("#{:06X}", color & 0x00FF_FFFF)
    } else {
        format!("#{color:08X}")
    }
}

/// Render a habit back into config-line form.
pub fn format_habit_config_line(habit: &HabitConfig) -> String {
    if habit.color == DEFAULT_HABIT_COLOR {
        format!("{} | {}", habit.label, habit.tag)
    } else {
        format!("{} | {} | {}", habit.label, habit.tag, format_color(habit.color))
    }
}

/// Build the content of a configuration memo from free-form habit lines.
///
/// Each non-blank line goes through [`parse_habit_config_line`]; tags derived
/// from plain labels keep the label's casing.
pub fn build_habits_config_content(raw: &str) -> String {
    let mut lines = vec![CONFIG_MARKER.to_string()];
    lines.extend(
        raw.lines()
            .filter(|line| !line.trim_start().starts_with(CONFIG_MARKER))
            .filter_map(parse_habit_config_line)
            .map(|habit| format_habit_config_line(&habit)),
    );
    lines.join("\n")
}

/// Build the content of a daily memo with one checkbox per configured habit.
pub fn build_daily_memo_content(
    date: NaiveDate,
    habits: &[HabitConfig],
    done: &HashSet<String>,
) -> String {
    let mut lines = vec![format!("{DAILY_MARKER} {}", date.format("%Y-%m-%d"))];
    for habit in habits {
        let mark = if done.contains(&habit.tag) { 'x' } else { ' ' };
        lines.push(format!("- [{mark}] {} {}", habit.label, habit.tag));
    }
    lines.join("\n")
}

fn has_tag_prefix(raw: &str) -> bool {
    raw.starts_with(HABIT_TAG_PREFIX) || raw.starts_with(LEGACY_TAG_PREFIX)
}

fn tag_slug(tag: &str) -> &str {
    tag.strip_prefix(HABIT_TAG_PREFIX).unwrap_or(tag)
}
