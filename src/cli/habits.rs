use anyhow::{ensure, Result};

use vibits::config::VibitsConfig;
use vibits::habits::parser::{format_color, CONFIG_MARKER};
use vibits::habits::{build_habits_config_content, ActivityIndex};
use vibits::repository::create_repository;

use super::{add, local_today};

/// Print the habit configuration history and today's active habits.
pub fn show(config: &VibitsConfig) -> Result<()> {
    let (today, offset) = local_today();
    let repo = create_repository(config, today)?;
    let index = ActivityIndex::from_memos(&repo.list_memos()?, offset);

    if index.timeline().is_empty() {
        println!("No habit configuration yet. Create one with `vibits habits set`.");
        return Ok(());
    }

    println!("Habit configurations");
    println!("{}", "=".repeat(40));
    for entry in index.timeline() {
        println!(
            "Since {} (memo {}):",
            entry.effective_date.format("%Y-%m-%d"),
            entry.source_memo_id
        );
        for habit in &entry.habits {
            println!("  {:<20} {:<28} {}", habit.label, habit.tag, format_color(habit.color));
        }
    }
    println!();

    let active = index.habits_on(today);
    println!("Active today: {}", active.len());
    for habit in active {
        println!("  {}", habit.label);
    }
    Ok(())
}

/// Create a new configuration memo from `label | tag | color` lines.
pub async fn set(config: &VibitsConfig, lines: &[String]) -> Result<()> {
    let content = build_habits_config_content(&lines.join("\n"));
    let count = content.lines().filter(|l| *l != CONFIG_MARKER).count();
    ensure!(count > 0, "no habits given");

    let memo = add::create_memo(config, &content).await?;
    println!("Saved {count} habits in config memo {}.", memo.id);
    println!("{content}");
    Ok(())
}
