use anyhow::Result;

use vibits::config::VibitsConfig;
use vibits::habits::{classify_memo, MemoKind};
use vibits::repository::create_repository;

use super::{local_today, preview};

/// Print memos newest first.
pub fn list(config: &VibitsConfig, limit: Option<usize>) -> Result<()> {
    let (today, offset) = local_today();
    let repo = create_repository(config, today)?;

    let mut memos = repo.list_memos()?;
    // newest first, timestampless memos last
    memos.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    let total = memos.len();
    memos.truncate(limit.unwrap_or(total));

    if memos.is_empty() {
        println!("No memos.");
        return Ok(());
    }

    for memo in &memos {
        let date = memo
            .date_in(offset)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".into());
        let kind = match classify_memo(&memo.content) {
            MemoKind::HabitConfig => "config",
            MemoKind::DailyHabit(_) => "daily",
            MemoKind::Post => "post",
        };
        println!("{date}  {kind:<6}  {:<36}  {}", memo.id, preview(&memo.content, 60));
    }

    if memos.len() < total {
        println!("\n{} of {total} memos shown.", memos.len());
    }
    Ok(())
}
