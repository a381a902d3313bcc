//! CLI `reset` command: delete all local memos after user confirmation.

use anyhow::{bail, Result};
use std::io::Write;

use vibits::config::{AppMode, VibitsConfig};
use vibits::db;
use vibits::prefs::{PreferencesStore, SqlitePreferences, LAST_SYNC_KEY};
use vibits::repository::MemoFile;

/// Delete all local memos. The server is never touched.
pub fn reset(config: &VibitsConfig, yes: bool) -> Result<()> {
    let target = match config.app.mode {
        AppMode::Remote => config.resolved_db_path(),
        AppMode::Offline => config.resolved_offline_file(),
        AppMode::Demo => {
            println!("Demo mode keeps nothing on disk; nothing to reset.");
            return Ok(());
        }
    };

    if !yes {
        println!("WARNING: This will permanently delete ALL local memos.");
        println!("Location: {}", target.display());
        print!("\nType YES to confirm: ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if input.trim() != "YES" {
            bail!("reset cancelled");
        }
    }

    let removed = match config.app.mode {
        AppMode::Offline => {
            let removed = MemoFile::read(&target)?.memos.len();
            MemoFile::default().write(&target)?;
            removed
        }
        _ => {
            let conn = db::open_database(&target)?;
            let removed = db::memos::clear_memos(&conn)?;
            SqlitePreferences::new(&conn).remove(LAST_SYNC_KEY)?;
            removed
        }
    };

    tracing::info!(removed, mode = config.app.mode.as_str(), "local memos reset");
    println!("Deleted {removed} memos. Reset complete.");
    Ok(())
}
