use anyhow::Result;
use std::path::Path;

use vibits::config::VibitsConfig;
use vibits::repository::{create_repository, MemoFile};

use super::local_today;

/// Export all memos as `{"memos": [...]}` JSON, to stdout or a file.
pub fn export(config: &VibitsConfig, output: Option<&Path>) -> Result<()> {
    let (today, _) = local_today();
    let repo = create_repository(config, today)?;

    let file = MemoFile {
        memos: repo.list_memos()?,
    };

    match output {
        Some(path) => {
            file.write(path)?;
            eprintln!("Exported {} memos to {}.", file.memos.len(), path.display());
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&file)?);
            eprintln!("Exported {} memos.", file.memos.len());
        }
    }
    Ok(())
}
