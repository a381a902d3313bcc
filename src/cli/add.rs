use anyhow::Result;
use tracing::info;

use vibits::config::{AppMode, VibitsConfig};
use vibits::memo::Memo;
use vibits::repository::create_repository;

use super::{local_today, remote_client};

/// Add a memo and print its id.
pub async fn add(config: &VibitsConfig, content: &str) -> Result<()> {
    anyhow::ensure!(!content.trim().is_empty(), "memo content is empty");

    let memo = create_memo(config, content).await?;
    println!("Added memo {}", memo.id);
    if config.app.mode == AppMode::Demo {
        println!("(demo mode: nothing is saved)");
    }
    Ok(())
}

/// Create a memo through the server in remote mode (mirroring it into the
/// cache), or directly in the local repository otherwise.
pub async fn create_memo(config: &VibitsConfig, content: &str) -> Result<Memo> {
    let (today, _) = local_today();
    let mut repo = create_repository(config, today)?;

    let memo = match remote_client(config)? {
        Some(client) => {
            let memo = client.create_memo(content).await?;
            repo.upsert_memo(&memo)?;
            memo
        }
        None => repo.create_memo(content)?,
    };

    info!(id = %memo.id, mode = config.app.mode.as_str(), "memo created");
    Ok(memo)
}
