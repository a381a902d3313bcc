//! CLI `sync` command: mirror the server's memos into the local cache.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use vibits::config::{AppMode, VibitsConfig};
use vibits::db;
use vibits::prefs::{self, SqlitePreferences, LAST_SYNC_KEY};

use super::remote_client;

#[derive(Debug, Serialize, Deserialize)]
struct SyncRecord {
    server: String,
    synced_at: String,
    memos: usize,
}

/// Replace the cache with the server's memo list.
pub async fn sync(config: &VibitsConfig) -> Result<()> {
    if config.app.mode != AppMode::Remote {
        bail!("sync needs remote mode (current mode: {})", config.app.mode.as_str());
    }
    let Some(client) = remote_client(config)? else {
        bail!("no server configured");
    };

    println!("Fetching memos from {}...", config.server.base_url);
    let memos = client.list_memos().await?;

    let mut conn = db::open_database(config.resolved_db_path())?;
    let count = db::memos::replace_all_memos(&mut conn, &memos)?;

    let record = SyncRecord {
        server: config.server.base_url.clone(),
        synced_at: chrono::Utc::now().to_rfc3339(),
        memos: count,
    };
    prefs::save_json(&mut SqlitePreferences::new(&conn), LAST_SYNC_KEY, &record)?;

    tracing::info!(count, server = %record.server, "sync complete");
    println!("Synced {count} memos.");
    Ok(())
}

/// Print when the cache was last synced.
pub fn status(config: &VibitsConfig) -> Result<()> {
    let conn = db::open_database(config.resolved_db_path())?;
    let cached = db::memos::count_memos(&conn)?;

    match prefs::load_json::<SyncRecord>(&SqlitePreferences::new(&conn), LAST_SYNC_KEY)? {
        Some(record) => {
            println!("Last sync:  {}", record.synced_at);
            println!("Server:     {}", record.server);
            println!("Fetched:    {} memos", record.memos);
        }
        None => println!("Never synced."),
    }
    println!("Cached now: {cached} memos");
    Ok(())
}
