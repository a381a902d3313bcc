use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::collections::HashSet;
use std::path::Path;

use vibits::config::{AppMode, VibitsConfig};
use vibits::db;
use vibits::memo::Memo;
use vibits::remote::MemosClient;
use vibits::repository::MemoFile;

use super::remote_client;

/// Import memos from an export file. Memos whose id already exists are
/// skipped. In remote mode new memos are created on the server and the
/// server's copies are mirrored into the cache, so a later sync keeps them.
pub async fn import(config: &VibitsConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;
    let data: MemoFile = serde_json::from_str(&json).context("failed to parse import JSON")?;

    println!("Importing {} memos...", data.memos.len());

    let (imported, skipped) = match config.app.mode {
        AppMode::Remote => {
            let Some(client) = remote_client(config)? else {
                bail!("no server configured");
            };
            let conn = db::open_database(config.resolved_db_path())?;
            import_to_server(&conn, &client, data.memos).await?
        }
        AppMode::Offline => {
            let path = config.resolved_offline_file();
            let mut existing = MemoFile::read(&path)?;
            let mut known: HashSet<String> = existing.memos.iter().map(|m| m.id.clone()).collect();
            let mut imported = 0u64;
            let mut skipped = 0u64;
            for memo in data.memos {
                if known.insert(memo.id.clone()) {
                    existing.memos.push(memo);
                    imported += 1;
                } else {
                    skipped += 1;
                }
            }
            existing.write(&path)?;
            (imported, skipped)
        }
        AppMode::Demo => bail!("demo mode keeps no data to import into"),
    };

    println!("Imported {imported} memos ({skipped} skipped as duplicates).");
    Ok(())
}

/// Create each new memo on the server and upsert the returned memo into the
/// cache. The server assigns fresh ids, so a memo whose content is already
/// cached also counts as a duplicate.
async fn import_to_server(
    conn: &Connection,
    client: &MemosClient,
    memos: Vec<Memo>,
) -> Result<(u64, u64)> {
    let cached = db::memos::list_memos(conn, None)?;
    let mut known_ids: HashSet<String> = cached.iter().map(|m| m.id.clone()).collect();
    let mut known_contents: HashSet<String> = cached.into_iter().map(|m| m.content).collect();

    let mut imported = 0u64;
    let mut skipped = 0u64;
    for memo in memos {
        if !known_ids.insert(memo.id.clone()) || known_contents.contains(&memo.content) {
            skipped += 1;
            continue;
        }
        let created = client
            .create_memo(&memo.content)
            .await
            .with_context(|| format!("failed to create memo {} on the server", memo.id))?;
        db::memos::upsert_memo(conn, &created)?;
        known_ids.insert(created.id.clone());
        known_contents.insert(created.content);
        imported += 1;
    }

    tracing::info!(imported, skipped, "imported memos to server");
    Ok((imported, skipped))
}
