//! Memo repositories: where the app reads and writes memos in each mode.
//!
//! [`create_repository`] picks the implementation from [`AppMode`]:
//! the SQLite cache ([`CachedRepository`]), a single JSON file
//! ([`OfflineRepository`]), or seeded sample data ([`DemoRepository`]).

use chrono::{Days, NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::{AppMode, VibitsConfig};
use crate::db;
use crate::error::{Result, VibitsError};
use crate::habits::{build_daily_memo_content, build_habits_config_content, parse_habit_config_line};
use crate::memo::Memo;

pub trait MemoRepository: Send {
    fn list_memos(&self) -> Result<Vec<Memo>>;

    fn create_memo(&mut self, content: &str) -> Result<Memo>;

    fn update_memo(&mut self, id: &str, content: &str) -> Result<Memo>;

    fn delete_memo(&mut self, id: &str) -> Result<()>;

    /// Store `memo` exactly as given, replacing any memo with the same id.
    /// Used to mirror memos written through the server.
    fn upsert_memo(&mut self, memo: &Memo) -> Result<()>;
}

/// Build the repository for the configured app mode.
pub fn create_repository(config: &VibitsConfig, today: NaiveDate) -> anyhow::Result<Box<dyn MemoRepository>> {
    match config.app.mode {
        AppMode::Remote => {
            let conn = db::open_database(config.resolved_db_path())?;
            Ok(Box::new(CachedRepository::new(conn)))
        }
        AppMode::Offline => Ok(Box::new(OfflineRepository::new(config.resolved_offline_file()))),
        AppMode::Demo => Ok(Box::new(DemoRepository::seeded(today))),
    }
}

/// Memos in the local SQLite cache.
pub struct CachedRepository {
    conn: Connection,
}

impl CachedRepository {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl MemoRepository for CachedRepository {
    fn list_memos(&self) -> Result<Vec<Memo>> {
        db::memos::list_memos(&self.conn, None)
    }

    fn create_memo(&mut self, content: &str) -> Result<Memo> {
        db::memos::insert_memo(&self.conn, content)
    }

    fn update_memo(&mut self, id: &str, content: &str) -> Result<Memo> {
        db::memos::update_memo_content(&self.conn, id, content)
    }

    fn delete_memo(&mut self, id: &str) -> Result<()> {
        db::memos::delete_memo(&self.conn, id)
    }

    fn upsert_memo(&mut self, memo: &Memo) -> Result<()> {
        db::memos::upsert_memo(&self.conn, memo)
    }
}

/// On-disk shape of the offline JSON file (also the export/import format).
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoFile {
    #[serde(default)]
    pub memos: Vec<Memo>,
}

impl MemoFile {
    /// Read a memo file. A missing file is an empty list.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write atomically (tmp + rename).
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("tmp");
        std::fs::write(&tmp_path, serde_json::to_string_pretty(self)?)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

/// Memos in one JSON file, read and rewritten whole on every change.
pub struct OfflineRepository {
    path: PathBuf,
}

impl OfflineRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn modify<T>(&self, f: impl FnOnce(&mut Vec<Memo>) -> Result<T>) -> Result<T> {
        let mut file = MemoFile::read(&self.path)?;
        let out = f(&mut file.memos)?;
        file.write(&self.path)?;
        Ok(out)
    }
}

impl MemoRepository for OfflineRepository {
    fn list_memos(&self) -> Result<Vec<Memo>> {
        Ok(MemoFile::read(&self.path)?.memos)
    }

    fn create_memo(&mut self, content: &str) -> Result<Memo> {
        let memo = new_local_memo(content);
        self.modify(|memos| {
            memos.push(memo.clone());
            Ok(memo)
        })
    }

    fn update_memo(&mut self, id: &str, content: &str) -> Result<Memo> {
        self.modify(|memos| update_in(memos, id, content))
    }

    fn delete_memo(&mut self, id: &str) -> Result<()> {
        self.modify(|memos| remove_from(memos, id))
    }

    fn upsert_memo(&mut self, memo: &Memo) -> Result<()> {
        self.modify(|memos| {
            upsert_in(memos, memo);
            Ok(())
        })
    }
}

/// In-memory memos, never persisted.
#[derive(Debug, Default, Clone)]
pub struct DemoRepository {
    memos: Vec<Memo>,
}

impl DemoRepository {
    pub fn new(memos: Vec<Memo>) -> Self {
        Self { memos }
    }

    /// Sample data ending at `today`: a habit config from four weeks ago,
    /// a daily memo on most recent days, and a handful of posts.
    pub fn seeded(today: NaiveDate) -> Self {
        let days_ago = |n: u64| today.checked_sub_days(Days::new(n)).unwrap_or(today);
        let stamp = |date: NaiveDate, hour: u32| {
            date.and_hms_opt(hour, 0, 0)
                .map(|dt| dt.and_utc().to_rfc3339())
                .unwrap_or_default()
        };

        let config_content =
            build_habits_config_content("Exercise | exercise | #FF9800\nReading | reading | #2196F3\nMeditate | meditate");
        let habits: Vec<_> = config_content
            .lines()
            .skip(1)
            .filter_map(parse_habit_config_line)
            .collect();

        let mut memos = vec![Memo::new("demo-config", config_content).created(stamp(days_ago(28), 7))];

        for n in 0..21u64 {
            // skip every fourth day so the grid has gaps
            if n % 4 == 3 {
                continue;
            }
            let date = days_ago(n);
            let done: HashSet<String> = habits
                .iter()
                .enumerate()
                .filter(|(i, _)| (n as usize + i) % 3 != 0)
                .map(|(_, h)| h.tag.clone())
                .collect();
            memos.push(
                Memo::new(format!("demo-daily-{n}"), build_daily_memo_content(date, &habits, &done))
                    .created(stamp(date, 21)),
            );
        }

        let posts = [
            (0, "Tried a new coffee place downtown."),
            (1, "Finished the first draft of the report."),
            (1, "Long walk by the river after lunch."),
            (3, "Rainy day, stayed in and read."),
            (6, "Called grandma."),
            (9, "Weekend hike, legs are sore."),
        ];
        for (i, (n, text)) in posts.iter().enumerate() {
            memos.push(Memo::new(format!("demo-post-{i}"), *text).created(stamp(days_ago(*n), 12)));
        }

        Self { memos }
    }
}

impl MemoRepository for DemoRepository {
    fn list_memos(&self) -> Result<Vec<Memo>> {
        Ok(self.memos.clone())
    }

    fn create_memo(&mut self, content: &str) -> Result<Memo> {
        let memo = new_local_memo(content);
        self.memos.push(memo.clone());
        Ok(memo)
    }

    fn update_memo(&mut self, id: &str, content: &str) -> Result<Memo> {
        update_in(&mut self.memos, id, content)
    }

    fn delete_memo(&mut self, id: &str) -> Result<()> {
        remove_from(&mut self.memos, id)
    }

    fn upsert_memo(&mut self, memo: &Memo) -> Result<()> {
        upsert_in(&mut self.memos, memo);
        Ok(())
    }
}

fn new_local_memo(content: &str) -> Memo {
    let now = Utc::now().to_rfc3339();
    Memo::new(uuid::Uuid::now_v7().to_string(), content)
        .created(now.clone())
        .updated(now)
}

fn update_in(memos: &mut [Memo], id: &str, content: &str) -> Result<Memo> {
    let memo = memos
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| VibitsError::NotFound(id.to_string()))?;
    memo.content = content.to_string();
    memo.updated_at = Some(Utc::now().to_rfc3339());
    Ok(memo.clone())
}

fn upsert_in(memos: &mut Vec<Memo>, memo: &Memo) {
    match memos.iter_mut().find(|m| m.id == memo.id) {
        Some(existing) => *existing = memo.clone(),
        None => memos.push(memo.clone()),
    }
}

fn remove_from(memos: &mut Vec<Memo>, id: &str) -> Result<()> {
    let before = memos.len();
    memos.retain(|m| m.id != id);
    if memos.len() == before {
        return Err(VibitsError::NotFound(id.to_string()));
    }
    Ok(())
}
