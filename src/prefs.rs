//! Key-value preference storage.
//!
//! [`PreferencesStore`] is the capability the app persists small settings
//! through (last activity mode, last range kind, persisted log tail). The
//! activity engine never touches it.

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::Result;

pub const ACTIVITY_MODE_KEY: &str = "activity.mode";
pub const RANGE_KIND_KEY: &str = "activity.range_kind";
pub const LAST_SYNC_KEY: &str = "sync.last";
pub const RECENT_LOGS_KEY: &str = "logs.recent";

pub trait PreferencesStore {
    fn load(&self, key: &str) -> Result<Option<String>>;

    fn save(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Load and deserialize a JSON value. A value that no longer parses is
/// treated as absent.
pub fn load_json<T: DeserializeOwned>(store: &dyn PreferencesStore, key: &str) -> Result<Option<T>> {
    Ok(store
        .load(key)?
        .and_then(|raw| match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable preference");
                None
            }
        }))
}

pub fn save_json<T: Serialize + ?Sized>(store: &mut dyn PreferencesStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.save(key, &raw)
}

/// Preferences in the cache database's `preferences` table.
pub struct SqlitePreferences<'a> {
    conn: &'a Connection,
}

impl<'a> SqlitePreferences<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl PreferencesStore for SqlitePreferences<'_> {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO preferences (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Process-local preferences, used in demo mode.
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferencesStore for MemoryPreferences {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}
