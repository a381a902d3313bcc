pub mod activity;
pub mod add;
pub mod check;
pub mod export;
pub mod habits;
pub mod import;
pub mod list;
pub mod logs;
pub mod reset;
pub mod sync;

use anyhow::{Context, Result};
use chrono::{Days, FixedOffset, Local, NaiveDate};

use vibits::config::{AppMode, VibitsConfig};
use vibits::prefs::{MemoryPreferences, PreferencesStore, SqlitePreferences};
use vibits::remote::MemosClient;
use vibits::repository::create_repository;
use vibits::state::activity::{ActivityEffects, ActivityFeature, ActivityState};
use vibits::state::Store;

/// Today's date and the local UTC offset used to read memo timestamps.
pub fn local_today() -> (NaiveDate, FixedOffset) {
    let now = Local::now();
    (now.date_naive(), *now.offset())
}

/// Parse `today`, `yesterday`, or `YYYY-MM-DD`.
pub fn parse_day(raw: &str, today: NaiveDate) -> Result<NaiveDate> {
    match raw.trim() {
        "today" => Ok(today),
        "yesterday" => today
            .checked_sub_days(Days::new(1))
            .context("date out of range"),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .with_context(|| format!("invalid date {other:?}, expected YYYY-MM-DD")),
    }
}

/// The server client for remote mode; `None` in offline and demo modes.
pub fn remote_client(config: &VibitsConfig) -> Result<Option<MemosClient>> {
    if config.app.mode != AppMode::Remote {
        return Ok(None);
    }
    let client = MemosClient::new(&config.server.base_url, &config.server.access_token)
        .context("remote mode needs [server] base_url and access_token")?
        .with_page_size(config.server.page_size);
    Ok(Some(client))
}

/// Run `f` against the preference store for the configured mode. Preferences
/// live in the cache database except in demo mode, where nothing persists.
pub fn with_prefs<T>(
    config: &VibitsConfig,
    f: impl FnOnce(&mut dyn PreferencesStore) -> Result<T>,
) -> Result<T> {
    if config.app.mode == AppMode::Demo {
        return f(&mut MemoryPreferences::new());
    }
    let conn = vibits::db::open_database(config.resolved_db_path())?;
    f(&mut SqlitePreferences::new(&conn))
}

/// Spawn an activity store over the configured repository. `writable`
/// attaches the server client in remote mode so edits reach the server.
pub fn activity_store(
    config: &VibitsConfig,
    initial: ActivityState,
    writable: bool,
) -> Result<Store<ActivityFeature>> {
    let repo = create_repository(config, initial.today)?;
    let mut effects = ActivityEffects::new(repo);
    if writable {
        if let Some(client) = remote_client(config)? {
            effects = effects.with_remote(client);
        }
    }
    Ok(Store::<ActivityFeature>::spawn(initial, effects))
}

/// First line of `content`, cut to `width` characters.
pub fn preview(content: &str, width: usize) -> String {
    let line = content.lines().next().unwrap_or("").trim();
    if line.chars().count() <= width {
        line.to_string()
    } else {
        let cut: String = line.chars().take(width.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
