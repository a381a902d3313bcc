#![allow(dead_code)]

use chrono::{FixedOffset, NaiveDate};
use rusqlite::Connection;
use vibits::db;
use vibits::memo::Memo;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    conn
}

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A memo created at `created` (RFC 3339).
pub fn memo(id: &str, content: &str, created: &str) -> Memo {
    Memo::new(id, content).created(created)
}

/// A config memo created at 07:00 UTC on `day`.
pub fn config_memo(id: &str, day: &str, lines: &[&str]) -> Memo {
    let content = format!("#habits/config\n{}", lines.join("\n"));
    memo(id, &content, &format!("{day}T07:00:00Z"))
}

/// A daily memo for `day`, created at 21:00 UTC that day.
pub fn daily_memo(id: &str, day: &str, body: &str) -> Memo {
    memo(id, &format!("#habits/daily {day}\n{body}"), &format!("{day}T21:00:00Z"))
}
