//! The memo record shared by the cache, the repositories, and the activity engine.
//!
//! Timestamps are kept as the strings the source gave us; [`parse_timestamp`]
//! turns them into UTC instants on demand. A memo whose timestamps cannot be
//! parsed is treated as timestampless.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Epoch values at or above this magnitude are read as milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// A single free-text journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub id: String,
    pub content: String,
    /// ISO 8601 / RFC 3339 or epoch string, as delivered by the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Memo {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Builder-style setter for the creation timestamp.
    pub fn created(mut self, timestamp: impl Into<String>) -> Self {
        self.created_at = Some(timestamp.into());
        self
    }

    /// Builder-style setter for the update timestamp.
    pub fn updated(mut self, timestamp: impl Into<String>) -> Self {
        self.updated_at = Some(timestamp.into());
        self
    }

    pub fn created_instant(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn updated_instant(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }

    /// Creation instant, falling back to the update instant.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_instant().or_else(|| self.updated_instant())
    }

    /// Calendar date of [`Memo::timestamp`] as seen from `offset`.
    pub fn date_in(&self, offset: FixedOffset) -> Option<NaiveDate> {
        self.timestamp()
            .map(|ts| ts.with_timezone(&offset).date_naive())
    }
}

/// Parse a memo timestamp string.
///
/// Accepts RFC 3339, naive ISO datetimes (read as UTC), plain `YYYY-MM-DD`
/// dates (midnight UTC), and integer epoch seconds or milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(epoch) = raw.parse::<i64>() {
        return if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
            DateTime::from_timestamp_millis(epoch)
        } else {
            DateTime::from_timestamp(epoch, 0)
        };
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
