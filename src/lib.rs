//! Memos journal and habit tracker.
//!
//! Vibits keeps a list of free-text memos (journal posts, habit configuration
//! memos, and daily habit check-ins) and turns them into contribution-grid
//! activity charts. Memos live in a local SQLite cache mirrored from a Memos
//! server, in a single JSON file (offline mode), or in memory (demo mode).
//!
//! | Memo | Content starts with | Used for |
//! |------|---------------------|----------|
//! | **Config** | `#habits/config` | The habits tracked from its creation date on |
//! | **Daily** | `#habits/daily YYYY-MM-DD` | Which habits were done on that date |
//! | **Post** | anything else | Post-activity charts |
//!
//! # Modules
//!
//! - [`habits`]: Pure aggregation engine: parsing, config timeline, day and week grids, ranges
//! - [`memo`]: The memo record and timestamp parsing
//! - [`repository`]: Cached, offline, and demo memo repositories
//! - [`remote`]: Memos server HTTP client
//! - [`db`]: SQLite cache: schema, migrations, memo rows
//! - [`prefs`]: Key-value preferences
//! - [`state`]: Reducer/effect runtime and the activity feature
//! - [`logging`]: Bounded in-memory log buffer and its `tracing` layer
//! - [`config`]: Configuration loading from TOML files and environment variables

pub mod config;
pub mod db;
pub mod error;
pub mod habits;
pub mod logging;
pub mod memo;
pub mod prefs;
pub mod remote;
pub mod repository;
pub mod state;
