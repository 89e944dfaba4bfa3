//! Session store for Ekko.
//!
//! The context engine never persists anything itself. This module is the
//! caller-side store the CLI uses to keep conversation sessions and their
//! turns in `SQLite` between invocations.

pub mod schema;
pub mod sqlite;
pub mod traits;

pub use schema::{CURRENT_SCHEMA_VERSION, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{SessionStore, SessionSummary, StoreStats};

/// Default database file name.
pub const DEFAULT_DB_NAME: &str = "ekko-sessions.db";

/// Default database path relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".ekko/ekko-sessions.db";
