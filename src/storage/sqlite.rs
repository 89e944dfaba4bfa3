//! `SQLite` session store implementation.

// SQLite stores all integers as i64. These casts are intentional and safe
// because we only store non-negative counts that fit in usize.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::core::turn::current_timestamp;
use crate::core::{ConversationSession, ConversationTurn, Role};
use crate::error::{Result, StorageError};
use crate::history::HistoryWindow;
use crate::storage::schema::{
    CHECK_SCHEMA_SQL, CURRENT_SCHEMA_VERSION, GET_VERSION_SQL, SCHEMA_SQL, SET_VERSION_SQL,
};
use crate::storage::traits::{SessionStore, SessionSummary, StoreStats};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use tracing::debug;

/// SQLite-based session store.
///
/// # Examples
///
/// ```
/// use ekko::core::ConversationTurn;
/// use ekko::storage::{SessionStore, SqliteStorage};
///
/// let mut storage = SqliteStorage::in_memory().unwrap();
/// storage.init().unwrap();
/// storage.append_turn("s1", &ConversationTurn::user("Quando plantar soja?")).unwrap();
/// assert_eq!(storage.load_history("s1").unwrap().len(), 1);
/// ```
pub struct SqliteStorage {
    /// `SQLite` connection.
    conn: Connection,
    /// Path to the database file (None for in-memory).
    path: Option<PathBuf>,
}

impl SqliteStorage {
    /// Opens or creates a `SQLite` database at the given path.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Database(e.to_string()))?;
        }

        let conn = Connection::open(&path).map_err(StorageError::from)?;

        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(StorageError::from)?;

        // journal_mode returns the resulting mode as a row
        let _: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .map_err(StorageError::from)?;

        debug!(path = %path.display(), "session store opened");

        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Creates an in-memory `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(StorageError::from)?;

        Ok(Self { conn, path: None })
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn get_schema_version(&self) -> Result<Option<u32>> {
        let version: Option<String> = self
            .conn
            .query_row(GET_VERSION_SQL, [], |row| row.get(0))
            .optional()
            .map_err(StorageError::from)?;

        Ok(version.and_then(|v| v.parse().ok()))
    }

    fn set_schema_version(&self, version: u32) -> Result<()> {
        self.conn
            .execute(SET_VERSION_SQL, params![version.to_string()])
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(sql, [], |row| row.get(0))
            .map_err(StorageError::from)?;
        Ok(count as usize)
    }
}

impl SessionStore for SqliteStorage {
    fn init(&mut self) -> Result<()> {
        if !self.is_initialized()? {
            self.conn
                .execute_batch(SCHEMA_SQL)
                .map_err(StorageError::from)?;
            self.set_schema_version(CURRENT_SCHEMA_VERSION)?;
            return Ok(());
        }

        match self.get_schema_version()? {
            Some(version) if version > CURRENT_SCHEMA_VERSION => Err(StorageError::Migration(
                format!(
                    "database schema v{version} is newer than supported v{CURRENT_SCHEMA_VERSION}"
                ),
            )
            .into()),
            Some(_) => Ok(()),
            None => self.set_schema_version(CURRENT_SCHEMA_VERSION),
        }
    }

    fn is_initialized(&self) -> Result<bool> {
        Ok(self.count(CHECK_SCHEMA_SQL)? > 0)
    }

    fn reset(&mut self) -> Result<()> {
        self.conn
            .execute_batch(
                r"
            DELETE FROM turns;
            DELETE FROM sessions;
        ",
            )
            .map_err(StorageError::from)?;
        Ok(())
    }

    // ==================== Session Operations ====================

    fn append_turn(&mut self, session_id: &str, turn: &ConversationTurn) -> Result<()> {
        let tx = self.conn.transaction().map_err(StorageError::from)?;
        let now = current_timestamp();

        tx.execute(
            r"
            INSERT INTO sessions (id, created_at, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET updated_at = excluded.updated_at
        ",
            params![session_id, now, now],
        )
        .map_err(StorageError::from)?;

        tx.execute(
            "INSERT INTO turns (session_id, role, text, timestamp) VALUES (?, ?, ?, ?)",
            params![session_id, turn.role.as_str(), turn.text, turn.timestamp],
        )
        .map_err(StorageError::from)?;

        tx.commit().map_err(StorageError::from)?;

        debug!(session = session_id, role = %turn.role, "turn recorded");
        Ok(())
    }

    fn load_session(&self, session_id: &str) -> Result<Option<ConversationSession>> {
        let created_at: Option<i64> = self
            .conn
            .query_row(
                "SELECT created_at FROM sessions WHERE id = ?",
                params![session_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(StorageError::from)?;

        let Some(created_at) = created_at else {
            return Ok(None);
        };

        let mut stmt = self
            .conn
            .prepare("SELECT role, text, timestamp FROM turns WHERE session_id = ? ORDER BY id")
            .map_err(StorageError::from)?;

        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(StorageError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;

        let turns = rows
            .into_iter()
            .map(|(role, text, timestamp)| {
                let role: Role = role.parse().map_err(StorageError::Serialization)?;
                Ok(ConversationTurn::at(role, text, timestamp))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(ConversationSession::restore(
            session_id,
            created_at,
            HistoryWindow::from_turns(turns),
        )))
    }

    fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let mut stmt = self
            .conn
            .prepare(
                r"
            SELECT s.id, s.created_at, s.updated_at, COUNT(t.id)
            FROM sessions s LEFT JOIN turns t ON t.session_id = s.id
            GROUP BY s.id
            ORDER BY s.updated_at DESC, s.id
        ",
            )
            .map_err(StorageError::from)?;

        let sessions = stmt
            .query_map([], |row| {
                Ok(SessionSummary {
                    id: row.get(0)?,
                    created_at: row.get(1)?,
                    updated_at: row.get(2)?,
                    turn_count: row.get::<_, i64>(3)? as usize,
                })
            })
            .map_err(StorageError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;

        Ok(sessions)
    }

    fn delete_session(&mut self, session_id: &str) -> Result<()> {
        // Turns go with the session via CASCADE
        let deleted = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?", params![session_id])
            .map_err(StorageError::from)?;

        if deleted == 0 {
            return Err(StorageError::SessionNotFound {
                id: session_id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn stats(&self) -> Result<StoreStats> {
        let db_size = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok().map(|m| m.len()));

        Ok(StoreStats {
            session_count: self.count("SELECT COUNT(*) FROM sessions")?,
            turn_count: self.count("SELECT COUNT(*) FROM turns")?,
            schema_version: self.get_schema_version()?.unwrap_or(0),
            db_size,
        })
    }
}
