//! Session store trait definition.

use crate::core::{ConversationSession, ConversationTurn};
use crate::error::Result;
use crate::history::HistoryWindow;
use serde::Serialize;

/// Trait for persistent session stores.
///
/// A store holds many sessions; each session is an append-only list of
/// turns. Appends to one session must be serialized by the caller.
pub trait SessionStore: Send {
    /// Initializes storage (creates schema).
    ///
    /// Idempotent: safe to call multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails or the database was
    /// written by a newer schema version.
    fn init(&mut self) -> Result<()>;

    /// Checks if storage is initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot be performed.
    fn is_initialized(&self) -> Result<bool>;

    /// Deletes every session, keeping the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    fn reset(&mut self) -> Result<()>;

    // ==================== Session Operations ====================

    /// Appends a turn, creating the session on its first message.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    fn append_turn(&mut self, session_id: &str, turn: &ConversationTurn) -> Result<()>;

    /// Loads a session with all its turns.
    ///
    /// Returns `None` if the session does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is corrupt.
    fn load_session(&self, session_id: &str) -> Result<Option<ConversationSession>>;

    /// Loads the transcript of a session (empty when unknown).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn load_history(&self, session_id: &str) -> Result<HistoryWindow> {
        Ok(self
            .load_session(session_id)?
            .map(|session| session.window)
            .unwrap_or_default())
    }

    /// Lists all sessions, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list_sessions(&self) -> Result<Vec<SessionSummary>>;

    /// Deletes a session and its turns.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::SessionNotFound`](crate::error::StorageError::SessionNotFound)
    /// if the session does not exist.
    fn delete_session(&mut self, session_id: &str) -> Result<()>;

    /// Gets store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if statistics cannot be gathered.
    fn stats(&self) -> Result<StoreStats>;
}

/// One line of a session listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Session identifier.
    pub id: String,
    /// Unix timestamp of the first message.
    pub created_at: i64,
    /// Unix timestamp of the latest message.
    pub updated_at: i64,
    /// Number of recorded turns.
    pub turn_count: usize,
}

/// Session store statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    /// Number of sessions.
    pub session_count: usize,
    /// Number of turns across all sessions.
    pub turn_count: usize,
    /// Schema version.
    pub schema_version: u32,
    /// Database file size in bytes (if applicable).
    pub db_size: Option<u64>,
}
