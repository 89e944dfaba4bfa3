//! Conversation session state.
//!
//! A session groups the turns of one conversation under a stable id. The
//! engine only reads sessions; the caller (CLI or server) owns persistence.

use crate::core::ConversationTurn;
use crate::core::turn::current_timestamp;
use crate::history::HistoryWindow;
use serde::{Deserialize, Serialize};

/// A single conversation and its transcript.
///
/// # Examples
///
/// ```
/// use ekko::core::{ConversationSession, ConversationTurn};
///
/// let mut session = ConversationSession::new("talhao-3");
/// assert!(session.is_first_turn());
///
/// session.record(ConversationTurn::user("Quando plantar soja?"));
/// assert!(!session.is_first_turn());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSession {
    /// Caller-chosen session identifier.
    pub id: String,

    /// Unix timestamp when the session was created.
    pub created_at: i64,

    /// Recorded turns, oldest first.
    pub window: HistoryWindow,
}

impl ConversationSession {
    /// Creates an empty session stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: current_timestamp(),
            window: HistoryWindow::new(),
        }
    }

    /// Restores a session from persisted parts.
    #[must_use]
    pub fn restore(id: impl Into<String>, created_at: i64, window: HistoryWindow) -> Self {
        Self {
            id: id.into(),
            created_at,
            window,
        }
    }

    /// Returns true when no turn has been recorded yet.
    ///
    /// The greeting is only emitted for the first turn of a session.
    #[must_use]
    pub fn is_first_turn(&self) -> bool {
        self.window.is_empty()
    }

    /// Records a turn at the newest end of the transcript.
    pub fn record(&mut self, turn: ConversationTurn) {
        self.window.append(turn);
    }

    /// Returns the number of recorded turns.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.window.len()
    }
}
