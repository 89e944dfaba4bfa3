//! Conversation history windowing.
//!
//! [`HistoryWindow`] owns the chronological transcript of one session and
//! produces bounded snapshots for prompt composition. Turns are append-only;
//! trimming only ever removes content from the oldest end.

use crate::core::{ConversationTurn, Role};
use crate::io::unicode::{char_len, tail_chars};
use serde::{Deserialize, Serialize};

/// Prefix marking a turn whose beginning was cut to fit the budget.
pub const CUT_PREFIX: &str = "...";

/// Ordered transcript of a single conversation session.
///
/// # Examples
///
/// ```
/// use ekko::core::ConversationTurn;
/// use ekko::history::HistoryWindow;
///
/// let mut window = HistoryWindow::new();
/// window.append(ConversationTurn::user("Qual o pH ideal para soja?"));
/// window.append(ConversationTurn::assistant("Entre 6.0 e 6.5."));
/// window.append(ConversationTurn::user("E para milho?"));
///
/// let recent = window.snapshot(2, 1000);
/// assert_eq!(recent.len(), 2);
/// assert_eq!(recent[1].text, "E para milho?");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    turns: Vec<ConversationTurn>,
}

impl HistoryWindow {
    /// Creates an empty window.
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Creates a window from turns already in chronological order.
    #[must_use]
    pub const fn from_turns(turns: Vec<ConversationTurn>) -> Self {
        Self { turns }
    }

    /// Appends a turn at the newest end.
    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// Returns all turns, oldest first.
    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Returns the number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true if no turn has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Returns the most recent `n` user turns, newest first.
    pub fn latest_user_turns(&self, n: usize) -> impl Iterator<Item = &ConversationTurn> {
        self.turns
            .iter()
            .rev()
            .filter(|turn| turn.role == Role::User)
            .take(n)
    }

    /// Returns the most recent turns under both caps, oldest first.
    ///
    /// The character budget is applied first: turns are taken from the
    /// newest end while their combined text fits. The turn-count cap is then
    /// applied as a secondary ceiling. When the newest turn alone is larger
    /// than `max_chars`, its tail is kept (prefixed with [`CUT_PREFIX`])
    /// instead of dropping it.
    ///
    /// # Arguments
    ///
    /// * `max_turns` - Maximum number of turns to return.
    /// * `max_chars` - Maximum total characters across returned turn texts.
    #[must_use]
    pub fn snapshot(&self, max_turns: usize, max_chars: usize) -> Vec<ConversationTurn> {
        if max_turns == 0 || max_chars == 0 {
            return Vec::new();
        }

        let mut kept: Vec<ConversationTurn> = Vec::new();
        let mut used = 0usize;

        for turn in self.turns.iter().rev() {
            let size = turn.char_len();
            if used + size > max_chars {
                if kept.is_empty() {
                    kept.push(cut_from_start(turn, max_chars));
                }
                break;
            }
            used += size;
            kept.push(turn.clone());
        }

        kept.truncate(max_turns);
        kept.reverse();
        kept
    }
}

/// Keeps the tail of a turn so that it fits in `max_chars`.
fn cut_from_start(turn: &ConversationTurn, max_chars: usize) -> ConversationTurn {
    let prefix_len = char_len(CUT_PREFIX);
    let text = if max_chars > prefix_len {
        format!(
            "{CUT_PREFIX}{}",
            tail_chars(&turn.text, max_chars - prefix_len)
        )
    } else {
        tail_chars(&turn.text, max_chars).to_string()
    };

    ConversationTurn {
        role: turn.role,
        text,
        timestamp: turn.timestamp,
    }
}
