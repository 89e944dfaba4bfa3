//! Conversation turn representation.
//!
//! A turn is one message in a conversation, either from the farmer or from
//! the assistant. Turns are plain values; ordering is owned by
//! [`HistoryWindow`](crate::history::HistoryWindow).

use crate::io::unicode::char_len;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The farmer asking questions.
    User,
    /// The assistant's previous replies.
    Assistant,
}

impl Role {
    /// Returns the storage/serialization name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Returns the label used when rendering the history slot.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "Usuario",
            Self::Assistant => "Ekko",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" | "usuario" => Ok(Self::User),
            "assistant" | "ekko" => Ok(Self::Assistant),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A single message in a conversation.
///
/// # Examples
///
/// ```
/// use ekko::core::{ConversationTurn, Role};
///
/// let turn = ConversationTurn::user("Qual o pH ideal para cafe?");
/// assert_eq!(turn.role, Role::User);
/// assert_eq!(turn.char_len(), 26);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Author of the message.
    pub role: Role,

    /// Message text.
    pub text: String,

    /// Unix timestamp when the message was recorded.
    pub timestamp: i64,
}

impl ConversationTurn {
    /// Creates a turn stamped with the current time.
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self::at(role, text, current_timestamp())
    }

    /// Creates a turn with an explicit timestamp.
    #[must_use]
    pub fn at(role: Role, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp,
        }
    }

    /// Creates a user turn stamped with the current time.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Creates an assistant turn stamped with the current time.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// Returns the text length in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        char_len(&self.text)
    }
}

/// Returns the current Unix timestamp in seconds.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_names() {
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!("Assistant".parse::<Role>(), Ok(Role::Assistant));
        assert_eq!("ekko".parse::<Role>(), Ok(Role::Assistant));
        assert!("system".parse::<Role>().is_err());
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::User.label(), "Usuario");
        assert_eq!(Role::Assistant.label(), "Ekko");
    }

    #[test]
    fn test_turn_constructors() {
        let turn = ConversationTurn::at(Role::Assistant, "Use calcario.", 42);
        assert_eq!(turn.timestamp, 42);
        assert_eq!(turn.text, "Use calcario.");

        let turn = ConversationTurn::user("oi");
        assert!(turn.timestamp > 0);
    }

    #[test]
    fn test_turn_char_len_is_unicode_aware() {
        let turn = ConversationTurn::user("adubação");
        assert_eq!(turn.char_len(), 8);
    }

    #[test]
    fn test_turn_serialization() {
        let turn = ConversationTurn::at(Role::User, "e a dosagem?", 7);
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        let back: ConversationTurn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, turn);
    }
}
