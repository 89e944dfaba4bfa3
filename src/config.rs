//! Assembly budgets and limits.
//!
//! All sizes are in characters (Unicode scalar values). A JSON config file
//! may set any subset of fields; the rest keep their defaults.

use crate::classifier::{DEFAULT_FOLLOW_UP_LOOKBACK, DEFAULT_FOLLOW_UP_MAX_WORDS, FollowUpPolicy};
use crate::compose::placeholder_footprint;
use crate::error::{Error, Result};
use crate::io::read_json;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default maximum number of history turns in a prompt.
pub const DEFAULT_HISTORY_MAX_TURNS: usize = 10;

/// Default character budget for the history snapshot.
pub const DEFAULT_HISTORY_MAX_CHARS: usize = 4000;

/// Default number of knowledge excerpts per request.
pub const DEFAULT_KNOWLEDGE_TOP_K: usize = 3;

/// Default per-excerpt character budget.
pub const DEFAULT_KNOWLEDGE_EXCERPT_CHARS: usize = 1200;

/// Default budget for all five context slots combined.
pub const DEFAULT_CONTEXT_MAX_CHARS: usize = 12_000;

/// Default hard ceiling for the whole prompt.
pub const DEFAULT_PROMPT_MAX_CHARS: usize = 24_000;

/// Budgets and limits for context assembly.
///
/// # Examples
///
/// ```
/// use ekko::config::AssemblyConfig;
///
/// let config: AssemblyConfig = serde_json::from_str(r#"{"knowledge_top_k": 5}"#).unwrap();
/// assert_eq!(config.knowledge_top_k, 5);
/// assert_eq!(config.history_max_turns, 10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblyConfig {
    /// Maximum number of history turns in a prompt.
    pub history_max_turns: usize,
    /// Character budget for the history snapshot.
    pub history_max_chars: usize,
    /// Number of knowledge excerpts per request.
    pub knowledge_top_k: usize,
    /// Per-excerpt character budget.
    pub knowledge_excerpt_chars: usize,
    /// Budget for all five context slots combined.
    pub context_max_chars: usize,
    /// Hard ceiling for the whole prompt.
    pub prompt_max_chars: usize,
    /// A follow-up message has at most this many words.
    pub follow_up_max_words: usize,
    /// Recent user turns consulted to accept a follow-up.
    pub follow_up_lookback_turns: usize,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            history_max_turns: DEFAULT_HISTORY_MAX_TURNS,
            history_max_chars: DEFAULT_HISTORY_MAX_CHARS,
            knowledge_top_k: DEFAULT_KNOWLEDGE_TOP_K,
            knowledge_excerpt_chars: DEFAULT_KNOWLEDGE_EXCERPT_CHARS,
            context_max_chars: DEFAULT_CONTEXT_MAX_CHARS,
            prompt_max_chars: DEFAULT_PROMPT_MAX_CHARS,
            follow_up_max_words: DEFAULT_FOLLOW_UP_MAX_WORDS,
            follow_up_lookback_turns: DEFAULT_FOLLOW_UP_LOOKBACK,
        }
    }
}

impl AssemblyConfig {
    /// Loads and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON for
    /// this structure, or fails [`validate`](Self::validate).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = read_json(path.as_ref()).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks budget consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if any budget is zero, the context budget
    /// cannot hold the five placeholders, or the context budget is not
    /// smaller than the prompt ceiling.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("history_max_turns", self.history_max_turns),
            ("history_max_chars", self.history_max_chars),
            ("knowledge_top_k", self.knowledge_top_k),
            ("knowledge_excerpt_chars", self.knowledge_excerpt_chars),
            ("context_max_chars", self.context_max_chars),
            ("prompt_max_chars", self.prompt_max_chars),
            ("follow_up_max_words", self.follow_up_max_words),
            ("follow_up_lookback_turns", self.follow_up_lookback_turns),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(Error::config(format!("{field} must be > 0")));
        }

        let footprint = placeholder_footprint();
        if self.context_max_chars < footprint {
            return Err(Error::config(format!(
                "context_max_chars ({}) must be at least {footprint} to hold the placeholders",
                self.context_max_chars
            )));
        }

        if self.context_max_chars >= self.prompt_max_chars {
            return Err(Error::config(format!(
                "context_max_chars ({}) must be smaller than prompt_max_chars ({})",
                self.context_max_chars, self.prompt_max_chars
            )));
        }

        Ok(())
    }

    /// Returns the classifier follow-up policy.
    #[must_use]
    pub const fn follow_up_policy(&self) -> FollowUpPolicy {
        FollowUpPolicy {
            max_words: self.follow_up_max_words,
            lookback_turns: self.follow_up_lookback_turns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AssemblyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = AssemblyConfig {
            knowledge_top_k: 0,
            ..AssemblyConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("knowledge_top_k"));
    }

    #[test]
    fn test_context_must_hold_placeholders() {
        let config = AssemblyConfig {
            context_max_chars: 20,
            ..AssemblyConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_context_below_prompt_ceiling() {
        let config = AssemblyConfig {
            context_max_chars: 24_000,
            prompt_max_chars: 24_000,
            ..AssemblyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"history_max_turns": 4, "prompt_max_chars": 30000}}"#).unwrap();
        let config = AssemblyConfig::from_file(file.path()).unwrap();
        assert_eq!(config.history_max_turns, 4);
        assert_eq!(config.prompt_max_chars, 30_000);
        assert_eq!(config.context_max_chars, DEFAULT_CONTEXT_MAX_CHARS);
    }

    #[test]
    fn test_from_file_rejects_unknown_field() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"history_turns": 4}}"#).unwrap();
        assert!(matches!(
            AssemblyConfig::from_file(file.path()),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_from_file_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"context_max_chars": 0}}"#).unwrap();
        assert!(AssemblyConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_follow_up_policy() {
        let policy = AssemblyConfig::default().follow_up_policy();
        assert_eq!(policy.max_words, 8);
        assert_eq!(policy.lookback_turns, 4);
    }
}
