//! Error types for Ekko operations.
//!
//! This module provides the error hierarchy using `thiserror` for the
//! context engine, the knowledge store, the session store, file I/O and
//! CLI commands.
//!
//! Only configuration problems and hard budget violations are errors for
//! the context engine itself. Missing or oversized context is normalized
//! (placeholders, truncation) and never reported through this type, and an
//! out-of-domain message is a classifier verdict, not a failure.

use thiserror::Error;

/// Result type alias for Ekko operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Ekko operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Template, budget or content misconfiguration.
    ///
    /// Fatal: surfaced to the operator, never to the end user.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// The mandatory parts of the prompt cannot fit under the hard ceiling.
    #[error("prompt budget exceeded: {required} characters required, ceiling is {ceiling}")]
    BudgetExceeded {
        /// Characters the prompt needs at minimum.
        required: usize,
        /// Configured hard ceiling.
        ceiling: usize,
    },

    /// Knowledge base loading or validation errors.
    #[error("knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    /// Session store errors (database operations).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),
}

impl Error {
    /// Builds a configuration error from any displayable message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true for errors that mean no valid prompt can be produced.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::BudgetExceeded { .. } | Self::Knowledge(_)
        )
    }
}

/// Knowledge base errors raised while loading or validating sections.
#[derive(Error, Debug)]
pub enum KnowledgeError {
    /// The knowledge base has no sections.
    #[error("knowledge base is empty")]
    Empty,

    /// Two sections share the same identifier.
    #[error("duplicate section id: {id}")]
    DuplicateSection {
        /// The repeated identifier.
        id: String,
    },

    /// A section has no body text.
    #[error("section {id} has an empty body")]
    EmptyBody {
        /// Section identifier.
        id: String,
    },

    /// A section has no lookup keywords.
    #[error("section {id} has no keywords")]
    NoKeywords {
        /// Section identifier.
        id: String,
    },

    /// The knowledge source could not be parsed.
    #[error("invalid knowledge source: {0}")]
    Parse(String),
}

/// Session store errors for database operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(String),

    /// Storage not initialized (init command not run).
    #[error("Ekko session store not initialized. Run: ekko init")]
    NotInitialized,

    /// Session not found by ID.
    #[error("session not found: {id}")]
    SessionNotFound {
        /// Session ID that was not found.
        id: String,
    },

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// File content is not the expected JSON shape.
    #[error("invalid JSON in {path}: {reason}")]
    InvalidJson {
        /// Path to the file.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),
}

// Implement From traits for standard library and dependency errors

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Database(err.to_string()))
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<regex::Error> for KnowledgeError {
    fn from(err: regex::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
