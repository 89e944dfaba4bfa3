//! # Ekko
//!
//! Context assembly for a Brazilian agriculture assistant.
//!
//! Ekko decides whether a farmer's message belongs to the agricultural
//! domain, gathers the context the model needs to answer it, and renders
//! the final prompt under a fixed character ceiling.
//!
//! ## Features
//!
//! - **Topic classification**: deterministic vocabulary matching with follow-up detection
//! - **Knowledge lookup**: ranked, truncated excerpts from a sectioned knowledge base
//! - **History windows**: newest-first turn selection under turn and character caps
//! - **Budgeted composition**: five ordered slots trimmed in a fixed priority order
//! - **`SQLite` sessions**: persistent conversation transcripts for the CLI

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![warn(unsafe_code)]

pub mod classifier;
pub mod cli;
pub mod compose;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod history;
pub mod io;
pub mod knowledge;
pub mod prompt;
pub mod storage;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use crate::core::{ConversationSession, ConversationTurn, FarmerRecord, Role, SoilReadings};

// Re-export pipeline components
pub use classifier::{FollowUpPolicy, TopicClassifier, Verdict};
pub use compose::{ComposeInput, ComposedContext, CompositionReport, ContextCompositor, SlotName};
pub use config::AssemblyConfig;
pub use engine::{Assembly, AssemblyRequest, ContextEngine};
pub use history::HistoryWindow;
pub use knowledge::{KnowledgeExcerpt, KnowledgeSection, KnowledgeStore};
pub use prompt::{AssembledPrompt, PromptAssembler, RedirectResponse};

// Re-export storage types
pub use storage::{DEFAULT_DB_PATH, SessionStore, SqliteStorage};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
