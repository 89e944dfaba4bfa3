//! CLI layer for Ekko.
//!
//! Provides the command-line interface using clap, with commands for
//! preparing prompts, recording conversation turns, and inspecting the
//! knowledge base and session store.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
