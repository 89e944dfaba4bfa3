//! I/O utilities for Ekko.
//!
//! Provides small-file reading for context inputs, along with the Unicode
//! helpers used for tokenization and budgeted truncation.

pub mod reader;
pub mod unicode;

pub use reader::{read_file, read_json};
pub use unicode::{char_len, normalize, tokenize};
