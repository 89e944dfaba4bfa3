//! Agronomy knowledge base.
//!
//! The knowledge base is a fixed set of labeled sections (soil analysis,
//! products, irrigation, pests, prices, best practices, official sources).
//! It is loaded once, validated, and then served read-only through a
//! deterministic keyword lookup.

pub mod builtin;
pub mod section;
pub mod store;

pub use builtin::{BUILTIN_TEXT, BUILTIN_VERSION, builtin_sections};
pub use section::{KnowledgeExcerpt, KnowledgeSection};
pub use store::KnowledgeStore;

/// Marker appended to excerpts cut to fit the per-section budget.
pub const TRUNCATION_MARKER: &str = "[... trecho truncado ...]";
