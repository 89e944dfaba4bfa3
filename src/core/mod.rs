//! Core domain models for Ekko.
//!
//! Conversation turns, sessions and the farmer's property record. These are
//! plain data types with no I/O dependencies.

pub mod farmer;
pub mod session;
pub mod turn;

pub use farmer::{FarmerRecord, SoilReadings};
pub use session::ConversationSession;
pub use turn::{ConversationTurn, Role};
