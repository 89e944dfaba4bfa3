//! Context slot types.

use crate::io::unicode::char_len;
use serde::Serialize;
use std::fmt;

/// The five context sources of a prompt, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotName {
    /// Farmer and property record.
    Farmer,
    /// Knowledge base excerpts.
    Knowledge,
    /// Web search results.
    Web,
    /// Current weather.
    Weather,
    /// Recent conversation turns.
    History,
}

impl SlotName {
    /// All slots in rendering order.
    pub const ALL: [Self; 5] = [
        Self::Farmer,
        Self::Knowledge,
        Self::Web,
        Self::Weather,
        Self::History,
    ];

    /// Returns the position of the slot in rendering order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the slot identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Knowledge => "knowledge",
            Self::Web => "web",
            Self::Weather => "weather",
            Self::History => "history",
        }
    }

    /// Returns the section heading used in the prompt.
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Farmer => "DADOS DO AGRICULTOR",
            Self::Knowledge => "BASE DE CONHECIMENTO TECNICA",
            Self::Web => "DADOS DA WEB",
            Self::Weather => "CLIMA ATUAL",
            Self::History => "HISTORICO DA CONVERSA",
        }
    }

    /// Returns the text rendered when the source has nothing to offer.
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Farmer => "Nenhum dado do agricultor vinculado.",
            Self::Knowledge => "Nenhum contexto local disponivel.",
            Self::Web => "Nenhum dado da web disponivel.",
            Self::Weather => "Nenhum dado climatico disponivel.",
            Self::History => "Inicio da conversa.",
        }
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// History text when every turn was dropped to fit the budget.
///
/// Never longer than the history placeholder, so the placeholder footprint
/// stays the smallest possible context.
pub const HISTORY_OMITTED: &str = "Historico omitido.";

/// Rendered content of one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextSlot {
    /// Which source this slot holds.
    pub name: SlotName,
    /// Rendered text (the placeholder when `present` is false).
    pub text: String,
    /// Whether the source supplied usable data.
    pub present: bool,
}

impl ContextSlot {
    /// Creates a slot holding real content.
    #[must_use]
    pub fn filled(name: SlotName, text: impl Into<String>) -> Self {
        Self {
            name,
            text: text.into(),
            present: true,
        }
    }

    /// Creates a slot holding its placeholder.
    #[must_use]
    pub fn absent(name: SlotName) -> Self {
        Self {
            name,
            text: name.placeholder().to_string(),
            present: false,
        }
    }

    /// Creates a history slot for a conversation whose turns were all
    /// dropped, so it does not read as a fresh conversation.
    #[must_use]
    pub fn history_omitted() -> Self {
        Self {
            name: SlotName::History,
            text: HISTORY_OMITTED.to_string(),
            present: false,
        }
    }

    /// Returns the rendered length in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        char_len(&self.text)
    }
}

/// Total characters of all five placeholders.
///
/// This is the smallest context any composition can produce.
#[must_use]
pub fn placeholder_footprint() -> usize {
    SlotName::ALL
        .iter()
        .map(|name| char_len(name.placeholder()))
        .sum()
}
