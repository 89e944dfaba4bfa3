//! Final prompt assembly.
//!
//! [`PromptAssembler`] lays the identity block, the five context slots, the
//! user question and the response instruction out in a fixed order and
//! enforces the hard prompt ceiling. Out-of-domain messages never reach it;
//! they get a fixed [`RedirectResponse`] instead.

pub mod template;

pub use template::{GREETING, IDENTITY_BLOCK, REDIRECT_MESSAGE};

use crate::compose::{ComposedContext, CompositionReport, SlotName};
use crate::error::{Error, Result};
use crate::io::unicode::char_len;
use serde::Serialize;
use std::fmt;
use template::{
    DATA_HEADER, QUESTION_HEADING, RESPONSE_HEADING, RESPONSE_INSTRUCTION, greeting_line,
    heading_line,
};
use tracing::debug;

/// The prompt handed to the model.
///
/// Built fresh per request and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledPrompt {
    text: String,
    chars: usize,
    is_first_turn: bool,
    report: CompositionReport,
}

impl AssembledPrompt {
    /// Returns the prompt text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the prompt length in characters.
    #[must_use]
    pub const fn char_len(&self) -> usize {
        self.chars
    }

    /// Returns whether the greeting instruction was included.
    #[must_use]
    pub const fn is_first_turn(&self) -> bool {
        self.is_first_turn
    }

    /// Returns how the context budget was applied.
    #[must_use]
    pub const fn report(&self) -> &CompositionReport {
        &self.report
    }
}

impl fmt::Display for AssembledPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Fixed reply for an out-of-domain message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectResponse {
    /// Reply shown to the user as-is.
    pub text: String,
    /// Whether the reply opens with the greeting.
    pub greeted: bool,
}

/// Builds prompts in the fixed section order.
///
/// # Examples
///
/// ```
/// use ekko::compose::{ComposeInput, ContextCompositor};
/// use ekko::prompt::{GREETING, PromptAssembler};
///
/// let context = ContextCompositor::new()
///     .compose(ComposeInput::default(), 2000)
///     .unwrap();
/// let prompt = PromptAssembler::new(24_000)
///     .assemble(&context, "Qual o pH ideal para cafe?", true)
///     .unwrap();
/// assert_eq!(prompt.text().matches(GREETING).count(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptAssembler {
    ceiling: usize,
}

impl PromptAssembler {
    /// Creates an assembler with a hard ceiling in characters.
    #[must_use]
    pub const fn new(prompt_max_chars: usize) -> Self {
        Self {
            ceiling: prompt_max_chars,
        }
    }

    /// Returns the hard prompt ceiling.
    #[must_use]
    pub const fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Returns the size of everything in the prompt except slot content.
    ///
    /// That is the greeting instruction (first turn only), the identity
    /// block, all headings, the user message and the response instruction.
    #[must_use]
    pub fn mandatory_chars(&self, user_message: &str, is_first_turn: bool) -> usize {
        char_len(&render(&[""; 5], user_message, is_first_turn))
    }

    /// Assembles the final prompt.
    ///
    /// # Arguments
    ///
    /// * `context` - The five composed slots.
    /// * `user_message` - The farmer's question.
    /// * `is_first_turn` - Whether to include the greeting instruction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BudgetExceeded`] if the mandatory parts alone exceed
    /// the ceiling, or if the context was composed with a budget larger
    /// than the room left by them.
    pub fn assemble(
        &self,
        context: &ComposedContext,
        user_message: &str,
        is_first_turn: bool,
    ) -> Result<AssembledPrompt> {
        let mandatory = self.mandatory_chars(user_message, is_first_turn);
        if mandatory > self.ceiling {
            return Err(Error::BudgetExceeded {
                required: mandatory,
                ceiling: self.ceiling,
            });
        }

        let slot_texts = SlotName::ALL.map(|name| {
            context
                .slot(name)
                .map_or(name.placeholder(), |slot| slot.text.as_str())
        });
        let text = render(&slot_texts, user_message, is_first_turn);
        let chars = char_len(&text);
        if chars > self.ceiling {
            return Err(Error::BudgetExceeded {
                required: chars,
                ceiling: self.ceiling,
            });
        }

        debug!(chars, mandatory, is_first_turn, "prompt assembled");

        Ok(AssembledPrompt {
            text,
            chars,
            is_first_turn,
            report: context.report().clone(),
        })
    }

    /// Builds the fixed reply for an out-of-domain message.
    #[must_use]
    pub fn redirect(&self, is_first_turn: bool) -> RedirectResponse {
        let text = if is_first_turn {
            format!("{GREETING}\n\n{REDIRECT_MESSAGE}")
        } else {
            REDIRECT_MESSAGE.to_string()
        };
        RedirectResponse {
            text,
            greeted: is_first_turn,
        }
    }
}

/// Lays out the prompt; `slots` is in [`SlotName::ALL`] order.
fn render(slots: &[&str; 5], user_message: &str, is_first_turn: bool) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(10);
    if is_first_turn {
        parts.push(greeting_line());
    }
    parts.push(IDENTITY_BLOCK.to_string());
    parts.push(DATA_HEADER.to_string());
    for (name, text) in SlotName::ALL.iter().zip(slots) {
        parts.push(format!("{}\n{text}", heading_line(name.heading())));
    }
    parts.push(format!("{QUESTION_HEADING}\n{}", user_message.trim()));
    parts.push(format!("{RESPONSE_HEADING}\n{RESPONSE_INSTRUCTION}"));
    parts.join("\n\n")
}
