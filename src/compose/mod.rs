//! Context composition under a character budget.
//!
//! [`ContextCompositor`] turns the raw context sources of one request into
//! exactly five rendered slots (farmer, knowledge, web, weather, history).
//! When the rendered slots exceed the budget, content is shed in a fixed
//! order:
//!
//! 1. oldest history turns
//! 2. lowest-scored knowledge excerpts
//! 3. web text, then weather text, then the farmer record (line-boundary
//!    cut with a marker)
//!
//! The first of those three that can take the whole cut and keep some text
//! is cut. A slot is reduced to its placeholder only when none can.
//!
//! Web, weather and farmer data are never touched while any history turn or
//! knowledge excerpt remains.

pub mod render;
pub mod slot;

pub use render::{EXCERPT_DELIMITER, UNKNOWN_VALUE};
pub use slot::{ContextSlot, HISTORY_OMITTED, SlotName, placeholder_footprint};

use crate::core::{ConversationTurn, FarmerRecord};
use crate::error::{Error, Result};
use crate::io::unicode::{char_len, truncate_with_marker};
use crate::knowledge::KnowledgeExcerpt;
use serde::Serialize;
use tracing::{debug, warn};

/// Marker appended to web, weather or farmer text cut to fit the budget.
pub const SLOT_TRUNCATION_MARKER: &str = "[... dados truncados ...]";

/// Raw context sources for one request.
#[derive(Debug, Clone, Default)]
pub struct ComposeInput<'a> {
    /// Farmer record, when one is linked.
    pub farmer: Option<&'a FarmerRecord>,
    /// Web search text.
    pub web: Option<&'a str>,
    /// Weather text.
    pub weather: Option<&'a str>,
    /// Knowledge excerpts, highest score first.
    pub knowledge: Vec<KnowledgeExcerpt>,
    /// History snapshot, oldest first.
    pub history: Vec<ConversationTurn>,
}

/// Per-slot outcome of a composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotReport {
    /// Slot this entry describes.
    pub name: SlotName,
    /// Final rendered size in characters.
    pub chars: usize,
    /// Whole items removed (history turns or knowledge excerpts).
    pub dropped: usize,
    /// Whether the slot text was cut.
    pub truncated: bool,
}

/// Read-only summary of how the budget was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionReport {
    /// Budget the composition was asked to meet.
    pub budget: usize,
    /// Final total of all slot sizes.
    pub total_chars: usize,
    /// One entry per slot, in rendering order.
    pub slots: Vec<SlotReport>,
}

impl CompositionReport {
    /// Returns the report for one slot.
    #[must_use]
    pub fn slot(&self, name: SlotName) -> Option<&SlotReport> {
        self.slots.iter().find(|report| report.name == name)
    }

    /// Returns true if any content was dropped or cut.
    #[must_use]
    pub fn trimmed(&self) -> bool {
        self.slots
            .iter()
            .any(|report| report.dropped > 0 || report.truncated)
    }
}

/// The five rendered slots plus the composition report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedContext {
    slots: Vec<ContextSlot>,
    report: CompositionReport,
}

impl ComposedContext {
    /// Returns the slots in rendering order.
    #[must_use]
    pub fn slots(&self) -> &[ContextSlot] {
        &self.slots
    }

    /// Returns one slot by name.
    #[must_use]
    pub fn slot(&self, name: SlotName) -> Option<&ContextSlot> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    /// Returns the composition report.
    #[must_use]
    pub const fn report(&self) -> &CompositionReport {
        &self.report
    }

    /// Returns the summed size of all slots in characters.
    #[must_use]
    pub fn total_chars(&self) -> usize {
        self.slots.iter().map(ContextSlot::char_len).sum()
    }
}

/// Builds the five context slots under a budget.
///
/// Stateless; one compositor can serve concurrent requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextCompositor;

impl ContextCompositor {
    /// Creates a compositor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Renders and fits the context sources.
    ///
    /// # Arguments
    ///
    /// * `input` - Raw sources for this request.
    /// * `budget` - Maximum summed slot size in characters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BudgetExceeded`] if the slots cannot fit even after
    /// every source has been reduced to its placeholder.
    ///
    /// # Examples
    ///
    /// ```
    /// use ekko::compose::{ComposeInput, ContextCompositor, SlotName};
    ///
    /// let composed = ContextCompositor::new()
    ///     .compose(ComposeInput::default(), 2000)
    ///     .unwrap();
    /// assert_eq!(composed.slots().len(), 5);
    /// assert!(!composed.slot(SlotName::Web).unwrap().present);
    /// ```
    pub fn compose(&self, input: ComposeInput<'_>, budget: usize) -> Result<ComposedContext> {
        let ComposeInput {
            farmer,
            web,
            weather,
            mut knowledge,
            mut history,
        } = input;

        let mut slots = [
            render::farmer_slot(farmer),
            render::knowledge_slot(&knowledge),
            render::text_slot(SlotName::Web, web),
            render::text_slot(SlotName::Weather, weather),
            render::history_slot(&history),
        ];
        let mut dropped = [0usize; 5];
        let mut truncated = [false; 5];

        // Whole items first: oldest history turns, then lowest-scored excerpts
        while total_chars(&slots) > budget {
            if !history.is_empty() {
                history.remove(0);
                dropped[SlotName::History.index()] += 1;
                slots[SlotName::History.index()] = if history.is_empty() {
                    ContextSlot::history_omitted()
                } else {
                    render::history_slot(&history)
                };
            } else if knowledge.pop().is_some() {
                dropped[SlotName::Knowledge.index()] += 1;
                slots[SlotName::Knowledge.index()] = render::knowledge_slot(&knowledge);
            } else {
                break;
            }
        }

        if dropped.iter().any(|count| *count > 0) {
            debug!(
                history_dropped = dropped[SlotName::History.index()],
                knowledge_dropped = dropped[SlotName::Knowledge.index()],
                budget,
                "dropped context items to fit budget"
            );
        }

        // A slot is cut only when real text survives the cut; a later slot
        // absorbs the excess instead of wiping a short source out
        for name in CUT_ORDER {
            let excess = total_chars(&slots).saturating_sub(budget);
            if excess == 0 {
                break;
            }
            if let Some(cut) = cut_slot(&slots[name.index()], excess)
                && cut.present
            {
                apply_cut(&mut slots, &mut truncated, cut);
            }
        }

        // Nothing could absorb it alone: fall back to placeholders in order
        for name in CUT_ORDER {
            let excess = total_chars(&slots).saturating_sub(budget);
            if excess == 0 {
                break;
            }
            if let Some(cut) = cut_slot(&slots[name.index()], excess) {
                apply_cut(&mut slots, &mut truncated, cut);
            }
        }

        let total = total_chars(&slots);
        if total > budget {
            return Err(Error::BudgetExceeded {
                required: total,
                ceiling: budget,
            });
        }

        let report = CompositionReport {
            budget,
            total_chars: total,
            slots: slots
                .iter()
                .map(|slot| SlotReport {
                    name: slot.name,
                    chars: slot.char_len(),
                    dropped: dropped[slot.name.index()],
                    truncated: truncated[slot.name.index()],
                })
                .collect(),
        };

        debug!(total, budget, "context composed");

        Ok(ComposedContext {
            slots: slots.to_vec(),
            report,
        })
    }
}

fn total_chars(slots: &[ContextSlot]) -> usize {
    slots.iter().map(ContextSlot::char_len).sum()
}

/// Slots cut, in order, once no history or knowledge is left to drop.
const CUT_ORDER: [SlotName; 3] = [SlotName::Web, SlotName::Weather, SlotName::Farmer];

/// Cuts `excess` characters from a slot at a line boundary.
///
/// Falls back to the placeholder when no text survives the cut. Returns
/// `None` when the slot has nothing to give: it is already a placeholder,
/// or the result would not be shorter than the current text.
fn cut_slot(slot: &ContextSlot, excess: usize) -> Option<ContextSlot> {
    if !slot.present {
        return None;
    }

    let before = slot.char_len();
    let target = before.saturating_sub(excess);
    let (text, _) = truncate_with_marker(&slot.text, target, SLOT_TRUNCATION_MARKER);
    let cut = if text == SLOT_TRUNCATION_MARKER || char_len(&text) > target {
        ContextSlot::absent(slot.name)
    } else {
        ContextSlot::filled(slot.name, text)
    };

    (cut.char_len() < before).then_some(cut)
}

fn apply_cut(slots: &mut [ContextSlot; 5], truncated: &mut [bool; 5], cut: ContextSlot) {
    let index = cut.name.index();
    warn!(
        slot = %cut.name,
        before = slots[index].char_len(),
        after = cut.char_len(),
        "context slot truncated to fit budget"
    );
    truncated[index] = true;
    slots[index] = cut;
}
