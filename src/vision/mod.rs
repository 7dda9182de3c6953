//! Screen recognition boundary
//!
//! The replay engine does not depend on this module. It gives the
//! surrounding automation a read-only view of what sits in each inventory
//! slot, and slot geometry that can be handed to the engine as move goals.

pub mod inventory;
pub mod recognition;

pub use inventory::{InventoryLayout, InventorySlot};
pub use recognition::TemplateRecognizer;

/// Label reported for a slot that matches no known item
pub const EMPTY_SLOT: &str = "empty";

/// Identifies the item shown in an inventory slot
pub trait ItemRecognizer {
    /// Item label for the slot, or `EMPTY_SLOT`
    fn identify(&self, slot: InventorySlot) -> Result<String, VisionError>;
}

/// Vision system errors
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("Slot ({}, {}) is outside the inventory grid", .0.row, .0.column)]
    InvalidSlot(InventorySlot),
    #[error("No screenshot loaded")]
    NoFrame,
    #[error("Screenshot {width}x{height} does not cover the inventory grid")]
    FrameTooSmall { width: u32, height: u32 },
    #[error("Failed to load template: {0}")]
    TemplateLoadError(String),
}
