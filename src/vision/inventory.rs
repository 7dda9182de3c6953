//! Inventory grid geometry
//!
//! Maps inventory slots to screen rectangles so slots can be both
//! recognized and used as move goals.

use serde::{Deserialize, Serialize};

use super::VisionError;

/// A slot in the inventory grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventorySlot {
    pub row: u32,
    pub column: u32,
}

impl InventorySlot {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Screen placement of the inventory grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLayout {
    /// Top-left corner of slot (0, 0)
    pub origin_x: u32,
    pub origin_y: u32,
    /// Size of one slot in pixels
    pub slot_width: u32,
    pub slot_height: u32,
    pub rows: u32,
    pub columns: u32,
}

impl Default for InventoryLayout {
    fn default() -> Self {
        Self {
            origin_x: 560,
            origin_y: 210,
            slot_width: 42,
            slot_height: 36,
            rows: 4,
            columns: 7,
        }
    }
}

impl InventoryLayout {
    /// Whether the slot lies inside the grid
    pub fn contains(&self, slot: InventorySlot) -> bool {
        slot.row < self.rows && slot.column < self.columns
    }

    /// `(x, y, width, height)` of a slot on screen
    pub fn slot_rect(&self, slot: InventorySlot) -> Result<(u32, u32, u32, u32), VisionError> {
        if !self.contains(slot) {
            return Err(VisionError::InvalidSlot(slot));
        }

        Ok((
            self.origin_x + slot.column * self.slot_width,
            self.origin_y + slot.row * self.slot_height,
            self.slot_width,
            self.slot_height,
        ))
    }

    /// Centre of a slot, usable as a move goal
    pub fn slot_center(&self, slot: InventorySlot) -> Result<(i32, i32), VisionError> {
        let (x, y, w, h) = self.slot_rect(slot)?;
        Ok(((x + w / 2) as i32, (y + h / 2) as i32))
    }

    /// Every slot, row by row
    pub fn slots(&self) -> impl Iterator<Item = InventorySlot> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns).map(move |column| InventorySlot { row, column })
        })
    }

    /// Right and bottom edge of the whole grid
    pub fn extent(&self) -> (u32, u32) {
        (
            self.origin_x + self.columns * self.slot_width,
            self.origin_y + self.rows * self.slot_height,
        )
    }
}
