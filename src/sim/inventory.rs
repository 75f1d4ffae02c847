//! Inventory contract consumed by the fishing core
//!
//! The core only knows fixed slot indices (reel slot, bait/lure slot range)
//! and reads/writes them through this trait. Storage layout and UI belong to
//! the caller.

use super::equipment::ItemStack;

/// Narrow get/set view of an externally owned inventory
pub trait Inventory {
    /// Item in a slot (None when empty or out of range)
    fn slot(&self, index: usize) -> Option<&ItemStack>;
    /// Replace a slot. Out-of-range writes are ignored.
    fn set_slot(&mut self, index: usize, item: Option<ItemStack>);
    fn in_range(&self, index: usize) -> bool;
}

/// Fixed-capacity in-memory inventory
#[derive(Debug, Clone, Default)]
pub struct SlotInventory {
    slots: Vec<Option<ItemStack>>,
}

impl SlotInventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Builder-style slot fill, used when seeding an inventory
    pub fn with(mut self, index: usize, item: ItemStack) -> Self {
        self.set_slot(index, Some(item));
        self
    }

    /// Stack count in a slot (0 when empty)
    pub fn count(&self, index: usize) -> u32 {
        self.slot(index).map(|s| s.count).unwrap_or(0)
    }
}

impl Inventory for SlotInventory {
    fn slot(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    fn set_slot(&mut self, index: usize, item: Option<ItemStack>) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = item;
        }
    }

    fn in_range(&self, index: usize) -> bool {
        index < self.slots.len()
    }
}
