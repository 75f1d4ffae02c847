//! Bait and lure consumption rules
//!
//! - Success: one unit from every distinct bait slot that produced a catch.
//!   Lures are never consumed on success.
//! - Failure: one unit from the first occupied tackle slot, bait or lure.
//!
//! Empty or out-of-range slots are skipped without touching the inventory.

use std::collections::BTreeSet;

use super::equipment::{BaitKind, EquipmentSnapshot};
use super::inventory::Inventory;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    Fail,
}

/// Which slots an outcome consumed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOutcome {
    pub kind: OutcomeKind,
    pub consumed_slots: BTreeSet<usize>,
}

impl ResourceOutcome {
    fn new(kind: OutcomeKind) -> Self {
        Self {
            kind,
            consumed_slots: BTreeSet::new(),
        }
    }
}

/// Take one unit from a slot, clearing it when the stack runs out
///
/// Returns false (and changes nothing) for empty or out-of-range slots.
pub fn decrement_slot<I: Inventory + ?Sized>(inventory: &mut I, index: usize) -> bool {
    if !inventory.in_range(index) {
        return false;
    }
    let Some(mut stack) = inventory.slot(index).cloned() else {
        return false;
    };
    stack.count = stack.count.saturating_sub(1);
    if stack.count == 0 {
        log::debug!("Slot {} used up ({})", index, stack.def.name);
        inventory.set_slot(index, None);
    } else {
        inventory.set_slot(index, Some(stack));
    }
    true
}

/// Consume after a successful release
///
/// `used_slots` are the tackle slots the catches drew from. Each distinct
/// bait slot loses exactly one unit.
pub fn consume_on_success<I: Inventory + ?Sized>(
    inventory: &mut I,
    snapshot: &EquipmentSnapshot,
    used_slots: impl IntoIterator<Item = usize>,
) -> ResourceOutcome {
    let mut outcome = ResourceOutcome::new(OutcomeKind::Success);
    let distinct: BTreeSet<usize> = used_slots.into_iter().collect();
    for slot in distinct {
        if snapshot.kind_of(slot) != Some(BaitKind::Bait) {
            continue;
        }
        if decrement_slot(inventory, slot) {
            outcome.consumed_slots.insert(slot);
        }
    }
    outcome
}

/// Consume after any failure
pub fn consume_on_fail<I: Inventory + ?Sized>(
    inventory: &mut I,
    settings: &Settings,
) -> ResourceOutcome {
    let mut outcome = ResourceOutcome::new(OutcomeKind::Fail);
    let first = settings.tackle_slots().find(|&i| {
        inventory
            .slot(i)
            .is_some_and(|s| s.def.tackle().is_some())
    });
    if let Some(slot) = first {
        if decrement_slot(inventory, slot) {
            outcome.consumed_slots.insert(slot);
        }
    }
    outcome
}
