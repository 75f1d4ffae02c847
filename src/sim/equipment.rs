//! Item definitions and the per-cast equipment snapshot
//!
//! A snapshot is taken when a cast starts. It turns whatever sits in the
//! bait/lure slots into rarity tables and whatever sits in the reel slot into
//! speed multipliers. It is never written back.

use serde::{Deserialize, Serialize};

use super::inventory::Inventory;
use super::rarity::{PerRarity, Rarity, RarityWeights};
use crate::consts::MIN_SPEED_MUL;
use crate::settings::Settings;

/// Speed multipliers carried by a reel item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelSpec {
    /// Applied to the horizontal reel speed while anchored
    pub horizontal_mul: f32,
    /// Applied to the full-reel speed after a catch
    pub full_reel_mul: f32,
    /// Extra full-reel multiplier per rarity of the best catch
    pub per_rarity_mul: PerRarity<f32>,
}

impl Default for ReelSpec {
    fn default() -> Self {
        Self {
            horizontal_mul: 1.0,
            full_reel_mul: 1.0,
            per_rarity_mul: PerRarity::splat(1.0),
        }
    }
}

impl ReelSpec {
    /// Copy with every multiplier raised to `MIN_SPEED_MUL`
    pub fn sanitized(&self) -> Self {
        Self {
            horizontal_mul: self.horizontal_mul.max(MIN_SPEED_MUL),
            full_reel_mul: self.full_reel_mul.max(MIN_SPEED_MUL),
            per_rarity_mul: self.per_rarity_mul.map(|m| m.max(MIN_SPEED_MUL)),
        }
    }
}

/// Item classification as far as fishing cares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    /// Consumed on success and on failure
    Bait { weights: RarityWeights },
    /// Only consumed on failure
    Lure { weights: RarityWeights },
    Reel(ReelSpec),
    Other,
}

/// Static definition of an inventory item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl ItemDef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }

    /// Bait/lure classification and rarity table, if this is tackle
    pub fn tackle(&self) -> Option<(BaitKind, RarityWeights)> {
        match self.kind {
            ItemKind::Bait { weights } => Some((BaitKind::Bait, weights)),
            ItemKind::Lure { weights } => Some((BaitKind::Lure, weights)),
            _ => None,
        }
    }
}

/// A stack of items in one inventory slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub def: ItemDef,
    pub count: u32,
}

impl ItemStack {
    pub fn new(def: ItemDef, count: u32) -> Self {
        Self {
            def,
            count: count.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BaitKind {
    #[default]
    Lure,
    Bait,
}

/// One occupied bait/lure slot at cast time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquippedLure {
    pub slot: usize,
    pub kind: BaitKind,
    /// The item's own table (may be all zero)
    pub weights: RarityWeights,
}

/// Equipment state derived fresh for every cast
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentSnapshot {
    /// Occupied tackle slots in base-index order
    pub lures: Vec<EquippedLure>,
    /// Table of the first equipped tackle, None when nothing usable is equipped
    pub rarity_weights_override: Option<RarityWeights>,
    pub bait_type: BaitKind,
    pub horizontal_speed_mul: f32,
    pub full_reel_base_mul: f32,
    pub per_rarity_mul: PerRarity<f32>,
    /// Restrictive table used whenever no usable tackle table exists
    pub default_weights: RarityWeights,
}

impl EquipmentSnapshot {
    /// Snapshot with nothing equipped
    pub fn unequipped(settings: &Settings) -> Self {
        Self {
            lures: Vec::new(),
            rarity_weights_override: None,
            bait_type: BaitKind::Lure,
            horizontal_speed_mul: 1.0,
            full_reel_base_mul: 1.0,
            per_rarity_mul: PerRarity::splat(1.0),
            default_weights: settings.unequipped_weights,
        }
    }

    /// Read the tackle and reel slots configured in `settings`
    pub fn resolve<I: Inventory + ?Sized>(inventory: &I, settings: &Settings) -> Self {
        let mut snap = Self::unequipped(settings);

        for slot in settings.tackle_slots() {
            if !inventory.in_range(slot) {
                continue;
            }
            let Some((kind, weights)) = inventory.slot(slot).and_then(|s| s.def.tackle()) else {
                continue;
            };
            snap.lures.push(EquippedLure {
                slot,
                kind,
                weights,
            });
        }

        if let Some(first) = snap.lures.first() {
            snap.bait_type = first.kind;
            snap.rarity_weights_override = (!first.weights.is_all_zero()).then_some(first.weights);
        }

        let reel = inventory
            .slot(settings.reel_slot)
            .and_then(|s| match s.def.kind {
                ItemKind::Reel(spec) => Some(spec.sanitized()),
                _ => None,
            });
        if let Some(reel) = reel {
            snap.horizontal_speed_mul = reel.horizontal_mul;
            snap.full_reel_base_mul = reel.full_reel_mul;
            snap.per_rarity_mul = reel.per_rarity_mul;
        }

        log::debug!(
            "Equipment: {} tackle slot(s), bait type {:?}, reel mul h={} full={}",
            snap.lures.len(),
            snap.bait_type,
            snap.horizontal_speed_mul,
            snap.full_reel_base_mul
        );
        snap
    }

    /// Tackle slot and rarity table for catch `index` (round-robin over slots)
    ///
    /// All-zero tables and empty tackle fall back to the restrictive default.
    pub fn weights_for_catch(&self, index: usize) -> (Option<&EquippedLure>, RarityWeights) {
        if self.lures.is_empty() {
            return (None, self.default_weights);
        }
        let lure = &self.lures[index % self.lures.len()];
        (Some(lure), lure.weights.or_fallback(self.default_weights))
    }

    /// Slot kind lookup for consumption bookkeeping
    pub fn kind_of(&self, slot: usize) -> Option<BaitKind> {
        self.lures.iter().find(|l| l.slot == slot).map(|l| l.kind)
    }

    /// Horizontal reel speed while anchored and holding
    pub fn horizontal_reel_speed(&self, settings: &Settings) -> f32 {
        settings.horizontal_reel_base_speed
            * settings.reel_level_factor()
            * self.horizontal_speed_mul
    }

    /// Full-reel speed toward the catch point after landing `rarity`
    pub fn full_reel_speed(&self, settings: &Settings, rarity: Rarity) -> f32 {
        let speed = settings.full_reel_base_speed
            * settings.reel_level_factor()
            * settings.per_rarity_speed.get(rarity)
            * self.full_reel_base_mul
            * self.per_rarity_mul.get(rarity);
        speed.max(settings.min_full_reel_speed)
    }
}
