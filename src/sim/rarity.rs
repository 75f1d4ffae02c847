//! Rarity tiers and the weighted rarity lottery
//!
//! Weights are scanned in the fixed declared order Common -> Legendary. That
//! order is the tie-break rule, so a seeded RNG reproduces the same draws.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rarity tier of a catch (ordered, Common lowest)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// All tiers in scan order
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    /// Tier index (Common = 0)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// One value per rarity tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerRarity<T> {
    pub common: T,
    pub uncommon: T,
    pub rare: T,
    pub epic: T,
    pub legendary: T,
}

impl<T: Copy> PerRarity<T> {
    /// Same value for every tier
    pub const fn splat(v: T) -> Self {
        Self {
            common: v,
            uncommon: v,
            rare: v,
            epic: v,
            legendary: v,
        }
    }

    pub fn get(&self, rarity: Rarity) -> T {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
        }
    }

    pub fn get_mut(&mut self, rarity: Rarity) -> &mut T {
        match rarity {
            Rarity::Common => &mut self.common,
            Rarity::Uncommon => &mut self.uncommon,
            Rarity::Rare => &mut self.rare,
            Rarity::Epic => &mut self.epic,
            Rarity::Legendary => &mut self.legendary,
        }
    }

    /// Apply `f` to every tier
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> PerRarity<U> {
        PerRarity {
            common: f(self.common),
            uncommon: f(self.uncommon),
            rare: f(self.rare),
            epic: f(self.epic),
            legendary: f(self.legendary),
        }
    }

    /// (tier, value) pairs in scan order
    pub fn iter(&self) -> impl Iterator<Item = (Rarity, T)> + '_ {
        Rarity::ALL.into_iter().map(move |r| (r, self.get(r)))
    }
}

impl Default for PerRarity<f32> {
    fn default() -> Self {
        Self::splat(1.0)
    }
}

/// Lottery weights per tier. Negative entries count as zero.
pub type RarityWeights = PerRarity<i32>;

impl PerRarity<i32> {
    /// Every tier equally likely
    pub const ONES: RarityWeights = PerRarity::splat(1);

    /// Weight of a tier, clamped to >= 0
    #[inline]
    pub fn weight(&self, rarity: Rarity) -> u32 {
        self.get(rarity).max(0) as u32
    }

    /// Sum of the clamped weights
    pub fn total(&self) -> u32 {
        Rarity::ALL.iter().map(|&r| self.weight(r)).sum()
    }

    /// True when no tier can be drawn (treated as "absent")
    pub fn is_all_zero(&self) -> bool {
        self.total() == 0
    }

    /// This table, or `fallback` when it is all zero
    pub fn or_fallback(self, fallback: RarityWeights) -> RarityWeights {
        if self.is_all_zero() { fallback } else { self }
    }

    /// Resolve a roll in `[0, total)` with the fixed-order cumulative scan
    ///
    /// Returns Common when the table is empty or the roll is out of range.
    pub fn pick(&self, mut roll: u32) -> Rarity {
        for rarity in Rarity::ALL {
            let w = self.weight(rarity);
            if roll < w {
                return rarity;
            }
            roll -= w;
        }
        Rarity::Common
    }

    /// Draw one tier
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Rarity {
        let total = self.total();
        if total == 0 {
            return Rarity::Common;
        }
        self.pick(rng.random_range(0..total))
    }
}
