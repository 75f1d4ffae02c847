//! Deterministic fishing simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (tackle slots ascending, catches by spawn index)
//! - No rendering, physics or platform dependencies

pub mod ballistic;
pub mod catch;
pub mod consume;
pub mod equipment;
pub mod inventory;
pub mod line;
pub mod rarity;
pub mod session;
pub mod tick;

pub use ballistic::launch_velocity;
pub use catch::{
    CatchCatalog, CatchDef, CatchInstance, CatchResult, CatchSpawn, NoCollideGroup,
    ReleasePoint, distribute_catches,
};
pub use consume::{OutcomeKind, ResourceOutcome, consume_on_fail, consume_on_success};
pub use equipment::{BaitKind, EquipmentSnapshot, ItemDef, ItemKind, ItemStack, ReelSpec};
pub use inventory::{Inventory, SlotInventory};
pub use line::Rect;
pub use rarity::{PerRarity, Rarity, RarityWeights};
pub use session::{
    CastReelSession, CastSession, CastState, CatchId, Feedback, Intent, Platform, ReelKind, Rig,
};
pub use tick::{ActionInput, TickInput, tick};
