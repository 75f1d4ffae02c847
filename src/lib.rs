//! Breakwater Fishing - a timing-skill fishing core
//!
//! Core modules:
//! - `sim`: Deterministic fishing simulation (cast/reel state machine, bite
//!   window, rarity lottery, ballistic catch launch, resource consumption)
//! - `settings`: Data-driven tuning loaded from JSON
//! - `error`: Setup/loading errors
//!
//! Rendering, input polling, physics integration and inventory UI live outside
//! this crate. They talk to the core through `sim::TickInput`, the
//! `sim::Inventory` trait and the `sim::Intent` list drained after every tick.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the demo loop (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// World gravity (units/s², negative is down)
    pub const GRAVITY: f32 = -9.81;

    /// Clamp applied by the ballistic solver to degenerate heights and times
    pub const BALLISTIC_EPSILON: f32 = 1e-4;

    /// Lower bound for every reel-speed multiplier coming from equipment
    pub const MIN_SPEED_MUL: f32 = 0.01;

    /// Price bonus per rarity tier index when valuing a catch
    pub const RARITY_PRICE_STEP: i32 = 50;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Where `v` sits between `a` and `b`, clamped to [0, 1]
///
/// Returns 0 when the range is empty.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((v - a) / (b - a)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_lerp_clamps() {
        assert_eq!(inverse_lerp(0.0, 2.0, 1.0), 0.5);
        assert_eq!(inverse_lerp(0.0, 2.0, 5.0), 1.0);
        assert_eq!(inverse_lerp(0.0, 2.0, -1.0), 0.0);
        assert_eq!(inverse_lerp(1.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_lerp() {
        assert!((lerp(2.0, -4.0, 0.25) - 0.5).abs() < 1e-6);
    }
}
