//! Fishing tuning
//!
//! Every knob of the cast/reel loop lives here so it can be loaded from JSON.
//! Defaults match the shipped breakwater stage.

use std::ops::Range;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY;
use crate::error::ConfigError;
use crate::sim::rarity::{PerRarity, RarityWeights};

/// Inclusive range for the randomized bite delay (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min: f32,
    pub max: f32,
}

impl DelayRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Map a unit sample `u` in [0, 1) into the range
    pub fn sample_at(&self, u: f32) -> f32 {
        crate::lerp(self.min, self.max, u)
    }
}

/// Fishing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Casting ===
    /// Horizontal speed given to the hook when cast
    pub cast_speed: f32,
    /// Hook spawn point relative to the rod tip
    pub cast_offset: Vec2,
    /// How far the player may stand from the platform edge and still cast
    pub launch_edge_tolerance: f32,

    // === Judging ===
    /// Minimum edge distance for a successful release (inclusive)
    pub release_distance: f32,
    /// Edge distance that maps to the farthest landing point
    pub max_drop_distance: f32,
    /// Seconds from touching water until the bite
    pub bite_delay: DelayRange,
    /// Seconds a bite waits for the player before escaping (0 = forever)
    pub bite_timeout_secs: f32,

    // === Reeling ===
    pub horizontal_reel_base_speed: f32,
    pub full_reel_base_speed: f32,
    pub reel_level: u32,
    /// Growth per reel level (0.1 = +10% per level)
    pub reel_level_step: f32,
    /// Full-reel multiplier by the best rarity caught
    pub per_rarity_speed: PerRarity<f32>,
    pub min_full_reel_speed: f32,
    /// Horizontal gap to the rod tip under which the hook stops
    pub reel_dead_zone: f32,
    /// Reel-in point relative to the rod tip
    pub catch_offset: Vec2,
    /// Arrival radius around the catch point
    pub catch_tolerance: f32,
    /// Straight pull speed used after a failure
    pub fail_reel_speed: f32,

    // === Failure sinking ===
    pub sink_speed: f32,
    pub sink_duration_secs: f32,

    // === Catch launch ===
    pub multi_catch_count: u32,
    /// Zig-zag step between landing edge distances of a multi-catch
    pub landing_distance_step: f32,
    /// (x jitter, y drop) applied to every catch after the first
    pub spawn_stagger: Vec2,
    /// Height above the hook where catches spawn
    pub spawn_y_offset: f32,
    /// Landing height above the platform surface
    pub ground_y_offset: f32,
    /// Arc apex above the higher of spawn and landing point
    pub apex_height: f32,
    pub gravity: f32,
    /// Seconds catches of the same cast ignore each other
    pub launch_no_collide_secs: f32,
    /// Quiet time after which the no-collide group starts over
    pub no_collide_group_reset_gap: f32,

    // === Line ===
    /// Downward sag at the middle of the line curve
    pub line_sag: f32,
    pub line_segments: u32,

    // === Equipment ===
    pub reel_slot: usize,
    pub bait_slot_base: usize,
    pub bait_slot_count: usize,
    /// Table used when no usable bait/lure is equipped
    pub unequipped_weights: RarityWeights,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cast_speed: 6.0,
            cast_offset: Vec2::new(0.0, -0.5),
            launch_edge_tolerance: 0.15,

            release_distance: 0.06,
            max_drop_distance: 3.0,
            bite_delay: DelayRange::new(0.8, 2.5),
            bite_timeout_secs: 1.5,

            horizontal_reel_base_speed: 4.0,
            full_reel_base_speed: 4.0,
            reel_level: 0,
            reel_level_step: 0.10,
            per_rarity_speed: PerRarity::splat(1.0),
            min_full_reel_speed: 0.1,
            reel_dead_zone: 0.05,
            catch_offset: Vec2::ZERO,
            catch_tolerance: 0.08,
            fail_reel_speed: 6.0,

            sink_speed: 3.0,
            sink_duration_secs: 2.0,

            multi_catch_count: 1,
            landing_distance_step: 0.25,
            spawn_stagger: Vec2::new(0.12, 0.15),
            spawn_y_offset: 0.2,
            ground_y_offset: 0.2,
            apex_height: 1.5,
            gravity: GRAVITY,
            launch_no_collide_secs: 0.6,
            no_collide_group_reset_gap: 1.0,

            line_sag: 0.35,
            line_segments: 12,

            reel_slot: 5,
            bait_slot_base: 6,
            bait_slot_count: 1,
            unequipped_weights: PerRarity {
                common: 2,
                uncommon: 1,
                rare: 0,
                epic: 0,
                legendary: 0,
            },
        }
    }
}

impl Settings {
    /// Parse settings from JSON (missing fields take defaults) and validate
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject values the state machine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !(self.bite_delay.min >= 0.0 && self.bite_delay.min <= self.bite_delay.max) {
            return invalid(format!(
                "bite_delay must satisfy 0 <= min <= max (got {}..{})",
                self.bite_delay.min, self.bite_delay.max
            ));
        }
        if self.release_distance < 0.0 || self.release_distance > self.max_drop_distance {
            return invalid(format!(
                "release_distance {} must lie in [0, max_drop_distance {}]",
                self.release_distance, self.max_drop_distance
            ));
        }
        let speeds = [
            ("cast_speed", self.cast_speed),
            ("horizontal_reel_base_speed", self.horizontal_reel_base_speed),
            ("full_reel_base_speed", self.full_reel_base_speed),
            ("fail_reel_speed", self.fail_reel_speed),
            ("sink_speed", self.sink_speed),
        ];
        if let Some((name, v)) = speeds.iter().find(|(_, v)| !(*v > 0.0)) {
            return invalid(format!("{name} must be positive (got {v})"));
        }
        if self.multi_catch_count == 0 {
            return invalid("multi_catch_count must be at least 1".to_string());
        }
        if self.catch_tolerance <= 0.0 {
            return invalid("catch_tolerance must be positive".to_string());
        }
        if self.bite_timeout_secs < 0.0 || self.sink_duration_secs < 0.0 {
            return invalid("timeouts must not be negative".to_string());
        }
        let Some(tackle_end) = self.bait_slot_base.checked_add(self.bait_slot_count) else {
            return invalid(format!(
                "bait slots {} + {} overflow the slot index range",
                self.bait_slot_base, self.bait_slot_count
            ));
        };
        if (self.bait_slot_base..tackle_end).contains(&self.reel_slot) {
            return invalid(format!(
                "reel_slot {} overlaps the bait/lure slots",
                self.reel_slot
            ));
        }
        Ok(())
    }

    /// Bait/lure slot indices in scan order
    pub fn tackle_slots(&self) -> Range<usize> {
        self.bait_slot_base..self.bait_slot_base.saturating_add(self.bait_slot_count)
    }

    /// Level multiplier shared by both reel speeds
    pub fn reel_level_factor(&self) -> f32 {
        1.0 + self.reel_level as f32 * self.reel_level_step
    }

    /// One more catch per successful release
    pub fn upgrade_multi_catch(&mut self) {
        self.multi_catch_count = self.multi_catch_count.saturating_add(1).max(1);
        log::info!("Multi-catch upgraded to {}", self.multi_catch_count);
    }

    pub fn upgrade_reel(&mut self) {
        self.reel_level = self.reel_level.saturating_add(1);
        log::info!("Reel upgraded to level {}", self.reel_level);
    }

    /// Catch count for the next success (never zero)
    pub fn catch_count(&self) -> usize {
        self.multi_catch_count.max(1) as usize
    }
}
