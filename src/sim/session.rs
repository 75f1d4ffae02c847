//! Cast/reel session state
//!
//! `CastReelSession` owns everything one rod needs between ticks: settings,
//! the RNG, a monotonic clock, the current cast (if any) and the intents
//! produced for the caller. The per-tick transitions live in `tick`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::catch::{CatchCatalog, CatchResult, CatchSpawn, NoCollideGroup};
use super::consume::ResourceOutcome;
use super::equipment::EquipmentSnapshot;
use super::line::Rect;
use crate::error::ConfigError;
use crate::settings::Settings;

/// Id handed out for every spawned catch
pub type CatchId = u32;

/// Fixed geometry of the platform the player fishes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    /// Seaward edge; edge distance is measured from here
    pub edge_x: f32,
    /// Landward end; the farthest landing point
    pub left_edge_x: f32,
    /// Walkable surface height
    pub surface_y: f32,
}

/// External collaborators fixed at setup
#[derive(Debug, Clone, Default)]
pub struct Rig {
    pub platform: Option<Platform>,
    pub catalog: CatchCatalog,
    /// Optional rectangle the line must not cross
    pub obstacle: Option<Rect>,
}

impl Rig {
    /// Check the rig is usable, returning the platform
    pub fn validate(&self) -> Result<Platform, ConfigError> {
        let platform = self
            .platform
            .ok_or(ConfigError::MissingCollaborator("platform edge"))?;
        if self.catalog.is_empty() {
            return Err(ConfigError::MissingCollaborator("catch catalog"));
        }
        Ok(platform)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReelKind {
    /// Anchored, pulled sideways while the action is held
    Horizontal,
    /// After a catch, pulled straight back to the rod
    Full,
}

/// Where the hook is in the cast/reel cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CastState {
    #[default]
    Idle,
    /// Hook flying out
    Casting,
    /// Hook held at water level, waiting for a bite
    Anchored,
    Reeling(ReelKind),
    /// Failed: hook drops and is destroyed after a delay
    Sinking,
    /// Failed: hook pulled straight back without gravity
    AutoReelBack,
}

impl CastState {
    /// Anchored, with or without horizontal reeling
    pub fn is_waiting(self) -> bool {
        matches!(
            self,
            CastState::Anchored | CastState::Reeling(ReelKind::Horizontal)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    BiteDetected,
    LineBroken,
    Escaped,
}

/// Side effect requested from the caller, executed right after the tick
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SpawnHook { position: Vec2, velocity: Vec2 },
    /// New hook velocity; `gravity` says whether gravity acts on it
    HookMotion { velocity: Vec2, gravity: bool },
    DestroyHook,
    SpawnCatch(CatchSpawn),
    ConsumeSlot(usize),
    PlayFeedback(Feedback),
    SetPlayerMovement(bool),
    IgnoreCollision { a: CatchId, b: CatchId, ignore: bool },
}

/// Per-attempt record, alive from cast start until back to idle
#[derive(Debug, Clone)]
pub struct CastSession {
    pub state: CastState,
    pub hook_position: Vec2,
    pub rod_tip_position: Vec2,
    pub edge_distance: f32,
    pub max_edge_distance_seen: f32,
    pub bite_ready_at: Option<f64>,
    pub bite_expire_at: Option<f64>,
    pub bite_ready: bool,
    pub started_action_before_bite: bool,
    pub bite_invalidated: bool,
    pub line_broken: bool,
    pub full_reel_active: bool,
    pub started_at: f64,
    /// The press that started the cast is still down
    pub awaiting_cast_release: bool,
    pub sink_until: Option<f64>,
    pub full_reel_speed: f32,
    /// Success or failure already handled for this cast
    pub outcome_resolved: bool,
    pub equipment: EquipmentSnapshot,
    last_motion: Option<(Vec2, bool)>,
}

impl CastSession {
    pub fn new(now: f64, equipment: EquipmentSnapshot) -> Self {
        Self {
            state: CastState::Casting,
            hook_position: Vec2::ZERO,
            rod_tip_position: Vec2::ZERO,
            edge_distance: 0.0,
            max_edge_distance_seen: 0.0,
            bite_ready_at: None,
            bite_expire_at: None,
            bite_ready: false,
            started_action_before_bite: false,
            bite_invalidated: false,
            line_broken: false,
            full_reel_active: false,
            started_at: now,
            awaiting_cast_release: true,
            sink_until: None,
            full_reel_speed: 0.0,
            outcome_resolved: false,
            equipment,
            last_motion: None,
        }
    }
}

/// One rod's fishing controller
pub struct CastReelSession<R: Rng = Pcg32> {
    pub(super) settings: Settings,
    /// None when setup failed; the session then ignores every tick
    pub(super) platform: Option<Platform>,
    pub(super) catalog: CatchCatalog,
    pub(super) obstacle: Option<Rect>,
    pub(super) rng: R,
    pub(super) clock: f64,
    pub(super) cast: Option<CastSession>,
    pub(super) no_collide: NoCollideGroup,
    pub(super) intents: Vec<Intent>,
    pub(super) next_catch_id: CatchId,
    pub(super) last_catch: Option<CatchResult>,
    pub(super) last_outcome: Option<ResourceOutcome>,
}

impl CastReelSession<Pcg32> {
    /// Session with a seeded PCG RNG
    pub fn new(settings: Settings, rig: Rig, seed: u64) -> Self {
        Self::with_rng(settings, rig, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> CastReelSession<R> {
    /// Session with a caller-supplied RNG
    ///
    /// Invalid settings or a missing collaborator leave the session disabled
    /// (logged, never a panic).
    pub fn with_rng(settings: Settings, rig: Rig, rng: R) -> Self {
        let platform = match settings.validate().and_then(|_| rig.validate()) {
            Ok(platform) => Some(platform),
            Err(e) => {
                log::error!("Fishing disabled: {}", e);
                None
            }
        };
        Self {
            settings,
            platform,
            catalog: rig.catalog,
            obstacle: rig.obstacle,
            rng,
            clock: 0.0,
            cast: None,
            no_collide: NoCollideGroup::default(),
            intents: Vec::new(),
            next_catch_id: 1,
            last_catch: None,
            last_outcome: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.platform.is_some()
    }

    pub fn state(&self) -> CastState {
        self.cast.as_ref().map_or(CastState::Idle, |c| c.state)
    }

    /// Current cast record (None while idle)
    pub fn cast(&self) -> Option<&CastSession> {
        self.cast.as_ref()
    }

    /// Seconds since the session was created
    pub fn now(&self) -> f64 {
        self.clock
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Settings for upgrades; changes apply from the next cast on
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Catches of the most recent successful release
    pub fn last_catch(&self) -> Option<&CatchResult> {
        self.last_catch.as_ref()
    }

    /// Consumption of the most recent resolved cast
    pub fn last_outcome(&self) -> Option<&ResourceOutcome> {
        self.last_outcome.as_ref()
    }

    /// Intents produced since the last drain
    pub fn drain_intents(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.intents)
    }

    pub(super) fn emit(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Change the hook velocity, emitting only when it differs
    pub(super) fn drive_hook(&mut self, velocity: Vec2, gravity: bool) {
        let Some(cast) = self.cast.as_mut() else {
            return;
        };
        if cast.last_motion == Some((velocity, gravity)) {
            return;
        }
        cast.last_motion = Some((velocity, gravity));
        self.intents.push(Intent::HookMotion { velocity, gravity });
    }

    pub(super) fn set_state(&mut self, state: CastState) {
        if let Some(cast) = self.cast.as_mut() {
            if cast.state != state {
                log::debug!("Cast {:?} -> {:?} at t={:.3}", cast.state, state, self.clock);
                cast.state = state;
            }
        }
    }

    /// Drop the cast and hand movement back to the player
    pub(super) fn finish_cast(&mut self, destroy_hook: bool) {
        if self.cast.take().is_none() {
            return;
        }
        if destroy_hook {
            self.emit(Intent::DestroyHook);
        }
        self.emit(Intent::SetPlayerMovement(true));
        log::debug!("Cast finished at t={:.3}", self.clock);
    }
}
