//! Per-frame cast/reel update
//!
//! The caller feeds one `TickInput` per frame: the action button edges, where
//! the hook and rod tip currently are, and any world events its physics
//! noticed. The session answers with intents (spawn, velocity, consume,
//! feedback) that the caller executes before the next tick.

use glam::Vec2;
use rand::Rng;

use super::catch::{ReleasePoint, distribute_catches};
use super::consume::{consume_on_fail, consume_on_success};
use super::equipment::EquipmentSnapshot;
use super::inventory::Inventory;
use super::line::{curve_hits_rect, line_curve};
use super::session::{
    CastReelSession, CastSession, CastState, CatchId, Feedback, Intent, Platform, ReelKind,
};

/// Action button state for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionInput {
    /// Went down this tick
    pub down: bool,
    /// Is down
    pub held: bool,
    /// Came up this tick
    pub up: bool,
}

impl ActionInput {
    pub fn press() -> Self {
        Self {
            down: true,
            held: true,
            up: false,
        }
    }

    pub fn hold() -> Self {
        Self {
            down: false,
            held: true,
            up: false,
        }
    }

    pub fn release() -> Self {
        Self {
            down: false,
            held: false,
            up: true,
        }
    }
}

/// Input commands and world state for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub action: ActionInput,
    /// Current hook position; None once the hook object is gone
    pub hook: Option<Vec2>,
    pub rod_tip: Vec2,
    pub player: Vec2,
    /// Hook entered the water this tick
    pub hook_touched_water: bool,
    /// Physics saw the line cross an obstacle this tick
    pub line_crossed_obstacle: bool,
    /// Catches that touched ground this tick
    pub landed: Vec<CatchId>,
}

/// Advance the session by `dt` seconds
pub fn tick<R: Rng, I: Inventory + ?Sized>(
    session: &mut CastReelSession<R>,
    inventory: &mut I,
    input: &TickInput,
    dt: f32,
) {
    let Some(platform) = session.platform else {
        return;
    };

    session.clock += dt.max(0.0) as f64;
    let now = session.clock;

    // Catches keep flying after the cast ends
    session.no_collide.expire(now, &mut session.intents);
    for &id in &input.landed {
        session.notify_catch_landed(id);
    }

    if session.cast.is_none() {
        if input.action.down {
            session.try_start_cast(inventory, input, &platform);
        }
        return;
    }

    let Some(hook) = input.hook else {
        log::warn!(
            "Hook reference lost while {:?}, resetting to idle",
            session.state()
        );
        session.finish_cast(false);
        return;
    };

    if let Some(cast) = session.cast.as_mut() {
        cast.hook_position = hook;
        cast.rod_tip_position = input.rod_tip;
        cast.edge_distance = (hook.x - platform.edge_x).max(0.0);
        cast.max_edge_distance_seen = cast.max_edge_distance_seen.max(cast.edge_distance);
    }

    if input.hook_touched_water {
        session.notify_hook_touched_water();
    }
    if input.line_crossed_obstacle {
        session.notify_line_crossed_obstacle(inventory);
    }
    if session.state().is_waiting() {
        session.check_line_obstacle(inventory);
    }

    match session.state() {
        CastState::Idle => {}
        CastState::Casting => {
            session.observe_action(input.action);
        }
        CastState::Anchored | CastState::Reeling(ReelKind::Horizontal) => {
            session.update_waiting(inventory, input, &platform);
        }
        CastState::Reeling(ReelKind::Full) => {
            let speed = session.cast.as_ref().map_or(0.0, |c| c.full_reel_speed);
            session.reel_to_catch_point(input.rod_tip, speed);
        }
        CastState::Sinking => session.update_sinking(),
        CastState::AutoReelBack => {
            let speed = session.settings.fail_reel_speed;
            session.reel_to_catch_point(input.rod_tip, speed);
        }
    }
}

impl<R: Rng> CastReelSession<R> {
    /// The hook reached the water: anchor it and start the bite countdown
    pub fn notify_hook_touched_water(&mut self) {
        let now = self.clock;
        let Some(cast) = self.cast.as_mut() else {
            return;
        };
        if cast.state != CastState::Casting {
            return;
        }
        let delay = self.settings.bite_delay.sample_at(self.rng.random::<f32>());
        cast.bite_ready_at = Some(now + delay as f64);
        log::debug!("Hook anchored, bite in {:.2}s", delay);
        self.set_state(CastState::Anchored);
        self.drive_hook(Vec2::ZERO, false);
    }

    /// The line crossed an obstacle: it breaks and the hook sinks
    pub fn notify_line_crossed_obstacle<I: Inventory + ?Sized>(&mut self, inventory: &mut I) {
        let Some(cast) = self.cast.as_mut() else {
            return;
        };
        if cast.line_broken || !cast.state.is_waiting() {
            return;
        }
        cast.line_broken = true;
        log::info!("Line crossed an obstacle and snapped");
        self.fail_sink(inventory, Some(Feedback::LineBroken));
    }

    /// A catch touched ground: it may collide with its siblings again
    pub fn notify_catch_landed(&mut self, id: CatchId) {
        if self.no_collide.contains(id) {
            log::debug!("Catch {} landed", id);
        }
        self.no_collide.release(id, &mut self.intents);
    }

    fn try_start_cast<I: Inventory + ?Sized>(
        &mut self,
        inventory: &I,
        input: &TickInput,
        platform: &Platform,
    ) {
        let gap = (input.player.x - platform.edge_x).abs();
        if gap > self.settings.launch_edge_tolerance {
            log::debug!("Not at the launch edge ({:.3} away), ignoring cast", gap);
            return;
        }

        let equipment = EquipmentSnapshot::resolve(inventory, &self.settings);
        self.cast = Some(CastSession::new(self.clock, equipment));

        let position = input.rod_tip + self.settings.cast_offset;
        let velocity = Vec2::new(self.settings.cast_speed, 0.0);
        self.emit(Intent::SetPlayerMovement(false));
        self.emit(Intent::SpawnHook { position, velocity });
        log::info!("Cast at t={:.3}", self.clock);
    }

    /// Track the action button before the bite
    ///
    /// Returns true when this tick's input still belongs to the press that
    /// started the cast.
    fn observe_action(&mut self, action: ActionInput) -> bool {
        let now = self.clock;
        let Some(cast) = self.cast.as_mut() else {
            return false;
        };
        if cast.awaiting_cast_release {
            if !action.held {
                cast.awaiting_cast_release = false;
            }
            return true;
        }
        if action.held && !cast.bite_ready && !cast.started_action_before_bite {
            cast.started_action_before_bite = true;
            log::debug!("Action held before the bite at t={:.3}", now);
        }
        false
    }

    /// Fire the bite once its timestamp passes
    fn poll_bite(&mut self) {
        let now = self.clock;
        let timeout = self.settings.bite_timeout_secs;
        let Some(cast) = self.cast.as_mut() else {
            return;
        };
        if cast.bite_ready || cast.bite_ready_at.is_none_or(|t| now < t) {
            return;
        }
        cast.bite_ready = true;
        if cast.started_action_before_bite {
            cast.bite_invalidated = true;
        }
        cast.bite_expire_at = (timeout > 0.0).then(|| now + timeout as f64);
        log::debug!(
            "Bite at t={:.3} (invalidated: {})",
            now,
            cast.bite_invalidated
        );
        self.emit(Intent::PlayFeedback(Feedback::BiteDetected));
    }

    fn update_waiting<I: Inventory + ?Sized>(
        &mut self,
        inventory: &mut I,
        input: &TickInput,
        platform: &Platform,
    ) {
        self.poll_bite();
        let swallowed = self.observe_action(input.action);
        let held = input.action.held && !swallowed;
        let released = input.action.up && !swallowed;

        let Some(cast) = self.cast.as_ref() else {
            return;
        };
        let edge = cast.edge_distance;
        let hook = cast.hook_position;
        let bite_ready = cast.bite_ready;
        let expire_at = cast.bite_expire_at;
        let reel_speed = cast.equipment.horizontal_reel_speed(&self.settings);
        let release_distance = self.settings.release_distance;

        if held {
            self.set_state(CastState::Reeling(ReelKind::Horizontal));
            let dx = input.rod_tip.x - hook.x;
            let velocity = if dx.abs() < self.settings.reel_dead_zone {
                Vec2::ZERO
            } else {
                Vec2::new(dx.signum() * reel_speed, 0.0)
            };
            self.drive_hook(velocity, false);

            if edge < release_distance {
                log::info!(
                    "Hook reeled too close ({:.3} < {:.3}), sinking",
                    edge,
                    release_distance
                );
                self.fail_sink(inventory, Some(Feedback::Escaped));
                return;
            }
        } else {
            self.set_state(CastState::Anchored);
            self.drive_hook(Vec2::ZERO, false);
        }

        if released {
            self.judge_release(inventory, input, platform);
            return;
        }

        if bite_ready && !held && expire_at.is_some_and(|t| self.clock > t) {
            log::info!("Bite timed out, the fish escaped");
            self.fail_reel_back(inventory);
        }
    }

    /// Decide the outcome of releasing the action while anchored
    fn judge_release<I: Inventory + ?Sized>(
        &mut self,
        inventory: &mut I,
        input: &TickInput,
        platform: &Platform,
    ) {
        let Some(cast) = self.cast.as_ref() else {
            return;
        };
        let release_distance = self.settings.release_distance;

        if cast.edge_distance < release_distance {
            if cast.max_edge_distance_seen < release_distance {
                log::info!("Released short of the line, sinking");
                self.fail_sink(inventory, Some(Feedback::Escaped));
            } else {
                log::info!("Released too close, reeling back");
                self.fail_reel_back(inventory);
            }
            return;
        }

        if !cast.bite_ready || cast.bite_invalidated {
            log::info!(
                "Released without a valid bite (ready: {}, invalidated: {})",
                cast.bite_ready,
                cast.bite_invalidated
            );
            self.fail_reel_back(inventory);
            return;
        }

        let release = ReleasePoint {
            hook: cast.hook_position,
            edge_distance: cast.edge_distance,
            player_x: input.player.x,
        };
        self.succeed(inventory, release, platform);
    }

    /// Run the catch pipeline and start the full reel
    fn succeed<I: Inventory + ?Sized>(
        &mut self,
        inventory: &mut I,
        release: ReleasePoint,
        platform: &Platform,
    ) {
        let now = self.clock;
        let Some(cast) = self.cast.as_mut() else {
            return;
        };
        if cast.outcome_resolved {
            return;
        }
        cast.outcome_resolved = true;

        let mut next_id = self.next_catch_id;
        let result = distribute_catches(
            &mut self.rng,
            &self.settings,
            &cast.equipment,
            &self.catalog,
            platform,
            release,
            || {
                let id = next_id;
                next_id = next_id.wrapping_add(1);
                id
            },
        );
        self.next_catch_id = next_id;

        cast.full_reel_speed = cast
            .equipment
            .full_reel_speed(&self.settings, result.max_rarity);
        cast.full_reel_active = true;
        let outcome = consume_on_success(inventory, &cast.equipment, result.used_slots());

        for spawn in &result.spawns {
            self.intents.push(Intent::SpawnCatch(spawn.clone()));
            self.no_collide
                .admit(spawn.id, now, &self.settings, &mut self.intents);
        }
        for &slot in &outcome.consumed_slots {
            self.emit(Intent::ConsumeSlot(slot));
        }
        log::info!(
            "Caught {} fish (best: {}) at edge distance {:.3}",
            result.spawned_count(),
            result.max_rarity.as_str(),
            release.edge_distance
        );

        self.set_state(CastState::Reeling(ReelKind::Full));
        self.last_catch = Some(result);
        self.last_outcome = Some(outcome);
    }

    /// Consume failure resources once per cast
    fn resolve_failure<I: Inventory + ?Sized>(
        &mut self,
        inventory: &mut I,
        feedback: Option<Feedback>,
    ) {
        let Some(cast) = self.cast.as_mut() else {
            return;
        };
        if cast.outcome_resolved {
            return;
        }
        cast.outcome_resolved = true;
        cast.full_reel_active = false;

        let outcome = consume_on_fail(inventory, &self.settings);
        for &slot in &outcome.consumed_slots {
            self.emit(Intent::ConsumeSlot(slot));
        }
        if let Some(feedback) = feedback {
            self.emit(Intent::PlayFeedback(feedback));
        }
        self.last_outcome = Some(outcome);
    }

    /// Fail and let the hook drop under gravity
    fn fail_sink<I: Inventory + ?Sized>(&mut self, inventory: &mut I, feedback: Option<Feedback>) {
        let until = self.clock + self.settings.sink_duration_secs as f64;
        let Some(cast) = self.cast.as_mut() else {
            return;
        };
        if cast.state == CastState::Sinking {
            return;
        }
        cast.sink_until = Some(until);

        self.resolve_failure(inventory, feedback);
        self.set_state(CastState::Sinking);
        self.drive_hook(Vec2::new(0.0, -self.settings.sink_speed), true);
    }

    /// Fail and pull the hook straight back
    fn fail_reel_back<I: Inventory + ?Sized>(&mut self, inventory: &mut I) {
        if matches!(
            self.state(),
            CastState::Sinking | CastState::AutoReelBack | CastState::Idle
        ) {
            return;
        }
        self.resolve_failure(inventory, Some(Feedback::Escaped));
        self.set_state(CastState::AutoReelBack);
    }

    fn check_line_obstacle<I: Inventory + ?Sized>(&mut self, inventory: &mut I) {
        let Some(rect) = self.obstacle else {
            return;
        };
        let Some(cast) = self.cast.as_ref() else {
            return;
        };
        if cast.line_broken {
            return;
        }
        let points = line_curve(
            cast.rod_tip_position,
            cast.hook_position,
            self.settings.line_sag,
            self.settings.line_segments,
        );
        if curve_hits_rect(&points, &rect) {
            self.notify_line_crossed_obstacle(inventory);
        }
    }

    /// Pull the hook toward the catch point, finishing on arrival
    fn reel_to_catch_point(&mut self, rod_tip: Vec2, speed: f32) {
        let Some(cast) = self.cast.as_ref() else {
            return;
        };
        let target = rod_tip + self.settings.catch_offset;
        let to_target = target - cast.hook_position;
        if to_target.length() < self.settings.catch_tolerance {
            self.finish_cast(true);
            return;
        }
        let speed = speed.max(self.settings.min_full_reel_speed);
        self.drive_hook(to_target.normalize_or_zero() * speed, false);
    }

    fn update_sinking(&mut self) {
        let now = self.clock;
        let done = self
            .cast
            .as_ref()
            .is_some_and(|c| c.sink_until.is_some_and(|t| now >= t));
        if done {
            log::debug!("Sunk hook removed");
            self.finish_cast(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{DelayRange, Settings};
    use crate::sim::catch::{CatchCatalog, CatchDef};
    use crate::sim::consume::OutcomeKind;
    use crate::sim::equipment::{ItemDef, ItemKind, ItemStack};
    use crate::sim::inventory::SlotInventory;
    use crate::sim::line::Rect;
    use crate::sim::rarity::{Rarity, RarityWeights};
    use crate::sim::session::Rig;
    use rand_pcg::Pcg32;

    const DT: f32 = 0.1;
    const BAIT_SLOT: usize = 6;

    /// RNG that always yields zero (unit samples at 0.0)
    struct ZeroRng;

    impl rand::RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    fn platform() -> Platform {
        Platform {
            edge_x: 0.0,
            left_edge_x: -6.0,
            surface_y: 0.0,
        }
    }

    fn rig() -> Rig {
        let def = |id: &str, rarity| CatchDef {
            id: id.to_string(),
            species: id.to_string(),
            rarity,
            base_price: 100,
            price_per_cm: 2.0,
            min_length_cm: 20.0,
            max_length_cm: 60.0,
        };
        Rig {
            platform: Some(platform()),
            catalog: CatchCatalog::new(vec![
                def("sardine", Rarity::Common),
                def("mackerel", Rarity::Uncommon),
                def("sea bream", Rarity::Rare),
            ]),
            obstacle: None,
        }
    }

    fn bait_inventory(count: u32) -> SlotInventory {
        SlotInventory::new(10).with(
            BAIT_SLOT,
            ItemStack::new(
                ItemDef::new("worm", "Worm", ItemKind::Bait { weights: RarityWeights::ONES }),
                count,
            ),
        )
    }

    /// Test double for the world around the session
    struct Rod<R: Rng> {
        session: CastReelSession<R>,
        inv: SlotInventory,
        hook: Option<Vec2>,
        rod_tip: Vec2,
        player: Vec2,
    }

    impl Rod<Pcg32> {
        fn new(settings: Settings) -> Self {
            Self::with_session(CastReelSession::new(settings, rig(), 2024))
        }
    }

    impl<R: Rng> Rod<R> {
        fn with_session(session: CastReelSession<R>) -> Self {
            Self {
                session,
                inv: bait_inventory(3),
                hook: None,
                rod_tip: Vec2::new(0.0, 1.0),
                player: Vec2::new(0.0, 0.0),
            }
        }

        fn step(&mut self, action: ActionInput) -> Vec<Intent> {
            self.step_with(action, |_| {})
        }

        fn step_with(
            &mut self,
            action: ActionInput,
            edit: impl FnOnce(&mut TickInput),
        ) -> Vec<Intent> {
            let mut input = TickInput {
                action,
                hook: self.hook,
                rod_tip: self.rod_tip,
                player: self.player,
                ..Default::default()
            };
            edit(&mut input);
            tick(&mut self.session, &mut self.inv, &input, DT);
            let out = self.session.drain_intents();
            for intent in &out {
                match intent {
                    Intent::SpawnHook { position, .. } => self.hook = Some(*position),
                    Intent::DestroyHook => self.hook = None,
                    _ => {}
                }
            }
            out
        }

        /// Cast, let go of the button and land the hook `edge` out
        fn cast_and_anchor(&mut self, edge: f32) {
            self.step(ActionInput::press());
            assert_eq!(self.session.state(), CastState::Casting);
            self.step(ActionInput::release());
            self.hook = Some(Vec2::new(edge, -0.3));
            self.step_with(ActionInput::default(), |i| i.hook_touched_water = true);
            assert_eq!(self.session.state(), CastState::Anchored);
        }

        /// Idle until the bite fires, returning all intents seen
        fn wait_for_bite(&mut self) -> Vec<Intent> {
            let mut seen = Vec::new();
            for _ in 0..40 {
                seen.extend(self.step(ActionInput::default()));
                if self.session.cast().is_some_and(|c| c.bite_ready) {
                    return seen;
                }
            }
            panic!("bite never fired");
        }
    }

    fn count<F: Fn(&Intent) -> bool>(intents: &[Intent], f: F) -> usize {
        intents.iter().filter(|i| f(i)).count()
    }

    #[test]
    fn test_cast_requires_launch_edge() {
        let mut rod = Rod::new(Settings::default());
        rod.player = Vec2::new(-1.0, 0.0);
        let out = rod.step(ActionInput::press());
        assert!(out.is_empty());
        assert_eq!(rod.session.state(), CastState::Idle);

        rod.player = Vec2::new(-0.1, 0.0);
        let out = rod.step(ActionInput::press());
        assert_eq!(rod.session.state(), CastState::Casting);
        assert!(out.contains(&Intent::SetPlayerMovement(false)));
        assert!(out.iter().any(|i| matches!(
            i,
            Intent::SpawnHook { velocity, .. } if *velocity == Vec2::new(6.0, 0.0)
        )));
    }

    #[test]
    fn test_successful_release() {
        let mut rod = Rod::new(Settings::default());
        rod.cast_and_anchor(0.10);
        let seen = rod.wait_for_bite();
        assert_eq!(
            count(&seen, |i| *i == Intent::PlayFeedback(Feedback::BiteDetected)),
            1
        );

        rod.step(ActionInput::hold());
        let out = rod.step(ActionInput::release());

        assert_eq!(count(&out, |i| matches!(i, Intent::SpawnCatch(_))), 1);
        assert!(out.contains(&Intent::ConsumeSlot(BAIT_SLOT)));
        assert_eq!(rod.inv.count(BAIT_SLOT), 2);
        assert_eq!(rod.session.state(), CastState::Reeling(ReelKind::Full));
        let outcome = rod.session.last_outcome().unwrap();
        assert_eq!(outcome.kind, OutcomeKind::Success);
        assert_eq!(rod.session.last_catch().unwrap().spawned_count(), 1);

        // Full reel pulls toward the rod tip, then finishes on arrival
        let out = rod.step(ActionInput::default());
        assert!(out.iter().any(|i| matches!(
            i,
            Intent::HookMotion { velocity, gravity: false } if velocity.x < 0.0
        )));
        rod.hook = Some(rod.rod_tip + Vec2::new(0.01, 0.0));
        let out = rod.step(ActionInput::default());
        assert!(out.contains(&Intent::DestroyHook));
        assert!(out.contains(&Intent::SetPlayerMovement(true)));
        assert_eq!(rod.session.state(), CastState::Idle);
    }

    #[test]
    fn test_release_at_exact_threshold_succeeds() {
        let mut rod = Rod::new(Settings::default());
        rod.cast_and_anchor(0.06);
        rod.wait_for_bite();
        rod.step(ActionInput::hold());
        rod.step(ActionInput::release());
        assert_eq!(rod.session.state(), CastState::Reeling(ReelKind::Full));
    }

    #[test]
    fn test_holding_too_close_sinks() {
        let settings = Settings::default();
        let sink_secs = settings.sink_duration_secs;
        let mut rod = Rod::new(settings);
        rod.cast_and_anchor(0.5);
        rod.hook = Some(Vec2::new(0.03, -0.3));
        let out = rod.step(ActionInput::hold());

        assert_eq!(rod.session.state(), CastState::Sinking);
        assert_eq!(count(&out, |i| matches!(i, Intent::ConsumeSlot(_))), 1);
        assert_eq!(rod.inv.count(BAIT_SLOT), 2);
        assert!(out.contains(&Intent::HookMotion {
            velocity: Vec2::new(0.0, -3.0),
            gravity: true
        }));

        // Destroyed once the sink duration has passed, not before
        let ticks = (sink_secs / DT).round() as usize;
        for _ in 0..ticks - 1 {
            let out = rod.step(ActionInput::default());
            assert!(!out.contains(&Intent::DestroyHook));
        }
        let mut destroyed = false;
        for _ in 0..2 {
            destroyed |= rod.step(ActionInput::default()).contains(&Intent::DestroyHook);
        }
        assert!(destroyed);
        assert_eq!(rod.session.state(), CastState::Idle);
        // Still only one unit lost
        assert_eq!(rod.inv.count(BAIT_SLOT), 2);
    }

    #[test]
    fn test_release_short_of_threshold_sinks() {
        let mut rod = Rod::new(Settings::default());
        rod.cast_and_anchor(0.03);
        // Tap: down and up within one tick, never reported as held
        let tap = ActionInput {
            down: true,
            held: false,
            up: true,
        };
        let out = rod.step(tap);
        assert_eq!(rod.session.state(), CastState::Sinking);
        assert_eq!(count(&out, |i| matches!(i, Intent::ConsumeSlot(_))), 1);
        assert!(out.contains(&Intent::PlayFeedback(Feedback::Escaped)));
        assert_eq!(rod.inv.count(BAIT_SLOT), 2);
        assert_eq!(rod.session.last_outcome().unwrap().kind, OutcomeKind::Fail);
    }

    #[test]
    fn test_release_after_drifting_too_close_reels_back() {
        let mut rod = Rod::new(Settings::default());
        rod.cast_and_anchor(1.0);
        rod.hook = Some(Vec2::new(0.03, -0.3));
        let out = rod.step(ActionInput::release());
        assert_eq!(rod.session.state(), CastState::AutoReelBack);
        assert_eq!(count(&out, |i| matches!(i, Intent::ConsumeSlot(_))), 1);
        assert!(out.contains(&Intent::PlayFeedback(Feedback::Escaped)));
        assert_eq!(count(&out, |i| matches!(i, Intent::SpawnCatch(_))), 0);
        assert_eq!(rod.inv.count(BAIT_SLOT), 2);
    }

    #[test]
    fn test_release_before_bite_fails() {
        let mut rod = Rod::new(Settings {
            bite_delay: DelayRange::new(5.0, 5.0),
            ..Settings::default()
        });
        rod.cast_and_anchor(1.0);
        rod.step(ActionInput::hold());
        let out = rod.step(ActionInput::release());
        assert_eq!(rod.session.state(), CastState::AutoReelBack);
        assert!(out.contains(&Intent::PlayFeedback(Feedback::Escaped)));
        assert_eq!(count(&out, |i| matches!(i, Intent::SpawnCatch(_))), 0);
        assert_eq!(rod.inv.count(BAIT_SLOT), 2);
        assert_eq!(rod.session.last_outcome().unwrap().kind, OutcomeKind::Fail);
    }

    #[test]
    fn test_early_hold_invalidates_bite() {
        // Bite delay samples exactly the range minimum with a zero RNG
        let settings = Settings {
            bite_delay: DelayRange::new(0.8, 2.5),
            ..Settings::default()
        };
        let session = CastReelSession::with_rng(settings, rig(), ZeroRng);
        let mut rod = Rod::with_session(session);

        rod.step(ActionInput::press());
        rod.step(ActionInput::release());
        // Held again before the hook even lands
        rod.step(ActionInput::hold());
        assert!(rod.session.cast().unwrap().started_action_before_bite);
        rod.step(ActionInput::release());

        rod.hook = Some(Vec2::new(1.0, -0.3));
        rod.step_with(ActionInput::default(), |i| i.hook_touched_water = true);
        let cast = rod.session.cast().unwrap();
        let delay = cast.bite_ready_at.unwrap() - rod.session.now();
        assert!((delay - 0.8).abs() < 1e-6);

        let seen = rod.wait_for_bite();
        assert!(seen.contains(&Intent::PlayFeedback(Feedback::BiteDetected)));
        assert!(rod.session.cast().unwrap().bite_invalidated);
        // State does not reveal the penalty
        assert_eq!(rod.session.state(), CastState::Anchored);

        rod.step(ActionInput::hold());
        let out = rod.step(ActionInput::release());
        assert_eq!(rod.session.state(), CastState::AutoReelBack);
        assert_eq!(count(&out, |i| matches!(i, Intent::SpawnCatch(_))), 0);
        assert_eq!(rod.inv.count(BAIT_SLOT), 2);
    }

    #[test]
    fn test_holding_through_cast_is_not_early() {
        let mut rod = Rod::new(Settings::default());
        rod.step(ActionInput::press());
        rod.step(ActionInput::hold());
        rod.hook = Some(Vec2::new(1.0, -0.3));
        rod.step_with(ActionInput::hold(), |i| i.hook_touched_water = true);
        // Letting go of the cast press is not judged
        rod.step(ActionInput::release());
        assert_eq!(rod.session.state(), CastState::Anchored);
        assert!(!rod.session.cast().unwrap().started_action_before_bite);

        rod.wait_for_bite();
        rod.step(ActionInput::hold());
        rod.step(ActionInput::release());
        assert_eq!(rod.session.state(), CastState::Reeling(ReelKind::Full));
    }

    #[test]
    fn test_bite_timeout_escapes() {
        let mut rod = Rod::new(Settings {
            bite_timeout_secs: 0.5,
            ..Settings::default()
        });
        rod.cast_and_anchor(1.0);
        rod.wait_for_bite();
        let mut out = Vec::new();
        for _ in 0..8 {
            out.extend(rod.step(ActionInput::default()));
        }
        assert_eq!(rod.session.state(), CastState::AutoReelBack);
        assert_eq!(
            count(&out, |i| *i == Intent::PlayFeedback(Feedback::Escaped)),
            1
        );
        assert_eq!(rod.inv.count(BAIT_SLOT), 2);

        // Reel back finishes at the catch point
        rod.hook = Some(rod.rod_tip);
        let out = rod.step(ActionInput::default());
        assert!(out.contains(&Intent::DestroyHook));
        assert_eq!(rod.session.state(), CastState::Idle);
    }

    #[test]
    fn test_holding_after_bite_blocks_timeout() {
        let mut rod = Rod::new(Settings {
            bite_timeout_secs: 0.3,
            ..Settings::default()
        });
        rod.cast_and_anchor(2.0);
        rod.wait_for_bite();
        for _ in 0..10 {
            rod.step(ActionInput::hold());
        }
        assert_eq!(rod.session.state(), CastState::Reeling(ReelKind::Horizontal));
        rod.step(ActionInput::release());
        assert_eq!(rod.session.state(), CastState::Reeling(ReelKind::Full));
    }

    #[test]
    fn test_horizontal_reel_velocity() {
        let mut rod = Rod::new(Settings::default());
        rod.cast_and_anchor(2.0);
        let out = rod.step(ActionInput::hold());
        assert!(out.contains(&Intent::HookMotion {
            velocity: Vec2::new(-4.0, 0.0),
            gravity: false
        }));
        // Letting go stops the hook
        let out = rod.step(ActionInput::release());
        assert!(out.contains(&Intent::HookMotion {
            velocity: Vec2::ZERO,
            gravity: false
        }));
    }

    #[test]
    fn test_line_obstacle_breaks_once() {
        let mut rod = Rod::new(Settings::default());
        rod.cast_and_anchor(1.5);
        let out = rod.step_with(ActionInput::default(), |i| i.line_crossed_obstacle = true);
        assert_eq!(rod.session.state(), CastState::Sinking);
        assert!(out.contains(&Intent::PlayFeedback(Feedback::LineBroken)));
        assert!(rod.session.cast().unwrap().line_broken);
        assert_eq!(rod.inv.count(BAIT_SLOT), 2);

        let out = rod.step_with(ActionInput::default(), |i| i.line_crossed_obstacle = true);
        assert!(!out.contains(&Intent::PlayFeedback(Feedback::LineBroken)));
        assert_eq!(rod.inv.count(BAIT_SLOT), 2);
    }

    #[test]
    fn test_obstacle_rect_checked_each_tick() {
        let mut rig = rig();
        rig.obstacle = Some(Rect::new(Vec2::new(0.6, -0.5), Vec2::new(0.9, 0.2)));
        let session = CastReelSession::new(Settings::default(), rig, 9);
        let mut rod = Rod::with_session(session);
        rod.step(ActionInput::press());
        rod.step(ActionInput::release());
        rod.hook = Some(Vec2::new(1.5, -0.3));
        let out = rod.step_with(ActionInput::default(), |i| i.hook_touched_water = true);
        assert_eq!(rod.session.state(), CastState::Sinking);
        assert!(out.contains(&Intent::PlayFeedback(Feedback::LineBroken)));
    }

    #[test]
    fn test_line_event_ignored_while_casting() {
        let mut rod = Rod::new(Settings::default());
        rod.step(ActionInput::press());
        rod.step_with(ActionInput::default(), |i| i.line_crossed_obstacle = true);
        assert_eq!(rod.session.state(), CastState::Casting);
        assert_eq!(rod.inv.count(BAIT_SLOT), 3);
    }

    #[test]
    fn test_lost_hook_resets_to_idle() {
        let mut rod = Rod::new(Settings::default());
        rod.cast_and_anchor(1.0);
        rod.hook = None;
        let out = rod.step(ActionInput::hold());
        assert_eq!(rod.session.state(), CastState::Idle);
        assert!(out.contains(&Intent::SetPlayerMovement(true)));
        assert!(!out.contains(&Intent::DestroyHook));
        assert_eq!(rod.inv.count(BAIT_SLOT), 3);
    }

    #[test]
    fn test_release_while_idle_is_noop() {
        let mut rod = Rod::new(Settings::default());
        let out = rod.step(ActionInput::release());
        assert!(out.is_empty());
        assert_eq!(rod.session.state(), CastState::Idle);
    }

    #[test]
    fn test_disabled_session_ignores_input() {
        let rig = Rig {
            platform: None,
            ..rig()
        };
        let mut rod = Rod::with_session(CastReelSession::new(Settings::default(), rig, 1));
        let out = rod.step(ActionInput::press());
        assert!(out.is_empty());
        assert_eq!(rod.session.now(), 0.0);
    }

    #[test]
    fn test_multi_catch_spreads_and_unlocks_collisions() {
        let mut rod = Rod::new(Settings {
            multi_catch_count: 3,
            launch_no_collide_secs: 0.35,
            ..Settings::default()
        });
        rod.cast_and_anchor(1.2);
        rod.wait_for_bite();
        rod.step(ActionInput::hold());
        let out = rod.step(ActionInput::release());

        let spawns: Vec<_> = out
            .iter()
            .filter_map(|i| match i {
                Intent::SpawnCatch(s) => Some(s.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(spawns.len(), 3);
        for (i, a) in spawns.iter().enumerate() {
            for b in &spawns[i + 1..] {
                assert_ne!(a.landing_distance, b.landing_distance);
                assert_ne!(a.position, b.position);
            }
        }
        assert_eq!(
            count(&out, |i| matches!(i, Intent::IgnoreCollision { ignore: true, .. })),
            3
        );
        // One bait slot, consumed once
        assert_eq!(count(&out, |i| matches!(i, Intent::ConsumeSlot(_))), 1);
        assert_eq!(rod.inv.count(BAIT_SLOT), 2);

        let mut later = Vec::new();
        for _ in 0..5 {
            later.extend(rod.step(ActionInput::default()));
        }
        assert_eq!(
            count(&later, |i| matches!(i, Intent::IgnoreCollision { ignore: false, .. })),
            3
        );
    }

    #[test]
    fn test_landed_catch_collides_again() {
        let mut rod = Rod::new(Settings {
            multi_catch_count: 2,
            launch_no_collide_secs: 10.0,
            ..Settings::default()
        });
        rod.cast_and_anchor(1.0);
        rod.wait_for_bite();
        rod.step(ActionInput::hold());
        let out = rod.step(ActionInput::release());
        let first = out
            .iter()
            .find_map(|i| match i {
                Intent::SpawnCatch(s) => Some(s.id),
                _ => None,
            })
            .unwrap();
        let out = rod.step_with(ActionInput::default(), |i| i.landed = vec![first]);
        assert_eq!(
            count(&out, |i| matches!(i, Intent::IgnoreCollision { ignore: false, .. })),
            1
        );
    }

    #[test]
    fn test_no_bait_still_catches_low_tiers() {
        let mut rod = Rod::new(Settings {
            multi_catch_count: 5,
            ..Settings::default()
        });
        rod.inv = SlotInventory::new(10);
        rod.cast_and_anchor(1.0);
        rod.wait_for_bite();
        rod.step(ActionInput::hold());
        let out = rod.step(ActionInput::release());
        let catches = rod.session.last_catch().unwrap();
        assert_eq!(catches.spawned_count(), 5);
        assert!(catches.max_rarity <= Rarity::Uncommon);
        assert_eq!(count(&out, |i| matches!(i, Intent::ConsumeSlot(_))), 0);
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut rod = Rod::new(Settings {
                multi_catch_count: 2,
                ..Settings::default()
            });
            let mut all = Vec::new();
            rod.step(ActionInput::press());
            rod.step(ActionInput::release());
            rod.hook = Some(Vec2::new(1.3, -0.3));
            all.extend(rod.step_with(ActionInput::default(), |i| i.hook_touched_water = true));
            all.extend(rod.wait_for_bite());
            all.extend(rod.step(ActionInput::hold()));
            all.extend(rod.step(ActionInput::release()));
            all
        };
        assert_eq!(run(), run());
    }
}
