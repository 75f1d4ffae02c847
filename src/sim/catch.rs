//! Catch definitions and multi-catch distribution
//!
//! One successful release can launch several catches. Each one redraws its
//! rarity (round-robin over the equipped tackle), gets its own landing edge
//! distance on a zig-zag around the release point, spawns slightly staggered,
//! and flies on a ballistic arc to its landing point.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ballistic::launch_velocity;
use super::equipment::EquipmentSnapshot;
use super::rarity::Rarity;
use super::session::{CatchId, Intent, Platform};
use crate::consts::RARITY_PRICE_STEP;
use crate::settings::Settings;
use crate::{inverse_lerp, lerp};

/// One species that can be caught
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchDef {
    pub id: String,
    pub species: String,
    pub rarity: Rarity,
    pub base_price: i32,
    pub price_per_cm: f32,
    pub min_length_cm: f32,
    pub max_length_cm: f32,
}

impl CatchDef {
    /// Sale value of an individual of the given length
    pub fn price_for(&self, length_cm: f32) -> i32 {
        self.base_price
            + (length_cm * self.price_per_cm).round() as i32
            + self.rarity.index() as i32 * RARITY_PRICE_STEP
    }

    /// Roll an individual (length uniform in the species range)
    pub fn roll_instance<R: Rng + ?Sized>(&self, rng: &mut R) -> CatchInstance {
        let length_cm = lerp(self.min_length_cm, self.max_length_cm, rng.random::<f32>());
        CatchInstance {
            def_id: self.id.clone(),
            species: self.species.clone(),
            rarity: self.rarity,
            length_cm,
            value: self.price_for(length_cm),
        }
    }
}

/// A caught individual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchInstance {
    pub def_id: String,
    pub species: String,
    pub rarity: Rarity,
    pub length_cm: f32,
    pub value: i32,
}

/// Every species the spawner knows about
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatchCatalog {
    pub defs: Vec<CatchDef>,
}

impl CatchCatalog {
    pub fn new(defs: Vec<CatchDef>) -> Self {
        Self { defs }
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Uniform pick within a tier, widening to any species when the tier is empty
    pub fn pick<R: Rng + ?Sized>(&self, rarity: Rarity, rng: &mut R) -> Option<&CatchDef> {
        let tier: Vec<&CatchDef> = self.defs.iter().filter(|d| d.rarity == rarity).collect();
        if !tier.is_empty() {
            return Some(tier[rng.random_range(0..tier.len())]);
        }
        if self.defs.is_empty() {
            return None;
        }
        log::debug!("No {} species in catalog, picking from all", rarity.as_str());
        Some(&self.defs[rng.random_range(0..self.defs.len())])
    }
}

/// One catch launched by a successful release
#[derive(Debug, Clone, PartialEq)]
pub struct CatchSpawn {
    pub id: CatchId,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Rarity drawn by the lottery
    pub rarity: Rarity,
    pub catch: CatchInstance,
    /// Tackle slot whose table produced this catch
    pub slot: Option<usize>,
    /// Edge distance this catch's landing point was mapped from
    pub landing_distance: f32,
}

/// Everything a successful release produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatchResult {
    pub spawns: Vec<CatchSpawn>,
    pub max_rarity: Rarity,
}

impl CatchResult {
    pub fn spawned_count(&self) -> usize {
        self.spawns.len()
    }

    /// Tackle slots used, one entry per catch
    pub fn used_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.spawns.iter().filter_map(|s| s.slot)
    }
}

/// Signed zig-zag index: 0, +1, -1, +2, -2, ...
#[inline]
pub fn zigzag(index: usize) -> i32 {
    let magnitude = index.div_ceil(2) as i32;
    if index % 2 == 1 { magnitude } else { -magnitude }
}

/// Landing edge distances for `count` catches around `base`
///
/// Catch `i` lands at `base + zigzag(i) * step` while that stays inside
/// `[lo, hi]`. Offsets that leave the range are skipped and the zig-zag keeps
/// going on the other side, so distances stay distinct whenever the range is
/// wide enough. Leftover catches split the widest remaining gap each.
pub fn landing_distances(base: f32, count: usize, step: f32, lo: f32, hi: f32) -> Vec<f32> {
    let hi = hi.max(lo);
    let clamp = |d: f32| d.max(lo).min(hi);
    let base = clamp(base);
    if step <= 0.0 || count <= 1 {
        return vec![base; count];
    }

    const SLOP: f32 = 1e-5;
    let mut out = Vec::with_capacity(count);
    let (mut above_open, mut below_open) = (true, true);
    let mut k = 0usize;
    while out.len() < count && (above_open || below_open) {
        let offset = zigzag(k);
        let d = base + offset as f32 * step;
        if d > hi + SLOP {
            above_open = false;
        } else if d < lo - SLOP {
            below_open = false;
        } else {
            out.push(clamp(d));
        }
        k += 1;
    }

    while out.len() < count {
        let d = widest_gap_midpoint(&out, lo, hi);
        out.push(d);
    }
    out
}

/// Midpoint of the widest free gap in `[lo, hi]` between taken distances
fn widest_gap_midpoint(taken: &[f32], lo: f32, hi: f32) -> f32 {
    let mut marks: Vec<f32> = taken.to_vec();
    marks.push(lo);
    marks.push(hi);
    marks.sort_by(f32::total_cmp);

    let (a, b) = marks
        .windows(2)
        .map(|w| (w[0], w[1]))
        .fold((lo, lo), |best, gap| {
            if gap.1 - gap.0 > best.1 - best.0 { gap } else { best }
        });
    lerp(a, b, 0.5)
}

/// Spawn offset of catch `index` relative to the first one
///
/// Later catches drop by `stagger.y` per index and alternate left/right by
/// `stagger.x`.
pub fn spawn_offset(index: usize, stagger: Vec2) -> Vec2 {
    if index == 0 {
        return Vec2::ZERO;
    }
    let side = if index % 2 == 1 { -1.0 } else { 1.0 };
    Vec2::new(side * stagger.x, -(index as f32) * stagger.y)
}

/// Where the release happened
#[derive(Debug, Clone, Copy)]
pub struct ReleasePoint {
    pub hook: Vec2,
    pub edge_distance: f32,
    pub player_x: f32,
}

/// Run the catch pipeline for one successful release
///
/// `next_id` hands out ids for the spawned catches.
pub fn distribute_catches<R: Rng + ?Sized>(
    rng: &mut R,
    settings: &Settings,
    snapshot: &EquipmentSnapshot,
    catalog: &CatchCatalog,
    platform: &Platform,
    release: ReleasePoint,
    mut next_id: impl FnMut() -> CatchId,
) -> CatchResult {
    let count = settings.catch_count();
    let lo = settings.release_distance;
    let hi = settings.max_drop_distance.max(lo);
    let distances = landing_distances(
        release.edge_distance,
        count,
        settings.landing_distance_step,
        lo,
        hi,
    );
    let target_y = platform.surface_y + settings.ground_y_offset;
    let origin = release.hook + Vec2::new(0.0, settings.spawn_y_offset);

    let mut result = CatchResult::default();
    for (i, &distance) in distances.iter().enumerate() {
        let (lure, weights) = snapshot.weights_for_catch(i);
        let rarity = weights.draw(rng);

        let Some(def) = catalog.pick(rarity, rng) else {
            log::warn!("Catch {} skipped: catalog is empty", i);
            continue;
        };
        let catch = def.roll_instance(rng);

        let t = inverse_lerp(lo, hi, distance);
        let target = Vec2::new(lerp(release.player_x, platform.left_edge_x, t), target_y);
        let position = origin + spawn_offset(i, settings.spawn_stagger);
        let velocity = launch_velocity(position, target, settings.apex_height, settings.gravity);

        result.max_rarity = result.max_rarity.max(rarity);
        result.spawns.push(CatchSpawn {
            id: next_id(),
            position,
            velocity,
            rarity,
            catch,
            slot: lure.map(|l| l.slot),
            landing_distance: distance,
        });
    }
    result
}

/// Catches of one cast that temporarily ignore each other
///
/// Every member ignores every other member until its own grace timer runs
/// out or it lands. A spawn after a quiet gap starts a new group.
#[derive(Debug, Clone, Default)]
pub struct NoCollideGroup {
    members: Vec<(CatchId, f64)>,
    last_spawn_at: Option<f64>,
}

impl NoCollideGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: CatchId) -> bool {
        self.members.iter().any(|&(m, _)| m == id)
    }

    /// Add a freshly spawned catch
    pub fn admit(&mut self, id: CatchId, now: f64, settings: &Settings, out: &mut Vec<Intent>) {
        let gap = settings.no_collide_group_reset_gap as f64;
        if self.last_spawn_at.is_some_and(|t| now - t > gap) {
            self.reset(out);
        }
        self.last_spawn_at = Some(now);

        if settings.launch_no_collide_secs <= 0.0 {
            return;
        }
        for &(other, _) in &self.members {
            out.push(Intent::IgnoreCollision {
                a: id,
                b: other,
                ignore: true,
            });
        }
        self.members
            .push((id, now + settings.launch_no_collide_secs as f64));
    }

    /// Release every member whose grace timer has run out
    pub fn expire(&mut self, now: f64, out: &mut Vec<Intent>) {
        let expired: Vec<CatchId> = self
            .members
            .iter()
            .filter(|&&(_, until)| now >= until)
            .map(|&(id, _)| id)
            .collect();
        for id in expired {
            self.release(id, out);
        }
    }

    /// Restore collisions between `id` and the rest of the group
    pub fn release(&mut self, id: CatchId, out: &mut Vec<Intent>) {
        let Some(pos) = self.members.iter().position(|&(m, _)| m == id) else {
            return;
        };
        self.members.remove(pos);
        for &(other, _) in &self.members {
            out.push(Intent::IgnoreCollision {
                a: id,
                b: other,
                ignore: false,
            });
        }
    }

    fn reset(&mut self, out: &mut Vec<Intent>) {
        while let Some(&(id, _)) = self.members.first() {
            self.release(id, out);
        }
    }
}
