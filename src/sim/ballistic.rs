//! Two-phase ballistic launch solver
//!
//! The arc rises from `start` to a fixed apex above the higher endpoint, then
//! falls to `target`. Each phase is solved independently, so the horizontal
//! speed only has to cover the distance in the combined flight time.

use glam::Vec2;

use crate::consts::BALLISTIC_EPSILON;

/// Launch velocity that carries a body from `start` to `target`
///
/// `apex_height` is measured above `max(start.y, target.y)`. `gravity` may be
/// given with either sign. Degenerate heights and flight times are clamped to
/// `BALLISTIC_EPSILON` instead of producing NaN.
pub fn launch_velocity(start: Vec2, target: Vec2, apex_height: f32, gravity: f32) -> Vec2 {
    let (vel, _) = solve(start, target, apex_height, gravity);
    vel
}

/// Launch velocity plus total flight time
pub fn solve(start: Vec2, target: Vec2, apex_height: f32, gravity: f32) -> (Vec2, f32) {
    let g = gravity.abs().max(BALLISTIC_EPSILON);
    let peak_y = start.y.max(target.y) + apex_height.max(BALLISTIC_EPSILON);

    let vy_up = (2.0 * g * (peak_y - start.y).max(BALLISTIC_EPSILON)).sqrt();
    let t_up = vy_up / g;
    let vy_down = (2.0 * g * (peak_y - target.y).max(BALLISTIC_EPSILON)).sqrt();
    let t_down = vy_down / g;

    let flight = (t_up + t_down).max(BALLISTIC_EPSILON);
    let vx = (target.x - start.x) / flight;
    (Vec2::new(vx, vy_up), flight)
}
