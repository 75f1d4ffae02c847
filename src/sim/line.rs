//! Fishing line geometry
//!
//! The line hangs from the rod tip to the hook as a sagging quadratic curve.
//! The curve is sampled into segments and each segment is clipped against an
//! obstacle rectangle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (e.g. the breakwater's outer blocks)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Sample `segments + 1` points along the sagging line
///
/// The midpoint of the curve hangs `sag` below the straight chord.
pub fn line_curve(rod_tip: Vec2, hook: Vec2, sag: f32, segments: u32) -> Vec<Vec2> {
    let segments = segments.max(1);
    let control = (rod_tip + hook) * 0.5 - Vec2::new(0.0, 2.0 * sag);

    (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let u = 1.0 - t;
            rod_tip * (u * u) + control * (2.0 * u * t) + hook * (t * t)
        })
        .collect()
}

/// Segment vs rectangle test (Liang-Barsky clipping)
pub fn segment_hits_rect(a: Vec2, b: Vec2, rect: &Rect) -> bool {
    let d = b - a;
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    let checks = [
        (-d.x, a.x - rect.min.x),
        (d.x, rect.max.x - a.x),
        (-d.y, a.y - rect.min.y),
        (d.y, rect.max.y - a.y),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            // Parallel to this edge
            if q < 0.0 {
                return false;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return false;
        }
    }
    true
}

/// True if any segment of the sampled curve touches the rectangle
pub fn curve_hits_rect(points: &[Vec2], rect: &Rect) -> bool {
    points
        .windows(2)
        .any(|w| segment_hits_rect(w[0], w[1], rect))
}
