//! Geometry helpers: map bounds, circle overlap, and angle conventions.
//!
//! Angles exposed to the host are degrees, counter-clockwise from +X, wrapped
//! into `[0, 360)`. Internal headings (wandering enemies) are radians.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle bounding the playfield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Bounds {
    /// Bounds spanning `[0, width] x [0, height]`.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(width, height),
        }
    }

    /// Get the center of the bounds.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Shrinks the bounds by `margin` on every side.
    ///
    /// A margin larger than half the extent collapses that axis onto the centre.
    #[must_use]
    pub fn inset(&self, margin: f32) -> Self {
        let center = self.center();
        Self {
            min: (self.min + Vec2::splat(margin)).min(center),
            max: (self.max - Vec2::splat(margin)).max(center),
        }
    }

    /// Check if a point is inside the bounds (edges included).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Clamps a point into the bounds.
    #[must_use]
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }

    /// Draws a uniformly distributed point inside the bounds.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            rng.gen_range(self.min.x..=self.max.x),
            rng.gen_range(self.min.y..=self.max.y),
        )
    }
}

/// Strict circle-circle overlap: `distance(a, b) < ra + rb`.
///
/// Touching circles do not overlap.
#[must_use]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    within(a, b, ra + rb)
}

/// True if `a` and `b` are strictly closer than `distance`.
#[must_use]
pub fn within(a: Vec2, b: Vec2, distance: f32) -> bool {
    a.distance_squared(b) < distance * distance
}

/// Wraps an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Facing of a direction vector in degrees.
#[must_use]
pub fn heading_degrees(direction: Vec2) -> f32 {
    normalize_degrees(direction.y.atan2(direction.x).to_degrees())
}

/// Unit vector for an angle in degrees.
#[must_use]
pub fn unit_from_degrees(degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians())
}
