//! Random-walk behavior for wandering enemies.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::{MovementContext, MovementController};
use crate::entity::Body;
use crate::timer::SimTime;

/// Walks along a heading that is resampled uniformly in `[0, 2π)` every
/// `interval_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WanderController {
    speed: f32,
    interval_ms: u64,
    /// Current heading in radians
    heading: f32,
    /// When the heading was last resampled
    last_change: SimTime,
}

impl WanderController {
    /// Creates a wanderer with a random initial heading, starting its
    /// interval at `now`.
    pub fn new<R: Rng + ?Sized>(speed: f32, interval_ms: u64, now: SimTime, rng: &mut R) -> Self {
        Self {
            speed,
            interval_ms,
            heading: rng.gen_range(0.0..TAU),
            last_change: now,
        }
    }

    /// Current heading in radians.
    #[must_use]
    pub const fn heading(&self) -> f32 {
        self.heading
    }

    /// Timestamp of the last heading change.
    #[must_use]
    pub const fn last_change(&self) -> SimTime {
        self.last_change
    }
}

impl MovementController for WanderController {
    fn propose(
        &mut self,
        body: &mut Body,
        ctx: &MovementContext,
        rng: &mut dyn RngCore,
    ) -> Option<Vec2> {
        if ctx.now.since(self.last_change) >= self.interval_ms {
            self.heading = rng.gen_range(0.0..TAU);
            self.last_change = ctx.now;
        }
        body.set_rotation(self.heading.to_degrees());
        let direction = Vec2::from_angle(self.heading);
        Some(ctx.bounds.clamp(body.position + direction * self.speed * ctx.dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Bounds;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ctx(now_ms: u64) -> MovementContext {
        MovementContext {
            dt: 0.1,
            now: SimTime::from_millis(now_ms),
            bounds: Bounds::new(1000.0, 1000.0),
            target: None,
        }
    }

    #[test]
    fn heading_held_within_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut wander = WanderController::new(70.0, 1000, SimTime::ZERO, &mut rng);
        let initial = wander.heading();
        let mut body = Body::new(Vec2::splat(500.0), 30.0);

        for ms in [0, 200, 999] {
            wander.propose(&mut body, &ctx(ms), &mut rng);
            assert_eq!(wander.heading(), initial);
        }
        assert_eq!(wander.last_change(), SimTime::ZERO);
    }

    #[test]
    fn heading_resampled_after_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut wander = WanderController::new(70.0, 1000, SimTime::ZERO, &mut rng);
        let mut body = Body::new(Vec2::splat(500.0), 30.0);

        wander.propose(&mut body, &ctx(1000), &mut rng);
        assert_eq!(wander.last_change(), SimTime::from_millis(1000));
        assert!((0.0..TAU).contains(&wander.heading()));
    }

    #[test]
    fn step_length_matches_speed() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut wander = WanderController::new(70.0, 1000, SimTime::ZERO, &mut rng);
        let mut body = Body::new(Vec2::splat(500.0), 30.0);

        let candidate = wander.propose(&mut body, &ctx(10), &mut rng).unwrap();
        assert!((candidate.distance(body.position) - 7.0).abs() < 1e-3);
    }
}
