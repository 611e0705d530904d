//! Seek behavior for chasing enemies.

use glam::Vec2;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{MovementContext, MovementController};
use crate::entity::Body;
use crate::spatial::heading_degrees;

/// Heads straight for the player's tank at a fixed speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChaseController {
    speed: f32,
}

impl ChaseController {
    /// Creates a chaser moving at `speed` units per second.
    #[must_use]
    pub const fn new(speed: f32) -> Self {
        Self { speed }
    }
}

impl MovementController for ChaseController {
    fn propose(
        &mut self,
        body: &mut Body,
        ctx: &MovementContext,
        _rng: &mut dyn RngCore,
    ) -> Option<Vec2> {
        let target = ctx.target?;
        let direction = (target - body.position).try_normalize()?;
        body.set_rotation(heading_degrees(direction));
        Some(ctx.bounds.clamp(body.position + direction * self.speed * ctx.dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Bounds;
    use crate::timer::SimTime;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ctx(target: Option<Vec2>) -> MovementContext {
        MovementContext {
            dt: 1.0,
            now: SimTime::ZERO,
            bounds: Bounds::new(1000.0, 1000.0),
            target,
        }
    }

    #[test]
    fn moves_toward_target_and_faces_it() {
        let mut chase = ChaseController::new(90.0);
        let mut body = Body::new(Vec2::new(100.0, 100.0), 30.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let candidate = chase
            .propose(&mut body, &ctx(Some(Vec2::new(100.0, 500.0))), &mut rng)
            .unwrap();
        assert!((candidate - Vec2::new(100.0, 190.0)).length() < 1e-3);
        assert!((body.rotation - 90.0).abs() < 1e-4);
    }

    #[test]
    fn no_target_means_no_intent() {
        let mut chase = ChaseController::new(90.0);
        let mut body = Body::new(Vec2::new(100.0, 100.0), 30.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(chase.propose(&mut body, &ctx(None), &mut rng).is_none());
    }

    #[test]
    fn standing_on_target_means_no_intent() {
        let mut chase = ChaseController::new(90.0);
        let mut body = Body::new(Vec2::new(100.0, 100.0), 30.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(chase
            .propose(&mut body, &ctx(Some(Vec2::new(100.0, 100.0))), &mut rng)
            .is_none());
    }
}
