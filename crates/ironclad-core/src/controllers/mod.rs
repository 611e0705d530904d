//! Movement controllers.
//!
//! A controller turns per-entity state plus the tick context into a candidate
//! position. Controllers never write the position themselves: the world
//! collects every candidate first, then commits each one that the
//! [`CollisionSystem`](crate::collision::CollisionSystem) does not veto. This
//! keeps the collision phase looking at a single consistent snapshot.
//!
//! Controllers may update the body's rotation, since facing never blocks.
//!
//! # Controllers
//!
//! - [`PlayerController`]: joystick-driven
//! - [`ChaseController`]: seeks the player's tank
//! - [`WanderController`]: random walk with a periodic heading change
//!
//! # Example
//!
//! ```
//! use ironclad_core::controllers::{Joystick, MovementContext, MovementController, PlayerController};
//! use ironclad_core::entity::Body;
//! use ironclad_core::spatial::Bounds;
//! use ironclad_core::timer::SimTime;
//! use glam::Vec2;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut player = PlayerController::new(200.0);
//! player.set_input(Joystick::new(0.0, 1.0));
//!
//! let ctx = MovementContext {
//!     dt: 0.5,
//!     now: SimTime::ZERO,
//!     bounds: Bounds::new(1000.0, 1000.0),
//!     target: None,
//! };
//! let mut body = Body::new(Vec2::new(100.0, 100.0), 30.0);
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//!
//! let candidate = player.propose(&mut body, &ctx, &mut rng).unwrap();
//! assert!((candidate.x - 200.0).abs() < 1e-3);
//! ```

mod chase;
mod player;
mod wander;

pub use chase::ChaseController;
pub use player::{Joystick, PlayerController};
pub use wander::WanderController;

use glam::Vec2;
use rand::RngCore;

use crate::entity::Body;
use crate::spatial::Bounds;
use crate::timer::SimTime;

/// Read-only inputs shared by every controller in one tick.
#[derive(Debug, Clone, Copy)]
pub struct MovementContext {
    /// Seconds since the previous tick
    pub dt: f32,
    /// Current simulation time
    pub now: SimTime,
    /// Movement area, already inset by the map margin
    pub bounds: Bounds,
    /// Live player tank position, if any
    pub target: Option<Vec2>,
}

/// Produces candidate positions for one entity.
pub trait MovementController {
    /// Returns where the entity wants to be after this tick, clamped to
    /// `ctx.bounds`, or `None` if it has no movement intent.
    fn propose(
        &mut self,
        body: &mut Body,
        ctx: &MovementContext,
        rng: &mut dyn RngCore,
    ) -> Option<Vec2>;
}
