//! # Ironclad Core
//!
//! Combat core for Ironclad, a top-down arcade tank game.
//!
//! This crate is the deterministic, single-threaded simulation behind a round:
//! the player's tank, chasing and wandering enemies, destructible supply boxes,
//! pooled projectiles, score and rank progression, and the play / game-over /
//! countdown / reset cycle. Rendering, input devices and audio playback are the
//! host's job; the host feeds stick input and fire edges in and drains
//! [`GameEvent`]s out.
//!
//! ## Architecture
//!
//! - **Entities** ([`entity`], [`arena`]): typed collections keyed by
//!   [`EntityId`]
//! - **Controllers** ([`controllers`]): candidate positions per tick
//! - **Collision** ([`collision`]): blocking, damage, contact and pickup queries
//! - **Population** ([`spawn`]): periodic box and enemy reconciliation
//! - **Progression** ([`progression`]): score, ranks, checkpoints
//! - **Lifecycle** ([`lifecycle`]): round state machine
//! - **Scheduling** ([`timer`], [`pool`]): owner-scoped timers, projectile pool
//! - **Round context** ([`world`]): owns everything and runs the tick
//!
//! ## Usage
//!
//! ```
//! use ironclad_core::{GameConfig, GameMode, Joystick, Services, World};
//!
//! let config = GameConfig::with_mode(GameMode::Rescue);
//! let mut world = World::new(config, 7, Services::in_memory()).unwrap();
//!
//! for _ in 0..60 {
//!     world.step(16, Joystick::new(0.0, 1.0));
//! }
//! let events: Vec<_> = world.drain_events().collect();
//! assert!(!events.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod collision;
pub mod config;
pub mod controllers;
pub mod entity;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod persistence;
pub mod pool;
pub mod progression;
pub mod spatial;
pub mod spawn;
pub mod timer;
pub mod world;

#[cfg(test)]
mod tests;

pub use config::{GameConfig, GameMode};
pub use controllers::Joystick;
pub use entity::{EntityId, EntityTag};
pub use error::{ConfigError, PersistenceError};
pub use events::{AudioCue, GameEvent, ScoreEvent};
pub use lifecycle::RoundState;
pub use persistence::Services;
pub use world::{FireEdge, RoundCounters, World};
