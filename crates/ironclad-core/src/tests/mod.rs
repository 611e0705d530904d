//! Crate-level tests that drive a whole round.
//!
//! - `determinism.rs`: same seed and inputs give the same round
//! - `integration.rs`: end-to-end scenarios through [`crate::world::World`]
//! - `helpers.rs`: world setup and entity placement utilities

mod helpers;
mod integration;
