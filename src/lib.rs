//! Fixed-step simulation core for a top-down survival action game.
//!
//! The player auto-attacks waves of monsters with up to three weapons, picks
//! up experience and chooses an upgrade at every level. Rendering and input
//! plumbing live outside this crate's library; they read `SimulationState`
//! and call the entry points on `compute::Simulation`.

pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod progression;
pub mod projectiles;
pub mod spawner;
pub mod weapons;

pub use compute::{Simulation, SimulationState};
pub use config::SimConfig;
pub use error::Error;
