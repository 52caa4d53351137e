//! State-observation bridge and environment wrapper for grid sprite
//! engines.
//!
//! The crate turns any engine implementing
//! [`SpriteSimulation`](gridgym_core::traits::SpriteSimulation) into an
//! RL environment:
//!
//! - [`StateObsHandler`](handler::StateObsHandler) classifies sprite
//!   types once and translates engine state to and from hashable
//!   [`GameState`](gridgym_core::types::GameState) snapshots,
//! - [`GameEnvironment`](env::GameEnvironment) adds actions, sensors,
//!   termination, and rollouts on top,
//! - [`GameTask`](task::GameTask) adds win/lose rewards and the episode
//!   runner.

pub mod env;
pub mod handler;
pub mod task;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::env::{GameEnvironment, Transition};
    pub use crate::handler::StateObsHandler;
    pub use crate::task::{GameTask, run_episode};
}
