//! Shared foundation for the gridgym workspace.
//!
//! Defines the data types exchanged between the observation bridge, the
//! environment wrapper, agents, and recorders; the error tree; the TOML
//! config; deterministic seeding; and the [`SpriteSimulation`] trait that
//! any tile/grid engine implements to plug in.
//!
//! # Example
//!
//! ```
//! use gridgym_core::prelude::*;
//!
//! let state = GameState::at(GridPos::new(2, 3));
//! assert!(!state.is_dead());
//!
//! let actions = ActionSet::default();
//! assert_eq!(actions.get(0).unwrap(), Direction::Up);
//! ```
//!
//! [`SpriteSimulation`]: traits::SpriteSimulation

pub mod config;
pub mod error;
pub mod seed;
pub mod traits;
pub mod types;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::config::EnvConfig;
    pub use crate::error::{
        AgentError, ConfigError, GridGymError, SolverError, StateError, ValidationError,
    };
    pub use crate::seed::{RunSeeds, derive_seed, derive_seed_indexed};
    pub use crate::traits::{Agent, SpriteSimulation};
    pub use crate::types::{
        ActionSet, AvatarState, BASEDIRS, Direction, EffectKind, EffectRule, Frame, GameState,
        GridPos, Observation, Physics, PixelPos, SpriteId, SpriteTypeDef, SpriteView, Termination,
        rotate_left,
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn prelude_exports_resolve() {
        let _ = GameState::Dead;
        let _ = Termination::CONTINUE;
        let _ = EnvConfig::default();
        let _ = RunSeeds::new(0);
    }
}
