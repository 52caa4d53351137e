//! Fixture grid engine, ready-made levels, and mock collaborators for
//! gridgym test suites and demos.

pub mod fixture;
pub mod levels;
pub mod mocks;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::fixture::{FixtureSim, TerminationRule};
    pub use crate::levels::{
        continuous_avatar_game, double_avatar_game, key_door_game, maze_game,
        moving_background_game, no_avatar_game, two_kind_game,
    };
    pub use crate::mocks::{
        ExhaustiveConverter, FailingConverter, FailingSolver, QueuedInput, ValueIterationSolver,
    };
}
