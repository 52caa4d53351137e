//! Error types for the gridgym workspace.
//!
//! [`GridGymError`] is the top-level error. The nested enums separate
//! fatal construction-time problems ([`ConfigError`]) from recoverable
//! runtime ones ([`StateError`], [`ValidationError`], [`SolverError`],
//! [`AgentError`]).

use thiserror::Error;

// ---------------------------------------------------------------------------
// GridGymError
// ---------------------------------------------------------------------------

/// Top-level error for all gridgym operations.
#[derive(Debug, Error)]
pub enum GridGymError {
    /// Configuration or construction failure.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// State encode/decode failure.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// Input validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// MDP solver failure.
    #[error("solver error: {0}")]
    Solver(#[from] SolverError),

    /// Agent failure or interrupt.
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Fatal problems detected while constructing the bridge or loading config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// More than one live controllable sprite.
    #[error("expected at most one live avatar, found {found}")]
    MultipleAvatars { found: usize },

    /// No controllable sprite type is defined at all.
    #[error("no avatar type defined")]
    NoAvatarType,

    /// The avatar type does not use block-aligned movement.
    #[error("avatar type '{type_name}' does not use grid physics")]
    NonGridAvatar { type_name: String },

    /// A tracked background type can move, which the bridge cannot encode.
    #[error("background type '{type_name}' is not static")]
    MovingBackground { type_name: String },

    /// Discount factor outside (0, 1].
    #[error("discount factor {value} is outside (0, 1]")]
    InvalidDiscount { value: f64 },

    /// Episode step cap of zero would never let an episode run.
    #[error("max_episode_steps must be positive")]
    ZeroMaxSteps,
}

// ---------------------------------------------------------------------------
// StateError
// ---------------------------------------------------------------------------

/// Problems while encoding or decoding a [`GameState`](crate::types::GameState).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// The state's shape does not match the handler configuration.
    #[error("state shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// Presence bitvector length differs from the gravepoint count.
    #[error("presence bitvector has {got} bits, expected {expected}")]
    PresenceLength { expected: usize, got: usize },

    /// The dead sentinel carries no position, so it cannot be decoded or
    /// sensed.
    #[error("dead sentinel has no position")]
    DeadState,

    /// A state names a sprite type the engine does not know.
    #[error("unknown sprite type '{type_name}'")]
    UnknownSpriteType { type_name: String },
}

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// Invalid caller input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Action index outside the action set.
    #[error("action index {index} out of range for {len} actions")]
    ActionOutOfRange { index: usize, len: usize },
}

// ---------------------------------------------------------------------------
// SolverError
// ---------------------------------------------------------------------------

/// Failures from MDP conversion or policy solving.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    /// Policy iteration did not converge within its iteration cap.
    #[error("solver did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },

    /// A queried state was not part of the solver's state enumeration.
    #[error("state not present in the solver's state enumeration")]
    StateNotEnumerated,

    /// The converted model has no states.
    #[error("MDP model has no states")]
    EmptyModel,

    /// Transition or reward tables have inconsistent dimensions.
    #[error("malformed MDP model: {detail}")]
    BadShape { detail: String },

    /// The environment failed while the converter was exploring it.
    #[error("environment failure during conversion: {detail}")]
    Environment { detail: String },
}

// ---------------------------------------------------------------------------
// AgentError
// ---------------------------------------------------------------------------

/// Failures surfaced by an agent's `act`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    /// The user asked to stop. Callers treat this as a normal end
    /// condition, not a defect.
    #[error("user requested interrupt")]
    Interrupted,

    /// The agent's policy could not produce an action.
    #[error(transparent)]
    Solver(#[from] SolverError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
