//! Agents and MDP policy plumbing for gridgym environments.
//!
//! Baseline agents ([`RandomAgent`](agents::RandomAgent),
//! [`ScriptedAgent`](agents::ScriptedAgent)), user input via
//! [`InteractiveAgent`](agents::InteractiveAgent), and
//! [`PolicyDrivenAgent`](policy::PolicyDrivenAgent) built from external
//! MDP converters and solvers through the seams in [`mdp`].

pub mod agents;
pub mod mdp;
pub mod policy;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::agents::{
        InputSnapshot, InputSource, InteractiveAgent, RandomAgent, ScriptedAgent,
    };
    pub use crate::mdp::{MdpConverter, MdpModel, PolicySolver, PolicyTable};
    pub use crate::policy::PolicyDrivenAgent;
}
