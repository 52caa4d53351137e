//! Agents driven by a solved policy table.

use std::collections::HashMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use gridgym_core::error::{AgentError, GridGymError, SolverError};
use gridgym_core::traits::{Agent, SpriteSimulation};
use gridgym_core::types::GameState;
use gridgym_env::env::GameEnvironment;

use crate::mdp::{MdpConverter, PolicySolver, PolicyTable};

// ---------------------------------------------------------------------------
// PolicyDrivenAgent
// ---------------------------------------------------------------------------

/// Samples actions from a [`PolicyTable`] keyed by game state.
///
/// States outside the table's enumeration surface as
/// [`SolverError::StateNotEnumerated`] instead of a guessed action.
#[derive(Debug)]
pub struct PolicyDrivenAgent {
    table: PolicyTable,
    index: HashMap<GameState, usize>,
    rng: ChaCha8Rng,
}

impl PolicyDrivenAgent {
    /// Bind a policy table to its state enumeration.
    ///
    /// # Errors
    ///
    /// [`SolverError::BadShape`] when the table's row count differs from
    /// the state count.
    pub fn new(table: PolicyTable, states: Vec<GameState>, seed: u64) -> Result<Self, SolverError> {
        if table.num_states() != states.len() {
            return Err(SolverError::BadShape {
                detail: format!(
                    "policy table has {} rows for {} states",
                    table.num_states(),
                    states.len()
                ),
            });
        }
        let index = states
            .into_iter()
            .enumerate()
            .map(|(i, s)| (s, i))
            .collect();
        Ok(Self {
            table,
            index,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Convert the environment to an MDP, solve it, and wrap the result.
    ///
    /// Converter and solver failures propagate; there is no fallback
    /// policy.
    ///
    /// # Errors
    ///
    /// Any [`SolverError`] from conversion, model validation, or solving.
    pub fn build_optimal<S: SpriteSimulation>(
        env: &mut GameEnvironment<S>,
        converter: &mut dyn MdpConverter<S>,
        solver: &dyn PolicySolver,
        discount: f64,
        seed: u64,
    ) -> Result<Self, GridGymError> {
        let model = converter.convert(env)?;
        model.validate()?;
        info!(
            converter = converter.name(),
            solver = solver.name(),
            states = model.num_states(),
            actions = model.num_actions(),
            discount,
            "solving MDP"
        );
        let table = solver.solve(&model, discount)?;
        Ok(Self::new(table, model.states, seed)?)
    }

    /// Number of enumerated states.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.index.len()
    }
}

impl Agent for PolicyDrivenAgent {
    fn act(&mut self, state: &GameState) -> Result<Option<usize>, AgentError> {
        let &idx = self
            .index
            .get(state)
            .ok_or(SolverError::StateNotEnumerated)?;
        Ok(Some(self.table.sample(idx, &mut self.rng)))
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "PolicyDrivenAgent"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gridgym_core::types::GridPos;

    fn states() -> Vec<GameState> {
        vec![
            GameState::at(GridPos::new(0, 0)),
            GameState::at(GridPos::new(1, 0)),
        ]
    }

    #[test]
    fn acts_by_table_lookup() {
        let table = PolicyTable::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let mut agent = PolicyDrivenAgent::new(table, states(), 0).unwrap();

        assert_eq!(
            agent.act(&GameState::at(GridPos::new(0, 0))).unwrap(),
            Some(0)
        );
        assert_eq!(
            agent.act(&GameState::at(GridPos::new(1, 0))).unwrap(),
            Some(1)
        );
    }

    #[test]
    fn unknown_state_is_an_error() {
        let table = PolicyTable::new(vec![vec![1.0], vec![1.0]]).unwrap();
        let mut agent = PolicyDrivenAgent::new(table, states(), 0).unwrap();

        let err = agent.act(&GameState::Dead).unwrap_err();
        assert_eq!(err, AgentError::Solver(SolverError::StateNotEnumerated));
    }

    #[test]
    fn row_count_must_match_states() {
        let table = PolicyTable::new(vec![vec![1.0]]).unwrap();
        let err = PolicyDrivenAgent::new(table, states(), 0).unwrap_err();
        assert!(matches!(err, SolverError::BadShape { .. }));
    }
}
