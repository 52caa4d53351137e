//! Converter, solver, and input-source implementations for tests.
//!
//! [`ExhaustiveConverter`] and [`ValueIterationSolver`] are small but
//! real: together they let `PolicyDrivenAgent::build_optimal` run end to
//! end against a fixture level. The failing variants exist to test error
//! propagation.

use std::collections::{HashMap, VecDeque};

use gridgym_agents::agents::{InputSnapshot, InputSource};
use gridgym_agents::mdp::{MdpConverter, MdpModel, PolicySolver, PolicyTable};
use gridgym_core::error::{GridGymError, SolverError};
use gridgym_core::traits::SpriteSimulation;
use gridgym_core::types::GameState;
use gridgym_env::env::GameEnvironment;

fn env_failure(e: GridGymError) -> SolverError {
    SolverError::Environment {
        detail: e.to_string(),
    }
}

// ---------------------------------------------------------------------------
// ExhaustiveConverter
// ---------------------------------------------------------------------------

/// Enumerates the reachable state space by breadth-first search and
/// builds a deterministic tabular MDP.
///
/// Terminal and dead states are absorbing self-loops. Rewards are +1 for
/// winning states, -1 for losing and dead states, 0 elsewhere. The
/// environment is reset when conversion finishes.
pub struct ExhaustiveConverter {
    /// Abort once the enumeration grows past this many states.
    pub max_states: usize,
}

impl Default for ExhaustiveConverter {
    fn default() -> Self {
        Self { max_states: 10_000 }
    }
}

impl<S: SpriteSimulation> MdpConverter<S> for ExhaustiveConverter {
    fn convert(&mut self, env: &mut GameEnvironment<S>) -> Result<MdpModel, SolverError> {
        let num_actions = env.actions().len();
        let init = env.get_state().map_err(env_failure)?;

        let mut states: Vec<GameState> = vec![init.clone()];
        let mut index: HashMap<GameState, usize> = HashMap::from([(init, 0)]);
        let mut queue: VecDeque<usize> = VecDeque::from([0]);
        // Deterministic edges (state, action, successor).
        let mut edges: Vec<(usize, usize, usize)> = Vec::new();

        while let Some(si) = queue.pop_front() {
            let state = states[si].clone();
            if state.is_dead() {
                continue;
            }
            env.set_state(&state).map_err(env_failure)?;
            if env.is_done().ended {
                continue;
            }
            for action in 0..num_actions {
                env.set_state(&state).map_err(env_failure)?;
                env.perform_action(Some(action), true).map_err(env_failure)?;
                let next = env.get_state().map_err(env_failure)?;
                let ni = match index.get(&next) {
                    Some(&i) => i,
                    None => {
                        let i = states.len();
                        if i >= self.max_states {
                            return Err(SolverError::Environment {
                                detail: format!("state cap of {} exceeded", self.max_states),
                            });
                        }
                        index.insert(next.clone(), i);
                        states.push(next);
                        queue.push_back(i);
                        i
                    }
                };
                edges.push((si, action, ni));
            }
        }

        let n = states.len();
        let mut rewards = vec![0.0; n];
        for (i, state) in states.iter().enumerate() {
            if state.is_dead() {
                rewards[i] = -1.0;
                continue;
            }
            env.set_state(state).map_err(env_failure)?;
            let t = env.is_done();
            if t.ended {
                rewards[i] = if t.win { 1.0 } else { -1.0 };
            }
        }

        // Absorbing self-loops by default; explored edges overwrite.
        let mut transitions = vec![vec![vec![0.0; n]; n]; num_actions];
        for table in &mut transitions {
            for (s, row) in table.iter_mut().enumerate() {
                row[s] = 1.0;
            }
        }
        for (s, a, s2) in edges {
            let row = &mut transitions[a][s];
            row.iter_mut().for_each(|p| *p = 0.0);
            row[s2] = 1.0;
        }

        env.reset().map_err(env_failure)?;
        Ok(MdpModel {
            states,
            transitions,
            rewards,
        })
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ExhaustiveConverter"
    }
}

/// A converter that always fails, for propagation tests.
pub struct FailingConverter;

impl<S: SpriteSimulation> MdpConverter<S> for FailingConverter {
    fn convert(&mut self, _env: &mut GameEnvironment<S>) -> Result<MdpModel, SolverError> {
        Err(SolverError::Environment {
            detail: "conversion refused".into(),
        })
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "FailingConverter"
    }
}

// ---------------------------------------------------------------------------
// ValueIterationSolver
// ---------------------------------------------------------------------------

/// Plain value iteration; the returned policy is greedy one-hot.
pub struct ValueIterationSolver {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for ValueIterationSolver {
    fn default() -> Self {
        Self {
            max_iterations: 1_000,
            tolerance: 1e-8,
        }
    }
}

impl PolicySolver for ValueIterationSolver {
    fn solve(&self, model: &MdpModel, discount: f64) -> Result<PolicyTable, SolverError> {
        model.validate()?;
        let n = model.num_states();
        let num_actions = model.num_actions();
        let mut values = model.rewards.clone();

        let mut converged = false;
        for _ in 0..self.max_iterations {
            let mut delta: f64 = 0.0;
            let mut next = vec![0.0; n];
            for s in 0..n {
                let best = (0..num_actions)
                    .map(|a| {
                        model.transitions[a][s]
                            .iter()
                            .zip(&values)
                            .map(|(p, v)| p * v)
                            .sum::<f64>()
                    })
                    .fold(f64::NEG_INFINITY, f64::max);
                next[s] = model.rewards[s] + discount * best;
                delta = delta.max((next[s] - values[s]).abs());
            }
            values = next;
            if delta < self.tolerance {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(SolverError::NotConverged {
                iterations: self.max_iterations,
            });
        }

        let mut rows = Vec::with_capacity(n);
        for s in 0..n {
            let mut best_a = 0;
            let mut best_q = f64::NEG_INFINITY;
            for a in 0..num_actions {
                let q: f64 = model.transitions[a][s]
                    .iter()
                    .zip(&values)
                    .map(|(p, v)| p * v)
                    .sum();
                if q > best_q {
                    best_q = q;
                    best_a = a;
                }
            }
            let mut row = vec![0.0; num_actions];
            row[best_a] = 1.0;
            rows.push(row);
        }
        PolicyTable::new(rows)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ValueIterationSolver"
    }
}

/// A solver that always reports non-convergence.
pub struct FailingSolver;

impl PolicySolver for FailingSolver {
    fn solve(&self, _model: &MdpModel, _discount: f64) -> Result<PolicyTable, SolverError> {
        Err(SolverError::NotConverged { iterations: 0 })
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "FailingSolver"
    }
}

// ---------------------------------------------------------------------------
// QueuedInput
// ---------------------------------------------------------------------------

/// Scripted input source: pops one snapshot per poll, then reports quit.
pub struct QueuedInput {
    queue: VecDeque<InputSnapshot>,
}

impl QueuedInput {
    /// Queue up snapshots in order.
    #[must_use]
    pub fn new(snapshots: impl IntoIterator<Item = InputSnapshot>) -> Self {
        Self {
            queue: snapshots.into_iter().collect(),
        }
    }
}

impl InputSource for QueuedInput {
    fn poll(&mut self) -> InputSnapshot {
        self.queue.pop_front().unwrap_or(InputSnapshot {
            direction: None,
            quit: true,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gridgym_core::types::{Direction, GridPos};

    #[test]
    fn value_iteration_prefers_the_rewarding_branch() {
        // Two actions from state 0: action 0 loops, action 1 reaches the
        // winning absorbing state 1.
        let model = MdpModel {
            states: vec![GameState::at(GridPos::new(0, 0)), GameState::at(GridPos::new(1, 0))],
            transitions: vec![
                vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                vec![vec![0.0, 1.0], vec![0.0, 1.0]],
            ],
            rewards: vec![0.0, 1.0],
        };
        let table = ValueIterationSolver::default().solve(&model, 0.9).unwrap();
        assert_eq!(table.greedy(0), 1);
    }

    #[test]
    fn failing_solver_reports_non_convergence() {
        let model = MdpModel {
            states: vec![GameState::Dead],
            transitions: vec![vec![vec![1.0]]],
            rewards: vec![0.0],
        };
        let err = FailingSolver.solve(&model, 0.9).unwrap_err();
        assert_eq!(err, SolverError::NotConverged { iterations: 0 });
    }

    #[test]
    fn queued_input_quits_when_exhausted() {
        let mut input = QueuedInput::new([InputSnapshot {
            direction: Some(Direction::Right),
            quit: false,
        }]);
        assert_eq!(input.poll().direction, Some(Direction::Right));
        assert!(input.poll().quit);
    }
}
