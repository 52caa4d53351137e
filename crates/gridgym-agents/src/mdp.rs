//! Contract types for external MDP tooling.
//!
//! Converting a game into a tabular MDP and solving it are jobs for
//! pluggable collaborators: anything implementing [`MdpConverter`] and
//! [`PolicySolver`]. This module fixes the data shapes they exchange.

use rand::Rng;

use gridgym_core::error::SolverError;
use gridgym_core::traits::SpriteSimulation;
use gridgym_core::types::GameState;
use gridgym_env::env::GameEnvironment;

// ---------------------------------------------------------------------------
// MdpModel
// ---------------------------------------------------------------------------

/// A tabular MDP over enumerated game states.
#[derive(Debug, Clone, PartialEq)]
pub struct MdpModel {
    /// Enumerated states; row/column indices below refer into this list.
    pub states: Vec<GameState>,
    /// `transitions[a][s][s2]` = probability of `s -> s2` under action `a`.
    pub transitions: Vec<Vec<Vec<f64>>>,
    /// Per-state reward.
    pub rewards: Vec<f64>,
}

impl MdpModel {
    /// Number of states.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Number of actions.
    #[must_use]
    pub fn num_actions(&self) -> usize {
        self.transitions.len()
    }

    /// Check the tables are mutually consistent.
    ///
    /// # Errors
    ///
    /// [`SolverError::EmptyModel`] or [`SolverError::BadShape`].
    pub fn validate(&self) -> Result<(), SolverError> {
        let n = self.states.len();
        if n == 0 {
            return Err(SolverError::EmptyModel);
        }
        if self.transitions.is_empty() {
            return Err(SolverError::BadShape {
                detail: "no actions".into(),
            });
        }
        for (a, table) in self.transitions.iter().enumerate() {
            if table.len() != n {
                return Err(SolverError::BadShape {
                    detail: format!("action {a} has {} rows, expected {n}", table.len()),
                });
            }
            for (s, row) in table.iter().enumerate() {
                if row.len() != n {
                    return Err(SolverError::BadShape {
                        detail: format!(
                            "action {a}, state {s}: row has {} entries, expected {n}",
                            row.len()
                        ),
                    });
                }
            }
        }
        if self.rewards.len() != n {
            return Err(SolverError::BadShape {
                detail: format!("{} rewards for {n} states", self.rewards.len()),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PolicyTable
// ---------------------------------------------------------------------------

/// A stochastic policy: one weight row per state, one column per action.
///
/// Rows need not be normalized; sampling divides by the row sum.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyTable {
    rows: Vec<Vec<f64>>,
}

impl PolicyTable {
    /// Build a table from per-state action weights.
    ///
    /// # Errors
    ///
    /// [`SolverError::EmptyModel`] for an empty table, or
    /// [`SolverError::BadShape`] for ragged rows, negative weights, or a
    /// row with no mass.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, SolverError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(SolverError::EmptyModel);
        }
        let width = rows[0].len();
        for (s, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(SolverError::BadShape {
                    detail: format!("row {s} has {} entries, expected {width}", row.len()),
                });
            }
            if row.iter().any(|&w| w < 0.0 || !w.is_finite()) {
                return Err(SolverError::BadShape {
                    detail: format!("row {s} has a negative or non-finite weight"),
                });
            }
            if row.iter().sum::<f64>() <= 0.0 {
                return Err(SolverError::BadShape {
                    detail: format!("row {s} has no probability mass"),
                });
            }
        }
        Ok(Self { rows })
    }

    /// Number of states.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    /// Number of actions.
    #[must_use]
    pub fn num_actions(&self) -> usize {
        self.rows[0].len()
    }

    /// Draw an action for `state_index` by cumulative-sum sampling.
    ///
    /// # Panics
    ///
    /// Panics when `state_index` is out of range.
    pub fn sample<R: Rng>(&self, state_index: usize, rng: &mut R) -> usize {
        let row = &self.rows[state_index];
        let total: f64 = row.iter().sum();
        let mut r = rng.gen::<f64>() * total;
        for (i, &w) in row.iter().enumerate() {
            r -= w;
            if r <= 0.0 {
                return i;
            }
        }
        row.len() - 1
    }

    /// The highest-weight action for `state_index`.
    ///
    /// # Panics
    ///
    /// Panics when `state_index` is out of range.
    #[must_use]
    pub fn greedy(&self, state_index: usize) -> usize {
        let row = &self.rows[state_index];
        let mut best = 0;
        for (i, &w) in row.iter().enumerate() {
            if w > row[best] {
                best = i;
            }
        }
        best
    }
}

// ---------------------------------------------------------------------------
// Converter / solver seams
// ---------------------------------------------------------------------------

/// Turns a game environment into a tabular MDP (typically by exhaustive
/// state-space exploration).
pub trait MdpConverter<S: SpriteSimulation> {
    /// Enumerate states and build the transition/reward tables.
    ///
    /// # Errors
    ///
    /// Any [`SolverError`] the converter runs into.
    fn convert(&mut self, env: &mut GameEnvironment<S>) -> Result<MdpModel, SolverError>;

    /// Converter name, for logs.
    fn name(&self) -> &str;
}

/// Computes a policy for a tabular MDP.
pub trait PolicySolver {
    /// Solve `model` under `discount`.
    ///
    /// # Errors
    ///
    /// [`SolverError::NotConverged`] and friends. Never returns a
    /// fallback policy.
    fn solve(&self, model: &MdpModel, discount: f64) -> Result<PolicyTable, SolverError>;

    /// Solver name, for logs.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gridgym_core::types::GridPos;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn two_state_model() -> MdpModel {
        MdpModel {
            states: vec![GameState::at(GridPos::new(0, 0)), GameState::Dead],
            transitions: vec![
                vec![vec![0.0, 1.0], vec![0.0, 1.0]],
                vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            ],
            rewards: vec![0.0, -1.0],
        }
    }

    // -- MdpModel --

    #[test]
    fn valid_model_passes() {
        assert!(two_state_model().validate().is_ok());
        assert_eq!(two_state_model().num_states(), 2);
        assert_eq!(two_state_model().num_actions(), 2);
    }

    #[test]
    fn empty_model_rejected() {
        let model = MdpModel {
            states: vec![],
            transitions: vec![],
            rewards: vec![],
        };
        assert_eq!(model.validate(), Err(SolverError::EmptyModel));
    }

    #[test]
    fn ragged_transitions_rejected() {
        let mut model = two_state_model();
        model.transitions[1][0].pop();
        assert!(matches!(
            model.validate(),
            Err(SolverError::BadShape { .. })
        ));
    }

    #[test]
    fn reward_length_checked() {
        let mut model = two_state_model();
        model.rewards.push(0.0);
        assert!(matches!(
            model.validate(),
            Err(SolverError::BadShape { .. })
        ));
    }

    // -- PolicyTable --

    #[test]
    fn deterministic_row_always_sampled() {
        let table = PolicyTable::new(vec![vec![0.0, 1.0, 0.0]]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..50 {
            assert_eq!(table.sample(0, &mut rng), 1);
        }
    }

    #[test]
    fn sampling_respects_weights_roughly() {
        let table = PolicyTable::new(vec![vec![3.0, 1.0]]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let hits = (0..1000).filter(|_| table.sample(0, &mut rng) == 0).count();
        assert!((600..900).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn greedy_picks_heaviest() {
        let table = PolicyTable::new(vec![vec![0.1, 0.7, 0.2], vec![0.9, 0.05, 0.05]]).unwrap();
        assert_eq!(table.greedy(0), 1);
        assert_eq!(table.greedy(1), 0);
    }

    #[test]
    fn bad_tables_rejected() {
        assert_eq!(PolicyTable::new(vec![]), Err(SolverError::EmptyModel));
        assert!(matches!(
            PolicyTable::new(vec![vec![1.0, 0.0], vec![1.0]]),
            Err(SolverError::BadShape { .. })
        ));
        assert!(matches!(
            PolicyTable::new(vec![vec![-1.0, 2.0]]),
            Err(SolverError::BadShape { .. })
        ));
        assert!(matches!(
            PolicyTable::new(vec![vec![0.0, 0.0]]),
            Err(SolverError::BadShape { .. })
        ));
    }
}
