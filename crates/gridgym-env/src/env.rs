//! The environment wrapper around a sprite engine.
//!
//! [`GameEnvironment`] owns the engine, snapshots its initial state at
//! construction, and exposes the RL-facing surface: reset, state
//! get/set, sensors, single actions, termination, and rollouts.

use std::time::Duration;

use tracing::{debug, trace};

use gridgym_core::config::EnvConfig;
use gridgym_core::error::{GridGymError, StateError};
use gridgym_core::traits::SpriteSimulation;
use gridgym_core::types::{ActionSet, GameState, Observation, Termination};

use crate::handler::StateObsHandler;

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// One recorded step: the state before, the action index, the state after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub before: GameState,
    pub action: usize,
    pub after: GameState,
}

// ---------------------------------------------------------------------------
// GameEnvironment
// ---------------------------------------------------------------------------

/// RL environment over a [`SpriteSimulation`].
///
/// All engine mutation goes through [`set_state`](Self::set_state) and
/// [`perform_action`](Self::perform_action); callers never touch the
/// engine directly once it is wrapped.
pub struct GameEnvironment<S: SpriteSimulation> {
    sim: S,
    handler: StateObsHandler,
    actions: ActionSet,
    config: EnvConfig,
    init_state: GameState,
    obs_dim: usize,
    last_state: GameState,
    transitions: Vec<Transition>,
}

impl<S: SpriteSimulation> GameEnvironment<S> {
    /// Wrap an engine, classify its types, snapshot the initial state,
    /// and reset.
    ///
    /// # Errors
    ///
    /// Any classification failure from
    /// [`StateObsHandler::new`], or a reset failure (an initial state
    /// with no live avatar cannot be restored).
    pub fn new(sim: S, actions: ActionSet, config: EnvConfig) -> Result<Self, GridGymError> {
        let handler = StateObsHandler::new(&sim)?;
        let init_state = handler.get_state(&sim)?;
        // One sensor bank for the avatar cell plus its four neighbors.
        let obs_dim = 5 * handler.num_obs_types();

        let mut env = Self {
            sim,
            handler,
            actions,
            config,
            last_state: init_state.clone(),
            init_state,
            obs_dim,
            transitions: Vec::new(),
        };
        env.reset()?;
        Ok(env)
    }

    /// Restore the initial state, clear the kill list and the recording
    /// buffer.
    ///
    /// # Errors
    ///
    /// Decode failures from the bridge.
    pub fn reset(&mut self) -> Result<(), GridGymError> {
        let init = self.init_state.clone();
        self.handler.set_state(&mut self.sim, &init)?;
        self.sim.flush_kill_list();
        self.last_state = init;
        self.transitions.clear();
        if self.config.visualize {
            self.sim.redraw();
        }
        debug!("environment reset");
        Ok(())
    }

    // -- state --

    /// Encode the current state.
    ///
    /// # Errors
    ///
    /// Encode failures from the bridge.
    pub fn get_state(&self) -> Result<GameState, GridGymError> {
        Ok(self.handler.get_state(&self.sim)?)
    }

    /// Decode `state` into the engine.
    ///
    /// The recording buffer is not rewound; recording a rollout and
    /// teleporting mid-flight do not mix.
    ///
    /// # Errors
    ///
    /// Decode failures from the bridge.
    pub fn set_state(&mut self, state: &GameState) -> Result<(), GridGymError> {
        self.handler.set_state(&mut self.sim, state)
    }

    // -- sensors --

    /// Local occupancy observation for `state` (or the current state).
    ///
    /// The vector covers the avatar cell plus its four rotated neighbors,
    /// interleaved position-fast: sensor for position `p` and background
    /// type `t` lands at `p + t * 5`. Types are ordered reverse-sorted by
    /// name; cells outside the level read all zeros.
    ///
    /// # Errors
    ///
    /// [`StateError::DeadState`] for dead states.
    pub fn get_sensors(&self, state: Option<&GameState>) -> Result<Observation, GridGymError> {
        let current;
        let state = match state {
            Some(s) => s,
            None => {
                current = self.handler.get_state(&self.sim)?;
                &current
            }
        };
        let pos = state.pos().ok_or(StateError::DeadState)?;

        let mut positions = vec![pos];
        positions.extend(self.handler.state_neighbors(state)?);
        let stride = positions.len();

        let mut out = vec![0.0_f32; self.obs_dim];
        for (p, cell) in positions.iter().enumerate() {
            for (t, occupied) in self.handler.raw_sensor(*cell).into_iter().enumerate() {
                if occupied {
                    out[p + t * stride] = 1.0;
                }
            }
        }
        Ok(Observation::new(out))
    }

    // -- actions --

    /// Apply one action.
    ///
    /// `None` is a deliberate no-op (nothing ticks, nothing is
    /// recorded). An out-of-range index fails before the engine is
    /// touched. With `only_avatar`, background sprites hold still.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ActionOutOfRange`] or bridge failures.
    ///
    /// [`ValidationError::ActionOutOfRange`]:
    /// gridgym_core::error::ValidationError::ActionOutOfRange
    pub fn perform_action(
        &mut self,
        action: Option<usize>,
        only_avatar: bool,
    ) -> Result<(), GridGymError> {
        let Some(index) = action else {
            return Ok(());
        };
        let dir = self.actions.get(index)?;

        if let Some(av) = self.handler.avatar(&self.sim)? {
            self.sim.force_action(av.id, dir);
        }
        self.sim.tick(only_avatar);
        trace!(index, ?dir, "performed action");

        if self.config.visualize {
            self.sim.redraw();
            std::thread::sleep(Duration::from_millis(self.config.action_delay_ms));
        }

        if self.config.recording_enabled {
            let after = self.handler.get_state(&self.sim)?;
            let before = std::mem::replace(&mut self.last_state, after.clone());
            self.transitions.push(Transition {
                before,
                action: index,
                after,
            });
        }
        Ok(())
    }

    // -- termination --

    /// Evaluate termination criteria 1.. in order, short-circuiting on
    /// the first that fires. Criterion 0 is the interrupt slot and is
    /// never consulted here.
    #[must_use]
    pub fn is_done(&self) -> Termination {
        for i in 1..self.sim.termination_count() {
            let t = self.sim.check_termination(i);
            if t.ended {
                return t;
            }
        }
        Termination::CONTINUE
    }

    // -- rollouts --

    /// Apply a fixed action sequence, invoking `on_step` after each
    /// applied action. Stops early when a termination criterion fires;
    /// the terminal check runs *before* each action, so nothing is
    /// applied to a finished game.
    ///
    /// # Errors
    ///
    /// Failures from `perform_action`, [`set_state`](Self::set_state), or
    /// the callback, propagated unchanged.
    pub fn roll_out<F>(
        &mut self,
        actions: &[usize],
        init_state: Option<&GameState>,
        mut on_step: F,
    ) -> Result<(), GridGymError>
    where
        F: FnMut(&mut Self) -> Result<(), GridGymError>,
    {
        if let Some(state) = init_state {
            self.set_state(state)?;
        }
        for &action in actions {
            if self.is_done().ended {
                break;
            }
            self.perform_action(Some(action), false)?;
            on_step(self)?;
        }
        Ok(())
    }

    // -- accessors --

    /// The classification tables built at construction.
    #[must_use]
    pub const fn handler(&self) -> &StateObsHandler {
        &self.handler
    }

    /// Read-only view of the wrapped engine.
    #[must_use]
    pub const fn sim(&self) -> &S {
        &self.sim
    }

    /// The action set.
    #[must_use]
    pub const fn actions(&self) -> &ActionSet {
        &self.actions
    }

    /// The config this environment runs with.
    #[must_use]
    pub const fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// The state snapshotted at construction.
    #[must_use]
    pub const fn init_state(&self) -> &GameState {
        &self.init_state
    }

    /// Observation vector length.
    #[must_use]
    pub const fn obs_dim(&self) -> usize {
        self.obs_dim
    }

    /// Recorded transitions since the last reset (empty unless recording
    /// is enabled).
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}
