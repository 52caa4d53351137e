//! Win/lose task semantics and the episode runner.

use tracing::{debug, info};

use gridgym_core::error::{AgentError, GridGymError};
use gridgym_core::traits::{Agent, SpriteSimulation};
use gridgym_core::types::GameState;

use crate::env::GameEnvironment;

// ---------------------------------------------------------------------------
// GameTask
// ---------------------------------------------------------------------------

/// Episodic task over a [`GameEnvironment`]: +1 for a winning end, -1 for
/// a losing end, 0 while the game runs; finished when a criterion fires
/// or the step cap is hit.
pub struct GameTask<S: SpriteSimulation> {
    env: GameEnvironment<S>,
    max_steps: u32,
    steps: u32,
    ended: bool,
    won: bool,
}

impl<S: SpriteSimulation> GameTask<S> {
    /// Wrap an environment. The step cap comes from the environment's
    /// config.
    #[must_use]
    pub fn new(env: GameEnvironment<S>) -> Self {
        let max_steps = env.config().max_episode_steps;
        Self {
            env,
            max_steps,
            steps: 0,
            ended: false,
            won: false,
        }
    }

    /// Reset the environment and the episode bookkeeping.
    ///
    /// # Errors
    ///
    /// Environment reset failures.
    pub fn reset(&mut self) -> Result<(), GridGymError> {
        self.env.reset()?;
        self.steps = 0;
        self.ended = false;
        self.won = false;
        Ok(())
    }

    /// Apply one action and count the step (a `None` action still counts,
    /// so an idle agent cannot stall an episode forever).
    ///
    /// # Errors
    ///
    /// Failures from [`GameEnvironment::perform_action`].
    pub fn perform_action(&mut self, action: Option<usize>) -> Result<(), GridGymError> {
        self.env.perform_action(action, false)?;
        self.steps += 1;
        Ok(())
    }

    /// Reward for the step just taken; latches the end flag.
    pub fn reward(&mut self) -> f32 {
        let t = self.env.is_done();
        if t.ended {
            self.ended = true;
            self.won = t.win;
            if t.win { 1.0 } else { -1.0 }
        } else {
            0.0
        }
    }

    /// The episode is over (ended or step cap reached).
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.ended || self.steps >= self.max_steps
    }

    /// The episode ended with a win.
    #[must_use]
    pub const fn won(&self) -> bool {
        self.won
    }

    /// Steps taken this episode.
    #[must_use]
    pub const fn steps(&self) -> u32 {
        self.steps
    }

    /// The wrapped environment.
    #[must_use]
    pub const fn env(&self) -> &GameEnvironment<S> {
        &self.env
    }

    /// Mutable access to the wrapped environment.
    pub fn env_mut(&mut self) -> &mut GameEnvironment<S> {
        &mut self.env
    }

    /// Unwrap back into the environment.
    #[must_use]
    pub fn into_env(self) -> GameEnvironment<S> {
        self.env
    }
}

// ---------------------------------------------------------------------------
// run_episode
// ---------------------------------------------------------------------------

/// Drive one episode with `agent`, returning the accumulated return.
///
/// An [`AgentError::Interrupted`] ends the episode normally; any other
/// error propagates.
///
/// # Errors
///
/// Environment failures or non-interrupt agent failures.
pub fn run_episode<S: SpriteSimulation, A: Agent + ?Sized>(
    task: &mut GameTask<S>,
    agent: &mut A,
) -> Result<f32, GridGymError> {
    task.reset()?;
    let mut total = 0.0;

    while !task.is_finished() {
        let state: GameState = task.env().get_state()?;
        let action = match agent.act(&state) {
            Ok(a) => a,
            Err(AgentError::Interrupted) => {
                debug!(agent = agent.name(), "episode interrupted by agent");
                break;
            }
            Err(e) => return Err(e.into()),
        };
        task.perform_action(action)?;
        total += task.reward();
    }

    info!(
        agent = agent.name(),
        steps = task.steps(),
        won = task.won(),
        total,
        "episode finished"
    );
    Ok(total)
}
