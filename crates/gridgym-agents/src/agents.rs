//! Baseline agents: random, scripted, and interactive.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use gridgym_core::error::AgentError;
use gridgym_core::traits::Agent;
use gridgym_core::types::{ActionSet, Direction, GameState};

// ---------------------------------------------------------------------------
// RandomAgent
// ---------------------------------------------------------------------------

/// Picks a uniformly random action every step.
pub struct RandomAgent {
    num_actions: usize,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    /// A random agent over `num_actions` actions, deterministic per seed.
    #[must_use]
    pub fn new(num_actions: usize, seed: u64) -> Self {
        Self {
            num_actions,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn act(&mut self, _state: &GameState) -> Result<Option<usize>, AgentError> {
        if self.num_actions == 0 {
            return Ok(None);
        }
        Ok(Some(self.rng.gen_range(0..self.num_actions)))
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "RandomAgent"
    }
}

// ---------------------------------------------------------------------------
// ScriptedAgent
// ---------------------------------------------------------------------------

/// Replays a fixed action script, cycling when it runs out.
pub struct ScriptedAgent {
    script: Vec<Option<usize>>,
    cursor: usize,
}

impl ScriptedAgent {
    /// An agent replaying `script` in order, wrapping around.
    #[must_use]
    pub const fn new(script: Vec<Option<usize>>) -> Self {
        Self { script, cursor: 0 }
    }

    /// Convenience for a script of plain action indices.
    #[must_use]
    pub fn from_indices(indices: &[usize]) -> Self {
        Self::new(indices.iter().map(|&i| Some(i)).collect())
    }
}

impl Agent for ScriptedAgent {
    fn act(&mut self, _state: &GameState) -> Result<Option<usize>, AgentError> {
        if self.script.is_empty() {
            return Ok(None);
        }
        let action = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        Ok(action)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ScriptedAgent"
    }
}

// ---------------------------------------------------------------------------
// InteractiveAgent
// ---------------------------------------------------------------------------

/// One poll of an input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    /// Direction currently pressed, if any.
    pub direction: Option<Direction>,
    /// The user asked to stop.
    pub quit: bool,
}

/// Source of user input. Keyboard handlers, gamepads, and test queues all
/// reduce to this.
pub trait InputSource {
    /// Current input state. Called once per decision.
    fn poll(&mut self) -> InputSnapshot;
}

/// Forwards user input as actions; a quit request surfaces as
/// [`AgentError::Interrupted`], which episode runners treat as a normal
/// end.
pub struct InteractiveAgent<I: InputSource> {
    input: I,
    actions: ActionSet,
}

impl<I: InputSource> InteractiveAgent<I> {
    /// An interactive agent translating `input` through `actions`.
    #[must_use]
    pub const fn new(input: I, actions: ActionSet) -> Self {
        Self { input, actions }
    }
}

impl<I: InputSource> Agent for InteractiveAgent<I> {
    fn act(&mut self, _state: &GameState) -> Result<Option<usize>, AgentError> {
        let snap = self.input.poll();
        if snap.quit {
            debug!("interactive agent received quit");
            return Err(AgentError::Interrupted);
        }
        // A pressed direction outside the action set is ignored rather
        // than guessed at.
        Ok(snap.direction.and_then(|d| self.actions.position(d)))
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "InteractiveAgent"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gridgym_core::types::GridPos;

    fn some_state() -> GameState {
        GameState::at(GridPos::new(0, 0))
    }

    // -- RandomAgent --

    #[test]
    fn random_agent_stays_in_range() {
        let mut agent = RandomAgent::new(4, 7);
        for _ in 0..100 {
            let a = agent.act(&some_state()).unwrap().unwrap();
            assert!(a < 4);
        }
    }

    #[test]
    fn random_agent_deterministic_per_seed() {
        let mut a = RandomAgent::new(4, 42);
        let mut b = RandomAgent::new(4, 42);
        for _ in 0..20 {
            assert_eq!(
                a.act(&some_state()).unwrap(),
                b.act(&some_state()).unwrap()
            );
        }
    }

    #[test]
    fn random_agent_without_actions_idles() {
        let mut agent = RandomAgent::new(0, 1);
        assert_eq!(agent.act(&some_state()).unwrap(), None);
    }

    // -- ScriptedAgent --

    #[test]
    fn scripted_agent_cycles() {
        let mut agent = ScriptedAgent::from_indices(&[0, 3]);
        assert_eq!(agent.act(&some_state()).unwrap(), Some(0));
        assert_eq!(agent.act(&some_state()).unwrap(), Some(3));
        assert_eq!(agent.act(&some_state()).unwrap(), Some(0));
    }

    #[test]
    fn scripted_agent_can_idle() {
        let mut agent = ScriptedAgent::new(vec![None, Some(1)]);
        assert_eq!(agent.act(&some_state()).unwrap(), None);
        assert_eq!(agent.act(&some_state()).unwrap(), Some(1));
    }

    #[test]
    fn empty_script_idles_forever() {
        let mut agent = ScriptedAgent::new(Vec::new());
        assert_eq!(agent.act(&some_state()).unwrap(), None);
    }

    // -- InteractiveAgent --

    struct OneShot(InputSnapshot);

    impl InputSource for OneShot {
        fn poll(&mut self) -> InputSnapshot {
            self.0
        }
    }

    #[test]
    fn interactive_maps_direction_to_index() {
        let snap = InputSnapshot {
            direction: Some(Direction::Down),
            quit: false,
        };
        let mut agent = InteractiveAgent::new(OneShot(snap), ActionSet::default());
        assert_eq!(agent.act(&some_state()).unwrap(), Some(2));
    }

    #[test]
    fn interactive_idle_without_input() {
        let mut agent = InteractiveAgent::new(OneShot(InputSnapshot::default()), ActionSet::default());
        assert_eq!(agent.act(&some_state()).unwrap(), None);
    }

    #[test]
    fn interactive_quit_is_an_interrupt() {
        let snap = InputSnapshot {
            direction: None,
            quit: true,
        };
        let mut agent = InteractiveAgent::new(OneShot(snap), ActionSet::default());
        assert_eq!(agent.act(&some_state()).unwrap_err(), AgentError::Interrupted);
    }

    #[test]
    fn interactive_ignores_directions_outside_action_set() {
        let snap = InputSnapshot {
            direction: Some(Direction::Up),
            quit: false,
        };
        let actions = ActionSet::new(vec![Direction::Left, Direction::Right]);
        let mut agent = InteractiveAgent::new(OneShot(snap), actions);
        assert_eq!(agent.act(&some_state()).unwrap(), None);
    }
}
