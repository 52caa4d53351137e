//! Core traits: the engine seam and the agent interface.
//!
//! [`SpriteSimulation`] is the contract a grid sprite engine must satisfy
//! for the observation bridge to drive it. The bridge never reaches into
//! engine internals; everything goes through this trait.

use crate::error::{AgentError, StateError};
use crate::types::{
    Direction, EffectRule, Frame, GameState, PixelPos, SpriteId, SpriteTypeDef, SpriteView,
    Termination,
};

// ---------------------------------------------------------------------------
// SpriteSimulation
// ---------------------------------------------------------------------------

/// A tile/grid sprite engine, as seen by the observation bridge.
///
/// Query methods are cheap snapshots; mutation methods are applied
/// immediately except for kills, which are deferred onto a kill list the
/// engine flushes on its own schedule (or when asked via
/// [`flush_kill_list`](Self::flush_kill_list)).
pub trait SpriteSimulation {
    /// Cell edge length in pixels. Grid-physics sprites sit on multiples
    /// of this.
    fn block_size(&self) -> u32;

    /// Level extent in cells (columns, rows).
    fn level_dims(&self) -> (u32, u32);

    /// All sprite type definitions, abstract grouping nodes included.
    fn sprite_types(&self) -> Vec<SpriteTypeDef>;

    /// Live sprites of one concrete type, in stable order.
    ///
    /// Sprites already on the kill list are still reported here; use
    /// [`is_pending_kill`](Self::is_pending_kill) to exclude them.
    fn sprites_of(&self, type_name: &str) -> Vec<SpriteView>;

    /// Live controllable sprites (kill-listed ones included).
    fn avatars(&self) -> Vec<SpriteView>;

    /// The collision rule table.
    fn effect_rules(&self) -> Vec<EffectRule>;

    /// Number of termination criteria. Index 0 is reserved for the
    /// user-interrupt criterion.
    fn termination_count(&self) -> usize;

    /// Evaluate the criterion at `index`.
    fn check_termination(&self, index: usize) -> Termination;

    /// Spawn a sprite of `type_name` at a pixel position.
    ///
    /// # Errors
    ///
    /// [`StateError::UnknownSpriteType`] if the engine has no such type.
    fn create_sprite(&mut self, type_name: &str, pos: PixelPos) -> Result<SpriteId, StateError>;

    /// Put a sprite on the kill list. It stays queryable until the list
    /// is flushed.
    fn defer_kill(&mut self, id: SpriteId);

    /// Whether a sprite is on the kill list.
    fn is_pending_kill(&self, id: SpriteId) -> bool;

    /// Drop every kill-listed sprite now.
    fn flush_kill_list(&mut self);

    /// Teleport a sprite.
    fn set_position(&mut self, id: SpriteId, pos: PixelPos);

    /// Set a sprite's facing direction.
    fn set_orientation(&mut self, id: SpriteId, dir: Direction);

    /// Clear the sprite's last-move bookkeeping so a decoded state does
    /// not inherit stale motion (step-back effects would otherwise undo a
    /// move that never happened).
    fn reset_last_move(&mut self, id: SpriteId);

    /// Queue a direction the sprite must take on the next tick, replacing
    /// whatever its own controller would choose. Consumed by exactly one
    /// tick.
    fn force_action(&mut self, id: SpriteId, dir: Direction);

    /// Advance the engine one step. With `only_avatar`, non-controllable
    /// sprites hold still (used for surgical state transitions).
    fn tick(&mut self, only_avatar: bool);

    /// Repaint, if the engine renders at all.
    fn redraw(&mut self) {}

    /// Capture the current frame, if the engine renders at all.
    fn capture_frame(&self) -> Option<Frame> {
        None
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Something that picks actions from game states.
pub trait Agent {
    /// Choose an action index for `state`. `None` means "do nothing this
    /// step".
    ///
    /// # Errors
    ///
    /// [`AgentError::Interrupted`] when the user asked to stop (a normal
    /// end condition), or [`AgentError::Solver`] when a policy lookup
    /// fails.
    fn act(&mut self, state: &GameState) -> Result<Option<usize>, AgentError>;

    /// Human-readable agent name, for logs.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridPos;

    struct NoopAgent;

    impl Agent for NoopAgent {
        fn act(&mut self, _state: &GameState) -> Result<Option<usize>, AgentError> {
            Ok(None)
        }

        #[allow(clippy::unnecessary_literal_bound)]
        fn name(&self) -> &str {
            "NoopAgent"
        }
    }

    #[test]
    fn agent_trait_is_object_safe() {
        let mut agent: Box<dyn Agent> = Box::new(NoopAgent);
        let choice = agent.act(&GameState::at(GridPos::new(0, 0))).unwrap();
        assert_eq!(choice, None);
        assert_eq!(agent.name(), "NoopAgent");
    }
}
