//! The state-observation bridge.
//!
//! [`StateObsHandler`] classifies the engine's sprite types at construction
//! time, then translates between live engine state and hashable
//! [`GameState`] snapshots, and produces local occupancy sensors.
//!
//! The handler holds no reference to the engine; every operation takes the
//! engine explicitly, so ownership stays with the caller.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use gridgym_core::error::{ConfigError, GridGymError, StateError};
use gridgym_core::traits::SpriteSimulation;
use gridgym_core::types::{
    AvatarState, BASEDIRS, Direction, GameState, GridPos, Physics, SpriteView, rotate_left,
};

// ---------------------------------------------------------------------------
// StateObsHandler
// ---------------------------------------------------------------------------

/// Classification tables and encode/decode logic for one game.
///
/// Built once against an engine; afterwards the shape of every
/// [`GameState`] it produces or accepts is fixed:
///
/// - orientation is present iff any controllable type is
///   orientation-bearing,
/// - presence bits are present iff any tracked background type is mortal,
/// - the type tag is present iff several avatar types exist.
#[derive(Debug, Clone)]
pub struct StateObsHandler {
    block_size: u32,
    oriented: bool,
    unique_avatar: bool,
    mortal_avatar: bool,
    /// Concrete controllable type names, sorted.
    avatar_types: Vec<String>,
    /// Background type -> initial cells, keyed in sorted name order.
    obs_types: BTreeMap<String, BTreeSet<GridPos>>,
    /// (mortal type, initial cell), sorted by (name, cell).
    gravepoints: Vec<(String, GridPos)>,
}

impl StateObsHandler {
    /// Classify the engine's sprite types and build the lookup tables.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoAvatarType`] when no controllable type exists,
    /// [`ConfigError::NonGridAvatar`] when a controllable type is not
    /// block-aligned, [`ConfigError::MultipleAvatars`] when more than one
    /// controllable sprite is live, and
    /// [`ConfigError::MovingBackground`] when a tracked background type
    /// can move.
    pub fn new<S: SpriteSimulation>(sim: &S) -> Result<Self, ConfigError> {
        let block_size = sim.block_size();
        let types = sim.sprite_types();

        let mut avatar_types: Vec<String> = types
            .iter()
            .filter(|t| !t.is_abstract && t.is_avatar)
            .map(|t| t.name.clone())
            .collect();
        avatar_types.sort();
        if avatar_types.is_empty() {
            return Err(ConfigError::NoAvatarType);
        }
        for t in &types {
            if !t.is_abstract && t.is_avatar && t.physics != Physics::Grid {
                return Err(ConfigError::NonGridAvatar {
                    type_name: t.name.clone(),
                });
            }
        }

        let live: Vec<SpriteView> = sim
            .avatars()
            .into_iter()
            .filter(|s| !sim.is_pending_kill(s.id))
            .collect();
        if live.len() > 1 {
            return Err(ConfigError::MultipleAvatars { found: live.len() });
        }

        // Any orientation-bearing controllable type fixes the state
        // shape, even while the live avatar is of an unoriented type.
        let oriented = types
            .iter()
            .any(|t| !t.is_abstract && t.is_avatar && t.has_orientation);
        let unique_avatar = avatar_types.len() == 1;

        let mut obs_types: BTreeMap<String, BTreeSet<GridPos>> = BTreeMap::new();
        for t in types.iter().filter(|t| !t.is_abstract && !t.is_avatar) {
            if !t.is_static {
                return Err(ConfigError::MovingBackground {
                    type_name: t.name.clone(),
                });
            }
            let cells = sim
                .sprites_of(&t.name)
                .into_iter()
                .map(|s| GridPos::from_pixels(s.pos, block_size))
                .collect();
            obs_types.insert(t.name.clone(), cells);
        }

        // Removal rules may name the abstract avatar group instead of a
        // concrete type.
        let abstract_avatar_types: Vec<String> = types
            .iter()
            .filter(|t| t.is_abstract && t.is_avatar)
            .map(|t| t.name.clone())
            .collect();

        let mut mortal_avatar = false;
        let mut mortal_types: BTreeSet<String> = BTreeSet::new();
        for rule in sim.effect_rules() {
            if !rule.effect.is_removal() {
                continue;
            }
            if avatar_types
                .iter()
                .chain(&abstract_avatar_types)
                .any(|a| *a == rule.subject)
            {
                mortal_avatar = true;
            }
            if obs_types.contains_key(&rule.subject) {
                mortal_types.insert(rule.subject);
            }
        }

        let mut gravepoints = Vec::new();
        for name in &mortal_types {
            for &cell in &obs_types[name] {
                gravepoints.push((name.clone(), cell));
            }
        }

        debug!(
            avatar_types = avatar_types.len(),
            obs_types = obs_types.len(),
            gravepoints = gravepoints.len(),
            oriented,
            mortal_avatar,
            "classified sprite types"
        );

        Ok(Self {
            block_size,
            oriented,
            unique_avatar,
            mortal_avatar,
            avatar_types,
            obs_types,
            gravepoints,
        })
    }

    // -- accessors --

    /// Whether states carry an orientation.
    #[must_use]
    pub const fn oriented(&self) -> bool {
        self.oriented
    }

    /// Whether a single avatar type exists (states then omit the tag).
    #[must_use]
    pub const fn unique_avatar(&self) -> bool {
        self.unique_avatar
    }

    /// Whether the avatar can be removed by an effect rule.
    #[must_use]
    pub const fn mortal_avatar(&self) -> bool {
        self.mortal_avatar
    }

    /// Whether states carry presence bits.
    #[must_use]
    pub fn tracks_presence(&self) -> bool {
        !self.gravepoints.is_empty()
    }

    /// Tracked background type names, sorted.
    pub fn obs_type_names(&self) -> impl Iterator<Item = &str> {
        self.obs_types.keys().map(String::as_str)
    }

    /// Number of tracked background types.
    #[must_use]
    pub fn num_obs_types(&self) -> usize {
        self.obs_types.len()
    }

    /// The (type, cell) pairs tracked by presence bits, in their fixed
    /// sorted order.
    #[must_use]
    pub fn gravepoints(&self) -> &[(String, GridPos)] {
        &self.gravepoints
    }

    /// Concrete controllable type names, sorted.
    #[must_use]
    pub fn avatar_types(&self) -> &[String] {
        &self.avatar_types
    }

    // -- encode --

    /// The unique live avatar, if any.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MultipleAvatars`] when the engine reports more than
    /// one live controllable sprite.
    pub fn avatar<S: SpriteSimulation>(&self, sim: &S) -> Result<Option<SpriteView>, ConfigError> {
        let mut live: Vec<SpriteView> = sim
            .avatars()
            .into_iter()
            .filter(|s| !sim.is_pending_kill(s.id))
            .collect();
        if live.len() > 1 {
            return Err(ConfigError::MultipleAvatars { found: live.len() });
        }
        Ok(live.pop())
    }

    /// Encode the current engine state.
    ///
    /// Returns the dead sentinel when no live avatar exists.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MultipleAvatars`].
    pub fn get_state<S: SpriteSimulation>(&self, sim: &S) -> Result<GameState, ConfigError> {
        let Some(av) = self.avatar(sim)? else {
            return Ok(GameState::Dead);
        };

        let mut a = AvatarState::at(GridPos::from_pixels(av.pos, self.block_size));
        if self.oriented {
            a.orientation = Some(av.orientation.unwrap_or(Direction::Up));
        }
        if self.tracks_presence() {
            a.presence = Some(self.get_presences(sim));
        }
        if !self.unique_avatar {
            a.kind = Some(av.type_name);
        }
        Ok(GameState::Alive(a))
    }

    /// One presence bit per gravepoint: is a live sprite of that type
    /// still on that cell?
    #[must_use]
    pub fn get_presences<S: SpriteSimulation>(&self, sim: &S) -> Vec<bool> {
        self.gravepoints
            .iter()
            .map(|(name, cell)| {
                sim.sprites_of(name).iter().any(|s| {
                    !sim.is_pending_kill(s.id)
                        && GridPos::from_pixels(s.pos, self.block_size) == *cell
                })
            })
            .collect()
    }

    // -- decode --

    /// Decode `state` back into the engine.
    ///
    /// Idempotent: presence bits are applied by comparing against current
    /// occupancy (pending kills excluded), so re-applying the current
    /// state changes nothing. The avatar is created if missing and
    /// replaced if its concrete type differs from the state's tag.
    ///
    /// # Errors
    ///
    /// [`StateError::DeadState`] for the dead sentinel,
    /// [`StateError::ShapeMismatch`] / [`StateError::PresenceLength`]
    /// when the state does not fit this handler's configuration, and
    /// engine errors from sprite creation.
    pub fn set_state<S: SpriteSimulation>(
        &self,
        sim: &mut S,
        state: &GameState,
    ) -> Result<(), GridGymError> {
        let a = state.as_alive().ok_or(StateError::DeadState)?;
        self.check_shape(a)?;

        let wanted = a
            .kind
            .as_deref()
            .unwrap_or_else(|| self.avatar_types[0].as_str());
        let pixels = a.pos.to_pixels(self.block_size);

        let id = match self.avatar(sim)? {
            Some(av) if av.type_name == wanted => av.id,
            Some(av) => {
                sim.defer_kill(av.id);
                sim.create_sprite(wanted, pixels)?
            }
            None => sim.create_sprite(wanted, pixels)?,
        };

        if let Some(bits) = &a.presence {
            self.set_presences(sim, bits)?;
        }

        sim.set_position(id, pixels);
        if let Some(dir) = a.orientation {
            sim.set_orientation(id, dir);
        }
        sim.reset_last_move(id);
        Ok(())
    }

    /// Apply presence bits: spawn sprites missing from occupied
    /// gravepoints, defer-kill sprites on cleared ones.
    ///
    /// # Errors
    ///
    /// [`StateError::PresenceLength`] or sprite-creation failures.
    pub fn set_presences<S: SpriteSimulation>(
        &self,
        sim: &mut S,
        bits: &[bool],
    ) -> Result<(), GridGymError> {
        if bits.len() != self.gravepoints.len() {
            return Err(StateError::PresenceLength {
                expected: self.gravepoints.len(),
                got: bits.len(),
            }
            .into());
        }
        for ((name, cell), &want) in self.gravepoints.iter().zip(bits) {
            let found = sim.sprites_of(name).into_iter().find(|s| {
                !sim.is_pending_kill(s.id) && GridPos::from_pixels(s.pos, self.block_size) == *cell
            });
            match (found, want) {
                (Some(_), true) | (None, false) => {}
                (Some(s), false) => sim.defer_kill(s.id),
                (None, true) => {
                    sim.create_sprite(name, cell.to_pixels(self.block_size))?;
                }
            }
        }
        Ok(())
    }

    // -- sensors --

    /// Occupancy of one cell against the initial background layout, one
    /// bit per tracked type, in reverse-sorted type-name order.
    #[must_use]
    pub fn raw_sensor(&self, cell: GridPos) -> Vec<bool> {
        self.obs_types
            .iter()
            .rev()
            .map(|(_, cells)| cells.contains(&cell))
            .collect()
    }

    /// The four neighboring cells of `state`, in [`BASEDIRS`] order
    /// rotated so the first entry is the cell the avatar faces.
    ///
    /// Unoriented states use the unrotated order (first entry is the cell
    /// above). Only the position and orientation are read; presence bits
    /// and the type tag are not shape-checked here.
    ///
    /// # Errors
    ///
    /// [`StateError::DeadState`] for the dead sentinel.
    pub fn state_neighbors(&self, state: &GameState) -> Result<Vec<GridPos>, StateError> {
        let a = state.as_alive().ok_or(StateError::DeadState)?;
        let mut dirs = BASEDIRS.to_vec();
        if self.oriented {
            let facing = a.orientation.ok_or_else(|| self.shape_mismatch(a))?;
            dirs = rotate_left(&dirs, facing.index());
        }
        Ok(dirs.into_iter().map(|d| a.pos.step(d)).collect())
    }

    // -- shape checks --

    fn check_shape(&self, a: &AvatarState) -> Result<(), StateError> {
        if a.orientation.is_some() != self.oriented || a.presence.is_some() != self.tracks_presence()
        {
            return Err(self.shape_mismatch(a));
        }
        if let Some(bits) = &a.presence {
            if bits.len() != self.gravepoints.len() {
                return Err(StateError::PresenceLength {
                    expected: self.gravepoints.len(),
                    got: bits.len(),
                });
            }
        }
        if a.kind.is_some() == self.unique_avatar {
            return Err(self.shape_mismatch(a));
        }
        Ok(())
    }

    fn shape_mismatch(&self, a: &AvatarState) -> StateError {
        StateError::ShapeMismatch {
            expected: shape_string(self.oriented, self.tracks_presence(), !self.unique_avatar),
            got: shape_string(a.orientation.is_some(), a.presence.is_some(), a.kind.is_some()),
        }
    }
}

fn shape_string(oriented: bool, presence: bool, kind: bool) -> String {
    let mut parts = vec!["pos"];
    if oriented {
        parts.push("orientation");
    }
    if presence {
        parts.push("presence");
    }
    if kind {
        parts.push("kind");
    }
    format!("({})", parts.join(", "))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_strings_list_fields_in_order() {
        assert_eq!(shape_string(false, false, false), "(pos)");
        assert_eq!(shape_string(true, true, false), "(pos, orientation, presence)");
        assert_eq!(
            shape_string(true, true, true),
            "(pos, orientation, presence, kind)"
        );
    }
}
