//! Core data types shared across all gridgym crates.
//!
//! Positions come in two flavors: [`PixelPos`] is what the engine stores,
//! [`GridPos`] is what states and sensors use. Conversion goes through the
//! engine's block size. [`GameState`] is the hashable snapshot exchanged
//! with MDP tooling; [`Observation`] is the flat sensor vector.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// GridPos / PixelPos
// ---------------------------------------------------------------------------

/// A cell coordinate on the level grid (column, row).
///
/// Row 0 is the top of the level; rows grow downward, matching screen
/// coordinates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct GridPos {
    /// Column index (x / block size).
    pub col: i32,
    /// Row index (y / block size).
    pub row: i32,
}

impl GridPos {
    /// Create a grid position.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The neighboring cell one step in `dir`.
    #[must_use]
    pub const fn step(self, dir: Direction) -> Self {
        let (dc, dr) = dir.delta();
        Self {
            col: self.col + dc,
            row: self.row + dr,
        }
    }

    /// Convert a pixel position to the cell containing it.
    #[must_use]
    pub const fn from_pixels(pos: PixelPos, block_size: u32) -> Self {
        Self {
            col: pos.x / block_size as i32,
            row: pos.y / block_size as i32,
        }
    }

    /// The pixel position of this cell's top-left corner.
    #[must_use]
    pub const fn to_pixels(self, block_size: u32) -> PixelPos {
        PixelPos {
            x: self.col * block_size as i32,
            y: self.row * block_size as i32,
        }
    }
}

/// A pixel coordinate in the engine's screen space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    /// Create a pixel position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the four grid movement directions.
///
/// The canonical cyclic order is [`BASEDIRS`]: up, left, down, right.
/// Action indices, neighbor enumeration, and orientation rotation all use
/// this order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

/// Canonical direction order. Index into this array is the action index of
/// the default action set and the rotation offset for oriented sensors.
pub const BASEDIRS: [Direction; 4] = [
    Direction::Up,
    Direction::Left,
    Direction::Down,
    Direction::Right,
];

impl Direction {
    /// Unit step in screen coordinates (columns grow right, rows grow down).
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Left => (-1, 0),
            Self::Down => (0, 1),
            Self::Right => (1, 0),
        }
    }

    /// Position of this direction in [`BASEDIRS`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Left => 1,
            Self::Down => 2,
            Self::Right => 3,
        }
    }
}

/// Rotate a slice left by `n`: element `n` becomes element 0.
///
/// `n` larger than the slice length wraps around.
#[must_use]
pub fn rotate_left<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    if items.is_empty() {
        return Vec::new();
    }
    let n = n % items.len();
    let mut out = Vec::with_capacity(items.len());
    out.extend_from_slice(&items[n..]);
    out.extend_from_slice(&items[..n]);
    out
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Snapshot of everything the observation bridge tracks about the game.
///
/// Hashable and totally ordered so it can key policy tables and be
/// enumerated by MDP converters. The shape of the alive record (whether
/// orientation, presence bits, and the type tag are present) is fixed per
/// handler configuration; see `StateObsHandler`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameState {
    /// Sentinel for "no live avatar". Collapses all post-death detail.
    Dead,
    /// A live avatar with its tracked surroundings.
    Alive(AvatarState),
}

impl GameState {
    /// Shorthand for an alive state at `pos` with no optional fields.
    #[must_use]
    pub const fn at(pos: GridPos) -> Self {
        Self::Alive(AvatarState {
            pos,
            orientation: None,
            presence: None,
            kind: None,
        })
    }

    /// True for the dead sentinel.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        matches!(self, Self::Dead)
    }

    /// Avatar position, if alive.
    #[must_use]
    pub const fn pos(&self) -> Option<GridPos> {
        match self {
            Self::Dead => None,
            Self::Alive(a) => Some(a.pos),
        }
    }

    /// The alive record, if any.
    #[must_use]
    pub const fn as_alive(&self) -> Option<&AvatarState> {
        match self {
            Self::Dead => None,
            Self::Alive(a) => Some(a),
        }
    }
}

/// The alive payload of a [`GameState`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AvatarState {
    /// Avatar cell.
    pub pos: GridPos,
    /// Facing direction; present iff the avatar type is oriented.
    pub orientation: Option<Direction>,
    /// One bit per gravepoint; present iff any background type is mortal.
    pub presence: Option<Vec<bool>>,
    /// Concrete avatar type name; present iff several avatar types exist.
    pub kind: Option<String>,
}

impl AvatarState {
    /// Start building a state at `pos`.
    #[must_use]
    pub const fn at(pos: GridPos) -> Self {
        Self {
            pos,
            orientation: None,
            presence: None,
            kind: None,
        }
    }

    /// Attach an orientation.
    #[must_use]
    pub fn oriented(mut self, dir: Direction) -> Self {
        self.orientation = Some(dir);
        self
    }

    /// Attach presence bits.
    #[must_use]
    pub fn with_presence(mut self, bits: Vec<bool>) -> Self {
        self.presence = Some(bits);
        self
    }

    /// Attach a concrete type tag.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

impl From<AvatarState> for GameState {
    fn from(a: AvatarState) -> Self {
        Self::Alive(a)
    }
}

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// A flat observation vector produced by the sensor bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Observation(Vec<f32>);

impl Observation {
    /// Create an observation from raw values.
    #[must_use]
    pub const fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Create a zero-filled observation of the given dimension.
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self(vec![0.0; dim])
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the vector holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the raw values.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Mutably borrow the raw values.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.0
    }

    /// Consume into the raw vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for Observation {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

impl std::ops::Index<usize> for Observation {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

// ---------------------------------------------------------------------------
// ActionSet
// ---------------------------------------------------------------------------

/// Ordered list of directions an agent may choose from.
///
/// Action indices are positions in this list. Indexing past the end is a
/// [`ValidationError::ActionOutOfRange`], never a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSet {
    dirs: Vec<Direction>,
}

impl Default for ActionSet {
    fn default() -> Self {
        Self {
            dirs: BASEDIRS.to_vec(),
        }
    }
}

impl ActionSet {
    /// An action set over an explicit direction list.
    #[must_use]
    pub const fn new(dirs: Vec<Direction>) -> Self {
        Self { dirs }
    }

    /// The direction at `index`.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ActionOutOfRange`] when `index >= len`.
    pub fn get(&self, index: usize) -> Result<Direction, ValidationError> {
        self.dirs
            .get(index)
            .copied()
            .ok_or(ValidationError::ActionOutOfRange {
                index,
                len: self.dirs.len(),
            })
    }

    /// Index of `dir` in this set, if present.
    #[must_use]
    pub fn position(&self, dir: Direction) -> Option<usize> {
        self.dirs.iter().position(|&d| d == dir)
    }

    /// Number of actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    /// True when no actions are available.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Borrow the directions in order.
    #[must_use]
    pub fn as_slice(&self) -> &[Direction] {
        &self.dirs
    }
}

// ---------------------------------------------------------------------------
// Sprite types and views
// ---------------------------------------------------------------------------

/// How a sprite type moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Physics {
    /// Block-aligned movement; positions are always cell corners.
    Grid,
    /// Free pixel movement.
    Continuous,
}

/// Definition of one sprite type, as reported by the engine.
///
/// Capability tags replace class-hierarchy inspection: the bridge never
/// asks what a type *is*, only what it *can do*.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteTypeDef {
    /// Unique type name.
    pub name: String,
    /// Display color (RGB).
    pub color: [u8; 3],
    /// Movement model.
    pub physics: Physics,
    /// Player-controllable.
    pub is_avatar: bool,
    /// Non-leaf grouping node in the type tree; never instantiated.
    pub is_abstract: bool,
    /// Carries a facing direction.
    pub has_orientation: bool,
    /// Never moves on its own.
    pub is_static: bool,
}

/// Stable identity of one live sprite inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteId(pub u64);

/// Read-only view of one live sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteView {
    pub id: SpriteId,
    pub type_name: String,
    pub pos: PixelPos,
    pub orientation: Option<Direction>,
}

// ---------------------------------------------------------------------------
// Effect rules
// ---------------------------------------------------------------------------

/// What happens to the subject when an effect rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// The subject is removed from the game.
    Remove,
    /// The subject reverts its last move.
    StepBack,
    /// The subject is replaced by an instance of the named type.
    Transform(String),
}

impl EffectKind {
    /// True when the rule removes the subject instance (removal or
    /// replacement both end the instance's life).
    #[must_use]
    pub const fn is_removal(&self) -> bool {
        matches!(self, Self::Remove | Self::Transform(_))
    }
}

/// One collision rule: when a `subject` sprite touches an `object` sprite,
/// `effect` applies to the subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRule {
    pub subject: String,
    pub object: String,
    pub effect: EffectKind,
}

// ---------------------------------------------------------------------------
// Termination
// ---------------------------------------------------------------------------

/// Outcome of evaluating one termination criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Termination {
    /// The criterion fired.
    pub ended: bool,
    /// Ending counts as a win (meaningless when `ended` is false).
    pub win: bool,
}

impl Termination {
    /// The game goes on.
    pub const CONTINUE: Self = Self {
        ended: false,
        win: false,
    };

    /// An ended outcome with the given winner flag.
    #[must_use]
    pub const fn ended(win: bool) -> Self {
        Self { ended: true, win }
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// A raw RGBA frame captured from the engine, for rollout export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA bytes, row-major.
    pub data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // -- positions --

    #[test]
    fn grid_pixel_roundtrip() {
        let g = GridPos::new(3, 7);
        let p = g.to_pixels(10);
        assert_eq!(p, PixelPos::new(30, 70));
        assert_eq!(GridPos::from_pixels(p, 10), g);
    }

    #[test]
    fn pixel_to_grid_truncates_within_cell() {
        assert_eq!(GridPos::from_pixels(PixelPos::new(39, 70), 10), GridPos::new(3, 7));
    }

    #[test]
    fn step_follows_screen_coordinates() {
        let g = GridPos::new(5, 5);
        assert_eq!(g.step(Direction::Up), GridPos::new(5, 4));
        assert_eq!(g.step(Direction::Left), GridPos::new(4, 5));
        assert_eq!(g.step(Direction::Down), GridPos::new(5, 6));
        assert_eq!(g.step(Direction::Right), GridPos::new(6, 5));
    }

    // -- directions --

    #[test]
    fn basedirs_order_matches_index() {
        for (i, dir) in BASEDIRS.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }

    #[test]
    fn direction_ordering_follows_basedirs() {
        let mut dirs = vec![
            Direction::Right,
            Direction::Up,
            Direction::Down,
            Direction::Left,
        ];
        dirs.sort();
        assert_eq!(dirs, BASEDIRS.to_vec());
    }

    #[test]
    fn states_are_totally_ordered() {
        let a = GameState::at(GridPos::new(0, 0));
        let b: GameState = AvatarState::at(GridPos::new(0, 0))
            .oriented(Direction::Up)
            .into();
        assert!(GameState::Dead < a);
        assert_ne!(a.cmp(&b), std::cmp::Ordering::Equal);
    }

    #[test]
    fn deltas_are_unit_steps() {
        for dir in BASEDIRS {
            let (dc, dr) = dir.delta();
            assert_eq!(dc.abs() + dr.abs(), 1);
        }
    }

    #[test]
    fn rotate_left_shifts_head() {
        let v = [1, 2, 3, 4];
        assert_eq!(rotate_left(&v, 0), vec![1, 2, 3, 4]);
        assert_eq!(rotate_left(&v, 1), vec![2, 3, 4, 1]);
        assert_eq!(rotate_left(&v, 3), vec![4, 1, 2, 3]);
        assert_eq!(rotate_left(&v, 4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn rotate_left_empty() {
        let v: [u8; 0] = [];
        assert!(rotate_left(&v, 2).is_empty());
    }

    // -- game state --

    #[test]
    fn dead_sentinel_has_no_position() {
        assert!(GameState::Dead.is_dead());
        assert_eq!(GameState::Dead.pos(), None);
    }

    #[test]
    fn alive_state_builder() {
        let s: GameState = AvatarState::at(GridPos::new(1, 2))
            .oriented(Direction::Right)
            .with_presence(vec![true, false])
            .with_kind("withkey")
            .into();
        let a = s.as_alive().unwrap();
        assert_eq!(a.pos, GridPos::new(1, 2));
        assert_eq!(a.orientation, Some(Direction::Right));
        assert_eq!(a.presence.as_deref(), Some(&[true, false][..]));
        assert_eq!(a.kind.as_deref(), Some("withkey"));
    }

    #[test]
    fn states_are_hashable_keys() {
        let mut set = HashSet::new();
        set.insert(GameState::at(GridPos::new(0, 0)));
        set.insert(GameState::at(GridPos::new(0, 0)));
        set.insert(GameState::Dead);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn state_serde_roundtrip() {
        let s: GameState = AvatarState::at(GridPos::new(4, 1))
            .with_presence(vec![true])
            .into();
        let json = serde_json::to_string(&s).unwrap();
        let s2: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(s, s2);
    }

    // -- observation --

    #[test]
    fn observation_zeros() {
        let obs = Observation::zeros(6);
        assert_eq!(obs.len(), 6);
        assert!(obs.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn observation_index() {
        let obs = Observation::new(vec![0.0, 1.0, 0.0]);
        assert!((obs[1] - 1.0).abs() < f32::EPSILON);
    }

    // -- action set --

    #[test]
    fn default_action_set_is_basedirs() {
        let actions = ActionSet::default();
        assert_eq!(actions.as_slice(), &BASEDIRS);
        assert_eq!(actions.get(2).unwrap(), Direction::Down);
    }

    #[test]
    fn out_of_range_action_is_an_error() {
        let actions = ActionSet::default();
        let err = actions.get(4).unwrap_err();
        assert_eq!(err, ValidationError::ActionOutOfRange { index: 4, len: 4 });
    }

    #[test]
    fn position_finds_direction() {
        let actions = ActionSet::default();
        assert_eq!(actions.position(Direction::Left), Some(1));
    }

    // -- effects / termination --

    #[test]
    fn removal_effects() {
        assert!(EffectKind::Remove.is_removal());
        assert!(EffectKind::Transform("nokey".into()).is_removal());
        assert!(!EffectKind::StepBack.is_removal());
    }

    #[test]
    fn termination_constants() {
        assert!(!Termination::CONTINUE.ended);
        assert!(Termination::ended(true).win);
        assert!(!Termination::ended(false).win);
    }

    // -- Send + Sync --

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn core_types_are_send_sync() {
        assert_send_sync::<GameState>();
        assert_send_sync::<Observation>();
        assert_send_sync::<ActionSet>();
        assert_send_sync::<SpriteTypeDef>();
        assert_send_sync::<EffectRule>();
    }
}
