//! A minimal in-memory grid engine implementing `SpriteSimulation`.
//!
//! Just enough sprite machinery to exercise the bridge: block-aligned
//! movement, overlap-triggered effect rules, a deferred kill list, and
//! sprite-counter terminations. Not a game engine; a test substrate.

use std::collections::HashMap;

use gridgym_core::error::StateError;
use gridgym_core::traits::SpriteSimulation;
use gridgym_core::types::{
    Direction, EffectKind, EffectRule, Frame, GridPos, PixelPos, SpriteId, SpriteTypeDef,
    SpriteView, Termination,
};

// ---------------------------------------------------------------------------
// TerminationRule
// ---------------------------------------------------------------------------

/// One termination criterion of the fixture engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationRule {
    /// Reserved slot 0; never fires on its own.
    Interrupt,
    /// Ends once live sprites of `type_name` drop to `limit` or fewer.
    SpriteCounter {
        type_name: String,
        limit: usize,
        win: bool,
    },
}

// ---------------------------------------------------------------------------
// FixtureSim
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct FixtureSprite {
    id: SpriteId,
    type_name: String,
    pos: PixelPos,
    prev_pos: Option<PixelPos>,
    orientation: Option<Direction>,
}

/// In-memory grid engine for tests and demos.
#[derive(Debug, Clone)]
pub struct FixtureSim {
    block_size: u32,
    cols: u32,
    rows: u32,
    types: Vec<SpriteTypeDef>,
    sprites: Vec<FixtureSprite>,
    kill_list: Vec<SpriteId>,
    forced: HashMap<SpriteId, Direction>,
    rules: Vec<EffectRule>,
    terminations: Vec<TerminationRule>,
    next_id: u64,
    /// Number of redraw requests received, for visualization tests.
    pub redraw_count: u32,
}

impl FixtureSim {
    /// An empty level. The interrupt criterion is preinstalled at slot 0.
    #[must_use]
    pub fn new(block_size: u32, cols: u32, rows: u32) -> Self {
        Self {
            block_size,
            cols,
            rows,
            types: Vec::new(),
            sprites: Vec::new(),
            kill_list: Vec::new(),
            forced: HashMap::new(),
            rules: Vec::new(),
            terminations: vec![TerminationRule::Interrupt],
            next_id: 0,
            redraw_count: 0,
        }
    }

    /// Register a sprite type.
    pub fn register_type(&mut self, def: SpriteTypeDef) {
        self.types.push(def);
    }

    /// Add a collision rule.
    pub fn add_rule(&mut self, rule: EffectRule) {
        self.rules.push(rule);
    }

    /// Append a termination criterion.
    pub fn add_termination(&mut self, rule: TerminationRule) {
        self.terminations.push(rule);
    }

    /// Spawn a sprite of a registered type at a cell.
    ///
    /// # Panics
    ///
    /// Panics on an unregistered type; level builders only use names they
    /// registered themselves.
    pub fn spawn(&mut self, type_name: &str, cell: GridPos) -> SpriteId {
        self.create_sprite(type_name, cell.to_pixels(self.block_size))
            .unwrap_or_else(|_| panic!("fixture spawned unregistered type '{type_name}'"))
    }

    /// Live (non-pending) sprite count of one type.
    #[must_use]
    pub fn live_count(&self, type_name: &str) -> usize {
        self.sprites
            .iter()
            .filter(|s| s.type_name == type_name && !self.kill_list.contains(&s.id))
            .count()
    }

    /// Whether a live sprite of `type_name` sits on `cell`.
    #[must_use]
    pub fn live_at(&self, type_name: &str, cell: GridPos) -> bool {
        self.sprites.iter().any(|s| {
            s.type_name == type_name
                && !self.kill_list.contains(&s.id)
                && GridPos::from_pixels(s.pos, self.block_size) == cell
        })
    }

    fn type_def(&self, name: &str) -> Option<&SpriteTypeDef> {
        self.types.iter().find(|t| t.name == name)
    }

    fn in_bounds(&self, cell: GridPos) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && (cell.col as u32) < self.cols
            && (cell.row as u32) < self.rows
    }

    fn view(&self, s: &FixtureSprite) -> SpriteView {
        SpriteView {
            id: s.id,
            type_name: s.type_name.clone(),
            pos: s.pos,
            orientation: s.orientation,
        }
    }

    fn resolve_collisions(&mut self) {
        // Effects apply to a snapshot of overlaps, in rule order.
        let mut kills: Vec<SpriteId> = Vec::new();
        let mut stepbacks: Vec<SpriteId> = Vec::new();
        let mut transforms: Vec<(SpriteId, String, PixelPos)> = Vec::new();

        for rule in &self.rules {
            for subject in &self.sprites {
                if subject.type_name != rule.subject || self.kill_list.contains(&subject.id) {
                    continue;
                }
                let overlapping = self.sprites.iter().any(|o| {
                    o.id != subject.id
                        && o.type_name == rule.object
                        && !self.kill_list.contains(&o.id)
                        && o.pos == subject.pos
                });
                if !overlapping {
                    continue;
                }
                match &rule.effect {
                    EffectKind::Remove => kills.push(subject.id),
                    EffectKind::StepBack => stepbacks.push(subject.id),
                    EffectKind::Transform(to) => {
                        transforms.push((subject.id, to.clone(), subject.pos));
                    }
                }
            }
        }

        for id in stepbacks {
            if let Some(s) = self.sprites.iter_mut().find(|s| s.id == id) {
                if let Some(prev) = s.prev_pos.take() {
                    s.pos = prev;
                }
            }
        }
        for id in kills {
            self.defer_kill(id);
        }
        for (id, to, pos) in transforms {
            self.defer_kill(id);
            // Unregistered transform targets are dropped silently; the
            // subject still dies.
            let _ = self.create_sprite(&to, pos);
        }
    }
}

impl SpriteSimulation for FixtureSim {
    fn block_size(&self) -> u32 {
        self.block_size
    }

    fn level_dims(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    fn sprite_types(&self) -> Vec<SpriteTypeDef> {
        self.types.clone()
    }

    fn sprites_of(&self, type_name: &str) -> Vec<SpriteView> {
        self.sprites
            .iter()
            .filter(|s| s.type_name == type_name)
            .map(|s| self.view(s))
            .collect()
    }

    fn avatars(&self) -> Vec<SpriteView> {
        self.sprites
            .iter()
            .filter(|s| {
                self.type_def(&s.type_name)
                    .is_some_and(|t| t.is_avatar)
            })
            .map(|s| self.view(s))
            .collect()
    }

    fn effect_rules(&self) -> Vec<EffectRule> {
        self.rules.clone()
    }

    fn termination_count(&self) -> usize {
        self.terminations.len()
    }

    fn check_termination(&self, index: usize) -> Termination {
        match &self.terminations[index] {
            TerminationRule::Interrupt => Termination::CONTINUE,
            TerminationRule::SpriteCounter {
                type_name,
                limit,
                win,
            } => {
                if self.live_count(type_name) <= *limit {
                    Termination::ended(*win)
                } else {
                    Termination::CONTINUE
                }
            }
        }
    }

    fn create_sprite(&mut self, type_name: &str, pos: PixelPos) -> Result<SpriteId, StateError> {
        let def = self
            .type_def(type_name)
            .filter(|t| !t.is_abstract)
            .ok_or_else(|| StateError::UnknownSpriteType {
                type_name: type_name.to_string(),
            })?;
        let orientation = def.has_orientation.then_some(Direction::Up);
        let id = SpriteId(self.next_id);
        self.next_id += 1;
        self.sprites.push(FixtureSprite {
            id,
            type_name: type_name.to_string(),
            pos,
            prev_pos: None,
            orientation,
        });
        Ok(id)
    }

    fn defer_kill(&mut self, id: SpriteId) {
        if !self.kill_list.contains(&id) {
            self.kill_list.push(id);
        }
    }

    fn is_pending_kill(&self, id: SpriteId) -> bool {
        self.kill_list.contains(&id)
    }

    fn flush_kill_list(&mut self) {
        let kill_list = std::mem::take(&mut self.kill_list);
        self.sprites.retain(|s| !kill_list.contains(&s.id));
    }

    fn set_position(&mut self, id: SpriteId, pos: PixelPos) {
        if let Some(s) = self.sprites.iter_mut().find(|s| s.id == id) {
            s.pos = pos;
        }
    }

    fn set_orientation(&mut self, id: SpriteId, dir: Direction) {
        if let Some(s) = self.sprites.iter_mut().find(|s| s.id == id) {
            s.orientation = Some(dir);
        }
    }

    fn reset_last_move(&mut self, id: SpriteId) {
        if let Some(s) = self.sprites.iter_mut().find(|s| s.id == id) {
            s.prev_pos = None;
        }
    }

    fn force_action(&mut self, id: SpriteId, dir: Direction) {
        self.forced.insert(id, dir);
    }

    fn tick(&mut self, only_avatar: bool) {
        // Last frame's kills leave the board at the start of this one.
        self.flush_kill_list();

        let forced = std::mem::take(&mut self.forced);
        let block = self.block_size;
        let mover_ids: Vec<SpriteId> = self
            .sprites
            .iter()
            .filter(|s| {
                let is_avatar = self
                    .type_def(&s.type_name)
                    .is_some_and(|t| t.is_avatar);
                is_avatar || !only_avatar
            })
            .map(|s| s.id)
            .collect();

        for id in mover_ids {
            let Some(&dir) = forced.get(&id) else {
                continue; // fixture sprites have no controllers of their own
            };
            let oriented = self
                .sprites
                .iter()
                .find(|s| s.id == id)
                .and_then(|s| self.type_def(&s.type_name))
                .is_some_and(|t| t.has_orientation);
            let (cols, rows) = (self.cols, self.rows);
            if let Some(s) = self.sprites.iter_mut().find(|s| s.id == id) {
                if oriented {
                    s.orientation = Some(dir);
                }
                let cell = GridPos::from_pixels(s.pos, block).step(dir);
                let inside = cell.col >= 0
                    && cell.row >= 0
                    && (cell.col as u32) < cols
                    && (cell.row as u32) < rows;
                if inside {
                    s.prev_pos = Some(s.pos);
                    s.pos = cell.to_pixels(block);
                }
            }
        }

        self.resolve_collisions();
    }

    fn redraw(&mut self) {
        self.redraw_count += 1;
    }

    fn capture_frame(&self) -> Option<Frame> {
        // One pixel per cell, painted in sprite-type colors.
        let (w, h) = (self.cols as usize, self.rows as usize);
        let mut data = vec![0_u8; w * h * 4];
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        for s in &self.sprites {
            if self.kill_list.contains(&s.id) {
                continue;
            }
            let cell = GridPos::from_pixels(s.pos, self.block_size);
            if !self.in_bounds(cell) {
                continue;
            }
            let color = self.type_def(&s.type_name).map_or([255, 255, 255], |t| t.color);
            let base = (cell.row as usize * w + cell.col as usize) * 4;
            data[base..base + 3].copy_from_slice(&color);
        }
        Some(Frame {
            width: self.cols,
            height: self.rows,
            data,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
