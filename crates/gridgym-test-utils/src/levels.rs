//! Ready-made fixture levels used across the workspace's test suites.

use gridgym_core::types::{EffectKind, EffectRule, GridPos, Physics, SpriteTypeDef};

use crate::fixture::{FixtureSim, TerminationRule};

const BLOCK: u32 = 10;

fn sprite_type(name: &str, color: [u8; 3]) -> SpriteTypeDef {
    SpriteTypeDef {
        name: name.to_string(),
        color,
        physics: Physics::Grid,
        is_avatar: false,
        is_abstract: false,
        has_orientation: false,
        is_static: true,
    }
}

fn avatar_type(name: &str, oriented: bool) -> SpriteTypeDef {
    SpriteTypeDef {
        is_avatar: true,
        is_static: false,
        has_orientation: oriented,
        ..sprite_type(name, [255, 255, 255])
    }
}

fn rule(subject: &str, object: &str, effect: EffectKind) -> EffectRule {
    EffectRule {
        subject: subject.to_string(),
        object: object.to_string(),
        effect,
    }
}

fn border_walls(sim: &mut FixtureSim, cols: i32, rows: i32) {
    for col in 0..cols {
        sim.spawn("wall", GridPos::new(col, 0));
        sim.spawn("wall", GridPos::new(col, rows - 1));
    }
    for row in 1..rows - 1 {
        sim.spawn("wall", GridPos::new(0, row));
        sim.spawn("wall", GridPos::new(cols - 1, row));
    }
}

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// A 5x5 walled maze: avatar at (1,1), goal at (3,3).
///
/// Walking onto the goal removes it, which wins the game. Walls push the
/// avatar back.
#[must_use]
pub fn maze_game() -> FixtureSim {
    let mut sim = FixtureSim::new(BLOCK, 5, 5);
    sim.register_type(avatar_type("avatar", false));
    sim.register_type(sprite_type("wall", [90, 90, 90]));
    sim.register_type(sprite_type("goal", [0, 255, 0]));

    border_walls(&mut sim, 5, 5);
    sim.spawn("avatar", GridPos::new(1, 1));
    sim.spawn("goal", GridPos::new(3, 3));

    sim.add_rule(rule("avatar", "wall", EffectKind::StepBack));
    sim.add_rule(rule("goal", "avatar", EffectKind::Remove));

    sim.add_termination(TerminationRule::SpriteCounter {
        type_name: "goal".into(),
        limit: 0,
        win: true,
    });
    sim
}

/// A 6x4 walled level with a mortal key and a door.
///
/// Avatar at (1,1), key at (3,1), door at (4,2). Touching the key picks
/// it up (the key sprite dies); touching the door removes it, which wins.
/// Touching the trap at (1,2) kills the avatar, which loses.
///
/// With `oriented`, the avatar carries a facing direction and states
/// include it.
#[must_use]
pub fn key_door_game(oriented: bool) -> FixtureSim {
    let mut sim = FixtureSim::new(BLOCK, 6, 4);
    sim.register_type(avatar_type("avatar", oriented));
    sim.register_type(sprite_type("wall", [90, 90, 90]));
    sim.register_type(sprite_type("key", [255, 220, 0]));
    sim.register_type(sprite_type("door", [160, 80, 0]));
    sim.register_type(sprite_type("trap", [255, 0, 0]));

    border_walls(&mut sim, 6, 4);
    sim.spawn("avatar", GridPos::new(1, 1));
    sim.spawn("key", GridPos::new(3, 1));
    sim.spawn("door", GridPos::new(4, 2));
    sim.spawn("trap", GridPos::new(1, 2));

    sim.add_rule(rule("avatar", "wall", EffectKind::StepBack));
    sim.add_rule(rule("key", "avatar", EffectKind::Remove));
    sim.add_rule(rule("door", "avatar", EffectKind::Remove));
    sim.add_rule(rule("avatar", "trap", EffectKind::Remove));

    sim.add_termination(TerminationRule::SpriteCounter {
        type_name: "door".into(),
        limit: 0,
        win: true,
    });
    sim.add_termination(TerminationRule::SpriteCounter {
        type_name: "avatar".into(),
        limit: 0,
        win: false,
    });
    sim
}

/// A level with two avatar types: picking up the key transforms `naked`
/// into `withkey`, so states carry a type tag.
#[must_use]
pub fn two_kind_game() -> FixtureSim {
    let mut sim = FixtureSim::new(BLOCK, 6, 4);
    sim.register_type(avatar_type("naked", false));
    sim.register_type(avatar_type("withkey", false));
    sim.register_type(sprite_type("wall", [90, 90, 90]));
    sim.register_type(sprite_type("key", [255, 220, 0]));
    sim.register_type(sprite_type("door", [160, 80, 0]));

    border_walls(&mut sim, 6, 4);
    sim.spawn("naked", GridPos::new(1, 1));
    sim.spawn("key", GridPos::new(3, 1));
    sim.spawn("door", GridPos::new(4, 2));

    sim.add_rule(rule("naked", "wall", EffectKind::StepBack));
    sim.add_rule(rule("withkey", "wall", EffectKind::StepBack));
    sim.add_rule(rule("naked", "key", EffectKind::Transform("withkey".into())));
    sim.add_rule(rule("key", "naked", EffectKind::Remove));
    sim.add_rule(rule("door", "withkey", EffectKind::Remove));

    sim.add_termination(TerminationRule::SpriteCounter {
        type_name: "door".into(),
        limit: 0,
        win: true,
    });
    sim
}

/// A level whose background can move; the bridge must refuse it.
#[must_use]
pub fn moving_background_game() -> FixtureSim {
    let mut sim = FixtureSim::new(BLOCK, 4, 4);
    sim.register_type(avatar_type("avatar", false));
    let mut monster = sprite_type("monster", [200, 0, 200]);
    monster.is_static = false;
    sim.register_type(monster);
    sim.spawn("avatar", GridPos::new(1, 1));
    sim.spawn("monster", GridPos::new(2, 2));
    sim
}

/// A level whose avatar is not block-aligned; the bridge must refuse it.
#[must_use]
pub fn continuous_avatar_game() -> FixtureSim {
    let mut sim = FixtureSim::new(BLOCK, 4, 4);
    let mut avatar = avatar_type("avatar", false);
    avatar.physics = Physics::Continuous;
    sim.register_type(avatar);
    sim.spawn("avatar", GridPos::new(1, 1));
    sim
}

/// A level with two live avatars; the bridge must refuse it.
#[must_use]
pub fn double_avatar_game() -> FixtureSim {
    let mut sim = FixtureSim::new(BLOCK, 4, 4);
    sim.register_type(avatar_type("avatar", false));
    sim.spawn("avatar", GridPos::new(1, 1));
    sim.spawn("avatar", GridPos::new(2, 1));
    sim
}

/// A level with no controllable type at all; the bridge must refuse it.
#[must_use]
pub fn no_avatar_game() -> FixtureSim {
    let mut sim = FixtureSim::new(BLOCK, 4, 4);
    sim.register_type(sprite_type("wall", [90, 90, 90]));
    sim.spawn("wall", GridPos::new(0, 0));
    sim
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gridgym_core::traits::SpriteSimulation;

    #[test]
    fn maze_layout() {
        let sim = maze_game();
        assert!(sim.live_at("avatar", GridPos::new(1, 1)));
        assert!(sim.live_at("goal", GridPos::new(3, 3)));
        assert_eq!(sim.live_count("wall"), 16);
        assert_eq!(sim.termination_count(), 2);
    }

    #[test]
    fn key_door_layout() {
        let sim = key_door_game(false);
        assert!(sim.live_at("key", GridPos::new(3, 1)));
        assert!(sim.live_at("door", GridPos::new(4, 2)));
        assert_eq!(sim.termination_count(), 3);
    }

    #[test]
    fn two_kind_game_has_two_avatar_types() {
        let sim = two_kind_game();
        let avatars: Vec<_> = sim
            .sprite_types()
            .into_iter()
            .filter(|t| t.is_avatar)
            .collect();
        assert_eq!(avatars.len(), 2);
    }
}
