//! Character skills
//!
//! One skill per character, gated by a real-time cooldown. Instant skills
//! mutate the world on activation; sustained skills only set `active_time`
//! and the rest of the tick reads them through [`SkillState::is_active`].

use glam::Vec3;

use super::config::SkillKind;
use super::effects::spawn_explosion;
use super::spawn::spawn_coin_run;
use super::state::{GameState, Lane, SkillState};
use crate::consts::{DESPAWN_Z, SPAWN_Z};

/// Lane-axis reach of the blast
const BLAST_LANE_TOLERANCE: f32 = 1.5;
/// Depth window converted by alchemy
const ALCHEMY_NEAR_Z: f32 = 10.0;
const ALCHEMY_FAR_Z: f32 = -30.0;

/// Global time scale while slow motion runs
pub const SLOW_MO_SCALE: f32 = 0.5;
/// Forward speed multiplier while dashing
pub const DASH_SPEED_MULTIPLIER: f32 = 2.0;
/// Coin pickup radius while the magnet runs
pub const MAGNET_RADIUS: f32 = 5.0;

/// Fire the selected character's skill. Returns false while on cooldown.
pub fn activate_skill(state: &mut GameState) -> bool {
    if !state.skill.ready() {
        log::debug!("skill rejected: {:.2}s cooldown left", state.skill.cooldown);
        return false;
    }

    let character = state.config.character();
    state.skill = SkillState {
        active: Some(character.skill),
        cooldown: character.skill_cooldown,
        cooldown_max: character.skill_cooldown,
        active_time: character.skill_duration,
    };
    log::debug!("skill {:?} activated by {}", character.skill, character.id);

    apply_skill_effect(character.skill, state);
    true
}

/// Immediate world mutation of a skill. Sustained skills have none.
pub fn apply_skill_effect(kind: SkillKind, state: &mut GameState) {
    match kind {
        SkillKind::Blast => blast(state),
        SkillKind::Alchemy => transmute(state),
        SkillKind::Dash | SkillKind::Clone | SkillKind::Magnet | SkillKind::SlowMo => {}
    }
}

/// Destroy every hazard ahead in the player's lane
fn blast(state: &mut GameState) {
    let px = state.player.pos.x;
    let in_range = |pos: Vec3| {
        pos.z > SPAWN_Z && pos.z < DESPAWN_Z && (pos.x - px).abs() < BLAST_LANE_TOLERANCE
    };

    let mut destroyed = Vec::new();
    state.obstacles.retain(|o| {
        let hit = in_range(o.pos);
        if hit {
            destroyed.push(o.pos);
        }
        !hit
    });
    state.enemies.retain(|e| {
        let hit = in_range(e.pos);
        if hit {
            destroyed.push(e.pos);
        }
        !hit
    });

    for pos in destroyed {
        spawn_explosion(state, pos);
    }
}

/// Turn nearby obstacles into coin runs in their own lane
fn transmute(state: &mut GameState) {
    let mut converted = Vec::new();
    state.obstacles.retain(|o| {
        let hit = o.pos.z > ALCHEMY_FAR_Z && o.pos.z < ALCHEMY_NEAR_Z;
        if hit {
            converted.push(o.pos);
        }
        !hit
    });

    for pos in converted {
        spawn_coin_run(state, Lane::nearest(pos.x), pos.z);
        spawn_explosion(state, pos);
    }
}

/// Count down cooldown and sustained time on real (unscaled) seconds
pub fn update_skill_timers(skill: &mut SkillState, real_dt: f32) {
    skill.cooldown = (skill.cooldown - real_dt).max(0.0);
    skill.active_time = (skill.active_time - real_dt).max(0.0);
}

/// Global simulation time factor
pub fn time_scale(skill: &SkillState) -> f32 {
    if skill.is_active(SkillKind::SlowMo) {
        SLOW_MO_SCALE
    } else {
        1.0
    }
}

/// Forward speed factor contributed by the skill
pub fn speed_factor(skill: &SkillState) -> f32 {
    if skill.is_active(SkillKind::Dash) {
        DASH_SPEED_MULTIPLIER
    } else {
        1.0
    }
}
