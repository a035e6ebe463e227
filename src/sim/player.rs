//! Player input and physics
//!
//! Continuous motion integrates against the normalized frame factor;
//! the slide timer runs on real seconds.

use super::effects::spawn_landing_dust;
use super::glitch::GlitchEffects;
use super::state::{Action, GameState, Platform};
use crate::approach;
use crate::consts::*;

/// Resolve a movement action. Returns true if the player state changed.
///
/// SKILL is handled by the skill system and is rejected here.
pub fn apply_action(state: &mut GameState, action: Action, fx: &GlitchEffects) -> bool {
    let action = match action {
        Action::Left if fx.invert_controls => Action::Right,
        Action::Right if fx.invert_controls => Action::Left,
        other => other,
    };

    let player = &mut state.player;
    match action {
        Action::Left => {
            let lane = player.lane.left();
            let changed = lane != player.lane;
            player.lane = lane;
            changed
        }
        Action::Right => {
            let lane = player.lane.right();
            let changed = lane != player.lane;
            player.lane = lane;
            changed
        }
        Action::Jump => {
            if player.is_jumping || player.is_sliding {
                return false;
            }
            player.vel_y = JUMP_FORCE * fx.jump_scale;
            player.is_jumping = true;
            true
        }
        Action::Slide => {
            if player.is_jumping {
                player.vel_y = FAST_FALL_VELOCITY;
                true
            } else if !player.is_sliding {
                player.is_sliding = true;
                player.slide_timer = SLIDE_DURATION;
                true
            } else {
                false
            }
        }
        Action::Skill => false,
    }
}

/// Ground height under the player: a platform top, the track, or the void over a gap
pub fn terrain_height(state: &GameState) -> f32 {
    let p = state.player.pos;
    let mut height = 0.0_f32;
    let mut on_platform = false;

    for plat in &state.platforms {
        let overlaps = p.x + PLAYER_FOOT_HALF > plat.pos.x - Platform::HALF_SIZE
            && p.x - PLAYER_FOOT_HALF < plat.pos.x + Platform::HALF_SIZE
            && p.z + PLAYER_FOOT_HALF > plat.pos.z - Platform::HALF_SIZE
            && p.z - PLAYER_FOOT_HALF < plat.pos.z + Platform::HALF_SIZE;
        // Only catch the player from above (small tolerance for bobbing platforms)
        if overlaps && p.y >= plat.top() - 0.2 {
            height = height.max(plat.top());
            on_platform = true;
        }
    }

    if !on_platform && state.gaps.iter().any(|g| g.contains(p.z)) {
        return VOID_HEIGHT;
    }
    height
}

/// Outcome of one physics step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhysicsStep {
    /// Resting on terrain after this step
    pub landed: bool,
    /// Fell below the fatal depth
    pub fell: bool,
}

/// Integrate player motion for one tick
pub fn update_player(
    state: &mut GameState,
    fx: &GlitchEffects,
    dt_factor: f32,
    real_dt: f32,
) -> PhysicsStep {
    let terrain = terrain_height(state);
    let player = &mut state.player;
    let mut step = PhysicsStep::default();

    // Lane drift (never a teleport)
    let target_x = player.target_x();
    player.pos.x = approach(player.pos.x, target_x, LANE_LERP, dt_factor);
    player.tilt = (player.pos.x - target_x) * -0.1;

    // Squash toward glitch size, half height while sliding
    let base = fx.player_scale;
    let slide_squash = if player.is_sliding { 0.5 } else { 1.0 };
    player.scale.x = approach(player.scale.x, base, 0.1, dt_factor);
    player.scale.z = approach(player.scale.z, base, 0.1, dt_factor);
    player.scale.y = approach(player.scale.y, base * slide_squash, 0.1, dt_factor);

    if player.is_sliding {
        player.slide_timer -= real_dt;
        if player.slide_timer <= 0.0 {
            player.slide_timer = 0.0;
            player.is_sliding = false;
        }
    }

    let airborne = player.pos.y > terrain;
    player.vel_y += GRAVITY * fx.gravity_scale * dt_factor;
    player.pos.y += player.vel_y * dt_factor;

    let mut hard_landing = None;
    if player.pos.y <= terrain && player.vel_y <= 0.0 && terrain > VOID_HEIGHT {
        if airborne && player.vel_y < HARD_LANDING_VELOCITY {
            hard_landing = Some(player.pos);
        }
        player.pos.y = terrain;
        player.vel_y = 0.0;
        player.is_jumping = false;
        step.landed = true;
    }

    step.fell = player.pos.y < FALL_DEATH_Y;

    if let Some(pos) = hard_landing {
        spawn_landing_dust(state, pos);
        state.camera_shake = LANDING_SHAKE;
    }
    step
}
