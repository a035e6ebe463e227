//! Collision detection and hit resolution
//!
//! Runner-versus-entity overlap tests on a box footprint with a separate
//! vertical span check. Hazards share one resolution policy; pickups are
//! consumed on contact. Every entity also scrolls toward the camera here and
//! is dropped once it passes the camera plane.

use super::config::{SkillKind, coin, enemy, power_up_duration};
use super::effects::{spawn_explosion, spawn_sparkle};
use super::glitch::GlitchEffects;
use super::skill::MAGNET_RADIUS;
use super::state::{GameState, ObstacleKind, PowerUpState, PowerUpType, RunStatus};
use super::tick::GameEvent;
use crate::consts::*;
use crate::{approach, ground_distance};

/// Lane-axis slack added to the player's half width
const HAZARD_LANE_REACH: f32 = 0.5;
/// Depth-axis overlap window for hazards and power-ups
const HAZARD_DEPTH_REACH: f32 = 0.8;
/// Vertical forgiveness at the top and bottom of an obstacle
const EDGE_FORGIVENESS: f32 = 0.1;
/// Fixed vertical window of an enemy (from the ground)
const ENEMY_SPAN: (f32, f32) = (0.2, 1.0);
/// Coin reach at normal and enlarged player scale
const COIN_RADIUS: f32 = 0.8;
const COIN_RADIUS_GIANT: f32 = 1.5;
const COIN_VERTICAL_REACH: f32 = 2.0;
/// Magnet pull window (lane, depth) and rate
const MAGNET_PULL: (f32, f32) = (5.0, 10.0);
const MAGNET_RATE: f32 = 0.2;
const PICKUP_HEIGHT: f32 = 0.5;
const POWER_UP_REACH: f32 = 0.8;

/// The player's collision volume for this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerBody {
    pub half_width: f32,
    pub feet: f32,
    pub head: f32,
}

impl PlayerBody {
    /// Height shrinks while sliding on the ground; everything scales with the glitch size
    pub fn of(state: &GameState, fx: &GlitchEffects) -> Self {
        let player = &state.player;
        let scale = fx.player_scale;
        let height = if player.is_sliding && !player.is_jumping {
            PLAYER_SLIDE_HEIGHT
        } else {
            PLAYER_HEIGHT
        };
        Self {
            half_width: PLAYER_WIDTH * scale / 2.0,
            feet: player.pos.y,
            head: player.pos.y + height * scale,
        }
    }

    /// Whether the body overlaps a vertical span (bottom, top)
    fn spans(&self, bottom: f32, top: f32) -> bool {
        self.feet < top && self.head > bottom
    }
}

/// Depth each hazard class travelled during the current tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sweep {
    pub obstacle: f32,
    pub enemy: f32,
}

impl Sweep {
    pub fn for_speed(speed: f32, dt_factor: f32) -> Self {
        Self {
            obstacle: speed * dt_factor,
            enemy: (speed + enemy::SPEED_OFFSET) * dt_factor,
        }
    }
}

/// Whether the depth interval [z - step, z] passes through the player's window.
/// With a zero step this is the plain `|dz| < reach` test.
fn crosses_player(player_z: f32, z: f32, step: f32) -> bool {
    let z_prev = z - step.max(0.0);
    z_prev < player_z + HAZARD_DEPTH_REACH && z > player_z - HAZARD_DEPTH_REACH
}

/// Box test against an obstacle's footprint and height, swept over `step` of depth
pub fn obstacle_overlaps(state: &GameState, body: &PlayerBody, index: usize, step: f32) -> bool {
    let obstacle = &state.obstacles[index];
    let (dx, _) = ground_distance(state.player.pos, obstacle.pos);
    let (bottom, top) = obstacle.kind.vertical_span();
    dx < HAZARD_LANE_REACH + body.half_width
        && crosses_player(state.player.pos.z, obstacle.pos.z, step)
        && body.spans(bottom + EDGE_FORGIVENESS, top - EDGE_FORGIVENESS)
}

pub fn enemy_overlaps(state: &GameState, body: &PlayerBody, index: usize, step: f32) -> bool {
    let enemy = &state.enemies[index];
    let (dx, _) = ground_distance(state.player.pos, enemy.pos);
    dx < HAZARD_LANE_REACH + body.half_width
        && crosses_player(state.player.pos.z, enemy.pos.z, step)
        && body.spans(ENEMY_SPAN.0, ENEMY_SPAN.1)
}

/// Outcome of a hazard contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Protection soaked the hit; the hazard is consumed
    Absorbed,
    /// The run is over
    Lethal,
}

/// Apply the shared protection policy to a hazard contact.
///
/// Priority: invincible skill, then shield (consumed), then speed (kept),
/// otherwise lethal.
pub fn resolve_hit(state: &mut GameState, events: &mut Vec<GameEvent>) -> HitOutcome {
    if state.skill.grants_immunity() {
        if state.skill.is_active(SkillKind::Clone) {
            state.skill.active_time = 0.0;
        }
        return HitOutcome::Absorbed;
    }

    if state.power_up.is(PowerUpType::Shield) {
        state.power_up.clear();
        events.push(GameEvent::PowerUpChange {
            kind: PowerUpType::None,
            remaining_percent: 0.0,
        });
        return HitOutcome::Absorbed;
    }

    if state.power_up.is(PowerUpType::Speed) {
        return HitOutcome::Absorbed;
    }

    end_run(state, events);
    HitOutcome::Lethal
}

/// Lethal outcome shared by hazard hits and falls
pub fn end_run(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let pos = state.player.pos;
    spawn_explosion(state, pos);
    state.player.visible = false;
    state.run.status = RunStatus::GameOver;
    log::info!(
        "game over at level {} with score {:.0}, {} coins",
        state.run.level,
        state.run.score,
        state.run.coins
    );
    events.push(GameEvent::Collision);
    events.push(GameEvent::RunEnded {
        score: state.run.score,
        coins: state.run.coins,
        level: state.run.level,
    });
}

/// Test every entity against the player once. Returns true if the run ended.
///
/// Hazards are swept over the depth they covered this tick, so a long frame
/// cannot carry one past the player untouched.
pub fn check_collisions(
    state: &mut GameState,
    fx: &GlitchEffects,
    sweep: Sweep,
    dt_factor: f32,
    events: &mut Vec<GameEvent>,
) -> bool {
    let body = PlayerBody::of(state, fx);

    let mut i = 0;
    while i < state.obstacles.len() {
        if obstacle_overlaps(state, &body, i, sweep.obstacle) {
            match resolve_hit(state, events) {
                HitOutcome::Absorbed => {
                    let removed = state.obstacles.remove(i);
                    spawn_explosion(state, removed.pos);
                    continue;
                }
                HitOutcome::Lethal => return true,
            }
        }
        i += 1;
    }

    let mut i = 0;
    while i < state.enemies.len() {
        if enemy_overlaps(state, &body, i, sweep.enemy) {
            match resolve_hit(state, events) {
                HitOutcome::Absorbed => {
                    let removed = state.enemies.remove(i);
                    spawn_explosion(state, removed.pos);
                    continue;
                }
                HitOutcome::Lethal => return true,
            }
        }
        i += 1;
    }

    collect_coins(state, fx, dt_factor);
    collect_power_ups(state, events);
    false
}

fn collect_coins(state: &mut GameState, fx: &GlitchEffects, dt_factor: f32) {
    let magnet = state.skill.is_active(SkillKind::Magnet);
    let radius = if magnet {
        MAGNET_RADIUS
    } else if fx.player_scale > 1.0 {
        COIN_RADIUS_GIANT
    } else {
        COIN_RADIUS
    };
    let player = state.player.pos;

    if magnet {
        for c in state.coins.iter_mut() {
            let (dx, dz) = ground_distance(player, c.pos);
            if dx < MAGNET_PULL.0 && dz < MAGNET_PULL.1 {
                c.pos.x = approach(c.pos.x, player.x, MAGNET_RATE, dt_factor);
                c.pos.z = approach(c.pos.z, player.z, MAGNET_RATE, dt_factor);
            }
        }
    }

    let reward = (coin::VALUE * state.config.difficulty.mods().coin_multiplier).floor() as u64;
    let mut collected = Vec::new();
    state.coins.retain(|c| {
        let (dx, dz) = ground_distance(player, c.pos);
        let hit = (dx * dx + dz * dz).sqrt() < radius
            && (player.y - c.pos.y).abs() < COIN_VERTICAL_REACH;
        if hit {
            collected.push(c.pos);
        }
        !hit
    });

    for pos in collected {
        state.run.coins += reward;
        state.run.score += coin::POINTS as f64;
        spawn_sparkle(state, pos);
    }
}

fn collect_power_ups(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let player = state.player.pos;
    let mut picked = None;
    state.power_ups.retain(|p| {
        let (dx, dz) = ground_distance(player, p.pos);
        let hit = dx < POWER_UP_REACH
            && dz < POWER_UP_REACH
            && (player.y - PICKUP_HEIGHT).abs() < POWER_UP_REACH;
        if hit {
            picked = Some(p.kind);
        }
        !hit
    });

    // A newer pickup replaces whatever is running
    if let Some(kind) = picked {
        let duration = power_up_duration(state.config.upgrades.get(kind));
        state.power_up = PowerUpState {
            kind,
            remaining: duration,
            duration,
        };
        events.push(GameEvent::PowerUpChange {
            kind,
            remaining_percent: 100.0,
        });
    }
}

/// Scroll every entity toward the camera, animate it, and drop what passed the camera plane
pub fn advance_entities(state: &mut GameState, speed: f32, dt_factor: f32) {
    scroll_entities(state, speed, dt_factor);
    despawn_passed(state);
}

/// Move and animate every entity without removing anything
pub fn scroll_entities(state: &mut GameState, speed: f32, dt_factor: f32) {
    let step = speed * dt_factor;
    let t = state.time_secs;

    for o in state.obstacles.iter_mut() {
        o.pos.z += step;
    }
    for e in state.enemies.iter_mut() {
        e.pos.z += (speed + enemy::SPEED_OFFSET) * dt_factor;
        let wave = (t * enemy::WOBBLE_SPEED + e.wobble_phase).sin() * enemy::WOBBLE_AMP;
        e.pos.y = enemy::BASE_Y + (wave * 0.5).abs();
        e.spin += 0.1 * dt_factor;
    }
    for c in state.coins.iter_mut() {
        c.pos.z += step;
        c.spin += 0.05 * dt_factor;
    }
    for p in state.power_ups.iter_mut() {
        p.pos.z += step;
        p.spin += 0.03 * dt_factor;
    }
    for plat in state.platforms.iter_mut() {
        plat.pos.z += step;
        plat.oscillate(t);
    }
    for gap in state.gaps.iter_mut() {
        gap.z_start += step;
        gap.z_end += step;
    }
    state.last_power_up_z += step;
}

/// Drop every entity behind the camera plane
pub fn despawn_passed(state: &mut GameState) {
    state.obstacles.retain(|o| o.pos.z <= DESPAWN_Z);
    state.enemies.retain(|e| e.pos.z <= DESPAWN_Z);
    state.coins.retain(|c| c.pos.z <= DESPAWN_Z);
    state.power_ups.retain(|p| p.pos.z <= DESPAWN_Z);
    state.platforms.retain(|p| p.pos.z <= DESPAWN_Z);
    state.gaps.retain(|g| g.z_start <= DESPAWN_Z);
}

/// Hazard kinds the runner clears by jumping
pub fn is_jumpable(kind: ObstacleKind) -> bool {
    matches!(kind, ObstacleKind::Hurdle | ObstacleKind::Ramp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::config::RunConfig;
    use crate::sim::state::{Coin, Enemy, Obstacle, PowerUp};
    use glam::Vec3;

    fn playing() -> GameState {
        let mut state = GameState::new(1);
        state.run.status = RunStatus::Playing;
        state
    }

    fn collide(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
        check_collisions(state, &GlitchEffects::default(), Sweep::default(), 1.0, events)
    }

    fn place(state: &mut GameState, kind: ObstacleKind, z: f32) {
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            kind,
            pos: Vec3::new(0.0, 0.0, z),
        });
    }

    #[test]
    fn test_shield_absorbs_and_clears() {
        let mut state = playing();
        state.power_up = PowerUpState {
            kind: PowerUpType::Shield,
            remaining: 4.0,
            duration: 5.0,
        };
        place(&mut state, ObstacleKind::Wall, 0.0);

        let mut events = Vec::new();
        let ended = collide(&mut state, &mut events);

        assert!(!ended);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.power_up.kind, PowerUpType::None);
        assert_eq!(state.run.status, RunStatus::Playing);
        assert!(!events.contains(&GameEvent::Collision));
    }

    #[test]
    fn test_unprotected_hit_is_lethal_once() {
        let mut state = playing();
        place(&mut state, ObstacleKind::Wall, 0.2);
        place(&mut state, ObstacleKind::Wall, -0.2);

        let mut events = Vec::new();
        let ended = collide(&mut state, &mut events);

        assert!(ended);
        assert_eq!(state.run.status, RunStatus::GameOver);
        assert!(!state.player.visible);
        let collisions = events.iter().filter(|e| **e == GameEvent::Collision).count();
        assert_eq!(collisions, 1);
        // The hazard that killed the run stays put
        assert_eq!(state.obstacles.len(), 2);
    }

    #[test]
    fn test_speed_hits_through_without_clearing() {
        let mut state = playing();
        state.power_up = PowerUpState {
            kind: PowerUpType::Speed,
            remaining: 4.0,
            duration: 5.0,
        };
        place(&mut state, ObstacleKind::Wall, 0.0);
        let mut events = Vec::new();
        assert!(!collide(&mut state, &mut events));
        assert_eq!(state.power_up.kind, PowerUpType::Speed);
    }

    #[test]
    fn test_clone_absorbs_a_single_hit() {
        let mut state = GameState::with_config(
            1,
            RunConfig {
                character_id: "NARUTO_FAKE".to_string(),
                ..RunConfig::default()
            },
        );
        state.run.status = RunStatus::Playing;
        assert!(crate::sim::skill::activate_skill(&mut state));

        let mut events = Vec::new();
        assert_eq!(resolve_hit(&mut state, &mut events), HitOutcome::Absorbed);
        assert!(!state.skill.grants_immunity());
        assert_eq!(resolve_hit(&mut state, &mut events), HitOutcome::Lethal);
    }

    #[test]
    fn test_jump_clears_hurdle_slide_clears_beam() {
        let mut state = playing();
        let fx = GlitchEffects::default();

        place(&mut state, ObstacleKind::Hurdle, 0.0);
        let body = PlayerBody::of(&state, &fx);
        assert!(obstacle_overlaps(&state, &body, 0, 0.0));
        state.player.pos.y = 0.5;
        let body = PlayerBody::of(&state, &fx);
        assert!(!obstacle_overlaps(&state, &body, 0, 0.0));

        state.obstacles.clear();
        state.player.pos.y = 0.0;
        place(&mut state, ObstacleKind::Beam, 0.0);
        let body = PlayerBody::of(&state, &fx);
        assert!(obstacle_overlaps(&state, &body, 0, 0.0));
        state.player.is_sliding = true;
        let body = PlayerBody::of(&state, &fx);
        assert!(!obstacle_overlaps(&state, &body, 0, 0.0));
    }

    #[test]
    fn test_neighbouring_lane_is_safe() {
        let mut state = playing();
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            pos: Vec3::new(LANE_WIDTH, 0.5, 0.0),
            wobble_phase: 0.0,
            spin: 0.0,
        });
        let body = PlayerBody::of(&state, &GlitchEffects::default());
        assert!(!enemy_overlaps(&state, &body, 0, 0.0));
        state.enemies[0].pos.x = 0.0;
        assert!(enemy_overlaps(&state, &body, 0, 0.0));
    }

    #[test]
    fn test_coin_pickup_rewards() {
        let mut state = playing();
        state.config.difficulty = crate::sim::config::Difficulty::NetRunner;
        let id = state.next_entity_id();
        state.coins.push(Coin {
            id,
            pos: Vec3::new(0.0, 0.5, 0.3),
            spin: 0.0,
        });
        let mut events = Vec::new();
        collide(&mut state, &mut events);
        assert!(state.coins.is_empty());
        assert_eq!(state.run.coins, 25);
        assert_eq!(state.run.score, 50.0);
        assert_eq!(state.effects.len(), 1);
    }

    #[test]
    fn test_magnet_reaches_other_lanes() {
        let mut state = GameState::with_config(
            1,
            RunConfig {
                character_id: "LUFFY_FAKE".to_string(),
                ..RunConfig::default()
            },
        );
        crate::sim::skill::activate_skill(&mut state);
        let id = state.next_entity_id();
        state.coins.push(Coin {
            id,
            pos: Vec3::new(LANE_WIDTH, 0.5, -2.0),
            spin: 0.0,
        });
        let mut events = Vec::new();
        collide(&mut state, &mut events);
        assert!(state.coins.is_empty());
    }

    #[test]
    fn test_power_up_pickup_uses_upgrade_duration() {
        let mut state = playing();
        state.config.upgrades.multiplier = 2;
        let id = state.next_entity_id();
        state.power_ups.push(PowerUp {
            id,
            kind: PowerUpType::Multiplier,
            pos: Vec3::new(0.0, 0.5, 0.0),
            spin: 0.0,
        });
        let mut events = Vec::new();
        collide(&mut state, &mut events);
        assert_eq!(state.power_up.kind, PowerUpType::Multiplier);
        assert_eq!(state.power_up.duration, 7.0);
        assert_eq!(
            events,
            vec![GameEvent::PowerUpChange {
                kind: PowerUpType::Multiplier,
                remaining_percent: 100.0
            }]
        );
    }

    #[test]
    fn test_fast_hazard_is_swept_through_player() {
        let mut state = playing();
        let body = PlayerBody::of(&state, &GlitchEffects::default());

        // Moved from -1.0 to 2.9 in one long frame
        place(&mut state, ObstacleKind::Wall, 2.9);
        assert!(!obstacle_overlaps(&state, &body, 0, 0.0));
        assert!(obstacle_overlaps(&state, &body, 0, 3.9));

        // Still short of the player after the step
        state.obstacles[0].pos.z = -1.0;
        assert!(!obstacle_overlaps(&state, &body, 0, 3.9));

        // Already behind the player before the step
        state.obstacles[0].pos.z = 4.9;
        assert!(!obstacle_overlaps(&state, &body, 0, 3.9));
    }

    #[test]
    fn test_entities_despawn_past_camera() {
        let mut state = playing();
        place(&mut state, ObstacleKind::Wall, 4.5);
        place(&mut state, ObstacleKind::Wall, -20.0);
        advance_entities(&mut state, 1.0, 1.0);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.obstacles[0].pos.z, -19.0);
    }
}
