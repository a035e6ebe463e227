//! Spawn director
//!
//! Places hazards, coins, power-ups and platform gaps at the spawn horizon
//! once per distance quantum. A spawn that cannot find a free slot is
//! dropped for this quantum; nothing retries.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use rand::seq::SliceRandom;

use super::config::{coin, enemy, power_up};
use super::state::{
    Coin, Enemy, GameState, Gap, Lane, Obstacle, ObstacleKind, Platform, PlatformMotion, PowerUp,
    PowerUpType,
};
use crate::consts::*;

/// Depth window around a candidate that counts as the same slot
const OCCUPIED_DEPTH: f32 = 2.0;
/// Lane-axis tolerance for the occupancy test
const OCCUPIED_LANE: f32 = 0.5;
/// Chance that a hazard decision becomes a platform gap instead
const PLATFORM_SEQUENCE_CHANCE: f32 = 0.10;
const GAP_LENGTH: f32 = 20.0;
const PLATFORMS_PER_GAP: usize = 3;

/// Whether a lane/depth slot already holds an obstacle or lies inside a gap
pub fn is_occupied(state: &GameState, lane: Lane, z: f32) -> bool {
    let x = lane.x();
    let blocked = state
        .obstacles
        .iter()
        .any(|o| (o.pos.z - z).abs() < OCCUPIED_DEPTH && (o.pos.x - x).abs() < OCCUPIED_LANE);
    blocked || state.gaps.iter().any(|g| g.contains(z))
}

fn random_lane(state: &mut GameState) -> Lane {
    Lane::ALL[state.rng.random_range(0..Lane::ALL.len())]
}

/// Accumulate scrolled distance and run one spawn decision per quantum
pub fn advance_spawn_meter(state: &mut GameState, speed: f32, dt_factor: f32, density: f32) {
    state.spawn_meter += speed * dt_factor;
    if state.spawn_meter > SPAWN_DISTANCE {
        state.spawn_meter = 0.0;
        spawn_decision(state, density, SPAWN_Z);
    }
}

/// Hazard with probability `density`, else coins, else maybe a power-up
pub fn spawn_decision(state: &mut GameState, density: f32, z: f32) {
    if state.rng.random::<f32>() < density {
        if state.rng.random::<f32>() < enemy::SPAWN_RATIO {
            spawn_enemy(state, z);
        } else {
            spawn_obstacle(state, z);
        }
    } else if state.rng.random::<f32>() < coin::SPAWN_CHANCE {
        spawn_coins(state, z);
    } else if state.rng.random::<f32>() < power_up::SPAWN_CHANCE {
        spawn_power_up(state, z);
    }
}

/// Weighted hazard pick; rolls under the platform chance divert to a gap
fn obstacle_kind_for_roll(roll: f32) -> ObstacleKind {
    if roll < 0.25 {
        ObstacleKind::Hurdle
    } else if roll < 0.45 {
        ObstacleKind::Beam
    } else if roll < 0.55 {
        ObstacleKind::Ramp
    } else {
        ObstacleKind::Wall
    }
}

/// Returns true if something (obstacle or platform gap) was placed
pub fn spawn_obstacle(state: &mut GameState, z: f32) -> bool {
    let lane = random_lane(state);
    if is_occupied(state, lane, z) {
        log::debug!("obstacle dropped: {:?} lane occupied at z={}", lane, z);
        return false;
    }

    let roll = state.rng.random::<f32>();
    if roll < PLATFORM_SEQUENCE_CHANCE {
        spawn_platform_sequence(state, z);
        return true;
    }

    let id = state.next_entity_id();
    state.obstacles.push(Obstacle {
        id,
        kind: obstacle_kind_for_roll(roll),
        pos: Vec3::new(lane.x(), 0.0, z),
    });
    true
}

pub fn spawn_enemy(state: &mut GameState, z: f32) -> bool {
    let lane = random_lane(state);
    if is_occupied(state, lane, z) {
        log::debug!("enemy dropped: {:?} lane occupied at z={}", lane, z);
        return false;
    }

    let id = state.next_entity_id();
    let wobble_phase = state.rng.random::<f32>() * 100.0;
    state.enemies.push(Enemy {
        id,
        pos: Vec3::new(lane.x(), enemy::BASE_Y, z),
        wobble_phase,
        spin: 0.0,
    });
    true
}

/// Reserve a gap starting at `z_start` and bridge it with moving platforms
pub fn spawn_platform_sequence(state: &mut GameState, z_start: f32) {
    let gap_id = state.next_entity_id();
    state.gaps.push(Gap {
        id: gap_id,
        z_start,
        z_end: z_start + GAP_LENGTH,
    });

    let spacing = GAP_LENGTH / (PLATFORMS_PER_GAP + 1) as f32;
    for i in 1..=PLATFORMS_PER_GAP {
        let horizontal = state.rng.random::<f32>() > 0.5;
        let (motion, amplitude) = if horizontal {
            (PlatformMotion::Horizontal, 3.5)
        } else {
            (PlatformMotion::Vertical, 0.8)
        };
        let speed = 2.0 + state.rng.random::<f32>() * 2.0;
        let phase = state.rng.random::<f32>() * TAU;
        let id = state.next_entity_id();
        state.platforms.push(Platform {
            id,
            pos: Vec3::new(0.0, 0.0, z_start + i as f32 * spacing),
            base_y: 0.0,
            motion,
            amplitude,
            phase,
            speed,
        });
    }
}

/// A run of coins in a random free lane
pub fn spawn_coins(state: &mut GameState, z: f32) -> bool {
    let lane = random_lane(state);
    if is_occupied(state, lane, z) {
        log::debug!("coins dropped: {:?} lane occupied at z={}", lane, z);
        return false;
    }
    spawn_coin_run(state, lane, z);
    true
}

/// A fixed-size line of coins receding from `z` in `lane`
pub fn spawn_coin_run(state: &mut GameState, lane: Lane, z: f32) {
    for i in 0..coin::CLUSTER_SIZE {
        let id = state.next_entity_id();
        state.coins.push(Coin {
            id,
            pos: Vec3::new(lane.x(), 0.5, z - i as f32 * coin::CLUSTER_SPACING),
            spin: 0.0,
        });
    }
}

/// Power-up in the first free lane (random order), at least
/// `MIN_SEPARATION` away from the previous one
pub fn spawn_power_up(state: &mut GameState, z: f32) -> bool {
    if (z - state.last_power_up_z).abs() < power_up::MIN_SEPARATION {
        log::debug!("power-up dropped: too close to previous at z={}", state.last_power_up_z);
        return false;
    }

    let kind = PowerUpType::SPAWNABLE[state.rng.random_range(0..PowerUpType::SPAWNABLE.len())];

    let mut lanes = Lane::ALL;
    lanes.shuffle(&mut state.rng);
    let Some(lane) = lanes.into_iter().find(|lane| !is_occupied(state, *lane, z)) else {
        log::debug!("power-up dropped: all lanes blocked at z={}", z);
        return false;
    };

    let id = state.next_entity_id();
    state.power_ups.push(PowerUp {
        id,
        kind,
        pos: Vec3::new(lane.x(), 0.5, z),
        spin: 0.0,
    });
    state.last_power_up_z = z;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_at(state: &mut GameState, lane: Lane, z: f32) {
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Wall,
            pos: Vec3::new(lane.x(), 0.0, z),
        });
    }

    #[test]
    fn test_occupancy_by_obstacle_and_gap() {
        let mut state = GameState::new(1);
        wall_at(&mut state, Lane::Left, -50.0);
        assert!(is_occupied(&state, Lane::Left, -49.0));
        assert!(!is_occupied(&state, Lane::Center, -50.0));
        assert!(!is_occupied(&state, Lane::Left, -45.0));

        state.gaps.push(Gap {
            id: 99,
            z_start: -30.0,
            z_end: -10.0,
        });
        assert!(is_occupied(&state, Lane::Right, -20.0));
    }

    #[test]
    fn test_power_up_anti_clustering() {
        let mut state = GameState::new(42);
        let z = -50.0;
        assert!(spawn_power_up(&mut state, z));
        assert!(!spawn_power_up(&mut state, z + 40.0));
        assert!(!spawn_power_up(&mut state, z + 90.0));
        assert_eq!(state.power_ups.len(), 1);
        assert_eq!(state.last_power_up_z, z);
    }

    #[test]
    fn test_power_up_dropped_when_all_lanes_blocked() {
        let mut state = GameState::new(3);
        for lane in Lane::ALL {
            wall_at(&mut state, lane, -50.0);
        }
        assert!(!spawn_power_up(&mut state, -50.0));
        assert!(state.power_ups.is_empty());
        assert_eq!(state.last_power_up_z, crate::sim::state::NO_POWER_UP_Z);
    }

    #[test]
    fn test_coin_run_layout() {
        let mut state = GameState::new(5);
        spawn_coin_run(&mut state, Lane::Right, -50.0);
        assert_eq!(state.coins.len(), coin::CLUSTER_SIZE);
        for (i, c) in state.coins.iter().enumerate() {
            assert_eq!(c.pos.x, Lane::Right.x());
            assert!((c.pos.z - (-50.0 - i as f32 * coin::CLUSTER_SPACING)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_platform_sequence_fills_gap() {
        let mut state = GameState::new(9);
        spawn_platform_sequence(&mut state, -50.0);
        assert_eq!(state.gaps.len(), 1);
        assert_eq!(state.platforms.len(), PLATFORMS_PER_GAP);
        let gap = &state.gaps[0];
        for p in &state.platforms {
            assert!(gap.contains(p.pos.z));
        }
    }

    #[test]
    fn test_nothing_spawns_inside_gap() {
        let mut state = GameState::new(11);
        spawn_platform_sequence(&mut state, -50.0);
        for _ in 0..20 {
            assert!(!spawn_enemy(&mut state, -45.0));
            assert!(!spawn_coins(&mut state, -45.0));
        }
        assert!(state.enemies.is_empty());
        assert!(state.coins.is_empty());
    }

    #[test]
    fn test_hazard_weights() {
        assert_eq!(obstacle_kind_for_roll(0.12), ObstacleKind::Hurdle);
        assert_eq!(obstacle_kind_for_roll(0.30), ObstacleKind::Beam);
        assert_eq!(obstacle_kind_for_roll(0.50), ObstacleKind::Ramp);
        assert_eq!(obstacle_kind_for_roll(0.90), ObstacleKind::Wall);
    }

    #[test]
    fn test_spawn_meter_quantum() {
        let mut state = GameState::new(13);
        // Density 1: every decision is a hazard attempt
        advance_spawn_meter(&mut state, 5.0, 1.0, 1.0);
        assert_eq!(state.entity_count(), 0);
        advance_spawn_meter(&mut state, 5.0, 1.0, 1.0);
        assert_eq!(state.entity_count(), 0);
        advance_spawn_meter(&mut state, 5.0, 1.0, 1.0);
        assert_eq!(state.spawn_meter, 0.0);
        assert!(state.entity_count() > 0);
    }
}
