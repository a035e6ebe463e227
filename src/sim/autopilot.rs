//! Demo-mode controller
//!
//! Reads the world the way a player would and proposes at most one action
//! per tick. Good enough for attract mode, not meant to be unbeatable.

use super::collision::is_jumpable;
use super::glitch::GlitchEffects;
use super::state::{Action, GameState, Lane, ObstacleKind};

/// Look-ahead window, in reference frames of travel
const DODGE_FRAMES: f32 = 14.0;
const JUMP_FRAMES: (f32, f32) = (5.0, 9.0);
const SLIDE_FRAMES: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Threat {
    Wall,
    Beam,
    Low,
}

/// Frames until something at depth `z` reaches the player
fn frames_away(z: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return f32::INFINITY;
    }
    -z / speed
}

/// Nearest threat ahead in `lane`, with its distance in frames
fn threat_in_lane(state: &GameState, lane: Lane) -> Option<(Threat, f32)> {
    let speed = state.current_speed;
    let x = lane.x();

    let obstacles = state
        .obstacles
        .iter()
        .filter(|o| (o.pos.x - x).abs() < 0.5)
        .map(|o| {
            let threat = match o.kind {
                ObstacleKind::Wall => Threat::Wall,
                ObstacleKind::Beam => Threat::Beam,
                kind if is_jumpable(kind) => Threat::Low,
                _ => Threat::Wall,
            };
            (threat, frames_away(o.pos.z, speed))
        });
    let enemies = state
        .enemies
        .iter()
        .filter(|e| (e.pos.x - x).abs() < 0.5)
        .map(|e| (Threat::Low, frames_away(e.pos.z, speed)));
    // Jump off the lip of a gap so the arc carries onto a platform
    let gaps = state
        .gaps
        .iter()
        .map(|g| (Threat::Low, frames_away(g.z_end, speed)));

    obstacles
        .chain(enemies)
        .chain(gaps)
        .filter(|(_, frames)| *frames >= -1.0)
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

fn lane_is_clear(state: &GameState, lane: Lane) -> bool {
    !matches!(threat_in_lane(state, lane), Some((Threat::Wall, f)) if f < DODGE_FRAMES * 1.5)
}

/// Propose the next action, if any
pub fn suggest_action(state: &GameState) -> Option<Action> {
    let player = &state.player;
    if player.is_jumping {
        return None;
    }

    let (threat, frames) = threat_in_lane(state, player.lane)?;
    let action = match threat {
        Threat::Wall if frames < DODGE_FRAMES => {
            if state.skill.ready() {
                Action::Skill
            } else {
                let left = player.lane.left();
                let right = player.lane.right();
                if left != player.lane && lane_is_clear(state, left) {
                    Action::Left
                } else if right != player.lane && lane_is_clear(state, right) {
                    Action::Right
                } else {
                    return None;
                }
            }
        }
        Threat::Beam if frames < SLIDE_FRAMES && !player.is_sliding => Action::Slide,
        Threat::Low if frames >= JUMP_FRAMES.0 && frames <= JUMP_FRAMES.1 => {
            if player.is_sliding {
                return None;
            }
            Action::Jump
        }
        _ => return None,
    };

    // Controls may be mirrored by a glitch
    let fx = GlitchEffects::from_glitches(&state.run.glitches);
    Some(match action {
        Action::Left if fx.invert_controls => Action::Right,
        Action::Right if fx.invert_controls => Action::Left,
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::glitch::GlitchType;
    use crate::sim::state::Obstacle;
    use glam::Vec3;

    fn with_obstacle(kind: ObstacleKind, z: f32) -> GameState {
        let mut state = GameState::new(1);
        state.current_speed = 1.0;
        // Skill on cooldown so walls are dodged by hand
        state.skill.cooldown = 10.0;
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            kind,
            pos: Vec3::new(0.0, 0.0, z),
        });
        state
    }

    #[test]
    fn test_clear_track_does_nothing() {
        let mut state = GameState::new(1);
        state.current_speed = 1.0;
        assert_eq!(suggest_action(&state), None);
    }

    #[test]
    fn test_dodges_wall() {
        let state = with_obstacle(ObstacleKind::Wall, -10.0);
        assert_eq!(suggest_action(&state), Some(Action::Left));
    }

    #[test]
    fn test_dodge_respects_inverted_controls() {
        let mut state = with_obstacle(ObstacleKind::Wall, -10.0);
        state.run.glitches.push(GlitchType::AustraliaMode);
        assert_eq!(suggest_action(&state), Some(Action::Right));
    }

    #[test]
    fn test_slides_under_beam_and_jumps_hurdle() {
        let state = with_obstacle(ObstacleKind::Beam, -8.0);
        assert_eq!(suggest_action(&state), Some(Action::Slide));

        let state = with_obstacle(ObstacleKind::Hurdle, -7.0);
        assert_eq!(suggest_action(&state), Some(Action::Jump));
        let state = with_obstacle(ObstacleKind::Hurdle, -20.0);
        assert_eq!(suggest_action(&state), None);
    }
}
