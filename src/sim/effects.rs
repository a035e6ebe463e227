//! Transient visual effects
//!
//! Explosions, coin sparkles, landing dust and the runner's trail. None of
//! this affects gameplay, so particle jitter comes from a tick hash rather
//! than the run RNG.

use glam::Vec3;

use super::state::{Effect, EffectKind, GameState, MAX_EFFECTS, MAX_TRAIL, Particle, TrailSegment};
use crate::consts::TRAIL_INTERVAL;

/// Cheap per-particle pseudo-random triple in [0, 1)
fn jitter(tick: u64, salt: u32) -> (f32, f32, f32) {
    let hash = (tick as u32)
        .wrapping_mul(2654435761)
        .wrapping_add(salt.wrapping_mul(7919));
    let a = (hash % 1000) as f32 / 1000.0;
    let b = ((hash >> 10) % 1000) as f32 / 1000.0;
    let c = ((hash >> 20) % 1000) as f32 / 1000.0;
    (a, b, c)
}

fn push_effect(state: &mut GameState, effect: Effect) {
    if state.effects.len() >= MAX_EFFECTS {
        state.effects.remove(0);
    }
    state.effects.push(effect);
}

fn burst(
    state: &GameState,
    count: u32,
    salt: u32,
    spread: Vec3,
    lift: (f32, f32),
    size: (f32, f32),
) -> Vec<Particle> {
    (0..count)
        .map(|i| {
            let (a, b, c) = jitter(state.time_ticks, salt + i * 3);
            Particle {
                offset: Vec3::ZERO,
                vel: Vec3::new(
                    (a - 0.5) * spread.x,
                    lift.0 + b * lift.1,
                    (c - 0.5) * spread.z + spread.y,
                ),
                size: size.0 + a * size.1,
            }
        })
        .collect()
}

/// Debris burst for destroyed hazards and the lethal hit
pub fn spawn_explosion(state: &mut GameState, pos: Vec3) {
    let particles = burst(state, 20, 11, Vec3::new(0.8, 0.5, 0.5), (0.2, 0.8), (0.15, 0.2));
    push_effect(
        state,
        Effect {
            kind: EffectKind::Explosion,
            origin: pos,
            life: 1.0,
            particles,
        },
    );
}

/// Glitter when a coin is collected
pub fn spawn_sparkle(state: &mut GameState, pos: Vec3) {
    let particles = burst(state, 10, 101, Vec3::new(0.4, 0.0, 0.4), (0.2, 0.6), (0.1, 0.1));
    push_effect(
        state,
        Effect {
            kind: EffectKind::Sparkle,
            origin: pos,
            life: 1.0,
            particles,
        },
    );
}

/// Puff of dust on a hard landing
pub fn spawn_landing_dust(state: &mut GameState, pos: Vec3) {
    let particles = burst(state, 8, 211, Vec3::new(0.2, 0.0, 0.2), (0.0, 0.1), (0.1, 0.15));
    push_effect(
        state,
        Effect {
            kind: EffectKind::LandingDust,
            origin: pos,
            life: 0.6,
            particles,
        },
    );
}

impl EffectKind {
    /// Life lost per reference frame
    fn decay(&self) -> f32 {
        match self {
            EffectKind::Explosion => 0.02,
            EffectKind::Sparkle | EffectKind::LandingDust => 0.03,
        }
    }

    /// Downward pull on particles per reference frame
    fn gravity(&self) -> f32 {
        match self {
            EffectKind::Explosion => 0.02,
            EffectKind::Sparkle | EffectKind::LandingDust => 0.01,
        }
    }
}

/// Age effects and trail segments, scrolling them with the world
pub fn update_effects(state: &mut GameState, speed: f32, dt_factor: f32) {
    let scroll = speed * dt_factor;

    for effect in state.effects.iter_mut() {
        effect.origin.z += scroll;
        effect.life -= effect.kind.decay() * dt_factor;
        let gravity = effect.kind.gravity();
        for p in effect.particles.iter_mut() {
            p.offset += p.vel * dt_factor;
            p.vel.y -= gravity * dt_factor;
        }
    }
    state.effects.retain(|e| e.life > 0.0);

    for seg in state.trail.iter_mut() {
        seg.pos.z += scroll;
        seg.life -= 0.04 * dt_factor;
        seg.scale = Vec3::splat(seg.life * 0.5);
    }
    state.trail.retain(|s| s.life > 0.0);
}

/// Ease the camera impact shake back to rest
pub fn decay_camera_shake(state: &mut GameState, dt_factor: f32) {
    state.camera_shake *= 0.9_f32.powf(dt_factor);
    if state.camera_shake < 0.01 {
        state.camera_shake = 0.0;
    }
}

/// Drop an afterimage behind the runner at a fixed simulation-time cadence
pub fn emit_trail(state: &mut GameState, glitch_scale: f32) {
    if state.time_secs - state.last_trail_time <= TRAIL_INTERVAL {
        return;
    }
    state.last_trail_time = state.time_secs;
    if state.trail.len() >= MAX_TRAIL {
        state.trail.remove(0);
    }
    state.trail.push(TrailSegment {
        pos: state.player.pos,
        scale: state.player.scale * glitch_scale.min(1.5),
        life: 1.0,
    });
}
