//! Neon Runner - A three-lane endless runner with glitch modifiers
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player physics, spawning, collisions, progression)
//! - `progress`: Persistent wallet, records and upgrades

pub mod progress;
pub mod sim;

pub use progress::Progress;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Reference frame interval the per-frame physics constants are tuned for (60 Hz)
    pub const REFERENCE_FRAME_SECS: f32 = 1.0 / 60.0;
    /// Upper bound on a single frame delta (a backgrounded tab resumes with a huge delta)
    pub const MAX_FRAME_SECS: f32 = 0.1;

    /// Track geometry
    pub const LANE_WIDTH: f32 = 2.5;
    /// Depth at which new entities appear (negative = far from camera)
    pub const SPAWN_Z: f32 = -50.0;
    /// Entities past this depth are behind the camera and get removed
    pub const DESPAWN_Z: f32 = 5.0;
    /// Distance the world scrolls between two spawn decisions
    pub const SPAWN_DISTANCE: f32 = 11.0;

    /// Player physics (per reference frame)
    pub const JUMP_FORCE: f32 = 0.25;
    pub const GRAVITY: f32 = -0.015;
    /// Downward velocity applied when SLIDE is pressed mid-air
    pub const FAST_FALL_VELOCITY: f32 = -0.5;
    /// Fraction of the remaining lane offset covered per reference frame
    pub const LANE_LERP: f32 = 0.2;
    /// Slide duration (seconds)
    pub const SLIDE_DURATION: f32 = 0.8;
    /// Falling below this height is fatal
    pub const FALL_DEATH_Y: f32 = -2.5;
    /// Terrain height reported over a gap with no platform beneath
    pub const VOID_HEIGHT: f32 = -999.0;
    /// Landings faster than this kick up dust and shake the camera
    pub const HARD_LANDING_VELOCITY: f32 = -0.1;
    pub const LANDING_SHAKE: f32 = 0.2;

    /// Player bounding volume at scale 1
    pub const PLAYER_HEIGHT: f32 = 1.0;
    pub const PLAYER_SLIDE_HEIGHT: f32 = 0.5;
    pub const PLAYER_WIDTH: f32 = 0.8;
    /// Half extent of the player footprint used for platform support
    pub const PLAYER_FOOT_HALF: f32 = 0.3;

    /// Eased values closer than this to their target snap onto it
    pub const APPROACH_SNAP: f32 = 1e-4;

    /// Seconds of simulation time between trail segments
    pub const TRAIL_INTERVAL: f32 = 0.08;
}

/// World-space x offset of a lane step (-1, 0, 1)
#[inline]
pub fn lane_to_x(step: i8) -> f32 {
    step as f32 * consts::LANE_WIDTH
}

/// Frame-rate normalization factor for a (possibly time-scaled) delta in seconds
#[inline]
pub fn dt_factor(dt_secs: f32) -> f32 {
    dt_secs / consts::REFERENCE_FRAME_SECS
}

/// Exponential approach toward a target, normalized to the reference frame.
///
/// The blend is capped at 1 so large deltas land on the target instead of overshooting,
/// and the result snaps once it is within float noise of the target.
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt_factor: f32) -> f32 {
    let blend = (rate * dt_factor).clamp(0.0, 1.0);
    let next = current + (target - current) * blend;
    if (target - next).abs() < consts::APPROACH_SNAP {
        target
    } else {
        next
    }
}

/// Horizontal/depth distances between two points (vertical handled separately)
#[inline]
pub fn ground_distance(a: Vec3, b: Vec3) -> (f32, f32) {
    ((a.x - b.x).abs(), (a.z - b.z).abs())
}
