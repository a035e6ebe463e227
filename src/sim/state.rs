//! Game state and core simulation types
//!
//! Everything the per-frame loop mutates lives in [`GameState`]; there are no
//! ambient globals. Entity lists are owned exclusively by the state and only
//! touched from inside a tick or an explicit transition.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::config::{RunConfig, SkillKind};
use super::glitch::GlitchType;
use crate::lane_to_x;

/// Discrete track position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lane {
    Left,
    #[default]
    Center,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Center, Lane::Right];

    /// Signed lane step (-1, 0, 1)
    pub fn step(&self) -> i8 {
        match self {
            Lane::Left => -1,
            Lane::Center => 0,
            Lane::Right => 1,
        }
    }

    /// World-space x of the lane center
    pub fn x(&self) -> f32 {
        lane_to_x(self.step())
    }

    /// Lane whose center is closest to world x
    pub fn nearest(x: f32) -> Lane {
        let step = (x / crate::consts::LANE_WIDTH).round();
        if step < 0.0 {
            Lane::Left
        } else if step > 0.0 {
            Lane::Right
        } else {
            Lane::Center
        }
    }

    /// One lane to the left, clamped at the track edge
    pub fn left(&self) -> Lane {
        match self {
            Lane::Right => Lane::Center,
            _ => Lane::Left,
        }
    }

    /// One lane to the right, clamped at the track edge
    pub fn right(&self) -> Lane {
        match self {
            Lane::Left => Lane::Center,
            _ => Lane::Right,
        }
    }
}

/// Discrete player commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Left,
    Right,
    Jump,
    Slide,
    Skill,
}

/// The runner
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub lane: Lane,
    /// x follows the lane target smoothly, y is feet height, z stays at 0
    pub pos: Vec3,
    pub vel_y: f32,
    pub is_jumping: bool,
    pub is_sliding: bool,
    /// Seconds of slide left
    pub slide_timer: f32,
    /// Rendered scale, eased toward the glitch/slide target
    pub scale: Vec3,
    /// Roll while drifting between lanes
    pub tilt: f32,
    /// Hidden once a lethal hit resolves
    pub visible: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            lane: Lane::Center,
            pos: Vec3::ZERO,
            vel_y: 0.0,
            is_jumping: false,
            is_sliding: false,
            slide_timer: 0.0,
            scale: Vec3::ONE,
            tilt: 0.0,
            visible: true,
        }
    }
}

impl Player {
    /// Horizontal world position the player is easing toward
    pub fn target_x(&self) -> f32 {
        self.lane.x()
    }
}

/// Hazard sub-types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObstacleKind {
    /// Low bar, jump over
    Hurdle,
    /// Overhead bar, slide under
    Beam,
    /// Sloped block, jump over
    Ramp,
    /// Full-height block, change lane
    Wall,
}

impl ObstacleKind {
    /// Vertical hit box as (center height, extent), measured from the ground
    pub fn hit_box(&self) -> (f32, f32) {
        match self {
            ObstacleKind::Hurdle => (0.2, 0.4),
            ObstacleKind::Beam => (0.65, 0.4),
            ObstacleKind::Ramp => (0.3, 0.6),
            ObstacleKind::Wall => (1.5, 3.0),
        }
    }

    /// (bottom, top) of the hit box
    pub fn vertical_span(&self) -> (f32, f32) {
        let (center, height) = self.hit_box();
        (center - height / 2.0, center + height / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub pos: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec3,
    /// Offset into the shared wobble wave so enemies don't bob in sync
    pub wobble_phase: f32,
    pub spin: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    pub id: u32,
    pub pos: Vec3,
    pub spin: f32,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerUpType {
    #[default]
    None,
    Shield,
    Multiplier,
    Speed,
}

impl PowerUpType {
    /// Types that can spawn as pickups
    pub const SPAWNABLE: [PowerUpType; 3] = [
        PowerUpType::Shield,
        PowerUpType::Multiplier,
        PowerUpType::Speed,
    ];
}

/// A power-up pickup on the track
#[derive(Debug, Clone, PartialEq)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpType,
    pub pos: Vec3,
    pub spin: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformMotion {
    /// Drifts across the lanes
    Horizontal,
    /// Bobs up and down
    Vertical,
}

/// A moving platform bridging a gap
#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    pub id: u32,
    pub pos: Vec3,
    pub base_y: f32,
    pub motion: PlatformMotion,
    pub amplitude: f32,
    /// Radians
    pub phase: f32,
    /// Radians per second of simulation time
    pub speed: f32,
}

impl Platform {
    /// Half extent of the walkable top in x and z
    pub const HALF_SIZE: f32 = 1.0;
    /// Walkable surface sits this far above the platform origin
    pub const TOP_OFFSET: f32 = 0.1;

    pub fn top(&self) -> f32 {
        self.pos.y + Self::TOP_OFFSET
    }

    /// Set position from the oscillation at simulation time `t`
    pub fn oscillate(&mut self, t: f32) {
        let wave = (t * self.speed + self.phase).sin() * self.amplitude;
        match self.motion {
            PlatformMotion::Horizontal => self.pos.x = wave,
            PlatformMotion::Vertical => self.pos.y = self.base_y + wave,
        }
    }
}

/// A stretch of track with no ground. `z_start` is the far edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Gap {
    pub id: u32,
    pub z_start: f32,
    pub z_end: f32,
}

impl Gap {
    pub fn contains(&self, z: f32) -> bool {
        z >= self.z_start && z <= self.z_end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Explosion,
    Sparkle,
    LandingDust,
}

/// One particle of an effect group, relative to the group origin
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub offset: Vec3,
    pub vel: Vec3,
    pub size: f32,
}

/// A short-lived particle group (not gameplay-affecting)
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    pub origin: Vec3,
    /// 0-1, removed at 0
    pub life: f32,
    pub particles: Vec<Particle>,
}

/// Afterimage left behind the runner
#[derive(Debug, Clone, PartialEq)]
pub struct TrailSegment {
    pub pos: Vec3,
    pub scale: Vec3,
    pub life: f32,
}

/// Maximum live effect groups
pub const MAX_EFFECTS: usize = 64;
/// Maximum live trail segments
pub const MAX_TRAIL: usize = 32;

/// The single active power-up slot
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PowerUpState {
    pub kind: PowerUpType,
    /// Seconds left
    pub remaining: f32,
    /// Seconds at acquisition
    pub duration: f32,
}

impl PowerUpState {
    pub fn is(&self, kind: PowerUpType) -> bool {
        self.kind == kind
    }

    /// Remaining time as 0-100
    pub fn remaining_percent(&self) -> f32 {
        if self.kind == PowerUpType::None || self.duration <= 0.0 {
            return 0.0;
        }
        (self.remaining / self.duration * 100.0).max(0.0)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Cooldown and sustained-effect timers for the character skill
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SkillState {
    /// Skill of the most recent activation
    pub active: Option<SkillKind>,
    /// Seconds until the skill can fire again
    pub cooldown: f32,
    pub cooldown_max: f32,
    /// Seconds left on the sustained effect
    pub active_time: f32,
}

impl SkillState {
    pub fn ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    /// True while `kind` has a running sustained effect
    pub fn is_active(&self, kind: SkillKind) -> bool {
        self.active == Some(kind) && self.active_time > 0.0
    }

    /// Dash or an unspent clone
    pub fn grants_immunity(&self) -> bool {
        self.is_active(SkillKind::Dash) || self.is_active(SkillKind::Clone)
    }
}

/// Top-level run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    #[default]
    Idle,
    Playing,
    Paused,
    /// Threshold reached; world warps while the player reads the stage recap
    LevelComplete,
    /// Waiting for a glitch pick
    LevelUpChoice,
    GameOver,
    Store,
    CharacterSelect,
}

impl RunStatus {
    /// Menu screens where the simulation is fully suspended
    pub fn is_menu(&self) -> bool {
        matches!(
            self,
            RunStatus::Idle | RunStatus::Store | RunStatus::CharacterSelect
        )
    }
}

/// Per-run progression
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub status: RunStatus,
    /// Never decreases while playing
    pub score: f64,
    /// Wallet coins earned this run
    pub coins: u64,
    /// 1-based
    pub level: u32,
    /// Append-only for the run
    pub glitches: Vec<GlitchType>,
    /// Scenario index offered in `LevelUpChoice`
    pub scenario: Option<usize>,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            status: RunStatus::Idle,
            score: 0.0,
            coins: 0,
            level: 1,
            glitches: Vec::new(),
            scenario: None,
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// User selections, read every tick
    pub config: RunConfig,
    pub run: RunState,
    pub player: Player,
    pub power_up: PowerUpState,
    pub skill: SkillState,
    pub obstacles: Vec<Obstacle>,
    pub enemies: Vec<Enemy>,
    pub coins: Vec<Coin>,
    pub power_ups: Vec<PowerUp>,
    pub platforms: Vec<Platform>,
    pub gaps: Vec<Gap>,
    /// Visual effects (not gameplay-affecting)
    pub effects: Vec<Effect>,
    pub trail: Vec<TrailSegment>,
    /// Simulation clock in seconds (slow-mo scaled, frozen outside play)
    pub time_secs: f32,
    /// World distance accumulated toward the next spawn decision
    pub spawn_meter: f32,
    /// Depth of the most recent power-up spawn, scrolled with the world
    pub last_power_up_z: f32,
    pub last_trail_time: f32,
    /// Camera impact shake magnitude
    pub camera_shake: f32,
    /// World speed of the latest tick (units per reference frame)
    pub current_speed: f32,
    pub time_ticks: u64,
    next_id: u32,
}

/// Sentinel depth meaning "no power-up spawned yet"
pub const NO_POWER_UP_Z: f32 = -999.0;

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, RunConfig::default())
    }

    pub fn with_config(seed: u64, config: RunConfig) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            config,
            run: RunState::default(),
            player: Player::default(),
            power_up: PowerUpState::default(),
            skill: SkillState::default(),
            obstacles: Vec::new(),
            enemies: Vec::new(),
            coins: Vec::new(),
            power_ups: Vec::new(),
            platforms: Vec::new(),
            gaps: Vec::new(),
            effects: Vec::new(),
            trail: Vec::new(),
            time_secs: 0.0,
            spawn_meter: 0.0,
            last_power_up_z: NO_POWER_UP_Z,
            last_trail_time: 0.0,
            camera_shake: 0.0,
            current_speed: 0.0,
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Clear the world, timers and player back to defaults.
    ///
    /// Run status, level and glitches belong to the run state machine and are
    /// left alone; score and coins restart.
    pub fn reset(&mut self) {
        self.obstacles.clear();
        self.enemies.clear();
        self.coins.clear();
        self.power_ups.clear();
        self.platforms.clear();
        self.gaps.clear();
        self.effects.clear();
        self.trail.clear();

        self.player = Player::default();
        self.power_up.clear();
        self.skill = SkillState::default();

        self.run.score = 0.0;
        self.run.coins = 0;

        self.time_secs = 0.0;
        self.spawn_meter = 0.0;
        self.last_power_up_z = NO_POWER_UP_Z;
        self.last_trail_time = 0.0;
        self.camera_shake = 0.0;
        self.current_speed = 0.0;
        self.time_ticks = 0;
        self.next_id = 1;
    }

    /// Total live gameplay entities
    pub fn entity_count(&self) -> usize {
        self.obstacles.len()
            + self.enemies.len()
            + self.coins.len()
            + self.power_ups.len()
            + self.platforms.len()
            + self.gaps.len()
    }
}
