//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod config;
pub mod effects;
pub mod glitch;
pub mod player;
pub mod progression;
pub mod skill;
pub mod spawn;
pub mod state;
pub mod tick;

pub use config::{Character, Difficulty, RunConfig, SkillKind, UpgradeLevels, character};
pub use glitch::{GlitchEffects, GlitchType, NarrativeScenario};
pub use state::{
    Action, GameState, Lane, ObstacleKind, Player, PowerUpType, RunState, RunStatus,
};
pub use tick::{GameEvent, Hud, TickInput, TickOutput, tick};
