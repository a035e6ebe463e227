//! Static gameplay tables
//!
//! Difficulty scaling, curated levels, the character roster and pickup tuning.
//! Every lookup falls back to a defined default entry instead of failing.

use serde::{Deserialize, Serialize};

use super::state::PowerUpType;

/// Global difficulty selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    ScriptKiddie,
    #[default]
    CyberPunk,
    NetRunner,
}

/// Multipliers applied on top of the level tables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyMods {
    pub speed: f32,
    pub density: f32,
    pub score: f32,
    pub coin_multiplier: f32,
    pub label: &'static str,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::ScriptKiddie,
        Difficulty::CyberPunk,
        Difficulty::NetRunner,
    ];

    pub fn mods(&self) -> DifficultyMods {
        match self {
            Difficulty::ScriptKiddie => DifficultyMods {
                speed: 0.55,
                density: 0.4,
                score: 0.5,
                coin_multiplier: 0.5,
                label: "NOOB",
            },
            Difficulty::CyberPunk => DifficultyMods {
                speed: 1.0,
                density: 1.0,
                score: 1.0,
                coin_multiplier: 1.0,
                label: "HACKER",
            },
            Difficulty::NetRunner => DifficultyMods {
                speed: 1.5,
                density: 1.6,
                score: 2.5,
                coin_multiplier: 2.5,
                label: "GOD",
            },
        }
    }

    /// The next entry in menu order, wrapping around
    pub fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|d| d == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_uppercase().as_str() {
            "SCRIPT_KIDDIE" => Some(Difficulty::ScriptKiddie),
            "CYBER_PUNK" => Some(Difficulty::CyberPunk),
            "NET_RUNNER" => Some(Difficulty::NetRunner),
            _ => None,
        }
    }
}

/// One curated level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelConfig {
    pub id: u32,
    /// World units per reference frame
    pub speed: f32,
    /// Probability that a spawn decision produces a hazard
    pub obstacle_density: f32,
    pub background: &'static str,
    pub ground: &'static str,
    /// Score needed to complete the level
    pub threshold: f32,
}

pub const LEVELS: [LevelConfig; 3] = [
    LevelConfig {
        id: 1,
        speed: 0.65,
        obstacle_density: 0.5,
        background: "#0f172a",
        ground: "#1e293b",
        threshold: 2000.0,
    },
    LevelConfig {
        id: 2,
        speed: 0.8,
        obstacle_density: 0.6,
        background: "#4c1d95",
        ground: "#5b21b6",
        threshold: 6000.0,
    },
    LevelConfig {
        id: 3,
        speed: 0.95,
        obstacle_density: 0.7,
        background: "#7f1d1d",
        ground: "#991b1b",
        threshold: 12000.0,
    },
];

/// Scaling applied per level past the curated set
pub mod infinite {
    pub const SPEED_INCREMENT: f32 = 0.05;
    pub const DENSITY_INCREMENT: f32 = 0.03;
    pub const DENSITY_CAP: f32 = 0.85;
    pub const THRESHOLD_INCREMENT: f32 = 8000.0;
}

/// Power-up tuning
pub mod power_up {
    /// Seconds at upgrade level 0
    pub const BASE_DURATION: f32 = 5.0;
    /// Extra seconds per upgrade level
    pub const DURATION_PER_LEVEL: f32 = 1.0;
    pub const SPAWN_CHANCE: f32 = 0.05;
    pub const SPEED_BOOST_MULTIPLIER: f32 = 1.5;
    pub const SCORE_MULTIPLIER: f32 = 2.0;
    /// Minimum depth separation between two power-up spawns
    pub const MIN_SEPARATION: f32 = 100.0;
}

pub mod coin {
    pub const SPAWN_CHANCE: f32 = 0.9;
    pub const POINTS: f32 = 50.0;
    /// Wallet coins per pickup before the difficulty multiplier
    pub const VALUE: f32 = 10.0;
    pub const CLUSTER_SIZE: usize = 3;
    pub const CLUSTER_SPACING: f32 = 1.2;
}

pub mod enemy {
    /// Fraction of hazard decisions that produce an enemy
    pub const SPAWN_RATIO: f32 = 0.5;
    /// Extra approach speed on top of world speed (per reference frame)
    pub const SPEED_OFFSET: f32 = 0.15;
    pub const WOBBLE_SPEED: f32 = 8.0;
    pub const WOBBLE_AMP: f32 = 0.5;
    pub const BASE_Y: f32 = 0.5;
}

pub mod upgrade {
    pub const BASE_COST: u64 = 100;
    pub const COST_MULTIPLIER: u64 = 2;
    pub const MAX_LEVEL: u8 = 5;
}

/// Character-specific special ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillKind {
    /// Invincible forward dash
    Dash,
    /// Destroys hazards ahead in the current lane
    Blast,
    /// Absorbs a single lethal hit
    Clone,
    /// Pulls coins in from every lane
    Magnet,
    /// Halves global simulation speed
    SlowMo,
    /// Turns nearby obstacles into coins
    Alchemy,
}

/// Player body shape (presentation only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shape {
    Box,
    Sphere,
    Tetra,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Character {
    pub id: &'static str,
    pub name: &'static str,
    pub shape: Shape,
    pub color: &'static str,
    pub unlock_cost: u64,
    pub skill: SkillKind,
    /// Seconds before the skill can be used again
    pub skill_cooldown: f32,
    /// Seconds the sustained effect lasts (0 for instant skills)
    pub skill_duration: f32,
}

pub const CHARACTERS: [Character; 6] = [
    Character {
        id: "DEFAULT",
        name: "Neon Guy",
        shape: Shape::Box,
        color: "#38bdf8",
        unlock_cost: 0,
        skill: SkillKind::Dash,
        skill_cooldown: 15.0,
        skill_duration: 3.0,
    },
    Character {
        id: "GOKU_FAKE",
        name: "Gokuccio",
        shape: Shape::Sphere,
        color: "#facc15",
        unlock_cost: 500,
        skill: SkillKind::Blast,
        skill_cooldown: 25.0,
        skill_duration: 0.0,
    },
    Character {
        id: "NARUTO_FAKE",
        name: "Volpe di Paglia",
        shape: Shape::Tetra,
        color: "#f97316",
        unlock_cost: 1000,
        skill: SkillKind::Clone,
        skill_cooldown: 30.0,
        skill_duration: 5.0,
    },
    Character {
        id: "LUFFY_FAKE",
        name: "Gomma Boy",
        shape: Shape::Box,
        color: "#ef4444",
        unlock_cost: 1500,
        skill: SkillKind::Magnet,
        skill_cooldown: 20.0,
        skill_duration: 6.0,
    },
    Character {
        id: "EVA_FAKE",
        name: "Robot Depresso",
        shape: Shape::Tetra,
        color: "#a855f7",
        unlock_cost: 2000,
        skill: SkillKind::SlowMo,
        skill_cooldown: 35.0,
        skill_duration: 5.0,
    },
    Character {
        id: "SAILOR_FAKE",
        name: "Luna Storta",
        shape: Shape::Sphere,
        color: "#ec4899",
        unlock_cost: 2500,
        skill: SkillKind::Alchemy,
        skill_cooldown: 25.0,
        skill_duration: 0.0,
    },
];

/// Look up a character by id, falling back to the default runner
pub fn character(id: &str) -> &'static Character {
    CHARACTERS
        .iter()
        .find(|c| c.id == id)
        .unwrap_or(&CHARACTERS[0])
}

/// Permanent upgrade level per power-up type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpgradeLevels {
    #[serde(default)]
    pub shield: u8,
    #[serde(default)]
    pub multiplier: u8,
    #[serde(default)]
    pub speed: u8,
}

impl UpgradeLevels {
    pub fn get(&self, kind: PowerUpType) -> u8 {
        match kind {
            PowerUpType::None => 0,
            PowerUpType::Shield => self.shield,
            PowerUpType::Multiplier => self.multiplier,
            PowerUpType::Speed => self.speed,
        }
    }

    pub fn get_mut(&mut self, kind: PowerUpType) -> Option<&mut u8> {
        match kind {
            PowerUpType::None => None,
            PowerUpType::Shield => Some(&mut self.shield),
            PowerUpType::Multiplier => Some(&mut self.multiplier),
            PowerUpType::Speed => Some(&mut self.speed),
        }
    }
}

/// Duration (seconds) of a power-up at the given upgrade level
pub fn power_up_duration(level: u8) -> f32 {
    power_up::BASE_DURATION + level as f32 * power_up::DURATION_PER_LEVEL
}

/// Coin cost of buying the next upgrade level
pub fn upgrade_cost(current_level: u8) -> u64 {
    upgrade::BASE_COST * upgrade::COST_MULTIPLIER.pow(current_level as u32)
}

/// User selections the simulation reads every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub difficulty: Difficulty,
    pub character_id: String,
    pub upgrades: UpgradeLevels,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            character_id: CHARACTERS[0].id.to_string(),
            upgrades: UpgradeLevels::default(),
        }
    }
}

impl RunConfig {
    pub fn character(&self) -> &'static Character {
        character(&self.character_id)
    }
}
