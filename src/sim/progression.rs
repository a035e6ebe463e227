//! Level thresholds and world scaling
//!
//! Curated levels first, then an open-ended formula. Visuals cycle through
//! the curated palette while the numbers keep climbing.

use super::config::{Difficulty, LEVELS, LevelConfig, infinite};

/// Score needed to complete `level` (1-based)
pub fn threshold_for_level(level: u32) -> f32 {
    let index = level.saturating_sub(1) as usize;
    if let Some(config) = LEVELS.get(index) {
        return config.threshold;
    }
    let last = LEVELS[LEVELS.len() - 1].threshold;
    let past_curated = level as usize - LEVELS.len();
    last + past_curated as f32 * infinite::THRESHOLD_INCREMENT
}

/// Curated entry used for background/ground colors
pub fn visual_level(level: u32) -> &'static LevelConfig {
    let index = level.saturating_sub(1) as usize;
    &LEVELS[index % LEVELS.len()]
}

/// Gameplay speed and hazard density for a level, difficulty applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelTuning {
    /// World units per reference frame
    pub speed: f32,
    pub density: f32,
}

pub fn level_tuning(level: u32, difficulty: Difficulty) -> LevelTuning {
    let mods = difficulty.mods();
    let index = level.saturating_sub(1) as usize;

    if let Some(config) = LEVELS.get(index) {
        return LevelTuning {
            speed: config.speed * mods.speed,
            density: config.obstacle_density * mods.density,
        };
    }

    let last = &LEVELS[LEVELS.len() - 1];
    let extra = (index - LEVELS.len() + 1) as f32;
    LevelTuning {
        speed: (last.speed + extra * infinite::SPEED_INCREMENT) * mods.speed,
        density: ((last.obstacle_density + extra * infinite::DENSITY_INCREMENT) * mods.density)
            .min(infinite::DENSITY_CAP),
    }
}

/// Distance-based score gained this tick
pub fn score_gain(speed: f32, score_multiplier: f32, difficulty: Difficulty, dt_factor: f32) -> f64 {
    (speed * score_multiplier * difficulty.mods().score * dt_factor) as f64
}

/// Result of committing a score increment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreCommit {
    pub score: f64,
    /// Set when the new score meets the current level threshold
    pub level_completed: bool,
}

/// Apply a score increment and test the level threshold in one step
pub fn commit_score(current: f64, gain: f64, level: u32) -> ScoreCommit {
    let score = current + gain.max(0.0);
    ScoreCommit {
        score,
        level_completed: score >= threshold_for_level(level) as f64,
    }
}
