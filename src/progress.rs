//! Persistent player progress
//!
//! Wallet, records, upgrades and the character roster, persisted to
//! LocalStorage as JSON. Missing fields in an older save take defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sim::config::{CHARACTERS, Difficulty, RunConfig, UpgradeLevels, upgrade, upgrade_cost};
use crate::sim::state::PowerUpType;

/// Coins a brand new profile starts with
pub const STARTING_COINS: u64 = 1000;

fn default_coins() -> u64 {
    STARTING_COINS
}

fn default_character() -> String {
    CHARACTERS[0].id.to_string()
}

fn default_unlocked() -> Vec<String> {
    vec![default_character()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Wallet, spent in the store
    #[serde(default = "default_coins")]
    pub total_coins: u64,
    #[serde(default)]
    pub high_score: u64,
    /// Furthest level reached with any character
    #[serde(default)]
    pub max_stage: u32,
    /// Furthest level reached per character id
    #[serde(default)]
    pub character_stages: BTreeMap<String, u32>,
    #[serde(default)]
    pub upgrades: UpgradeLevels,
    #[serde(default = "default_character")]
    pub selected_character: String,
    #[serde(default = "default_unlocked")]
    pub unlocked_characters: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            total_coins: STARTING_COINS,
            high_score: 0,
            max_stage: 0,
            character_stages: BTreeMap::new(),
            upgrades: UpgradeLevels::default(),
            selected_character: default_character(),
            unlocked_characters: default_unlocked(),
            difficulty: Difficulty::default(),
        }
    }
}

impl Progress {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "neon_runner_progress";

    /// Parse a saved profile, falling back to a fresh one if it is unreadable
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Progress>(json) {
            Ok(progress) => progress.sanitized(),
            Err(e) => {
                log::warn!("Discarding unreadable progress: {}", e);
                Self::default()
            }
        }
    }

    /// Repair a loaded profile that points at unknown or locked characters
    fn sanitized(mut self) -> Self {
        self.unlocked_characters
            .retain(|id| CHARACTERS.iter().any(|c| c.id == *id));
        if !self.unlocked_characters.contains(&default_character()) {
            self.unlocked_characters.insert(0, default_character());
        }
        if !self.is_unlocked(&self.selected_character) {
            self.selected_character = default_character();
        }
        for level in [
            &mut self.upgrades.shield,
            &mut self.upgrades.multiplier,
            &mut self.upgrades.speed,
        ] {
            *level = (*level).min(upgrade::MAX_LEVEL);
        }
        self
    }

    /// Selections for the next run
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            difficulty: self.difficulty,
            character_id: self.selected_character.clone(),
            upgrades: self.upgrades,
        }
    }

    /// Bank a finished run. Returns true on a new high score.
    pub fn commit_run(&mut self, score: f64, coins: u64, level: u32) -> bool {
        self.total_coins = self.total_coins.saturating_add(coins);
        self.record_stage(level);

        let score = score.max(0.0).floor() as u64;
        if score > self.high_score {
            log::info!("New high score: {} (was {})", score, self.high_score);
            self.high_score = score;
            return true;
        }
        false
    }

    /// Remember the furthest level reached, globally and for the selected character
    pub fn record_stage(&mut self, stage: u32) {
        self.max_stage = self.max_stage.max(stage);
        let best = self
            .character_stages
            .entry(self.selected_character.clone())
            .or_insert(0);
        *best = (*best).max(stage);
    }

    /// Cost of the next level of `kind`, or None when maxed out
    pub fn next_upgrade_cost(&self, kind: PowerUpType) -> Option<u64> {
        if kind == PowerUpType::None {
            return None;
        }
        let level = self.upgrades.get(kind);
        (level < upgrade::MAX_LEVEL).then(|| upgrade_cost(level))
    }

    /// Buy one upgrade level. Returns false if maxed out or unaffordable.
    pub fn buy_upgrade(&mut self, kind: PowerUpType) -> bool {
        let Some(cost) = self.next_upgrade_cost(kind) else {
            return false;
        };
        if cost > self.total_coins {
            return false;
        }
        let Some(level) = self.upgrades.get_mut(kind) else {
            return false;
        };
        *level += 1;
        self.total_coins -= cost;
        log::info!("Upgraded {:?} to level {} for {} coins", kind, level, cost);
        true
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked_characters.iter().any(|c| c == id)
    }

    /// Buy a character. Returns false for unknown ids, owned characters or
    /// an empty wallet.
    pub fn unlock_character(&mut self, id: &str) -> bool {
        let Some(character) = CHARACTERS.iter().find(|c| c.id == id) else {
            return false;
        };
        if self.is_unlocked(id) || character.unlock_cost > self.total_coins {
            return false;
        }
        self.total_coins -= character.unlock_cost;
        self.unlocked_characters.push(id.to_string());
        log::info!("Unlocked {} for {} coins", character.name, character.unlock_cost);
        true
    }

    /// Select an owned character for the next run
    pub fn select_character(&mut self, id: &str) -> bool {
        if !self.is_unlocked(id) {
            return false;
        }
        self.selected_character = id.to_string();
        true
    }

    /// Step to the next difficulty for future runs
    pub fn cycle_difficulty(&mut self) -> Difficulty {
        self.difficulty = self.difficulty.next();
        self.difficulty
    }

    /// Load progress from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                let progress = Self::from_json(&json);
                log::info!(
                    "Loaded progress: {} coins, best {}",
                    progress.total_coins,
                    progress.high_score
                );
                return progress;
            }
        }

        log::info!("No saved progress, starting fresh");
        Self::default()
    }

    /// Save progress to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::debug!("Progress saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_profile() {
        let p = Progress::default();
        assert_eq!(p.total_coins, STARTING_COINS);
        assert!(p.is_unlocked("DEFAULT"));
        assert_eq!(p.run_config().character().id, "DEFAULT");
    }

    #[test]
    fn test_partial_save_takes_defaults() {
        let p = Progress::from_json(r#"{"high_score": 4200, "difficulty": "NET_RUNNER"}"#);
        assert_eq!(p.high_score, 4200);
        assert_eq!(p.difficulty, Difficulty::NetRunner);
        assert_eq!(p.total_coins, STARTING_COINS);
        assert_eq!(p.selected_character, "DEFAULT");
    }

    #[test]
    fn test_cycle_difficulty_feeds_next_run() {
        let mut p = Progress::default();
        assert_eq!(p.cycle_difficulty(), Difficulty::NetRunner);
        assert_eq!(p.cycle_difficulty(), Difficulty::ScriptKiddie);
        assert_eq!(p.run_config().difficulty, Difficulty::ScriptKiddie);
    }

    #[test]
    fn test_garbage_falls_back_to_default() {
        assert_eq!(Progress::from_json("not json {"), Progress::default());
    }

    #[test]
    fn test_locked_selection_is_repaired() {
        let p = Progress::from_json(
            r#"{"selected_character": "EVA_FAKE", "unlocked_characters": ["GHOST"]}"#,
        );
        assert_eq!(p.selected_character, "DEFAULT");
        assert_eq!(p.unlocked_characters, vec!["DEFAULT".to_string()]);
    }

    #[test]
    fn test_commit_run() {
        let mut p = Progress::default();
        assert!(p.commit_run(1234.7, 40, 2));
        assert_eq!(p.high_score, 1234);
        assert_eq!(p.total_coins, STARTING_COINS + 40);
        assert_eq!(p.max_stage, 2);
        assert_eq!(p.character_stages.get("DEFAULT"), Some(&2));

        assert!(!p.commit_run(100.0, 0, 1));
        assert_eq!(p.max_stage, 2);
    }

    #[test]
    fn test_upgrade_purchase_until_maxed() {
        let mut p = Progress {
            total_coins: 10_000,
            ..Progress::default()
        };
        let mut spent = 0;
        for level in 0..upgrade::MAX_LEVEL {
            let cost = upgrade_cost(level);
            assert_eq!(p.next_upgrade_cost(PowerUpType::Shield), Some(cost));
            assert!(p.buy_upgrade(PowerUpType::Shield));
            spent += cost;
        }
        assert_eq!(p.upgrades.shield, upgrade::MAX_LEVEL);
        assert_eq!(p.total_coins, 10_000 - spent);
        assert!(!p.buy_upgrade(PowerUpType::Shield));
        assert!(!p.buy_upgrade(PowerUpType::None));
    }

    #[test]
    fn test_upgrade_needs_coins() {
        let mut p = Progress {
            total_coins: 99,
            ..Progress::default()
        };
        assert!(!p.buy_upgrade(PowerUpType::Speed));
        assert_eq!(p.upgrades.speed, 0);
    }

    #[test]
    fn test_unlock_and_select() {
        let mut p = Progress::default();
        assert!(!p.select_character("GOKU_FAKE"));
        assert!(p.unlock_character("GOKU_FAKE"));
        assert_eq!(p.total_coins, STARTING_COINS - 500);
        assert!(!p.unlock_character("GOKU_FAKE"));
        assert!(!p.unlock_character("EVA_FAKE"));
        assert!(p.select_character("GOKU_FAKE"));
        assert_eq!(p.run_config().character().id, "GOKU_FAKE");
    }
}
