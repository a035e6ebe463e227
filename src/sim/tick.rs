//! Per-frame simulation tick
//!
//! Core game loop plus the run state machine. One call per display frame;
//! the frame delta is capped, then scaled by slow motion for physics while
//! wall-clock timers keep the capped real delta.

use rand::Rng;
use serde::Serialize;

use super::collision::{
    Sweep, advance_entities, check_collisions, despawn_passed, end_run, scroll_entities,
};
use super::config::{RunConfig, power_up};
use super::effects::{decay_camera_shake, emit_trail, update_effects};
use super::glitch::{
    GlitchEffects, GlitchType, NARRATIVE_SCENARIOS, Rarity, VisualFlags, scenario,
};
use super::player::{apply_action, update_player};
use super::progression::{commit_score, level_tuning, score_gain, threshold_for_level, visual_level};
use super::skill::{activate_skill, speed_factor, time_scale, update_skill_timers};
use super::spawn::advance_spawn_meter;
use super::state::{Action, GameState, PowerUpType, RunStatus};
use crate::consts::*;
use crate::dt_factor;

/// Warp multiplier on world scroll while the level recap is showing
const WARP_SPEED_MULTIPLIER: f32 = 3.0;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Discrete actions queued since the previous frame, applied in order
    pub actions: Vec<Action>,
}

impl TickInput {
    pub fn with_action(action: Action) -> Self {
        Self {
            actions: vec![action],
        }
    }
}

/// Notifications produced by the simulation for presentation and persistence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEvent {
    /// Every playing tick
    ScoreUpdate { score: f64, coins: u64 },
    /// Exactly once, when a lethal hit resolves
    Collision,
    /// On pickup, on expiry (kind NONE) and every tick while one runs
    PowerUpChange {
        kind: PowerUpType,
        remaining_percent: f32,
    },
    /// Every playing tick
    SkillUpdate { cooldown: f32, cooldown_max: f32 },
    /// `level` is the level just completed
    LevelComplete { level: u32, score: f64 },
    /// The run is over; wallet and records should be committed
    RunEnded { score: f64, coins: u64, level: u32 },
}

#[derive(Debug, Clone, Default)]
pub struct TickOutput {
    pub events: Vec<GameEvent>,
}

/// Advance the game state by one display frame of `frame_dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, frame_dt: f32) -> TickOutput {
    let mut output = TickOutput::default();
    let real_dt = if frame_dt.is_finite() {
        frame_dt.clamp(0.0, MAX_FRAME_SECS)
    } else {
        0.0
    };

    match state.run.status {
        RunStatus::Playing => {
            playing_tick(state, input, real_dt, &mut output.events);
            // After collisions, so nothing leaves the world untested
            despawn_passed(state);
        }
        RunStatus::LevelComplete => warp_tick(state, real_dt),
        // Paused, choosing, and every menu screen: frozen
        _ => {}
    }
    output
}

fn playing_tick(
    state: &mut GameState,
    input: &TickInput,
    real_dt: f32,
    events: &mut Vec<GameEvent>,
) {
    let fx = GlitchEffects::from_glitches(&state.run.glitches);

    for action in &input.actions {
        perform(state, *action, &fx);
    }

    // Cooldowns run on real time, so slow-mo doesn't stretch itself
    update_skill_timers(&mut state.skill, real_dt);

    let dt = real_dt * time_scale(&state.skill);
    let dtf = dt_factor(dt);

    let tuning = level_tuning(state.run.level, state.config.difficulty);
    let mut speed = tuning.speed * fx.speed_multiplier * speed_factor(&state.skill);
    if state.power_up.is(PowerUpType::Speed) {
        speed *= power_up::SPEED_BOOST_MULTIPLIER;
    }
    state.current_speed = speed;

    state.time_secs += dt;
    state.time_ticks += 1;

    decay_camera_shake(state, dtf);
    update_effects(state, speed, dtf);
    emit_trail(state, fx.player_scale);
    scroll_entities(state, speed, dtf);

    // Both boosts pay double; speed also scores through its faster scroll
    let mut score_multiplier = fx.score_multiplier;
    if state.power_up.is(PowerUpType::Multiplier) || state.power_up.is(PowerUpType::Speed) {
        score_multiplier *= power_up::SCORE_MULTIPLIER;
    }
    let gain = score_gain(speed, score_multiplier, state.config.difficulty, dtf);
    let commit = commit_score(state.run.score, gain, state.run.level);
    state.run.score = commit.score;
    if commit.level_completed {
        events.push(score_update(state));
        complete_level(state, events);
        return;
    }

    if state.power_up.kind != PowerUpType::None {
        state.power_up.remaining -= real_dt;
        if state.power_up.remaining <= 0.0 {
            state.power_up.clear();
            events.push(GameEvent::PowerUpChange {
                kind: PowerUpType::None,
                remaining_percent: 0.0,
            });
        } else {
            events.push(GameEvent::PowerUpChange {
                kind: state.power_up.kind,
                remaining_percent: state.power_up.remaining_percent(),
            });
        }
    }

    let step = update_player(state, &fx, dtf, real_dt);
    if step.fell {
        log::debug!("player fell into a gap");
        end_run(state, events);
        return;
    }

    advance_spawn_meter(state, speed, dtf, tuning.density);

    if check_collisions(state, &fx, Sweep::for_speed(speed, dtf), dtf, events) {
        return;
    }

    events.push(score_update(state));
    events.push(GameEvent::SkillUpdate {
        cooldown: state.skill.cooldown,
        cooldown_max: state.skill.cooldown_max,
    });
}

/// Presentation-only scroll while the level recap is up
fn warp_tick(state: &mut GameState, real_dt: f32) {
    let dtf = dt_factor(real_dt);
    let speed = state.current_speed * WARP_SPEED_MULTIPLIER;
    update_effects(state, speed, dtf);
    advance_entities(state, speed, dtf);
}

fn score_update(state: &GameState) -> GameEvent {
    GameEvent::ScoreUpdate {
        score: state.run.score,
        coins: state.run.coins,
    }
}

fn complete_level(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let completed = state.run.level;
    state.run.status = RunStatus::LevelComplete;
    state.run.level += 1;
    log::info!("level {} complete at score {:.0}", completed, state.run.score);
    events.push(GameEvent::LevelComplete {
        level: completed,
        score: state.run.score,
    });
}

fn perform(state: &mut GameState, action: Action, fx: &GlitchEffects) -> bool {
    match action {
        Action::Skill => activate_skill(state),
        _ => apply_action(state, action, fx),
    }
}

/// Values the UI may read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub status: RunStatus,
    /// Display name of the difficulty in play
    pub difficulty: &'static str,
    pub score: f64,
    pub coins: u64,
    pub level: u32,
    pub threshold: f32,
    pub power_up: PowerUpType,
    pub power_up_percent: f32,
    pub skill_cooldown: f32,
    pub skill_cooldown_max: f32,
    /// Curated level whose colors are in use
    pub visual_level: u32,
    pub background: &'static str,
    pub ground: &'static str,
    pub camera_shake: f32,
    pub visuals: VisualFlags,
    pub glitches: Vec<GlitchType>,
    /// Options on offer during the level-up choice
    pub choices: Option<[GlitchType; 3]>,
    pub choice_rarities: Option<[Rarity; 3]>,
}

impl GameState {
    /// Apply one action immediately. Ignored unless a run is in progress.
    pub fn perform_action(&mut self, action: Action) -> bool {
        if self.run.status != RunStatus::Playing {
            return false;
        }
        let fx = GlitchEffects::from_glitches(&self.run.glitches);
        perform(self, action, &fx)
    }

    /// Begin a fresh run from the title screen or after a game over
    pub fn start_run(&mut self) -> bool {
        if !matches!(self.run.status, RunStatus::Idle | RunStatus::GameOver) {
            return false;
        }
        self.reset();
        self.run.level = 1;
        self.run.glitches.clear();
        self.run.scenario = None;
        self.run.status = RunStatus::Playing;
        log::info!(
            "run started: {:?}, character {}",
            self.config.difficulty,
            self.config.character().id
        );
        true
    }

    /// Start a run with new selections
    pub fn start_run_with(&mut self, config: RunConfig) -> bool {
        if !matches!(self.run.status, RunStatus::Idle | RunStatus::GameOver) {
            return false;
        }
        self.config = config;
        self.start_run()
    }

    pub fn pause(&mut self) -> bool {
        if self.run.status != RunStatus::Playing {
            return false;
        }
        self.run.status = RunStatus::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.run.status != RunStatus::Paused {
            return false;
        }
        self.run.status = RunStatus::Playing;
        true
    }

    /// Leave the level recap and draw a narrative scenario
    pub fn acknowledge_level(&mut self) -> bool {
        if self.run.status != RunStatus::LevelComplete {
            return false;
        }
        let index = self.rng.random_range(0..NARRATIVE_SCENARIOS.len());
        self.run.scenario = Some(index);
        self.run.status = RunStatus::LevelUpChoice;
        true
    }

    /// Take option `option` of the offered scenario and resume play
    pub fn choose_modifier(&mut self, option: usize) -> Option<GlitchType> {
        if self.run.status != RunStatus::LevelUpChoice {
            return None;
        }
        let index = self.run.scenario?;
        let glitch = *scenario(index).options.get(option)?;
        self.run.glitches.push(glitch);
        self.run.scenario = None;
        self.run.status = RunStatus::Playing;
        log::info!("glitch {} acquired for level {}", glitch.id(), self.run.level);
        Some(glitch)
    }

    /// Drop back to the title screen
    pub fn return_to_menu(&mut self) -> bool {
        match self.run.status {
            RunStatus::GameOver
            | RunStatus::Paused
            | RunStatus::Store
            | RunStatus::CharacterSelect => {
                self.run.status = RunStatus::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn open_store(&mut self) -> bool {
        self.open_menu(RunStatus::Store)
    }

    pub fn open_character_select(&mut self) -> bool {
        self.open_menu(RunStatus::CharacterSelect)
    }

    fn open_menu(&mut self, menu: RunStatus) -> bool {
        if !matches!(self.run.status, RunStatus::Idle | RunStatus::GameOver) {
            return false;
        }
        self.run.status = menu;
        true
    }

    pub fn close_menu(&mut self) -> bool {
        if !matches!(self.run.status, RunStatus::Store | RunStatus::CharacterSelect) {
            return false;
        }
        self.run.status = RunStatus::Idle;
        true
    }

    pub fn hud(&self) -> Hud {
        let fx = GlitchEffects::from_glitches(&self.run.glitches);
        let visual = visual_level(self.run.level);
        let choices = self.run.scenario.map(|i| scenario(i).options);
        Hud {
            status: self.run.status,
            difficulty: self.config.difficulty.mods().label,
            score: self.run.score,
            coins: self.run.coins,
            level: self.run.level,
            threshold: threshold_for_level(self.run.level),
            power_up: self.power_up.kind,
            power_up_percent: self.power_up.remaining_percent(),
            skill_cooldown: self.skill.cooldown,
            skill_cooldown_max: self.skill.cooldown_max,
            visual_level: visual.id,
            background: visual.background,
            ground: visual.ground,
            camera_shake: self.camera_shake,
            visuals: fx.visuals,
            glitches: self.run.glitches.clone(),
            choices,
            choice_rarities: choices.map(|options| options.map(|g| g.rarity())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Obstacle, ObstacleKind, PowerUpState};
    use glam::Vec3;

    const FRAME: f32 = 1.0 / 64.0;

    fn running(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        assert!(state.start_run());
        state
    }

    #[test]
    fn test_idle_does_not_tick() {
        let mut state = GameState::new(1);
        let out = tick(&mut state, &TickInput::default(), FRAME);
        assert!(out.events.is_empty());
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut state = running(2);
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), FRAME);
        }
        assert!(state.pause());
        let before = format!("{:?}", state);
        for _ in 0..100 {
            let out = tick(&mut state, &TickInput::with_action(Action::Jump), 0.05);
            assert!(out.events.is_empty());
        }
        assert_eq!(format!("{:?}", state), before);
        assert!(state.resume());
        tick(&mut state, &TickInput::default(), FRAME);
        assert!(state.time_secs > 0.0);
    }

    #[test]
    fn test_playing_tick_reports_score_and_skill() {
        let mut state = running(3);
        let out = tick(&mut state, &TickInput::default(), FRAME);
        assert!(state.run.score > 0.0);
        assert!(out.events.iter().any(|e| matches!(e, GameEvent::ScoreUpdate { .. })));
        assert!(out.events.iter().any(|e| matches!(e, GameEvent::SkillUpdate { .. })));
    }

    #[test]
    fn test_large_frame_delta_is_capped() {
        let mut a = running(4);
        let mut b = running(4);
        tick(&mut a, &TickInput::default(), 5.0);
        tick(&mut b, &TickInput::default(), MAX_FRAME_SECS);
        assert_eq!(a.run.score, b.run.score);
        assert_eq!(a.time_secs, b.time_secs);
    }

    #[test]
    fn test_threshold_completes_level_same_tick() {
        let mut state = running(5);
        state.run.score = 2000.0;
        let out = tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.run.status, RunStatus::LevelComplete);
        assert_eq!(state.run.level, 2);
        assert!(out.events.contains(&GameEvent::LevelComplete {
            level: 1,
            score: state.run.score
        }));
    }

    #[test]
    fn test_level_up_flow_appends_one_glitch() {
        let mut state = running(6);
        state.run.score = 2000.0;
        tick(&mut state, &TickInput::default(), FRAME);

        // The warp keeps scrolling but never scores
        let score = state.run.score;
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.run.score, score);

        assert!(state.acknowledge_level());
        assert_eq!(state.run.status, RunStatus::LevelUpChoice);
        let hud = state.hud();
        let choices = hud.choices.unwrap();
        assert_eq!(hud.choice_rarities, Some(choices.map(|g| g.rarity())));
        assert_eq!(state.choose_modifier(7), None);

        let picked = state.choose_modifier(1);
        assert!(picked.is_some());
        assert_eq!(state.run.glitches.len(), 1);
        assert_eq!(state.run.status, RunStatus::Playing);
        assert_eq!(state.choose_modifier(0), None);
    }

    #[test]
    fn test_actions_ignored_outside_play() {
        let mut state = GameState::new(7);
        assert!(!state.perform_action(Action::Jump));
        assert!(!state.player.is_jumping);
        state.start_run();
        assert!(state.perform_action(Action::Jump));
        assert!(state.player.is_jumping);
    }

    #[test]
    fn test_lethal_tick_ends_run() {
        let mut state = running(8);
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Wall,
            pos: Vec3::new(0.0, 0.0, -0.3),
        });
        let out = tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.run.status, RunStatus::GameOver);
        assert!(out.events.contains(&GameEvent::Collision));
        assert!(out.events.iter().any(|e| matches!(e, GameEvent::RunEnded { .. })));

        // Game over is terminal until an explicit restart
        let out = tick(&mut state, &TickInput::default(), FRAME);
        assert!(out.events.is_empty());
        assert!(state.start_run());
        assert!(state.player.visible);
        assert_eq!(state.entity_count(), 0);
    }

    #[test]
    fn test_long_frame_cannot_skip_a_wall() {
        let mut state = running(11);
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Wall,
            pos: Vec3::new(0.0, 0.0, -1.0),
        });
        let out = tick(&mut state, &TickInput::default(), MAX_FRAME_SECS);
        assert_eq!(state.run.status, RunStatus::GameOver);
        let collisions = out.events.iter().filter(|e| **e == GameEvent::Collision).count();
        assert_eq!(collisions, 1);
    }

    #[test]
    fn test_wall_far_past_in_one_frame_is_still_hit() {
        let mut state = running(12);
        state.run.level = 40;
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Wall,
            pos: Vec3::new(0.0, 0.0, -1.0),
        });
        tick(&mut state, &TickInput::default(), MAX_FRAME_SECS);
        assert_eq!(state.run.status, RunStatus::GameOver);
        // Despawn still runs on the lethal tick
        assert!(state.obstacles.iter().all(|o| o.pos.z <= DESPAWN_Z));
    }

    #[test]
    fn test_speed_boost_doubles_score_rate() {
        let mut plain = running(13);
        let mut boosted = running(13);
        boosted.power_up = PowerUpState {
            kind: PowerUpType::Speed,
            remaining: 5.0,
            duration: 5.0,
        };
        tick(&mut plain, &TickInput::default(), FRAME);
        tick(&mut boosted, &TickInput::default(), FRAME);
        let ratio = boosted.run.score / plain.run.score;
        assert!((ratio - 3.0).abs() < 1e-4, "ratio {}", ratio);
    }

    #[test]
    fn test_power_up_expires_on_real_time() {
        let mut state = running(9);
        state.power_up = PowerUpState {
            kind: PowerUpType::Multiplier,
            remaining: 0.05,
            duration: 5.0,
        };
        let out = tick(&mut state, &TickInput::default(), FRAME);
        assert!(out.events.iter().any(|e| matches!(
            e,
            GameEvent::PowerUpChange { kind: PowerUpType::Multiplier, .. }
        )));
        tick(&mut state, &TickInput::default(), FRAME);
        tick(&mut state, &TickInput::default(), FRAME);
        let out = tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.power_up.kind, PowerUpType::None);
        assert!(out.events.contains(&GameEvent::PowerUpChange {
            kind: PowerUpType::None,
            remaining_percent: 0.0
        }));
    }

    #[test]
    fn test_hud_names_difficulty() {
        let mut state = GameState::new(14);
        assert_eq!(state.hud().difficulty, "HACKER");
        state.config.difficulty = crate::sim::config::Difficulty::NetRunner;
        assert_eq!(state.hud().difficulty, "GOD");
        assert_eq!(state.hud().choice_rarities, None);
    }

    #[test]
    fn test_menus_only_from_title_or_game_over() {
        let mut state = GameState::new(10);
        assert!(state.run.status.is_menu());
        assert!(state.open_store());
        assert!(state.run.status.is_menu());
        assert!(!state.start_run());
        assert!(state.close_menu());
        assert!(state.open_character_select());
        assert!(state.return_to_menu());
        state.start_run();
        assert!(!state.run.status.is_menu());
        assert!(!state.open_store());
    }
}
