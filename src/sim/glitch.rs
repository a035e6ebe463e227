//! Glitch modifiers
//!
//! Permanent-for-the-run world-rule overrides picked at each level-up. The
//! run keeps an append-only list; [`GlitchEffects`] folds it into the values
//! the rest of the simulation reads. Numeric effects multiply, control
//! inversion toggles. A glitch picked twice counts once.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlitchType {
    Giant,
    Tiny,
    MoonGravity,
    HeavyMetal,
    DrunkCam,
    WideLens,
    Disco,
    SpeedDemon,
    InvertedColors,
    PixelHell,
    WireFrame,
    AustraliaMode,
    Earthquake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Common,
    Rare,
    Legendary,
    Cursed,
}

impl GlitchType {
    pub const ALL: [GlitchType; 13] = [
        GlitchType::Giant,
        GlitchType::Tiny,
        GlitchType::MoonGravity,
        GlitchType::HeavyMetal,
        GlitchType::DrunkCam,
        GlitchType::WideLens,
        GlitchType::Disco,
        GlitchType::SpeedDemon,
        GlitchType::InvertedColors,
        GlitchType::PixelHell,
        GlitchType::WireFrame,
        GlitchType::AustraliaMode,
        GlitchType::Earthquake,
    ];

    /// Parse a glitch id such as `"MOON_GRAVITY"`. Unknown ids yield `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.id() == id)
    }

    pub fn id(&self) -> &'static str {
        match self {
            GlitchType::Giant => "GIANT",
            GlitchType::Tiny => "TINY",
            GlitchType::MoonGravity => "MOON_GRAVITY",
            GlitchType::HeavyMetal => "HEAVY_METAL",
            GlitchType::DrunkCam => "DRUNK_CAM",
            GlitchType::WideLens => "WIDE_LENS",
            GlitchType::Disco => "DISCO",
            GlitchType::SpeedDemon => "SPEED_DEMON",
            GlitchType::InvertedColors => "INVERTED_COLORS",
            GlitchType::PixelHell => "PIXEL_HELL",
            GlitchType::WireFrame => "WIRE_FRAME",
            GlitchType::AustraliaMode => "AUSTRALIA_MODE",
            GlitchType::Earthquake => "EARTHQUAKE",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GlitchType::Giant => "Ego Trip",
            GlitchType::Tiny => "Ant-Man",
            GlitchType::MoonGravity => "Space X",
            GlitchType::HeavyMetal => "Fat",
            GlitchType::DrunkCam => "Vodka",
            GlitchType::WideLens => "GoPro",
            GlitchType::Disco => "Epilepsy",
            GlitchType::SpeedDemon => "Meth",
            GlitchType::InvertedColors => "Negative",
            GlitchType::PixelHell => "144p",
            GlitchType::WireFrame => "The Matrix",
            GlitchType::AustraliaMode => "Upside Down",
            GlitchType::Earthquake => "Parkinson",
        }
    }

    pub fn rarity(&self) -> Rarity {
        match self {
            GlitchType::MoonGravity | GlitchType::WideLens => Rarity::Common,
            GlitchType::Tiny | GlitchType::HeavyMetal => Rarity::Rare,
            GlitchType::Disco | GlitchType::SpeedDemon | GlitchType::WireFrame => {
                Rarity::Legendary
            }
            GlitchType::Giant
            | GlitchType::DrunkCam
            | GlitchType::InvertedColors
            | GlitchType::PixelHell
            | GlitchType::AustraliaMode
            | GlitchType::Earthquake => Rarity::Cursed,
        }
    }
}

/// Presentation-only perturbations the renderer reads
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualFlags {
    /// Camera roll in radians (upside-down world)
    pub camera_roll: f32,
    /// Target field of view in degrees
    pub fov: f32,
    /// Render resolution scale (1 = native)
    pub pixel_ratio: f32,
    pub wireframe: bool,
    pub inverted_colors: bool,
    pub disco: bool,
    pub drunk_cam: bool,
    pub earthquake: bool,
}

/// The folded effect of every active glitch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlitchEffects {
    /// LEFT/RIGHT swapped
    pub invert_controls: bool,
    pub gravity_scale: f32,
    pub jump_scale: f32,
    pub speed_multiplier: f32,
    pub score_multiplier: f32,
    /// Player size (also scales the hit box and coin reach)
    pub player_scale: f32,
    pub visuals: VisualFlags,
}

impl Default for GlitchEffects {
    fn default() -> Self {
        Self {
            invert_controls: false,
            gravity_scale: 1.0,
            jump_scale: 1.0,
            speed_multiplier: 1.0,
            score_multiplier: 1.0,
            player_scale: 1.0,
            visuals: VisualFlags {
                camera_roll: 0.0,
                fov: 60.0,
                pixel_ratio: 1.0,
                ..Default::default()
            },
        }
    }
}

impl GlitchEffects {
    pub fn from_glitches(glitches: &[GlitchType]) -> Self {
        let mut fx = Self::default();
        for (i, glitch) in glitches.iter().enumerate() {
            if glitches[..i].contains(glitch) {
                continue;
            }
            fx.apply(*glitch);
        }
        fx
    }

    fn apply(&mut self, glitch: GlitchType) {
        match glitch {
            GlitchType::Giant => self.player_scale *= 2.5,
            GlitchType::Tiny => self.player_scale *= 0.4,
            GlitchType::MoonGravity => {
                self.gravity_scale *= 0.4;
                self.jump_scale *= 0.6;
            }
            GlitchType::HeavyMetal => {
                self.gravity_scale *= 2.0;
                self.jump_scale *= 1.2;
            }
            GlitchType::SpeedDemon => {
                self.speed_multiplier *= 1.2;
                self.score_multiplier *= 2.0;
            }
            GlitchType::AustraliaMode => {
                self.invert_controls ^= true;
                self.score_multiplier *= 1.5;
                self.visuals.camera_roll = std::f32::consts::PI;
            }
            GlitchType::WireFrame => {
                self.score_multiplier *= 1.2;
                self.visuals.wireframe = true;
            }
            GlitchType::DrunkCam => self.visuals.drunk_cam = true,
            GlitchType::WideLens => self.visuals.fov = 110.0,
            GlitchType::Disco => self.visuals.disco = true,
            GlitchType::InvertedColors => self.visuals.inverted_colors = true,
            GlitchType::PixelHell => self.visuals.pixel_ratio = 0.2,
            GlitchType::Earthquake => self.visuals.earthquake = true,
        }
    }
}

/// A level-up prompt; each option grants one glitch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NarrativeScenario {
    pub id: &'static str,
    pub options: [GlitchType; 3],
}

pub const NARRATIVE_SCENARIOS: [NarrativeScenario; 8] = [
    NarrativeScenario {
        id: "S1",
        options: [GlitchType::PixelHell, GlitchType::Giant, GlitchType::InvertedColors],
    },
    NarrativeScenario {
        id: "S2",
        options: [GlitchType::DrunkCam, GlitchType::HeavyMetal, GlitchType::WireFrame],
    },
    NarrativeScenario {
        id: "S3",
        options: [GlitchType::WideLens, GlitchType::PixelHell, GlitchType::SpeedDemon],
    },
    NarrativeScenario {
        id: "S4",
        options: [GlitchType::Disco, GlitchType::AustraliaMode, GlitchType::SpeedDemon],
    },
    NarrativeScenario {
        id: "S5",
        options: [GlitchType::Earthquake, GlitchType::Tiny, GlitchType::WireFrame],
    },
    NarrativeScenario {
        id: "S6",
        options: [GlitchType::InvertedColors, GlitchType::Earthquake, GlitchType::MoonGravity],
    },
    NarrativeScenario {
        id: "S7",
        options: [GlitchType::AustraliaMode, GlitchType::HeavyMetal, GlitchType::PixelHell],
    },
    NarrativeScenario {
        id: "S8",
        options: [GlitchType::DrunkCam, GlitchType::WireFrame, GlitchType::Disco],
    },
];

/// Scenario by index, wrapping out-of-range indices
pub fn scenario(index: usize) -> &'static NarrativeScenario {
    &NARRATIVE_SCENARIOS[index % NARRATIVE_SCENARIOS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_glitches_is_identity() {
        let fx = GlitchEffects::from_glitches(&[]);
        assert_eq!(fx, GlitchEffects::default());
        assert!(!fx.invert_controls);
    }

    #[test]
    fn test_numeric_effects_multiply() {
        let fx = GlitchEffects::from_glitches(&[
            GlitchType::SpeedDemon,
            GlitchType::AustraliaMode,
            GlitchType::WireFrame,
        ]);
        assert!((fx.score_multiplier - 2.0 * 1.5 * 1.2).abs() < 1e-5);
        assert!((fx.speed_multiplier - 1.2).abs() < 1e-6);
        assert!(fx.invert_controls);

        let fx = GlitchEffects::from_glitches(&[GlitchType::Giant, GlitchType::Tiny]);
        assert!((fx.player_scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_duplicate_glitch_counts_once() {
        let once = GlitchEffects::from_glitches(&[GlitchType::AustraliaMode]);
        let twice =
            GlitchEffects::from_glitches(&[GlitchType::AustraliaMode, GlitchType::AustraliaMode]);
        assert_eq!(once, twice);
        assert!(twice.invert_controls);
    }

    #[test]
    fn test_gravity_glitches() {
        let fx = GlitchEffects::from_glitches(&[GlitchType::MoonGravity]);
        assert!((fx.gravity_scale - 0.4).abs() < 1e-6);
        assert!((fx.jump_scale - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_ids_round_trip() {
        for g in GlitchType::ALL {
            assert_eq!(GlitchType::from_id(g.id()), Some(g));
            let json = serde_json::to_string(&g).unwrap();
            assert_eq!(json, format!("\"{}\"", g.id()));
        }
        assert_eq!(GlitchType::from_id("BLUE_SCREEN"), None);
    }

    #[test]
    fn test_scenario_wraps() {
        assert_eq!(scenario(0).id, "S1");
        assert_eq!(scenario(9).id, "S2");
    }
}
