//! Runtime settings consumed by the engine.
//!
//! The overlay owns persistence (a plain JSON blob); the engine only
//! deserializes and reads. Every field carries a default so partial blobs
//! from older overlay versions keep working.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ResultFormat
// ---------------------------------------------------------------------------

/// How win-rate fields are surfaced by the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResultFormat {
    /// Raw win-rate percentage.
    #[default]
    WinRate,
    /// 0-5 rating projected from the set's win-rate distribution.
    Rating,
    /// Letter grade from the fixed deviation table.
    Grade,
}

// ---------------------------------------------------------------------------
// CurveTemplate
// ---------------------------------------------------------------------------

/// Per-archetype deck-building constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveTemplate {
    /// Minimum creatures per cmc bucket; cmc >= 6 clamps into the last slot.
    pub distribution: [u32; 7],
    /// Non-land cards the build fills up to.
    pub maximum_card_count: u32,
    /// Creature count the build aims for.
    pub recommended_creature_count: u32,
    /// Ceiling on the mean creature cmc.
    pub cmc_average: f64,
}

impl CurveTemplate {
    pub fn aggro() -> Self {
        Self {
            distribution: [0, 2, 5, 4, 2, 0, 0],
            maximum_card_count: 24,
            recommended_creature_count: 17,
            cmc_average: 2.40,
        }
    }

    pub fn mid() -> Self {
        Self {
            distribution: [0, 0, 4, 3, 2, 1, 0],
            maximum_card_count: 23,
            recommended_creature_count: 15,
            cmc_average: 3.04,
        }
    }

    pub fn control() -> Self {
        Self {
            distribution: [0, 0, 3, 2, 2, 1, 1],
            maximum_card_count: 22,
            recommended_creature_count: 14,
            cmc_average: 3.68,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// The consumed configuration surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Output format for win-rate fields.
    pub result_format: ResultFormat,
    /// Smooth win rates toward a 20-game, 50% prior.
    pub bayesian_enabled: bool,
    /// Use printed color identity instead of mana-cost symbols for the
    /// colors column.
    pub color_identity_enabled: bool,
    /// Fewest creatures a color pair needs before a deck is attempted.
    pub minimum_creature_count: u32,
    /// Fewest non-creature spells a color pair needs.
    pub minimum_noncreature_count: u32,
    /// Fewest playables (creatures + non-creature spells) overall.
    pub minimum_deck_total: u32,
    /// Suggested decks rating below this are dropped.
    pub ratings_threshold: f64,
    /// Largest color-combination size auto-detection considers.
    pub colors_max: usize,
    /// Optional ALSA tie-break weight; 0 disables.
    pub alsa_weight: f64,
    /// Optional IWD tie-break weight; 0 disables.
    pub iwd_weight: f64,
    pub deck_aggro: CurveTemplate,
    pub deck_mid: CurveTemplate,
    pub deck_control: CurveTemplate,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            result_format: ResultFormat::WinRate,
            bayesian_enabled: false,
            color_identity_enabled: false,
            minimum_creature_count: 9,
            minimum_noncreature_count: 6,
            minimum_deck_total: 22,
            ratings_threshold: 500.0,
            colors_max: 3,
            alsa_weight: 0.0,
            iwd_weight: 0.0,
            deck_aggro: CurveTemplate::aggro(),
            deck_mid: CurveTemplate::mid(),
            deck_control: CurveTemplate::control(),
        }
    }
}
