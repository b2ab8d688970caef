//! Archetype identities for suggested decks.

use serde::{Deserialize, Serialize};

use crate::settings::{CurveTemplate, Settings};

/// The three deck shapes the suggester tries per color pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Aggro,
    Mid,
    Control,
}

impl Archetype {
    pub const ALL: [Archetype; 3] = [Archetype::Aggro, Archetype::Mid, Archetype::Control];

    pub fn as_str(self) -> &'static str {
        match self {
            Archetype::Aggro => "Aggro",
            Archetype::Mid => "Mid",
            Archetype::Control => "Control",
        }
    }

    /// Curve template for this archetype from the consumed settings.
    pub fn template(self, settings: &Settings) -> &CurveTemplate {
        match self {
            Archetype::Aggro => &settings.deck_aggro,
            Archetype::Mid => &settings.deck_mid,
            Archetype::Control => &settings.deck_control,
        }
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
