//! The persisted set artifact: merged card ratings plus per-color deck
//! win rates, with a small metadata block.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::card::Card;

// ---------------------------------------------------------------------------
// ArtifactMeta
// ---------------------------------------------------------------------------

/// Artifact metadata. Version-1 files carried a single
/// `date_range: "<start>-><end>"` string; the reader accepts both forms
/// and always re-serializes the split fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMeta")]
pub struct ArtifactMeta {
    pub version: u32,
    pub start_date: String,
    pub end_date: String,
    pub collection_date: String,
}

#[derive(Deserialize)]
struct RawMeta {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    collection_date: Option<String>,
    #[serde(default)]
    date_range: Option<String>,
}

impl From<RawMeta> for ArtifactMeta {
    fn from(raw: RawMeta) -> Self {
        let (mut start, mut end) = (
            raw.start_date.unwrap_or_default(),
            raw.end_date.unwrap_or_default(),
        );
        if start.is_empty() || end.is_empty() {
            if let Some(range) = raw.date_range {
                if let Some((s, e)) = range.split_once("->") {
                    start = s.trim().to_string();
                    end = e.trim().to_string();
                }
            }
        }
        Self {
            version: raw.version,
            start_date: start,
            end_date: end,
            collection_date: raw.collection_date.unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// SetArtifact
// ---------------------------------------------------------------------------

/// The integrity-checked artifact produced by the dataset builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetArtifact {
    pub meta: ArtifactMeta,
    /// Card records keyed by the game client's card id (as a string).
    pub card_ratings: HashMap<String, Card>,
    /// Overall deck win-rate percentage per color combination.
    #[serde(default)]
    pub color_ratings: HashMap<String, f64>,
}

impl SetArtifact {
    /// Look up a card by id.
    pub fn card(&self, id: &str) -> Option<&Card> {
        self.card_ratings.get(id)
    }

    /// Resolve a list of scanner card ids to card records, skipping ids
    /// the artifact does not know.
    pub fn resolve(&self, ids: &[String]) -> Vec<Card> {
        ids.iter()
            .filter_map(|id| self.card_ratings.get(id).cloned())
            .collect()
    }
}
