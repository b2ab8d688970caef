//! User-supplied tier lists: hand-maintained ratings shown alongside the
//! statistical columns.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// TierTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierMeta {
    pub label: String,
    pub set: String,
    pub description: String,
    pub version: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierEntry {
    pub rating: String,
    pub comment: String,
}

/// One imported tier list: metadata plus a name-keyed ratings map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    #[serde(default)]
    pub meta: TierMeta,
    #[serde(default)]
    pub ratings: HashMap<String, TierEntry>,
}

impl TierTable {
    /// Entry for a card, looked up by its front face.
    pub fn entry(&self, front_face: &str) -> Option<&TierEntry> {
        self.ratings.get(front_face)
    }
}

/// Parse a single tier-list file.
pub fn load_tier_table(path: &Path) -> Result<TierTable> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Load every `Tier_*.json` in a directory, keyed by file stem.
/// Unreadable files are skipped with a warning.
pub fn load_tier_tables(dir: &Path) -> HashMap<String, TierTable> {
    let mut tables = HashMap::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return tables,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !stem.starts_with("Tier_") || path.extension().and_then(|e| e.to_str()) != Some("json")
        {
            continue;
        }
        match load_tier_table(&path) {
            Ok(table) => {
                tables.insert(stem.to_string(), table);
            }
            Err(e) => {
                tracing::warn!("skipping tier list {}: {}", path.display(), e);
            }
        }
    }

    tables
}
