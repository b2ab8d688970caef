//! Artifact integrity checking. This doubles as the artifact read path:
//! anything the engine loads has passed the same checks the exporter
//! re-verifies after writing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ARTIFACT_SUFFIX, RECOGNIZED_ARTIFACT_VERSIONS};
use crate::constants::{ARTIFACT_MINIMUM_CARDS, DECK_COLOR_FILTERS};
use crate::error::{EngineError, Result};
use crate::models::SetArtifact;

// ---------------------------------------------------------------------------
// ArtifactStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStatus {
    Valid,
    /// No file at the path.
    Missing,
    /// Present but unparseable, unrecognized, or too small to trust.
    Unreadable,
}

// ---------------------------------------------------------------------------
// integrity_check
// ---------------------------------------------------------------------------

/// Validate an artifact file.
///
/// A file is `Valid` when it parses into the artifact schema, carries a
/// recognized version and both range dates, holds at least 100 cards, and
/// every card exposes the full filter table. The parsed artifact is
/// returned alongside `Valid`.
pub fn integrity_check(path: &Path) -> (ArtifactStatus, Option<SetArtifact>) {
    if !path.exists() {
        return (ArtifactStatus::Missing, None);
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!("artifact {} unreadable: {}", path.display(), e);
            return (ArtifactStatus::Unreadable, None);
        }
    };

    let artifact: SetArtifact = match serde_json::from_str(&contents) {
        Ok(artifact) => artifact,
        Err(e) => {
            tracing::warn!("artifact {} failed to parse: {}", path.display(), e);
            return (ArtifactStatus::Unreadable, None);
        }
    };

    if let Err(reason) = validate(&artifact) {
        tracing::warn!("artifact {} rejected: {}", path.display(), reason);
        return (ArtifactStatus::Unreadable, None);
    }

    (ArtifactStatus::Valid, Some(artifact))
}

fn validate(artifact: &SetArtifact) -> std::result::Result<(), String> {
    if !RECOGNIZED_ARTIFACT_VERSIONS.contains(&artifact.meta.version) {
        return Err(format!("unrecognized version {}", artifact.meta.version));
    }
    if artifact.meta.start_date.is_empty() || artifact.meta.end_date.is_empty() {
        return Err("missing date range".to_string());
    }
    if artifact.card_ratings.len() < ARTIFACT_MINIMUM_CARDS {
        return Err(format!(
            "only {} cards (minimum {})",
            artifact.card_ratings.len(),
            ARTIFACT_MINIMUM_CARDS
        ));
    }
    for (id, card) in &artifact.card_ratings {
        if card.name.is_empty() {
            return Err(format!("card {} has no name", id));
        }
        for filter in DECK_COLOR_FILTERS {
            if !card.deck_colors.contains_key(filter) {
                return Err(format!("card {} missing filter {}", card.name, filter));
            }
        }
    }
    Ok(())
}

/// Load an artifact, converting any non-valid status into an error.
pub fn load_artifact(path: &Path) -> Result<SetArtifact> {
    match integrity_check(path) {
        (ArtifactStatus::Valid, Some(artifact)) => Ok(artifact),
        (ArtifactStatus::Missing, _) => Err(EngineError::NotFound(format!(
            "no artifact at {}",
            path.display()
        ))),
        _ => Err(EngineError::InvalidArtifact(format!(
            "artifact at {} failed the integrity check",
            path.display()
        ))),
    }
}

/// Artifact files present in a data directory.
pub fn scan_artifacts(dir: &Path) -> Vec<PathBuf> {
    let suffix = format!("_{}.json", ARTIFACT_SUFFIX);
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| n.ends_with(&suffix))
                        .unwrap_or(false)
                })
                .collect()
        })
        .unwrap_or_default();
    paths.sort();
    paths
}
