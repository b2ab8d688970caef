//! Draft-assistance engine for MTG Arena.
//!
//! Tails the game client's append-only log to reconstruct the live draft
//! state, fuses it with a community statistics artifact to score every
//! visible card, and synthesizes candidate decks from the taken pool.
//!
//! # Quick start
//!
//! ```no_run
//! use arena_draft_engine::DraftEngine;
//!
//! let mut engine = DraftEngine::builder().build().unwrap();
//!
//! // Poll once per tick; re-render when the state changed.
//! if engine.tick().unwrap() {
//!     let (pack, pick) = engine.scanner().current_pack_and_pick();
//!     println!("P{}P{}", pack, pick);
//! }
//! ```

pub mod config;
pub mod constants;
pub mod dataset;
pub mod deck;
pub mod error;
pub mod models;
pub mod scanner;
pub mod scoring;
pub mod settings;

#[cfg(feature = "async")]
pub mod async_builder;

#[cfg(feature = "async")]
pub use async_builder::AsyncDatasetBuilder;
pub use dataset::{ArtifactStatus, DatasetBuilder, NullProgress, ProgressSink};
pub use error::{EngineError, Result};
pub use models::{Card, RatingsBlock, RatingsField, SetArtifact, SetEntry, SetRegistry};
pub use scanner::{DraftType, LogScanner};
pub use scoring::{CardRow, ColumnSource, FieldSpec, RowValue, SetMetrics};
pub use settings::{ResultFormat, Settings};

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use models::TierTable;

// ---------------------------------------------------------------------------
// DraftEngineBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`DraftEngine`].
#[derive(Default)]
pub struct DraftEngineBuilder {
    log_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    settings: Settings,
    registry: Option<SetRegistry>,
}

impl DraftEngineBuilder {
    /// Path of the game client's log. Defaults to the first existing
    /// platform candidate.
    pub fn log_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.log_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Directory holding artifacts and tier lists. Defaults to the
    /// platform data directory.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the built-in set registry.
    pub fn registry(mut self, registry: SetRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<DraftEngine> {
        let registry = self.registry.unwrap_or_else(SetRegistry::builtin);
        let data_dir = self.data_dir.unwrap_or_else(config::default_data_dir);

        let log_path = self.log_path.or_else(|| {
            let candidates = config::player_log_search_paths();
            candidates
                .iter()
                .find(|p| p.exists())
                .cloned()
                .or_else(|| candidates.into_iter().next())
        });

        let mut scanner = LogScanner::new(registry.clone());
        if let Some(path) = &log_path {
            scanner.set_log_path(path);
        }

        let tier_tables = models::tier::load_tier_tables(&data_dir);

        Ok(DraftEngine {
            scanner,
            registry,
            settings: self.settings,
            data_dir,
            artifact: None,
            artifact_event: String::new(),
            tier_tables,
        })
    }
}

// ---------------------------------------------------------------------------
// DraftEngine
// ---------------------------------------------------------------------------

/// The engine facade: owns the scanner, the loaded artifact and the
/// consumed settings, and wires the scoring engine and deck suggester to
/// the live draft state. Everything is synchronous; the overlay supplies
/// the polling cadence.
pub struct DraftEngine {
    scanner: LogScanner,
    registry: SetRegistry,
    settings: Settings,
    data_dir: PathBuf,
    artifact: Option<SetArtifact>,
    artifact_event: String,
    tier_tables: HashMap<String, TierTable>,
}

impl DraftEngine {
    pub fn builder() -> DraftEngineBuilder {
        DraftEngineBuilder::default()
    }

    // -- Polling -----------------------------------------------------------

    /// One poll tick: advance the draft-start search, then the variant
    /// parsers. Loads the matching artifact when a new event appears.
    /// Returns whether anything changed.
    pub fn tick(&mut self) -> Result<bool> {
        let started = self.scanner.start_search()?;
        if started {
            self.load_event_artifact();
        }
        let changed = self.scanner.data_search()?;
        Ok(started || changed)
    }

    /// Locate and load the artifact for the active event from the data
    /// directory. Missing artifacts are tolerated; whatever was loaded
    /// before stays in place.
    pub fn load_event_artifact(&mut self) {
        let (draft_type, event_name, sets) = self.scanner.current_event();
        if event_name == self.artifact_event {
            return;
        }

        let event_keyword = match draft_type {
            DraftType::PremierV1 | DraftType::PremierV2 => "PremierDraft",
            DraftType::Quick => "QuickDraft",
            DraftType::Traditional => "TradDraft",
            DraftType::Sealed => "Sealed",
            DraftType::TraditionalSealed => "TradSealed",
            DraftType::Unknown => return,
        };

        let event_name = event_name.to_string();
        for code in sets.to_vec() {
            let path = self
                .data_dir
                .join(config::artifact_file_name(&code, event_keyword));
            match dataset::integrity_check(&path) {
                (ArtifactStatus::Valid, Some(artifact)) => {
                    tracing::info!("loaded artifact {}", path.display());
                    self.artifact = Some(artifact);
                    self.artifact_event = event_name;
                    return;
                }
                (status, _) => {
                    tracing::debug!("artifact {}: {:?}", path.display(), status);
                }
            }
        }
        tracing::warn!("no artifact for event {}", event_name);
    }

    // -- Accessors ---------------------------------------------------------

    pub fn scanner(&self) -> &LogScanner {
        &self.scanner
    }

    pub fn scanner_mut(&mut self) -> &mut LogScanner {
        &mut self.scanner
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn registry(&self) -> &SetRegistry {
        &self.registry
    }

    pub fn artifact(&self) -> Option<&SetArtifact> {
        self.artifact.as_ref()
    }

    /// Install an artifact directly (used when the overlay builds one).
    pub fn set_artifact(&mut self, artifact: SetArtifact) {
        self.artifact = Some(artifact);
    }

    pub fn tier_tables(&self) -> &HashMap<String, TierTable> {
        &self.tier_tables
    }

    /// Re-scan the data directory for tier lists.
    pub fn reload_tier_tables(&mut self) {
        self.tier_tables = models::tier::load_tier_tables(&self.data_dir);
    }

    /// A dataset builder targeting this engine's data directory.
    pub fn dataset_builder(&self) -> Result<DatasetBuilder> {
        DatasetBuilder::new(&self.data_dir)
    }

    // -- Scoring and deck suggestion ---------------------------------------

    /// Win-rate metrics of the loaded artifact.
    pub fn metrics(&self) -> SetMetrics {
        match &self.artifact {
            Some(artifact) => scoring::calculate_set_metrics(
                artifact.card_ratings.values(),
                self.settings.bayesian_enabled,
            ),
            None => SetMetrics::default(),
        }
    }

    /// Resolve scanner card ids through the loaded artifact.
    pub fn resolve_cards(&self, ids: &[String]) -> Vec<Card> {
        match &self.artifact {
            Some(artifact) => artifact.resolve(ids),
            None => Vec::new(),
        }
    }

    /// Score a card list with the `"Auto"` filter resolved against the
    /// taken pool.
    pub fn score(&self, cards: &[Card], filters: &[String], spec: &FieldSpec) -> Vec<CardRow> {
        let metrics = self.metrics();
        let pool = self.resolve_cards(self.scanner.taken_cards());
        let color_ratings = self
            .artifact
            .as_ref()
            .map(|a| a.color_ratings.clone())
            .unwrap_or_default();
        let filters =
            deck::resolve_filters(filters, &pool, &metrics, &self.settings, &color_ratings);
        let (_, pick) = self.scanner.current_pack_and_pick();

        scoring::score_cards(
            cards,
            &filters,
            spec,
            &self.settings,
            &metrics,
            pick,
            &self.tier_tables,
        )
    }

    /// Score the pack currently in front of the player.
    pub fn score_current_pack(&self, filters: &[String], spec: &FieldSpec) -> Vec<CardRow> {
        let (_, pick) = self.scanner.current_pack_and_pick();
        if pick == 0 {
            return Vec::new();
        }
        let seat = ((pick - 1) % 8) as usize;
        let cards = self.resolve_cards(&self.scanner.pack_cards()[seat]);
        self.score(&cards, filters, spec)
    }

    /// Propose decks from the taken pool.
    pub fn suggest_decks(&self) -> Vec<deck::SuggestedDeck> {
        let pool = self.resolve_cards(self.scanner.taken_cards());
        let metrics = self.metrics();
        let color_ratings = self
            .artifact
            .as_ref()
            .map(|a| a.color_ratings.clone())
            .unwrap_or_default();
        deck::suggest_decks(&pool, &metrics, &self.settings, &color_ratings)
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for DraftEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (draft_type, event_name, _) = self.scanner.current_event();
        let (pack, pick) = self.scanner.current_pack_and_pick();
        write!(
            f,
            "DraftEngine(event={}, type={}, P{}P{}, taken={}, artifact={})",
            if event_name.is_empty() { "-" } else { event_name },
            draft_type,
            pack,
            pick,
            self.scanner.taken_cards().len(),
            self.artifact.is_some()
        )
    }
}
