//! Dataset builder: assembles a per-set card dataset from the game
//! client's local card database (or the external catalog as fallback) and
//! the community ratings service, and writes an integrity-checked
//! artifact.

pub mod catalog;
pub mod integrity;
pub mod local;
pub mod ratings;
pub mod sets;

pub use integrity::{integrity_check, load_artifact, scan_artifacts, ArtifactStatus};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use chrono::{NaiveDate, Utc};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::{
    artifact_file_name, ARTIFACT_VERSION, CATALOG_BASE_URL, RATINGS_BASE_URL, REQUEST_TIMEOUT,
    RETRY_BACKOFF,
};
use crate::error::{EngineError, Result};
use crate::models::card::{first_face, normalize_face_separator, zeroed_deck_colors};
use crate::models::{ArtifactMeta, Card, SetArtifact, SetEntry, SetRegistry};

use ratings::RatingsMap;

// ---------------------------------------------------------------------------
// ProgressSink
// ---------------------------------------------------------------------------

/// Cooperative progress reporting for the build. Returning `false`
/// cancels the build at the next suspension point.
pub trait ProgressSink {
    fn update(&mut self, percent: u8, message: &str) -> bool;
}

/// Sink that ignores progress and never cancels.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn update(&mut self, _percent: u8, _message: &str) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// DatasetBuilder
// ---------------------------------------------------------------------------

pub struct DatasetBuilder {
    client: Client,
    data_dir: PathBuf,
    ratings_base: String,
    catalog_base: String,
    database_path: Option<PathBuf>,
}

impl DatasetBuilder {
    /// Create a builder writing artifacts into `data_dir`.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        fs::create_dir_all(data_dir.as_ref())?;
        Ok(Self {
            client,
            data_dir: data_dir.as_ref().to_path_buf(),
            ratings_base: RATINGS_BASE_URL.to_string(),
            catalog_base: CATALOG_BASE_URL.to_string(),
            database_path: None,
        })
    }

    /// Override the remote endpoints (used by tests and mirrors).
    pub fn with_endpoints(mut self, ratings_base: &str, catalog_base: &str) -> Self {
        self.ratings_base = ratings_base.to_string();
        self.catalog_base = catalog_base.to_string();
        self
    }

    /// Use a specific card database instead of searching the platform
    /// install paths.
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Destination path for a set/event artifact.
    pub fn artifact_path(&self, set_code: &str, event_type: &str) -> PathBuf {
        self.data_dir.join(artifact_file_name(set_code, event_type))
    }

    // -- build -------------------------------------------------------------

    /// Assemble the artifact for `(entry, event_type, date range)`.
    ///
    /// A failed local ingest falls back to the catalog; a failed catalog
    /// ingest aborts the build. Partially-failing ratings fetches leave
    /// the affected filters zero-initialized.
    pub fn build(
        &self,
        entry: &SetEntry,
        event_type: &str,
        start_date: &str,
        end_date: &str,
        sink: &mut dyn ProgressSink,
    ) -> Result<SetArtifact> {
        for date in [start_date, end_date] {
            if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                return Err(EngineError::InvalidArgument(format!(
                    "invalid date '{}'; expected YYYY-MM-DD",
                    date
                )));
            }
        }

        if !sink.update(5, "reading local card database") {
            return Err(EngineError::Cancelled);
        }

        let cards = match self.local_ingest(entry) {
            Ok(cards) => cards,
            Err(e) => {
                tracing::warn!("local ingest failed ({}), falling back to catalog", e);
                if !sink.update(5, "local database unavailable, querying catalog") {
                    return Err(EngineError::Cancelled);
                }
                catalog::collect_cards(&self.client, &self.catalog_base, &entry.catalog_codes)?
            }
        };

        let ratings = ratings::fetch_set_ratings(
            &self.client,
            &self.ratings_base,
            entry,
            event_type,
            start_date,
            end_date,
            sink,
        )?;

        if !sink.update(88, "merging ratings") {
            return Err(EngineError::Cancelled);
        }
        let card_ratings = merge_ratings(cards, &ratings, entry.is_specific());

        if !sink.update(92, "fetching color ratings") {
            return Err(EngineError::Cancelled);
        }
        let color_ratings = ratings::fetch_color_ratings(
            &self.client,
            &self.ratings_base,
            entry,
            event_type,
            start_date,
            end_date,
        )
        .unwrap_or_default();

        let artifact = SetArtifact {
            meta: ArtifactMeta {
                version: ARTIFACT_VERSION,
                start_date: start_date.to_string(),
                end_date: end_date.to_string(),
                collection_date: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            },
            card_ratings,
            color_ratings,
        };

        sink.update(100, "build complete");
        Ok(artifact)
    }

    fn local_ingest(&self, entry: &SetEntry) -> Result<Vec<(String, Card)>> {
        let path = match &self.database_path {
            Some(path) => path.clone(),
            None => local::locate_database()?,
        };
        let database = local::LocalCardDatabase::open(path)?;
        database.collect_set_cards(&entry.arena_codes)
    }

    /// Refresh the set registry from the remote set-list endpoints,
    /// falling back to the built-in list when either is unreachable.
    pub fn refresh_registry(&self) -> SetRegistry {
        sets::fetch_registry(&self.client, &self.ratings_base, &self.catalog_base)
    }

    // -- export ------------------------------------------------------------

    /// Write the artifact, verifying through the integrity checker before
    /// the file replaces any previous artifact at the path.
    pub fn export(&self, artifact: &SetArtifact, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(artifact)?;
        fs::write(&tmp, json)?;

        // Re-read through the checker so a bad write never lands.
        let (status, _) = integrity::integrity_check(&tmp);
        if status != ArtifactStatus::Valid {
            let _ = fs::remove_file(&tmp);
            return Err(EngineError::InvalidArtifact(format!(
                "exported artifact failed verification ({:?})",
                status
            )));
        }

        fs::rename(&tmp, path)?;
        tracing::info!("exported artifact to {}", path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Install the merged filter table on every card. With `matching_only`,
/// cards absent from the ratings map are dropped; otherwise they keep a
/// zero-initialized table.
pub fn merge_ratings(
    cards: Vec<(String, Card)>,
    ratings: &RatingsMap,
    matching_only: bool,
) -> HashMap<String, Card> {
    let mut merged = HashMap::new();

    for (id, mut card) in cards {
        let name = normalize_face_separator(&card.name);
        let mut table = zeroed_deck_colors();

        match ratings.get(&name).or_else(|| ratings.get(first_face(&name))) {
            Some(blocks) => {
                for (filter, block) in blocks {
                    table.insert(filter.clone(), *block);
                }
            }
            None => {
                if matching_only {
                    continue;
                }
            }
        }

        card.name = name;
        card.deck_colors = table;
        merged.insert(id, card);
    }

    merged
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// GET a JSON document with a bounded retry count and fixed back-off.
/// The final failure carries the last HTTP status and the URL.
pub(crate) fn get_json_with_retry(client: &Client, url: &str, attempts: u32) -> Result<Value> {
    let mut last_error = EngineError::NotFound(format!("no attempts made for {}", url));

    for attempt in 1..=attempts.max(1) {
        match client.get(url).send() {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response.json()?);
                }
                tracing::warn!("attempt {}/{} for {}: HTTP {}", attempt, attempts, url, status);
                last_error = EngineError::HttpStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                };
            }
            Err(e) => {
                tracing::warn!("attempt {}/{} for {}: {}", attempt, attempts, url, e);
                last_error = EngineError::Http(e);
            }
        }
        if attempt < attempts {
            thread::sleep(RETRY_BACKOFF);
        }
    }

    Err(last_error)
}
