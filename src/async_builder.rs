//! Async wrapper around [`DatasetBuilder`] for use in async runtimes.
//!
//! Dataset builds are HTTP- and disk-bound and can run for minutes; this
//! wrapper dispatches them to a blocking thread pool via
//! [`tokio::task::spawn_blocking`] so the caller's event loop stays free.
//! It never touches scanner state.
//!
//! # Example
//!
//! ```no_run
//! use arena_draft_engine::async_builder::AsyncDatasetBuilder;
//! use arena_draft_engine::models::SetRegistry;
//!
//! async fn refresh_bloomburrow() -> arena_draft_engine::Result<()> {
//!     let builder = AsyncDatasetBuilder::new("./data").await?;
//!     let registry = SetRegistry::builtin();
//!     let entry = registry.get("Bloomburrow").unwrap().clone();
//!
//!     let artifact = builder
//!         .build(entry, "PremierDraft", "2024-07-30", "2024-08-30")
//!         .await?;
//!     println!("{} cards", artifact.card_ratings.len());
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::dataset::{DatasetBuilder, NullProgress};
use crate::error::{EngineError, Result};
use crate::models::{SetArtifact, SetEntry};

// ---------------------------------------------------------------------------
// AsyncDatasetBuilder
// ---------------------------------------------------------------------------

/// Async handle over a [`DatasetBuilder`].
///
/// All operations run on the blocking thread pool; the inner builder is
/// behind a [`Mutex`], serializing concurrent builds (two builds on the
/// same artifact path are not supported).
pub struct AsyncDatasetBuilder {
    inner: Arc<Mutex<DatasetBuilder>>,
}

impl AsyncDatasetBuilder {
    /// Create a builder writing artifacts into `data_dir`.
    pub async fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let dir = data_dir.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || {
            let builder = DatasetBuilder::new(dir)?;
            Ok(Self {
                inner: Arc::new(Mutex::new(builder)),
            })
        })
        .await
        .map_err(|e| EngineError::InvalidArgument(format!("task join error: {e}")))?
    }

    /// Run any sync builder operation on the blocking thread pool.
    ///
    /// The closure receives the locked [`DatasetBuilder`]; use this to
    /// drive a build with a custom progress sink.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&DatasetBuilder) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = inner
                .lock()
                .map_err(|_| EngineError::InvalidArgument("builder lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| EngineError::InvalidArgument(format!("task join error: {e}")))?
    }

    /// Build an artifact without progress reporting.
    pub async fn build(
        &self,
        entry: SetEntry,
        event_type: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<SetArtifact> {
        let event_type = event_type.to_string();
        let start_date = start_date.to_string();
        let end_date = end_date.to_string();
        self.run(move |builder| {
            builder.build(&entry, &event_type, &start_date, &end_date, &mut NullProgress)
        })
        .await
    }

    /// Export an artifact through the write-then-verify path.
    pub async fn export(&self, artifact: SetArtifact, path: PathBuf) -> Result<()> {
        self.run(move |builder| builder.export(&artifact, &path)).await
    }
}
