#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Traffic incident pipeline service.
//!
//! [`IncidentService`] ties the workspace together: uploads are normalized
//! by `incident_map_source`, merged into the canonical dataset by
//! `incident_map_database`, narrowed by `incident_map_analytics`, and drawn
//! by `incident_map_generate`. The service owns the dataset store and the
//! artifact store, each behind its own mutex.

pub mod interactive;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use incident_map_analytics::aggregate::{categories, coordinates, summarize};
use incident_map_analytics::filter::{apply_filter, resolve_selection};
use incident_map_analytics_models::{Categories, FilterRequest};
use incident_map_database::paths::DataPaths;
use incident_map_database::store::DatasetStore;
use incident_map_database::DbError;
use incident_map_generate::{ArtifactStore, RenderError};
use incident_map_incident_models::{ArtifactEntry, ArtifactKind, FilterSelection, IncidentRecord};
use incident_map_ingest_models::{BatchSummary, FilterResult, IngestResult};
use incident_map_source::encoding::resolve_encoding;
use incident_map_source::{SourceError, normalize_upload, registry};
use incident_map_source_models::{ColumnRole, SourceDefinition};

/// Errors surfaced by the service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The upload is not a usable CSV.
    #[error("Format error: {message}")]
    Format {
        /// Description of what went wrong.
        message: String,
    },

    /// A required value in the upload could not be parsed.
    #[error("Parse error in row {row}, column {column}: unparseable value {value:?}")]
    Parse {
        /// 1-based data row number.
        row: u64,
        /// Column the value came from.
        column: ColumnRole,
        /// The offending value.
        value: String,
    },

    /// No row of the upload carried a parseable date.
    #[error("No dominant period: none of the {rows} rows has a parseable date")]
    EmptyPeriod {
        /// Number of rows examined.
        rows: u64,
    },

    /// The canonical dataset file is corrupt.
    #[error("Dataset corruption in {}: {message}", path.display())]
    DatasetCorruption {
        /// Path of the offending file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// The requested artifact has never been rendered.
    #[error("No {kind} artifact has been rendered yet")]
    NotFound {
        /// The requested kind.
        kind: ArtifactKind,
    },

    /// Source configuration or other source error.
    #[error(transparent)]
    Source(SourceError),

    /// Dataset storage error.
    #[error(transparent)]
    Database(DbError),

    /// Artifact rendering error.
    #[error(transparent)]
    Render(RenderError),
}

impl From<SourceError> for ServiceError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Format { message } => Self::Format { message },
            SourceError::Parse { row, column, value } => Self::Parse { row, column, value },
            SourceError::EmptyPeriod { rows } => Self::EmptyPeriod { rows },
            other => Self::Source(other),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::DatasetCorruption { path, message } => {
                Self::DatasetCorruption { path, message }
            }
            other => Self::Database(other),
        }
    }
}

impl From<RenderError> for ServiceError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::NotFound { kind } => Self::NotFound { kind },
            other => Self::Render(other),
        }
    }
}

/// The incident pipeline: ingest, filter, and artifact access.
///
/// Lock order is always dataset store, then artifact store.
pub struct IncidentService {
    source: SourceDefinition,
    store: Mutex<DatasetStore>,
    artifacts: Mutex<ArtifactStore>,
}

impl IncidentService {
    /// Creates a service for `source` with all state under `paths`.
    #[must_use]
    pub fn new(source: SourceDefinition, paths: &DataPaths) -> Self {
        Self {
            source,
            store: Mutex::new(DatasetStore::new(paths.dataset_path())),
            artifacts: Mutex::new(ArtifactStore::new(paths.clone())),
        }
    }

    /// Opens a service using the source definition at `config` (or the
    /// embedded default) and the data directory `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Source`] if the config file cannot be read or
    /// parsed.
    pub fn open(config: Option<&Path>, data_dir: &Path) -> Result<Self, ServiceError> {
        let source = match config {
            Some(path) => registry::load_source(path)?,
            None => registry::default_source(),
        };
        let paths = DataPaths::new(data_dir);
        log::info!(
            "Using source {} with data directory {}",
            source.id,
            paths.root().display()
        );
        Ok(Self::new(source, &paths))
    }

    /// Returns the active source definition.
    #[must_use]
    pub const fn source(&self) -> &SourceDefinition {
        &self.source
    }

    /// Normalizes one uploaded CSV, merges it into the canonical dataset,
    /// and re-renders both artifacts for the whole dataset.
    ///
    /// `declared_encoding` falls back to the source's default encoding.
    /// The merged dataset is rendered before it is committed, so any error
    /// (normalization, rendering, or the final write) leaves the canonical
    /// dataset unchanged.
    ///
    /// # Errors
    ///
    /// * [`ServiceError::Format`] for an unknown encoding, undecodable
    ///   bytes, missing columns, or malformed CSV.
    /// * [`ServiceError::Parse`] for an unparseable time under the
    ///   reject-batch policy.
    /// * [`ServiceError::EmptyPeriod`] if no row has a parseable date.
    /// * [`ServiceError::DatasetCorruption`] if the existing dataset is
    ///   corrupt.
    /// * [`ServiceError::Render`] or [`ServiceError::Database`] if the
    ///   artifacts or the dataset cannot be written.
    ///
    /// # Panics
    ///
    /// Panics if a service mutex is poisoned.
    pub fn ingest(
        &self,
        bytes: &[u8],
        declared_encoding: Option<&str>,
    ) -> Result<IngestResult, ServiceError> {
        let start = Instant::now();
        let encoding = resolve_encoding(declared_encoding, self.source.default_encoding)?;
        let batch = normalize_upload(bytes, encoding, &self.source)?;

        let store = self.lock_store();
        let plan = store.plan_merge(&batch.records)?;

        let artifacts = self.lock_artifacts();
        let rendered = self.render(&artifacts, plan.records(), &FilterSelection::everything())?;
        let merge = store.commit(plan)?;

        let result = IngestResult {
            year: batch.year,
            encoding,
            summary: BatchSummary {
                stats: batch.stats,
                merge,
            },
            artifacts: rendered,
            duration: start.elapsed(),
        };
        log::info!(
            "Ingested {} rows for {} in {:.1}s ({} new, dataset now {} rows)",
            result.summary.stats.rows_kept,
            result.year,
            result.duration.as_secs_f64(),
            result.summary.merge.rows_added,
            result.summary.merge.rows_after,
        );
        Ok(result)
    }

    /// Narrows the canonical dataset by `request` and renders both
    /// artifacts for the subset.
    ///
    /// Unknown selection values degrade to "all". An uninitialized dataset
    /// behaves as an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::DatasetCorruption`] if the dataset is
    /// corrupt, or a wrapped error if rendering fails.
    ///
    /// # Panics
    ///
    /// Panics if a service mutex is poisoned.
    pub fn apply_filter(&self, request: &FilterRequest) -> Result<FilterResult, ServiceError> {
        let store = self.lock_store();
        let dataset = store.load()?.unwrap_or_default();

        let selection = resolve_selection(request, &categories(&dataset));
        let subset = apply_filter(&dataset, &selection);
        let summary = summarize(&subset, &selection);

        let artifacts = self.lock_artifacts();
        let rendered = artifacts.render(&summary, &coordinates(&subset), &self.source.map)?;

        Ok(FilterResult {
            summary,
            artifacts: rendered,
        })
    }

    /// Returns the bytes of the most recently rendered artifact of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if no render has occurred yet, or
    /// [`ServiceError::Render`] if the manifest or file cannot be read.
    ///
    /// # Panics
    ///
    /// Panics if the artifact mutex is poisoned.
    pub fn get_artifact(&self, kind: ArtifactKind) -> Result<Vec<u8>, ServiceError> {
        Ok(self.lock_artifacts().read(kind)?)
    }

    /// Returns the manifest entry of the most recent render of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Render`] if the manifest cannot be read.
    ///
    /// # Panics
    ///
    /// Panics if the artifact mutex is poisoned.
    pub fn artifact_entry(
        &self,
        kind: ArtifactKind,
    ) -> Result<Option<ArtifactEntry>, ServiceError> {
        Ok(self.lock_artifacts().entry(kind)?)
    }

    /// Lists the distinct values present in the dataset for each filter
    /// dimension.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::DatasetCorruption`] if the dataset is
    /// corrupt.
    ///
    /// # Panics
    ///
    /// Panics if the store mutex is poisoned.
    pub fn categories(&self) -> Result<Categories, ServiceError> {
        let dataset = self.lock_store().load()?.unwrap_or_default();
        Ok(categories(&dataset))
    }

    fn render(
        &self,
        artifacts: &ArtifactStore,
        records: &[IncidentRecord],
        selection: &FilterSelection,
    ) -> Result<Vec<ArtifactEntry>, ServiceError> {
        let subset = if selection.is_everything() {
            records.iter().collect()
        } else {
            apply_filter(records, selection)
        };
        let summary = summarize(&subset, selection);
        Ok(artifacts.render(&summary, &coordinates(&subset), &self.source.map)?)
    }

    fn lock_store(&self) -> MutexGuard<'_, DatasetStore> {
        self.store.lock().expect("dataset store mutex poisoned")
    }

    fn lock_artifacts(&self) -> MutexGuard<'_, ArtifactStore> {
        self.artifacts.lock().expect("artifact store mutex poisoned")
    }
}
