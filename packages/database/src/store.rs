//! The canonical dataset file.
//!
//! The dataset is a deduplicated, append-only union of every merged batch.
//! It only shrinks through [`DatasetStore::replace`]. The store itself does
//! no locking; callers serialize access.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Datelike as _;
use incident_map_incident_models::{IncidentRecord, MergeOutcome};

use crate::DbError;
use crate::paths::{ensure_dir, staging_path};

/// Header row of the backing CSV file. Matches [`IncidentRecord`]'s field
/// names.
pub const DATASET_HEADER: [&str; 7] = [
    "date",
    "hour",
    "neighborhood",
    "road_design",
    "longitude",
    "latitude",
    "year",
];

/// A merge computed in memory but not yet written.
#[derive(Debug, Clone)]
pub struct MergePlan {
    records: Vec<IncidentRecord>,
    outcome: MergeOutcome,
}

impl MergePlan {
    /// The dataset as it will be after the merge.
    #[must_use]
    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    /// Row counts for the merge.
    #[must_use]
    pub const fn outcome(&self) -> MergeOutcome {
        self.outcome
    }
}

/// Handle to the canonical dataset file.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    path: PathBuf,
}

impl DatasetStore {
    /// Creates a store backed by `path`. Nothing is read or written until
    /// the first operation.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the canonical dataset.
    ///
    /// Returns `Ok(None)` if nothing has ever been stored.
    ///
    /// # Errors
    ///
    /// * [`DbError::DatasetCorruption`] if the file has the wrong header, a
    ///   row that does not deserialize, an hour outside `0..=23`, a year that
    ///   disagrees with its date, or duplicate rows.
    /// * [`DbError::Io`] if the file exists but cannot be read.
    pub fn load(&self) -> Result<Option<Vec<IncidentRecord>>, DbError> {
        if !self.path.exists() {
            log::debug!("No dataset at {}", self.path.display());
            return Ok(None);
        }

        let bytes = std::fs::read(&self.path)?;
        let records = self.parse(&bytes)?;
        log::debug!(
            "Loaded {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(Some(records))
    }

    /// Appends `batch` to the dataset, drops exact duplicates (keeping the
    /// first occurrence), and persists the result.
    ///
    /// Merging the same batch twice leaves the dataset unchanged the second
    /// time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the existing dataset is corrupt or the write
    /// fails. The canonical file is untouched on error.
    pub fn merge(&self, batch: &[IncidentRecord]) -> Result<MergeOutcome, DbError> {
        let plan = self.plan_merge(batch)?;
        self.commit(plan)
    }

    /// Computes the result of merging `batch` without writing anything.
    ///
    /// Pass the plan to [`Self::commit`] to persist it. Callers must hold
    /// the same lock across both calls.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the existing dataset is corrupt or unreadable.
    pub fn plan_merge(&self, batch: &[IncidentRecord]) -> Result<MergePlan, DbError> {
        let existing = self.load()?.unwrap_or_default();
        let rows_before = existing.len() as u64;

        let mut combined = existing;
        combined.extend_from_slice(batch);
        let records = dedup_records(combined);

        let outcome = MergeOutcome {
            rows_before,
            rows_offered: batch.len() as u64,
            rows_added: records.len() as u64 - rows_before,
            rows_after: records.len() as u64,
        };
        Ok(MergePlan { records, outcome })
    }

    /// Persists a plan from [`Self::plan_merge`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails. The canonical file is
    /// untouched on error.
    pub fn commit(&self, plan: MergePlan) -> Result<MergeOutcome, DbError> {
        let MergePlan { records, outcome } = plan;
        self.write(&records)?;
        log::info!(
            "Merged {} rows into {} ({} new, {} total)",
            outcome.rows_offered,
            self.path.display(),
            outcome.rows_added,
            outcome.rows_after,
        );
        Ok(outcome)
    }

    /// Replaces the whole dataset with `records` (deduplicated).
    ///
    /// Returns the number of rows stored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails.
    pub fn replace(&self, records: Vec<IncidentRecord>) -> Result<u64, DbError> {
        let records = dedup_records(records);
        self.write(&records)?;
        log::info!(
            "Replaced {} with {} rows",
            self.path.display(),
            records.len()
        );
        Ok(records.len() as u64)
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<IncidentRecord>, DbError> {
        let mut reader = csv::ReaderBuilder::new().from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| self.corruption(format!("unreadable header: {e}")))?;
        if headers.iter().ne(DATASET_HEADER) {
            return Err(self.corruption(format!(
                "unexpected header {:?}, expected {}",
                headers.iter().collect::<Vec<_>>(),
                DATASET_HEADER.join(",")
            )));
        }

        let mut seen = HashSet::new();
        let mut records = Vec::new();
        for (i, result) in reader.deserialize::<IncidentRecord>().enumerate() {
            let row = i + 1;
            let record = result.map_err(|e| self.corruption(format!("row {row}: {e}")))?;

            if record.hour > 23 {
                return Err(self.corruption(format!("row {row}: hour {} out of range", record.hour)));
            }
            if record.year != record.date.year() {
                return Err(self.corruption(format!(
                    "row {row}: year {} does not match date {}",
                    record.year, record.date
                )));
            }
            if !seen.insert(record.key()) {
                return Err(self.corruption(format!("row {row}: duplicate row")));
            }

            records.push(record);
        }

        Ok(records)
    }

    /// Writes `records` to the staging file, then renames it over the
    /// canonical file.
    fn write(&self, records: &[IncidentRecord]) -> Result<(), DbError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }

        let tmp_path = staging_path(&self.path);
        if let Err(e) = write_csv(&tmp_path, records) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn corruption(&self, message: String) -> DbError {
        DbError::DatasetCorruption {
            path: self.path.clone(),
            message,
        }
    }
}

fn write_csv(path: &Path, records: &[IncidentRecord]) -> Result<(), DbError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(DATASET_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Removes exact duplicate rows, keeping the first occurrence and
/// preserving order.
#[must_use]
pub fn dedup_records(records: Vec<IncidentRecord>) -> Vec<IncidentRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.key()))
        .collect()
}
