#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ingest and filter result types.

use std::time::Duration;

use incident_map_analytics_models::SubsetSummary;
use incident_map_incident_models::{ArtifactEntry, MergeOutcome};
use incident_map_source_models::{BatchStats, Encoding};
use serde::{Deserialize, Serialize};

/// Row accounting for one upload, from CSV rows to merged dataset rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Normalization counts.
    #[serde(flatten)]
    pub stats: BatchStats,
    /// Merge counts.
    pub merge: MergeOutcome,
}

/// Result of a completed ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResult {
    /// Dominant year the batch was reduced to.
    pub year: i32,
    /// Encoding the upload was decoded with.
    pub encoding: Encoding,
    /// Row accounting.
    pub summary: BatchSummary,
    /// Artifacts re-rendered for the whole dataset.
    pub artifacts: Vec<ArtifactEntry>,
    /// How long the ingest took.
    pub duration: Duration,
}

/// Result of applying a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResult {
    /// Description of the subset.
    pub summary: SubsetSummary,
    /// Artifacts rendered for the subset.
    pub artifacts: Vec<ArtifactEntry>,
}
