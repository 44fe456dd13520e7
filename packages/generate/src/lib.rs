#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Artifact rendering for filtered incident subsets.
//!
//! [`ArtifactStore::render`] draws both artifacts for one subset (the
//! Leaflet heat map from [`heatmap`] and the hourly SVG chart from
//! [`chart`]), writes them atomically to their fixed paths under
//! `data/generated/`, and records each render in `manifest.json`.
//! [`ArtifactStore::read`] serves the latest render of a kind.

pub mod chart;
pub mod heatmap;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use incident_map_analytics_models::{GeoPoint, SubsetSummary};
use incident_map_database::paths::{DataPaths, ensure_dir, staging_path, write_atomic};
use incident_map_incident_models::{ArtifactEntry, ArtifactKind};
use incident_map_source_models::MapConfig;
use serde::{Deserialize, Serialize};

/// Current manifest format version.
const MANIFEST_VERSION: u32 = 1;

/// Errors that can occur while rendering or serving artifacts.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The requested artifact has never been rendered.
    #[error("No {kind} artifact has been rendered yet")]
    NotFound {
        /// The requested kind.
        kind: ArtifactKind,
    },

    /// Chart layout or drawing failed.
    #[error("Chart error: {message}")]
    Chart {
        /// Description of what went wrong.
        message: String,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Artifact manifest stored at `data/generated/manifest.json`.
///
/// Records what each artifact file currently shows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    version: u32,
    /// Map of artifact kind to its latest render.
    artifacts: BTreeMap<String, ArtifactEntry>,
}

impl Manifest {
    /// Returns the latest render of `kind`, if any.
    #[must_use]
    pub fn entry(&self, kind: ArtifactKind) -> Option<&ArtifactEntry> {
        self.artifacts.get(kind.as_ref())
    }
}

/// Renders, stores, and serves artifacts under a data directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    paths: DataPaths,
}

impl ArtifactStore {
    /// Creates a store writing under `paths.generated_dir()`.
    #[must_use]
    pub const fn new(paths: DataPaths) -> Self {
        Self { paths }
    }

    /// Renders the heat map and hourly chart for one subset, overwriting
    /// the previous artifacts.
    ///
    /// Both artifacts are drawn and staged before either replaces its
    /// file, so a drawing or staging failure leaves the previous pair and
    /// the manifest in place.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if drawing or writing fails. An unreadable
    /// manifest is replaced.
    pub fn render(
        &self,
        summary: &SubsetSummary,
        points: &[GeoPoint],
        map: &MapConfig,
    ) -> Result<Vec<ArtifactEntry>, RenderError> {
        let map_title = format!("Mapa de Calor de Accidentes - {}", summary.title);
        let chart_title = format!("Accidentes por Hora - {}", summary.title);
        let html = heatmap::render_heatmap(points, &map_title, map)?;
        let svg = chart::render_hourly_chart(&summary.hourly, &chart_title)?;

        ensure_dir(&self.paths.generated_dir())?;
        let mut manifest = match load_manifest(&self.paths.manifest_path()) {
            Ok(manifest) => manifest.unwrap_or_default(),
            Err(e) => {
                log::warn!("Replacing unreadable manifest: {e}");
                Manifest::default()
            }
        };
        manifest.version = MANIFEST_VERSION;

        let outputs = [
            (ArtifactKind::Map, map_title, html),
            (ArtifactKind::Chart, chart_title, svg),
        ];

        let mut staged = Vec::with_capacity(outputs.len());
        for (kind, _, contents) in &outputs {
            let tmp_path = staging_path(&self.paths.artifact_path(*kind));
            if let Err(e) = std::fs::write(&tmp_path, contents) {
                let _ = std::fs::remove_file(&tmp_path);
                discard(&staged);
                return Err(e.into());
            }
            staged.push(tmp_path);
        }

        let rendered_at = chrono::Utc::now().to_rfc3339();
        let mut entries = Vec::with_capacity(outputs.len());
        for ((kind, title, _), tmp_path) in outputs.into_iter().zip(&staged) {
            let path = self.paths.artifact_path(kind);
            std::fs::rename(tmp_path, &path)?;
            log::info!("Wrote {kind} artifact to {}", path.display());

            let entry = ArtifactEntry {
                kind,
                file: kind.file_name().to_string(),
                rendered_at: rendered_at.clone(),
                rows: summary.total_rows,
                title,
                selection: summary.selection.clone(),
            };
            manifest
                .artifacts
                .insert(kind.as_ref().to_string(), entry.clone());
            entries.push(entry);
        }

        save_manifest(&self.paths.manifest_path(), &manifest)?;
        Ok(entries)
    }

    /// Returns the bytes of the latest render of `kind`.
    ///
    /// The manifest is authoritative: artifact files without a manifest
    /// entry are never served.
    ///
    /// # Errors
    ///
    /// * [`RenderError::NotFound`] if the manifest has no entry for `kind`
    ///   or the artifact file is missing.
    /// * [`RenderError::Json`] if the manifest exists but cannot be parsed.
    /// * [`RenderError::Io`] if a file exists but cannot be read.
    pub fn read(&self, kind: ArtifactKind) -> Result<Vec<u8>, RenderError> {
        if self.entry(kind)?.is_none() {
            return Err(RenderError::NotFound { kind });
        }

        match std::fs::read(self.paths.artifact_path(kind)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Manifest lists a {kind} artifact but the file is missing");
                Err(RenderError::NotFound { kind })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the manifest entry for the latest render of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the manifest exists but cannot be read or
    /// parsed.
    pub fn entry(&self, kind: ArtifactKind) -> Result<Option<ArtifactEntry>, RenderError> {
        Ok(load_manifest(&self.paths.manifest_path())?
            .and_then(|manifest| manifest.entry(kind).cloned()))
    }
}

/// Loads the artifact manifest. Returns `None` if none has been written.
fn load_manifest(path: &Path) -> Result<Option<Manifest>, RenderError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No existing manifest found");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let manifest = serde_json::from_str(&contents).inspect_err(|e| {
        log::warn!("Failed to parse manifest {}: {e}", path.display());
    })?;
    Ok(Some(manifest))
}

/// Removes staged files after a failed render.
fn discard(staged: &[PathBuf]) {
    for path in staged {
        let _ = std::fs::remove_file(path);
    }
}

/// Writes the artifact manifest atomically.
fn save_manifest(path: &Path, manifest: &Manifest) -> Result<(), RenderError> {
    let contents = serde_json::to_string_pretty(manifest)?;
    write_atomic(path, contents.as_bytes())?;
    log::debug!("Saved manifest to {}", path.display());
    Ok(())
}
