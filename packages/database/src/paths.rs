#![allow(clippy::module_name_repetitions)]
//! Canonical file paths inside the data directory.
//!
//! All paths hang off a single root (default `data/`, relative to the
//! working directory):
//!
//! ```text
//! data/
//!   dataset/incidents.csv
//!   generated/heatmap.html
//!   generated/hourly_chart.svg
//!   generated/manifest.json
//! ```

use std::path::{Path, PathBuf};

use incident_map_incident_models::ArtifactKind;

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Resolves every path used by the pipeline from one root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl DataPaths {
    /// Creates paths rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the data directory root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the `dataset/` directory.
    #[must_use]
    pub fn dataset_dir(&self) -> PathBuf {
        self.root.join("dataset")
    }

    /// Returns the canonical dataset file.
    #[must_use]
    pub fn dataset_path(&self) -> PathBuf {
        self.dataset_dir().join("incidents.csv")
    }

    /// Returns the `generated/` directory for rendered artifacts.
    #[must_use]
    pub fn generated_dir(&self) -> PathBuf {
        self.root.join("generated")
    }

    /// Returns the fixed output path for an artifact.
    #[must_use]
    pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        self.generated_dir().join(kind.file_name())
    }

    /// Returns the artifact manifest path.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.generated_dir().join("manifest.json")
    }
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Returns the sibling staging path used for atomic writes
/// (`incidents.csv` → `incidents.csv.tmp`).
#[must_use]
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `contents` to `path` atomically: the bytes go to the staging
/// path first, which is then renamed over `path`.
///
/// # Errors
///
/// Returns an I/O error if the staging file cannot be written or renamed.
/// The staging file is removed on failure.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp_path = staging_path(path);
    if let Err(e) = std::fs::write(&tmp_path, contents) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    std::fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_layout_under_root() {
        let paths = DataPaths::new("/srv/incidents");
        assert_eq!(
            paths.dataset_path(),
            Path::new("/srv/incidents/dataset/incidents.csv")
        );
        assert_eq!(
            paths.artifact_path(ArtifactKind::Map),
            Path::new("/srv/incidents/generated/heatmap.html")
        );
        assert_eq!(
            paths.artifact_path(ArtifactKind::Chart),
            Path::new("/srv/incidents/generated/hourly_chart.svg")
        );
        assert_eq!(
            paths.manifest_path(),
            Path::new("/srv/incidents/generated/manifest.json")
        );
    }

    #[test]
    fn default_root_is_data() {
        assert_eq!(DataPaths::default().root(), Path::new("data"));
    }

    #[test]
    fn staging_path_is_sibling() {
        assert_eq!(
            staging_path(Path::new("data/generated/manifest.json")),
            Path::new("data/generated/manifest.json.tmp")
        );
    }

    #[test]
    fn write_atomic_replaces_contents() {
        let dir = std::env::temp_dir().join(format!("incident_map_paths_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("artifact.txt");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert!(!staging_path(&path).exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
