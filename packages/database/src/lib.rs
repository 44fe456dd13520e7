#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Persistent storage for the canonical incident dataset.
//!
//! The dataset lives in a single UTF-8 CSV file under the data directory
//! (see [`paths`]). [`store::DatasetStore`] loads, merges, and replaces it;
//! every write goes to a sibling `.tmp` file that is then renamed over the
//! canonical file.

pub mod paths;
pub mod store;

use std::path::PathBuf;

/// Errors that can occur during dataset storage operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The backing file exists but is not a valid dataset.
    #[error("Dataset corruption in {}: {message}", path.display())]
    DatasetCorruption {
        /// Path of the offending file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// CSV serialization error while writing.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
