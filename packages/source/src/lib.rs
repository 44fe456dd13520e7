#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident CSV decoding, text repair, temporal parsing, and period
//! selection.
//!
//! [`normalize_upload`] turns the raw bytes of one uploaded CSV into a
//! single-period batch of [`IncidentRecord`]s ready to merge:
//!
//! 1. [`encoding::decode`] the bytes using the declared encoding,
//! 2. [`csv_reader::read_raw_incidents`] maps headers to the six required
//!    columns and repairs text via [`text::TextNormalizer`],
//! 3. [`resolve::resolve_batch`] parses hours, dates, and coordinates,
//! 4. [`period::retain_dominant_period`] keeps only the most frequent year.
//!
//! Any error aborts the whole batch.

pub mod csv_reader;
pub mod encoding;
pub mod parsing;
pub mod period;
pub mod registry;
pub mod resolve;
pub mod text;

use incident_map_incident_models::IncidentRecord;
use incident_map_source_models::{BatchStats, ColumnRole, Encoding, SourceDefinition};

use crate::text::TextNormalizer;

/// Errors that can occur while normalizing an upload.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The upload is not a usable CSV (bad encoding, missing columns,
    /// malformed rows).
    #[error("Format error: {message}")]
    Format {
        /// Description of what went wrong.
        message: String,
    },

    /// A required value could not be parsed.
    #[error("Parse error in row {row}, column {column}: unparseable value {value:?}")]
    Parse {
        /// 1-based data row number.
        row: u64,
        /// Column the value came from.
        column: ColumnRole,
        /// The offending value.
        value: String,
    },

    /// No row carried a parseable date, so no dominant year exists.
    #[error("No dominant period: none of the {rows} rows has a parseable date")]
    EmptyPeriod {
        /// Number of rows examined.
        rows: u64,
    },

    /// Source definition TOML is invalid.
    #[error("Source config error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O error (config file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}

/// A single-period batch ready to merge into the canonical dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBatch {
    /// The dominant year every record belongs to.
    pub year: i32,
    /// Retained records, in upload order.
    pub records: Vec<IncidentRecord>,
    /// Row accounting for the upload.
    pub stats: BatchStats,
}

/// Normalizes one uploaded CSV into a single-period batch.
///
/// # Errors
///
/// * [`SourceError::Format`] if the bytes cannot be decoded, a required
///   column is missing, or a row is malformed.
/// * [`SourceError::Parse`] if a time value is unparseable and the source
///   uses [`incident_map_source_models::InvalidTimePolicy::RejectBatch`].
/// * [`SourceError::EmptyPeriod`] if no row has a parseable date.
pub fn normalize_upload(
    bytes: &[u8],
    encoding: Encoding,
    source: &SourceDefinition,
) -> Result<NormalizedBatch, SourceError> {
    let text = encoding::decode(bytes, encoding)?;
    let normalizer = TextNormalizer::new(&source.text);

    let raw = csv_reader::read_raw_incidents(&text, &source.columns, &normalizer)?;
    let rows_read = raw.len() as u64;
    log::info!("[{}] Read {rows_read} rows ({encoding})", source.id);

    let resolved = resolve::resolve_batch(raw, &source.temporal)?;
    let period = period::retain_dominant_period(resolved.incidents)?;

    let stats = BatchStats {
        rows_read,
        rows_missing_date: resolved.missing_date,
        rows_invalid_time: resolved.invalid_time,
        rows_outside_period: period.discarded,
        rows_kept: period.records.len() as u64,
    };

    log::info!(
        "[{}] Dominant period {}: kept {} rows, {} outside period, {} undated, {} with invalid time",
        source.id,
        period.year,
        stats.rows_kept,
        stats.rows_outside_period,
        stats.rows_missing_date,
        stats.rows_invalid_time,
    );

    Ok(NormalizedBatch {
        year: period.year,
        records: period.records,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_upload_to_dominant_year() {
        let source = registry::default_source();
        let csv = "fecha,hora,barrio,diseno,longitud,latitud\n\
                   2019-01-05,02:30 PM,Laureles,Tramo de via,-75.59,6.24\n\
                   2019-03-09,08:15 AM,SÃBADO,Glorieta,-75.57,6.25\n\
                   2020-02-01,11:00 PM,Belén,Tramo de via,-75.60,6.22\n";

        let batch = normalize_upload(csv.as_bytes(), Encoding::Utf8, &source).unwrap();

        assert_eq!(batch.year, 2019);
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].hour, 14);
        assert_eq!(batch.records[1].neighborhood, "SÁBADO");
        assert_eq!(
            batch.stats,
            BatchStats {
                rows_read: 3,
                rows_missing_date: 0,
                rows_invalid_time: 0,
                rows_outside_period: 1,
                rows_kept: 2,
            }
        );
    }

    #[test]
    fn undated_upload_is_empty_period() {
        let source = registry::default_source();
        let csv = "fecha,hora,barrio,diseno,longitud,latitud\n\
                   sin fecha,02:30 PM,Laureles,Tramo de via,-75.59,6.24\n";
        let err = normalize_upload(csv.as_bytes(), Encoding::Utf8, &source).unwrap_err();
        assert!(matches!(err, SourceError::EmptyPeriod { rows: 1 }));
    }

    #[test]
    fn invalid_time_rejects_batch_by_default() {
        let source = registry::default_source();
        let csv = "fecha,hora,barrio,diseno,longitud,latitud\n\
                   2019-01-05,02:30 PM,Laureles,Tramo de via,-75.59,6.24\n\
                   2019-01-06,mediodía,Laureles,Tramo de via,-75.59,6.24\n";
        let err = normalize_upload(csv.as_bytes(), Encoding::Utf8, &source).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Parse {
                row: 2,
                column: ColumnRole::Time,
                ..
            }
        ));
    }
}
