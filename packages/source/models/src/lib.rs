#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Source definition types and the raw/resolved incident formats.
//!
//! A [`SourceDefinition`] captures everything specific to one incident
//! export (column names, text repairs, accepted time formats, map anchor).
//! Uploaded rows move through [`RawIncident`] (trimmed, repaired text) and
//! [`ResolvedIncident`] (parsed hour, date, and coordinates) before the
//! dominant-period filter turns them into
//! [`incident_map_incident_models::IncidentRecord`]s.

use chrono::{Datelike as _, NaiveDate};
use incident_map_incident_models::IncidentRecord;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Character encoding declared for an uploaded CSV.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Encoding {
    /// UTF-8, with an optional leading byte-order mark.
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    #[strum(to_string = "utf-8", serialize = "utf8")]
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    #[strum(to_string = "latin-1", serialize = "latin1", serialize = "iso-8859-1")]
    Latin1,
    /// Windows-1252: Latin-1 with printable characters in `0x80..=0x9F`.
    #[serde(rename = "windows-1252", alias = "cp1252")]
    #[strum(to_string = "windows-1252", serialize = "cp1252")]
    Windows1252,
}

/// What to do with a row whose time value cannot be parsed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvalidTimePolicy {
    /// Fail the whole ingest with a parse error naming the row.
    #[default]
    RejectBatch,
    /// Skip the row and count it in the batch summary.
    DropRow,
}

/// A complete, config-driven incident source definition.
///
/// Loaded from TOML (embedded at compile time or supplied by the user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier (e.g., `"medellin_incidentes_viales"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// City the incidents belong to.
    pub city: String,
    /// Encoding assumed when the caller does not declare one.
    #[serde(default)]
    pub default_encoding: Encoding,
    /// Accepted header names for each required column.
    pub columns: ColumnMapping,
    /// Text repairs applied to every text column.
    #[serde(default)]
    pub text: TextConfig,
    /// Accepted date/time formats and the invalid-time policy.
    pub temporal: TemporalConfig,
    /// Fixed view used by the density map.
    pub map: MapConfig,
}

/// The six columns every upload must provide.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ColumnRole {
    /// Incident date.
    Date,
    /// Incident time of day.
    Time,
    /// Neighborhood name.
    Neighborhood,
    /// Road design category.
    RoadDesign,
    /// Longitude.
    Longitude,
    /// Latitude.
    Latitude,
}

impl ColumnRole {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Date,
            Self::Time,
            Self::Neighborhood,
            Self::RoadDesign,
            Self::Longitude,
            Self::Latitude,
        ]
    }
}

/// Header aliases for each [`ColumnRole`]. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Date column names.
    pub date: Vec<String>,
    /// Time column names.
    pub time: Vec<String>,
    /// Neighborhood column names.
    pub neighborhood: Vec<String>,
    /// Road design column names.
    pub road_design: Vec<String>,
    /// Longitude column names.
    pub longitude: Vec<String>,
    /// Latitude column names.
    pub latitude: Vec<String>,
}

impl ColumnMapping {
    /// Returns the aliases configured for `role`.
    #[must_use]
    pub fn aliases(&self, role: ColumnRole) -> &[String] {
        match role {
            ColumnRole::Date => &self.date,
            ColumnRole::Time => &self.time,
            ColumnRole::Neighborhood => &self.neighborhood,
            ColumnRole::RoadDesign => &self.road_design,
            ColumnRole::Longitude => &self.longitude,
            ColumnRole::Latitude => &self.latitude,
        }
    }
}

/// Ordered literal substitutions repairing mis-decoded text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextConfig {
    /// Applied in order; list longer sequences before their prefixes.
    #[serde(default)]
    pub substitutions: Vec<Substitution>,
}

/// One corrupted → correct replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    /// Corrupted substring.
    pub from: String,
    /// Replacement.
    pub to: String,
}

/// Date and time parsing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalConfig {
    /// `chrono` formats tried for time-of-day values, in order.
    pub time_formats: Vec<String>,
    /// `chrono` formats tried for combined date-time values in the time
    /// column.
    #[serde(default)]
    pub datetime_formats: Vec<String>,
    /// `chrono` formats tried for the date column. A date column value may
    /// also carry a time part; see `datetime_formats`.
    pub date_formats: Vec<String>,
    /// Policy for rows whose time cannot be parsed.
    #[serde(default)]
    pub invalid_time: InvalidTimePolicy,
}

/// Fixed view used by the density map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Latitude of the map center.
    pub center_latitude: f64,
    /// Longitude of the map center.
    pub center_longitude: f64,
    /// Initial zoom level.
    pub zoom: u8,
}

/// A CSV row after text normalization, before any parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIncident {
    /// 1-based data row number within the upload (header excluded).
    pub row: u64,
    /// Date text.
    pub date: String,
    /// Time text.
    pub time: String,
    /// Neighborhood name.
    pub neighborhood: String,
    /// Road design category.
    pub road_design: String,
    /// Longitude text.
    pub longitude: String,
    /// Latitude text.
    pub latitude: String,
}

/// A row with its hour, date, and coordinates parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIncident {
    /// 1-based data row number within the upload.
    pub row: u64,
    /// Parsed date. `None` when the date text could not be parsed.
    pub date: Option<NaiveDate>,
    /// Hour of day (0-23).
    pub hour: u8,
    /// Neighborhood name.
    pub neighborhood: String,
    /// Road design category.
    pub road_design: String,
    /// Longitude, if usable.
    pub longitude: Option<f64>,
    /// Latitude, if usable.
    pub latitude: Option<f64>,
}

impl ResolvedIncident {
    /// Year of the incident date, if the date parsed.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }

    /// Converts into a canonical record. Returns `None` without a date.
    #[must_use]
    pub fn into_record(self) -> Option<IncidentRecord> {
        let date = self.date?;
        Some(IncidentRecord::new(
            date,
            self.hour,
            self.neighborhood,
            self.road_design,
            self.longitude,
            self.latitude,
        ))
    }
}

/// Row accounting for one normalized upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Data rows read from the CSV.
    pub rows_read: u64,
    /// Rows whose date could not be parsed.
    pub rows_missing_date: u64,
    /// Rows skipped because their time could not be parsed
    /// ([`InvalidTimePolicy::DropRow`] only).
    pub rows_invalid_time: u64,
    /// Dated rows discarded for falling outside the dominant year.
    pub rows_outside_period: u64,
    /// Rows retained for merging.
    pub rows_kept: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_parses_aliases() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("utf8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("ISO-8859-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert_eq!("cp1252".parse::<Encoding>().unwrap(), Encoding::Windows1252);
        assert!("ebcdic".parse::<Encoding>().is_err());
        assert_eq!(Encoding::Latin1.to_string(), "latin-1");
    }

    #[test]
    fn resolved_incident_without_date_has_no_record() {
        let resolved = ResolvedIncident {
            row: 1,
            date: None,
            hour: 3,
            neighborhood: "Robledo".to_string(),
            road_design: "Tramo de via".to_string(),
            longitude: None,
            latitude: None,
        };
        assert!(resolved.year().is_none());
        assert!(resolved.into_record().is_none());
    }

    #[test]
    fn resolved_incident_converts_to_record() {
        let resolved = ResolvedIncident {
            row: 1,
            date: NaiveDate::from_ymd_opt(2020, 1, 31),
            hour: 23,
            neighborhood: "Robledo".to_string(),
            road_design: "Glorieta".to_string(),
            longitude: Some(-75.6),
            latitude: Some(6.27),
        };
        assert_eq!(resolved.year(), Some(2020));
        let record = resolved.into_record().unwrap();
        assert_eq!(record.year, 2020);
        assert_eq!(record.hour, 23);
    }
}
