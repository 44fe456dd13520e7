#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Traffic incident record, hour bucket, and filter selection types.
//!
//! This crate defines the canonical [`IncidentRecord`] stored in the
//! dataset, the fixed time-of-day [`HourBucket`]s used to narrow it, and the
//! [`FilterSelection`] shape consumed by the filter engine. Every other
//! crate in the workspace speaks in these types.

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Raw selection values that mean "do not narrow this dimension".
pub const ALL_TOKENS: &[&str] = &["all", "todos", "todas"];

/// Returns `true` if `raw` is the "all" sentinel (or blank).
#[must_use]
pub fn is_all_token(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty()
        || ALL_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
}

/// One normalized traffic incident in the canonical dataset.
///
/// Field names double as the header of the backing CSV file, so renaming a
/// field is a storage format change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Calendar date the incident occurred.
    pub date: NaiveDate,
    /// Hour of day (0-23) the incident occurred.
    pub hour: u8,
    /// Neighborhood (barrio) name.
    pub neighborhood: String,
    /// Road design category (e.g. "Tramo de via", "Glorieta").
    pub road_design: String,
    /// Longitude (WGS84). `None` when the source row had no usable value.
    pub longitude: Option<f64>,
    /// Latitude (WGS84). `None` when the source row had no usable value.
    pub latitude: Option<f64>,
    /// Period label, always the year of [`Self::date`].
    pub year: i32,
}

impl IncidentRecord {
    /// Builds a record, deriving the period year from `date`.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        hour: u8,
        neighborhood: String,
        road_design: String,
        longitude: Option<f64>,
        latitude: Option<f64>,
    ) -> Self {
        Self {
            date,
            hour,
            neighborhood,
            road_design,
            longitude,
            latitude,
            year: date.year(),
        }
    }

    /// Returns the full-row identity used for deduplication.
    ///
    /// Coordinates are compared by exact bit pattern so that two rows are
    /// identical only if every field matches exactly.
    #[must_use]
    pub fn key(&self) -> IncidentKey {
        IncidentKey {
            date: self.date,
            hour: self.hour,
            neighborhood: self.neighborhood.clone(),
            road_design: self.road_design.clone(),
            longitude: self.longitude.map(f64::to_bits),
            latitude: self.latitude.map(f64::to_bits),
            year: self.year,
        }
    }

    /// Returns `(latitude, longitude)` when both coordinates are present.
    #[must_use]
    pub const fn lat_lng(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

/// Hashable full-row identity of an [`IncidentRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IncidentKey {
    date: NaiveDate,
    hour: u8,
    neighborhood: String,
    road_design: String,
    longitude: Option<u64>,
    latitude: Option<u64>,
    year: i32,
}

/// Fixed time-of-day buckets. Each covers `[start, end)` hours.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum HourBucket {
    /// The whole day, 00:00-24:00.
    #[strum(to_string = "General")]
    General,
    /// 00:00-06:00
    #[strum(to_string = "Madrugada", serialize = "Madrugada (00:00-06:00)")]
    Madrugada,
    /// 06:00-12:00
    #[strum(
        to_string = "Mañana",
        serialize = "Manana",
        serialize = "Mañana (06:00-12:00)"
    )]
    Manana,
    /// 12:00-18:00
    #[strum(to_string = "Tarde", serialize = "Tarde (12:00-18:00)")]
    Tarde,
    /// 18:00-24:00
    #[strum(to_string = "Noche", serialize = "Noche (18:00-24:00)")]
    Noche,
}

impl HourBucket {
    /// Returns the `[start, end)` hour range covered by this bucket.
    #[must_use]
    pub const fn range(self) -> (u8, u8) {
        match self {
            Self::General => (0, 24),
            Self::Madrugada => (0, 6),
            Self::Manana => (6, 12),
            Self::Tarde => (12, 18),
            Self::Noche => (18, 24),
        }
    }

    /// Returns `true` if `hour` falls inside this bucket.
    #[must_use]
    pub const fn contains(self, hour: u8) -> bool {
        let (start, end) = self.range();
        hour >= start && hour < end
    }

    /// Human-readable label including the covered range, as shown in menus
    /// and artifact titles.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Madrugada => "Madrugada (00:00-06:00)",
            Self::Manana => "Mañana (06:00-12:00)",
            Self::Tarde => "Tarde (12:00-18:00)",
            Self::Noche => "Noche (18:00-24:00)",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::General,
            Self::Madrugada,
            Self::Manana,
            Self::Tarde,
            Self::Noche,
        ]
    }
}

/// A single filter dimension: either every value or one concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection<T> {
    /// No narrowing on this dimension.
    #[default]
    All,
    /// Keep only rows equal to this value.
    Only(T),
}

impl<T> Selection<T> {
    /// Returns `true` for [`Selection::All`].
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Returns the concrete value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::All => None,
            Self::Only(value) => Some(value),
        }
    }
}

impl<T: PartialEq> Selection<T> {
    /// Returns `true` if `candidate` passes this selection.
    #[must_use]
    pub fn admits(&self, candidate: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(value) => value == candidate,
        }
    }
}

/// A resolved four-dimensional filter over the canonical dataset.
///
/// Produced by resolving a raw request against the dataset's known
/// categories, so every [`Selection::Only`] value is known to exist.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// Neighborhood to keep.
    pub neighborhood: Selection<String>,
    /// Time-of-day bucket to keep.
    pub hour_bucket: Selection<HourBucket>,
    /// Road design category to keep.
    pub road_design: Selection<String>,
    /// Period year to keep.
    pub year: Selection<i32>,
}

impl FilterSelection {
    /// A selection that keeps every row.
    #[must_use]
    pub const fn everything() -> Self {
        Self {
            neighborhood: Selection::All,
            hour_bucket: Selection::All,
            road_design: Selection::All,
            year: Selection::All,
        }
    }

    /// Returns `true` if no dimension narrows the dataset.
    #[must_use]
    pub fn is_everything(&self) -> bool {
        self.neighborhood.is_all()
            && self
                .hour_bucket
                .value()
                .is_none_or(|bucket| *bucket == HourBucket::General)
            && self.road_design.is_all()
            && self.year.is_all()
    }

    /// Title describing this selection, e.g.
    /// `"Todos los Barrios - General"`.
    #[must_use]
    pub fn title(&self) -> String {
        let neighborhood = self
            .neighborhood
            .value()
            .map_or("Todos los Barrios", String::as_str);
        let bucket = self
            .hour_bucket
            .value()
            .map_or(HourBucket::General.label(), |b| b.label());

        let mut title = format!("{neighborhood} - {bucket}");
        if let Some(design) = self.road_design.value() {
            title.push_str(" - ");
            title.push_str(design);
        }
        if let Some(year) = self.year.value() {
            title.push_str(&format!(" - {year}"));
        }
        title
    }
}

/// Rendered output kinds.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ArtifactKind {
    /// Geospatial density map (HTML document).
    Map,
    /// Hour-of-day frequency chart (SVG image).
    Chart,
}

impl ArtifactKind {
    /// File name of this artifact inside the generated directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Map => "heatmap.html",
            Self::Chart => "hourly_chart.svg",
        }
    }

    /// MIME type of this artifact's contents.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Map => "text/html; charset=utf-8",
            Self::Chart => "image/svg+xml",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Map, Self::Chart]
    }
}

/// Record of one rendered artifact, as kept in the artifact manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactEntry {
    /// Which artifact this is.
    pub kind: ArtifactKind,
    /// File name inside the generated directory.
    pub file: String,
    /// ISO 8601 timestamp of the render.
    pub rendered_at: String,
    /// Rows in the rendered subset.
    pub rows: u64,
    /// Title drawn on the artifact.
    pub title: String,
    /// Selection the subset was produced by.
    pub selection: FilterSelection,
}

/// Row counts describing a single merge into the canonical dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// Rows in the dataset before the merge.
    pub rows_before: u64,
    /// Rows offered by the batch.
    pub rows_offered: u64,
    /// Rows that were new and got appended.
    pub rows_added: u64,
    /// Rows in the dataset after the merge.
    pub rows_after: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hour: u8, lng: Option<f64>) -> IncidentRecord {
        IncidentRecord::new(
            NaiveDate::from_ymd_opt(2019, 3, 2).unwrap(),
            hour,
            "Laureles".to_string(),
            "Tramo de via".to_string(),
            lng,
            Some(6.25),
        )
    }

    #[test]
    fn new_derives_year_from_date() {
        assert_eq!(record(8, None).year, 2019);
    }

    #[test]
    fn key_matches_for_identical_rows() {
        assert_eq!(record(8, Some(-75.58)).key(), record(8, Some(-75.58)).key());
        assert_ne!(record(8, Some(-75.58)).key(), record(9, Some(-75.58)).key());
        assert_ne!(record(8, Some(-75.58)).key(), record(8, None).key());
    }

    #[test]
    fn lat_lng_requires_both_coordinates() {
        assert_eq!(record(1, Some(-75.5)).lat_lng(), Some((6.25, -75.5)));
        assert!(record(1, None).lat_lng().is_none());
    }

    #[test]
    fn hour_buckets_partition_the_day() {
        for hour in 0..24u8 {
            let containing = HourBucket::all()
                .iter()
                .filter(|b| **b != HourBucket::General && b.contains(hour))
                .count();
            assert_eq!(containing, 1, "hour {hour} in {containing} buckets");
            assert!(HourBucket::General.contains(hour));
        }
        assert!(!HourBucket::Noche.contains(24));
    }

    #[test]
    fn hour_buckets_parse_from_names_and_labels() {
        for bucket in HourBucket::all() {
            assert_eq!(bucket.label().parse::<HourBucket>().unwrap(), *bucket);
            assert_eq!(bucket.to_string().parse::<HourBucket>().unwrap(), *bucket);
        }
        assert_eq!("noche".parse::<HourBucket>().unwrap(), HourBucket::Noche);
        assert_eq!("manana".parse::<HourBucket>().unwrap(), HourBucket::Manana);
        assert!("siesta".parse::<HourBucket>().is_err());
    }

    #[test]
    fn all_tokens_are_recognized() {
        assert!(is_all_token("all"));
        assert!(is_all_token(" Todos "));
        assert!(is_all_token(""));
        assert!(!is_all_token("Laureles"));
    }

    #[test]
    fn selection_admits() {
        assert!(Selection::<i32>::All.admits(&2020));
        assert!(Selection::Only(2020).admits(&2020));
        assert!(!Selection::Only(2019).admits(&2020));
    }

    #[test]
    fn title_describes_selection() {
        assert_eq!(
            FilterSelection::everything().title(),
            "Todos los Barrios - General"
        );
        let selection = FilterSelection {
            neighborhood: Selection::Only("Belén".to_string()),
            hour_bucket: Selection::Only(HourBucket::Noche),
            road_design: Selection::All,
            year: Selection::Only(2019),
        };
        assert_eq!(selection.title(), "Belén - Noche (18:00-24:00) - 2019");
        assert!(!selection.is_everything());
        assert!(FilterSelection::everything().is_everything());
    }

    #[test]
    fn artifact_kind_parses() {
        assert_eq!("map".parse::<ArtifactKind>().unwrap(), ArtifactKind::Map);
        assert_eq!("CHART".parse::<ArtifactKind>().unwrap(), ArtifactKind::Chart);
        assert_eq!(ArtifactKind::Chart.to_string(), "chart");
    }

    #[test]
    fn artifact_kind_parse_error_is_boxable() {
        let err: Box<dyn std::error::Error + Send + Sync> =
            "pdf".parse::<ArtifactKind>().unwrap_err().into();
        assert!(!err.to_string().is_empty());
        assert_eq!(ArtifactKind::Map.content_type(), "text/html; charset=utf-8");
    }
}
