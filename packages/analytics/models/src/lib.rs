#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter request and subset result types.
//!
//! A [`FilterRequest`] carries the raw, unvalidated values a caller picked
//! (from the CLI, a menu, or JSON). The filter engine resolves it against
//! the dataset's [`Categories`] into a
//! [`incident_map_incident_models::FilterSelection`] and describes the
//! resulting subset with a [`SubsetSummary`].

use incident_map_incident_models::{FilterSelection, HourBucket};
use serde::{Deserialize, Serialize};

/// Raw filter values as supplied by a caller.
///
/// `None`, an empty string, and the tokens `all`/`todos`/`todas` all mean
/// "every value" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    /// Neighborhood name.
    pub neighborhood: Option<String>,
    /// Hour bucket name or label (e.g. `"noche"`).
    pub hour_bucket: Option<String>,
    /// Road design category.
    pub road_design: Option<String>,
    /// Period year.
    pub year: Option<String>,
}

impl FilterRequest {
    /// A request that keeps every row.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }
}

/// Distinct values present in the dataset, for building selection menus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categories {
    /// Distinct neighborhoods, sorted.
    pub neighborhoods: Vec<String>,
    /// Distinct road design categories, sorted.
    pub road_designs: Vec<String>,
    /// Distinct years, ascending.
    pub years: Vec<i32>,
    /// Every hour bucket.
    pub buckets: Vec<HourBucket>,
}

/// Incident count for one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourCount {
    /// Hour of day (0-23).
    pub hour: u8,
    /// Number of incidents in that hour.
    pub count: u64,
}

/// One point contributed to the density map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

/// Description of a filtered subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsetSummary {
    /// The selection actually applied, after unknown values degraded to
    /// "all".
    pub selection: FilterSelection,
    /// Title describing the selection.
    pub title: String,
    /// Rows in the subset.
    pub total_rows: u64,
    /// Rows with both coordinates present.
    pub rows_with_coordinates: u64,
    /// Zero-filled per-hour counts, hours 0 through 23.
    pub hourly: Vec<HourCount>,
}
