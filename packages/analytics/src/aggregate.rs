//! Aggregations over a filtered subset.

use std::collections::BTreeSet;

use incident_map_analytics_models::{Categories, GeoPoint, HourCount, SubsetSummary};
use incident_map_incident_models::{FilterSelection, HourBucket, IncidentRecord};

/// Counts incidents per hour of day.
///
/// Always returns 24 entries (hours 0 through 23); hours with no incidents
/// have a count of zero.
#[must_use]
pub fn hourly_counts(subset: &[&IncidentRecord]) -> Vec<HourCount> {
    let mut counts = [0_u64; 24];
    for record in subset {
        if let Some(count) = counts.get_mut(usize::from(record.hour)) {
            *count += 1;
        }
    }

    (0_u8..)
        .zip(counts)
        .map(|(hour, count)| HourCount { hour, count })
        .collect()
}

/// Returns the map points of every row with both coordinates present, in
/// subset order.
#[must_use]
pub fn coordinates(subset: &[&IncidentRecord]) -> Vec<GeoPoint> {
    subset
        .iter()
        .filter_map(|record| record.lat_lng())
        .map(|(latitude, longitude)| GeoPoint {
            latitude,
            longitude,
        })
        .collect()
}

/// Lists the distinct neighborhoods, road designs, and years in `records`.
#[must_use]
pub fn categories(records: &[IncidentRecord]) -> Categories {
    let mut neighborhoods = BTreeSet::new();
    let mut road_designs = BTreeSet::new();
    let mut years = BTreeSet::new();

    for record in records {
        neighborhoods.insert(record.neighborhood.as_str());
        road_designs.insert(record.road_design.as_str());
        years.insert(record.year);
    }

    Categories {
        neighborhoods: neighborhoods.into_iter().map(str::to_string).collect(),
        road_designs: road_designs.into_iter().map(str::to_string).collect(),
        years: years.into_iter().collect(),
        buckets: HourBucket::all().to_vec(),
    }
}

/// Summarizes a subset produced by `selection`.
#[must_use]
pub fn summarize(subset: &[&IncidentRecord], selection: &FilterSelection) -> SubsetSummary {
    SubsetSummary {
        selection: selection.clone(),
        title: selection.title(),
        total_rows: subset.len() as u64,
        rows_with_coordinates: subset.iter().filter(|r| r.lat_lng().is_some()).count() as u64,
        hourly: hourly_counts(subset),
    }
}
