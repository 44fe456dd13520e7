//! Sequential narrowing of the dataset by a [`FilterSelection`].
//!
//! The four dimensions are independent predicates, so the order they are
//! applied in never changes the result. [`apply_filter`] runs them in the
//! fixed order year → neighborhood → hour bucket → road design and logs
//! how many rows survive each step.

use incident_map_analytics_models::{Categories, FilterRequest};
use incident_map_incident_models::{
    FilterSelection, HourBucket, IncidentRecord, Selection, is_all_token,
};
use strum_macros::{AsRefStr, Display};

/// One dimension of the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum FilterStep {
    /// Keep one period year.
    Year,
    /// Keep one neighborhood.
    Neighborhood,
    /// Keep hours inside one bucket.
    HourBucket,
    /// Keep one road design category.
    RoadDesign,
}

impl FilterStep {
    /// The order [`apply_filter`] applies steps in.
    pub const ORDER: [Self; 4] = [
        Self::Year,
        Self::Neighborhood,
        Self::HourBucket,
        Self::RoadDesign,
    ];

    /// Returns `true` if `record` passes this step of `selection`.
    #[must_use]
    pub fn admits(self, selection: &FilterSelection, record: &IncidentRecord) -> bool {
        match self {
            Self::Year => selection.year.admits(&record.year),
            Self::Neighborhood => selection.neighborhood.admits(&record.neighborhood),
            Self::HourBucket => selection
                .hour_bucket
                .value()
                .is_none_or(|bucket| bucket.contains(record.hour)),
            Self::RoadDesign => selection.road_design.admits(&record.road_design),
        }
    }

    /// Returns `true` if this step narrows nothing under `selection`.
    #[must_use]
    pub fn is_noop(self, selection: &FilterSelection) -> bool {
        match self {
            Self::Year => selection.year.is_all(),
            Self::Neighborhood => selection.neighborhood.is_all(),
            Self::HourBucket => selection
                .hour_bucket
                .value()
                .is_none_or(|bucket| *bucket == HourBucket::General),
            Self::RoadDesign => selection.road_design.is_all(),
        }
    }
}

/// Resolves a raw request into a selection against the dataset's known
/// values.
///
/// A value that is absent, an "all" token, or not among `categories`
/// resolves to [`Selection::All`]. Unknown values are logged at `warn`.
#[must_use]
pub fn resolve_selection(request: &FilterRequest, categories: &Categories) -> FilterSelection {
    FilterSelection {
        neighborhood: resolve_known(
            "neighborhood",
            request.neighborhood.as_deref(),
            |value| categories.neighborhoods.iter().any(|n| n == value),
            |value| Some(value.to_string()),
        ),
        hour_bucket: resolve_known(
            "hour bucket",
            request.hour_bucket.as_deref(),
            |_| true,
            |value| value.parse::<HourBucket>().ok(),
        ),
        road_design: resolve_known(
            "road design",
            request.road_design.as_deref(),
            |value| categories.road_designs.iter().any(|d| d == value),
            |value| Some(value.to_string()),
        ),
        year: resolve_known(
            "year",
            request.year.as_deref(),
            |value| {
                value
                    .parse::<i32>()
                    .is_ok_and(|year| categories.years.contains(&year))
            },
            |value| value.parse::<i32>().ok(),
        ),
    }
}

fn resolve_known<T>(
    dimension: &str,
    raw: Option<&str>,
    is_known: impl Fn(&str) -> bool,
    parse: impl Fn(&str) -> Option<T>,
) -> Selection<T> {
    let Some(raw) = raw else {
        return Selection::All;
    };
    if is_all_token(raw) {
        return Selection::All;
    }

    let value = raw.trim();
    match parse(value) {
        Some(parsed) if is_known(value) => Selection::Only(parsed),
        _ => {
            log::warn!("Unknown {dimension} {value:?}, using all");
            Selection::All
        }
    }
}

/// Applies `selection` to `records` in [`FilterStep::ORDER`].
///
/// Returns the surviving rows in their original order.
#[must_use]
pub fn apply_filter<'a>(
    records: &'a [IncidentRecord],
    selection: &FilterSelection,
) -> Vec<&'a IncidentRecord> {
    apply_steps(records, selection, &FilterStep::ORDER)
}

/// Applies the given `steps` of `selection` to `records`, in order.
///
/// Steps not listed are not applied.
#[must_use]
pub fn apply_steps<'a>(
    records: &'a [IncidentRecord],
    selection: &FilterSelection,
    steps: &[FilterStep],
) -> Vec<&'a IncidentRecord> {
    let mut subset: Vec<&IncidentRecord> = records.iter().collect();

    for &step in steps {
        if step.is_noop(selection) {
            continue;
        }
        let before = subset.len();
        subset.retain(|record| step.admits(selection, record));
        log::debug!("Filter {step}: {before} -> {} rows", subset.len());
    }

    log::info!(
        "Filtered {} rows to {} ({})",
        records.len(),
        subset.len(),
        selection.title()
    );
    subset
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::aggregate::categories;

    fn record(year: i32, hour: u8, neighborhood: &str, road_design: &str) -> IncidentRecord {
        IncidentRecord::new(
            NaiveDate::from_ymd_opt(year, 5, 10).unwrap(),
            hour,
            neighborhood.to_string(),
            road_design.to_string(),
            Some(-75.58),
            Some(6.24),
        )
    }

    fn dataset() -> Vec<IncidentRecord> {
        vec![
            record(2019, 2, "Laureles", "Tramo de via"),
            record(2019, 14, "Belén", "Glorieta"),
            record(2019, 20, "Laureles", "Glorieta"),
            record(2020, 7, "Laureles", "Tramo de via"),
            record(2020, 19, "Robledo", "Tramo de via"),
            record(2019, 23, "Laureles", "Glorieta"),
        ]
    }

    fn request(
        neighborhood: Option<&str>,
        hour_bucket: Option<&str>,
        road_design: Option<&str>,
        year: Option<&str>,
    ) -> FilterRequest {
        FilterRequest {
            neighborhood: neighborhood.map(str::to_string),
            hour_bucket: hour_bucket.map(str::to_string),
            road_design: road_design.map(str::to_string),
            year: year.map(str::to_string),
        }
    }

    #[test]
    fn everything_keeps_all_rows_in_order() {
        let data = dataset();
        let subset = apply_filter(&data, &FilterSelection::everything());
        assert_eq!(subset.len(), data.len());
        assert!(subset.iter().zip(&data).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    #[test]
    fn narrows_every_dimension() {
        let data = dataset();
        let selection = FilterSelection {
            neighborhood: Selection::Only("Laureles".to_string()),
            hour_bucket: Selection::Only(HourBucket::Noche),
            road_design: Selection::Only("Glorieta".to_string()),
            year: Selection::Only(2019),
        };
        let hours: Vec<u8> = apply_filter(&data, &selection)
            .iter()
            .map(|r| r.hour)
            .collect();
        assert_eq!(hours, [20, 23]);
    }

    #[test]
    fn hour_bucket_is_half_open() {
        let data = vec![
            record(2019, 5, "A", "X"),
            record(2019, 6, "A", "X"),
            record(2019, 11, "A", "X"),
            record(2019, 12, "A", "X"),
        ];
        let selection = FilterSelection {
            hour_bucket: Selection::Only(HourBucket::Manana),
            ..FilterSelection::everything()
        };
        let hours: Vec<u8> = apply_filter(&data, &selection)
            .iter()
            .map(|r| r.hour)
            .collect();
        assert_eq!(hours, [6, 11]);
    }

    #[test]
    fn step_order_does_not_change_result() {
        let data = dataset();
        let selection = FilterSelection {
            neighborhood: Selection::Only("Laureles".to_string()),
            hour_bucket: Selection::Only(HourBucket::Noche),
            road_design: Selection::All,
            year: Selection::Only(2019),
        };
        let expected = apply_filter(&data, &selection);

        let orders = [
            [
                FilterStep::RoadDesign,
                FilterStep::HourBucket,
                FilterStep::Neighborhood,
                FilterStep::Year,
            ],
            [
                FilterStep::HourBucket,
                FilterStep::Year,
                FilterStep::RoadDesign,
                FilterStep::Neighborhood,
            ],
            [
                FilterStep::Neighborhood,
                FilterStep::RoadDesign,
                FilterStep::Year,
                FilterStep::HourBucket,
            ],
        ];
        for order in &orders {
            assert_eq!(apply_steps(&data, &selection, order), expected, "{order:?}");
        }
    }

    #[test]
    fn empty_subset_is_valid() {
        let data = dataset();
        let selection = FilterSelection {
            neighborhood: Selection::Only("Robledo".to_string()),
            year: Selection::Only(2019),
            ..FilterSelection::everything()
        };
        assert!(apply_filter(&data, &selection).is_empty());
        assert!(apply_filter(&[], &selection).is_empty());
    }

    #[test]
    fn resolves_known_values() {
        let known = categories(&dataset());
        let selection = resolve_selection(
            &request(Some(" Belén "), Some("Tarde (12:00-18:00)"), Some("Glorieta"), Some("2019")),
            &known,
        );
        assert_eq!(selection.neighborhood, Selection::Only("Belén".to_string()));
        assert_eq!(selection.hour_bucket, Selection::Only(HourBucket::Tarde));
        assert_eq!(selection.road_design, Selection::Only("Glorieta".to_string()));
        assert_eq!(selection.year, Selection::Only(2019));
    }

    #[test]
    fn unknown_and_all_values_degrade_to_all() {
        let known = categories(&dataset());
        let selection = resolve_selection(
            &request(Some("Atlantis"), Some("siesta"), Some("todos"), Some("1999")),
            &known,
        );
        assert_eq!(selection, FilterSelection::everything());

        let selection = resolve_selection(&request(Some(""), None, Some("ALL"), Some("año")), &known);
        assert_eq!(selection, FilterSelection::everything());
    }
}
