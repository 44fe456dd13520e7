//! Dominant-period selection.
//!
//! An upload is labeled with the year most of its rows fall in, and rows
//! from any other year are discarded so that a batch always represents a
//! single period. On an exact tie the lowest year wins.

use std::collections::BTreeMap;

use incident_map_incident_models::IncidentRecord;
use incident_map_source_models::ResolvedIncident;

use crate::SourceError;

/// A batch reduced to its dominant year.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodBatch {
    /// The dominant year.
    pub year: i32,
    /// Rows from the dominant year, in upload order.
    pub records: Vec<IncidentRecord>,
    /// Dated rows discarded for belonging to another year.
    pub discarded: u64,
}

/// Returns the most frequent year among rows with a parsed date.
///
/// # Errors
///
/// Returns [`SourceError::EmptyPeriod`] if no row has a parsed date.
pub fn dominant_year(incidents: &[ResolvedIncident]) -> Result<i32, SourceError> {
    let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
    for year in incidents.iter().filter_map(ResolvedIncident::year) {
        *counts.entry(year).or_default() += 1;
    }

    // `BTreeMap` iterates years ascending, and `max_by_key` keeps the last
    // maximum, so iterate in reverse to keep the lowest year on ties.
    counts
        .iter()
        .rev()
        .max_by_key(|(_, count)| **count)
        .map(|(year, _)| *year)
        .ok_or(SourceError::EmptyPeriod {
            rows: incidents.len() as u64,
        })
}

/// Keeps only the rows of the dominant year.
///
/// Undated rows are always dropped; they are already counted as missing
/// dates by the resolver, so they are not part of `discarded`.
///
/// # Errors
///
/// Returns [`SourceError::EmptyPeriod`] if no row has a parsed date.
pub fn retain_dominant_period(
    incidents: Vec<ResolvedIncident>,
) -> Result<PeriodBatch, SourceError> {
    let year = dominant_year(&incidents)?;
    let mut discarded = 0_u64;

    let records = incidents
        .into_iter()
        .filter(|incident| match incident.year() {
            Some(y) if y == year => true,
            Some(_) => {
                discarded += 1;
                false
            }
            None => false,
        })
        .filter_map(ResolvedIncident::into_record)
        .collect();

    Ok(PeriodBatch {
        year,
        records,
        discarded,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn incident(row: u64, year: Option<i32>) -> ResolvedIncident {
        ResolvedIncident {
            row,
            date: year.and_then(|y| NaiveDate::from_ymd_opt(y, 6, 1)),
            hour: 12,
            neighborhood: format!("Barrio {row}"),
            road_design: "Tramo de via".to_string(),
            longitude: Some(-75.58),
            latitude: Some(6.24),
        }
    }

    #[test]
    fn picks_most_frequent_year() {
        let batch = vec![
            incident(1, Some(2019)),
            incident(2, Some(2019)),
            incident(3, Some(2020)),
        ];
        assert_eq!(dominant_year(&batch).unwrap(), 2019);

        let period = retain_dominant_period(batch).unwrap();
        assert_eq!(period.year, 2019);
        assert_eq!(period.records.len(), 2);
        assert!(period.records.iter().all(|r| r.year == 2019));
        assert_eq!(period.discarded, 1);
    }

    #[test]
    fn tie_goes_to_lowest_year() {
        let batch = vec![
            incident(1, Some(2021)),
            incident(2, Some(2018)),
            incident(3, Some(2021)),
            incident(4, Some(2018)),
        ];
        assert_eq!(dominant_year(&batch).unwrap(), 2018);
    }

    #[test]
    fn ignores_undated_rows() {
        let batch = vec![
            incident(1, None),
            incident(2, None),
            incident(3, Some(2022)),
        ];
        let period = retain_dominant_period(batch).unwrap();
        assert_eq!(period.year, 2022);
        assert_eq!(period.records.len(), 1);
        assert_eq!(period.discarded, 0);
    }

    #[test]
    fn no_dated_rows_is_empty_period() {
        let err = dominant_year(&[incident(1, None)]).unwrap_err();
        assert!(matches!(err, SourceError::EmptyPeriod { rows: 1 }));
        assert!(matches!(
            retain_dominant_period(Vec::new()).unwrap_err(),
            SourceError::EmptyPeriod { rows: 0 }
        ));
    }

    #[test]
    fn preserves_upload_order() {
        let batch = vec![
            incident(1, Some(2019)),
            incident(2, Some(2020)),
            incident(3, Some(2019)),
        ];
        let period = retain_dominant_period(batch).unwrap();
        let names: Vec<&str> = period
            .records
            .iter()
            .map(|r| r.neighborhood.as_str())
            .collect();
        assert_eq!(names, ["Barrio 1", "Barrio 3"]);
    }
}
