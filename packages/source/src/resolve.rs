//! Temporal resolution of a raw batch.
//!
//! Derives the hour, date, and coordinates of every [`RawIncident`]. Date
//! failures are soft (the row keeps `date: None` and is discarded later by
//! the period filter); time failures follow the source's
//! [`InvalidTimePolicy`].

use incident_map_source_models::{
    ColumnRole, InvalidTimePolicy, RawIncident, ResolvedIncident, TemporalConfig,
};

use crate::SourceError;
use crate::parsing::{parse_coordinate, parse_date, parse_hour};

/// Output of [`resolve_batch`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBatch {
    /// Rows that survived time parsing, in upload order.
    pub incidents: Vec<ResolvedIncident>,
    /// Rows whose date could not be parsed (still present in `incidents`).
    pub missing_date: u64,
    /// Rows dropped for an unparseable time.
    pub invalid_time: u64,
}

/// Resolves every row of a raw batch.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] for the first row with an unparseable
/// time when `config.invalid_time` is [`InvalidTimePolicy::RejectBatch`].
pub fn resolve_batch(
    raw: Vec<RawIncident>,
    config: &TemporalConfig,
) -> Result<ResolvedBatch, SourceError> {
    let mut incidents = Vec::with_capacity(raw.len());
    let mut missing_date = 0_u64;
    let mut invalid_time = 0_u64;

    for row in raw {
        let Some(hour) = parse_hour(&row.time, config) else {
            match config.invalid_time {
                InvalidTimePolicy::RejectBatch => {
                    return Err(SourceError::Parse {
                        row: row.row,
                        column: ColumnRole::Time,
                        value: row.time,
                    });
                }
                InvalidTimePolicy::DropRow => {
                    log::debug!("Dropping row {}: unparseable time {:?}", row.row, row.time);
                    invalid_time += 1;
                    continue;
                }
            }
        };

        let date = parse_date(&row.date, config);
        if date.is_none() {
            log::debug!("Row {}: unparseable date {:?}", row.row, row.date);
            missing_date += 1;
        }

        incidents.push(ResolvedIncident {
            row: row.row,
            date,
            hour,
            longitude: parse_coordinate(&row.longitude),
            latitude: parse_coordinate(&row.latitude),
            neighborhood: row.neighborhood,
            road_design: row.road_design,
        });
    }

    if invalid_time > 0 {
        log::warn!("Dropped {invalid_time} rows with unparseable times");
    }

    Ok(ResolvedBatch {
        incidents,
        missing_date,
        invalid_time,
    })
}
