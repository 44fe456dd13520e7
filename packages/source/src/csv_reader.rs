//! CSV parsing of decoded uploads.
//!
//! Parses the header row, locates the six required columns through the
//! source's [`ColumnMapping`] aliases, and returns every data row as a
//! [`RawIncident`] with its text already repaired. Columns not named in the
//! mapping are ignored.

use std::collections::BTreeMap;

use incident_map_source_models::{ColumnMapping, ColumnRole, RawIncident};

use crate::SourceError;
use crate::text::TextNormalizer;

/// Parses `text` as CSV and extracts the required columns.
///
/// Header names are matched case-insensitively after text repair, so a
/// mis-decoded `DISEÃ‘O` header still matches a `diseño` alias.
///
/// # Errors
///
/// Returns [`SourceError::Format`] if the CSV is malformed, has no header
/// row, or lacks any required column.
pub fn read_raw_incidents(
    text: &str,
    columns: &ColumnMapping,
    normalizer: &TextNormalizer,
) -> Result<Vec<RawIncident>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SourceError::format(format!("unreadable CSV header: {e}")))?
        .iter()
        .map(|h| normalizer.normalize(h).to_lowercase())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(SourceError::format("CSV file contains no header row"));
    }

    let indices = locate_columns(&headers, columns)?;
    let field = |record: &csv::StringRecord, role: ColumnRole| -> String {
        indices
            .get(&role)
            .and_then(|&i| record.get(i))
            .unwrap_or("")
            .to_string()
    };

    let mut incidents = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i as u64 + 1;
        let record = result
            .map_err(|e| SourceError::format(format!("malformed CSV at data row {row}: {e}")))?;

        if record.iter().all(|value| value.trim().is_empty()) {
            log::debug!("Skipping blank row {row}");
            continue;
        }

        let mut incident = RawIncident {
            row,
            date: field(&record, ColumnRole::Date),
            time: field(&record, ColumnRole::Time),
            neighborhood: field(&record, ColumnRole::Neighborhood),
            road_design: field(&record, ColumnRole::RoadDesign),
            longitude: field(&record, ColumnRole::Longitude),
            latitude: field(&record, ColumnRole::Latitude),
        };
        normalizer.normalize_incident(&mut incident);
        incidents.push(incident);
    }

    log::debug!("Parsed {} rows from CSV", incidents.len());

    Ok(incidents)
}

/// Maps each required role to its header index.
fn locate_columns(
    headers: &[String],
    columns: &ColumnMapping,
) -> Result<BTreeMap<ColumnRole, usize>, SourceError> {
    let mut indices = BTreeMap::new();
    let mut missing = Vec::new();

    for &role in ColumnRole::all() {
        let position = columns.aliases(role).iter().find_map(|alias| {
            let alias = alias.trim().to_lowercase();
            headers.iter().position(|h| *h == alias)
        });
        match position {
            Some(i) => {
                indices.insert(role, i);
            }
            None => missing.push(role.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(indices)
    } else {
        Err(SourceError::format(format!(
            "missing required columns: {} (found: {})",
            missing.join(", "),
            headers.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_source;

    fn read(text: &str) -> Result<Vec<RawIncident>, SourceError> {
        let source = default_source();
        read_raw_incidents(text, &source.columns, &TextNormalizer::new(&source.text))
    }

    #[test]
    fn reads_rows_by_alias() {
        let rows = read(
            "ID,FECHA_ACCIDENTE,HORA,BARRIO,DISEÑO,LONGITUD,LATITUD,EXTRA\n\
             1,2019-01-05,02:30 PM, Laureles ,Glorieta,-75.59,6.24,x\n",
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[0].date, "2019-01-05");
        assert_eq!(rows[0].neighborhood, "Laureles");
        assert_eq!(rows[0].road_design, "Glorieta");
        assert_eq!(rows[0].latitude, "6.24");
    }

    #[test]
    fn repairs_headers_before_matching() {
        let rows = read(
            "fecha,hora,barrio,DISEÃ±O,longitud,latitud\n\
             2019-01-05,02:30 PM,BelÃ©n,Glorieta,-75.59,6.24\n",
        )
        .unwrap();
        assert_eq!(rows[0].neighborhood, "Belén");
    }

    #[test]
    fn missing_columns_is_format_error() {
        let err = read("fecha,hora,barrio\n2019-01-05,02:30 PM,Laureles\n").unwrap_err();
        match err {
            SourceError::Format { message } => {
                assert!(message.contains("road_design"), "{message}");
                assert!(message.contains("longitude"), "{message}");
                assert!(message.contains("latitude"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_input_is_format_error() {
        assert!(matches!(read("").unwrap_err(), SourceError::Format { .. }));
    }

    #[test]
    fn short_rows_yield_empty_fields_and_blank_rows_are_skipped() {
        let rows = read(
            "fecha,hora,barrio,diseno,longitud,latitud\n\
             2019-01-05,02:30 PM,Laureles,Glorieta\n\
             ,,,,,\n",
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].longitude, "");
        assert_eq!(rows[0].latitude, "");
    }
}
