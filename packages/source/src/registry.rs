//! Source registry: the embedded Medellín source definition plus loading of
//! user-supplied definitions.
//!
//! The default `.toml` in `packages/source/sources/` is baked into the
//! binary at compile time via [`include_str!`]. Other exports with different
//! column names or text damage can be described in a TOML file of the same
//! shape and loaded with [`load_source`].

use std::path::Path;

use incident_map_source_models::SourceDefinition;

use crate::SourceError;

/// The default source TOML, embedded at compile time.
const DEFAULT_SOURCE_TOML: &str = include_str!("../sources/medellin.toml");

/// Parses a TOML string into a [`SourceDefinition`].
///
/// # Errors
///
/// Returns [`SourceError::Config`] if the TOML is malformed or missing
/// required fields.
pub fn parse_source_toml(toml_str: &str) -> Result<SourceDefinition, SourceError> {
    Ok(toml::de::from_str(toml_str)?)
}

/// Returns the embedded default source definition.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time guarantee
/// since the config is embedded).
#[must_use]
pub fn default_source() -> SourceDefinition {
    parse_source_toml(DEFAULT_SOURCE_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse medellin.toml: {e}"))
}

/// Loads a source definition from a TOML file on disk.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the file cannot be read, or
/// [`SourceError::Config`] if it does not parse.
pub fn load_source(path: &Path) -> Result<SourceDefinition, SourceError> {
    let contents = std::fs::read_to_string(path)?;
    let source = parse_source_toml(&contents)?;
    log::info!("Loaded source {} from {}", source.id, path.display());
    Ok(source)
}

#[cfg(test)]
mod tests {
    use incident_map_source_models::{ColumnRole, Encoding, InvalidTimePolicy};

    use super::*;

    #[test]
    fn parses_medellin_toml() {
        let source = default_source();
        assert_eq!(source.id, "medellin_incidentes_viales");
        assert_eq!(source.city, "Medellín");
        assert_eq!(source.default_encoding, Encoding::Utf8);
        assert_eq!(source.temporal.invalid_time, InvalidTimePolicy::RejectBatch);
        assert!((source.map.center_latitude - 6.2442).abs() < f64::EPSILON);
        assert!((source.map.center_longitude - -75.5812).abs() < f64::EPSILON);
        assert_eq!(source.map.zoom, 12);
    }

    #[test]
    fn every_role_has_aliases() {
        let source = default_source();
        for &role in ColumnRole::all() {
            assert!(
                !source.columns.aliases(role).is_empty(),
                "no aliases for {role}"
            );
        }
    }

    #[test]
    fn bare_catch_all_substitution_is_last() {
        let source = default_source();
        let last = source.text.substitutions.last().unwrap();
        assert_eq!(last.from, "Ã");
        assert_eq!(last.to, "Á");
        assert!(
            source.text.substitutions[..source.text.substitutions.len() - 1]
                .iter()
                .all(|s| s.from.chars().count() == 2)
        );
    }

    #[test]
    fn rejects_incomplete_toml() {
        let err = parse_source_toml("id = \"x\"\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, SourceError::Config(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_source(Path::new("/nonexistent/incident-map/source.toml")).unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
