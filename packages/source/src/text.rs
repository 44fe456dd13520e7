//! Repair of mis-decoded text.
//!
//! Incident exports are frequently UTF-8 that some tool along the way read
//! as Latin-1, turning `Á` into `Ã` followed by a stray byte. The
//! [`TextNormalizer`] trims every value and applies the source's ordered
//! literal substitution table. It is a patch list, not a decoder: sequences
//! the table does not mention are left untouched.

use incident_map_source_models::{RawIncident, Substitution, TextConfig};

/// Applies a source's substitution table to text values.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    substitutions: Vec<Substitution>,
}

impl TextNormalizer {
    /// Creates a normalizer from the source's text config. Empty `from`
    /// patterns are ignored.
    #[must_use]
    pub fn new(config: &TextConfig) -> Self {
        let substitutions = config
            .substitutions
            .iter()
            .filter(|s| !s.from.is_empty())
            .cloned()
            .collect();
        Self { substitutions }
    }

    /// Trims `value` and applies every substitution in order.
    #[must_use]
    pub fn normalize(&self, value: &str) -> String {
        let mut text = value.trim().to_string();
        for substitution in &self.substitutions {
            if text.contains(&substitution.from) {
                text = text.replace(&substitution.from, &substitution.to);
            }
        }
        text
    }

    /// Normalizes every text column of `incident` in place.
    pub fn normalize_incident(&self, incident: &mut RawIncident) {
        for field in [
            &mut incident.date,
            &mut incident.time,
            &mut incident.neighborhood,
            &mut incident.road_design,
            &mut incident.longitude,
            &mut incident.latitude,
        ] {
            *field = self.normalize(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_source;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(&default_source().text)
    }

    #[test]
    fn repairs_lost_second_byte() {
        assert_eq!(normalizer().normalize("SÃBADO"), "SÁBADO");
    }

    #[test]
    fn repairs_two_character_sequences() {
        let n = normalizer();
        assert_eq!(n.normalize("BelÃ©n"), "Belén");
        assert_eq!(n.normalize("CAÃ‘ADA"), "CAÑADA");
        assert_eq!(n.normalize("DiseÃ±o"), "Diseño");
        assert_eq!(n.normalize("GlorietÃ¡"), "Glorietá");
        assert_eq!(n.normalize("S\u{C3}\u{81}BADO"), "SÁBADO");
        assert_eq!(n.normalize("Mar\u{C3}\u{AD}a"), "María");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(normalizer().normalize("  Laureles \t"), "Laureles");
    }

    #[test]
    fn leaves_clean_and_unknown_text_alone() {
        let n = normalizer();
        assert_eq!(n.normalize("Tramo de vía"), "Tramo de vía");
        assert_eq!(n.normalize("Â¿"), "Â¿");
    }

    #[test]
    fn substitutions_apply_in_order() {
        let config = TextConfig {
            substitutions: vec![
                Substitution {
                    from: "ab".to_string(),
                    to: "X".to_string(),
                },
                Substitution {
                    from: "a".to_string(),
                    to: "Y".to_string(),
                },
                Substitution {
                    from: String::new(),
                    to: "never".to_string(),
                },
            ],
        };
        assert_eq!(TextNormalizer::new(&config).normalize("aba"), "XY");
    }

    #[test]
    fn normalizes_every_field() {
        let mut incident = RawIncident {
            row: 1,
            date: " 2019-01-01 ".to_string(),
            time: " 10:00 AM".to_string(),
            neighborhood: "BelÃ©n ".to_string(),
            road_design: " SÃBADO".to_string(),
            longitude: " -75.5 ".to_string(),
            latitude: "6.2 ".to_string(),
        };
        normalizer().normalize_incident(&mut incident);
        assert_eq!(incident.date, "2019-01-01");
        assert_eq!(incident.time, "10:00 AM");
        assert_eq!(incident.neighborhood, "Belén");
        assert_eq!(incident.road_design, "SÁBADO");
        assert_eq!(incident.longitude, "-75.5");
        assert_eq!(incident.latitude, "6.2");
    }
}
