//! Geospatial density map.
//!
//! A standalone HTML page using Leaflet with the `leaflet.heat` plugin.
//! Each valid coordinate pair contributes one point of equal weight; the
//! view is fixed at the source's configured center and zoom regardless of
//! where the points are.

use incident_map_analytics_models::GeoPoint;
use incident_map_source_models::MapConfig;

use crate::RenderError;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{{TITLE}}</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" crossorigin="anonymous" />
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js" crossorigin="anonymous"></script>
  <script src="https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js"></script>
  <style>
    html, body { height: 100%; margin: 0; font-family: sans-serif; }
    #map { position: absolute; top: 3rem; bottom: 0; left: 0; right: 0; }
    header { height: 3rem; display: flex; align-items: center; justify-content: space-between; padding: 0 1rem; }
    header h1 { font-size: 1.1rem; margin: 0; }
  </style>
</head>
<body>
  <header>
    <h1>{{TITLE}}</h1>
    <span>{{COUNT}} puntos</span>
  </header>
  <div id="map"></div>
  <script>
    const points = {{POINTS}};
    const map = L.map('map').setView([{{CENTER_LAT}}, {{CENTER_LON}}], {{ZOOM}});
    L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
      maxZoom: 19,
      attribution: '&copy; OpenStreetMap contributors'
    }).addTo(map);
    if (points.length > 0) {
      L.heatLayer(points, { radius: 15, blur: 20, maxZoom: 17 }).addTo(map);
    }
  </script>
</body>
</html>
"#;

/// Renders a density map of `points` as an HTML document.
///
/// An empty `points` slice renders a usable map with no heat layer.
///
/// # Errors
///
/// Returns [`RenderError::Json`] if the points cannot be serialized.
pub fn render_heatmap(
    points: &[GeoPoint],
    title: &str,
    map: &MapConfig,
) -> Result<String, RenderError> {
    let pairs: Vec<[f64; 2]> = points
        .iter()
        .map(|point| [point.latitude, point.longitude])
        .collect();
    let points_json = serde_json::to_string(&pairs)?;

    Ok(TEMPLATE
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{COUNT}}", &pairs.len().to_string())
        .replace("{{CENTER_LAT}}", &map.center_latitude.to_string())
        .replace("{{CENTER_LON}}", &map.center_longitude.to_string())
        .replace("{{ZOOM}}", &map.zoom.to_string())
        .replace("{{POINTS}}", &points_json))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEDELLIN: MapConfig = MapConfig {
        center_latitude: 6.2442,
        center_longitude: -75.5812,
        zoom: 12,
    };

    #[test]
    fn embeds_points_and_view() {
        let points = [
            GeoPoint {
                latitude: 6.25,
                longitude: -75.56,
            },
            GeoPoint {
                latitude: 6.21,
                longitude: -75.6,
            },
        ];
        let html = render_heatmap(&points, "Mapa de Calor", &MEDELLIN).unwrap();

        assert!(html.contains("const points = [[6.25,-75.56],[6.21,-75.6]];"));
        assert!(html.contains("setView([6.2442, -75.5812], 12)"));
        assert!(html.contains("<title>Mapa de Calor</title>"));
        assert!(html.contains("2 puntos"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn renders_empty_map() {
        let html = render_heatmap(&[], "Sin datos", &MEDELLIN).unwrap();
        assert!(html.contains("const points = [];"));
        assert!(html.contains("L.map('map')"));
        assert!(html.contains("0 puntos"));
    }

    #[test]
    fn escapes_title() {
        let html = render_heatmap(&[], "A & B <script>", &MEDELLIN).unwrap();
        assert!(html.contains("<h1>A &amp; B &lt;script&gt;</h1>"));
    }
}
