//! Hour-of-day frequency chart.
//!
//! One connected line over hours 0-23 with a marker per hour, drawn with the
//! `plotters` SVG backend into an in-memory string.

use incident_map_analytics_models::HourCount;
use plotters::prelude::*;

use crate::RenderError;

const WIDTH: u32 = 960;
const HEIGHT: u32 = 540;
const LINE_COLOR: RGBColor = RGBColor(200, 30, 45);

/// Renders `hourly` as an SVG line chart titled `title`.
///
/// `hourly` should hold one entry per hour; missing hours are drawn as
/// zero. An all-zero (or empty) input renders an empty chart with a unit
/// y axis.
///
/// # Errors
///
/// Returns [`RenderError::Chart`] if `plotters` fails to lay out the chart.
pub fn render_hourly_chart(hourly: &[HourCount], title: &str) -> Result<String, RenderError> {
    let mut counts = [0_u64; 24];
    for entry in hourly {
        if let Some(count) = counts.get_mut(usize::from(entry.hour)) {
            *count = entry.count;
        }
    }
    let points: Vec<(u32, u64)> = (0_u32..).zip(counts).collect();
    let y_max = counts.iter().copied().max().unwrap_or(0).max(1);

    let mut svg = String::new();
    draw(&mut svg, &points, y_max, title).map_err(|e| RenderError::Chart {
        message: e.to_string(),
    })?;
    Ok(svg)
}

fn draw(
    svg: &mut String,
    points: &[(u32, u64)],
    y_max: u64,
    title: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::with_string(svg, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(0_u32..23_u32, 0_u64..(y_max + y_max / 10 + 1))?;

    chart
        .configure_mesh()
        .x_labels(24)
        .x_label_formatter(&|hour| format!("{hour:02}"))
        .x_desc("Hora del día")
        .y_desc("Número de accidentes")
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), &LINE_COLOR))?;
    chart.draw_series(
        points
            .iter()
            .map(|&point| Circle::new(point, 3, LINE_COLOR.filled())),
    )?;

    root.present()?;
    Ok(())
}
