#![allow(clippy::module_name_repetitions)]

//! Interactive menu for the incident map tool.
//!
//! Provides a menu-driven interface using `dialoguer` for ingesting files
//! and picking filter values from the categories actually present in the
//! dataset, without memorizing CLI flags.

use std::path::PathBuf;

use dialoguer::{Input, Select};
use incident_map_analytics_models::FilterRequest;
use incident_map_incident_models::{ArtifactKind, HourBucket};
use incident_map_source_models::Encoding;

use crate::IncidentService;

/// Label shown for the "every value" choice in filter menus.
const ALL_LABEL: &str = "Todos";

/// Top-level actions available in the interactive menu.
enum MenuAction {
    IngestFile,
    ApplyFilter,
    ListCategories,
    ExportArtifact,
}

impl MenuAction {
    const ALL: &[Self] = &[
        Self::IngestFile,
        Self::ApplyFilter,
        Self::ListCategories,
        Self::ExportArtifact,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::IngestFile => "Ingest a CSV file",
            Self::ApplyFilter => "Filter and render map + chart",
            Self::ListCategories => "List categories",
            Self::ExportArtifact => "Export latest artifact",
        }
    }
}

/// Runs the interactive menu, prompting the user to select and configure
/// one operation.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected operation fails.
pub fn run(service: &IncidentService) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = MenuAction::ALL.iter().map(MenuAction::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match MenuAction::ALL[idx] {
        MenuAction::IngestFile => ingest_file(service)?,
        MenuAction::ApplyFilter => apply_filter(service)?,
        MenuAction::ListCategories => list_categories(service)?,
        MenuAction::ExportArtifact => export_artifact(service)?,
    }

    Ok(())
}

/// Prompts for a file path and encoding, then ingests the file.
fn ingest_file(service: &IncidentService) -> Result<(), Box<dyn std::error::Error>> {
    let path: String = Input::new().with_prompt("CSV file path").interact_text()?;

    let encodings = [Encoding::Utf8, Encoding::Latin1, Encoding::Windows1252];
    let default = encodings
        .iter()
        .position(|e| *e == service.source().default_encoding)
        .unwrap_or(0);
    let labels: Vec<String> = encodings.iter().map(ToString::to_string).collect();
    let idx = Select::new()
        .with_prompt("File encoding")
        .items(&labels)
        .default(default)
        .interact()?;

    let bytes = std::fs::read(path.trim())?;
    let result = service.ingest(&bytes, Some(encodings[idx].as_ref()))?;

    println!("Dominant year: {}", result.year);
    println!("Rows read:            {}", result.summary.stats.rows_read);
    println!("Rows kept:            {}", result.summary.stats.rows_kept);
    println!("Outside period:       {}", result.summary.stats.rows_outside_period);
    println!("Unparseable dates:    {}", result.summary.stats.rows_missing_date);
    println!("Dropped (bad time):   {}", result.summary.stats.rows_invalid_time);
    println!("New rows in dataset:  {}", result.summary.merge.rows_added);
    println!("Dataset size:         {}", result.summary.merge.rows_after);

    Ok(())
}

/// Walks the user through one choice per filter dimension, then renders
/// the subset.
fn apply_filter(service: &IncidentService) -> Result<(), Box<dyn std::error::Error>> {
    let categories = service.categories()?;
    if categories.years.is_empty() {
        println!("The dataset is empty. Ingest a file first.");
        return Ok(());
    }

    let years: Vec<String> = categories.years.iter().map(ToString::to_string).collect();
    let buckets: Vec<String> = HourBucket::all()
        .iter()
        .map(|b| b.label().to_string())
        .collect();

    let request = FilterRequest {
        year: prompt_choice("Year", &years, true)?,
        neighborhood: prompt_choice("Neighborhood", &categories.neighborhoods, true)?,
        hour_bucket: prompt_choice("Time of day", &buckets, false)?,
        road_design: prompt_choice("Road design", &categories.road_designs, true)?,
    };

    let result = service.apply_filter(&request)?;
    println!("{}", result.summary.title);
    println!(
        "{} incidents ({} with coordinates)",
        result.summary.total_rows, result.summary.rows_with_coordinates
    );
    for entry in &result.artifacts {
        println!("  {} -> {}", entry.kind, entry.file);
    }

    Ok(())
}

/// Prompts for one value from `options`, optionally preceded by an "all"
/// entry. Returns `None` for "all".
fn prompt_choice(
    prompt: &str,
    options: &[String],
    with_all: bool,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let mut labels: Vec<&str> = Vec::with_capacity(options.len() + 1);
    if with_all {
        labels.push(ALL_LABEL);
    }
    labels.extend(options.iter().map(String::as_str));

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .max_length(20)
        .interact()?;

    if with_all && idx == 0 {
        return Ok(None);
    }
    Ok(Some(labels[idx].to_string()))
}

/// Prints the dataset's categories.
fn list_categories(service: &IncidentService) -> Result<(), Box<dyn std::error::Error>> {
    let categories = service.categories()?;

    println!("Years: {:?}", categories.years);
    println!("Neighborhoods ({}):", categories.neighborhoods.len());
    for name in &categories.neighborhoods {
        println!("  {name}");
    }
    println!("Road designs ({}):", categories.road_designs.len());
    for name in &categories.road_designs {
        println!("  {name}");
    }
    println!("Time of day:");
    for bucket in &categories.buckets {
        println!("  {}", bucket.label());
    }

    Ok(())
}

/// Copies the latest render of the chosen artifact to a user-given path.
fn export_artifact(service: &IncidentService) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<String> = ArtifactKind::all().iter().map(ToString::to_string).collect();
    let idx = Select::new()
        .with_prompt("Artifact")
        .items(&labels)
        .default(0)
        .interact()?;
    let kind = ArtifactKind::all()[idx];

    let bytes = service.get_artifact(kind)?;
    let path: String = Input::new()
        .with_prompt("Output path")
        .default(kind.file_name().to_string())
        .interact_text()?;
    let path = PathBuf::from(path.trim());
    std::fs::write(&path, bytes)?;
    println!("Wrote {}", path.display());

    Ok(())
}
