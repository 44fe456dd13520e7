#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the traffic incident map.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use incident_map_analytics_models::FilterRequest;
use incident_map_database::paths::DEFAULT_DATA_DIR;
use incident_map_incident_models::ArtifactKind;
use incident_map_ingest::IncidentService;

#[derive(Parser)]
#[command(name = "incident_map", about = "Traffic incident map and hourly chart tool")]
struct Cli {
    /// Source definition TOML (defaults to the embedded Medellín source)
    #[arg(long, global = true, env = "INCIDENT_MAP_CONFIG")]
    config: Option<PathBuf>,
    /// Data directory holding the dataset and generated artifacts
    #[arg(long, global = true, env = "INCIDENT_MAP_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest an incident CSV into the canonical dataset
    Ingest {
        /// Path to the CSV file
        file: PathBuf,
        /// Character encoding of the file (utf-8, latin-1, windows-1252).
        /// Defaults to the source's configured encoding.
        #[arg(long)]
        encoding: Option<String>,
    },
    /// Filter the dataset and render the map and chart for the subset
    Filter {
        /// Neighborhood name, or "all"
        #[arg(long)]
        neighborhood: Option<String>,
        /// Hour bucket (general, madrugada, manana, tarde, noche), or "all"
        #[arg(long)]
        hour_bucket: Option<String>,
        /// Road design category, or "all"
        #[arg(long)]
        road_design: Option<String>,
        /// Year, or "all"
        #[arg(long)]
        year: Option<String>,
    },
    /// Write the latest rendered artifact to a file or stdout
    Artifact {
        /// Artifact kind (map or chart)
        kind: ArtifactKind,
        /// Output path. Prints to stdout if omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the neighborhoods, road designs, years, and hour buckets in the
    /// dataset
    Categories,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let service = IncidentService::open(cli.config.as_deref(), &cli.data_dir)?;

    let Some(command) = cli.command else {
        return incident_map_ingest::interactive::run(&service);
    };

    match command {
        Commands::Ingest { file, encoding } => {
            let bytes = std::fs::read(&file)?;
            log::info!("Ingesting {} ({} bytes)", file.display(), bytes.len());
            let result = service.ingest(&bytes, encoding.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Filter {
            neighborhood,
            hour_bucket,
            road_design,
            year,
        } => {
            let result = service.apply_filter(&FilterRequest {
                neighborhood,
                hour_bucket,
                road_design,
                year,
            })?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Artifact { kind, output } => {
            let bytes = service.get_artifact(kind)?;
            if let Some(path) = output {
                std::fs::write(&path, &bytes)?;
                log::info!(
                    "Wrote {kind} artifact ({}) to {}",
                    kind.content_type(),
                    path.display()
                );
            } else {
                log::debug!("Writing {kind} artifact ({}) to stdout", kind.content_type());
                use std::io::Write as _;
                std::io::stdout().write_all(&bytes)?;
            }
        }
        Commands::Categories => {
            let categories = service.categories()?;
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }
    }

    Ok(())
}
