//! autocluster - train and apply an automatically sized k-means model.

use autocluster::{AppConfig, ApiError, ArtifactStore, ClusterSearch, ClusterService, FileArtifactStore};
use chrono::Local;
use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::{LevelFilter, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "autocluster")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fit k-means with an automatically chosen k and label new data")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the artifact location from the configuration
    #[arg(long)]
    artifact: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on a CSV file and replace the stored model
    Train {
        /// Input CSV with a header row
        data: PathBuf,
    },

    /// Label a CSV file with the stored model
    Predict {
        /// Input CSV with a header row
        data: PathBuf,

        /// Output CSV (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a summary of the stored model
    Show,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match AppConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::default(),
    };
    if let Some(artifact) = cli.artifact {
        config.artifact_path = artifact;
    }

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        config.get_log_level().unwrap_or(LevelFilter::Info)
    };
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .init();

    let store = FileArtifactStore::new(&config.artifact_path);
    let service = ClusterService::with_search(store, ClusterSearch::from_config(&config.search));

    match run(&service, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error ({}): {}", e.status, e.detail);
            ExitCode::FAILURE
        }
    }
}

fn run(service: &ClusterService<FileArtifactStore>, command: Commands) -> Result<(), ApiError> {
    match command {
        Commands::Train { data } => {
            let content = read_input(&data)?;
            let response = service.train(&content)?;
            println!("{}", to_json(&response)?);
        }
        Commands::Predict { data, output } => {
            let content = read_input(&data)?;
            let response = service.predict(&content)?;
            match output {
                Some(path) => {
                    fs::write(&path, &response.body).map_err(internal)?;
                    info!("Wrote predictions to {:?}", path);
                }
                None => std::io::stdout().write_all(&response.body).map_err(internal)?,
            }
        }
        Commands::Show => {
            let artifact = service
                .store()
                .load()
                .map_err(internal)?
                .ok_or_else(|| ApiError {
                    status: ApiError::BAD_REQUEST,
                    detail: "Model not found. Please train the model first.".to_string(),
                })?;
            println!("artifact: {:?}", service.store().path());
            println!("k_value:  {}", artifact.k_value());
            println!("score:    {:.4}", artifact.score());
            println!("features: {}", artifact.features().names().join(", "));
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>, ApiError> {
    fs::read(path).map_err(|e| ApiError {
        status: ApiError::BAD_REQUEST,
        detail: format!("Failed to read {:?}: {}", path, e),
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(internal)
}

fn internal<E: std::fmt::Display>(e: E) -> ApiError {
    ApiError {
        status: ApiError::INTERNAL,
        detail: e.to_string(),
    }
}
