//! mlcanvas CLI entry point.
//!
//! This binary is the composition root for the workspace. Responsibilities:
//!
//! 1. **Parse configuration**: load `.mlcanvas/config.toml` (or `--config`)
//!    and apply `--api-url` / `MLCANVAS_API_URL`.
//! 2. **Wire observability**: install `tracing-subscriber` with a pretty or
//!    JSON layer and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an
//!    OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: build the [`ml_service::HttpTrainingService`]
//!    and inject it into an [`editor::EditorSession`].
//! 4. **Dispatch**: `catalog`, `upload` or `run`, printing JSON to stdout.

mod commands;
mod config;
mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use editor::EditorSession;
use ml_service::HttpTrainingService;
use pipeline::{ModelType, PreprocessingMethod};
use serde::Serialize;
use tracing::{error, info};

use crate::commands::RunOptions;
use crate::config::CliConfig;

#[derive(Debug, Parser)]
#[command(name = "mlcanvas", version, about = "Build and run ML pipelines against a training service")]
struct Cli {
    /// Configuration file (defaults to `.mlcanvas/config.toml` when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Training service base URL.
    #[arg(long, global = true, env = "MLCANVAS_API_URL")]
    api_url: Option<String>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the node palette.
    Catalog,
    /// Upload a dataset and print its columns.
    Upload {
        /// CSV file to upload.
        file: PathBuf,
    },
    /// Build the four-stage pipeline, configure it and train a model.
    Run {
        /// CSV file to upload.
        file: PathBuf,
        /// Target column (defaults to the last column).
        #[arg(long)]
        target: Option<String>,
        /// Training fraction in [0.1, 0.9], snapped to steps of 0.1.
        #[arg(long)]
        split: Option<f64>,
        /// `StandardScaler` or `MinMaxScaler`.
        #[arg(long)]
        preprocessing: Option<PreprocessingMethod>,
        /// `"Logistic Regression"` or `"Decision Tree"`.
        #[arg(long)]
        model: Option<ModelType>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let telemetry = telemetry::init(cli.log_json)?;

    let outcome = execute(cli).await;
    if let Err(e) = &outcome {
        error!(error = %e, "Command failed");
    }

    telemetry.shutdown();
    outcome
}

async fn execute(cli: Cli) -> Result<()> {
    if let Command::Catalog = cli.command {
        return print_json(&commands::catalog());
    }

    let config = CliConfig::load(cli.config.as_deref())?.with_api_url(cli.api_url);
    let service = Arc::new(HttpTrainingService::new(config.service.clone())?);
    let session = EditorSession::new(service, config.editor);
    info!(session_id = %session.id(), base_url = %config.service.base_url, "Session started");

    match cli.command {
        Command::Catalog => Ok(()),
        Command::Upload { file } => {
            let file = commands::read_dataset(&file).await?;
            let columns = commands::upload(&session, file).await?;
            print_json(&columns)
        }
        Command::Run {
            file,
            target,
            split,
            preprocessing,
            model,
        } => {
            let file = commands::read_dataset(&file).await?;
            let options = RunOptions {
                target,
                split,
                preprocessing,
                model,
            };
            let result = commands::run(&session, file, options).await?;
            print_json(&result)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_arguments_parse_into_domain_types() {
        let cli = Cli::try_parse_from([
            "mlcanvas",
            "run",
            "iris.csv",
            "--split",
            "0.7",
            "--preprocessing",
            "minmaxscaler",
            "--model",
            "Decision Tree",
        ])
        .unwrap();

        match cli.command {
            Command::Run {
                split,
                preprocessing,
                model,
                target,
                ..
            } => {
                assert_eq!(split, Some(0.7));
                assert_eq!(preprocessing, Some(PreprocessingMethod::MinMaxScaler));
                assert_eq!(model, Some(ModelType::DecisionTree));
                assert_eq!(target, None);
            }
            other => panic!("Expected Run, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        assert!(Cli::try_parse_from(["mlcanvas", "run", "iris.csv", "--model", "svm"]).is_err());
    }
}
