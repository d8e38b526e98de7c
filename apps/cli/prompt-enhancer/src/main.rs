use prompt_enhancer::cli::Cli;
use prompt_enhancer::commands;
use prompt_enhancer::error::AppError;
use prompt_enhancer::logger::{initialize as LoggerInitialize, level_for};

use enhancer_core::Enhancer;
use enhancer_core::config::{DeploymentMode, EnhancerConfig, ModelCatalog};
use enhancer_core::credentials::{ServerKeys, load_server_keys};
use enhancer_core::store::FileStateStore;

use std::fs::create_dir_all;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{}", output.json);
            if output.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{e}");
            match serde_json::to_string(&e) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{e}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<commands::CommandOutput, AppError> {
    let data_dir: PathBuf = match cli.data_dir {
        Some(dir) => dir,
        None => EnhancerConfig::default_dir()?,
    };

    create_dir_all(&data_dir).map_err(|e| {
        AppError::app(format!(
            "Failed to create data directory {}: {e}",
            data_dir.display()
        ))
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&data_dir, level_for(cli.verbose))?;

    info!("Prompt enhancer starting");
    info!("Data directory: {}", data_dir.display());

    let config = EnhancerConfig::load(&data_dir)?;
    let catalog = ModelCatalog::load(&data_dir)?;
    let store = FileStateStore::new(&data_dir);

    // Vendor keys are only held server-side in the backend deployment
    let server_keys = match config.deployment {
        DeploymentMode::Backend => load_server_keys(),
        DeploymentMode::Extension => ServerKeys::default(),
    };

    let enhancer = Enhancer::new(config, store)?
        .with_server_keys(server_keys)
        .with_catalog(catalog);

    commands::run(&enhancer, cli.command).await
}
