use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use humact_core::{
    load_interact_config, BatchCoordinator, CdpLauncher, InteractionController, RunSummary,
    TaskRunner, TimingModel,
};

pub mod batch;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] humact_core::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("driver error: {0}")]
    Driver(#[from] humact_core::DriverError),
    #[error("interaction error: {0}")]
    Interact(#[from] humact_core::InteractError),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("batch file {path}: {source}")]
    BatchParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("batch references unknown target '{0}'")]
    UnknownTarget(String),
    #[error("{failed} of {attempted} task(s) failed")]
    TasksFailed { failed: usize, attempted: usize },
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Humanlike web interaction runner", long_about = None)]
pub struct Cli {
    /// Path to the interaction config
    #[arg(long, default_value = "configs/interact.toml")]
    pub config: PathBuf,
    /// Force headless mode regardless of the config
    #[arg(long)]
    pub headless: bool,
    /// Seed the timing model for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
    /// Output format for the run summary
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a batch of tasks described in a TOML file
    Run {
        /// Path to the batch description
        #[arg(long)]
        batch: PathBuf,
    },
    /// Load and validate the config, then exit
    CheckConfig,
}

pub async fn run(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = load_interact_config(&cli.config)?;
    if cli.headless {
        config.browser.headless = true;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    match &cli.command {
        Commands::CheckConfig => {
            println!(
                "ok: {} timing categories, {} targets",
                config.timing.len(),
                config.targets.len()
            );
            Ok(())
        }
        Commands::Run { batch } => {
            let plan = batch::load_batch(batch)?;
            let tasks = batch::build_tasks(&plan, &config)?;
            info!(tasks = tasks.len(), config = %cli.config.display(), "starting run");

            let driver = CdpLauncher::new(config.browser.clone()).launch().await?;
            let timing = std::sync::Arc::new(TimingModel::new(config.timing.clone(), config.seed));
            let controller = InteractionController::new(Box::new(driver), &config, timing);
            let runner = TaskRunner::new(controller, config.retry.clone(), config.diagnostics.clone());
            let mut coordinator = BatchCoordinator::new(runner);

            let cancel = coordinator.cancel_flag();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("interrupt received, finishing the current task");
                    cancel.cancel();
                }
            });

            let summary = coordinator.run(&tasks).await;
            coordinator.into_controller().shutdown().await?;

            render(&summary, cli.format)?;
            if summary.failed > 0 {
                return Err(AppError::TasksFailed {
                    failed: summary.failed,
                    attempted: summary.attempted,
                });
            }
            Ok(())
        }
    }
}

fn render(summary: &RunSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!(
                "run {}: {} attempted, {} succeeded, {} failed",
                summary.run_id, summary.attempted, summary.succeeded, summary.failed
            );
            for failure in &summary.failures {
                println!("  {}: {}", failure.label, failure.reason);
            }
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
            Ok(())
        }
    }
}
