//! golearn — Go lessons, quizzes, and a code runner over HTTP
//!
//! Usage:
//!   golearn [serve]            start the web app (default)
//!   golearn run main.go        run a file through the sandboxed executor
//!   golearn doctor             check the installation

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use golearn_core::config::default_config_path;
use golearn_core::{Catalog, CheckStatus, CodeExecutor, GolearnConfig, run_doctor};
use golearn_gateway::{AppState, GatewayServer};
use golearn_progress::{ProgressStore, SqliteProgressStore};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "golearn", version, about = "Interactive Go lessons with a built-in code runner")]
struct Cli {
    /// Config file (defaults to ~/.golearn/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the API and web UI (default command)
    Serve {
        /// Override the listen port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run a Go source file the way the web runner does
    Run {
        file: PathBuf,

        /// Override the timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Check configuration, toolchain, storage, and content
    Doctor,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = GolearnConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run { file, timeout } => {
            if let Some(secs) = timeout {
                config.sandbox.limits.timeout_secs = secs;
            }
            run_file(&config, file).await
        }
        Commands::Doctor => {
            let config_path = cli
                .config
                .or_else(|| default_config_path().filter(|p| p.exists()));
            doctor(&config, config_path).await
        }
    }
}

async fn serve(config: GolearnConfig) -> Result<()> {
    let catalog = Arc::new(Catalog::builtin().context("Failed to load lesson content")?);
    let executor = CodeExecutor::new(config.sandbox.clone());
    if !executor.toolchain_available().await {
        warn!(
            "Toolchain '{}' not found; code runs will report errors",
            config.sandbox.toolchain.program
        );
    }

    let mut state = AppState::new(catalog, executor);
    if config.storage.enabled {
        let store: Arc<dyn ProgressStore> =
            Arc::new(SqliteProgressStore::new(&config.storage.db_path)?);
        state = state.with_progress(store);
    } else {
        info!("Progress storage disabled");
    }

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
        }
        shutdown.cancel();
    });

    GatewayServer::new(state, config.server.bind_addr())
        .start(cancel)
        .await
}

async fn run_file(config: &GolearnConfig, file: PathBuf) -> Result<ExitCode> {
    let code = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let executor = CodeExecutor::new(config.sandbox.clone());
    let result = executor.execute(&code).await?;

    print!("{}", result.output);
    if result.truncated {
        eprintln!("[output truncated]");
    }
    match result.error_message() {
        Some(message) => {
            eprintln!("{}", message);
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

async fn doctor(config: &GolearnConfig, config_path: Option<PathBuf>) -> Result<ExitCode> {
    let report = run_doctor(config, config_path.as_deref()).await?;

    for check in &report.checks {
        println!("[{}] {}: {}", check.status, check.name, check.message);
        if check.status != CheckStatus::Pass
            && let Some(hint) = &check.fix_hint
        {
            println!("       fix: {}", hint);
        }
    }
    println!("\n{}", report.summary());

    Ok(if report.is_healthy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
