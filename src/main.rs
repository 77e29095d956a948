// ClaimRecon - Hospital claim reconciliation
// Copyright (c) 2025 ClaimRecon Contributors
// Licensed under the MIT License

use claimrecon::cli::commands::EXIT_FATAL;
use claimrecon::cli::{Cli, Commands};
use claimrecon::config::{load_config, LoggingConfig};
use claimrecon::logging::init_logging;
use clap::Parser;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Commands report configuration errors themselves; logging falls back to defaults
    let (log_level, logging_config) = match load_config(&cli.config) {
        Ok(config) => (config.application.log_level, config.logging),
        Err(_) => ("info".to_string(), LoggingConfig::default()),
    };
    let log_level = cli.log_level.clone().unwrap_or(log_level);
    let logging_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "claimrecon starting");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    if tokio::signal::ctrl_c().await.is_ok() {
                        notify_shutdown(&shutdown_tx, "SIGINT");
                    }
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => notify_shutdown(&shutdown_tx, "SIGINT"),
                _ = sigterm.recv() => notify_shutdown(&shutdown_tx, "SIGTERM"),
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                notify_shutdown(&shutdown_tx, "SIGINT");
            }
        }
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    drop(logging_guard);
    process::exit(exit_code);
}

fn notify_shutdown(shutdown_tx: &watch::Sender<bool>, signal: &str) {
    tracing::info!(signal, "Shutdown requested; finishing the current batch");
    eprintln!("\n⚠️  Shutdown signal received, completing current batch...");
    let _ = shutdown_tx.send(true);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Ingest(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::Query(args) => args.execute(&cli.config).await,
        Commands::Inspect(args) => args.execute(&cli.config).await,
        Commands::Status(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
