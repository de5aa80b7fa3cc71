// Bastion - Batch maintenance for the Fatins document store
// Copyright (c) 2025 Fatins Contributors
// Licensed under the MIT License

use bastion::cli::commands::EXIT_FATAL;
use bastion::cli::{Cli, Commands};
use bastion::config::{load_config, LoggingConfig};
use bastion::logging::{init_logging, LoggingGuard};
use clap::Parser;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        "Bastion - batch maintenance for the Fatins document store"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        eprintln!("Shutdown signal received, finishing documents in flight...");
        let _ = shutdown_tx.send(true);
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // process::exit skips destructors; flush file logs first
    drop(guard);
    process::exit(exit_code);
}

/// Log level and file logging come from the config file when it loads;
/// `--log-level` wins over the file.
fn setup_logging(cli: &Cli) -> bastion::domain::Result<LoggingGuard> {
    let (file_level, logging) = match (&cli.command, load_config(&cli.config)) {
        (Commands::Init(_), _) | (_, Err(_)) => (None, LoggingConfig::default()),
        (_, Ok(config)) => (Some(config.application.log_level), config.logging),
    };
    let level = cli
        .log_level
        .clone()
        .or(file_level)
        .unwrap_or_else(|| "info".to_string());
    init_logging(&level, &logging)
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Received SIGINT, initiating graceful shutdown");
                    }
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    }
                }
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received SIGINT, initiating graceful shutdown"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            // never raise shutdown without a signal
            std::future::pending::<()>().await;
        }
    }
}

async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Migrate(args) => args.execute(&cli.config).await,
        Commands::MigrateAll(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::Export(args) => args.execute(&cli.config).await,
        Commands::Seed(args) => args.execute(&cli.config).await,
        Commands::Show(args) => args.execute(&cli.config).await,
        Commands::List(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
