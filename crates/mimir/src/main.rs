//! Mimir CLI - encrypted local cache for a remote secrets vault
//!
//! This is the main entry point for the Mimir command-line interface.

mod cli;
mod clipboard;
mod commands;
mod output;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use mimir_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use output::DeliveryMode;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<mimir_core::Error>() {
            // Clean "nothing matched" outcomes: report without a trace
            Some(e) if e.is_not_found() => output::warning(&e.to_string()),
            _ => output::error(&format!("{:#}", err)),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    if let Some(command) = cli.command {
        return match command {
            Commands::Init(args) => commands::init::run(config_path, args.force).await,
            Commands::ClearClipboard(args) => commands::clear::run(&args).await,
        };
    }

    let config = Arc::new(Config::load(config_path)?);

    if cli.forget {
        return commands::forget::run(config).await;
    }

    let mode = if cli.print {
        DeliveryMode::Print
    } else {
        DeliveryMode::Clipboard
    };

    match (cli.title, cli.field) {
        // Zero arguments: list every title
        (None, _) => commands::list::run(config, cli.refresh).await,
        (Some(title), field) => {
            let field = field.unwrap_or_else(|| "password".to_string());
            commands::get::run(config, &title, &field, cli.refresh, mode).await
        }
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Quiet by default: secrets flow through stdout and pipes
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
