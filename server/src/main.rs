use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tokio::join;
use tokio::task::spawn;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use satchel_server::config;

/// Coursework submission and archival server.
#[derive(Debug, Parser)]
#[clap(version)]
#[clap(propagate_version = true)]
struct Opts {
    /// Path to the config file.
    #[clap(short = 'f', long)]
    config: Option<PathBuf>,

    /// Socket address to listen on.
    ///
    /// This overrides `listen` in the config.
    #[clap(short = 'l', long)]
    listen: Option<SocketAddr>,

    /// Mode to run.
    #[clap(long, default_value = "monolithic")]
    mode: ServerMode,

    /// Whether to enable tokio-console.
    ///
    /// The console server will listen on its default port.
    #[clap(long)]
    tokio_console: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ServerMode {
    /// Run all components.
    Monolithic,

    /// Run the API server.
    ApiServer,

    /// Run reconciliation periodically.
    Reconciler,

    /// Run the database migrations then exit.
    DbMigrations,

    /// Run reconciliation then exit.
    ReconcileOnce,

    /// Check the configuration then exit.
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    init_logging(opts.tokio_console);
    dump_version();

    let config =
        config::load_config(opts.config.as_deref(), opts.mode == ServerMode::Monolithic).await?;

    match opts.mode {
        ServerMode::Monolithic => {
            satchel_server::run_migrations(config.clone()).await?;

            let (api_server, _) = join!(
                satchel_server::run_api_server(opts.listen, config.clone()),
                satchel_server::reconcile::run_reconciliation(config.clone()),
            );

            api_server?;
        }
        ServerMode::ApiServer => {
            satchel_server::run_api_server(opts.listen, config).await?;
        }
        ServerMode::Reconciler => {
            satchel_server::reconcile::run_reconciliation(config.clone()).await;
        }
        ServerMode::DbMigrations => {
            satchel_server::run_migrations(config).await?;
        }
        ServerMode::ReconcileOnce => {
            let report = satchel_server::reconcile::run_reconciliation_once(config).await?;

            for orphan in &report.orphans {
                println!("orphan\t{}", orphan);
            }
            for dangling in &report.dangling {
                println!("dangling\t{}", dangling);
            }
        }
        ServerMode::CheckConfig => {
            // config is valid, let's just exit :)
        }
    }

    Ok(())
}

fn init_logging(tokio_console: bool) {
    let env_filter = EnvFilter::from_default_env();
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(env_filter);

    let error_layer = ErrorLayer::default();

    let console_layer = if tokio_console {
        let (layer, server) = console_subscriber::ConsoleLayer::new();
        spawn(server.serve());
        Some(layer)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(error_layer)
        .with(console_layer)
        .init();

    if tokio_console {
        eprintln!("Note: tokio-console is enabled");
    }
}

fn dump_version() {
    #[cfg(debug_assertions)]
    eprintln!("Satchel Server {} (debug)", env!("CARGO_PKG_VERSION"));

    #[cfg(not(debug_assertions))]
    eprintln!("Satchel Server {} (release)", env!("CARGO_PKG_VERSION"));
}
