pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod models;
pub mod parser;
pub mod services;
pub mod state;
pub mod tracking;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use cli::{CatalogCommands, Cli, Commands};
pub use config::Config;
use metrics_exporter_prometheus::PrometheusHandle;
use services::Scheduler;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Daemon => run_daemon(config, prometheus_handle).await,

        Commands::Scan { show } => cli::cmd_scan(config, show).await,

        Commands::List => cli::cmd_list_shows(&config).await,

        Commands::Add {
            names,
            from,
            to,
            quality,
        } => cli::cmd_add_show(&config, names, from, to, quality).await,

        Commands::Edit {
            index,
            names,
            from,
            to,
            quality,
        } => cli::cmd_edit_show(&config, index, names, from, to, quality).await,

        Commands::Remove { index } => cli::cmd_remove_show(&config, index).await,

        Commands::Reset { index } => cli::cmd_reset_show(&config, index).await,

        Commands::Episodes { index } => cli::cmd_episodes(&config, index).await,

        Commands::Catalog { command } => match command {
            CatalogCommands::List => cli::cmd_catalog_list(&config).await,
            CatalogCommands::Set { name, lengths } => {
                cli::cmd_catalog_set(&config, &name, &lengths).await
            }
            CatalogCommands::Rename { from, to } => {
                cli::cmd_catalog_rename(&config, &from, &to).await
            }
            CatalogCommands::Remove { name } => cli::cmd_catalog_remove(&config, &name).await,
        },

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists, leaving it untouched.");
            }
            Ok(())
        }
    }
}

async fn run_daemon(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "Trackarr v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    let shared = Arc::new(SharedState::new(config.clone(), prometheus_handle).await?);

    let scheduler = Arc::new(Scheduler::new(
        Arc::clone(&shared.scanner),
        config.scheduler.clone(),
    ));

    let scheduler_handle = {
        let sched = Arc::clone(&scheduler);
        tokio::spawn(async move {
            if let Err(e) = sched.start().await {
                error!("Scheduler error: {}", e);
            }
        })
    };

    let server_handle: Option<tokio::task::JoinHandle<()>> = if config.server.enabled {
        let port = config.server.port;
        info!("Starting Web API on port {}", port);

        let app = api::router(api::create_app_state(Arc::clone(&shared)));
        let addr = format!("0.0.0.0:{port}");
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        Some(tokio::spawn(async move {
            info!("Web Server running at http://0.0.0.0:{}", port);
            if let Err(e) = axum::serve(listener, app).await {
                error!("Web server error: {}", e);
            }
        }))
    } else {
        None
    };

    info!("Daemon running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    scheduler.stop();
    shared.scanner.shutdown().await;
    if let Err(e) = scheduler_handle.await {
        error!("Scheduler task failed: {}", e);
    }
    if let Some(handle) = server_handle {
        handle.abort();
    }
    info!("Daemon stopped");

    Ok(())
}
