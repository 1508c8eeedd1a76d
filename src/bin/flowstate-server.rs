//! # Flowstate Server
//!
//! Service binary: loads configuration, recovers state from the event
//! log, and serves the REST and WebSocket API.

use anyhow::Context;
use clap::{Parser, Subcommand};
use flowstate_core::config::{ConfigManager, StoreBackend};
use flowstate_core::engine::WorkflowEngine;
use flowstate_core::event_store::{EventStore, InMemoryEventStore};
use flowstate_core::events::EventPublisher;
use flowstate_core::logging::init_structured_logging_with_level;
use flowstate_core::web::{self, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "flowstate-server")]
#[command(about = "Event-sourced workflow state service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Environment to run under (development, test, production)
    #[arg(short, long)]
    environment: Option<String>,

    /// Configuration directory (default: config/flowstate)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Override the configured bind address
    #[arg(short, long)]
    bind: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the service (default)
    Serve,
    /// Load and validate configuration, then exit
    ValidateConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let environment = cli
        .environment
        .clone()
        .unwrap_or_else(ConfigManager::detect_environment);
    let manager = ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), &environment)
        .context("failed to load configuration")?;

    init_structured_logging_with_level(manager.config().telemetry.log_level.as_deref());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::ValidateConfig => {
            println!("configuration ok (environment: {environment})");
            println!(
                "  web.bind_address           = {}",
                manager.config().web.bind_address
            );
            println!(
                "  event_store.backend        = {:?}",
                manager.config().event_store.backend
            );
            println!(
                "  events.channel_capacity    = {}",
                manager.config().events.channel_capacity
            );
            Ok(())
        }
        Commands::Serve => serve(manager, cli.bind, environment).await,
    }
}

async fn serve(
    manager: Arc<ConfigManager>,
    bind_override: Option<String>,
    environment: String,
) -> anyhow::Result<()> {
    let config = Arc::new(manager.config().clone());

    let store = build_store(&config).await?;
    let publisher = EventPublisher::new(config.events.channel_capacity);
    let engine = Arc::new(WorkflowEngine::new(store, publisher));

    let report = engine.recover().await;
    info!(
        workflows = report.workflows_recovered,
        events = report.events_replayed,
        "recovery complete"
    );

    let bind_address = bind_override.unwrap_or_else(|| config.web.bind_address.clone());
    let state = AppState::new(engine, config, environment);
    let router = web::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!(address = %bind_address, "🚀 FLOWSTATE: serving workflow state API");

    axum::serve(listener, router)
        .await
        .context("server terminated")?;
    Ok(())
}

async fn build_store(
    config: &flowstate_core::FlowstateConfig,
) -> anyhow::Result<Arc<dyn EventStore>> {
    match config.event_store.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryEventStore::new(
            config.event_store.max_events_per_workflow,
        ))),
        StoreBackend::Postgres => {
            #[cfg(feature = "postgres")]
            {
                let url = config
                    .database_url()
                    .context("postgres backend requires a database url")?;
                let store = flowstate_core::event_store::PgEventStore::connect(
                    &url,
                    config.database.pool,
                    config.database.connect_timeout(),
                    config.event_store.max_events_per_workflow,
                )
                .await
                .context("failed to connect to postgres")?;
                Ok(Arc::new(store))
            }
            #[cfg(not(feature = "postgres"))]
            {
                anyhow::bail!("postgres backend selected but the postgres feature is disabled")
            }
        }
    }
}
