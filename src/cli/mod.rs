pub mod commands;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::AppConfig;
use crate::database::{MemoryStore, PgStore, Store};

#[derive(Parser)]
#[command(name = "devcamper")]
#[command(about = "DevCamper API - bootcamp directory server and admin tools")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Apply embedded SQL migrations to DATABASE_URL")]
    Migrate,

    #[command(about = "Load or wipe sample data")]
    Seed {
        #[command(subcommand)]
        cmd: commands::seed::SeedCommands,
    },

    #[command(about = "Mint a JWT for a stored user")]
    Token {
        #[arg(long, help = "User id")]
        user: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    info!("Loaded {:?} configuration", config.environment);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::handle(config).await,
        Commands::Migrate => commands::migrate::handle(&config).await,
        Commands::Seed { cmd } => commands::seed::handle(cmd, &config).await,
        Commands::Token { user } => commands::token::handle(&user, &config).await,
    }
}

/// Postgres pool for the configured URL, with migrations applied
pub(crate) async fn connect_postgres(config: &AppConfig) -> anyhow::Result<PgStore> {
    let url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL is not set")?;
    let store = PgStore::connect(
        url,
        config.database.max_connections,
        Duration::from_secs(config.database.connection_timeout),
    )
    .await
    .context("failed to connect to database")?;
    store.migrate().await.context("failed to apply migrations")?;
    Ok(store)
}

/// Postgres when DATABASE_URL is set, otherwise a process-local store
pub(crate) async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    if config.database.url.is_some() {
        Ok(Arc::new(connect_postgres(config).await?))
    } else {
        tracing::warn!("DATABASE_URL not set; using in-memory store");
        Ok(Arc::new(MemoryStore::new()))
    }
}
