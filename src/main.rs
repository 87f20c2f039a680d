//! Uniforma - Catalog and pricing admin for a school uniform vendor
//!
//! Runs the REST API over the catalog database, applying pending
//! migrations on startup.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uniforma_api::{ApiServer, ApiServerConfig};
use uniforma_core::{AssetStore, HttpAssetStore, NoopAssetStore};

/// Uniforma - School uniform catalog and pricing service
#[derive(Parser, Debug)]
#[command(name = "uniforma")]
#[command(about = "Uniforma - School uniform catalog and pricing service")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the API server
    #[command(long_about = r#"
Run the catalog API server. Migrations are applied on startup.

EXAMPLES:
  # Local development against SQLite
  uniforma serve --database-url sqlite://uniforma.db?mode=rwc \
    --jwt-secret dev-secret

  # Production against PostgreSQL with an external asset store
  uniforma serve --bind 0.0.0.0:8080 \
    --database-url postgres://uniforma@db/uniforma \
    --jwt-secret $JWT_SECRET \
    --asset-endpoint https://assets.internal/v1

ENVIRONMENT VARIABLES:
  UNIFORMA_BIND            Address to bind the API server
  UNIFORMA_DATABASE_URL    Database connection URL
  UNIFORMA_JWT_SECRET      Secret for validating staff tokens
  UNIFORMA_ASSET_ENDPOINT  Asset store endpoint (optional)
    "#)]
    Serve {
        /// Address to bind the API server (e.g., 127.0.0.1:8080)
        #[arg(long, env = "UNIFORMA_BIND", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Database connection URL (SQLite or PostgreSQL)
        #[arg(long, env = "UNIFORMA_DATABASE_URL")]
        database_url: String,

        /// Secret for validating staff JWTs
        #[arg(long, env = "UNIFORMA_JWT_SECRET")]
        jwt_secret: String,

        /// Endpoint of the external asset store; image references are
        /// released there when replaced or deleted
        #[arg(long, env = "UNIFORMA_ASSET_ENDPOINT")]
        asset_endpoint: Option<String>,

        /// Disable CORS (for deployments behind a same-origin proxy)
        #[arg(long)]
        no_cors: bool,
    },
}

/// Setup logging with the specified log level
fn setup_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    info!(
        "uniforma {} ({} built {})",
        env!("GIT_TAG"),
        env!("GIT_HASH"),
        env!("BUILD_TIME")
    );

    match cli.command {
        Commands::Serve {
            bind,
            database_url,
            jwt_secret,
            asset_endpoint,
            no_cors,
        } => {
            let db = uniforma_db::connect(&database_url)
                .await
                .context("Failed to connect to the database")?;

            uniforma_db::migrate(&db)
                .await
                .context("Failed to apply migrations")?;

            let assets: Arc<dyn AssetStore> = match asset_endpoint {
                Some(endpoint) => {
                    info!("Using asset store at {}", endpoint);
                    Arc::new(HttpAssetStore::new(endpoint))
                }
                None => {
                    info!("No asset store configured; image references are kept");
                    Arc::new(NoopAssetStore)
                }
            };

            let config = ApiServerConfig {
                bind_addr: bind,
                enable_cors: !no_cors,
                jwt_secret,
            };

            ApiServer::new(config, db, assets)
                .start()
                .await
                .context("API server failed")?;
        }
    }

    Ok(())
}
