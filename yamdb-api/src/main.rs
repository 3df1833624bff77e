//! YaMDb API service - Main entry point
//!
//! Review-aggregation REST API: users register with an emailed
//! confirmation code, exchange it for a bearer token, and then browse and
//! review titles grouped by category and genre.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yamdb_api::api::{self, AppContext};
use yamdb_common::config::{resolve_data_dir, ServiceConfig};
use yamdb_common::db::init::init_database;
use yamdb_common::mail::{LogMailer, MailConfig};
use yamdb_common::token::{load_signing_secret, DEFAULT_TOKEN_TTL_HOURS};
use yamdb_common::validate::DEFAULT_MIN_YEAR;

/// Command-line arguments for yamdb-api
#[derive(Parser, Debug)]
#[command(name = "yamdb-api")]
#[command(about = "YaMDb review-aggregation REST API")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000", env = "YAMDB_PORT")]
    port: u16,

    /// Data folder holding the SQLite database
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Earliest accepted Title.year
    #[arg(long, default_value_t = DEFAULT_MIN_YEAR, env = "YAMDB_MIN_TITLE_YEAR")]
    min_title_year: i64,

    /// Sender identity for outgoing confirmation mail
    #[arg(long, default_value = "noreply@yamdb.local", env = "YAMDB_MAIL_SENDER")]
    mail_sender: String,

    /// Access token lifetime in hours
    #[arg(long, default_value_t = DEFAULT_TOKEN_TTL_HOURS, env = "YAMDB_TOKEN_TTL_HOURS")]
    token_ttl_hours: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yamdb_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let data_dir = resolve_data_dir(
        args.data_dir.as_deref().and_then(|p| p.to_str()),
        "YAMDB_DATA_DIR",
    )
    .context("Failed to resolve data folder")?;

    let config = ServiceConfig {
        port: args.port,
        database_path: data_dir.join("yamdb.db"),
        min_title_year: args.min_title_year,
        token_ttl_hours: args.token_ttl_hours,
        mail: MailConfig {
            sender: args.mail_sender,
        },
    };

    info!("Starting YaMDb API on port {}", config.port);
    info!("Database: {}", config.database_path.display());

    let db_pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    let signing_secret = load_signing_secret(&db_pool)
        .await
        .context("Failed to load token signing secret")?;

    let ctx = AppContext {
        db_pool,
        signing_secret,
        token_ttl_hours: config.token_ttl_hours,
        min_title_year: config.min_title_year,
        mailer: Arc::new(LogMailer::new(config.mail)),
    };

    let app = api::build_router(ctx);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
