use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobly_api::{app, config, database::DatabaseManager, AppState};

#[derive(Debug, Parser)]
#[command(name = "jobly-api", version, about = "Jobly REST API server")]
struct Args {
    /// Interface to bind (defaults to HOST or the environment preset)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (defaults to PORT or 3001)
    #[arg(short, long)]
    port: Option<u16>,

    /// Apply database migrations before serving, regardless of config
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobly_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Jobly API in {:?} mode", config.environment);
    if config.environment == config::Environment::Production && config.uses_default_secret() {
        tracing::warn!("SECRET_KEY is not set; tokens are signed with the development secret");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    if args.migrate || config.database.run_migrations {
        DatabaseManager::migrate(&pool).await.context("failed to run migrations")?;
    }

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Jobly API listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(pool.clone())))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("Database pool closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
