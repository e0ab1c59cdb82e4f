//! WasteWise API server binary.
//!
//! Reads configuration from the environment (and `.env`), connects to
//! PostgreSQL, runs migrations, ensures the bootstrap admin and serves the
//! REST API until Ctrl-C.

use std::time::Duration;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wastewise_api::config::ApiConfig;
use wastewise_core::auth::bootstrap::{AdminStatus, ensure_admin};
use wastewise_core::auth::revocation::RevocationRegistry;
use wastewise_core::store::{Stores, postgres};

/// CLI arguments for the API server. The signing secret is only read from
/// `JWT_SECRET`.
#[derive(Parser, Debug)]
#[command(name = "wastewise_api_server", about = "WasteWise API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:5000")]
    bind: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/wastewise"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Keep all data in process memory instead of PostgreSQL. Data is lost on exit.
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,wastewise_api=debug,wastewise_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env()?;
    config.bind_addr = args.bind;
    config.database_url = args.database_url;

    info!(bind = %config.bind_addr, in_memory = args.in_memory, "starting wastewise_api_server");

    let stores = if args.in_memory {
        warn!("using in-memory store; data will not survive a restart");
        Stores::memory()
    } else {
        info!(max_connections = args.max_connections, "connecting to database");
        let pool = PgPoolOptions::new()
            .max_connections(args.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.database_url)
            .await?;

        info!("running database migrations");
        postgres::migrate(&pool).await?;
        Stores::postgres(pool)
    };

    if let Some(admin) = &config.bootstrap_admin {
        match ensure_admin(
            stores.principals.as_ref(),
            &admin.username,
            &admin.email,
            &admin.password,
        )
        .await?
        {
            AdminStatus::Created(c) => info!(email = %c.email, "bootstrap admin created"),
            AdminStatus::AlreadyExists(c) => debug!(email = %c.email, "bootstrap admin present"),
        }
    }

    let state = wastewise_api::AppState::new(config.clone(), stores)?;

    let shutdown = CancellationToken::new();
    let reaper = tokio::spawn(run_reaper(
        state.revocations.clone(),
        config.revocation_purge_interval,
        shutdown.clone(),
    ));

    let app = wastewise_api::router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("ctrl-c received, shutting down"),
                    _ = shutdown.cancelled() => {}
                }
            }
        })
        .await;

    shutdown.cancel();
    let _ = reaper.await;

    result?;
    Ok(())
}

/// Periodically purge revocation entries that can no longer match a live token.
async fn run_reaper(registry: RevocationRegistry, every: Duration, ct: CancellationToken) {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ct.cancelled() => break,
            _ = ticker.tick() => match registry.purge_expired().await {
                Ok(0) => {}
                Ok(n) => info!(purged = n, "expired revocations purged"),
                Err(e) => warn!("revocation purge failed: {e}"),
            },
        }
    }
    debug!("revocation reaper stopped");
}
