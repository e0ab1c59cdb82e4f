// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use std::time::Duration;

use clap::Parser;
use cli::{Cli, Commands, CreateAdminArgs, DatabaseArgs};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use wastewise_core::auth::bootstrap::{AdminStatus, ensure_admin};
use wastewise_core::auth::revocation::{FALLBACK_REVOCATION_SECS, RevocationRegistry};
use wastewise_core::store::{Stores, postgres};

mod cli;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    let args = Cli::parse();
    logging::init(args.verbose)?;

    match args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
        Commands::CreateAdmin(args) => block_on(create_admin(args))?,
        Commands::PurgeRevocations(args) => block_on(purge_revocations(args))?,
    }

    Ok(())
}

fn block_on<F: std::future::Future<Output = Result<()>>>(fut: F) -> Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(fut)
}

/// Connect and bring the schema up to date.
async fn connect(db: &DatabaseArgs) -> Result<PgPool> {
    log::debug!("connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&db.database_url)
        .await?;
    postgres::migrate(&pool).await?;
    Ok(pool)
}

async fn create_admin(args: CreateAdminArgs) -> Result<()> {
    let stores = Stores::postgres(connect(&args.db).await?);
    let status = ensure_admin(
        stores.principals.as_ref(),
        &args.username,
        &args.email,
        &args.password,
    )
    .await?;

    match status {
        AdminStatus::Created(c) => log::info!("Admin user created: {}", c.email),
        AdminStatus::AlreadyExists(c) => log::info!("Admin user already exists: {}", c.email),
    }
    Ok(())
}

async fn purge_revocations(args: DatabaseArgs) -> Result<()> {
    let stores = Stores::postgres(connect(&args).await?);
    let registry = RevocationRegistry::new(
        stores.revocations,
        chrono::Duration::seconds(FALLBACK_REVOCATION_SECS),
    );
    let purged = registry.purge_expired().await?;
    log::info!("Purged {purged} expired revocation entries");
    Ok(())
}
