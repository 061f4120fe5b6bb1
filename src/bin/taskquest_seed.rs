//! Seeds the default level catalog into `PostgreSQL`.
//!
//! Usage:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/taskquest taskquest-seed
//! ```
//!
//! Levels are inserted only when the `levels` table is empty, so running the
//! seeder again is harmless. Schema migrations must already be applied.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use mockable::DefaultClock;
use std::process::ExitCode;
use std::sync::Arc;
use taskquest::config::{AppConfig, ConfigurationError};
use taskquest::progress::{
    adapters::postgres::PostgresProgressStore,
    ports::SeedOutcome,
    services::{ProgressService, ProgressServiceError},
};
use taskquest::telemetry;
use thiserror::Error;

#[derive(Debug, Error)]
enum SeedError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("failed to open connection pool: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Seed(#[from] ProgressServiceError),
}

fn main() -> ExitCode {
    if telemetry::init().is_err() {
        return ExitCode::FAILURE;
    }
    match run() {
        Ok(outcome) => {
            tracing::info!(?outcome, "seeding finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "seeding failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<SeedOutcome, SeedError> {
    let config = AppConfig::from_env()?;
    let database_url = config.require_database_url()?;
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .build(ConnectionManager::<PgConnection>::new(database_url))?;

    let store = Arc::new(PostgresProgressStore::new(pool));
    let service = ProgressService::new(Arc::clone(&store), store, Arc::new(DefaultClock));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(service.seed_default_catalog())?)
}
