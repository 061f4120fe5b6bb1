//! Shared test helpers for `PostgreSQL` integration tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use mockable::DefaultClock;
use std::sync::Arc;
use taskquest::config::AppConfig;
use taskquest::progress::{
    adapters::postgres::{PgPool, PostgresProgressStore},
    domain::{LevelCatalog, User},
    services::ProgressService,
};
use taskquest::task::{adapters::postgres::PostgresTaskRepository, services::TaskLifecycleService};
use uuid::Uuid;

/// Boxed error type used by fallible test helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Environment variable naming the test database.
///
/// Tests that need it are marked `#[ignore]` and run with
/// `cargo test --test postgres -- --ignored`.
pub const DATABASE_URL_VAR: &str = "TASKQUEST_TEST_DATABASE_URL";

/// SQL creating the full schema.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-03-01-000000_create_taskquest/up.sql");

/// Lifecycle service over `PostgreSQL` adapters.
pub type PgTaskService =
    TaskLifecycleService<PostgresTaskRepository, PostgresProgressStore, PostgresProgressStore, DefaultClock>;

#[derive(Debug)]
struct SearchPath(String);

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for SearchPath {
    fn on_acquire(&self, connection: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        connection
            .batch_execute(&format!("SET search_path TO {}", self.0))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Throwaway schema holding a migrated copy of the tables.
pub struct TestSchema {
    url: String,
    name: String,
    pub pool: PgPool,
}

impl TestSchema {
    /// Creates and migrates a fresh schema.
    ///
    /// # Errors
    ///
    /// Returns an error if no test database is configured, the database is
    /// unreachable, or migration fails.
    pub fn create() -> Result<Self, BoxError> {
        Self::connect(std::env::var(DATABASE_URL_VAR).ok())
    }

    /// Creates and migrates a fresh schema in the database at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `database_url` is `None`, the database is
    /// unreachable, or migration fails.
    pub fn connect(database_url: Option<String>) -> Result<Self, BoxError> {
        let url = database_url
            .ok_or_else(|| format!("{DATABASE_URL_VAR} must name a PostgreSQL database"))?;
        let name = format!("taskquest_{}", Uuid::new_v4().simple());

        let mut connection = PgConnection::establish(&url)?;
        connection.batch_execute(&format!("CREATE SCHEMA {name}; SET search_path TO {name};"))?;
        connection.batch_execute(CREATE_SCHEMA_SQL)?;

        let pool = Pool::builder()
            .max_size(2)
            .connection_customizer(Box::new(SearchPath(name.clone())))
            .build(ConnectionManager::<PgConnection>::new(url.clone()))?;
        Ok(Self { url, name, pool })
    }

    /// Builds the progress service over this schema.
    #[must_use]
    pub fn progress_service(
        &self,
    ) -> ProgressService<PostgresProgressStore, PostgresProgressStore, DefaultClock> {
        let store = Arc::new(PostgresProgressStore::new(self.pool.clone()));
        ProgressService::new(Arc::clone(&store), store, Arc::new(DefaultClock))
    }

    /// Builds the lifecycle service over this schema.
    #[must_use]
    pub fn task_service(&self, config: &AppConfig) -> PgTaskService {
        let store = Arc::new(PostgresProgressStore::new(self.pool.clone()));
        TaskLifecycleService::new(
            Arc::new(self.task_repository()),
            Arc::clone(&store),
            store,
            Arc::new(DefaultClock),
        )
        .configured(config)
    }

    /// Builds a raw task repository over this schema.
    #[must_use]
    pub fn task_repository(&self) -> PostgresTaskRepository {
        PostgresTaskRepository::new(self.pool.clone())
    }

    /// Seeds the default catalog and enrolls one user.
    ///
    /// # Errors
    ///
    /// Returns an error if seeding or enrollment fails.
    pub async fn enrolled_user(&self, name: &str) -> Result<(LevelCatalog, User), BoxError> {
        let progress = self.progress_service();
        progress.seed_default_catalog().await?;
        let catalog = progress.load_catalog().await?;
        let user = progress.enroll_user(name).await?;
        Ok((catalog, user))
    }
}

impl Drop for TestSchema {
    fn drop(&mut self) {
        if let Ok(mut connection) = PgConnection::establish(&self.url) {
            connection
                .batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name))
                .ok();
        }
    }
}
