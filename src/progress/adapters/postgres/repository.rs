//! `PostgreSQL` repository implementation for levels and users.

use super::{
    models::{LevelRow, UserRow, row_to_level, row_to_user, to_level_row, to_user_row},
    schema::{levels, users},
};
use crate::progress::{
    domain::{Level, User, UserId},
    ports::{
        LevelRepository, ProgressRepositoryError, ProgressRepositoryResult, SeedOutcome,
        UserRepository,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type shared by all adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed level catalog and user store.
#[derive(Debug, Clone)]
pub struct PostgresProgressStore {
    pool: PgPool,
}

impl PostgresProgressStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ProgressRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ProgressRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ProgressRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ProgressRepositoryError::persistence)?
    }
}

#[async_trait]
impl LevelRepository for PostgresProgressStore {
    async fn list_ordered(&self) -> ProgressRepositoryResult<Vec<Level>> {
        self.run_blocking(|connection| {
            levels::table
                .order(levels::xp_required.asc())
                .select(LevelRow::as_select())
                .load::<LevelRow>(connection)
                .map_err(ProgressRepositoryError::persistence)?
                .into_iter()
                .map(row_to_level)
                .collect()
        })
        .await
    }

    async fn seed(&self, levels: &[Level]) -> ProgressRepositoryResult<SeedOutcome> {
        let rows = levels
            .iter()
            .map(to_level_row)
            .collect::<ProgressRepositoryResult<Vec<_>>>()?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, ProgressRepositoryError, _>(|tx| {
                let existing: i64 = levels::table
                    .count()
                    .get_result(tx)
                    .map_err(ProgressRepositoryError::persistence)?;
                if existing > 0 {
                    let count =
                        usize::try_from(existing).map_err(ProgressRepositoryError::persistence)?;
                    return Ok(SeedOutcome::AlreadyPresent(count));
                }

                let inserted = diesel::insert_into(levels::table)
                    .values(&rows)
                    .on_conflict_do_nothing()
                    .execute(tx)
                    .map_err(ProgressRepositoryError::persistence)?;
                Ok(SeedOutcome::Seeded(inserted))
            })
        })
        .await
    }
}

#[async_trait]
impl UserRepository for PostgresProgressStore {
    async fn store(&self, user: &User) -> ProgressRepositoryResult<()> {
        let user_id = user.id();
        let row = to_user_row(user)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ProgressRepositoryError::DuplicateUser(user_id)
                    }
                    _ => ProgressRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> ProgressRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(ProgressRepositoryError::persistence)?;
            row.map(row_to_user)
                .transpose()
                .map_err(ProgressRepositoryError::persistence)
        })
        .await
    }
}
