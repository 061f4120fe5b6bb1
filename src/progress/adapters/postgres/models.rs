//! Diesel row models and conversions for levels and users.

use super::schema::{levels, users};
use crate::progress::{
    domain::{
        Level, LevelId, LevelName, PersistedUserData, User, UserId, Xp,
    },
    ports::{ProgressRepositoryError, ProgressRepositoryResult},
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query and insert row for levels.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = levels)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LevelRow {
    /// Level identifier.
    pub id: uuid::Uuid,
    /// Level name.
    pub name: String,
    /// XP threshold.
    pub xp_required: i64,
}

/// Query and insert row for users.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub display_name: String,
    /// XP counter.
    pub xp: i64,
    /// Current level.
    pub level_id: uuid::Uuid,
    /// Optimistic-concurrency revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Converts an unsigned domain counter into a `BIGINT` column value.
pub(crate) fn to_db_count(value: u64) -> Result<i64, std::num::TryFromIntError> {
    i64::try_from(value)
}

pub(super) fn to_level_row(level: &Level) -> ProgressRepositoryResult<LevelRow> {
    Ok(LevelRow {
        id: level.id().into_inner(),
        name: level.name().as_str().to_owned(),
        xp_required: to_db_count(level.xp_required().value())
            .map_err(ProgressRepositoryError::persistence)?,
    })
}

pub(super) fn row_to_level(row: LevelRow) -> ProgressRepositoryResult<Level> {
    let name = LevelName::new(row.name).map_err(ProgressRepositoryError::persistence)?;
    let xp_required =
        u64::try_from(row.xp_required).map_err(ProgressRepositoryError::persistence)?;
    Ok(Level::from_parts(
        LevelId::from_uuid(row.id),
        name,
        Xp::new(xp_required),
    ))
}

pub(super) fn to_user_row(user: &User) -> ProgressRepositoryResult<UserRow> {
    Ok(UserRow {
        id: user.id().into_inner(),
        display_name: user.display_name().to_owned(),
        xp: to_db_count(user.xp().value()).map_err(ProgressRepositoryError::persistence)?,
        level_id: user.level_id().into_inner(),
        revision: to_db_count(user.revision()).map_err(ProgressRepositoryError::persistence)?,
        created_at: user.created_at(),
        updated_at: user.updated_at(),
    })
}

/// Rebuilds a domain user from a persisted row.
pub(crate) fn row_to_user(row: UserRow) -> Result<User, std::num::TryFromIntError> {
    Ok(User::from_persisted(PersistedUserData {
        id: UserId::from_uuid(row.id),
        display_name: row.display_name,
        xp: Xp::new(u64::try_from(row.xp)?),
        level_id: LevelId::from_uuid(row.level_id),
        revision: u64::try_from(row.revision)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
