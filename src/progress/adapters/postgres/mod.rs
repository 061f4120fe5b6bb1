//! `PostgreSQL` adapters for levels and users.

mod models;
mod repository;
pub(crate) mod schema;

pub(crate) use models::{UserRow, row_to_user, to_db_count};
pub use repository::{PgPool, PostgresProgressStore};
