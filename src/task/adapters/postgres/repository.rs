//! `PostgreSQL` repository implementation for task lifecycle storage.

use super::{
    models::{
        DailyRecordRow, TaskRow, row_to_record, row_to_task, to_changeset, to_record_row,
        to_task_row,
    },
    schema::{daily_task_records, tasks},
};
use crate::progress::{
    adapters::postgres::{UserRow, row_to_user, schema::users, to_db_count},
    domain::{User, UserId, XpChange},
};
use crate::task::{
    domain::{DailyRecordSummary, DateRange, DeadlineWindow, Task, TaskId},
    ports::{
        CommittedTask, TaskCommit, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
        TaskWrite,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
///
/// Users live in the same database, so a commit updates the task, the daily
/// record and the user's XP inside one transaction.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn commit(&self, commit: TaskCommit) -> TaskRepositoryResult<CommittedTask> {
        let TaskCommit {
            task: write,
            progress,
            daily_record,
        } = commit;
        let record_row = daily_record.as_ref().map(to_record_row);

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                if let Some(ref row) = record_row {
                    diesel::insert_into(daily_task_records::table)
                        .values(row)
                        .on_conflict((daily_task_records::user_id, daily_task_records::date))
                        .do_nothing()
                        .execute(tx)?;
                }

                let task = match write {
                    TaskWrite::Insert(ref task) => insert_task(tx, task)?,
                    TaskWrite::Update(ref task) => update_task(tx, task)?,
                };
                let user = progress
                    .as_ref()
                    .map(|change| update_user_progress(tx, change))
                    .transpose()?;

                Ok(CommittedTask { task, user })
            })
        })
        .await
    }

    async fn find_for_owner(
        &self,
        id: TaskId,
        owner: UserId,
    ) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        window: DeadlineWindow,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let mut query = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .select(TaskRow::as_select())
                .into_boxed();
            if let Some(start) = window.start {
                query = query.filter(tasks::deadline.ge(start));
            }
            if let Some(end) = window.end {
                query = query.filter(tasks::deadline.le(end));
            }

            query
                .order((tasks::deadline.asc(), tasks::created_at.asc()))
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }

    async fn delete_for_owner(&self, id: TaskId, owner: UserId) -> TaskRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                tasks::table
                    .filter(tasks::id.eq(id.into_inner()))
                    .filter(tasks::owner_id.eq(owner.into_inner())),
            )
            .execute(connection)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn daily_records(
        &self,
        owner: UserId,
        range: DateRange,
    ) -> TaskRepositoryResult<Vec<DailyRecordSummary>> {
        self.run_blocking(move |connection| {
            let records = daily_task_records::table
                .filter(daily_task_records::user_id.eq(owner.into_inner()))
                .filter(daily_task_records::date.between(range.from(), range.to()))
                .order(daily_task_records::date.asc())
                .select(DailyRecordRow::as_select())
                .load::<DailyRecordRow>(connection)?;

            let completed = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .filter(tasks::daily_record_date.between(range.from(), range.to()))
                .order(tasks::completed_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(row_to_task)
                .collect::<TaskRepositoryResult<Vec<Task>>>()?;

            let summaries = records
                .into_iter()
                .map(row_to_record)
                .map(|record| {
                    let tasks = completed
                        .iter()
                        .filter(|task| task.daily_record() == Some(record.date()))
                        .cloned()
                        .collect();
                    DailyRecordSummary { record, tasks }
                })
                .collect();
            Ok(summaries)
        })
        .await
    }
}

fn insert_task(connection: &mut PgConnection, task: &Task) -> TaskRepositoryResult<Task> {
    let task_id = task.id();
    let row = to_task_row(task)?;
    diesel::insert_into(tasks::table)
        .values(&row)
        .execute(connection)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                TaskRepositoryError::DuplicateTask(task_id)
            }
            _ => TaskRepositoryError::persistence(err),
        })?;
    Ok(task.clone())
}

fn update_task(connection: &mut PgConnection, task: &Task) -> TaskRepositoryResult<Task> {
    let expected_revision =
        to_db_count(task.revision()).map_err(TaskRepositoryError::persistence)?;
    let changeset = to_changeset(task, task.revision().saturating_add(1))?;

    let updated = diesel::update(
        tasks::table
            .filter(tasks::id.eq(task.id().into_inner()))
            .filter(tasks::owner_id.eq(task.owner().into_inner()))
            .filter(tasks::revision.eq(expected_revision)),
    )
    .set(&changeset)
    .returning(TaskRow::as_returning())
    .get_result::<TaskRow>(connection)
    .optional()?;

    match updated {
        Some(row) => row_to_task(row),
        None => {
            let exists: i64 = tasks::table
                .filter(tasks::id.eq(task.id().into_inner()))
                .filter(tasks::owner_id.eq(task.owner().into_inner()))
                .count()
                .get_result(connection)?;
            if exists > 0 {
                Err(TaskRepositoryError::task_conflict(task.id()))
            } else {
                Err(TaskRepositoryError::NotFound(task.id()))
            }
        }
    }
}

fn update_user_progress(
    connection: &mut PgConnection,
    change: &XpChange,
) -> TaskRepositoryResult<User> {
    let user_id = change.user_id();
    let expected_revision =
        to_db_count(change.expected_revision()).map_err(TaskRepositoryError::persistence)?;
    let xp = to_db_count(change.xp().value()).map_err(TaskRepositoryError::persistence)?;

    let updated = diesel::update(
        users::table
            .filter(users::id.eq(user_id.into_inner()))
            .filter(users::revision.eq(expected_revision)),
    )
    .set((
        users::xp.eq(xp),
        users::level_id.eq(change.level_id().into_inner()),
        users::revision.eq(users::revision + 1_i64),
        users::updated_at.eq(change.changed_at()),
    ))
    .returning(UserRow::as_returning())
    .get_result::<UserRow>(connection)
    .optional()?;

    match updated {
        Some(row) => row_to_user(row).map_err(TaskRepositoryError::persistence),
        None => {
            let exists: i64 = users::table
                .filter(users::id.eq(user_id.into_inner()))
                .count()
                .get_result(connection)?;
            if exists > 0 {
                Err(TaskRepositoryError::user_conflict(user_id))
            } else {
                Err(TaskRepositoryError::UserNotFound(user_id))
            }
        }
    }
}
