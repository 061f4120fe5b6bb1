//! Diesel row models and conversions for task persistence.

use super::schema::{daily_task_records, tasks};
use crate::progress::{adapters::postgres::to_db_count, domain::UserId};
use crate::task::{
    domain::{
        DailyTaskRecord, PersistedTaskData, Priority, Subtask, Task, TaskId, TaskName, TaskStatus,
    },
    ports::{TaskRepositoryError, TaskRepositoryResult},
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;
use std::collections::BTreeSet;

/// Query and insert row for tasks.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub owner_id: uuid::Uuid,
    /// Task name.
    pub name: String,
    /// Free-form note.
    pub note: Option<String>,
    /// Category labels JSON.
    pub categories: Value,
    /// Importance flag.
    pub is_important: bool,
    /// Urgency flag.
    pub is_urgent: bool,
    /// Deadline.
    pub deadline: DateTime<Utc>,
    /// Status.
    pub status: String,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Subtasks JSON.
    pub subtasks: Value,
    /// Linked daily record date.
    pub daily_record_date: Option<NaiveDate>,
    /// Optimistic-concurrency revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied by revision-checked task updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Task name.
    pub name: String,
    /// Free-form note.
    pub note: Option<String>,
    /// Category labels JSON.
    pub categories: Value,
    /// Importance flag.
    pub is_important: bool,
    /// Urgency flag.
    pub is_urgent: bool,
    /// Deadline.
    pub deadline: DateTime<Utc>,
    /// Status.
    pub status: String,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Subtasks JSON.
    pub subtasks: Value,
    /// Linked daily record date.
    pub daily_record_date: Option<NaiveDate>,
    /// New revision.
    pub revision: i64,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query and insert row for daily task records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = daily_task_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DailyRecordRow {
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// UTC calendar date.
    pub date: NaiveDate,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

pub(super) fn to_task_row(task: &Task) -> TaskRepositoryResult<TaskRow> {
    Ok(TaskRow {
        id: task.id().into_inner(),
        owner_id: task.owner().into_inner(),
        name: task.name().as_str().to_owned(),
        note: task.note().map(str::to_owned),
        categories: serde_json::to_value(task.categories())
            .map_err(TaskRepositoryError::persistence)?,
        is_important: task.priority().important,
        is_urgent: task.priority().urgent,
        deadline: task.deadline(),
        status: task.status().as_str().to_owned(),
        completed_at: task.completed_at(),
        subtasks: serde_json::to_value(task.subtasks())
            .map_err(TaskRepositoryError::persistence)?,
        daily_record_date: task.daily_record(),
        revision: to_db_count(task.revision()).map_err(TaskRepositoryError::persistence)?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

/// Builds the changeset that stores `task` at revision `next_revision`.
pub(super) fn to_changeset(task: &Task, next_revision: u64) -> TaskRepositoryResult<TaskChangeset> {
    let TaskRow {
        name,
        note,
        categories,
        is_important,
        is_urgent,
        deadline,
        status,
        completed_at,
        subtasks,
        daily_record_date,
        updated_at,
        ..
    } = to_task_row(task)?;

    Ok(TaskChangeset {
        name,
        note,
        categories,
        is_important,
        is_urgent,
        deadline,
        status,
        completed_at,
        subtasks,
        daily_record_date,
        revision: to_db_count(next_revision).map_err(TaskRepositoryError::persistence)?,
        updated_at,
    })
}

pub(super) fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        owner_id,
        name: persisted_name,
        note,
        categories: persisted_categories,
        is_important,
        is_urgent,
        deadline,
        status: persisted_status,
        completed_at,
        subtasks: persisted_subtasks,
        daily_record_date,
        revision: persisted_revision,
        created_at,
        updated_at,
    } = row;

    let name = TaskName::new(persisted_name).map_err(TaskRepositoryError::persistence)?;
    let categories = serde_json::from_value::<BTreeSet<String>>(persisted_categories)
        .map_err(TaskRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let subtasks = serde_json::from_value::<Vec<Subtask>>(persisted_subtasks)
        .map_err(TaskRepositoryError::persistence)?;
    let revision = u64::try_from(persisted_revision).map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner: UserId::from_uuid(owner_id),
        name,
        note,
        categories,
        priority: Priority::new(is_important, is_urgent),
        deadline,
        status,
        completed_at,
        subtasks,
        daily_record: daily_record_date,
        revision,
        created_at,
        updated_at,
    }))
}

pub(super) fn to_record_row(record: &DailyTaskRecord) -> DailyRecordRow {
    DailyRecordRow {
        user_id: record.user_id().into_inner(),
        date: record.date(),
        created_at: record.created_at(),
    }
}

pub(super) fn row_to_record(row: DailyRecordRow) -> DailyTaskRecord {
    DailyTaskRecord::new(UserId::from_uuid(row.user_id), row.date, row.created_at)
}
