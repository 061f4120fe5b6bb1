//! In-memory repository for task lifecycle tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::progress::{adapters::memory::InMemoryProgressStore, domain::UserId};
use crate::task::{
    domain::{DailyRecordSummary, DailyTaskRecord, DateRange, DeadlineWindow, Task, TaskId},
    ports::{
        CommittedTask, TaskCommit, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
        TaskWrite,
    },
};

/// Thread-safe in-memory task repository.
///
/// Shares user state with an [`InMemoryProgressStore`]. A commit holds the
/// task lock and then the progress lock, validates every revision, and only
/// then applies its writes.
#[derive(Debug, Clone)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
    progress: InMemoryProgressStore,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    daily_records: BTreeMap<(UserId, NaiveDate), DailyTaskRecord>,
}

impl InMemoryTaskRepository {
    /// Creates an empty repository sharing users with `progress`.
    #[must_use]
    pub fn new(progress: InMemoryProgressStore) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryTaskState::default())),
            progress,
        }
    }
}

fn poisoned(message: impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(message.to_string()))
}

fn prepare_task_write(
    state: &InMemoryTaskState,
    write: TaskWrite,
) -> TaskRepositoryResult<Task> {
    match write {
        TaskWrite::Insert(task) => {
            if state.tasks.contains_key(&task.id()) {
                return Err(TaskRepositoryError::DuplicateTask(task.id()));
            }
            Ok(task)
        }
        TaskWrite::Update(task) => {
            let stored = state
                .tasks
                .get(&task.id())
                .filter(|stored| stored.owner() == task.owner())
                .ok_or(TaskRepositoryError::NotFound(task.id()))?;
            if stored.revision() != task.revision() {
                return Err(TaskRepositoryError::task_conflict(task.id()));
            }
            Ok(task.into_next_revision())
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn commit(&self, commit: TaskCommit) -> TaskRepositoryResult<CommittedTask> {
        let mut state = self.state.write().map_err(poisoned)?;
        let mut progress = self.progress.write_state().map_err(poisoned)?;

        let TaskCommit {
            task: write,
            progress: xp_change,
            daily_record,
        } = commit;

        let task = prepare_task_write(&state, write)?;
        let user = match xp_change {
            Some(change) => {
                let stored = progress
                    .users
                    .get(&change.user_id())
                    .ok_or(TaskRepositoryError::UserNotFound(change.user_id()))?;
                if stored.revision() != change.expected_revision() {
                    return Err(TaskRepositoryError::user_conflict(change.user_id()));
                }
                let mut updated = stored.clone();
                updated.apply_change(&change);
                Some(updated)
            }
            None => None,
        };

        if let Some(record) = daily_record {
            state
                .daily_records
                .entry((record.user_id(), record.date()))
                .or_insert(record);
        }
        state.tasks.insert(task.id(), task.clone());
        if let Some(ref updated) = user {
            progress.users.insert(updated.id(), updated.clone());
        }

        Ok(CommittedTask { task, user })
    }

    async fn find_for_owner(
        &self,
        id: TaskId,
        owner: UserId,
    ) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .tasks
            .get(&id)
            .filter(|task| task.owner() == owner)
            .cloned())
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        window: DeadlineWindow,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.owner() == owner && window.contains(task.deadline()))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.deadline(), task.created_at()));
        Ok(tasks)
    }

    async fn delete_for_owner(&self, id: TaskId, owner: UserId) -> TaskRepositoryResult<bool> {
        let mut state = self.state.write().map_err(poisoned)?;
        let owned = state.tasks.get(&id).is_some_and(|task| task.owner() == owner);
        if owned {
            state.tasks.remove(&id);
        }
        Ok(owned)
    }

    async fn daily_records(
        &self,
        owner: UserId,
        range: DateRange,
    ) -> TaskRepositoryResult<Vec<DailyRecordSummary>> {
        let state = self.state.read().map_err(poisoned)?;
        let summaries = state
            .daily_records
            .range((owner, range.from())..=(owner, range.to()))
            .map(|(_, record)| {
                let mut tasks: Vec<Task> = state
                    .tasks
                    .values()
                    .filter(|task| {
                        task.owner() == owner && task.daily_record() == Some(record.date())
                    })
                    .cloned()
                    .collect();
                tasks.sort_by_key(Task::completed_at);
                DailyRecordSummary {
                    record: record.clone(),
                    tasks,
                }
            })
            .collect();
        Ok(summaries)
    }
}
