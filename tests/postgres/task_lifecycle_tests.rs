//! `PostgreSQL` integration tests for task commits and queries.

use chrono::{Duration, Utc};
use rstest::rstest;
use taskquest::config::AppConfig;
use taskquest::progress::domain::{Xp, XpReason, grant_xp};
use taskquest::task::{
    domain::{DeadlineWindow, TaskStatus},
    ports::{TaskCommit, TaskRepository, TaskRepositoryError, TaskWrite},
    services::{CreateTaskRequest, TaskLifecycleError, UpdateTaskRequest},
};

use super::helpers::{BoxError, TestSchema};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKQUEST_TEST_DATABASE_URL"]
async fn postgres_completion_commits_task_record_and_xp() -> Result<(), BoxError> {
    let schema = TestSchema::create()?;
    let (_, user) = schema.enrolled_user("Ada").await?;
    let service = schema.task_service(&AppConfig::default());

    let task = service
        .create_task(
            user.id(),
            CreateTaskRequest::new("Persist me", Utc::now() + Duration::days(1))
                .with_categories(vec!["db".to_owned()])
                .with_subtask("Write schema"),
        )
        .await?;
    let completion = service.complete_task(user.id(), task.id()).await?;

    assert_eq!(completion.user.xp(), Xp::new(10));
    assert_eq!(completion.user.revision(), 1);
    let stored = service.get_task(user.id(), task.id()).await?;
    assert_eq!(stored.status(), TaskStatus::Completed);
    assert_eq!(stored.revision(), 1);
    assert_eq!(stored.subtasks().len(), 1);
    assert!(stored.categories().contains("db"));

    let today = Utc::now().date_naive();
    let records = service
        .daily_records(user.id(), today - Duration::days(1), today + Duration::days(1))
        .await?;
    assert_eq!(records.len(), 1);
    let summary = records.first().ok_or("missing daily record")?;
    assert_eq!(summary.tasks.len(), 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKQUEST_TEST_DATABASE_URL"]
async fn postgres_stale_user_revision_rolls_back_the_task() -> Result<(), BoxError> {
    let schema = TestSchema::create()?;
    let (catalog, user) = schema.enrolled_user("Grace").await?;
    let service = schema.task_service(&AppConfig::default());
    let first = service
        .create_task(user.id(), CreateTaskRequest::new("First", Utc::now() + Duration::days(1)))
        .await?;
    let second = service
        .create_task(user.id(), CreateTaskRequest::new("Second", Utc::now() + Duration::days(1)))
        .await?;
    service.complete_task(user.id(), first.id()).await?;

    let repository = schema.task_repository();
    let mut stale = repository
        .find_for_owner(second.id(), user.id())
        .await?
        .ok_or("second task missing")?;
    let date = stale.complete(&mockable::DefaultClock)?;
    let change = grant_xp(&catalog, &user, Xp::new(10), XpReason::TaskCompleted, Utc::now());
    let result = repository
        .commit(TaskCommit::task_only(TaskWrite::Update(stale)).with_progress(change))
        .await;

    assert!(matches!(result, Err(TaskRepositoryError::Conflict { entity: "user", .. })));
    let unchanged = service.get_task(user.id(), second.id()).await?;
    assert_eq!(unchanged.status(), TaskStatus::NotDone);
    assert_eq!(unchanged.revision(), 0);
    let records = service.daily_records(user.id(), date, date).await?;
    let linked: usize = records.iter().map(|summary| summary.tasks.len()).sum();
    assert_eq!(linked, 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKQUEST_TEST_DATABASE_URL"]
async fn postgres_stale_task_revision_is_a_conflict() -> Result<(), BoxError> {
    let schema = TestSchema::create()?;
    let (_, user) = schema.enrolled_user("Alan").await?;
    let service = schema.task_service(&AppConfig::default());
    let task = service
        .create_task(user.id(), CreateTaskRequest::new("Edit me", Utc::now() + Duration::days(1)))
        .await?;
    service
        .update_task(user.id(), task.id(), UpdateTaskRequest::new().with_note("fresh"))
        .await?;

    let result = schema
        .task_repository()
        .commit(TaskCommit::task_only(TaskWrite::Update(task)))
        .await;

    assert!(matches!(result, Err(TaskRepositoryError::Conflict { entity: "task", .. })));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKQUEST_TEST_DATABASE_URL"]
async fn postgres_overdue_edit_deducts_and_listing_is_ordered() -> Result<(), BoxError> {
    let schema = TestSchema::create()?;
    let (_, user) = schema.enrolled_user("Barbara").await?;
    let service = schema.task_service(&AppConfig::default());
    let now = Utc::now();
    for (name, offset) in [("late", 3), ("soon", 1), ("middle", 2)] {
        service
            .create_task(user.id(), CreateTaskRequest::new(name, now + Duration::days(offset)))
            .await?;
    }
    let listed = service
        .list_tasks(user.id(), DeadlineWindow::unbounded())
        .await?;
    let names: Vec<&str> = listed.iter().map(|task| task.name().as_str()).collect();
    assert_eq!(names, vec!["soon", "middle", "late"]);

    let soon = listed.first().ok_or("missing task")?;
    let moved = service
        .update_task(
            user.id(),
            soon.id(),
            UpdateTaskRequest::new().with_deadline(now - Duration::days(1)),
        )
        .await?;
    assert_eq!(moved.status(), TaskStatus::Overdue);

    service.delete_task(user.id(), soon.id()).await?;
    let again = service.delete_task(user.id(), soon.id()).await;
    assert!(matches!(again, Err(TaskLifecycleError::TaskNotFound(_))));
    Ok(())
}
