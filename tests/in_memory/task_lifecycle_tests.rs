//! In-memory integration tests for task lifecycle operations.

use chrono::{Duration, Utc};
use rstest::rstest;
use taskquest::progress::domain::Xp;
use taskquest::task::{
    domain::{DeadlineWindow, TaskStatus},
    services::{CreateTaskRequest, TaskLifecycleError, UpdateTaskRequest},
};

use super::helpers::{MemoryApp, app};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_task_lifecycle_tracks_xp(app: MemoryApp) -> Result<(), eyre::Report> {
    let (catalog, user) = app.enrolled_user("Margaret").await?;
    eyre::ensure!(user.level_id() == catalog.lowest().id(), "not at lowest level");

    let task = app
        .tasks
        .create_task(
            user.id(),
            CreateTaskRequest::new("Write tests", Utc::now() + Duration::days(2))
                .with_categories(vec!["work".to_owned(), "quality".to_owned()])
                .with_subtask("Unit")
                .with_subtask("Integration"),
        )
        .await?;
    eyre::ensure!(task.status() == TaskStatus::NotDone, "unexpected status");

    let renamed = app
        .tasks
        .update_task(
            user.id(),
            task.id(),
            UpdateTaskRequest::new().with_name("Write more tests"),
        )
        .await?;
    eyre::ensure!(renamed.name().as_str() == "Write more tests", "rename lost");

    let completion = app.tasks.complete_task(user.id(), task.id()).await?;
    eyre::ensure!(completion.user.xp() == Xp::new(10), "reward not applied");
    eyre::ensure!(app.reload(&user).await?.xp() == Xp::new(10), "reward not stored");

    let today = Utc::now().date_naive();
    let records = app
        .tasks
        .daily_records(user.id(), today - Duration::days(1), today + Duration::days(1))
        .await?;
    eyre::ensure!(records.len() == 1, "expected one daily record");

    app.tasks.delete_task(user.id(), task.id()).await?;
    let listed = app
        .tasks
        .list_tasks(user.id(), DeadlineWindow::unbounded())
        .await?;
    eyre::ensure!(listed.is_empty(), "task survived deletion");
    eyre::ensure!(app.reload(&user).await?.xp() == Xp::new(10), "xp changed on delete");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overdue_penalties_follow_status_transitions(app: MemoryApp) -> Result<(), eyre::Report> {
    let (_, user) = app.enrolled_user("Barbara").await?;

    let late = app
        .tasks
        .create_task(
            user.id(),
            CreateTaskRequest::new("Late", Utc::now() - Duration::hours(1)),
        )
        .await?;
    eyre::ensure!(late.status() == TaskStatus::Overdue, "not overdue");
    eyre::ensure!(app.reload(&user).await?.xp() == Xp::ZERO, "xp went negative");

    let task = app
        .tasks
        .create_task(
            user.id(),
            CreateTaskRequest::new("On time", Utc::now() + Duration::days(1)),
        )
        .await?;
    app.tasks.complete_task(user.id(), late.id()).await?;
    eyre::ensure!(app.reload(&user).await?.xp() == Xp::new(10), "reward missing");

    app.tasks
        .update_task(
            user.id(),
            task.id(),
            UpdateTaskRequest::new().with_deadline(Utc::now() - Duration::days(1)),
        )
        .await?;
    eyre::ensure!(app.reload(&user).await?.xp() == Xp::new(5), "penalty missing");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn foreign_tasks_are_invisible(app: MemoryApp) -> Result<(), eyre::Report> {
    let (_, owner) = app.enrolled_user("Owner").await?;
    let intruder = app.progress.enroll_user("Intruder").await?;
    let task = app
        .tasks
        .create_task(
            owner.id(),
            CreateTaskRequest::new("Mine", Utc::now() + Duration::days(1)),
        )
        .await?;

    let listed = app
        .tasks
        .list_tasks(intruder.id(), DeadlineWindow::unbounded())
        .await?;
    let fetched = app.tasks.get_task(intruder.id(), task.id()).await;

    eyre::ensure!(listed.is_empty(), "foreign task listed");
    eyre::ensure!(
        matches!(fetched, Err(TaskLifecycleError::TaskNotFound(_))),
        "foreign task fetched: {fetched:?}"
    );
    Ok(())
}
