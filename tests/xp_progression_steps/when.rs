//! When steps for XP progression BDD scenarios.

use super::world::{XpWorld, run_async};
use chrono::{Duration, Utc};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskquest::task::services::{CreateTaskRequest, UpdateTaskRequest};

fn create_task(world: &mut XpWorld, offset: Duration) -> Result<(), eyre::Report> {
    let owner = world.user()?.id();
    let request = CreateTaskRequest::new("Scenario task", Utc::now() + offset);
    let task = run_async(world.service().create_task(owner, request)).wrap_err("create task")?;
    world.last_task = Some(task);
    Ok(())
}

fn complete_last_task(world: &mut XpWorld) -> Result<(), eyre::Report> {
    let owner = world.user()?.id();
    let task_id = world
        .last_task
        .as_ref()
        .map(taskquest::task::domain::Task::id)
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?;
    let result = run_async(world.service().complete_task(owner, task_id));
    world.last_completion = Some(result.map(|completion| completion.user));
    Ok(())
}

fn complete_new_tasks(world: &mut XpWorld, count: u32) -> Result<(), eyre::Report> {
    for _ in 0..count {
        create_task(world, Duration::days(1))?;
        complete_last_task(world)?;
        match world.last_completion.take() {
            Some(Ok(user)) => world.completion_levels.push(user.level_id()),
            Some(Err(err)) => return Err(eyre::eyre!("completion failed: {err}")),
            None => {}
        }
    }
    Ok(())
}

#[when("the user completes {count:u32} tasks")]
fn user_completes_tasks(world: &mut XpWorld, count: u32) -> Result<(), eyre::Report> {
    complete_new_tasks(world, count)
}

#[when("the user completes one task")]
fn user_completes_one_task(world: &mut XpWorld) -> Result<(), eyre::Report> {
    complete_new_tasks(world, 1)
}

#[when("the user creates a task that is already overdue")]
fn user_creates_overdue_task(world: &mut XpWorld) -> Result<(), eyre::Report> {
    create_task(world, Duration::hours(-1))
}

#[when("the user creates a task due tomorrow")]
fn user_creates_task_due_tomorrow(world: &mut XpWorld) -> Result<(), eyre::Report> {
    create_task(world, Duration::days(1))
}

#[when("the task deadline moves to yesterday")]
fn task_deadline_moves_to_yesterday(world: &mut XpWorld) -> Result<(), eyre::Report> {
    let owner = world.user()?.id();
    let task_id = world
        .last_task
        .as_ref()
        .map(taskquest::task::domain::Task::id)
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?;
    let request = UpdateTaskRequest::new().with_deadline(Utc::now() - Duration::days(1));
    let task = run_async(world.service().update_task(owner, task_id, request))
        .wrap_err("move task deadline")?;
    world.last_task = Some(task);
    Ok(())
}

#[when("the user completes the task")]
fn user_completes_the_task(world: &mut XpWorld) -> Result<(), eyre::Report> {
    complete_last_task(world)
}

#[when("the user completes the task again")]
fn user_completes_the_task_again(world: &mut XpWorld) -> Result<(), eyre::Report> {
    complete_last_task(world)
}
