//! Then steps for XP progression BDD scenarios.

use super::world::{XpWorld, run_async};
use rstest_bdd_macros::then;
use taskquest::progress::{domain::Xp, ports::UserRepository};
use taskquest::task::{domain::TaskStatus, services::TaskLifecycleError};

#[then("the user has {xp:u64} XP")]
fn user_has_xp(world: &XpWorld, xp: u64) -> Result<(), eyre::Report> {
    let id = world.user()?.id();
    let stored = run_async(world.store.find_by_id(id))?
        .ok_or_else(|| eyre::eyre!("scenario user missing from store"))?;
    eyre::ensure!(
        stored.xp() == Xp::new(xp),
        "expected {xp} XP, found {}",
        stored.xp()
    );
    Ok(())
}

#[then(r#"the user's level is "{name}""#)]
fn user_level_is(world: &XpWorld, name: String) -> Result<(), eyre::Report> {
    let id = world.user()?.id();
    let stored = run_async(world.store.find_by_id(id))?
        .ok_or_else(|| eyre::eyre!("scenario user missing from store"))?;
    let level = world
        .catalog()?
        .find(stored.level_id())
        .ok_or_else(|| eyre::eyre!("user level missing from catalog"))?;
    eyre::ensure!(
        level.name().as_str() == name,
        "expected level {name}, found {}",
        level.name().as_str()
    );
    Ok(())
}

#[then(r#"the user first reaches "{name}" on completion {completion:u32}"#)]
fn user_first_reaches_level(
    world: &XpWorld,
    name: String,
    completion: u32,
) -> Result<(), eyre::Report> {
    let catalog = world.catalog()?;
    let history: Vec<&str> = world
        .completion_levels
        .iter()
        .map(|id| catalog.find(*id).map_or("unknown", |level| level.name().as_str()))
        .collect();
    let first = history
        .iter()
        .position(|level| *level == name)
        .map(|index| index + 1);
    eyre::ensure!(
        first == Some(usize::try_from(completion)?),
        "expected {name} first at completion {completion}, levels were {history:?}"
    );
    Ok(())
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &XpWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = world
        .last_task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?;
    eyre::ensure!(
        task.status() == expected,
        "expected status {}, found {}",
        expected.as_str(),
        task.status().as_str()
    );
    Ok(())
}

#[then("the last completion fails because the task is already completed")]
fn last_completion_already_completed(world: &XpWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_completion
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing completion result"))?;
    eyre::ensure!(
        matches!(result, Err(TaskLifecycleError::AlreadyCompleted(_))),
        "expected AlreadyCompleted error, got {result:?}"
    );
    Ok(())
}
