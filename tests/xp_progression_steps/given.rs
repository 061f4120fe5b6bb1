//! Given steps for XP progression BDD scenarios.

use super::world::{XpWorld, run_async};
use chrono::Utc;
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::given;
use std::sync::Arc;
use taskquest::progress::{
    domain::{PersistedUserData, User, UserId, Xp},
    ports::UserRepository,
    services::ProgressService,
};

#[given("the default level catalog")]
fn default_level_catalog(world: &mut XpWorld) -> Result<(), eyre::Report> {
    let service = ProgressService::new(
        Arc::new(world.store.clone()),
        Arc::new(world.store.clone()),
        Arc::new(DefaultClock),
    );
    run_async(service.seed_default_catalog()).wrap_err("seed default catalog")?;
    let catalog = run_async(service.load_catalog()).wrap_err("load seeded catalog")?;
    world.catalog = Some(catalog);
    Ok(())
}

#[given("a user with {xp:u64} XP")]
fn user_with_xp(world: &mut XpWorld, xp: u64) -> Result<(), eyre::Report> {
    let amount = Xp::new(xp);
    let level_id = world.catalog()?.resolve(amount).id();
    let now = Utc::now();
    let user = User::from_persisted(PersistedUserData {
        id: UserId::new(),
        display_name: "Scenario user".to_owned(),
        xp: amount,
        level_id,
        revision: 0,
        created_at: now,
        updated_at: now,
    });
    run_async(world.store.store(&user)).wrap_err("store scenario user")?;
    world.user = Some(user);
    Ok(())
}

#[given("the completion reward is {reward:u64} XP")]
fn completion_reward(world: &mut XpWorld, reward: u64) {
    world.rules.completion_reward = Xp::new(reward);
}
