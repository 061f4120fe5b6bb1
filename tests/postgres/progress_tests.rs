//! `PostgreSQL` integration tests for level seeding and users.

use rstest::rstest;
use taskquest::progress::{
    domain::Xp,
    ports::{LevelRepository, SeedOutcome},
    adapters::postgres::PostgresProgressStore,
};

use super::helpers::{BoxError, TestSchema};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKQUEST_TEST_DATABASE_URL"]
async fn postgres_seed_inserts_catalog_once() -> Result<(), BoxError> {
    let schema = TestSchema::create()?;
    let progress = schema.progress_service();

    let first = progress.seed_default_catalog().await?;
    let second = progress.seed_default_catalog().await?;

    assert_eq!(first, SeedOutcome::Seeded(6));
    assert_eq!(second, SeedOutcome::AlreadyPresent(6));
    let levels = PostgresProgressStore::new(schema.pool.clone())
        .list_ordered()
        .await?;
    let thresholds: Vec<u64> = levels.iter().map(|level| level.xp_required().value()).collect();
    assert_eq!(thresholds, vec![0, 100, 500, 1000, 2000, 5000]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKQUEST_TEST_DATABASE_URL"]
async fn postgres_enrolled_user_round_trips() -> Result<(), BoxError> {
    let schema = TestSchema::create()?;
    let (catalog, user) = schema.enrolled_user("Edsger").await?;

    let stored = schema
        .progress_service()
        .find_user(user.id())
        .await?
        .ok_or("user missing")?;

    assert_eq!(stored.display_name(), "Edsger");
    assert_eq!(stored.xp(), Xp::ZERO);
    assert_eq!(stored.level_id(), catalog.lowest().id());
    assert_eq!(stored.revision(), 0);
    Ok(())
}

#[rstest]
fn missing_database_url_fails_instead_of_skipping() {
    let result = TestSchema::connect(None);

    let err = result.err().map(|err| err.to_string()).unwrap_or_default();
    assert!(err.contains("TASKQUEST_TEST_DATABASE_URL"), "unexpected: {err:?}");
}
