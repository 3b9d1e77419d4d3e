//! Cron-driven cleanup sweep.

use challenger::scheduler::SweepScheduler;
use challenger::{EventBus, Retention, Store, Team, User};
use std::sync::Arc;
use std::time::Duration;

#[actix_web::test]
async fn starts_and_stops_on_daily_cron() {
    let store = Arc::new(Store::new());
    let scheduler = SweepScheduler::start(
        store,
        EventBus::default(),
        Retention::default(),
        "0 0 3 * * *",
        None,
    )
    .await
    .unwrap();
    scheduler.stop().await.unwrap();
}

#[actix_web::test]
async fn invalid_cron_is_rejected() {
    let store = Arc::new(Store::new());
    let result = SweepScheduler::start(
        store,
        EventBus::default(),
        Retention::default(),
        "not a cron",
        None,
    )
    .await;
    assert!(result.is_err());
}

#[actix_web::test]
async fn scheduled_run_repairs_and_saves_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("challenger.json");

    let store = Arc::new(Store::new());
    let alice = store.users.create(User::new("alice")).await.unwrap();
    let team = store.teams.create(Team::new("A", alice.id)).await.unwrap();
    store.users.delete(alice.id).await;

    let scheduler = SweepScheduler::start(
        store.clone(),
        EventBus::default(),
        Retention::default(),
        "* * * * * *",
        Some(path.clone()),
    )
    .await
    .unwrap();

    let mut saved = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if path.exists() && !store.teams.exists(team.id).await {
            saved = true;
            break;
        }
    }
    scheduler.stop().await.unwrap();

    assert!(saved, "sweep did not run within 5s");
    let reloaded = Store::load(&path).await.unwrap();
    assert_eq!(reloaded.teams.count().await, 0);
}
