//! Integration tests for the sync engine: subscription lifetime, full replace, failures.

mod common;

use assist_leaderboard_web::{
    AssistTracker, Document, LeaderboardError, MemoryGateway, PlayerGateway, PlayerStore, SyncEngine,
    TrackedPolicy, PLACEHOLDER_IMAGE,
};
use common::{assists_of, connected_engine, seeded_gateway, wait_until};
use serde_json::json;

#[tokio::test]
async fn one_subscription_per_mount_released_on_drop() {
    let gateway = seeded_gateway();
    let engine = connected_engine(&gateway).await;
    assert_eq!(gateway.listener_count(), 1);

    engine.mount();
    assert_eq!(gateway.listener_count(), 1);

    engine.unmount();
    assert_eq!(gateway.listener_count(), 0);

    engine.mount();
    assert_eq!(gateway.listener_count(), 1);
    drop(engine);
    assert_eq!(gateway.listener_count(), 0);
}

#[tokio::test]
async fn fallback_mode_never_subscribes() {
    let engine = SyncEngine::start(None, TrackedPolicy::StoredFlag);
    engine.mount();
    assert!(engine.store().gateway().is_none());
    assert!(engine.is_available());
}

#[tokio::test]
async fn snapshots_replace_the_whole_board() {
    let gateway = seeded_gateway();
    let engine = connected_engine(&gateway).await;
    assert_eq!(engine.leaderboard().len(), 11);

    gateway.delete_document("1").await.unwrap();
    wait_until(&engine, |e| e.leaderboard().len() == 10).await;
    assert!(engine.leaderboard().get("1").is_none());
    assert_eq!(engine.leaderboard().max_assists(), 1038);
}

#[tokio::test]
async fn documents_are_decoded_with_defaults() {
    let legacy = json!({ "team": "Purdue", "assists": 12 });
    let broken = json!({ "name": "Broken", "assists": "lots" });
    let gateway = MemoryGateway::with_documents([
        Document::new("legacy", legacy.as_object().cloned().unwrap()),
        Document::new("broken", broken.as_object().cloned().unwrap()),
    ]);
    let engine = connected_engine(&gateway).await;

    let board = engine.leaderboard();
    assert_eq!(board.len(), 1);
    let p = board.get("legacy").unwrap();
    assert_eq!(p.name, "Unknown");
    assert_eq!(p.school, "Purdue");
    assert_eq!(p.image_url, PLACEHOLDER_IMAGE);
    assert!(!p.is_tracked);
}

#[tokio::test]
async fn subscription_failure_keeps_data_and_stops_writes() {
    let gateway = seeded_gateway();
    let engine = connected_engine(&gateway).await;
    let tracker = AssistTracker::new(engine.store());

    gateway.fail_subscriptions("connection reset");
    wait_until(&engine, |e| !e.is_available()).await;
    assert_eq!(engine.leaderboard().len(), 11);

    let writes = gateway.write_attempts();
    assert_eq!(
        tracker.increment().await,
        Err(LeaderboardError::GatewayUnavailable)
    );
    assert_eq!(gateway.write_attempts(), writes);
    assert!(!tracker.status().available);
}

#[tokio::test]
async fn remount_recovers_after_failure() {
    let gateway = seeded_gateway();
    let engine = connected_engine(&gateway).await;
    let tracker = AssistTracker::new(engine.store());

    gateway.fail_subscriptions("connection reset");
    wait_until(&engine, |e| !e.is_available()).await;

    engine.mount();
    assert!(engine.is_available());
    assert_eq!(gateway.listener_count(), 1);

    tracker.increment().await.unwrap();
    wait_until(&engine, |e| assists_of(e, "braden-smith") == Some(759)).await;
}
