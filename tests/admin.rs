//! Integration tests for the admin controller: login gate, create/edit/delete, counters.

mod common;

use assist_leaderboard_web::{
    AdminController, AdminSession, LeaderboardError, MemorySession, NewPlayer, PlayerFields,
    SharedSecretVerifier, SyncEngine, TrackedPolicy, WriteOutcome, PLACEHOLDER_IMAGE,
};
use common::{assists_of, connected_engine, seeded_gateway, wait_until};
use serde_json::json;

const PASSWORD: &str = "admin123";

fn logged_in(engine: &SyncEngine) -> AdminController<MemorySession> {
    let admin = AdminController::new(AdminSession::new(MemorySession::default()), engine.store());
    admin
        .login(PASSWORD, &SharedSecretVerifier::new(PASSWORD))
        .unwrap();
    admin
}

#[tokio::test]
async fn actions_require_login() {
    let gateway = seeded_gateway();
    let engine = connected_engine(&gateway).await;
    let admin = AdminController::new(AdminSession::new(MemorySession::default()), engine.store());

    assert_eq!(admin.players(), Err(LeaderboardError::NotAuthenticated));
    assert_eq!(
        admin.increment("1").await,
        Err(LeaderboardError::NotAuthenticated)
    );
    assert_eq!(
        admin.login("wrong", &SharedSecretVerifier::new(PASSWORD)),
        Err(LeaderboardError::InvalidPassword)
    );
    assert_eq!(gateway.write_attempts(), 0);
}

#[tokio::test]
async fn login_survives_navigation_until_logout() {
    let gateway = seeded_gateway();
    let engine = connected_engine(&gateway).await;
    let flags = MemorySession::default();
    let verifier = SharedSecretVerifier::new(PASSWORD);

    AdminController::new(AdminSession::new(flags.clone()), engine.store())
        .login(PASSWORD, &verifier)
        .unwrap();

    let next_view = AdminController::new(AdminSession::new(flags.clone()), engine.store());
    assert_eq!(next_view.players().unwrap().len(), 11);

    next_view.logout();
    let after = AdminController::new(AdminSession::new(flags), engine.store());
    assert!(!after.session().is_authenticated());
}

#[tokio::test]
async fn writes_disabled_without_document_store() {
    let engine = SyncEngine::start(None, TrackedPolicy::StoredFlag);
    let admin = logged_in(&engine);
    assert_eq!(admin.players().unwrap().len(), 11);
    assert_eq!(
        admin.increment("1").await,
        Err(LeaderboardError::GatewayUnavailable)
    );
    assert_eq!(
        admin.create(NewPlayer::new("Cooper Flagg", "Duke")).await,
        Err(LeaderboardError::GatewayUnavailable)
    );
}

#[tokio::test]
async fn create_derives_id_and_fills_defaults() {
    let gateway = seeded_gateway();
    let engine = connected_engine(&gateway).await;
    let admin = logged_in(&engine);

    let id = admin
        .create(NewPlayer::new("Cooper Flagg", "Duke"))
        .await
        .unwrap();
    assert_eq!(id, "cooper-flagg");
    wait_until(&engine, |e| e.leaderboard().get("cooper-flagg").is_some()).await;

    let doc = gateway.document("cooper-flagg").unwrap();
    assert_eq!(doc["assists"], json!(0));
    assert_eq!(doc["imageUrl"], json!(PLACEHOLDER_IMAGE));
    assert_eq!(doc["isTracked"], json!(false));

    let id = admin
        .create(NewPlayer::new("  A.J. Green!!", "Duke"))
        .await
        .unwrap();
    assert_eq!(id, "aj-green");
}

#[tokio::test]
async fn create_rejects_blank_fields_without_writing() {
    let gateway = seeded_gateway();
    let engine = connected_engine(&gateway).await;
    let admin = logged_in(&engine);

    let err = admin.create(NewPlayer::new("Cooper Flagg", "   ")).await;
    assert!(matches!(err, Err(LeaderboardError::Validation(_))));
    let err = admin.create(NewPlayer::new("", "Duke")).await;
    assert!(matches!(err, Err(LeaderboardError::Validation(_))));
    let err = admin.create(NewPlayer::new("!!!", "Duke")).await;
    assert!(matches!(err, Err(LeaderboardError::Validation(_))));
    assert_eq!(gateway.write_attempts(), 0);
}

#[tokio::test]
async fn decrement_at_zero_is_a_no_op() {
    let gateway = seeded_gateway();
    let engine = connected_engine(&gateway).await;
    let admin = logged_in(&engine);

    admin
        .create(NewPlayer::new("Walk On", "Purdue"))
        .await
        .unwrap();
    wait_until(&engine, |e| assists_of(e, "walk-on") == Some(0)).await;
    let writes = gateway.write_attempts();

    for _ in 0..3 {
        assert_eq!(admin.decrement("walk-on").await, Ok(WriteOutcome::Skipped));
    }
    assert_eq!(gateway.write_attempts(), writes);
    assert_eq!(assists_of(&engine, "walk-on"), Some(0));
}

#[tokio::test]
async fn counters_move_any_player() {
    let gateway = seeded_gateway();
    let engine = connected_engine(&gateway).await;
    let admin = logged_in(&engine);

    assert_eq!(admin.increment("10").await, Ok(WriteOutcome::Applied));
    wait_until(&engine, |e| assists_of(e, "10") == Some(951)).await;
    assert_eq!(admin.decrement("2").await, Ok(WriteOutcome::Applied));
    wait_until(&engine, |e| assists_of(e, "2") == Some(1037)).await;

    assert_eq!(
        admin.increment("nobody").await,
        Err(LeaderboardError::PlayerNotFound("nobody".to_string()))
    );
}

#[tokio::test]
async fn edit_replaces_the_editable_fields() {
    let gateway = seeded_gateway();
    let engine = connected_engine(&gateway).await;
    let admin = logged_in(&engine);

    let fields = PlayerFields {
        name: "Greg Anthony".to_string(),
        school: "UNLV".to_string(),
        assists: 1100,
        image_url: "/greg.png".to_string(),
        is_tracked: true,
    };
    admin.edit("10", fields).await.unwrap();
    wait_until(&engine, |e| assists_of(e, "10") == Some(1100)).await;

    let board = engine.leaderboard();
    let greg = board.get("10").unwrap();
    assert_eq!(greg.school, "UNLV");
    assert_eq!(greg.image_url, "/greg.png");
    // Two flagged players: the higher ranked one drives the tracker.
    assert_eq!(board.tracked().map(|p| p.id.as_str()), Some("10"));
    assert_eq!(board.players()[0].id, "10");
}

#[tokio::test]
async fn delete_needs_confirmation() {
    let gateway = seeded_gateway();
    let engine = connected_engine(&gateway).await;
    let admin = logged_in(&engine);

    assert_eq!(admin.delete("9", |_| false).await, Ok(WriteOutcome::Skipped));
    assert!(gateway.document("9").is_some());

    let outcome = admin.delete("9", |p| p.name == "Aaron Miles").await;
    assert_eq!(outcome, Ok(WriteOutcome::Applied));
    wait_until(&engine, |e| e.leaderboard().get("9").is_none()).await;
    assert_eq!(engine.leaderboard().len(), 10);
}

#[tokio::test]
async fn write_failures_leave_board_untouched() {
    let gateway = seeded_gateway();
    let engine = connected_engine(&gateway).await;
    let admin = logged_in(&engine);
    gateway.set_fail_writes(true);

    assert!(matches!(
        admin.increment("1").await,
        Err(LeaderboardError::Write(_))
    ));
    assert!(matches!(
        admin.create(NewPlayer::new("Cooper Flagg", "Duke")).await,
        Err(LeaderboardError::Write(_))
    ));
    assert_eq!(assists_of(&engine, "1"), Some(1076));
    assert!(engine.leaderboard().get("cooper-flagg").is_none());
}

#[tokio::test]
async fn increment_at_counter_limit_is_refused() {
    let gateway = seeded_gateway();
    let engine = connected_engine(&gateway).await;
    let admin = logged_in(&engine);

    let mut fields = PlayerFields::from(engine.leaderboard().get("10").unwrap());
    fields.assists = u32::MAX;
    admin.edit("10", fields).await.unwrap();
    wait_until(&engine, |e| assists_of(e, "10") == Some(u32::MAX)).await;
    let writes = gateway.write_attempts();

    assert_eq!(
        admin.increment("10").await,
        Err(LeaderboardError::AssistsOutOfRange("10".to_string()))
    );
    assert_eq!(gateway.write_attempts(), writes);
    assert_eq!(assists_of(&engine, "10"), Some(u32::MAX));

    assert_eq!(admin.decrement("10").await, Ok(WriteOutcome::Applied));
    wait_until(&engine, |e| assists_of(e, "10") == Some(u32::MAX - 1)).await;
}
