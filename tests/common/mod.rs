//! Shared helpers for the integration tests.

#![allow(dead_code)]

use assist_leaderboard_web::logic::encode_fields;
use assist_leaderboard_web::{
    seed_players, Document, MemoryGateway, PlayerFields, PlayerGateway, SyncEngine, TrackedPolicy,
};
use std::sync::Arc;
use std::time::Duration;

/// Document store holding the built-in record list.
pub fn seeded_gateway() -> MemoryGateway {
    MemoryGateway::with_documents(
        seed_players()
            .iter()
            .map(|p| Document::new(p.id.clone(), encode_fields(&PlayerFields::from(p)))),
    )
}

/// Engine connected to `gateway`, once the first snapshot has landed.
pub async fn connected_engine(gateway: &MemoryGateway) -> SyncEngine {
    let engine = SyncEngine::start(
        Some(Arc::new(gateway.clone()) as Arc<dyn PlayerGateway>),
        TrackedPolicy::StoredFlag,
    );
    wait_until(&engine, |e| *e.updates().borrow() > 0).await;
    engine
}

/// Wait for the subscription to bring the engine into the expected state.
pub async fn wait_until(engine: &SyncEngine, cond: impl Fn(&SyncEngine) -> bool) {
    let mut updates = engine.updates();
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond(engine) {
            updates.changed().await.expect("player store dropped");
        }
    })
    .await
    .expect("engine never reached the expected state");
}

pub fn assists_of(engine: &SyncEngine, id: &str) -> Option<u32> {
    engine.leaderboard().get(id).map(|p| p.assists)
}

pub fn is_sorted(engine: &SyncEngine) -> bool {
    engine
        .leaderboard()
        .players()
        .windows(2)
        .all(|w| w[0].assists >= w[1].assists)
}
