//! Player stores: where the leaderboard lives and how counter writes reach it.
//!
//! `LocalStore` owns the list and mutates it directly (no document store configured).
//! `RemoteStore` mirrors the live query; writes go to the gateway and come back through
//! the subscription, never straight into the list.

use crate::gateway::{FieldUpdate, PlayerGateway, SnapshotEvent};
use crate::logic::decode::{decode_snapshot, TrackedPolicy};
use crate::models::{checked_assists, sort_by_assists, Leaderboard, LeaderboardError, Player};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

/// Which store is authoritative for the player list.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Built-in seed list, changed in place.
    Local,
    /// Mirror of the document store, changed only by snapshots.
    Remote,
}

#[async_trait]
pub trait PlayerStore: Send + Sync {
    fn mode(&self) -> SyncMode;

    /// Current players, ranked.
    fn leaderboard(&self) -> Leaderboard;

    /// False once a remote store has lost its subscription.
    fn is_available(&self) -> bool;

    /// Gateway for arbitrary document writes. Local stores have none.
    fn gateway(&self) -> Option<Arc<dyn PlayerGateway>>;

    /// Ticks every time the player list (or availability) changes.
    fn updates(&self) -> watch::Receiver<u64>;

    /// Add `delta` (may be negative) to a player's assists.
    async fn add_assists(&self, id: &str, delta: i64) -> Result<(), LeaderboardError>;
}

fn bump(revision: &watch::Sender<u64>) {
    revision.send_modify(|r| *r += 1);
}

fn warn_on_several_tracked(board: &Leaderboard) {
    let count = board.tracked_count();
    if count > 1 {
        if let Some(first) = board.tracked() {
            log::warn!(
                "{} players are flagged as tracked; using {} ({})",
                count,
                first.id,
                first.name
            );
        }
    }
}

/// Seed-backed store with immediate consistency.
pub struct LocalStore {
    players: RwLock<Vec<Player>>,
    revision: watch::Sender<u64>,
}

impl LocalStore {
    /// Re-resolves tracked flags through `policy` so both stores agree on who is tracked.
    pub fn new(players: Vec<Player>, policy: &TrackedPolicy) -> Self {
        let mut players: Vec<Player> = players
            .into_iter()
            .map(|mut p| {
                if let TrackedPolicy::ReservedId(reserved) = policy {
                    p.is_tracked = p.id == *reserved;
                }
                p
            })
            .collect();
        sort_by_assists(&mut players);
        let (revision, _) = watch::channel(0);
        let store = Self {
            players: RwLock::new(players),
            revision,
        };
        warn_on_several_tracked(&store.leaderboard());
        store
    }
}

#[async_trait]
impl PlayerStore for LocalStore {
    fn mode(&self) -> SyncMode {
        SyncMode::Local
    }

    fn leaderboard(&self) -> Leaderboard {
        let players = self.players.read().unwrap_or_else(PoisonError::into_inner);
        Leaderboard::new(players.clone())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn gateway(&self) -> Option<Arc<dyn PlayerGateway>> {
        None
    }

    fn updates(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    async fn add_assists(&self, id: &str, delta: i64) -> Result<(), LeaderboardError> {
        {
            let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
            let player = players
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| LeaderboardError::PlayerNotFound(id.to_string()))?;
            player.apply_delta(delta)?;
            sort_by_assists(&mut players);
        }
        bump(&self.revision);
        Ok(())
    }
}

/// Mirror of the live query. The subscription pump is its only writer.
pub struct RemoteStore {
    gateway: Arc<dyn PlayerGateway>,
    policy: TrackedPolicy,
    players: RwLock<Vec<Player>>,
    available: AtomicBool,
    revision: watch::Sender<u64>,
}

impl RemoteStore {
    pub fn new(gateway: Arc<dyn PlayerGateway>, policy: TrackedPolicy) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            gateway,
            policy,
            players: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
            revision,
        }
    }

    /// Apply one subscription event. Snapshots replace the whole list; errors keep the
    /// last data but stop further writes.
    pub fn apply_event(&self, event: SnapshotEvent) {
        match event {
            SnapshotEvent::Snapshot(docs) => {
                let mut players = decode_snapshot(&docs, &self.policy);
                sort_by_assists(&mut players);
                let count = players.len();
                *self.players.write().unwrap_or_else(PoisonError::into_inner) = players;
                log::debug!("Players updated from snapshot: {}", count);
                warn_on_several_tracked(&self.leaderboard());
            }
            SnapshotEvent::Error(e) => {
                log::error!("Player subscription failed: {}", e);
                self.set_available(false);
            }
        }
        bump(&self.revision);
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn current_assists(&self, id: &str) -> Option<u32> {
        let players = self.players.read().unwrap_or_else(PoisonError::into_inner);
        players.iter().find(|p| p.id == id).map(|p| p.assists)
    }
}

#[async_trait]
impl PlayerStore for RemoteStore {
    fn mode(&self) -> SyncMode {
        SyncMode::Remote
    }

    fn leaderboard(&self) -> Leaderboard {
        let players = self.players.read().unwrap_or_else(PoisonError::into_inner);
        Leaderboard::new(players.clone())
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn gateway(&self) -> Option<Arc<dyn PlayerGateway>> {
        Some(Arc::clone(&self.gateway))
    }

    fn updates(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    async fn add_assists(&self, id: &str, delta: i64) -> Result<(), LeaderboardError> {
        if !self.is_available() {
            return Err(LeaderboardError::GatewayUnavailable);
        }
        if let Some(current) = self.current_assists(id) {
            checked_assists(id, current, delta)?;
        }
        let updates = vec![
            FieldUpdate::increment("assists", delta),
            FieldUpdate::server_timestamp("lastUpdated"),
        ];
        self.gateway.update_document(id, updates).await.map_err(|e| {
            log::error!("Failed to change assists for {} by {}: {}", id, delta, e);
            LeaderboardError::Write(e)
        })
    }
}
