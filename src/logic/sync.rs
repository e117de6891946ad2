//! Sync engine: picks the player store once at startup and owns the live subscription.

use crate::gateway::{OrderedQuery, PlayerGateway, SubscriptionHandle};
use crate::logic::decode::TrackedPolicy;
use crate::logic::seed::seed_players;
use crate::logic::store::{LocalStore, PlayerStore, RemoteStore, SyncMode};
use crate::models::Leaderboard;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct ActiveSubscription {
    handle: SubscriptionHandle,
    pump: JoinHandle<()>,
}

impl ActiveSubscription {
    fn release(self) {
        self.handle.unsubscribe();
        self.pump.abort();
    }
}

/// Keeps the in-memory leaderboard in step with its source.
///
/// With a gateway: one live query per mount, every snapshot a full replace. Without:
/// the seed list, changed only by local writes. Must be started inside a tokio runtime.
pub struct SyncEngine {
    store: Arc<dyn PlayerStore>,
    remote: Option<Arc<RemoteStore>>,
    active: Mutex<Option<ActiveSubscription>>,
}

impl SyncEngine {
    /// `None` means no document store is configured: fallback mode.
    pub fn start(gateway: Option<Arc<dyn PlayerGateway>>, policy: TrackedPolicy) -> Self {
        let Some(gateway) = gateway else {
            log::info!("Document store not configured, using built-in player list");
            return Self {
                store: Arc::new(LocalStore::new(seed_players(), &policy)),
                remote: None,
                active: Mutex::new(None),
            };
        };
        let remote = Arc::new(RemoteStore::new(gateway, policy));
        let engine = Self {
            store: Arc::clone(&remote) as Arc<dyn PlayerStore>,
            remote: Some(remote),
            active: Mutex::new(None),
        };
        engine.mount();
        engine
    }

    /// (Re)establish the live query, releasing any previous one first.
    /// Restores write availability if the subscription succeeds. No-op in fallback mode.
    pub fn mount(&self) {
        let Some(remote) = &self.remote else {
            return;
        };
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = active.take() {
            previous.release();
        }
        let gateway = match remote.gateway() {
            Some(gateway) => gateway,
            None => return,
        };
        log::info!("Subscribing to players ordered by assists");
        match gateway.subscribe(OrderedQuery::players_by_assists()) {
            Ok(subscription) => {
                remote.set_available(true);
                let store = Arc::clone(remote);
                let mut events = subscription.events;
                let pump = tokio::spawn(async move {
                    while let Some(event) = events.recv().await {
                        store.apply_event(event);
                    }
                    log::debug!("Player subscription stream closed");
                });
                *active = Some(ActiveSubscription {
                    handle: subscription.handle,
                    pump,
                });
            }
            Err(e) => {
                log::error!("Failed to subscribe to players: {}", e);
                remote.set_available(false);
            }
        }
    }

    /// Release the live query. Data already received stays on the board.
    pub fn unmount(&self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = active.take() {
            previous.release();
            log::info!("Player subscription released");
        }
    }

    pub fn store(&self) -> Arc<dyn PlayerStore> {
        Arc::clone(&self.store)
    }

    pub fn mode(&self) -> SyncMode {
        self.store.mode()
    }

    pub fn is_available(&self) -> bool {
        self.store.is_available()
    }

    pub fn leaderboard(&self) -> Leaderboard {
        self.store.leaderboard()
    }

    pub fn updates(&self) -> watch::Receiver<u64> {
        self.store.updates()
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.unmount();
    }
}
