//! Assist tracker: +1 / undo for the tracked player with a single-level history.

use crate::logic::store::{PlayerStore, SyncMode};
use crate::models::{LastChange, LeaderboardError, Player};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Snapshot of the tracker widget.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStatus {
    pub mode: SyncMode,
    pub available: bool,
    pub tracked: Option<Player>,
    pub max_assists: u32,
    /// Assists still needed to pass the record holder.
    pub need_to_break_record: Option<i64>,
    pub last_update: Option<DateTime<Utc>>,
    pub can_undo: bool,
    pub busy: bool,
}

/// Clears the in-flight flag when the write finishes, whatever the outcome.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct AssistTracker {
    store: Arc<dyn PlayerStore>,
    last_change: Mutex<Option<LastChange>>,
    last_update: Mutex<Option<DateTime<Utc>>>,
    in_flight: AtomicBool,
}

impl AssistTracker {
    pub fn new(store: Arc<dyn PlayerStore>) -> Self {
        Self {
            store,
            last_change: Mutex::new(None),
            last_update: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    fn begin_write(&self) -> Result<InFlight<'_>, LeaderboardError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| LeaderboardError::WriteInProgress)?;
        Ok(InFlight(&self.in_flight))
    }

    fn tracked_id(&self) -> Option<String> {
        self.store.leaderboard().tracked().map(|p| p.id.clone())
    }

    fn stamp(&self) {
        *lock(&self.last_update) = Some(Utc::now());
    }

    /// Add one assist to the tracked player.
    ///
    /// Returns `Ok(None)` without writing when no player is tracked. On failure nothing
    /// changes, including the undo record.
    pub async fn increment(&self) -> Result<Option<LastChange>, LeaderboardError> {
        let _write = self.begin_write()?;
        let Some(id) = self.tracked_id() else {
            log::debug!("Increment ignored: no tracked player");
            return Ok(None);
        };
        self.store.add_assists(&id, 1).await?;
        let change = LastChange {
            player_id: id,
            delta: 1,
        };
        *lock(&self.last_change) = Some(change.clone());
        self.stamp();
        log::info!("Assist added for {}", change.player_id);
        Ok(Some(change))
    }

    /// Revert the most recent increment. Only one level deep.
    ///
    /// A failed remote write keeps the undo record so the call can be retried.
    pub async fn undo(&self) -> Result<LastChange, LeaderboardError> {
        let _write = self.begin_write()?;
        let change = lock(&self.last_change).clone();
        let change = match (change, self.tracked_id()) {
            (Some(change), Some(tracked)) if change.player_id == tracked => change,
            _ => return Err(LeaderboardError::NothingToUndo),
        };
        self.store
            .add_assists(&change.player_id, -change.delta)
            .await?;
        *lock(&self.last_change) = None;
        self.stamp();
        log::info!("Undid {:+} for {}", change.delta, change.player_id);
        Ok(change)
    }

    pub fn last_change(&self) -> Option<LastChange> {
        lock(&self.last_change).clone()
    }

    pub fn status(&self) -> TrackerStatus {
        let board = self.store.leaderboard();
        let tracked = board.tracked().cloned();
        let can_undo = match (&*lock(&self.last_change), &tracked) {
            (Some(change), Some(p)) => change.player_id == p.id,
            _ => false,
        };
        TrackerStatus {
            mode: self.store.mode(),
            available: self.store.is_available(),
            max_assists: board.max_assists(),
            need_to_break_record: board.record_gap(),
            tracked,
            last_update: *lock(&self.last_update),
            can_undo,
            busy: self.in_flight.load(Ordering::SeqCst),
        }
    }
}
