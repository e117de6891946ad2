//! Admin panel operations: counters, edit, delete and create for any player.
//!
//! Every write goes to the document store; the board only changes when the
//! subscription echoes it back.

use crate::gateway::{FieldUpdate, PlayerGateway};
use crate::logic::auth::{AdminSession, CredentialVerifier, SessionFlagStore};
use crate::logic::decode::encode_fields;
use crate::logic::player_id::derive_player_id;
use crate::logic::store::PlayerStore;
use crate::models::{
    checked_assists, Leaderboard, LeaderboardError, NewPlayer, Player, PlayerFields, PlayerId,
};
use std::sync::Arc;

/// Whether a guarded write was issued.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WriteOutcome {
    Applied,
    /// Refused before any write (counter already at zero, delete not confirmed).
    Skipped,
}

pub struct AdminController<S> {
    session: AdminSession<S>,
    store: Arc<dyn PlayerStore>,
}

impl<S: SessionFlagStore> AdminController<S> {
    pub fn new(session: AdminSession<S>, store: Arc<dyn PlayerStore>) -> Self {
        Self { session, store }
    }

    pub fn session(&self) -> &AdminSession<S> {
        &self.session
    }

    pub fn login(&self, password: &str, verifier: &dyn CredentialVerifier) -> Result<(), LeaderboardError> {
        self.session.login(password, verifier)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    /// The board as the admin sees it.
    pub fn players(&self) -> Result<Leaderboard, LeaderboardError> {
        self.session.require()?;
        Ok(self.store.leaderboard())
    }

    fn gateway(&self) -> Result<Arc<dyn PlayerGateway>, LeaderboardError> {
        self.session.require()?;
        match self.store.gateway() {
            Some(gateway) if self.store.is_available() => Ok(gateway),
            _ => Err(LeaderboardError::GatewayUnavailable),
        }
    }

    fn find(&self, id: &str) -> Result<Player, LeaderboardError> {
        self.store
            .leaderboard()
            .get(id)
            .cloned()
            .ok_or_else(|| LeaderboardError::PlayerNotFound(id.to_string()))
    }

    /// Refused without writing when the counter is already at its largest value.
    pub async fn increment(&self, id: &str) -> Result<WriteOutcome, LeaderboardError> {
        let gateway = self.gateway()?;
        let player = self.find(id)?;
        checked_assists(id, player.assists, 1)?;
        gateway.increment(id, "assists", 1).await.map_err(|e| {
            log::error!("Failed to increment {}: {}", id, e);
            LeaderboardError::Write(e)
        })?;
        Ok(WriteOutcome::Applied)
    }

    /// Refused without writing when the player is already at zero.
    pub async fn decrement(&self, id: &str) -> Result<WriteOutcome, LeaderboardError> {
        let gateway = self.gateway()?;
        let player = self.find(id)?;
        if player.assists == 0 {
            log::info!("Decrement skipped: {} already has no assists", id);
            return Ok(WriteOutcome::Skipped);
        }
        gateway.increment(id, "assists", -1).await.map_err(|e| {
            log::error!("Failed to decrement {}: {}", id, e);
            LeaderboardError::Write(e)
        })?;
        Ok(WriteOutcome::Applied)
    }

    /// Overwrite the five editable fields of an existing player.
    pub async fn edit(&self, id: &str, fields: PlayerFields) -> Result<(), LeaderboardError> {
        let gateway = self.gateway()?;
        let updates = encode_fields(&fields)
            .into_iter()
            .map(|(field, value)| FieldUpdate::set(field, value))
            .collect();
        gateway.update_document(id, updates).await.map_err(|e| {
            log::error!("Failed to save edit for {}: {}", id, e);
            LeaderboardError::Write(e)
        })?;
        log::info!("Player {} updated", id);
        Ok(())
    }

    /// Delete a player once `confirm` approves. Irreversible.
    pub async fn delete<F>(&self, id: &str, confirm: F) -> Result<WriteOutcome, LeaderboardError>
    where
        F: FnOnce(&Player) -> bool,
    {
        let gateway = self.gateway()?;
        let player = self.find(id)?;
        if !confirm(&player) {
            log::info!("Delete of {} cancelled", id);
            return Ok(WriteOutcome::Skipped);
        }
        gateway.delete_document(id).await.map_err(|e| {
            log::error!("Failed to delete {}: {}", id, e);
            LeaderboardError::Write(e)
        })?;
        log::info!("Player {} deleted", id);
        Ok(WriteOutcome::Applied)
    }

    /// Create a player under an id derived from the name. An existing player with the
    /// same derived id is replaced.
    pub async fn create(&self, new_player: NewPlayer) -> Result<PlayerId, LeaderboardError> {
        self.session.require()?;
        let fields = new_player.into_fields();
        if fields.name.is_empty() || fields.school.is_empty() {
            return Err(LeaderboardError::Validation(
                "Name and school are required".to_string(),
            ));
        }
        let id = derive_player_id(&fields.name);
        if id.is_empty() {
            return Err(LeaderboardError::Validation(
                "Name must contain at least one letter or digit".to_string(),
            ));
        }
        let gateway = self.gateway()?;
        gateway
            .set_document(&id, encode_fields(&fields))
            .await
            .map_err(|e| {
                log::error!("Failed to add player {}: {}", id, e);
                LeaderboardError::Write(e)
            })?;
        log::info!("Player {} added", id);
        Ok(id)
    }
}
