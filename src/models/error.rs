//! Errors surfaced to the operator by the tracker and admin controllers.

use crate::gateway::GatewayError;
use crate::models::player::PlayerId;

/// Errors that can occur during leaderboard operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LeaderboardError {
    /// Required form fields missing; nothing was written.
    Validation(String),
    /// Wrong admin password.
    InvalidPassword,
    /// Admin action attempted without an authenticated session.
    NotAuthenticated,
    /// No document store configured, or the live subscription has failed.
    GatewayUnavailable,
    /// Player not found on the current board.
    PlayerNotFound(PlayerId),
    /// No increment recorded for the tracked player.
    NothingToUndo,
    /// Another tracker write is still pending.
    WriteInProgress,
    /// The change would take a counter below zero.
    NegativeAssists(PlayerId),
    /// The change would take a counter past the largest storable total.
    AssistsOutOfRange(PlayerId),
    /// The document store rejected a write. Local state is untouched.
    Write(GatewayError),
    /// The session flag could not be stored.
    Session(String),
}

impl std::fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaderboardError::Validation(msg) => write!(f, "{}", msg),
            LeaderboardError::InvalidPassword => write!(f, "Incorrect password"),
            LeaderboardError::NotAuthenticated => write!(f, "Admin login required"),
            LeaderboardError::GatewayUnavailable => {
                write!(f, "Live data store is not available; changes are disabled")
            }
            LeaderboardError::PlayerNotFound(id) => write!(f, "Player not found: {}", id),
            LeaderboardError::NothingToUndo => {
                write!(f, "No recent change to undo for the tracked player")
            }
            LeaderboardError::WriteInProgress => write!(f, "An update is already in progress"),
            LeaderboardError::NegativeAssists(id) => {
                write!(f, "Assists for {} cannot go below zero", id)
            }
            LeaderboardError::AssistsOutOfRange(id) => {
                write!(f, "Assists for {} cannot go above {}", id, u32::MAX)
            }
            LeaderboardError::Write(e) => write!(f, "Failed to update: {}", e),
            LeaderboardError::Session(msg) => write!(f, "Session error: {}", msg),
        }
    }
}

impl std::error::Error for LeaderboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LeaderboardError::Write(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GatewayError> for LeaderboardError {
    fn from(e: GatewayError) -> Self {
        LeaderboardError::Write(e)
    }
}
