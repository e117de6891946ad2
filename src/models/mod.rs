//! Data structures for the leaderboard: players, ranking, undo record, errors.

mod error;
mod leaderboard;
mod player;

pub use error::LeaderboardError;
pub use leaderboard::{sort_by_assists, LastChange, Leaderboard, LeaderboardEntry};
pub use player::{checked_assists, NewPlayer, Player, PlayerFields, PlayerId, PLACEHOLDER_IMAGE};
