//! Leaderboard: the player set ranked by assists, plus the undo record.

use crate::models::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};

/// The most recent increment applied to the tracked player. Enables exactly one undo.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastChange {
    pub player_id: PlayerId,
    pub delta: i64,
}

/// Sort players descending by assists. Stable, so ties keep their incoming order.
pub fn sort_by_assists(players: &mut [Player]) {
    players.sort_by(|a, b| b.assists.cmp(&a.assists));
}

/// One row of the rendered leaderboard.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based.
    pub rank: usize,
    #[serde(flatten)]
    pub player: Player,
    /// Share of the record holder's total, 0..=100.
    pub progress_percent: f64,
}

/// Players sorted descending by assists.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Leaderboard {
    players: Vec<Player>,
}

impl Leaderboard {
    pub fn new(mut players: Vec<Player>) -> Self {
        sort_by_assists(&mut players);
        Self { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn into_players(self) -> Vec<Player> {
        self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Highest assist total on the board (0 when empty).
    pub fn max_assists(&self) -> u32 {
        self.players.iter().map(|p| p.assists).max().unwrap_or(0)
    }

    /// The tracked player. When several carry the flag, the first in ranked order wins.
    pub fn tracked(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_tracked)
    }

    /// Number of players carrying the tracked flag.
    pub fn tracked_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_tracked).count()
    }

    /// Assists the tracked player needs to pass the record: `max - tracked + 1`.
    pub fn record_gap(&self) -> Option<i64> {
        let tracked = self.tracked()?;
        Some(i64::from(self.max_assists()) - i64::from(tracked.assists) + 1)
    }

    /// Ranked rows with progress relative to the top total.
    pub fn entries(&self) -> Vec<LeaderboardEntry> {
        let max = self.max_assists();
        self.players
            .iter()
            .enumerate()
            .map(|(i, p)| LeaderboardEntry {
                rank: i + 1,
                player: p.clone(),
                progress_percent: if max == 0 {
                    0.0
                } else {
                    f64::from(p.assists) / f64::from(max) * 100.0
                },
            })
            .collect()
    }
}
