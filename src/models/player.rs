//! Player record and the fields an admin can write.

use crate::models::error::LeaderboardError;
use serde::{Deserialize, Serialize};

/// Document key of a player in the "players" collection.
pub type PlayerId = String;

/// Image shown when a player document has no `imageUrl`.
pub const PLACEHOLDER_IMAGE: &str = "/basketball-player-portrait.png";

/// A player on the leaderboard.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub school: String,
    pub assists: u32,
    pub image_url: String,
    /// Drives the primary update widget. See `TrackedPolicy` for how it is resolved.
    #[serde(default)]
    pub is_tracked: bool,
}

impl Player {
    /// Create an untracked player with the placeholder image.
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, school: impl Into<String>, assists: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            school: school.into(),
            assists,
            image_url: PLACEHOLDER_IMAGE.to_string(),
            is_tracked: false,
        }
    }

    /// Same player with the tracked flag set.
    pub fn tracked(mut self) -> Self {
        self.is_tracked = true;
        self
    }

    /// Same player with a custom image.
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Apply a signed change to the assist counter. Refused if the total leaves `0..=u32::MAX`.
    pub fn apply_delta(&mut self, delta: i64) -> Result<u32, LeaderboardError> {
        let next = checked_assists(&self.id, self.assists, delta)?;
        self.assists = next;
        Ok(next)
    }
}

/// Assist total after adding `delta` to `current`, or why it cannot be stored.
pub fn checked_assists(id: &str, current: u32, delta: i64) -> Result<u32, LeaderboardError> {
    let next = i64::from(current) + delta;
    if next < 0 {
        return Err(LeaderboardError::NegativeAssists(id.to_string()));
    }
    u32::try_from(next).map_err(|_| LeaderboardError::AssistsOutOfRange(id.to_string()))
}

/// The five fields an admin edit replaces wholesale.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerFields {
    pub name: String,
    pub school: String,
    pub assists: u32,
    pub image_url: String,
    pub is_tracked: bool,
}

impl From<&Player> for PlayerFields {
    fn from(p: &Player) -> Self {
        Self {
            name: p.name.clone(),
            school: p.school.clone(),
            assists: p.assists,
            image_url: p.image_url.clone(),
            is_tracked: p.is_tracked,
        }
    }
}

/// Form for the admin "add player" action. Only name and school are required.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub name: String,
    pub school: String,
    #[serde(default)]
    pub assists: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_tracked: Option<bool>,
}

impl NewPlayer {
    pub fn new(name: impl Into<String>, school: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            school: school.into(),
            ..Self::default()
        }
    }

    /// Fill in defaults for the optional fields.
    pub fn into_fields(self) -> PlayerFields {
        let image_url = self
            .image_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());
        PlayerFields {
            name: self.name.trim().to_string(),
            school: self.school.trim().to_string(),
            assists: self.assists.unwrap_or(0),
            image_url,
            is_tracked: self.is_tracked.unwrap_or(false),
        }
    }
}
