//! Built-in player list used when no document store is configured.

use crate::models::Player;

/// Id of the seeded tracked player.
pub const SEED_TRACKED_ID: &str = "braden-smith";

/// The career assists record list plus the tracked chaser.
pub fn seed_players() -> Vec<Player> {
    vec![
        Player::new("1", "Bobby Hurley", "Duke", 1076),
        Player::new("2", "Chris Corchiani", "NC State", 1038),
        Player::new("3", "Ed Cota", "North Carolina", 1030),
        Player::new("4", "Jason Brickman", "Long Island University", 1007),
        Player::new("5", "Keith Jennings", "East Tennessee State", 983),
        Player::new("6", "Steve Blake", "Maryland", 972),
        Player::new("7", "Sherman Douglas", "Syracuse", 960),
        Player::new("8", "Tony Miller", "Marquette", 956),
        Player::new("9", "Aaron Miles", "Kansas", 954),
        Player::new("10", "Greg Anthony", "Nevada-Las Vegas", 950),
        Player::new(SEED_TRACKED_ID, "Braden Smith", "Purdue", 758)
            .tracked()
            .with_image("/purdue-basketball-player.jpg"),
    ]
}
