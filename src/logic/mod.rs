//! Leaderboard logic: snapshot decoding, sync, tracker and admin controllers.

mod admin;
mod auth;
mod decode;
mod player_id;
mod seed;
mod store;
mod sync;
mod tracker;

pub use admin::{AdminController, WriteOutcome};
pub use auth::{
    AdminSession, CredentialVerifier, MemorySession, SessionFlagStore, SharedSecretVerifier,
    ADMIN_SESSION_KEY,
};
pub use decode::{decode_player, decode_snapshot, encode_fields, DecodeError, TrackedPolicy};
pub use player_id::derive_player_id;
pub use seed::{seed_players, SEED_TRACKED_ID};
pub use store::{LocalStore, PlayerStore, RemoteStore, SyncMode};
pub use sync::SyncEngine;
pub use tracker::{AssistTracker, TrackerStatus};
