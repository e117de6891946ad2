//! Career assists leaderboard: library with models, document gateway and sync logic.

pub mod config;
pub mod gateway;
pub mod logic;
pub mod models;

pub use config::AppConfig;
pub use gateway::{
    Document, DocumentData, FieldOp, FieldUpdate, GatewayError, MemoryGateway, OrderedQuery,
    PlayerGateway, SnapshotEvent, Subscription, SubscriptionHandle,
};
pub use logic::{
    derive_player_id, seed_players, AdminController, AdminSession, AssistTracker,
    CredentialVerifier, MemorySession, PlayerStore, SessionFlagStore, SharedSecretVerifier,
    SyncEngine, SyncMode, TrackedPolicy, TrackerStatus, WriteOutcome,
};
pub use models::{
    LastChange, Leaderboard, LeaderboardEntry, LeaderboardError, NewPlayer, Player, PlayerFields,
    PlayerId, PLACEHOLDER_IMAGE,
};
