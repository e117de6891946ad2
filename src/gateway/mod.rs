//! Remote collection gateway: the document store behind the "players" collection.
//!
//! The leaderboard only needs a handful of primitives: a live query that pushes full
//! snapshots, create-or-replace, partial update (with atomic increment and server
//! timestamp), and delete. Any real-time document database can sit behind
//! [`PlayerGateway`]; [`MemoryGateway`] keeps everything in process.

mod memory;

pub use memory::MemoryGateway;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Name of the collection holding player documents.
pub const PLAYERS_COLLECTION: &str = "players";

/// Raw document fields as stored.
pub type DocumentData = Map<String, Value>;

/// A stored document: key plus loosely-typed fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: DocumentData,
}

impl Document {
    pub fn new(id: impl Into<String>, data: DocumentData) -> Self {
        Self { id: id.into(), data }
    }
}

/// Query shape used by the leaderboard: the whole collection ordered by one field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderedQuery {
    pub collection: String,
    pub order_by: String,
    pub descending: bool,
}

impl OrderedQuery {
    /// All players ordered by assists, highest first.
    pub fn players_by_assists() -> Self {
        Self {
            collection: PLAYERS_COLLECTION.to_string(),
            order_by: "assists".to_string(),
            descending: true,
        }
    }
}

/// One change to a single field in a partial update.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldOp {
    Set(Value),
    /// Atomic add; negative values subtract.
    Increment(i64),
    /// Stamped by the store at write time.
    ServerTimestamp,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldUpdate {
    pub field: String,
    pub op: FieldOp,
}

impl FieldUpdate {
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FieldOp::Set(value.into()),
        }
    }

    pub fn increment(field: impl Into<String>, delta: i64) -> Self {
        Self {
            field: field.into(),
            op: FieldOp::Increment(delta),
        }
    }

    pub fn server_timestamp(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: FieldOp::ServerTimestamp,
        }
    }
}

/// Errors reported by the document store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GatewayError {
    /// Partial update or delete on a document that does not exist.
    NotFound(String),
    /// Store unreachable or refused the request.
    Unavailable(String),
    /// Operation not valid for the stored value (e.g. increment on a string).
    InvalidArgument(String),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::NotFound(id) => write!(f, "No document with id {}", id),
            GatewayError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
            GatewayError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

/// What a live query delivers: a full ordered snapshot, or a terminal error.
#[derive(Clone, Debug, PartialEq)]
pub enum SnapshotEvent {
    Snapshot(Vec<Document>),
    Error(GatewayError),
}

/// Releases a live query when dropped or explicitly cancelled.
pub struct SubscriptionHandle {
    cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl SubscriptionHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// Stop delivery. Calling more than once is harmless.
    pub fn unsubscribe(&self) {
        let cancel = match self.cancel.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(cancel) = cancel {
            cancel();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle").finish_non_exhaustive()
    }
}

/// An active live query: the event stream and the handle that ends it.
pub struct Subscription {
    pub events: mpsc::UnboundedReceiver<SnapshotEvent>,
    pub handle: SubscriptionHandle,
}

/// Document store client for the players collection.
#[async_trait]
pub trait PlayerGateway: Send + Sync {
    /// Start a live query. The current snapshot is delivered first, then one per change.
    fn subscribe(&self, query: OrderedQuery) -> Result<Subscription, GatewayError>;

    /// Create the document or replace it entirely.
    async fn set_document(&self, id: &str, data: DocumentData) -> Result<(), GatewayError>;

    /// Apply field operations to an existing document.
    async fn update_document(&self, id: &str, updates: Vec<FieldUpdate>) -> Result<(), GatewayError>;

    async fn delete_document(&self, id: &str) -> Result<(), GatewayError>;

    /// Atomic add on a single numeric field.
    async fn increment(&self, id: &str, field: &str, delta: i64) -> Result<(), GatewayError> {
        self.update_document(id, vec![FieldUpdate::increment(field, delta)])
            .await
    }
}
