//! In-process document store with live queries.
//!
//! Every successful write pushes a fresh ordered snapshot to all listeners before the
//! write resolves, so callers observe the same echo-through-subscription flow a hosted
//! real-time database gives.

use super::{
    Document, DocumentData, FieldOp, FieldUpdate, GatewayError, OrderedQuery, PlayerGateway,
    SnapshotEvent, Subscription, SubscriptionHandle, PLAYERS_COLLECTION,
};
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::mpsc;

struct Listener {
    query: OrderedQuery,
    tx: mpsc::UnboundedSender<SnapshotEvent>,
}

#[derive(Default)]
struct StoreState {
    docs: BTreeMap<String, DocumentData>,
    listeners: HashMap<u64, Listener>,
    next_listener: u64,
}

#[derive(Default)]
struct Inner {
    state: Mutex<StoreState>,
    fail_writes: AtomicBool,
    write_attempts: AtomicUsize,
}

impl Inner {
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, GatewayError> {
        self.state
            .lock()
            .map_err(|_| GatewayError::Unavailable("store lock poisoned".to_string()))
    }
}

/// Document store held in memory. Cheap to clone; clones share the same documents.
#[derive(Clone, Default)]
pub struct MemoryGateway {
    inner: Arc<Inner>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given documents.
    pub fn with_documents(docs: impl IntoIterator<Item = Document>) -> Self {
        let gateway = Self::new();
        if let Ok(mut state) = gateway.inner.lock() {
            for doc in docs {
                state.docs.insert(doc.id, doc.data);
            }
        }
        gateway
    }

    /// Make every subsequent write fail with `Unavailable` (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, AtomicOrdering::SeqCst);
    }

    /// Break every live query: listeners receive an error and are dropped.
    pub fn fail_subscriptions(&self, message: &str) {
        let Ok(mut state) = self.inner.lock() else {
            return;
        };
        for (_, listener) in state.listeners.drain() {
            let _ = listener
                .tx
                .send(SnapshotEvent::Error(GatewayError::Unavailable(message.to_string())));
        }
    }

    /// Number of write calls received, successful or not.
    pub fn write_attempts(&self) -> usize {
        self.inner.write_attempts.load(AtomicOrdering::SeqCst)
    }

    /// Live queries currently registered.
    pub fn listener_count(&self) -> usize {
        self.inner.lock().map(|s| s.listeners.len()).unwrap_or(0)
    }

    /// Current contents of one document.
    pub fn document(&self, id: &str) -> Option<DocumentData> {
        self.inner.lock().ok()?.docs.get(id).cloned()
    }

    fn begin_write(&self) -> Result<(), GatewayError> {
        self.inner.write_attempts.fetch_add(1, AtomicOrdering::SeqCst);
        if self.inner.fail_writes.load(AtomicOrdering::SeqCst) {
            return Err(GatewayError::Unavailable("writes are failing".to_string()));
        }
        Ok(())
    }
}

fn compare_field(a: &DocumentData, b: &DocumentData, field: &str) -> Ordering {
    let key = |d: &DocumentData| d.get(field).and_then(Value::as_f64);
    match (key(a), key(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn run_query(docs: &BTreeMap<String, DocumentData>, query: &OrderedQuery) -> Vec<Document> {
    if query.collection != PLAYERS_COLLECTION {
        return Vec::new();
    }
    let mut out: Vec<Document> = docs
        .iter()
        .map(|(id, data)| Document::new(id.clone(), data.clone()))
        .collect();
    // Ties fall back to document id (BTreeMap order), which the stable sort keeps.
    out.sort_by(|a, b| {
        let ord = compare_field(&a.data, &b.data, &query.order_by);
        if query.descending {
            ord.reverse()
        } else {
            ord
        }
    });
    out
}

fn broadcast(state: &mut StoreState) {
    let docs = &state.docs;
    state.listeners.retain(|_, listener| {
        let snapshot = run_query(docs, &listener.query);
        listener.tx.send(SnapshotEvent::Snapshot(snapshot)).is_ok()
    });
}

/// A missing or null field counts as zero for an increment; any other non-number is refused.
fn apply_update(data: &mut DocumentData, update: FieldUpdate) -> Result<(), GatewayError> {
    let value = match update.op {
        FieldOp::Set(value) => value,
        FieldOp::Increment(delta) => match data.get(&update.field) {
            None | Some(Value::Null) => Value::from(delta),
            Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => i.checked_add(delta).map(Value::from).ok_or_else(|| {
                    GatewayError::InvalidArgument(format!("{} would overflow", update.field))
                })?,
                (None, Some(f)) => Value::from(f + delta as f64),
                (None, None) => {
                    return Err(GatewayError::InvalidArgument(format!(
                        "{} is not a number",
                        update.field
                    )))
                }
            },
            Some(other) => {
                return Err(GatewayError::InvalidArgument(format!(
                    "cannot increment {} holding {}",
                    update.field, other
                )))
            }
        },
        FieldOp::ServerTimestamp => Value::from(chrono::Utc::now().to_rfc3339()),
    };
    data.insert(update.field, value);
    Ok(())
}

#[async_trait]
impl PlayerGateway for MemoryGateway {
    fn subscribe(&self, query: OrderedQuery) -> Result<Subscription, GatewayError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.inner.lock()?;
        let initial = run_query(&state.docs, &query);
        let _ = tx.send(SnapshotEvent::Snapshot(initial));
        let id = state.next_listener;
        state.next_listener += 1;
        state.listeners.insert(id, Listener { query, tx });
        log::debug!("Listener {} registered ({} active)", id, state.listeners.len());

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let handle = SubscriptionHandle::new(move || {
            if let Some(inner) = weak.upgrade() {
                if let Ok(mut state) = inner.lock() {
                    state.listeners.remove(&id);
                    log::debug!("Listener {} released", id);
                }
            }
        });
        Ok(Subscription { events: rx, handle })
    }

    async fn set_document(&self, id: &str, data: DocumentData) -> Result<(), GatewayError> {
        self.begin_write()?;
        let mut state = self.inner.lock()?;
        state.docs.insert(id.to_string(), data);
        broadcast(&mut state);
        Ok(())
    }

    async fn update_document(&self, id: &str, updates: Vec<FieldUpdate>) -> Result<(), GatewayError> {
        self.begin_write()?;
        let mut state = self.inner.lock()?;
        let mut data = state
            .docs
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;
        // All operations land or none do.
        for update in updates {
            apply_update(&mut data, update)?;
        }
        state.docs.insert(id.to_string(), data);
        broadcast(&mut state);
        Ok(())
    }

    async fn delete_document(&self, id: &str) -> Result<(), GatewayError> {
        self.begin_write()?;
        let mut state = self.inner.lock()?;
        if state.docs.remove(id).is_none() {
            return Err(GatewayError::NotFound(id.to_string()));
        }
        broadcast(&mut state);
        Ok(())
    }
}
