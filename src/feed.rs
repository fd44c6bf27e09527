//! Change Feed
//!
//! Explicit subscription abstraction replacing the original snapshot-listener
//! callbacks. Mutating paths publish a [`ChangeEvent`] after every successful
//! store write; view-layer consumers subscribe and re-fetch the whole
//! collection snapshot on any event for their collection.
//!
//! Events for different collections fire independently; subscribers must not
//! assume any cross-collection ordering, and must tolerate re-entrant
//! refreshes.

use dashmap::DashMap;
use tokio::sync::broadcast;

/// Buffered events per subscriber before lag kicks in
const FEED_CAPACITY: usize = 256;

/// Kind of mutation behind a change event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeAction::Created => write!(f, "created"),
            ChangeAction::Updated => write!(f, "updated"),
            ChangeAction::Deleted => write!(f, "deleted"),
        }
    }
}

/// One collection change, as delivered to subscribers
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Collection name ("brands", "products", "flavours", …)
    pub collection: String,
    pub action: ChangeAction,
    /// Record id (string form), or "batch" for bulk mutations
    pub id: String,
    /// Monotonically increasing per-collection version
    pub version: u64,
    /// Serialized record for created/updated events
    pub data: Option<serde_json::Value>,
}

/// Per-collection version counters.
///
/// Lock-free via DashMap; each collection's counter increments atomically so
/// subscribers can order events within one collection.
#[derive(Debug, Default)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// Increment and return the new version for a collection
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Current version, 0 when never bumped
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

/// Broadcast bus carrying [`ChangeEvent`]s to any number of subscribers
#[derive(Debug)]
pub struct ChangeBus {
    tx: broadcast::Sender<ChangeEvent>,
    versions: ResourceVersions,
}

impl ChangeBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            tx,
            versions: ResourceVersions::new(),
        }
    }

    /// Subscribe to all collection changes. Slow consumers observe
    /// `RecvError::Lagged` and should refresh their snapshot.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Publish a change; dropped silently when no subscriber is listening
    pub fn publish<T: serde::Serialize>(
        &self,
        collection: &str,
        action: ChangeAction,
        id: &str,
        data: Option<&T>,
    ) {
        let version = self.versions.increment(collection);
        let event = ChangeEvent {
            collection: collection.to_string(),
            action,
            id: id.to_string(),
            version,
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        let _ = self.tx.send(event);
    }

    pub fn versions(&self) -> &ResourceVersions {
        &self.versions
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}
