//! Pending-request bookkeeping: at most one live fetch per property.
//!
//! Each selector owns exactly one `PendingRequests`. Entries are shared
//! futures; every caller that arrives while an entry is live awaits the
//! same underlying fetch. Removal is guarded by an entry id so a forced
//! refresh that superseded an entry can never be clobbered by the
//! superseded fetch's cleanup.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use futures::future::{BoxFuture, Shared};
use tokio::sync::watch;

use statesync_core::StateValue;

use crate::error::Result;

/// The shareable outcome of one in-flight fetch: the full state after the
/// property was populated, or the fetch's error.
pub(crate) type SharedRequest = Shared<BoxFuture<'static, Result<StateValue>>>;

/// Outcome of claiming a property slot.
pub(crate) enum Claimed {
    /// An equivalent fetch is already in flight; await it.
    Coalesced(SharedRequest),
    /// A new fetch was registered under `id`; the caller must start it and
    /// eventually call [`PendingRequests::complete`] with the same id.
    Started { id: u64, request: SharedRequest },
}

pub(crate) struct PendingRequests {
    entries: Mutex<HashMap<String, PendingEntry>>,
    /// Names with a live entry, broadcast for the syncing signals.
    names: watch::Sender<BTreeSet<String>>,
    next_id: AtomicU64,
}

struct PendingEntry {
    id: u64,
    request: SharedRequest,
}

impl PendingRequests {
    pub fn new() -> Self {
        let (names, _) = watch::channel(BTreeSet::new());
        Self {
            entries: Mutex::new(HashMap::new()),
            names,
            next_id: AtomicU64::new(0),
        }
    }

    /// Coalesce onto an existing entry, or insert the request built by
    /// `build` under a fresh id. Check and insert happen under one lock
    /// acquisition; `force` skips the coalescing check and replaces any
    /// existing entry.
    pub fn claim(
        &self,
        property: &str,
        force: bool,
        build: impl FnOnce() -> SharedRequest,
    ) -> Claimed {
        let mut entries = self.entries.lock().unwrap();

        if !force {
            if let Some(entry) = entries.get(property) {
                return Claimed::Coalesced(entry.request.clone());
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = build();
        entries.insert(
            property.to_string(),
            PendingEntry {
                id,
                request: request.clone(),
            },
        );
        drop(entries);

        self.names.send_modify(|names| {
            names.insert(property.to_string());
        });
        Claimed::Started { id, request }
    }

    /// Remove the entry registered under `id`. A no-op when the slot was
    /// superseded by a forced refresh in the meantime.
    pub fn complete(&self, property: &str, id: u64) {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(property) {
            Some(entry) if entry.id == id => {
                entries.remove(property);
            }
            _ => return,
        }
        drop(entries);

        self.names.send_modify(|names| {
            names.remove(property);
        });
    }

    pub fn is_pending(&self, property: &str) -> bool {
        self.entries.lock().unwrap().contains_key(property)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Subscribe to the set of currently pending property names.
    pub fn subscribe(&self) -> watch::Receiver<BTreeSet<String>> {
        self.names.subscribe()
    }
}
