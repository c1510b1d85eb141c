//! The table of projection definitions, keyed by SRID.
//!
//! A [`ProjectionRegistry`] is long-lived application state: create it once, share it through
//! an [`Arc`], and hand that handle to every [`LiteralConverter`][crate::LiteralConverter].
//! It starts out seeded with a fixed set of common definitions and only ever grows, either
//! through [`register`][ProjectionRegistry::register] or when
//! [`ensure_registered`][ProjectionRegistry::ensure_registered] resolves an unknown SRID from
//! its [`DefinitionSource`].

mod builtin;
mod source;

#[cfg(feature = "http")]
pub use source::HttpDefinitionSource;
pub use source::{DefinitionSource, OfflineSource, DEFAULT_REGISTRY_URL};

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::future::{BoxFuture, FutureExt, WeakShared};
use tracing::{debug, warn};

use crate::crs::Srid;
use builtin::BUILTIN_DEFINITIONS;

type Fetch = BoxFuture<'static, ()>;

/// An outstanding fetch. Only waiters keep it alive, so a fetch whose waiters all went away
/// is dropped instead of lingering half-polled in the table.
struct PendingFetch {
    id: u64,
    fetch: WeakShared<Fetch>,
}

/// Projection definitions by SRID, with lazy single-flight resolution of unknown codes.
pub struct ProjectionRegistry {
    definitions: RwLock<HashMap<Srid, String>>,
    pending: Mutex<HashMap<Srid, PendingFetch>>,
    next_fetch_id: AtomicU64,
    source: Arc<dyn DefinitionSource>,
}

impl ProjectionRegistry {
    /// Create a registry seeded with the built-in definitions, resolving misses through
    /// `source`.
    pub fn new(source: Arc<dyn DefinitionSource>) -> Self {
        let definitions = BUILTIN_DEFINITIONS
            .entries()
            .map(|(code, definition)| (Srid(*code), definition.to_string()))
            .collect();
        Self {
            definitions: RwLock::new(definitions),
            pending: Mutex::new(HashMap::new()),
            next_fetch_id: AtomicU64::new(0),
            source,
        }
    }

    /// Create a seeded registry that never resolves unknown SRIDs.
    pub fn offline() -> Self {
        Self::new(Arc::new(OfflineSource))
    }

    pub fn has(&self, srid: Srid) -> bool {
        self.read().contains_key(&srid)
    }

    pub fn get(&self, srid: Srid) -> Option<String> {
        self.read().get(&srid).cloned()
    }

    /// Insert or overwrite the definition for `srid`.
    ///
    /// The definition is stored as an opaque string; a malformed one only shows up later, when
    /// reprojection fails to parse it.
    pub fn register(&self, srid: Srid, definition: impl Into<String>) {
        self.write().insert(srid, definition.into());
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All registered SRIDs, sorted.
    pub fn srids(&self) -> Vec<Srid> {
        let mut srids: Vec<Srid> = self.read().keys().copied().collect();
        srids.sort_unstable();
        srids
    }

    /// Make sure `srid` has a definition, fetching it from the source if needed.
    ///
    /// Returns immediately without I/O when the SRID is already known. Concurrent calls for
    /// the same SRID share a single outstanding fetch. A failed fetch is logged and leaves the
    /// registry untouched, so callers must check [`has`][Self::has] afterwards. Failures are not
    /// remembered: the next call fetches again.
    pub async fn ensure_registered(self: &Arc<Self>, srid: Srid) {
        if self.has(srid) {
            return;
        }

        let fetch = {
            let mut pending = self.pending();
            // a fetch may have settled since the check above
            if self.has(srid) {
                return;
            }
            match pending.get(&srid).and_then(|entry| entry.fetch.upgrade()) {
                Some(fetch) => fetch,
                None => {
                    let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                    let fetch = Arc::clone(self).resolve(srid, id).boxed().shared();
                    if let Some(weak) = fetch.downgrade() {
                        pending.insert(srid, PendingFetch { id, fetch: weak });
                    }
                    fetch
                }
            }
        };
        fetch.await;
    }

    fn resolve(self: Arc<Self>, srid: Srid, id: u64) -> impl Future<Output = ()> + Send + 'static {
        // created outside the future so an unpolled fetch still clears its entry
        let entry = PendingEntry {
            registry: Arc::clone(&self),
            srid,
            id,
        };
        async move {
            let _entry = entry;
            match self.source.fetch(srid).await {
                Ok(definition) => {
                    let definition = definition.trim();
                    debug!("Registered {srid} with definition {definition}");
                    self.register(srid, definition);
                }
                Err(err) => warn!("Failed to fetch projection definition for {srid}: {err}"),
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Srid, String>> {
        self.definitions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Srid, String>> {
        self.definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<Srid, PendingFetch>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes the pending entry of one fetch when that fetch settles or is dropped unfinished.
struct PendingEntry {
    registry: Arc<ProjectionRegistry>,
    srid: Srid,
    id: u64,
}

impl Drop for PendingEntry {
    fn drop(&mut self) {
        let mut pending = self.registry.pending();
        if pending
            .get(&self.srid)
            .is_some_and(|entry| entry.id == self.id)
        {
            pending.remove(&self.srid);
        }
    }
}

impl fmt::Debug for ProjectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionRegistry")
            .field("srids", &self.srids())
            .finish_non_exhaustive()
    }
}
