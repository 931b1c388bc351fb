//! Connection registry
//!
//! Two-level routing table from key to client channel handle, using DashMap
//! for thread-safe access. The outer level is keyed by the route's outer
//! component; an outer bucket is pruned as soon as its last inner entry is
//! removed. Single-level keys use a unit inner component and go through the
//! same code path.

use crate::session::ClientHandle;
use relay_core::Route;
use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

/// Routing table from key to client channel
///
/// Entries reference sessions, they never own them: a session removes its
/// own entry on disconnect via [`Registry::release`].
pub struct Registry<R: Route> {
    routes: DashMap<R::Outer, HashMap<R::Inner, Arc<ClientHandle>>>,
}

impl<R: Route> Registry<R> {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: DashMap::new(),
        }
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Insert or overwrite the entry for `route`.
    ///
    /// Returns the handle that was replaced, if any. The replaced channel is
    /// no longer reachable via routing but is not itself closed.
    pub fn register(&self, route: &R, handle: Arc<ClientHandle>) -> Option<Arc<ClientHandle>> {
        let replaced = self
            .routes
            .entry(route.outer())
            .or_default()
            .insert(route.inner(), handle);

        if let Some(old) = &replaced {
            tracing::warn!(
                route = ?route,
                replaced_session = %old.session_id(),
                "replacing registered route"
            );
        } else {
            tracing::debug!(route = ?route, "route registered");
        }

        replaced
    }

    /// Look up the client channel for `route`.
    ///
    /// Returns `None` if either key level is missing.
    pub fn lookup(&self, route: &R) -> Option<Arc<ClientHandle>> {
        self.routes
            .get(&route.outer())
            .and_then(|bucket| bucket.get(&route.inner()).cloned())
    }

    /// Remove the entry for `route`, if present.
    ///
    /// No-op for absent keys. Prunes the outer bucket once it is empty.
    pub fn unregister(&self, route: &R) {
        self.routes.alter(&route.outer(), |_, mut bucket| {
            bucket.remove(&route.inner());
            bucket
        });
        self.routes.retain(|_, bucket| !bucket.is_empty());

        tracing::debug!(route = ?route, "route unregistered");
    }

    /// Remove the entry for `route` only if it still belongs to
    /// `session_id`.
    ///
    /// A disconnecting session that was overwritten by a later connect must
    /// not evict the new owner's entry.
    pub fn release(&self, route: &R, session_id: &str) {
        self.routes.alter(&route.outer(), |_, mut bucket| {
            if bucket
                .get(&route.inner())
                .is_some_and(|handle| handle.session_id() == session_id)
            {
                bucket.remove(&route.inner());
                tracing::debug!(route = ?route, session_id = %session_id, "route released");
            }
            bucket
        });
        self.routes.retain(|_, bucket| !bucket.is_empty());
    }

    /// Check if an entry exists for `route`
    pub fn contains(&self, route: &R) -> bool {
        self.lookup(route).is_some()
    }

    /// Total number of registered routes
    pub fn len(&self) -> usize {
        self.routes.iter().map(|bucket| bucket.value().len()).sum()
    }

    /// Check if the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of outer buckets currently held
    pub fn outer_count(&self) -> usize {
        self.routes.len()
    }
}

impl<R: Route> Default for Registry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Route> std::fmt::Debug for Registry<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("routes", &self.len())
            .finish()
    }
}
