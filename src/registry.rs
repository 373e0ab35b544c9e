//! Subscriber registry.
//!
//! Maps subscriber identity to the handler table produced by discovery.
//! The map is guarded by an `RwLock`; dispatch reads a snapshot so that
//! register/unregister calls arriving from other threads never tear an
//! in-flight sweep.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{WatchError, WatchResult};
use crate::subscriber::{HandlerDescriptor, Subscriber};

fn lock_err(context: &'static str) -> WatchError {
    WatchError::internal(format!("poisoned lock: {context}"))
}

/// Identity of a registered subscriber.
///
/// Two `Arc`s compare equal here exactly when they share an allocation,
/// so a clone of an already-registered handle addresses the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SubscriberKey(usize);

impl SubscriberKey {
    fn of(subscriber: &Arc<dyn Subscriber>) -> Self {
        Self(Arc::as_ptr(subscriber).cast::<()>() as usize)
    }
}

struct RegistryEntry {
    subscriber: Arc<dyn Subscriber>,
    handlers: Arc<[HandlerDescriptor]>,
}

/// The set of active subscribers and their handler tables.
///
/// Process-wide lifetime: `unregister_all` empties the registry but the
/// instance stays valid and accepts new registrations afterwards.
#[derive(Default)]
pub struct SubscriberRegistry {
    entries: RwLock<HashMap<SubscriberKey, RegistryEntry>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber, running discovery for its handler table.
    ///
    /// Returns `Ok(true)` when the subscriber was inserted and
    /// `Ok(false)` when it already had an entry — re-registration is a
    /// no-op, it neither re-runs discovery nor merges tables. Callers
    /// must unregister first to force re-discovery. A subscriber
    /// declaring no handlers is still inserted with an empty table.
    ///
    /// # Errors
    ///
    /// Propagates the subscriber's [`DiscoveryError`](crate::error::DiscoveryError),
    /// leaving the registry as if this call had never been made.
    pub fn register(&self, subscriber: &Arc<dyn Subscriber>) -> WatchResult<bool> {
        let key = SubscriberKey::of(subscriber);

        {
            let entries = self.entries.read().map_err(|_| lock_err("registry"))?;
            if entries.contains_key(&key) {
                debug!(subscriber = subscriber.label(), "already registered; no-op");
                return Ok(false);
            }
        }

        // Discovery is subscriber code; run it without holding the lock.
        let handlers: Arc<[HandlerDescriptor]> = subscriber.handlers()?.into();

        let mut entries = self.entries.write().map_err(|_| lock_err("registry"))?;
        if entries.contains_key(&key) {
            // Lost a race against a concurrent register of the same
            // subscriber; the first insertion wins.
            return Ok(false);
        }

        debug!(
            subscriber = subscriber.label(),
            handlers = handlers.len(),
            "registered"
        );
        entries.insert(
            key,
            RegistryEntry {
                subscriber: Arc::clone(subscriber),
                handlers,
            },
        );
        Ok(true)
    }

    /// Remove a subscriber's entry, dropping its handler table.
    ///
    /// Idempotent: returns `false` (not an error) when the subscriber
    /// has no entry.
    pub fn unregister(&self, subscriber: &Arc<dyn Subscriber>) -> bool {
        let key = SubscriberKey::of(subscriber);
        let removed = self
            .entries
            .write()
            .map(|mut entries| entries.remove(&key).is_some())
            .unwrap_or(false);
        if removed {
            debug!(subscriber = subscriber.label(), "unregistered");
        }
        removed
    }

    /// Remove every subscriber. The registry remains usable.
    pub fn unregister_all(&self) {
        if let Ok(mut entries) = self.entries.write() {
            let count = entries.len();
            entries.clear();
            debug!(count, "unregistered all subscribers");
        }
    }

    /// Consistent snapshot of `(subscriber, handler table)` pairs for
    /// one dispatch sweep. Iteration order across subscribers is
    /// unspecified.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(Arc<dyn Subscriber>, Arc<[HandlerDescriptor]>)> {
        self.entries
            .read()
            .map(|entries| {
                entries
                    .values()
                    .map(|e| (Arc::clone(&e.subscriber), Arc::clone(&e.handlers)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// True when no subscriber is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this subscriber currently has an entry.
    #[must_use]
    pub fn contains(&self, subscriber: &Arc<dyn Subscriber>) -> bool {
        let key = SubscriberKey::of(subscriber);
        self.entries
            .read()
            .map(|entries| entries.contains_key(&key))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("subscribers", &self.len())
            .finish()
    }
}
