//! Subscriber contract and handler descriptors.
//!
//! Interests are declared explicitly: a subscriber hands the registry a
//! table of [`HandlerDescriptor`]s from [`Subscriber::handlers`]. Arity
//! and return-type mistakes are compile errors; the one validation left
//! to run time is the filter value itself, enforced when a descriptor is
//! built.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DiscoveryError;
use crate::state::ConnectivityState;

/// Unique identifier for a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerId(Uuid);

impl HandlerId {
    /// Create a new random handler id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for HandlerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The callback stored in a handler descriptor.
///
/// Invoked with the actual observed state of the transition, which is
/// not necessarily equal to the declared filter (a `Wifi`-filtered
/// handler also receives `None`).
pub type HandlerFn = Box<dyn Fn(ConnectivityState) + Send + Sync>;

/// One declared interest: a filter plus the callback to invoke when a
/// transition matches it. Immutable once created; destroyed when the
/// owning subscriber unregisters.
pub struct HandlerDescriptor {
    id: HandlerId,
    filter: ConnectivityState,
    invoke: HandlerFn,
}

impl HandlerDescriptor {
    /// Build a descriptor for `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::UndeclarableFilter`] when `filter` is
    /// `ConnectivityState::None`: loss of connectivity is broadcast to
    /// every handler and is not an interest of its own.
    pub fn new(
        filter: ConnectivityState,
        invoke: impl Fn(ConnectivityState) + Send + Sync + 'static,
    ) -> Result<Self, DiscoveryError> {
        if filter == ConnectivityState::None {
            return Err(DiscoveryError::UndeclarableFilter);
        }
        Ok(Self {
            id: HandlerId::new(),
            filter,
            invoke: Box::new(invoke),
        })
    }

    /// Build a descriptor that hears every transition.
    pub fn any(invoke: impl Fn(ConnectivityState) + Send + Sync + 'static) -> Self {
        Self {
            id: HandlerId::new(),
            filter: ConnectivityState::Any,
            invoke: Box::new(invoke),
        }
    }

    /// The handler's id.
    #[must_use]
    pub const fn id(&self) -> HandlerId {
        self.id
    }

    /// The declared filter.
    #[must_use]
    pub const fn filter(&self) -> ConnectivityState {
        self.filter
    }

    /// Invoke the callback with the observed state.
    pub fn invoke(&self, observed: ConnectivityState) {
        (self.invoke)(observed);
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("id", &self.id)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

/// A party interested in connectivity transitions.
///
/// Implementations are registered with the
/// [`SubscriberRegistry`](crate::registry::SubscriberRegistry) as
/// `Arc<dyn Subscriber>`; identity is the `Arc`'s allocation, so
/// registering a clone of an already-registered `Arc` is a no-op.
///
/// # Examples
///
/// ```
/// use connwatch::{ConnectivityState, HandlerDescriptor, Subscriber};
/// use connwatch::error::DiscoveryError;
///
/// struct StatusBar;
///
/// impl Subscriber for StatusBar {
///     fn handlers(&self) -> Result<Vec<HandlerDescriptor>, DiscoveryError> {
///         Ok(vec![HandlerDescriptor::new(
///             ConnectivityState::Wifi,
///             |state| println!("wifi status now {state}"),
///         )?])
///     }
///
///     fn label(&self) -> &str {
///         "status-bar"
///     }
/// }
/// ```
pub trait Subscriber: Send + Sync {
    /// Enumerate this subscriber's declared interests.
    ///
    /// This is the discovery contract consumed by `register`: a pure
    /// query that must not mutate the subscriber, may return an empty
    /// list, and fails hard (no retry) on a malformed declaration.
    ///
    /// # Errors
    ///
    /// Any [`DiscoveryError`] aborts registration and leaves the
    /// registry unchanged for this subscriber.
    fn handlers(&self) -> Result<Vec<HandlerDescriptor>, DiscoveryError>;

    /// Short name used in log events and fault reports.
    fn label(&self) -> &str {
        "subscriber"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn descriptor_rejects_none_filter() {
        let err = HandlerDescriptor::new(ConnectivityState::None, |_| {}).unwrap_err();
        assert_eq!(err, DiscoveryError::UndeclarableFilter);
    }

    #[test]
    fn descriptor_invokes_with_observed_state() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in = Arc::clone(&seen);
        let desc = HandlerDescriptor::new(ConnectivityState::Wifi, move |state| {
            assert_eq!(state, ConnectivityState::None);
            seen_in.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        // The filter controls whether to call; the call itself carries
        // the engine's actual observed state.
        assert_eq!(desc.filter(), ConnectivityState::Wifi);
        desc.invoke(ConnectivityState::None);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn any_constructor_is_total() {
        let desc = HandlerDescriptor::any(|_| {});
        assert_eq!(desc.filter(), ConnectivityState::Any);
    }

    #[test]
    fn handler_ids_are_unique() {
        let a = HandlerDescriptor::any(|_| {});
        let b = HandlerDescriptor::any(|_| {});
        assert_ne!(a.id(), b.id());
    }
}
