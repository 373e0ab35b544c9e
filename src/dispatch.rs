//! Dispatch engine.
//!
//! `post` performs one synchronous sweep over every registered handler,
//! invoking those whose filter covers the observed state. A fault inside
//! one callback never stops the rest of the sweep.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, error};

use crate::error::InvocationError;
use crate::registry::SubscriberRegistry;
use crate::state::ConnectivityState;

/// Walks the registry on each transition and notifies matching handlers.
///
/// The engine is stateless with respect to connectivity: the "current"
/// state lives in the [`ConnectivityMonitor`](crate::monitor::ConnectivityMonitor).
/// Invocation is synchronous; a slow handler stalls the sweep, which is
/// a caller responsibility, not mitigated here.
#[derive(Debug)]
pub struct DispatchEngine {
    registry: Arc<SubscriberRegistry>,
    faulted_invocations: AtomicU64,
}

impl DispatchEngine {
    /// Create an engine over `registry`.
    #[must_use]
    pub fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self {
            registry,
            faulted_invocations: AtomicU64::new(0),
        }
    }

    /// The registry this engine sweeps.
    #[must_use]
    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// Notify every handler whose filter covers `new_state`.
    ///
    /// The sweep runs over a snapshot of the registry, so concurrent
    /// register/unregister calls neither tear it nor join it midway.
    /// Panics inside a handler are caught, reported, counted, and the
    /// sweep continues; nothing propagates back to the monitor.
    pub fn post(&self, new_state: ConnectivityState) {
        let snapshot = self.registry.snapshot();
        debug!(state = %new_state, subscribers = snapshot.len(), "dispatch sweep");

        for (subscriber, handlers) in snapshot {
            for handler in handlers.iter() {
                if !handler.filter().covers(new_state) {
                    continue;
                }

                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| handler.invoke(new_state)));
                if outcome.is_err() {
                    self.faulted_invocations.fetch_add(1, Ordering::Relaxed);
                    let fault = InvocationError {
                        handler: handler.id().as_uuid(),
                        subscriber: subscriber.label().to_string(),
                        state: new_state,
                    };
                    error!(%fault, "isolated handler fault; sweep continues");
                }
            }
        }
    }

    /// Number of handler invocations that panicked and were isolated.
    #[must_use]
    pub fn faulted_invocations(&self) -> u64 {
        self.faulted_invocations.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use super::*;
    use crate::error::DiscoveryError;
    use crate::subscriber::{HandlerDescriptor, Subscriber};

    struct Recorder {
        filter: ConnectivityState,
        seen: Arc<Mutex<Vec<ConnectivityState>>>,
    }

    impl Subscriber for Recorder {
        fn handlers(&self) -> Result<Vec<HandlerDescriptor>, DiscoveryError> {
            let seen = Arc::clone(&self.seen);
            Ok(vec![HandlerDescriptor::new(self.filter, move |state| {
                seen.lock().unwrap().push(state);
            })?])
        }

        fn label(&self) -> &str {
            "recorder"
        }
    }

    fn engine() -> DispatchEngine {
        DispatchEngine::new(Arc::new(SubscriberRegistry::new()))
    }

    fn recorder(
        filter: ConnectivityState,
    ) -> (Arc<dyn Subscriber>, Arc<Mutex<Vec<ConnectivityState>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sub: Arc<dyn Subscriber> = Arc::new(Recorder {
            filter,
            seen: Arc::clone(&seen),
        });
        (sub, seen)
    }

    #[test]
    fn category_filter_hears_own_category_and_loss() {
        let engine = engine();
        let (sub, seen) = recorder(ConnectivityState::Wifi);
        engine.registry().register(&sub).unwrap();

        engine.post(ConnectivityState::Wifi);
        engine.post(ConnectivityState::CellularWap);
        engine.post(ConnectivityState::None);
        engine.post(ConnectivityState::Wifi);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ConnectivityState::Wifi,
                ConnectivityState::None,
                ConnectivityState::Wifi,
            ]
        );
    }

    #[test]
    fn any_filter_hears_every_transition() {
        let engine = engine();
        let (sub, seen) = recorder(ConnectivityState::Any);
        engine.registry().register(&sub).unwrap();

        let sequence = [
            ConnectivityState::Wifi,
            ConnectivityState::CellularWap,
            ConnectivityState::None,
            ConnectivityState::Wifi,
        ];
        for state in sequence {
            engine.post(state);
        }

        assert_eq!(*seen.lock().unwrap(), sequence.to_vec());
    }

    #[test]
    fn loss_is_a_full_broadcast() {
        let engine = engine();
        let mut logs = Vec::new();
        for filter in [
            ConnectivityState::Any,
            ConnectivityState::Wifi,
            ConnectivityState::CellularWap,
            ConnectivityState::CellularNet,
        ] {
            let (sub, seen) = recorder(filter);
            engine.registry().register(&sub).unwrap();
            logs.push((sub, seen));
        }

        engine.post(ConnectivityState::None);

        for (_, seen) in &logs {
            assert_eq!(*seen.lock().unwrap(), vec![ConnectivityState::None]);
        }
    }

    struct Panicker {
        calls: Arc<AtomicUsize>,
    }

    impl Subscriber for Panicker {
        fn handlers(&self) -> Result<Vec<HandlerDescriptor>, DiscoveryError> {
            let calls = Arc::clone(&self.calls);
            Ok(vec![HandlerDescriptor::any(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                panic!("subscriber bug");
            })])
        }

        fn label(&self) -> &str {
            "panicker"
        }
    }

    #[test]
    fn handler_fault_does_not_abort_sweep() {
        let engine = engine();

        let calls = Arc::new(AtomicUsize::new(0));
        let panicker: Arc<dyn Subscriber> = Arc::new(Panicker {
            calls: Arc::clone(&calls),
        });
        let (quiet, seen) = recorder(ConnectivityState::Any);

        engine.registry().register(&panicker).unwrap();
        engine.registry().register(&quiet).unwrap();

        engine.post(ConnectivityState::Wifi);
        engine.post(ConnectivityState::None);

        // The panicking handler was reached both times, and the healthy
        // handler still saw both transitions.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![ConnectivityState::Wifi, ConnectivityState::None]
        );
        assert_eq!(engine.faulted_invocations(), 2);
    }

    #[test]
    fn post_with_empty_registry_is_a_noop() {
        let engine = engine();
        engine.post(ConnectivityState::Wifi);
        assert_eq!(engine.faulted_invocations(), 0);
    }
}
