//! Connectivity manager facade and process-wide handle.
//!
//! The manager wires the registry, engine, monitor, and platform probe
//! together and is constructed explicitly during bootstrap. One
//! connectivity feed serves the whole process, so a `OnceLock` handle is
//! provided for callers without an injected manager; it is installed
//! once by [`init`] and never lazily created.

use std::sync::{Arc, OnceLock};

use tracing::info;

use crate::dispatch::DispatchEngine;
use crate::error::{ConfigurationError, WatchResult};
use crate::monitor::{
    current_connectivity, is_network_available, ConnectivityMonitor, MonitorConfig, NetworkProbe,
};
use crate::registry::SubscriberRegistry;
use crate::state::{ConnectivityState, Transition};
use crate::subscriber::Subscriber;

static GLOBAL: OnceLock<Arc<ConnectivityManager>> = OnceLock::new();

/// Owner of the subscriber registry, dispatch engine, monitor, and
/// platform probe.
///
/// Constructed explicitly (dependency injection) rather than created
/// lazily behind the global handle; [`init`] only publishes an existing
/// instance.
pub struct ConnectivityManager {
    registry: Arc<SubscriberRegistry>,
    engine: Arc<DispatchEngine>,
    monitor: ConnectivityMonitor,
    probe: Arc<dyn NetworkProbe>,
}

impl std::fmt::Debug for ConnectivityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityManager")
            .field("registry", &self.registry)
            .field("monitor", &self.monitor)
            .finish_non_exhaustive()
    }
}

impl ConnectivityManager {
    /// Wire a manager over `probe` with the given monitor configuration.
    #[must_use]
    pub fn new(probe: Arc<dyn NetworkProbe>, cfg: MonitorConfig) -> Arc<Self> {
        let registry = Arc::new(SubscriberRegistry::new());
        let engine = Arc::new(DispatchEngine::new(Arc::clone(&registry)));
        let monitor = ConnectivityMonitor::new(cfg, Arc::clone(&engine));
        Arc::new(Self {
            registry,
            engine,
            monitor,
            probe,
        })
    }

    /// The subscriber registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// The dispatch engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<DispatchEngine> {
        &self.engine
    }

    /// The monitor; platform callbacks are forwarded here.
    #[must_use]
    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    /// Register a subscriber. See
    /// [`SubscriberRegistry::register`](crate::registry::SubscriberRegistry::register).
    ///
    /// # Errors
    ///
    /// Propagates the subscriber's discovery error.
    pub fn register(&self, subscriber: &Arc<dyn Subscriber>) -> WatchResult<bool> {
        self.registry.register(subscriber)
    }

    /// Unregister a subscriber; idempotent.
    pub fn unregister(&self, subscriber: &Arc<dyn Subscriber>) -> bool {
        self.registry.unregister(subscriber)
    }

    /// Unregister every subscriber; the manager remains usable.
    pub fn unregister_all(&self) {
        self.registry.unregister_all();
    }

    /// Point-in-time platform query: is any network usable right now?
    #[must_use]
    pub fn is_network_available(&self) -> bool {
        is_network_available(self.probe.as_ref())
    }

    /// Point-in-time platform query: the current connectivity category.
    #[must_use]
    pub fn current_connectivity(&self) -> ConnectivityState {
        current_connectivity(self.probe.as_ref())
    }

    /// The monitor's tracked state and when it last changed.
    #[must_use]
    pub fn last_transition(&self) -> Transition {
        self.monitor.current()
    }
}

/// Publish `manager` as the process-wide instance.
///
/// Must run once during application bootstrap, before any use of
/// [`global`].
///
/// # Errors
///
/// [`ConfigurationError::AlreadyInitialized`] on a second call.
pub fn init(manager: Arc<ConnectivityManager>) -> WatchResult<()> {
    GLOBAL
        .set(manager)
        .map_err(|_| ConfigurationError::AlreadyInitialized)?;
    info!("connectivity manager installed");
    Ok(())
}

/// The process-wide manager installed by [`init`].
///
/// # Errors
///
/// [`ConfigurationError::NotInitialized`] before `init` has run; the
/// caller must surface this immediately rather than retry.
pub fn global() -> WatchResult<Arc<ConnectivityManager>> {
    GLOBAL
        .get()
        .cloned()
        .ok_or_else(|| ConfigurationError::NotInitialized.into())
}
