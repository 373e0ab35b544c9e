//! Signal translation and current-state tracking.
//!
//! Each platform callback is translated into exactly one
//! `ConnectivityState` per call. Capability-change reports can fire
//! repeatedly for the same effective state, so that path de-duplicates
//! on change; a freshly regained link always notifies, even when the
//! previous category was already `Any`.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::dispatch::DispatchEngine;
use crate::state::{ConnectivityState, Transition};

use super::probe::{LinkCapabilities, LinkTransport};

/// Monitor tuning knobs.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// State assumed before the first platform signal arrives.
    pub initial_state: ConnectivityState,
    /// Whether a regained link notifies even when the category is
    /// unchanged. On by default; the platform's "available" callback is
    /// how listeners learn connectivity came back.
    pub notify_on_regain: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            initial_state: ConnectivityState::Any,
            notify_on_regain: true,
        }
    }
}

/// Translates raw platform signals into normalized transitions and
/// posts them to the dispatch engine.
///
/// Holds the single process-level "current" state; the registry and
/// engine stay stateless with respect to connectivity.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    cfg: MonitorConfig,
    engine: Arc<DispatchEngine>,
    current: Mutex<Transition>,
}

impl ConnectivityMonitor {
    /// Create a monitor feeding `engine`.
    #[must_use]
    pub fn new(cfg: MonitorConfig, engine: Arc<DispatchEngine>) -> Self {
        let current = Mutex::new(Transition::now(cfg.initial_state));
        Self {
            cfg,
            engine,
            current,
        }
    }

    /// The current state and when it last changed.
    #[must_use]
    pub fn current(&self) -> Transition {
        match self.current.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Platform reported a link coming up.
    ///
    /// The category is not yet known at this point, so the state becomes
    /// `Any`. This path is exempt from de-duplication: a regained
    /// network notifies even if the state was already `Any`.
    pub fn link_established(&self) {
        debug!("link established");
        let changed = self.swap_current(ConnectivityState::Any);
        if changed || self.cfg.notify_on_regain {
            self.engine.post(ConnectivityState::Any);
        }
    }

    /// Platform reported the link going away.
    pub fn link_lost(&self) {
        warn!("link lost");
        self.swap_current(ConnectivityState::None);
        self.engine.post(ConnectivityState::None);
    }

    /// Platform reported a capability or transport change.
    ///
    /// This callback can fire several times for one effective state, so
    /// it only posts when the mapped category actually changed.
    /// Non-validated reports are ignored entirely. The mapping is
    /// deliberately coarse: a validated Wi-Fi link is `Wifi`, any other
    /// validated link is `Any` (cellular sub-typing belongs to the
    /// query path).
    pub fn capabilities_changed(&self, caps: &LinkCapabilities) {
        if !caps.validated {
            debug!(?caps, "ignoring non-validated capability report");
            return;
        }

        let next = match caps.transport {
            LinkTransport::Wifi => ConnectivityState::Wifi,
            LinkTransport::Cellular(_) | LinkTransport::Other => ConnectivityState::Any,
        };

        if self.swap_current(next) {
            debug!(state = %next, "capability change produced a transition");
            self.engine.post(next);
        }
    }

    /// Replace the current state, returning whether it changed.
    fn swap_current(&self, next: ConnectivityState) -> bool {
        let mut guard = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.state == next {
            return false;
        }
        *guard = Transition::now(next);
        true
    }
}
