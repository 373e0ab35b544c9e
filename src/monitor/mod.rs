//! Platform boundary: raw link signals in, normalized transitions out.
//!
//! The monitor is the only holder of the process-level "current" state.
//! Platform integrations forward their OS callbacks into
//! [`ConnectivityMonitor`] and implement [`NetworkProbe`] for the
//! point-in-time queries; everything downstream of the translation is
//! platform-agnostic.

/// Current-state tracking and signal translation.
pub mod feed;
/// Point-in-time platform queries.
pub mod probe;

pub use feed::{ConnectivityMonitor, MonitorConfig};
pub use probe::{
    current_connectivity, is_network_available, ApnClass, LinkCapabilities, LinkTransport,
    NetworkProbe,
};
