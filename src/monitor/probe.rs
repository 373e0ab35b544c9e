//! Point-in-time platform queries.
//!
//! These are stateless lookups against the platform, independent of the
//! registry and of the monitor's current-state tracking.

use serde::{Deserialize, Serialize};

use crate::state::ConnectivityState;

/// Coarse APN split for cellular links. The crate deliberately does not
/// distinguish cellular sub-types beyond this two-way split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApnClass {
    /// WAP-class APN (handset-oriented).
    Wap,
    /// NET-class APN (tethered/PC-oriented).
    Net,
}

/// The transport carrying an active link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkTransport {
    /// Wi-Fi.
    Wifi,
    /// Cellular, with its APN class.
    Cellular(ApnClass),
    /// Anything else (ethernet, bluetooth tether, ...).
    Other,
}

/// A raw capability-change report from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCapabilities {
    /// Whether the platform has validated the link end-to-end.
    /// Non-validated reports are ignored by the monitor.
    pub validated: bool,
    /// The transport now carrying the link.
    pub transport: LinkTransport,
}

/// Platform backend for the query interface.
///
/// Production integrations wrap the OS connectivity service; tests use
/// fixed fakes.
pub trait NetworkProbe: Send + Sync {
    /// Whether any link is currently connected.
    fn is_link_connected(&self) -> bool;

    /// The transport of the active link, if any.
    fn active_transport(&self) -> Option<LinkTransport>;
}

/// Whether the device currently has a usable network.
pub fn is_network_available(probe: &dyn NetworkProbe) -> bool {
    probe.is_link_connected()
}

/// The device's current connectivity category.
///
/// Maps the active transport to the bounded state vocabulary; a link on
/// an unrecognized transport reports as `None`, matching the platform
/// library this crate descends from.
pub fn current_connectivity(probe: &dyn NetworkProbe) -> ConnectivityState {
    match probe.active_transport() {
        Some(LinkTransport::Wifi) => ConnectivityState::Wifi,
        Some(LinkTransport::Cellular(ApnClass::Wap)) => ConnectivityState::CellularWap,
        Some(LinkTransport::Cellular(ApnClass::Net)) => ConnectivityState::CellularNet,
        Some(LinkTransport::Other) | None => ConnectivityState::None,
    }
}
