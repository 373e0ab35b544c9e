//! Connectivity categories and the handler matching rule.
//!
//! `ConnectivityState` is the closed vocabulary every transition is
//! normalized into. The same type doubles as a handler's declared filter;
//! `covers` decides whether a filter wants to hear about an observed state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized connectivity category.
///
/// Exactly one state is "current" at the process level at any instant,
/// held by the [`ConnectivityMonitor`](crate::monitor::ConnectivityMonitor).
///
/// # Examples
///
/// ```
/// use connwatch::ConnectivityState;
///
/// // Loss of connectivity is broadcast to every filter.
/// assert!(ConnectivityState::Wifi.covers(ConnectivityState::None));
/// assert!(!ConnectivityState::Wifi.covers(ConnectivityState::CellularNet));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityState {
    /// Network present, kind unspecified.
    Any,
    /// Wi-Fi link.
    Wifi,
    /// Cellular link on a WAP-class APN.
    CellularWap,
    /// Cellular link on a NET-class APN.
    CellularNet,
    /// No network.
    None,
}

impl ConnectivityState {
    /// Historical numeric tag carried over from the platform library this
    /// crate descends from. No ordering or arithmetic meaning.
    #[must_use]
    pub const fn tag(self) -> i8 {
        match self {
            Self::Any => 0,
            Self::Wifi => 1,
            Self::CellularWap => 2,
            Self::CellularNet => 3,
            Self::None => -1,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Wifi => "wifi",
            Self::CellularWap => "cellular-wap",
            Self::CellularNet => "cellular-net",
            Self::None => "none",
        }
    }

    /// Whether a handler filtered on `self` is invoked for `observed`.
    ///
    /// `Any` hears every transition. A category filter hears its own
    /// category and, additionally, total loss of connectivity: "no
    /// network" is a transition away from every category of interest, so
    /// `None` is universally notifiable. `None` itself is not a
    /// declarable filter and covers nothing.
    #[must_use]
    pub const fn covers(self, observed: Self) -> bool {
        matches!(
            (self, observed),
            (Self::Any, _)
                | (Self::Wifi, Self::Wifi | Self::None)
                | (Self::CellularWap, Self::CellularWap | Self::None)
                | (Self::CellularNet, Self::CellularNet | Self::None)
        )
    }

    /// True when this state reports a usable network.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A connectivity category together with when it was observed.
///
/// Carried by the monitor as the process-level "current" state and
/// delivered over [`TransitionStream`](crate::stream::TransitionStream).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The normalized category.
    pub state: ConnectivityState,
    /// When the monitor observed it.
    pub observed_at: chrono::DateTime<chrono::Utc>,
}

impl Transition {
    /// Stamp `state` with the current time.
    #[must_use]
    pub fn now(state: ConnectivityState) -> Self {
        Self {
            state,
            observed_at: chrono::Utc::now(),
        }
    }
}
