//! Error types for connwatch.
//!
//! All errors are strongly typed using thiserror. Configuration and
//! discovery errors are caller-visible; invocation faults are contained
//! within a dispatch sweep and only reported through logs and counters.

use thiserror::Error;
use uuid::Uuid;

use crate::state::ConnectivityState;

/// Bootstrap and process-wide handle errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// `global()` or a global helper was used before `init()`.
    #[error("connectivity manager is not initialized; call init() during bootstrap")]
    NotInitialized,

    /// `init()` was called a second time.
    #[error("connectivity manager is already initialized")]
    AlreadyInitialized,
}

/// Errors produced while discovering a subscriber's declared interests.
///
/// Each is a hard failure for that subscriber's registration; the
/// registry is left as if `register` had not been called.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// `ConnectivityState::None` was declared as a filter. Loss of
    /// connectivity is delivered to every handler already and cannot be
    /// subscribed to on its own.
    #[error("`none` is not a declarable interest; loss of connectivity is broadcast to every handler")]
    UndeclarableFilter,

    /// The subscriber failed to enumerate its handlers.
    #[error("subscriber '{label}' failed to enumerate handlers: {reason}")]
    Enumeration {
        /// Subscriber label, for diagnostics.
        label: String,
        /// Subscriber-supplied failure description.
        reason: String,
    },
}

/// A handler callback faulted during a dispatch sweep.
///
/// Never propagated: the engine logs it, counts it, and continues the
/// sweep over the remaining handlers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("handler {handler} of subscriber '{subscriber}' panicked while handling {state}")]
pub struct InvocationError {
    /// Id of the faulting handler.
    pub handler: Uuid,
    /// Label of the owning subscriber.
    pub subscriber: String,
    /// The state being dispatched when the fault occurred.
    pub state: ConnectivityState,
}

/// Errors surfaced by [`TransitionStream`](crate::stream::TransitionStream).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The sending side is gone (subscriber unregistered and dropped).
    #[error("transition stream disconnected")]
    Disconnected,

    /// No transition arrived within the timeout.
    #[error("no transition within {duration_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        duration_ms: u64,
    },
}

/// Top-level error type for connwatch.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Bootstrap error.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Discovery error.
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Reported handler fault.
    #[error("invocation error: {0}")]
    Invocation(#[from] InvocationError),

    /// Stream error.
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// Internal invariant violation (e.g. a poisoned lock).
    #[error("internal error: {message}")]
    Internal {
        /// Description of the violated invariant.
        message: String,
    },
}

impl WatchError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true if this is a discovery error.
    #[must_use]
    pub const fn is_discovery(&self) -> bool {
        matches!(self, Self::Discovery(_))
    }

    /// Returns true if this is a stream error.
    #[must_use]
    pub const fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for connwatch operations.
pub type WatchResult<T> = Result<T, WatchError>;
