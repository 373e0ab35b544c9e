//! # connwatch — connectivity transitions, dispatched by interest
//!
//! connwatch observes device network connectivity transitions and
//! notifies subscribers with a normalized [`ConnectivityState`],
//! filtering per handler by a declared interest.
//!
//! ## Core Concepts
//!
//! - **ConnectivityState**: the bounded category vocabulary every
//!   transition is normalized into
//! - **Subscriber / HandlerDescriptor**: explicit, compile-time-checked
//!   interest declarations
//! - **SubscriberRegistry**: the set of active subscribers and their
//!   handler tables
//! - **DispatchEngine**: the synchronous sweep applying the matching
//!   rule — `Any` hears everything, a category filter hears its own
//!   category plus total loss of connectivity
//! - **ConnectivityMonitor**: the platform boundary translating raw link
//!   signals into exactly one state per callback
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use connwatch::monitor::MonitorConfig;
//! use connwatch::{ConnectivityManager, ConnectivityState, HandlerDescriptor, Subscriber};
//!
//! let manager = ConnectivityManager::new(platform_probe, MonitorConfig::default());
//! connwatch::init(Arc::clone(&manager))?;
//!
//! let toast: Arc<dyn Subscriber> = Arc::new(ToastWidget::new());
//! manager.register(&toast)?;
//!
//! // Platform callbacks feed the monitor:
//! manager.monitor().link_established();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dispatch;
pub mod error;
pub mod manager;
pub mod monitor;
pub mod registry;
pub mod state;
pub mod stream;
pub mod subscriber;

// Re-export primary types at crate root for convenience
pub use dispatch::DispatchEngine;
pub use error::{ConfigurationError, DiscoveryError, StreamError, WatchError, WatchResult};
pub use manager::{global, init, ConnectivityManager};
pub use monitor::{ApnClass, ConnectivityMonitor, LinkCapabilities, LinkTransport, NetworkProbe};
pub use registry::SubscriberRegistry;
pub use state::{ConnectivityState, Transition};
pub use stream::{StreamSubscriber, TransitionStream};
pub use subscriber::{HandlerDescriptor, HandlerFn, HandlerId, Subscriber};
