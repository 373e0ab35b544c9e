//! Channel-backed subscriber adapter.
//!
//! Handlers run synchronously on the monitor thread. Consumers that
//! want matching transitions delivered on their own thread register a
//! [`StreamSubscriber`] and read from the paired [`TransitionStream`].
//! Sends never block the dispatch sweep: when the consumer lags, the
//! transition is dropped and counted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::error::{DiscoveryError, StreamError, WatchResult};
use crate::state::{ConnectivityState, Transition};
use crate::subscriber::{HandlerDescriptor, Subscriber};

/// Build a channel-backed subscriber for `filter`.
///
/// Register the returned [`StreamSubscriber`] like any other subscriber;
/// transitions covered by `filter` arrive on the [`TransitionStream`].
/// `capacity` bounds the in-flight buffer (at least 1).
///
/// # Errors
///
/// Fails with [`DiscoveryError::UndeclarableFilter`] when `filter` is
/// `ConnectivityState::None`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use connwatch::{ConnectivityState, DispatchEngine, Subscriber, SubscriberRegistry};
///
/// let engine = DispatchEngine::new(Arc::new(SubscriberRegistry::new()));
/// let (subscriber, stream) =
///     connwatch::stream::subscriber(ConnectivityState::Wifi, 16, "ui").unwrap();
/// let handle: Arc<dyn Subscriber> = subscriber;
/// engine.registry().register(&handle).unwrap();
///
/// engine.post(ConnectivityState::Wifi);
/// let transition = stream.recv_timeout(Duration::from_secs(1)).unwrap();
/// assert_eq!(transition.state, ConnectivityState::Wifi);
/// ```
pub fn subscriber(
    filter: ConnectivityState,
    capacity: usize,
    label: impl Into<String>,
) -> WatchResult<(Arc<StreamSubscriber>, TransitionStream)> {
    if filter == ConnectivityState::None {
        return Err(DiscoveryError::UndeclarableFilter.into());
    }

    let (tx, rx) = bounded::<Transition>(capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));

    let sub = Arc::new(StreamSubscriber {
        filter,
        label: label.into(),
        tx,
        dropped: Arc::clone(&dropped),
    });
    let stream = TransitionStream { rx, dropped };
    Ok((sub, stream))
}

/// The sending half: a [`Subscriber`] forwarding covered transitions
/// into the stream.
pub struct StreamSubscriber {
    filter: ConnectivityState,
    label: String,
    tx: Sender<Transition>,
    dropped: Arc<AtomicU64>,
}

impl Subscriber for StreamSubscriber {
    fn handlers(&self) -> Result<Vec<HandlerDescriptor>, DiscoveryError> {
        let tx = self.tx.clone();
        let dropped = Arc::clone(&self.dropped);
        Ok(vec![HandlerDescriptor::new(self.filter, move |state| {
            // Never block the monitor thread: drop if the consumer lags.
            match tx.try_send(Transition::now(state)) {
                Ok(()) => {}
                Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                    dropped.fetch_add(1, Ordering::Relaxed);
                }
            }
        })?])
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for StreamSubscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSubscriber")
            .field("filter", &self.filter)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// The receiving half of a stream subscription.
#[derive(Debug)]
pub struct TransitionStream {
    rx: Receiver<Transition>,
    dropped: Arc<AtomicU64>,
}

impl TransitionStream {
    /// Receive the next covered transition (blocking).
    ///
    /// # Errors
    ///
    /// [`StreamError::Disconnected`] once every sender is gone: the
    /// subscriber was unregistered (dropping the registry's descriptor)
    /// and the `StreamSubscriber` itself was dropped.
    pub fn recv(&self) -> WatchResult<Transition> {
        self.rx.recv().map_err(|_| StreamError::Disconnected.into())
    }

    /// Receive the next covered transition with a timeout.
    ///
    /// # Errors
    ///
    /// [`StreamError::Timeout`] when nothing arrived in time,
    /// [`StreamError::Disconnected`] once every sender is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> WatchResult<Transition> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => StreamError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }
            .into(),
            RecvTimeoutError::Disconnected => StreamError::Disconnected.into(),
        })
    }

    /// Transitions dropped because the buffer was full or disconnected.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
