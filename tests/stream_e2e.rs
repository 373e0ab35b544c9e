use std::sync::Arc;
use std::thread;
use std::time::Duration;

use connwatch::{
    ConnectivityState, DispatchEngine, StreamError, Subscriber, SubscriberRegistry, WatchError,
};

fn engine() -> DispatchEngine {
    DispatchEngine::new(Arc::new(SubscriberRegistry::new()))
}

#[test]
fn stream_receives_only_covered_transitions() {
    let engine = engine();
    let (sub, stream) = connwatch::stream::subscriber(ConnectivityState::Wifi, 16, "ui").unwrap();
    let handle: Arc<dyn Subscriber> = sub;
    engine.registry().register(&handle).unwrap();

    engine.post(ConnectivityState::Wifi);
    engine.post(ConnectivityState::CellularWap);
    engine.post(ConnectivityState::None);

    let first = stream.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(first.state, ConnectivityState::Wifi);
    let second = stream.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(second.state, ConnectivityState::None);
    assert!(first.observed_at <= second.observed_at);

    // Nothing else arrived; the CellularWap transition was filtered out.
    let err = stream.recv_timeout(Duration::from_millis(20)).unwrap_err();
    assert!(matches!(
        err,
        WatchError::Stream(StreamError::Timeout { .. })
    ));
    assert_eq!(stream.dropped(), 0);
}

#[test]
fn stream_disconnects_once_senders_are_gone() {
    let engine = engine();
    let (sub, stream) = connwatch::stream::subscriber(ConnectivityState::Any, 4, "gone").unwrap();
    let handle: Arc<dyn Subscriber> = sub;
    engine.registry().register(&handle).unwrap();

    engine.post(ConnectivityState::Wifi);

    // Unregistering drops the registry's descriptor (one sender);
    // dropping the subscriber handle drops the other.
    engine.registry().unregister(&handle);
    drop(handle);

    // The buffered transition is still readable, then the stream ends.
    assert_eq!(
        stream.recv_timeout(Duration::from_secs(1)).unwrap().state,
        ConnectivityState::Wifi
    );
    let err = stream.recv().unwrap_err();
    assert!(matches!(err, WatchError::Stream(StreamError::Disconnected)));
}

#[test]
fn slow_consumer_drops_transitions_without_stalling_dispatch() {
    let engine = engine();
    let (sub, stream) = connwatch::stream::subscriber(ConnectivityState::Any, 1, "slow").unwrap();
    let handle: Arc<dyn Subscriber> = sub;
    engine.registry().register(&handle).unwrap();

    // Intentionally do not read from the stream while flooding.
    for _ in 0..100 {
        engine.post(ConnectivityState::Wifi);
    }

    assert!(stream.dropped() > 0, "expected drops from a full buffer");
    assert_eq!(
        stream.recv_timeout(Duration::from_secs(1)).unwrap().state,
        ConnectivityState::Wifi
    );
}

#[test]
fn stream_delivers_across_threads() {
    let engine = Arc::new(engine());
    let (sub, stream) = connwatch::stream::subscriber(ConnectivityState::CellularNet, 8, "bg").unwrap();
    let handle: Arc<dyn Subscriber> = sub;
    engine.registry().register(&handle).unwrap();

    let poster = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            engine.post(ConnectivityState::Wifi);
            engine.post(ConnectivityState::CellularNet);
        })
    };

    let got = stream.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(got.state, ConnectivityState::CellularNet);
    poster.join().unwrap();
}
