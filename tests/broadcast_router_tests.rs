use ribbon_bridge::broadcast::{BroadcastHandlerError, BroadcastRouter, DispatchOutcome};
use ribbon_bridge::procedure_id_hash;
use std::sync::{Arc, Mutex};

type Received = Arc<Mutex<Vec<Vec<u8>>>>;

fn recorder() -> (
    Received,
    impl Fn(&[u8]) -> Result<(), BroadcastHandlerError> + Send + Sync + 'static,
) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    (received, move |payload: &[u8]| {
        sink.lock().unwrap().push(payload.to_vec());
        Ok(())
    })
}

#[test]
fn test_dispatch_invokes_subscribed_handler_once() {
    let mut router = BroadcastRouter::new();
    let (received, handler) = recorder();
    router.subscribe("alert", handler);

    let outcome = router.dispatch(procedure_id_hash("alert"), b"oops".to_vec());

    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(*received.lock().unwrap(), vec![b"oops".to_vec()]);
}

#[test]
fn test_unsubscribed_topic_is_dropped() {
    let mut router = BroadcastRouter::new();
    let (received, handler) = recorder();
    router.subscribe("alert", handler);

    let outcome = router.dispatch(procedure_id_hash("other"), b"ignored".to_vec());

    assert_eq!(outcome, DispatchOutcome::Unsubscribed);
    assert!(received.lock().unwrap().is_empty());
}

#[test]
fn test_failing_handler_does_not_block_later_broadcasts() {
    let mut router = BroadcastRouter::new();
    router.subscribe("broken", |_payload: &[u8]| Err("handler exploded".into()));
    let (received, handler) = recorder();
    router.subscribe("alert", handler);

    assert_eq!(
        router.dispatch(procedure_id_hash("broken"), vec![]),
        DispatchOutcome::HandlerFailed
    );
    assert_eq!(
        router.dispatch(procedure_id_hash("alert"), b"still here".to_vec()),
        DispatchOutcome::Handled
    );
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[test]
fn test_panicking_handler_is_contained() {
    let mut router = BroadcastRouter::new();
    router.subscribe("panics", |_payload: &[u8]| panic!("bad handler"));

    assert_eq!(
        router.dispatch(procedure_id_hash("panics"), vec![1]),
        DispatchOutcome::HandlerFailed
    );
    // The same handler can be dispatched to again.
    assert_eq!(
        router.dispatch(procedure_id_hash("panics"), vec![2]),
        DispatchOutcome::HandlerFailed
    );
}

#[test]
fn test_last_registration_wins() {
    let mut router = BroadcastRouter::new();
    let (first, first_handler) = recorder();
    let (second, second_handler) = recorder();
    router.subscribe("alert", first_handler);
    router.subscribe("alert", second_handler);

    router.dispatch(procedure_id_hash("alert"), b"x".to_vec());

    assert_eq!(router.len(), 1);
    assert!(first.lock().unwrap().is_empty());
    assert_eq!(second.lock().unwrap().len(), 1);
}

#[test]
fn test_unsubscribe_removes_handler() {
    let mut router = BroadcastRouter::new();
    let (received, handler) = recorder();
    router.subscribe("alert", handler);

    assert!(router.is_subscribed("alert"));
    assert!(router.unsubscribe("alert"));
    assert!(!router.unsubscribe("alert"));
    assert!(router.is_empty());

    router.dispatch(procedure_id_hash("alert"), b"x".to_vec());
    assert!(received.lock().unwrap().is_empty());
}

#[test]
fn test_prepared_delivery_runs_later() {
    let mut router = BroadcastRouter::new();
    let (received, handler) = recorder();
    router.subscribe("alert", handler);

    let delivery = router.prepare(procedure_id_hash("alert"), b"deferred".to_vec());
    assert!(delivery.has_handler());
    assert_eq!(delivery.payload(), b"deferred");

    // The handler survives unsubscription once the delivery is prepared.
    router.unsubscribe("alert");
    assert_eq!(delivery.run(), DispatchOutcome::Handled);
    assert_eq!(received.lock().unwrap().len(), 1);
}
