mod common;

use common::{SERVER_VERSIONS, default_script, spawn_scripted_server};
use ribbon_bridge_caller::error::RibbonCallerError;
use ribbon_bridge_tokio_client::BlockingRibbonClient;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Runs the scripted server on its own runtime thread, as an external
/// process would, and returns its URL.
fn start_server_thread() -> String {
    let (url_tx, url_rx) = mpsc::channel();

    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let url = spawn_scripted_server(default_script).await;
            url_tx.send(url).unwrap();
            std::future::pending::<()>().await;
        });
    });

    url_rx.recv().unwrap()
}

#[test]
fn test_blocking_client_round_trip() {
    let url = start_server_thread();
    let client = BlockingRibbonClient::new(&url).unwrap();

    assert_eq!(client.connect().unwrap(), SERVER_VERSIONS);
    assert_eq!(client.call("ping", Vec::new()).unwrap(), b"pong");
    assert_eq!(client.call("echo", b"abc".to_vec()).unwrap(), b"abc");
}

#[test]
fn test_blocking_client_usable_from_other_threads() {
    let url = start_server_thread();
    let client = std::sync::Arc::new(BlockingRibbonClient::new(&url).unwrap());

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let client = client.clone();
            thread::spawn(move || client.call("echo", vec![i]).unwrap())
        })
        .collect();

    let mut results: Vec<Vec<u8>> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    results.sort();

    assert_eq!(results, vec![vec![0], vec![1], vec![2], vec![3]]);
}

#[test]
fn test_blocking_client_timeout() {
    let url = start_server_thread();
    let client = BlockingRibbonClient::new(&url).unwrap();

    let result = client.call_with_timeout("slow", Vec::new(), Duration::from_millis(50));
    assert!(matches!(result, Err(RibbonCallerError::Timeout { .. })));
}

#[test]
fn test_blocking_client_reports_connection_failure() {
    let result = BlockingRibbonClient::new("ws://127.0.0.1:1");
    assert!(result.is_err());
}
