//! Integration tests for the active readiness probe.

use mysql_lab::{ProgressReporter, ProvisionError, ReadinessConfig, ReadinessProbe};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

/// Reporter capturing every emitted percentage.
#[derive(Clone, Default)]
struct RecordingReporter {
    events: Arc<Mutex<Vec<u32>>>,
}

impl RecordingReporter {
    fn percentages(&self) -> Vec<u32> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn emit(&self, percentage: u32, _message: String) {
        self.events.lock().unwrap().push(percentage);
    }
}

fn probe_config(deadline_secs: u64) -> ReadinessConfig {
    ReadinessConfig {
        deadline_secs,
        connect_timeout_ms: 200,
        initial_backoff_ms: 20,
        max_backoff_ms: 100,
    }
}

#[tokio::test]
async fn test_ready_endpoints_return_early() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let probe = ReadinessProbe::new(&probe_config(30));
    let reporter = RecordingReporter::default();
    let start = Instant::now();

    probe
        .wait_until_ready(&[("source".to_string(), addr)], &reporter)
        .await
        .unwrap();

    // Early return on success, nowhere near the 30s deadline.
    assert!(start.elapsed() < Duration::from_secs(5));

    let pcts = reporter.percentages();
    assert_eq!(*pcts.first().unwrap(), 0);
    assert_eq!(*pcts.last().unwrap(), 100);
}

#[tokio::test]
async fn test_progress_is_monotonic_and_spans_zero_to_hundred() {
    // Endpoint starts listening only after a few failed attempts.
    let reserved = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = reserved.local_addr().unwrap();
    drop(reserved);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        let listener = TcpListener::bind(addr).await.unwrap();
        // Hold the listener open long enough for the probe to connect.
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(listener);
    });

    let probe = ReadinessProbe::new(&probe_config(10));
    let reporter = RecordingReporter::default();

    probe
        .wait_until_ready(&[("target".to_string(), addr.to_string())], &reporter)
        .await
        .unwrap();

    let pcts = reporter.percentages();
    assert_eq!(*pcts.first().unwrap(), 0);
    assert_eq!(*pcts.last().unwrap(), 100);
    assert!(pcts.windows(2).all(|w| w[0] <= w[1]), "progress must never decrease: {:?}", pcts);
    assert_eq!(pcts.iter().filter(|&&p| p == 100).count(), 1);
}

#[tokio::test]
async fn test_unreachable_endpoint_times_out_with_distinct_error() {
    // Port 1 is never listening on loopback.
    let probe = ReadinessProbe::new(&probe_config(1));
    let reporter = RecordingReporter::default();

    let err = probe
        .wait_until_ready(
            &[("source".to_string(), "127.0.0.1:1".to_string())],
            &reporter,
        )
        .await
        .unwrap_err();

    match err {
        ProvisionError::ReadinessTimeout(msg) => {
            assert!(msg.contains("source"));
            assert!(msg.contains("127.0.0.1:1"));
        }
        other => panic!("expected ReadinessTimeout, got {:?}", other),
    }
    // Failure never reports completion.
    assert!(reporter.percentages().iter().all(|&p| p < 100));
}

#[tokio::test]
async fn test_timeout_names_only_unreachable_endpoints() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let good = listener.local_addr().unwrap().to_string();

    let probe = ReadinessProbe::new(&probe_config(1));
    let reporter = RecordingReporter::default();

    let err = probe
        .wait_until_ready(
            &[
                ("source".to_string(), good),
                ("target".to_string(), "127.0.0.1:1".to_string()),
            ],
            &reporter,
        )
        .await
        .unwrap_err();

    match err {
        ProvisionError::ReadinessTimeout(msg) => {
            assert!(msg.contains("target"));
            assert!(!msg.contains("source"));
        }
        other => panic!("expected ReadinessTimeout, got {:?}", other),
    }
}
