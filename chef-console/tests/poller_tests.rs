//! Queue poller behavior against a scripted queue
//!
//! - Decoded orders are printed, NULL bodies are skipped silently
//! - Fault policy `stop` ends polling at the first fault for good
//! - Fault policy `continue` reports the fault and keeps polling
//! - No receive starts after the stop token is cancelled

mod helpers;

use chef_common::config::FaultPolicy;
use chef_common::db::QueueMessage;
use chef_console::{PollerOptions, PollerState, PollerSummary, QueuePoller};
use helpers::{null_message, settings_with_interval, text_message, CapturingSink, ScriptedQueue, Step};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

fn options(fault_policy: FaultPolicy) -> PollerOptions {
    PollerOptions {
        receive_timeout: Duration::from_millis(20),
        fault_policy,
    }
}

struct Harness {
    queue: Arc<ScriptedQueue>,
    sink: Arc<CapturingSink>,
    shutdown: CancellationToken,
    state: tokio::sync::watch::Receiver<PollerState>,
    worker: JoinHandle<PollerSummary>,
}

async fn start(steps: Vec<Step>, interval_ms: &str, options: PollerOptions) -> Harness {
    let queue = ScriptedQueue::new(steps);
    let sink = CapturingSink::new();
    let settings = settings_with_interval(interval_ms).await;

    let poller = QueuePoller::new(queue.clone(), settings, sink.clone(), options);
    let state = poller.subscribe_state();
    let shutdown = CancellationToken::new();
    let worker = tokio::spawn(poller.run(shutdown.clone()));

    Harness {
        queue,
        sink,
        shutdown,
        state,
        worker,
    }
}

impl Harness {
    async fn stop(self) -> (PollerSummary, Vec<String>) {
        self.shutdown.cancel();
        let summary = tokio::time::timeout(Duration::from_secs(2), self.worker)
            .await
            .expect("poller should stop promptly")
            .unwrap();
        (summary, self.sink.lines())
    }

    async fn wait_for_lines(&self, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(3);
        while self.sink.lines().len() < count {
            assert!(Instant::now() < deadline, "timed out waiting for {} lines: {:?}", count, self.sink.lines());
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    async fn wait_for_receives(&self, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(3);
        while self.queue.receive_calls() < count {
            assert!(Instant::now() < deadline, "timed out waiting for {} receives", count);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[tokio::test]
async fn test_received_order_is_printed() {
    let harness = start(
        vec![Step::Messages(vec![text_message(1, "ORDER#42")])],
        "10",
        options(FaultPolicy::Continue),
    )
    .await;

    harness.wait_for_lines(1).await;
    let (summary, lines) = harness.stop().await;

    assert_eq!(lines, vec!["New order received: ORDER#42"]);
    assert_eq!(summary.received, 1);
    assert_eq!(summary.emitted, 1);
    assert_eq!(summary.faults, 0);
}

#[tokio::test]
async fn test_null_body_is_skipped_without_fault() {
    let harness = start(
        vec![Step::Messages(vec![null_message(1), text_message(2, "Soup")])],
        "10",
        options(FaultPolicy::Stop),
    )
    .await;

    harness.wait_for_lines(1).await;
    // Keep polling: a NULL body is not a fault even under the stop policy
    let calls = harness.queue.receive_calls();
    harness.wait_for_receives(calls + 2).await;
    assert!(!harness.worker.is_finished());

    let (summary, lines) = harness.stop().await;
    assert_eq!(lines, vec!["New order received: Soup"]);
    assert_eq!(summary.null_bodies, 1);
    assert_eq!(summary.faults, 0);
}

#[tokio::test]
async fn test_batch_is_printed_in_order() {
    let batch: Vec<QueueMessage> = (1..=3).map(|i| text_message(i, &format!("ORDER#{}", i))).collect();
    let harness = start(vec![Step::Messages(batch)], "10", options(FaultPolicy::Continue)).await;

    harness.wait_for_lines(3).await;
    let (_, lines) = harness.stop().await;

    assert_eq!(
        lines,
        vec![
            "New order received: ORDER#1",
            "New order received: ORDER#2",
            "New order received: ORDER#3",
        ]
    );
}

#[tokio::test]
async fn test_stop_policy_fault_ends_polling_for_good() {
    let harness = start(
        vec![
            Step::Fault("connection reset".to_string()),
            Step::Messages(vec![text_message(1, "LATE")]),
        ],
        "10",
        options(FaultPolicy::Stop),
    )
    .await;

    // The worker returns on its own, without the stop token
    let summary = tokio::time::timeout(Duration::from_secs(2), harness.worker)
        .await
        .expect("poller should stop after the fault")
        .unwrap();

    // Queued message is never picked up afterwards
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.queue.receive_calls(), 1);
    assert_eq!(
        harness.sink.lines(),
        vec!["Error processing orders: Queue error: connection reset"]
    );
    assert_eq!(summary.faults, 1);
    assert_eq!(*harness.state.borrow(), PollerState::Stopped);
}

#[tokio::test]
async fn test_continue_policy_recovers_after_fault() {
    let harness = start(
        vec![
            Step::Fault("connection reset".to_string()),
            Step::Messages(vec![text_message(1, "LATE")]),
        ],
        "10",
        options(FaultPolicy::Continue),
    )
    .await;

    harness.wait_for_lines(2).await;
    let (summary, lines) = harness.stop().await;

    assert_eq!(
        lines,
        vec![
            "Error processing orders: Queue error: connection reset",
            "New order received: LATE",
        ]
    );
    assert_eq!(summary.faults, 1);
    assert_eq!(summary.emitted, 1);
}

#[tokio::test]
async fn test_decode_fault_skips_only_that_message() {
    let bad = QueueMessage::new(1, Some(vec![b'A', 0, b'B']));
    let harness = start(
        vec![Step::Messages(vec![bad, text_message(2, "OK")])],
        "10",
        options(FaultPolicy::Continue),
    )
    .await;

    harness.wait_for_lines(2).await;
    let (summary, lines) = harness.stop().await;

    assert!(lines[0].starts_with("Error processing orders: Decode error:"), "got {:?}", lines);
    assert_eq!(lines[1], "New order received: OK");
    assert_eq!(summary.faults, 1);
}

#[tokio::test]
async fn test_decode_fault_under_stop_policy_ends_polling() {
    let bad = QueueMessage::new(1, Some(vec![0x00, 0xD8]));
    let harness = start(
        vec![Step::Messages(vec![bad, text_message(2, "NEVER")])],
        "10",
        options(FaultPolicy::Stop),
    )
    .await;

    let summary = tokio::time::timeout(Duration::from_secs(2), harness.worker)
        .await
        .expect("poller should stop after the decode fault")
        .unwrap();

    let lines = harness.sink.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Error processing orders: Decode error:"));
    assert_eq!(summary.emitted, 0);
}

#[tokio::test]
async fn test_no_receive_after_stop() {
    let harness = start(Vec::new(), "10", options(FaultPolicy::Continue)).await;

    harness.wait_for_receives(3).await;
    let queue = harness.queue.clone();
    let mut state = harness.state.clone();
    harness.stop().await;

    let calls_at_stop = queue.receive_calls();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(queue.receive_calls(), calls_at_stop);
    assert_eq!(*state.borrow_and_update(), PollerState::Stopped);
}

#[tokio::test]
async fn test_stop_interrupts_long_receive() {
    let harness = start(
        Vec::new(),
        "10",
        PollerOptions {
            receive_timeout: Duration::from_secs(60),
            fault_policy: FaultPolicy::Continue,
        },
    )
    .await;

    harness.wait_for_receives(1).await;
    let started = Instant::now();
    let (summary, lines) = harness.stop().await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(summary.cycles, 1);
    assert!(lines.is_empty());
}

#[tokio::test]
async fn test_configured_interval_spaces_cycles() {
    // 1000ms default applies for an unparseable setting
    let harness = start(
        Vec::new(),
        "not-a-number",
        PollerOptions {
            receive_timeout: Duration::ZERO,
            fault_policy: FaultPolicy::Continue,
        },
    )
    .await;

    harness.wait_for_receives(1).await;
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(harness.queue.receive_calls(), 1);
    harness.stop().await;

    let harness = start(
        Vec::new(),
        "50",
        PollerOptions {
            receive_timeout: Duration::ZERO,
            fault_policy: FaultPolicy::Continue,
        },
    )
    .await;

    harness.wait_for_receives(4).await;
    harness.stop().await;
}

#[tokio::test]
async fn test_state_starts_idle() {
    let queue = ScriptedQueue::new(Vec::new());
    let sink = CapturingSink::new();
    let settings = settings_with_interval("10").await;

    let poller = QueuePoller::new(queue, settings, sink, options(FaultPolicy::Continue));
    assert_eq!(*poller.subscribe_state().borrow(), PollerState::Idle);
}
