//! Order notification poller
//!
//! Single-task worker loop that drains the order notification queue and
//! prints every order it receives.
//!
//! **Cycle:** `Polling → Receiving → Draining → Sleeping → Polling …`
//! - **Receiving**: long-poll the queue for up to `receive_timeout`
//! - **Draining**: skip NULL bodies, decode the rest as UTF-16 text, emit
//! - **Sleeping**: wait for the configured interval (or a fault backoff)
//!
//! The stop token is observed between cycles and also interrupts an in-flight
//! receive or sleep, so shutdown never waits out a long-poll.

use crate::sink::OrderSink;
use chef_common::codec::decode_message_body;
use chef_common::config::{FaultPolicy, DEFAULT_RECEIVE_TIMEOUT_MS};
use chef_common::db::{load_polling_interval, OrderQueue, QueueMessage};
use chef_common::Error;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Smallest base delay used for fault backoff
const MIN_FAULT_BACKOFF: Duration = Duration::from_millis(250);

/// Upper bound for fault backoff
const MAX_FAULT_BACKOFF: Duration = Duration::from_secs(30);

/// Where the poll loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
    Receiving,
    Draining,
    Sleeping,
    Stopped,
}

/// Poller tuning
#[derive(Debug, Clone)]
pub struct PollerOptions {
    /// Long-poll wait passed to each receive call
    pub receive_timeout: Duration,
    /// Behavior after a receive or decode fault
    pub fault_policy: FaultPolicy,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            receive_timeout: Duration::from_millis(DEFAULT_RECEIVE_TIMEOUT_MS),
            fault_policy: FaultPolicy::default(),
        }
    }
}

/// Counters reported when the poller stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollerSummary {
    /// Receive calls started
    pub cycles: u64,
    /// Messages taken off the queue
    pub received: u64,
    /// Orders printed
    pub emitted: u64,
    /// Messages skipped for having no body
    pub null_bodies: u64,
    /// Receive and decode faults reported
    pub faults: u64,
}

/// Queue consumer for the chef console
pub struct QueuePoller {
    queue: Arc<dyn OrderQueue>,
    settings: SqlitePool,
    sink: Arc<dyn OrderSink>,
    options: PollerOptions,
    state_tx: watch::Sender<PollerState>,
}

impl QueuePoller {
    /// Create a poller
    ///
    /// `settings` is read once when [`run`](Self::run) starts, for the
    /// polling interval.
    pub fn new(
        queue: Arc<dyn OrderQueue>,
        settings: SqlitePool,
        sink: Arc<dyn OrderSink>,
        options: PollerOptions,
    ) -> Self {
        let (state_tx, _) = watch::channel(PollerState::Idle);
        Self {
            queue,
            settings,
            sink,
            options,
            state_tx,
        }
    }

    /// Watch the poller's state transitions
    pub fn subscribe_state(&self) -> watch::Receiver<PollerState> {
        self.state_tx.subscribe()
    }

    /// Output sink shared with the poller
    pub fn sink(&self) -> Arc<dyn OrderSink> {
        Arc::clone(&self.sink)
    }

    /// Run the poll loop until `shutdown` is cancelled
    ///
    /// With [`FaultPolicy::Stop`] the loop also ends at the first fault.
    pub async fn run(self, shutdown: CancellationToken) -> PollerSummary {
        let interval = load_polling_interval(&self.settings).await;
        info!(
            "Order poller started (interval {:?}, receive timeout {:?}, fault policy {:?})",
            interval, self.options.receive_timeout, self.options.fault_policy
        );

        let mut summary = PollerSummary::default();
        let mut consecutive_faults: u32 = 0;
        self.set_state(PollerState::Polling);

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            summary.cycles += 1;
            self.set_state(PollerState::Receiving);

            let received = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                result = self.queue.receive(self.options.receive_timeout) => result,
            };

            let delay = match received {
                Ok(messages) => {
                    consecutive_faults = 0;
                    self.set_state(PollerState::Draining);
                    if !self.drain(messages, &mut summary) {
                        break;
                    }
                    interval
                }
                Err(e) => {
                    summary.faults += 1;
                    consecutive_faults = consecutive_faults.saturating_add(1);
                    self.report_fault(&e);
                    if self.options.fault_policy == FaultPolicy::Stop {
                        break;
                    }
                    fault_backoff(interval, consecutive_faults)
                }
            };

            self.set_state(PollerState::Sleeping);
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = sleep(delay) => {}
            }
            self.set_state(PollerState::Polling);
        }

        self.set_state(PollerState::Stopped);
        info!(
            "Order poller stopped after {} cycles ({} received, {} printed, {} faults)",
            summary.cycles, summary.received, summary.emitted, summary.faults
        );

        summary
    }

    /// Emit every message of one batch
    ///
    /// Returns false when a fault must stop the loop.
    fn drain(&self, messages: Vec<QueueMessage>, summary: &mut PollerSummary) -> bool {
        if !messages.is_empty() {
            debug!("Draining {} messages", messages.len());
        }

        for message in messages {
            summary.received += 1;

            let Some(body) = message.message_body else {
                debug!("Skipping message {} with no body", message.message_id);
                summary.null_bodies += 1;
                continue;
            };

            match decode_message_body(&body) {
                Ok(text) => {
                    self.sink.order_received(&text);
                    summary.emitted += 1;
                }
                Err(e) => {
                    summary.faults += 1;
                    error!("Message {} could not be decoded", message.message_id);
                    self.report_fault(&e);
                    if self.options.fault_policy == FaultPolicy::Stop {
                        return false;
                    }
                }
            }
        }

        true
    }

    fn report_fault(&self, e: &Error) {
        error!("Error processing orders: {}", e);
        self.sink.fault(&e.to_string());
    }

    fn set_state(&self, state: PollerState) {
        self.state_tx.send_replace(state);
    }
}

/// Delay before the next receive after `consecutive_faults` faults in a row
///
/// Doubles from `max(interval, 250ms)` per consecutive fault, capped at 30s.
pub fn fault_backoff(interval: Duration, consecutive_faults: u32) -> Duration {
    let base = interval.max(MIN_FAULT_BACKOFF);
    let exponent = consecutive_faults.saturating_sub(1).min(16);
    base.saturating_mul(1u32 << exponent).min(MAX_FAULT_BACKOFF)
}
