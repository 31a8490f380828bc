//! Console lifecycle
//!
//! Starts the [`QueuePoller`] as a background task, waits for the stop
//! signal on the primary path, then cancels the poller and waits for it to
//! return. The poller stopping on its own (fault policy `stop`) does not end
//! the wait; only the stop signal does.

use crate::poller::{PollerSummary, QueuePoller};
use crate::sink::{OrderSink, STARTUP_LINE};
use chef_common::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// The chef console: one poller plus its lifecycle
pub struct ChefConsole {
    poller: QueuePoller,
    sink: Arc<dyn OrderSink>,
}

impl ChefConsole {
    pub fn new(poller: QueuePoller) -> Self {
        let sink = poller.sink();
        Self { poller, sink }
    }

    /// Print the startup banner and spawn the poller
    pub fn start(self) -> RunningConsole {
        self.sink.line(STARTUP_LINE);

        let shutdown = CancellationToken::new();
        let worker = tokio::spawn(self.poller.run(shutdown.clone()));
        info!("Chef console started");

        RunningConsole { shutdown, worker }
    }

    /// Run until `stop_signal` completes, then shut the poller down
    ///
    /// Returns only after the poller task has fully returned.
    pub async fn run<F>(self, stop_signal: F) -> Result<PollerSummary>
    where
        F: Future<Output = ()>,
    {
        let running = self.start();
        stop_signal.await;
        info!("Stop signal received");
        running.stop().await
    }
}

/// Handle to a started console
pub struct RunningConsole {
    shutdown: CancellationToken,
    worker: JoinHandle<PollerSummary>,
}

impl RunningConsole {
    /// True once the poller task has returned
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Cancel the poller and wait for it to return
    pub async fn stop(self) -> Result<PollerSummary> {
        self.shutdown.cancel();

        let summary = self
            .worker
            .await
            .map_err(|e| Error::Internal(format!("order poller task failed: {}", e)))?;

        info!("Chef console stopped");
        Ok(summary)
    }
}
