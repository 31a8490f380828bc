//! Console output
//!
//! Product output (startup banner, received orders, faults) goes through an
//! [`OrderSink`], one line per call. Logging stays on stderr via tracing.

use std::io::Write;

/// Banner printed when the console starts waiting for orders
pub const STARTUP_LINE: &str = "Chef application is waiting for new orders. Press [Enter] to exit.";

/// Line-oriented output for the chef console
pub trait OrderSink: Send + Sync {
    /// Write one line of output
    fn line(&self, text: &str);

    /// Announce a received order
    fn order_received(&self, text: &str) {
        self.line(&format!("New order received: {}", text));
    }

    /// Report a fault hit while polling
    fn fault(&self, message: &str) {
        self.line(&format!("Error processing orders: {}", message));
    }
}

/// Sink writing to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl OrderSink for ConsoleSink {
    fn line(&self, text: &str) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        // A closed stdout must not take the poller down
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }
}
