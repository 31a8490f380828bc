//! chef-console library
//!
//! Console worker that waits on the order notification queue and prints each
//! order as it arrives, plus one-shot menu/order listing commands.

pub mod cli;
pub mod commands;
pub mod lifecycle;
pub mod logging;
pub mod poller;
pub mod sink;

pub use lifecycle::{ChefConsole, RunningConsole};
pub use poller::{PollerOptions, PollerState, PollerSummary, QueuePoller};
pub use sink::{ConsoleSink, OrderSink};
