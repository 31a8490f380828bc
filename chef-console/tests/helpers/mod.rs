//! Test doubles for the chef console
//!
//! - [`ScriptedQueue`]: an `OrderQueue` replaying a fixed script of empty,
//!   non-empty and faulting receives
//! - [`CapturingSink`]: an `OrderSink` recording every line

#![allow(dead_code)]

use async_trait::async_trait;
use chef_common::codec::encode_message_body;
use chef_common::db::{open_database, set_setting, OrderQueue, QueueMessage, POLLING_INTERVAL_KEY};
use chef_common::{Error, Result};
use chef_console::OrderSink;
use sqlx::SqlitePool;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted receive result
pub enum Step {
    Messages(Vec<QueueMessage>),
    Fault(String),
}

/// Queue double: pops one scripted step per receive; an exhausted script
/// behaves like an empty queue and waits out the timeout
#[derive(Default)]
pub struct ScriptedQueue {
    steps: Mutex<VecDeque<Step>>,
    receive_calls: AtomicUsize,
}

impl ScriptedQueue {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            receive_calls: AtomicUsize::new(0),
        })
    }

    pub fn receive_calls(&self) -> usize {
        self.receive_calls.load(Ordering::SeqCst)
    }

    pub fn push(&self, step: Step) {
        self.steps.lock().unwrap().push_back(step);
    }
}

#[async_trait]
impl OrderQueue for ScriptedQueue {
    async fn receive(&self, timeout: Duration) -> Result<Vec<QueueMessage>> {
        self.receive_calls.fetch_add(1, Ordering::SeqCst);

        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Messages(messages)) => Ok(messages),
            Some(Step::Fault(message)) => Err(Error::Queue(message)),
            None => {
                tokio::time::sleep(timeout).await;
                Ok(Vec::new())
            }
        }
    }
}

/// Sink recording every line
#[derive(Default)]
pub struct CapturingSink {
    lines: Mutex<Vec<String>>,
}

impl CapturingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl OrderSink for CapturingSink {
    fn line(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }
}

/// Message whose body is `text` encoded the way producers encode it
pub fn text_message(message_id: i64, text: &str) -> QueueMessage {
    QueueMessage::new(message_id, Some(encode_message_body(text)))
}

/// Message with no body
pub fn null_message(message_id: i64) -> QueueMessage {
    QueueMessage::new(message_id, None)
}

/// In-memory settings store with the polling interval set to `interval_ms`
pub async fn settings_with_interval(interval_ms: &str) -> SqlitePool {
    let pool = open_database("sqlite::memory:").await.unwrap();
    set_setting(&pool, POLLING_INTERVAL_KEY, interval_ms).await.unwrap();
    pool
}
