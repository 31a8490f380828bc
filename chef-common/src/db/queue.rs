//! Order notification queue
//!
//! The queue is a capability with one consuming operation: a long-poll
//! receive bounded by a timeout. [`SqliteOrderQueue`] backs it with the
//! `order_notification_queue` table.
//!
//! **Delivery:** at-most-once. A receive removes messages in the same
//! statement that returns them, before the caller decodes or prints anything.
//! A message is never delivered twice; a crash after the receive loses it.

use crate::codec::encode_message_body;
use crate::db::models::QueueMessage;
use crate::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

/// Default maximum number of messages taken by one receive
pub const DEFAULT_RECEIVE_BATCH_SIZE: i64 = 32;

/// Default delay between probes while a receive waits for messages
pub const DEFAULT_POLL_STEP: Duration = Duration::from_millis(100);

/// A queue of order notifications that can be consumed with a bounded wait
#[async_trait]
pub trait OrderQueue: Send + Sync {
    /// Wait up to `timeout` for messages
    ///
    /// Returns as soon as at least one message is available, or an empty
    /// batch once the timeout elapses. Messages come back in enqueue order.
    async fn receive(&self, timeout: Duration) -> Result<Vec<QueueMessage>>;
}

/// Queue stored in the `order_notification_queue` table
#[derive(Debug, Clone)]
pub struct SqliteOrderQueue {
    pool: SqlitePool,
    batch_size: i64,
    poll_step: Duration,
}

impl SqliteOrderQueue {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            batch_size: DEFAULT_RECEIVE_BATCH_SIZE,
            poll_step: DEFAULT_POLL_STEP,
        }
    }

    /// Maximum messages taken per receive (at least 1)
    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Delay between probes while waiting
    pub fn with_poll_step(mut self, poll_step: Duration) -> Self {
        self.poll_step = poll_step;
        self
    }

    /// Enqueue one notification with `text` as its body
    pub async fn send(&self, text: &str) -> Result<i64> {
        self.send_raw(Some(encode_message_body(text))).await
    }

    /// Enqueue a raw body, or a message with no body
    pub async fn send_raw(&self, body: Option<Vec<u8>>) -> Result<i64> {
        let message_id = sqlx::query("INSERT INTO order_notification_queue (message_body) VALUES (?)")
            .bind(body)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        debug!("Enqueued order notification {}", message_id);
        Ok(message_id)
    }

    /// Number of messages waiting
    pub async fn depth(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_notification_queue")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Remove and return up to `batch_size` of the oldest messages
    async fn take_batch(&self) -> Result<Vec<QueueMessage>> {
        let rows: Vec<(i64, Option<Vec<u8>>)> = sqlx::query_as(
            r#"
            DELETE FROM order_notification_queue
            WHERE message_id IN (
                SELECT message_id FROM order_notification_queue
                ORDER BY message_id
                LIMIT ?
            )
            RETURNING message_id, message_body
            "#,
        )
        .bind(self.batch_size)
        .fetch_all(&self.pool)
        .await?;

        let mut messages: Vec<QueueMessage> = rows
            .into_iter()
            .map(|(message_id, message_body)| QueueMessage::new(message_id, message_body))
            .collect();
        // RETURNING order is unspecified
        messages.sort_by_key(|m| m.message_id);

        Ok(messages)
    }
}

#[async_trait]
impl OrderQueue for SqliteOrderQueue {
    async fn receive(&self, timeout: Duration) -> Result<Vec<QueueMessage>> {
        let deadline = Instant::now() + timeout;

        loop {
            let batch = self.take_batch().await?;
            if !batch.is_empty() {
                debug!("Received {} order notifications", batch.len());
                return Ok(batch);
            }

            let now = Instant::now();
            if now >= deadline {
                trace!("Receive timed out after {:?}", timeout);
                return Ok(batch);
            }

            sleep(self.poll_step.min(deadline - now)).await;
        }
    }
}
