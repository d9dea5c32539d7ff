//! Amazon SQS integration (single client constructed at startup)

use crate::errors::ForwarderError;
use crate::ingest::{AckEntry, MessageSource, QueueMessage};
use aws_config::BehaviorVersion;
use aws_sdk_sqs::config::Region;
use aws_sdk_sqs::types::DeleteMessageBatchRequestEntry;
use aws_sdk_sqs::Client;
use bytes::Bytes;
use tracing::{error, warn};

/// Build an SQS client from environment (AWS_* vars, default credential
/// chain). The chain handles credential rotation, so one client per
/// process lifetime is enough.
pub async fn create_sqs_client(region: Option<&str>) -> Client {
    dotenvy::dotenv().ok();
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    let cfg = loader.load().await;
    Client::new(&cfg)
}

#[derive(Clone)]
pub struct SqsQueueSource {
    client: Client,
    queue_url: String,
    max_messages: i32,
    visibility_timeout: i32,
    wait_time_seconds: i32,
}

impl SqsQueueSource {
    pub fn new(client: Client, queue_url: &str) -> Self {
        Self {
            client,
            queue_url: queue_url.to_string(),
            max_messages: 6,
            visibility_timeout: 60,
            wait_time_seconds: 3,
        }
    }

    /// Override the fetch bounds: batch size, per-fetch lock duration, and
    /// server-side long-poll budget (all in seconds except the count).
    pub fn with_limits(
        mut self,
        max_messages: i32,
        visibility_timeout: i32,
        wait_time_seconds: i32,
    ) -> Self {
        self.max_messages = max_messages;
        self.visibility_timeout = visibility_timeout;
        self.wait_time_seconds = wait_time_seconds;
        self
    }
}

#[async_trait::async_trait]
impl MessageSource for SqsQueueSource {
    type Error = ForwarderError;

    async fn fetch(&self) -> Result<Vec<QueueMessage>, Self::Error> {
        let resp = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(self.max_messages)
            .visibility_timeout(self.visibility_timeout)
            .wait_time_seconds(self.wait_time_seconds)
            .send()
            .await
            .map_err(|e| ForwarderError::Transport(e.to_string()))?;

        let mut out = Vec::new();
        for msg in resp.messages.unwrap_or_default() {
            match (msg.message_id, msg.receipt_handle) {
                (Some(id), Some(lock_token)) => out.push(QueueMessage {
                    id,
                    body: Bytes::from(msg.body.unwrap_or_default().into_bytes()),
                    lock_token,
                }),
                _ => warn!("dropping message without id or receipt handle"),
            }
        }
        Ok(out)
    }

    async fn ack_batch(&self, entries: &[AckEntry]) -> Result<(), Self::Error> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut req = self
            .client
            .delete_message_batch()
            .queue_url(&self.queue_url);
        for entry in entries {
            let e = DeleteMessageBatchRequestEntry::builder()
                .id(&entry.id)
                .receipt_handle(&entry.lock_token)
                .build()
                .map_err(|e| ForwarderError::Ack(e.to_string()))?;
            req = req.entries(e);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ForwarderError::Ack(e.to_string()))?;

        // Per-entry failures stay unacked and redeliver; no local retry.
        if !resp.failed.is_empty() {
            error!(
                count = resp.failed.len(),
                "batch delete rejected some entries; they will redeliver"
            );
        }
        Ok(())
    }
}
