//! Ingest abstraction
//!
//! Overview
//! --------
//! Minimal trait representing a source of messages for the forwarder.
//! Concrete implementations include Amazon SQS.

use bytes::Bytes;

#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub id: String,
    pub body: Bytes,
    /// Opaque handle required to acknowledge this specific delivery
    /// (the SQS receipt handle).
    pub lock_token: String,
}

/// One pending acknowledgment: added only after a message's full
/// decode + emit pipeline committed without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckEntry {
    pub id: String,
    pub lock_token: String,
}

impl From<&QueueMessage> for AckEntry {
    fn from(msg: &QueueMessage) -> Self {
        Self {
            id: msg.id.clone(),
            lock_token: msg.lock_token.clone(),
        }
    }
}

#[async_trait::async_trait]
pub trait MessageSource {
    type Error;

    /// Fetch the next batch of messages. An empty vec is the normal idle
    /// result, not an error.
    async fn fetch(&self) -> Result<Vec<QueueMessage>, Self::Error>;

    /// Acknowledge successful processing with exactly one underlying
    /// batch-delete call. Must be a no-op (no transport call) when
    /// `entries` is empty. Never splits or retries internally.
    async fn ack_batch(&self, entries: &[AckEntry]) -> Result<(), Self::Error>;
}
