//! Decoder abstraction and the bundled compressed-tree decoder.

use crate::errors::ForwarderError;
use bytes::Bytes;

pub mod flatten;
pub use flatten::TreeDecoder;

/// Turns one raw message payload into zero or more output records.
///
/// Implementations must be deterministic and must never touch queue state;
/// success with an empty record set is still success (the message is
/// acknowledged).
#[async_trait::async_trait]
pub trait Decoder: Send + Sync {
    async fn decode(&self, payload: &Bytes) -> Result<Vec<Bytes>, ForwarderError>;
}
