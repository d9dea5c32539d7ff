//! Error types for sqs-forwarder
//!
//! Overview
//! --------
//! Canonical error enumeration used across ingestion, transform, and emit
//! layers. Keep variants stable and descriptive; prefer mapping external
//! libraries into these variants at module boundaries.
//!
//! Usage
//! -----
//! - Convert low-level errors at the edge (e.g., SQS/flate2/serde_json).
//! - Avoid leaking third-party error types across crate boundaries.
//!
//! Concurrency / Logging
//! ---------------------
//! Errors are `Send + Sync` and implement Display via `thiserror`.
//! Use `tracing` for context at call sites (`error!(...);`).
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForwarderError {
    #[error("configuration error: {0}")]
    Config(String),

    /// Receive-side transport failure (the SQS receive call itself).
    #[error("queue transport error: {0}")]
    Transport(String),

    /// Failed to decompress or parse an inbound payload.
    #[error("payload decode error: {0}")]
    Decode(String),

    /// The sink rejected or failed to write an output record.
    #[error("record emit error: {0}")]
    Emit(String),

    /// Batch delete (acknowledge) failure; affected messages redeliver
    /// after their visibility timeout.
    #[error("acknowledge error: {0}")]
    Ack(String),

    #[error("unknown error: {0}")]
    Unknown(#[from] Box<dyn std::error::Error + Send + Sync>),
}
