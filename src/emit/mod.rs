//! Record sinks
//!
//! Overview
//! --------
//! A sink accepts one output record at a time; failures are per-record and
//! never fatal to the poll cycle. The bundled `StdoutSink` writes each
//! record as one line, matching the modular-input convention of handing
//! events to the host process over stdout.

use crate::errors::ForwarderError;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;

#[async_trait::async_trait]
pub trait RecordSink: Clone + Send + Sync + 'static {
    async fn emit(&self, record: Bytes) -> Result<(), ForwarderError>;
}

#[derive(Clone, Default)]
pub struct StdoutSink;

#[async_trait::async_trait]
impl RecordSink for StdoutSink {
    async fn emit(&self, record: Bytes) -> Result<(), ForwarderError> {
        let mut out = tokio::io::stdout();
        out.write_all(&record)
            .await
            .map_err(|e| ForwarderError::Emit(e.to_string()))?;
        out.write_all(b"\n")
            .await
            .map_err(|e| ForwarderError::Emit(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| ForwarderError::Emit(e.to_string()))?;
        Ok(())
    }
}
