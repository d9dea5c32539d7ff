//! sqs-forwarder: worker entrypoint
//!
//! Overview
//! --------
//! Orchestrates the forwarder worker: builds the SQS client, fetches
//! message batches, drives each message through the optional decoder,
//! emits output records to the sink, and batch-acknowledges successfully
//! processed messages.
//!
//! Error Model
//! -----------
//! - Configuration failures are fatal.
//! - Per-message and per-cycle failures are logged and do not terminate
//!   the loop; unacked messages redeliver after their visibility timeout.

use std::sync::Arc;

use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sqs_forwarder::app::{self, PollOptions};
use sqs_forwarder::config::load_config;
use sqs_forwarder::emit::StdoutSink;
use sqs_forwarder::errors::ForwarderError;
use sqs_forwarder::sqs::{create_sqs_client, SqsQueueSource};
use sqs_forwarder::transform::{Decoder, TreeDecoder};

pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .with(ErrorLayer::default())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    init_logging(config.verbose);
    info!(queue_url = %config.queue_url, "forwarder starting");

    let client = create_sqs_client(config.region.as_deref()).await;
    let source = SqsQueueSource::new(client, &config.queue_url).with_limits(
        config.max_messages,
        config.visibility_timeout_secs,
        config.wait_time_secs,
    );

    let decoder: Option<Arc<dyn Decoder>> = match config.decoder.as_deref() {
        None => None,
        Some("tree") => Some(Arc::new(TreeDecoder::with_delimiter(&config.tree_delimiter))),
        Some(other) => {
            return Err(ForwarderError::Config(format!("unknown decoder {other:?}")).into())
        }
    };

    let opts = PollOptions {
        batched: config.batched,
        concurrent: config.concurrent,
    };

    app::run(source, decoder, StdoutSink, opts).await?;
    Ok(())
}
