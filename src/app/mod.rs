//! App runtime: the poll → decode → emit → acknowledge cycle.
//!
//! One loop instance drains one queue. Cycles are strictly sequential: a
//! new fetch never starts before the prior cycle's acknowledge call has
//! resolved. Within a cycle, `concurrent` mode processes messages as
//! independent tasks bounded by the batch size; the single batch delete
//! fires only once every task has resolved, regardless of completion
//! order.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::signal;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::emit::RecordSink;
use crate::errors::ForwarderError;
use crate::ingest::{AckEntry, MessageSource, QueueMessage};
use crate::transform::Decoder;

#[derive(Debug, Clone, Copy, Default)]
pub struct PollOptions {
    /// Emit each decoded record individually instead of one record per
    /// message.
    pub batched: bool,
    /// Process the messages of one cycle as independent tasks.
    pub concurrent: bool,
}

/// Per-cycle accounting, mostly for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub fetched: usize,
    pub emitted: usize,
    pub acked: usize,
    pub ack_failed: bool,
}

/// Run the poll loop until shutdown is requested. Fetch failures back off
/// briefly and continue; there is no fatal error path in normal operation.
pub async fn run<S, K>(
    source: S,
    decoder: Option<Arc<dyn Decoder>>,
    sink: K,
    opts: PollOptions,
) -> Result<(), ForwarderError>
where
    S: MessageSource<Error = ForwarderError> + Send + Sync + 'static,
    K: RecordSink,
{
    info!("poll loop starting");
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("shutdown requested; stopping poll loop");
                break;
            }
            cycle = poll_once(&source, decoder.clone(), &sink, &opts) => {
                match cycle {
                    Ok(stats) if stats.fetched > 0 => {
                        debug!(
                            fetched = stats.fetched,
                            emitted = stats.emitted,
                            acked = stats.acked,
                            "cycle complete"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(error = %e, "fetch failed");
                        tokio::time::sleep(Duration::from_millis(200)).await;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Drive one fetch-process-acknowledge cycle. Returns `Err` only for a
/// fetch-time transport failure; decode, emit, and acknowledge failures
/// are logged and absorbed, leaving the affected messages to redeliver.
pub async fn poll_once<S, K>(
    source: &S,
    decoder: Option<Arc<dyn Decoder>>,
    sink: &K,
    opts: &PollOptions,
) -> Result<CycleStats, ForwarderError>
where
    S: MessageSource<Error = ForwarderError>,
    K: RecordSink,
{
    let messages = source.fetch().await?;
    let mut stats = CycleStats {
        fetched: messages.len(),
        ..Default::default()
    };
    if messages.is_empty() {
        return Ok(stats);
    }
    debug!(count = messages.len(), "received messages");

    let entries = if opts.concurrent {
        process_concurrent(messages, decoder, sink, opts.batched, &mut stats).await
    } else {
        process_sequential(messages, decoder.as_deref(), sink, opts.batched, &mut stats).await
    };
    let entries = dedup_entries(entries);

    match source.ack_batch(&entries).await {
        Ok(()) => {
            stats.acked = entries.len();
            if !entries.is_empty() {
                debug!(count = entries.len(), "removed messages from queue");
            }
        }
        Err(e) => {
            stats.ack_failed = true;
            error!(
                error = %e,
                count = entries.len(),
                "batch ack failed; messages will redeliver after visibility timeout"
            );
        }
    }
    Ok(stats)
}

async fn process_sequential<K: RecordSink>(
    messages: Vec<QueueMessage>,
    decoder: Option<&dyn Decoder>,
    sink: &K,
    batched: bool,
    stats: &mut CycleStats,
) -> Vec<AckEntry> {
    let mut entries = Vec::with_capacity(messages.len());
    for msg in &messages {
        match process_message(msg, decoder, sink, batched).await {
            Ok(emitted) => {
                stats.emitted += emitted;
                entries.push(AckEntry::from(msg));
            }
            Err(e) => error!(msg_id = %msg.id, error = %e, "message failed; left for redelivery"),
        }
    }
    entries
}

/// Countdown gate: every message gets its own task, and draining the
/// `JoinSet` only completes once all of them have resolved, in whatever
/// order they finish. Concurrency is bounded by the cycle's batch size.
async fn process_concurrent<K: RecordSink>(
    messages: Vec<QueueMessage>,
    decoder: Option<Arc<dyn Decoder>>,
    sink: &K,
    batched: bool,
    stats: &mut CycleStats,
) -> Vec<AckEntry> {
    let mut join = JoinSet::new();
    for msg in messages {
        let decoder = decoder.clone();
        let sink = sink.clone();
        join.spawn(async move {
            let res = process_message(&msg, decoder.as_deref(), &sink, batched).await;
            (msg, res)
        });
    }

    let mut entries = Vec::new();
    while let Some(joined) = join.join_next().await {
        match joined {
            Ok((msg, Ok(emitted))) => {
                stats.emitted += emitted;
                entries.push(AckEntry::from(&msg));
            }
            Ok((msg, Err(e))) => {
                error!(msg_id = %msg.id, error = %e, "message failed; left for redelivery")
            }
            Err(e) => error!(error = %e, "task join error"),
        }
    }
    entries
}

/// Attempt one message's full pipeline; any error leaves it unacked.
/// Returns the number of records emitted (zero decoded records is still
/// success).
async fn process_message<K: RecordSink>(
    msg: &QueueMessage,
    decoder: Option<&dyn Decoder>,
    sink: &K,
    batched: bool,
) -> Result<usize, ForwarderError> {
    let outputs: Vec<Bytes> = match decoder {
        Some(d) => {
            let records = d.decode(&msg.body).await?;
            if batched {
                records
            } else if records.is_empty() {
                Vec::new()
            } else {
                vec![join_records(&records)]
            }
        }
        None => vec![msg.body.clone()],
    };

    for record in &outputs {
        sink.emit(record.clone()).await?;
    }
    Ok(outputs.len())
}

fn join_records(records: &[Bytes]) -> Bytes {
    let mut joined = Vec::with_capacity(records.iter().map(|r| r.len() + 1).sum());
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            joined.push(b'\n');
        }
        joined.extend_from_slice(record);
    }
    Bytes::from(joined)
}

/// A redelivered duplicate inside one batch must not produce a duplicate
/// delete entry; first receipt wins.
fn dedup_entries(entries: Vec<AckEntry>) -> Vec<AckEntry> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .into_iter()
        .filter(|e| seen.insert(e.id.clone()))
        .collect()
}
