//! Event source infrastructure.
//!
//! Implements the [`jobs::EventSource`] trait for newline-delimited JSON
//! streams and provides [`run`], the loop that feeds each event to a
//! [`jobs::Dispatcher`].
//!
//! Each line is one event, in either of two shapes:
//!
//! - a GitHub webhook body, passed through unchanged;
//! - a message-bus message, recognized by a top-level string `topic` field.
//!   The topic is lifted into [`jobs::InboundEvent::topic`] so the dispatcher
//!   can drop uninteresting topics before classifying anything.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport details and message framing live here. The
//! [`jobs`] crate sees only [`jobs::EventSource`] and [`jobs::InboundEvent`].

use async_trait::async_trait;
use jobs::{Dispatcher, EventSource, InboundEvent, RawEvent, Timestamp, Topic};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, error, info, warn};

/// Errors produced while reading events.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The underlying stream could not be read.
    #[error("Failed to read event stream: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// JSON lines source
// ---------------------------------------------------------------------------

/// Reads one JSON event per line from an async reader.
///
/// Blank lines are skipped. Lines that are not valid JSON are logged and
/// skipped; they never end the stream.
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line_number: u64,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> EventSource for JsonLinesSource<R> {
    type Error = ListenerError;

    async fn next_event(&mut self) -> Result<Option<InboundEvent>, ListenerError> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_number += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_line(line) {
                Ok(event) => return Ok(Some(event)),
                Err(e) => {
                    warn!(line = self.line_number, error = %e, "Skipping malformed event");
                }
            }
        }
        Ok(None)
    }
}

/// Parses one serialized event and lifts a bus topic out of it, if present.
pub fn parse_line(text: &str) -> Result<InboundEvent, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let topic = value
        .get("topic")
        .and_then(serde_json::Value::as_str)
        .and_then(Topic::new);
    Ok(InboundEvent {
        payload: RawEvent::new(value),
        topic,
        received_at: Timestamp::now(),
    })
}

// ---------------------------------------------------------------------------
// Processing loop
// ---------------------------------------------------------------------------

/// Counts of events handled by [`run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: u64,
    pub failed: u64,
}

/// Feeds every event from `source` to `dispatcher`, one at a time.
///
/// A failed event is logged and counted; the loop moves on to the next one.
/// Only a failure of the source itself ends the loop early.
pub async fn run<S>(source: &mut S, dispatcher: &Dispatcher) -> Result<RunSummary, S::Error>
where
    S: EventSource,
{
    let mut summary = RunSummary::default();
    while let Some(event) = source.next_event().await? {
        let topic = event.topic.as_ref().map(Topic::as_str);
        debug!(?topic, received_at = %event.received_at, "Event received");
        summary.processed += 1;
        if let Err(e) = dispatcher.process_message(&event.payload, topic).await {
            summary.failed += 1;
            error!(error = %e, ?topic, "Event processing failed");
        }
    }
    info!(
        processed = summary.processed,
        failed = summary.failed,
        "Event source exhausted"
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
