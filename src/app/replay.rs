// logwhence - app/replay.rs
//
// Replay captured native events through the adapters.
//
// Input is JSON lines, one captured event per line:
//
//   {"framework": "log4j2", "event": { ...native log4j2 event... }}
//
// A replayed event has no live call site of its own, so adapters run over an
// empty stack: events without an explicit location or throwable are
// attributed to the unknown location rather than to this tool.
//
// Malformed lines are recorded (capped) and skipped; only failing to open
// or read the input, or to start the output sink, aborts a replay.

use crate::adapters::{log4j, log4j2, logback, FrameworkAdapter};
use crate::adapters::{AdapterState, Log4j2Adapter, Log4jAdapter, LogbackAdapter};
use crate::app::sink::JsonLinesSink;
use crate::core::locator::{FixedStack, StackSource};
use crate::core::sink::IngestionSink;
use crate::platform::config::AppConfig;
use crate::util::constants::{MAX_REPLAY_LINE_BYTES, MAX_REPORTED_REPLAY_ERRORS};
use crate::util::error::ReplayError;
use serde::Deserialize;
use std::io::{BufRead, Read};
use std::path::Path;
use std::sync::Arc;

/// One line of a captured-event file.
#[derive(Debug, Deserialize)]
#[serde(tag = "framework", content = "event", rename_all = "lowercase")]
pub enum CapturedEvent {
    Log4j(log4j::LoggingEvent),
    Log4j2(log4j2::Log4jLogEvent),
    Logback(logback::LoggingEvent),
}

/// Outcome of a replay run.
#[derive(Debug, Default)]
pub struct ReplaySummary {
    /// Non-empty lines read.
    pub lines: u64,
    /// Lines that parsed and were handed to an adapter.
    pub dispatched: u64,
    /// Lines that failed to parse.
    pub malformed: u64,
    /// The first `MAX_REPORTED_REPLAY_ERRORS` parse failures.
    pub errors: Vec<ReplayError>,
}

/// One adapter per supported framework, sharing a sink.
pub struct AdapterSet {
    pub log4j: Log4jAdapter,
    pub log4j2: Log4j2Adapter,
    pub logback: LogbackAdapter,
}

impl AdapterSet {
    pub fn new(sink: Arc<dyn IngestionSink>, config: &AppConfig, stack: Arc<dyn StackSource>) -> Self {
        Self {
            log4j: Log4jAdapter::with_policy(sink.clone(), config.log4j.clone())
                .with_stack(stack.clone()),
            log4j2: Log4j2Adapter::with_policy(sink.clone(), config.log4j2.clone())
                .with_stack(stack.clone()),
            logback: LogbackAdapter::with_policy(sink, config.logback.clone()).with_stack(stack),
        }
    }

    pub fn dispatch(&self, event: &CapturedEvent) {
        match event {
            CapturedEvent::Log4j(e) => self.log4j.append(Some(e)),
            CapturedEvent::Log4j2(e) => self.log4j2.append(Some(e)),
            CapturedEvent::Logback(e) => self.logback.append(Some(e)),
        }
    }

    /// Start all three; true only if every one started.
    pub fn start(&self) -> bool {
        [self.log4j.start(), self.log4j2.start(), self.logback.start()]
            .iter()
            .all(|s| *s == AdapterState::Started)
    }

    pub fn stop(&self) {
        self.log4j.stop();
        self.log4j2.stop();
        self.logback.stop();
    }
}

/// Read one line into `buf`, holding at most `max + 1` bytes of it.
///
/// Returns the line's full length without its terminator, or `None` at end
/// of input. When the length exceeds `max` the rest of the line is consumed
/// and discarded, and `buf` holds only its head.
fn read_capped_line<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max: usize,
) -> std::io::Result<Option<usize>> {
    buf.clear();
    let read = reader.by_ref().take(max as u64 + 1).read_until(b'\n', buf)?;
    if read == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        return Ok(Some(buf.len()));
    }
    let mut length = buf.len();
    if length <= max {
        return Ok(Some(length));
    }
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            break;
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(i) => {
                length += i;
                reader.consume(i + 1);
                break;
            }
            None => {
                let n = available.len();
                length += n;
                reader.consume(n);
            }
        }
    }
    Ok(Some(length))
}

/// Feed every line of `reader` through `adapters`.
pub fn replay<R: BufRead>(mut reader: R, adapters: &AdapterSet) -> Result<ReplaySummary, std::io::Error> {
    let mut summary = ReplaySummary::default();
    let mut buf = Vec::new();
    let mut line_number = 0u64;

    while let Some(length) = read_capped_line(&mut reader, &mut buf, MAX_REPLAY_LINE_BYTES)? {
        line_number += 1;
        if length <= MAX_REPLAY_LINE_BYTES && buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        summary.lines += 1;

        let parsed = if length > MAX_REPLAY_LINE_BYTES {
            Err(ReplayError::LineTooLong {
                line_number,
                length,
                max_length: MAX_REPLAY_LINE_BYTES,
            })
        } else {
            serde_json::from_slice::<CapturedEvent>(&buf).map_err(|e| ReplayError::Json {
                line_number,
                source: e,
            })
        };

        match parsed {
            Ok(event) => {
                adapters.dispatch(&event);
                summary.dispatched += 1;
            }
            Err(e) => {
                summary.malformed += 1;
                tracing::debug!(error = %e, "Skipping captured event");
                if summary.errors.len() < MAX_REPORTED_REPLAY_ERRORS {
                    summary.errors.push(e);
                }
            }
        }
    }

    Ok(summary)
}

/// Replay `input` into a JSON lines file at `output`.
///
/// Returns the summary and the number of events the sink wrote.
pub fn replay_file(
    input: &Path,
    output: &Path,
    config: &AppConfig,
) -> Result<(ReplaySummary, u64), ReplayError> {
    let file = std::fs::File::open(input).map_err(|e| ReplayError::Io {
        path: input.to_path_buf(),
        source: e,
    })?;

    let sink = Arc::new(JsonLinesSink::new(output));
    let adapters = AdapterSet::new(sink.clone(), config, Arc::new(FixedStack::default()));
    if !adapters.start() {
        adapters.stop();
        return Err(ReplayError::OutputUnavailable {
            path: output.to_path_buf(),
        });
    }

    let result = replay(std::io::BufReader::new(file), &adapters);
    adapters.stop();
    let summary = result.map_err(|e| ReplayError::Io {
        path: input.to_path_buf(),
        source: e,
    })?;

    tracing::info!(
        lines = summary.lines,
        dispatched = summary.dispatched,
        malformed = summary.malformed,
        written = sink.written(),
        "Replay complete"
    );
    Ok((summary, sink.written()))
}
