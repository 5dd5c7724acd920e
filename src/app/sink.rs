// logwhence - app/sink.rs
//
// Reference ingestion sinks.
//
//   - `JsonLinesSink` appends one JSON object per event to a file. Several
//     adapters may share it; the file is flushed and closed when the last
//     registration is shut down.
//   - `MemorySink` keeps events in memory and counts lifecycle calls. It can
//     be built to refuse registration, for exercising the failed-start path.
//
// Both tolerate writes that arrive after shutdown: they are dropped.

use crate::core::model::LogEvent;
use crate::core::sink::{IngestionSink, SinkHandle};
use crate::util::error::SinkError;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// JSON lines
// =============================================================================

#[derive(Default)]
struct JsonLinesState {
    writer: Option<BufWriter<File>>,
    registrations: usize,
}

/// Appends normalised events to a file as JSON lines.
pub struct JsonLinesSink {
    path: PathBuf,
    state: Mutex<JsonLinesState>,
    next_handle: AtomicU64,
    written: AtomicU64,
}

impl JsonLinesSink {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            state: Mutex::new(JsonLinesState::default()),
            next_handle: AtomicU64::new(1),
            written: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Events successfully written so far.
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }
}

impl IngestionSink for JsonLinesSink {
    fn start(&self, log_system: &'static str) -> Result<SinkHandle, SinkError> {
        let mut state = lock(&self.state);
        if state.writer.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|e| SinkError::Io {
                    path: self.path.clone(),
                    source: e,
                })?;
            state.writer = Some(BufWriter::new(file));
            tracing::info!(path = %self.path.display(), "JSON lines sink opened");
        }
        state.registrations += 1;
        let handle = SinkHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(log_system, handle = handle.id(), "Sink registration");
        Ok(handle)
    }

    fn write(&self, _handle: &SinkHandle, event: LogEvent) {
        let mut state = lock(&self.state);
        let Some(writer) = state.writer.as_mut() else {
            return;
        };
        let result = serde_json::to_writer(&mut *writer, &event)
            .map_err(std::io::Error::from)
            .and_then(|()| writer.write_all(b"\n"));
        match result {
            Ok(()) => {
                self.written.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to write event");
            }
        }
    }

    fn shutdown(&self, handle: SinkHandle) {
        let mut state = lock(&self.state);
        state.registrations = state.registrations.saturating_sub(1);
        tracing::debug!(handle = handle.id(), remaining = state.registrations, "Sink release");
        if state.registrations > 0 {
            return;
        }
        if let Some(mut writer) = state.writer.take() {
            if let Err(e) = writer.flush() {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to flush sink");
            }
        }
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Collects events in memory.
#[derive(Default)]
pub struct MemorySink {
    fail_start: bool,
    events: Mutex<Vec<LogEvent>>,
    start_attempts: AtomicUsize,
    shutdowns: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `start` always fails.
    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<LogEvent> {
        lock(&self.events).clone()
    }

    pub fn start_attempts(&self) -> usize {
        self.start_attempts.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl IngestionSink for MemorySink {
    fn start(&self, log_system: &'static str) -> Result<SinkHandle, SinkError> {
        let attempt = self.start_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_start {
            return Err(SinkError::Unavailable {
                reason: format!("memory sink configured to refuse {log_system}"),
            });
        }
        Ok(SinkHandle::new(attempt as u64))
    }

    fn write(&self, _handle: &SinkHandle, event: LogEvent) {
        lock(&self.events).push(event);
    }

    fn shutdown(&self, _handle: SinkHandle) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
