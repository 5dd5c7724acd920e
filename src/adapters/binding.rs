// logwhence - adapters/binding.rs
//
// Per-adapter lifecycle and ingestion handle.
//
// Uninitialized -> Started -> (Failed | Stopped), plus Uninitialized -> Stopped.
//
// The start transition runs at most once per binding: `OnceLock` admits one
// initialiser and every other thread blocks until the outcome is settled,
// then reads the same result. A failed start is permanent. Stop is an atomic
// flag; the sink handle is released exactly once whichever of `stop` and a
// racing first `start` finishes last.

use crate::adapters::AdapterState;
use crate::core::model::LogEvent;
use crate::core::sink::{IngestionSink, SinkHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Connection between one adapter instance and its ingestion sink.
pub struct SinkBinding {
    sink: Arc<dyn IngestionSink>,
    log_system: &'static str,
    /// Unset: not attempted. `Some(None)`: start failed. `Some(Some)`: started.
    handle: OnceLock<Option<SinkHandle>>,
    stopped: AtomicBool,
    released: AtomicBool,
}

impl SinkBinding {
    pub fn new(sink: Arc<dyn IngestionSink>, log_system: &'static str) -> Self {
        Self {
            sink,
            log_system,
            handle: OnceLock::new(),
            stopped: AtomicBool::new(false),
            released: AtomicBool::new(false),
        }
    }

    pub fn log_system(&self) -> &'static str {
        self.log_system
    }

    pub fn state(&self) -> AdapterState {
        if self.stopped.load(Ordering::Acquire) {
            return AdapterState::Stopped;
        }
        match self.handle.get() {
            None => AdapterState::Uninitialized,
            Some(None) => AdapterState::Failed,
            Some(Some(_)) => AdapterState::Started,
        }
    }

    /// Register with the sink if that has not been attempted yet.
    pub fn start(&self) -> AdapterState {
        self.ensure_started();
        self.state()
    }

    /// Forward one event; dropped unless the binding is started.
    pub fn write(&self, event: LogEvent) {
        if let Some(handle) = self.ensure_started() {
            self.sink.write(handle, event);
        }
    }

    /// Transition to Stopped and release the sink handle. Idempotent.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::debug!(log_system = self.log_system, "Adapter stopping");
        self.release();
    }

    /// The live handle, starting the sink on first use.
    pub(crate) fn ensure_started(&self) -> Option<&SinkHandle> {
        if self.stopped.load(Ordering::Acquire) {
            return None;
        }
        let handle = self.handle.get_or_init(|| match self.sink.start(self.log_system) {
            Ok(handle) => {
                tracing::debug!(
                    log_system = self.log_system,
                    handle = handle.id(),
                    "Ingestion sink started"
                );
                Some(handle)
            }
            Err(e) => {
                tracing::warn!(
                    log_system = self.log_system,
                    error = %e,
                    "Ingestion sink failed to start; events from this adapter will be dropped"
                );
                None
            }
        });
        // A stop that raced with the first start wins.
        if self.stopped.load(Ordering::Acquire) {
            self.release();
            return None;
        }
        handle.as_ref()
    }

    fn release(&self) {
        if let Some(Some(handle)) = self.handle.get() {
            if !self.released.swap(true, Ordering::AcqRel) {
                self.sink.shutdown(handle.clone());
            }
        }
    }
}

impl std::fmt::Debug for SinkBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkBinding")
            .field("log_system", &self.log_system)
            .field("state", &self.state())
            .finish()
    }
}
