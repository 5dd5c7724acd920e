// logwhence - core/sink.rs
//
// The ingestion boundary. Adapters hand normalised events across this
// trait; persistence, queueing and transmission live behind it.

use crate::core::model::LogEvent;
use crate::util::error::SinkError;

/// Opaque registration token returned by [`IngestionSink::start`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SinkHandle(u64);

impl SinkHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Consumer of normalised log events.
///
/// `write` and `shutdown` are fire-and-forget: whatever goes wrong behind
/// them is the sink's to report, never the caller's to handle.
pub trait IngestionSink: Send + Sync {
    /// Register a log system with the sink.
    fn start(&self, log_system: &'static str) -> Result<SinkHandle, SinkError>;

    /// Accept one event.
    fn write(&self, handle: &SinkHandle, event: LogEvent);

    /// Release the registration and flush what the sink has buffered.
    fn shutdown(&self, handle: SinkHandle);
}
