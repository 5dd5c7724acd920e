// logwhence - lib.rs
//
// Library entry point. Host applications embed the adapters directly; the
// `logwhence` binary uses the same surface to replay captured events.

pub mod adapters;
pub mod app;
pub mod core;
pub mod platform;
pub mod util;

pub use crate::adapters::{AdapterState, FrameworkAdapter};
pub use crate::core::model::{LogEvent, Severity, SkipPolicy, SourceLocation};
pub use crate::core::sink::{IngestionSink, SinkHandle};
