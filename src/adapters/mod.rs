// logwhence - adapters/mod.rs
//
// Host-framework integrations: log4j, log4j2, logback.
//
// Each adapter receives its framework's native event, pulls out the
// throwable, any call site the framework already captured, and the native
// level, and turns them into a normalised `LogEvent`. The three share a
// contract (`FrameworkAdapter`) and nothing else: no common state, no
// common base type.

pub mod binding;
pub mod log4j;
pub mod log4j2;
pub mod logback;

use crate::core::locator::{self, StackSource};
use crate::core::model::{LogEvent, Severity, SkipPolicy, SourceLocation, Throwable};

pub use binding::SinkBinding;
pub use log4j::Log4jAdapter;
pub use log4j2::Log4j2Adapter;
pub use logback::LogbackAdapter;

/// Lifecycle of one adapter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Uninitialized,
    Started,
    Failed,
    Stopped,
}

/// A framework's native level, mapped onto the unified scale.
///
/// The mapping is total: levels outside the framework's standard table
/// (custom or synthetic ones) map to `Severity::Unknown`.
pub trait NativeLevel {
    fn severity(&self) -> Severity;

    /// The framework's "off" sentinel. Filtered before mapping.
    fn is_off(&self) -> bool;
}

/// Produces a normalised source location and severity from a native event.
///
/// Implementors supply `normalize` and their lifecycle binding; start,
/// append and stop follow from those. None of these methods panics or
/// returns an error to the host framework.
pub trait FrameworkAdapter: Send + Sync {
    /// The host framework's event type.
    type Event;

    fn binding(&self) -> &SinkBinding;

    /// True when the event's level is the framework's "off" sentinel.
    fn is_filtered(&self, event: &Self::Event) -> bool;

    /// Build the normalised record, or `None` when the event is filtered.
    /// Pure: no lifecycle involvement.
    fn normalize(&self, event: &Self::Event) -> Option<LogEvent>;

    fn start(&self) -> AdapterState {
        self.binding().start()
    }

    /// Attribute and forward one event. Silently drops the event when the
    /// adapter failed or was stopped, when `event` is `None`, or when its
    /// level is the framework's "off" sentinel.
    fn append(&self, event: Option<&Self::Event>) {
        let Some(event) = event else {
            return;
        };
        // Filtered events never touch the sink, not even to start it.
        if self.is_filtered(event) {
            return;
        }
        if self.binding().ensure_started().is_none() {
            return;
        }
        if let Some(record) = self.normalize(event) {
            self.binding().write(record);
        }
    }

    fn stop(&self) {
        self.binding().stop();
    }

    fn state(&self) -> AdapterState {
        self.binding().state()
    }
}

/// Prefer a call site the host already captured; otherwise locate one.
///
/// An explicit location that is itself entirely unknown carries no
/// information and falls through to the locator.
pub(crate) fn attribute(
    explicit: Option<SourceLocation>,
    policy: &SkipPolicy,
    throwable: Option<&Throwable>,
    stack: &dyn StackSource,
) -> SourceLocation {
    match explicit {
        Some(location) if !location.is_unknown() => location,
        _ => locator::locate(policy, throwable, stack),
    }
}
