// logwhence - adapters/log4j.rs
//
// log4j 1.x integration.
//
// log4j hands appenders a `LoggingEvent`. Its throwable may arrive as an
// object or only as its string representation (one entry per trace line).
// Location information is computed lazily by log4j, so it is present only
// when the host already paid for it; its line number is a string and "?"
// means "not available".

use crate::adapters::{attribute, FrameworkAdapter, NativeLevel, SinkBinding};
use crate::core::locator::StackSource;
use crate::core::model::{LogEvent, Severity, SkipPolicy, SourceLocation, ThreadInfo, Throwable};
use crate::core::sink::IngestionSink;
use crate::core::trace;
use crate::platform::stack::LiveStack;
use crate::util::constants::{DEFAULT_LOG4J_SKIP_FRAMES, LOG4J_EXCLUSION_PREFIXES, LOG4J_SYSTEM};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// log4j's "not available" marker in location fields.
const NA: &str = "?";

/// log4j 1.x levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Log4jLevel {
    Off,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    All,
    /// A `Level` subclass defined by the application.
    Custom { name: String, value: i32 },
}

impl Log4jLevel {
    /// log4j's integer level value.
    pub fn value(&self) -> i32 {
        match self {
            Self::Off => i32::MAX,
            Self::Fatal => 50_000,
            Self::Error => 40_000,
            Self::Warn => 30_000,
            Self::Info => 20_000,
            Self::Debug => 10_000,
            Self::Trace => 5_000,
            Self::All => i32::MIN,
            Self::Custom { value, .. } => *value,
        }
    }
}

impl NativeLevel for Log4jLevel {
    fn severity(&self) -> Severity {
        match self {
            Self::Fatal => Severity::Critical,
            Self::Error => Severity::Error,
            Self::Warn => Severity::Warning,
            Self::Info => Severity::Information,
            Self::Debug | Self::Trace => Severity::Verbose,
            Self::Off | Self::All | Self::Custom { .. } => Severity::Unknown,
        }
    }

    fn is_off(&self) -> bool {
        matches!(self, Self::Off)
    }
}

/// Call site captured by log4j.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationInfo {
    pub class_name: Option<String>,
    pub method_name: Option<String>,
    pub file_name: Option<String>,
    /// Decimal line number, or "?".
    pub line_number: Option<String>,
}

impl LocationInfo {
    pub fn to_source_location(&self) -> SourceLocation {
        let line = available(&self.line_number)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0);
        SourceLocation::new(
            available(&self.method_name),
            available(&self.class_name),
            available(&self.file_name),
            line,
        )
    }
}

fn available(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| *s != NA)
}

/// log4j's native event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingEvent {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub level: Log4jLevel,
    pub logger_name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub thread_name: Option<String>,
    #[serde(default)]
    pub throwable: Option<Throwable>,
    /// Throwable as transported by log4j: one string per trace line.
    #[serde(default)]
    pub throwable_str_rep: Option<Vec<String>>,
    #[serde(default)]
    pub location_info: Option<LocationInfo>,
    /// MDC properties.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl LoggingEvent {
    pub fn new(level: Log4jLevel, logger_name: &str, message: &str) -> Self {
        Self {
            timestamp: None,
            level,
            logger_name: logger_name.to_string(),
            message: message.to_string(),
            thread_name: None,
            throwable: None,
            throwable_str_rep: None,
            location_info: None,
            properties: BTreeMap::new(),
        }
    }

    /// The event's throwable, rebuilt from its string form if needed.
    pub fn throwable(&self) -> Option<Throwable> {
        self.throwable.clone().or_else(|| {
            self.throwable_str_rep
                .as_deref()
                .and_then(trace::parse_lines)
        })
    }
}

/// Appender that forwards log4j events to an ingestion sink.
pub struct Log4jAdapter {
    binding: SinkBinding,
    policy: SkipPolicy,
    stack: Arc<dyn StackSource>,
}

impl Log4jAdapter {
    pub fn new(sink: Arc<dyn IngestionSink>) -> Self {
        Self::with_policy(sink, Self::default_policy())
    }

    pub fn with_policy(sink: Arc<dyn IngestionSink>, policy: SkipPolicy) -> Self {
        Self {
            binding: SinkBinding::new(sink, LOG4J_SYSTEM),
            policy,
            stack: Arc::new(LiveStack),
        }
    }

    /// Replace the live stack with another source.
    pub fn with_stack(mut self, stack: Arc<dyn StackSource>) -> Self {
        self.stack = stack;
        self
    }

    pub fn default_policy() -> SkipPolicy {
        SkipPolicy::framework_default(DEFAULT_LOG4J_SKIP_FRAMES, LOG4J_EXCLUSION_PREFIXES)
    }

    pub fn policy(&self) -> &SkipPolicy {
        &self.policy
    }
}

impl FrameworkAdapter for Log4jAdapter {
    type Event = LoggingEvent;

    fn binding(&self) -> &SinkBinding {
        &self.binding
    }

    fn is_filtered(&self, event: &LoggingEvent) -> bool {
        event.level.is_off()
    }

    fn normalize(&self, event: &LoggingEvent) -> Option<LogEvent> {
        if self.is_filtered(event) {
            return None;
        }
        let throwable = event.throwable();
        let explicit = event
            .location_info
            .as_ref()
            .map(LocationInfo::to_source_location);
        let source_location = attribute(explicit, &self.policy, throwable.as_ref(), self.stack.as_ref());

        Some(LogEvent {
            timestamp: event.timestamp.unwrap_or_else(Utc::now),
            severity: event.level.severity(),
            source_location,
            log_system: LOG4J_SYSTEM,
            logger_name: event.logger_name.clone(),
            message: event.message.clone(),
            throwable,
            thread_info: ThreadInfo::from_parts(event.thread_name.as_deref(), None),
            properties: event.properties.clone(),
        })
    }
}
