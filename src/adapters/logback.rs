// logwhence - adapters/logback.rs
//
// logback integration.
//
// logback has no FATAL level. An ERROR event tagged with the `FATAL` marker
// (the usual SLF4J convention) is treated as Critical. Caller data, when the
// appender asked logback to compute it, is an array of frames whose first
// element is the call site.

use crate::adapters::{attribute, FrameworkAdapter, NativeLevel, SinkBinding};
use crate::core::locator::StackSource;
use crate::core::model::{
    LogEvent, Severity, SkipPolicy, SourceLocation, StackFrame, ThreadInfo, Throwable,
};
use crate::core::sink::IngestionSink;
use crate::platform::stack::LiveStack;
use crate::util::constants::{
    DEFAULT_LOGBACK_SKIP_FRAMES, LOGBACK_EXCLUSION_PREFIXES, LOGBACK_FATAL_MARKER, LOGBACK_SYSTEM,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// logback levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogbackLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    All,
    /// Anything else a bridge reports.
    Custom { name: String, value: i32 },
}

impl LogbackLevel {
    pub fn value(&self) -> i32 {
        match self {
            Self::Off => i32::MAX,
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

impl NativeLevel for LogbackLevel {
    fn severity(&self) -> Severity {
        match self {
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

/// logback's native event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingEvent {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub level: LogbackLevel,
    pub logger_name: String,
    #[serde(default)]
    pub formatted_message: String,
    #[serde(default)]
    pub thread_name: Option<String>,
    #[serde(default)]
    pub throwable_proxy: Option<Throwable>,
    /// Computed call stack, call site first. Empty when not requested.
    #[serde(default)]
    pub caller_data: Vec<StackFrame>,
    #[serde(default)]
    pub markers: Vec<String>,
    #[serde(default)]
    pub mdc: BTreeMap<String, String>,
}

impl LoggingEvent {
    pub fn new(level: LogbackLevel, logger_name: &str, formatted_message: &str) -> Self {
        Self {
            timestamp: None,
            level,
            logger_name: logger_name.to_string(),
            formatted_message: formatted_message.to_string(),
            thread_name: None,
            throwable_proxy: None,
            caller_data: Vec::new(),
            markers: Vec::new(),
            mdc: BTreeMap::new(),
        }
    }

    /// Level severity, with ERROR + `FATAL` marker escalated to Critical.
    pub fn severity(&self) -> Severity {
        let severity = self.level.severity();
        if severity == Severity::Error
            && self
                .markers
                .iter()
                .any(|m| m.eq_ignore_ascii_case(LOGBACK_FATAL_MARKER))
        {
            return Severity::Critical;
        }
        severity
    }
}

/// Appender that forwards logback events to an ingestion sink.
pub struct LogbackAdapter {
    binding: SinkBinding,
    policy: SkipPolicy,
    stack: Arc<dyn StackSource>,
}

impl LogbackAdapter {
    pub fn new(sink: Arc<dyn IngestionSink>) -> Self {
        Self::with_policy(sink, Self::default_policy())
    }

    pub fn with_policy(sink: Arc<dyn IngestionSink>, policy: SkipPolicy) -> Self {
        Self {
            binding: SinkBinding::new(sink, LOGBACK_SYSTEM),
            policy,
            stack: Arc::new(LiveStack),
        }
    }

    pub fn with_stack(mut self, stack: Arc<dyn StackSource>) -> Self {
        self.stack = stack;
        self
    }

    pub fn default_policy() -> SkipPolicy {
        SkipPolicy::framework_default(DEFAULT_LOGBACK_SKIP_FRAMES, LOGBACK_EXCLUSION_PREFIXES)
    }

    pub fn policy(&self) -> &SkipPolicy {
        &self.policy
    }
}

impl FrameworkAdapter for LogbackAdapter {
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
        let explicit = event.caller_data.first().map(SourceLocation::from_frame);
        let source_location = attribute(
            explicit,
            &self.policy,
            event.throwable_proxy.as_ref(),
            self.stack.as_ref(),
        );

        Some(LogEvent {
            timestamp: event.timestamp.unwrap_or_else(Utc::now),
            severity: event.severity(),
            source_location,
            log_system: LOGBACK_SYSTEM,
            logger_name: event.logger_name.clone(),
            message: event.formatted_message.clone(),
            throwable: event.throwable_proxy.clone(),
            thread_info: ThreadInfo::from_parts(event.thread_name.as_deref(), None),
            properties: event.mdc.clone(),
        })
    }
}
