// logwhence - adapters/log4j2.rs
//
// log4j2 integration.
//
// log4j2 events carry their call site as a ready `StackTraceElement` when
// the logger config has `includeLocation`; that element is adopted as-is.
// Levels are identified by their intLevel, where lower is more severe.

use crate::adapters::{attribute, FrameworkAdapter, NativeLevel, SinkBinding};
use crate::core::locator::StackSource;
use crate::core::model::{
    LogEvent, Severity, SkipPolicy, SourceLocation, StackFrame, ThreadInfo, Throwable,
};
use crate::core::sink::IngestionSink;
use crate::platform::stack::LiveStack;
use crate::util::constants::{DEFAULT_LOG4J2_SKIP_FRAMES, LOG4J2_EXCLUSION_PREFIXES, LOG4J2_SYSTEM};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// log4j2 levels. Applications may define their own with `Level.forName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Log4j2Level {
    Off,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    All,
    Custom { name: String, int_level: u32 },
}

impl Log4j2Level {
    pub fn int_level(&self) -> u32 {
        match self {
            Self::Off => 0,
            Self::Fatal => 100,
            Self::Error => 200,
            Self::Warn => 300,
            Self::Info => 400,
            Self::Debug => 500,
            Self::Trace => 600,
            Self::All => i32::MAX as u32,
            Self::Custom { int_level, .. } => *int_level,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Off => "OFF",
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
            Self::All => "ALL",
            Self::Custom { name, .. } => name,
        }
    }
}

impl NativeLevel for Log4j2Level {
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

/// log4j2's native event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log4jLogEvent {
    #[serde(default)]
    pub instant: Option<DateTime<Utc>>,
    pub level: Log4j2Level,
    /// Empty for the root logger.
    #[serde(default)]
    pub logger_name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub thread_name: Option<String>,
    #[serde(default)]
    pub thread_id: Option<u64>,
    #[serde(default)]
    pub thrown: Option<Throwable>,
    /// Call site, when location capture is enabled.
    #[serde(default)]
    pub source: Option<StackFrame>,
    #[serde(default)]
    pub context_data: BTreeMap<String, String>,
}

impl Log4jLogEvent {
    pub fn new(level: Log4j2Level, logger_name: &str, message: &str) -> Self {
        Self {
            instant: None,
            level,
            logger_name: logger_name.to_string(),
            message: message.to_string(),
            thread_name: None,
            thread_id: None,
            thrown: None,
            source: None,
            context_data: BTreeMap::new(),
        }
    }
}

/// Appender that forwards log4j2 events to an ingestion sink.
pub struct Log4j2Adapter {
    binding: SinkBinding,
    policy: SkipPolicy,
    stack: Arc<dyn StackSource>,
}

impl Log4j2Adapter {
    pub fn new(sink: Arc<dyn IngestionSink>) -> Self {
        Self::with_policy(sink, Self::default_policy())
    }

    pub fn with_policy(sink: Arc<dyn IngestionSink>, policy: SkipPolicy) -> Self {
        Self {
            binding: SinkBinding::new(sink, LOG4J2_SYSTEM),
            policy,
            stack: Arc::new(LiveStack),
        }
    }

    pub fn with_stack(mut self, stack: Arc<dyn StackSource>) -> Self {
        self.stack = stack;
        self
    }

    pub fn default_policy() -> SkipPolicy {
        SkipPolicy::framework_default(DEFAULT_LOG4J2_SKIP_FRAMES, LOG4J2_EXCLUSION_PREFIXES)
    }

    pub fn policy(&self) -> &SkipPolicy {
        &self.policy
    }
}

impl FrameworkAdapter for Log4j2Adapter {
    type Event = Log4jLogEvent;

    fn binding(&self) -> &SinkBinding {
        &self.binding
    }

    fn is_filtered(&self, event: &Log4jLogEvent) -> bool {
        event.level.is_off()
    }

    fn normalize(&self, event: &Log4jLogEvent) -> Option<LogEvent> {
        if self.is_filtered(event) {
            return None;
        }
        let explicit = event.source.as_ref().map(SourceLocation::from_frame);
        let source_location = attribute(
            explicit,
            &self.policy,
            event.thrown.as_ref(),
            self.stack.as_ref(),
        );

        Some(LogEvent {
            timestamp: event.instant.unwrap_or_else(Utc::now),
            severity: event.level.severity(),
            source_location,
            log_system: LOG4J2_SYSTEM,
            logger_name: event.logger_name.clone(),
            message: event.message.clone(),
            throwable: event.thrown.clone(),
            thread_info: ThreadInfo::from_parts(event.thread_name.as_deref(), event.thread_id),
            properties: event.context_data.clone(),
        })
    }
}
