// logwhence - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no platform
// dependencies.
//
// These types are the shared vocabulary across all layers: the adapters
// build them, the locator fills them in, the ingestion sink consumes them.

use crate::util::constants::{BACKTRACE_FRAME_PREFIX, CRATE_FRAME_PREFIX};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Severity
// =============================================================================

/// Unified severity, independent of the originating framework's level type.
///
/// Variants are declared lowest first so the derived `Ord` gives
/// `Critical > Error > Warning > Information > Verbose > Unknown`.
/// `Unknown` is a real member of the scale, not an absent value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[repr(u8)]
pub enum Severity {
    #[default]
    Unknown = 0,
    Verbose = 1,
    Information = 2,
    Warning = 3,
    Error = 4,
    Critical = 5,
}

impl Severity {
    /// Position on the unified scale; higher is more severe.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Information => "Information",
            Severity::Verbose => "Verbose",
            Severity::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Stack frames and throwables
// =============================================================================

/// One call-stack entry, either from a live stack or from a captured trace.
///
/// `class_name` is the fully-qualified owner of the method: a JVM class
/// (`app.Service`) or a Rust module/type path (`app::service::Service`).
///
/// Read in the host's camelCase (`className`, `lineNumber`), written in the
/// same snake_case as the rest of `LogEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct StackFrame {
    pub class_name: String,
    pub method_name: String,
    #[serde(default)]
    pub file_name: Option<String>,
    /// 1-based line; 0 when unknown.
    #[serde(default)]
    pub line_number: u32,
}

impl StackFrame {
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        file_name: Option<&str>,
        line_number: u32,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            file_name: file_name.map(str::to_string),
            line_number,
        }
    }

    /// Build a frame from a demangled Rust symbol path such as
    /// `app::service::Service::do_work`.
    ///
    /// The last `::` segment outside generic brackets is the method; the rest
    /// is the owner, with `<Type as Trait>` reduced to `Type`. A path with no
    /// separator is a bare method.
    pub fn from_symbol(symbol: &str, file_name: Option<&str>, line_number: u32) -> Self {
        let (class_name, method_name) = split_symbol(symbol);
        Self::new(class_name, method_name, file_name, line_number)
    }

    /// True when the owner name starts with any of `prefixes`.
    pub fn is_excluded(&self, prefixes: &[String]) -> bool {
        prefixes
            .iter()
            .any(|prefix| self.class_name.starts_with(prefix.as_str()))
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.class_name.contains("::") { "::" } else { "." };
        write!(f, "{}{sep}{}", self.class_name, self.method_name)?;
        match (&self.file_name, self.line_number) {
            (Some(file), 0) => write!(f, "({file})"),
            (Some(file), line) => write!(f, "({file}:{line})"),
            (None, _) => f.write_str("(Unknown Source)"),
        }
    }
}

/// Split a Rust symbol path at its last top-level `::`.
fn split_symbol(symbol: &str) -> (&str, &str) {
    let bytes = symbol.as_bytes();
    let mut depth = 0i32;
    let mut split_at = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' if !is_arrow(bytes, i) => depth -= 1,
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                split_at = Some(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    match split_at {
        Some(at) => (impl_owner(&symbol[..at]), &symbol[at + 2..]),
        None => ("", symbol),
    }
}

/// The `>` at `i` closes `->`, not a generic bracket.
fn is_arrow(bytes: &[u8], i: usize) -> bool {
    i > 0 && bytes[i - 1] == b'-'
}

/// `<app::Foo as core::fmt::Debug>` owns its methods as `app::Foo`.
fn impl_owner(owner: &str) -> &str {
    let Some(inner) = owner.strip_prefix('<').and_then(|o| o.strip_suffix('>')) else {
        return owner;
    };
    let bytes = inner.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' => depth += 1,
            b'>' if !is_arrow(bytes, i) => depth -= 1,
            b' ' if depth == 0 && inner[i..].starts_with(" as ") => return &inner[..i],
            _ => {}
        }
    }
    inner
}

/// An exception object together with the trace captured when it was built.
///
/// `frames` are innermost first. The cause chain is owned, so it is finite
/// and acyclic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct Throwable {
    pub type_name: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub frames: Vec<StackFrame>,
    #[serde(default)]
    pub cause: Option<Box<Throwable>>,
}

impl Throwable {
    pub fn new(type_name: impl Into<String>, message: Option<&str>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.map(str::to_string),
            frames: Vec::new(),
            cause: None,
        }
    }

    pub fn with_frames(mut self, frames: Vec<StackFrame>) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_cause(mut self, cause: Throwable) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Wrap a Rust error and its `source()` chain.
    ///
    /// Rust errors carry no trace of their own, so only the outer throwable
    /// receives `frames`; causes have empty traces.
    pub fn from_error(error: &(dyn std::error::Error + 'static), frames: Vec<StackFrame>) -> Self {
        let mut messages = Vec::new();
        let mut current = error.source();
        while let Some(cause) = current {
            messages.push(cause.to_string());
            current = cause.source();
        }
        let cause = messages
            .into_iter()
            .rev()
            .fold(None, |inner: Option<Throwable>, message| {
                let mut t = Throwable::new("source", Some(&message));
                t.cause = inner.map(Box::new);
                Some(t)
            });
        let mut outer = Throwable::new(error_type_name(error), Some(&error.to_string()));
        outer.frames = frames;
        outer.cause = cause.map(Box::new);
        outer
    }

    /// This throwable followed by its causes, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &Throwable> {
        std::iter::successors(Some(self), |t| t.cause.as_deref())
    }

    /// Innermost frame of this throwable's own trace.
    pub fn first_frame(&self) -> Option<&StackFrame> {
        self.frames.first()
    }
}

fn error_type_name(error: &(dyn std::error::Error + 'static)) -> String {
    // Debug output of most error types starts with the type or variant name.
    let debug = format!("{error:?}");
    debug
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("Error")
        .to_string()
}

impl fmt::Display for Throwable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.type_name),
            None => f.write_str(&self.type_name),
        }
    }
}

// =============================================================================
// Source location
// =============================================================================

/// Where a log event really came from.
///
/// `None` fields and line 0 mean "unknown". Empty strings given to the
/// constructors are normalised to `None`. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SourceLocation {
    method_name: Option<String>,
    class_name: Option<String>,
    file_name: Option<String>,
    line_number: u32,
}

impl SourceLocation {
    /// Explicit location supplied by a caller that already trusts it.
    pub fn new(
        method_name: Option<&str>,
        class_name: Option<&str>,
        file_name: Option<&str>,
        line_number: u32,
    ) -> Self {
        Self {
            method_name: non_empty(method_name),
            class_name: non_empty(class_name),
            file_name: non_empty(file_name),
            line_number,
        }
    }

    /// The sentinel returned whenever attribution is unavailable.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Adapt a frame the caller already holds, without any stack walk.
    pub fn from_frame(frame: &StackFrame) -> Self {
        Self::new(
            Some(&frame.method_name),
            Some(&frame.class_name),
            frame.file_name.as_deref(),
            frame.line_number,
        )
    }

    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::unknown()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

// =============================================================================
// Skip policy
// =============================================================================

/// How exception-mode attribution treats the cause chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExceptionMode {
    /// Always the outer exception's first frame.
    #[default]
    Outer,
    /// When the outer first frame is excluded, use the first exception in the
    /// cause chain whose first frame is not.
    SkipExcluded,
}

/// Frames an adapter's call path contributes before application code.
///
/// One instance per adapter, fixed for the adapter's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipPolicy {
    /// Innermost frames skipped unconditionally in live-stack mode.
    pub skip_frames: usize,
    /// Owner-name prefixes skipped after the unconditional range.
    pub exclusion_prefixes: Vec<String>,
    pub exception_mode: ExceptionMode,
}

impl SkipPolicy {
    pub fn new<I, S>(skip_frames: usize, exclusion_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            skip_frames,
            exclusion_prefixes: exclusion_prefixes.into_iter().map(Into::into).collect(),
            exception_mode: ExceptionMode::Outer,
        }
    }

    /// Policy for one host framework: its skip depth, this crate's own
    /// frames, the stack walker's frames, then the framework's packages.
    pub fn framework_default(skip_frames: usize, framework_prefixes: &[&str]) -> Self {
        let own = [CRATE_FRAME_PREFIX, BACKTRACE_FRAME_PREFIX];
        Self::new(
            skip_frames,
            own.iter().chain(framework_prefixes).copied(),
        )
    }

    pub fn with_exception_mode(mut self, mode: ExceptionMode) -> Self {
        self.exception_mode = mode;
        self
    }
}

// =============================================================================
// Normalised log event
// =============================================================================

/// Thread metadata passed through from the native event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThreadInfo {
    pub name: Option<String>,
    pub id: Option<u64>,
}

impl ThreadInfo {
    /// `None` when the native event carried no thread metadata at all.
    pub fn from_parts(name: Option<&str>, id: Option<u64>) -> Option<Self> {
        if name.is_none() && id.is_none() {
            return None;
        }
        Some(Self {
            name: name.map(str::to_string),
            id,
        })
    }
}

/// A log event normalised across all frameworks, ready for the ingestion sink.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub source_location: SourceLocation,
    /// Tag of the originating framework (e.g. "Log4j2").
    pub log_system: &'static str,
    pub logger_name: String,
    pub message: String,
    pub throwable: Option<Throwable>,
    pub thread_info: Option<ThreadInfo>,
    /// MDC / context data carried by the native event.
    pub properties: BTreeMap<String, String>,
}
