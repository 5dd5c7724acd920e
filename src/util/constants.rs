// logwhence - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "logwhence";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "logwhence";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Module-path prefix of every frame that belongs to this crate.
///
/// Always part of an adapter's exclusion list so that the attribution
/// machinery never attributes an event to itself.
pub const CRATE_FRAME_PREFIX: &str = "logwhence::";

/// Module-path prefix of frames contributed by the stack-capture crate.
pub const BACKTRACE_FRAME_PREFIX: &str = "backtrace::";

// =============================================================================
// Log-system tags (reported to the ingestion sink with every event)
// =============================================================================

pub const LOG4J_SYSTEM: &str = "Log4j";
pub const LOG4J2_SYSTEM: &str = "Log4j2";
pub const LOGBACK_SYSTEM: &str = "Logback";

// =============================================================================
// Attribution defaults
// =============================================================================

// Every frame an append adds lies under `CRATE_FRAME_PREFIX` or
// `BACKTRACE_FRAME_PREFIX` and is removed by prefix, so no framework needs an
// unconditional skip by default. Hosts that wrap the framework behind their
// own facade raise these through config.

/// Default unconditional skip for log4j appends.
pub const DEFAULT_LOG4J_SKIP_FRAMES: usize = 0;

/// Default unconditional skip for log4j2 appends.
pub const DEFAULT_LOG4J2_SKIP_FRAMES: usize = 0;

/// Default unconditional skip for logback appends.
pub const DEFAULT_LOGBACK_SKIP_FRAMES: usize = 0;

/// Hard upper bound on a configured skip count (prevents configuration mistakes).
pub const MAX_SKIP_FRAMES: usize = 64;

/// Maximum number of user-supplied exclusion prefixes per adapter.
pub const MAX_EXCLUSION_PREFIXES: usize = 64;

/// Packages that make up log4j's own call path.
pub const LOG4J_EXCLUSION_PREFIXES: &[&str] = &["org.apache.log4j.", "org.slf4j."];

/// Packages that make up log4j2's own call path.
pub const LOG4J2_EXCLUSION_PREFIXES: &[&str] = &["org.apache.logging.log4j.", "org.slf4j."];

/// Packages that make up logback's own call path.
pub const LOGBACK_EXCLUSION_PREFIXES: &[&str] = &["ch.qos.logback.", "org.slf4j."];

/// Marker name that escalates a logback ERROR event to Critical.
pub const LOGBACK_FATAL_MARKER: &str = "FATAL";

/// Deepest cause chain followed when looking for a non-excluded frame, and
/// deepest chain built from a textual trace.
pub const MAX_CAUSE_DEPTH: usize = 32;

// =============================================================================
// Replay limits
// =============================================================================

/// Maximum size of one captured-event line accepted by the replay tool.
pub const MAX_REPLAY_LINE_BYTES: usize = 1024 * 1024; // 1 MiB

/// Maximum number of malformed lines reported individually before suppression.
pub const MAX_REPORTED_REPLAY_ERRORS: usize = 100;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
