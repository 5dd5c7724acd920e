// logwhence - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.
//
// Attribution itself has no error type: an unavailable location degrades to
// `SourceLocation::unknown()` and never reaches this module.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all logwhence operations.
#[derive(Debug)]
pub enum LogwhenceError {
    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Replay of captured events failed.
    Replay(ReplayError),
}

impl fmt::Display for LogwhenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Replay(e) => write!(f, "Replay error: {e}"),
        }
    }
}

impl std::error::Error for LogwhenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Replay(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Sink errors
// ---------------------------------------------------------------------------

/// Errors raised when an adapter registers with an ingestion sink.
#[derive(Debug)]
pub enum SinkError {
    /// The sink's backing file could not be opened.
    Io { path: PathBuf, source: io::Error },

    /// The sink refused registration (already shut down, not configured, ...).
    Unavailable { reason: String },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Cannot open sink '{}': {source}", path.display())
            }
            Self::Unavailable { reason } => write!(f, "Sink unavailable: {reason}"),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Unavailable { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogwhenceError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Replay errors
// ---------------------------------------------------------------------------

/// Errors related to replaying a captured-event file.
#[derive(Debug)]
pub enum ReplayError {
    /// The input or output file could not be opened or read.
    Io { path: PathBuf, source: io::Error },

    /// A captured-event line is not valid JSON for any supported framework.
    Json {
        line_number: u64,
        source: serde_json::Error,
    },

    /// A captured-event line exceeds the maximum accepted size.
    LineTooLong {
        line_number: u64,
        length: usize,
        max_length: usize,
    },

    /// The output sink refused to start; the cause was reported when it failed.
    OutputUnavailable { path: PathBuf },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Replay I/O error '{}': {source}", path.display())
            }
            Self::Json {
                line_number,
                source,
            } => write!(f, "line {line_number}: invalid captured event: {source}"),
            Self::LineTooLong {
                line_number,
                length,
                max_length,
            } => write!(
                f,
                "line {line_number}: {length} bytes exceeds maximum of {max_length}"
            ),
            Self::OutputUnavailable { path } => {
                write!(f, "Output '{}' could not be opened", path.display())
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::LineTooLong { .. } | Self::OutputUnavailable { .. } => None,
        }
    }
}

impl From<ReplayError> for LogwhenceError {
    fn from(e: ReplayError) -> Self {
        Self::Replay(e)
    }
}

/// Convenience type alias for logwhence results.
pub type Result<T> = std::result::Result<T, LogwhenceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_top_level_keeps_cause_chain() {
        let err: LogwhenceError = ConfigError::Io {
            path: PathBuf::from("config.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        }
        .into();
        assert!(err.to_string().starts_with("Configuration error: Config I/O error"));
        let config = err.source().unwrap();
        assert_eq!(config.source().unwrap().to_string(), "gone");

        let err: LogwhenceError = ReplayError::OutputUnavailable {
            path: PathBuf::from("out.jsonl"),
        }
        .into();
        assert!(matches!(err, LogwhenceError::Replay(_)));
    }
}
