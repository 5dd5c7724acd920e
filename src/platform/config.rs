// logwhence - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.
//
// The config file only tunes attribution: per-framework skip depth,
// extra exclusion prefixes, and the exception-chain policy. Skip depth is a
// fallback knob; exclusion prefixes do the real work.

use crate::core::model::{ExceptionMode, SkipPolicy};
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for logwhence configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logwhence/ or %APPDATA%\logwhence\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of `config.toml`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[attribution]` section.
    pub attribution: AttributionSection,
    /// `[log4j]` section.
    pub log4j: FrameworkSection,
    /// `[log4j2]` section.
    pub log4j2: FrameworkSection,
    /// `[logback]` section.
    pub logback: FrameworkSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[attribution]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct AttributionSection {
    /// "outer" or "skip-excluded".
    pub exception_mode: Option<String>,
}

/// Per-framework config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FrameworkSection {
    /// Innermost frames skipped unconditionally.
    pub skip_frames: Option<usize>,
    /// Prefixes appended to the framework's built-in exclusion list.
    pub exclusion_prefixes: Option<Vec<String>>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated configuration.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log4j: SkipPolicy,
    pub log4j2: SkipPolicy,
    pub logback: SkipPolicy,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log4j: SkipPolicy::framework_default(
                constants::DEFAULT_LOG4J_SKIP_FRAMES,
                constants::LOG4J_EXCLUSION_PREFIXES,
            ),
            log4j2: SkipPolicy::framework_default(
                constants::DEFAULT_LOG4J2_SKIP_FRAMES,
                constants::LOG4J2_EXCLUSION_PREFIXES,
            ),
            logback: SkipPolicy::framework_default(
                constants::DEFAULT_LOGBACK_SKIP_FRAMES,
                constants::LOGBACK_EXCLUSION_PREFIXES,
            ),
            log_level: None,
        }
    }
}

/// Read and parse a config file without validating values.
pub fn read_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load and validate `config.toml` at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings; an unreadable or
/// unparseable file yields defaults with one warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    match read_config(config_path) {
        Ok(raw) => {
            tracing::info!(path = %config_path.display(), "Loaded config.toml");
            validate(raw)
        }
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            (AppConfig::default(), vec![msg])
        }
    }
}

/// Load a config file the user named explicitly.
///
/// Unlike `load_config`, a missing or unparseable file is an error: silently
/// replacing a requested file with defaults would hide the mistake.
pub fn load_config_strict(config_path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let raw = read_config(config_path)?;
    tracing::info!(path = %config_path.display(), "Loaded config.toml");
    Ok(validate(raw))
}

/// Validate every field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = AppConfig::default();

    // -- Attribution: exception_mode --
    let mode = match raw.attribution.exception_mode.as_deref() {
        None => ExceptionMode::Outer,
        Some(value) => match value.to_lowercase().as_str() {
            "outer" => ExceptionMode::Outer,
            "skip-excluded" => ExceptionMode::SkipExcluded,
            other => {
                warnings.push(out_of_range(
                    "attribution.exception_mode",
                    other,
                    "\"outer\" or \"skip-excluded\"",
                    "outer",
                ));
                ExceptionMode::Outer
            }
        },
    };

    apply_framework("log4j", raw.log4j, &mut config.log4j, &mut warnings);
    apply_framework("log4j2", raw.log4j2, &mut config.log4j2, &mut warnings);
    apply_framework("logback", raw.logback, &mut config.logback, &mut warnings);
    for policy in [&mut config.log4j, &mut config.log4j2, &mut config.logback] {
        policy.exception_mode = mode;
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(out_of_range(
                "logging.level",
                level,
                &constants::VALID_LOG_LEVELS.join(", "),
                constants::DEFAULT_LOG_LEVEL,
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

/// Warning text for a rejected value, worded by `ConfigError`.
fn out_of_range(
    field: &str,
    value: impl ToString,
    expected: &str,
    fallback: impl std::fmt::Display,
) -> String {
    let err = ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    };
    format!("{err}. Using default ({fallback}).")
}

fn apply_framework(
    section: &str,
    raw: FrameworkSection,
    policy: &mut SkipPolicy,
    warnings: &mut Vec<String>,
) {
    if let Some(skip) = raw.skip_frames {
        if skip <= constants::MAX_SKIP_FRAMES {
            policy.skip_frames = skip;
        } else {
            warnings.push(out_of_range(
                &format!("{section}.skip_frames"),
                skip,
                &format!("0-{}", constants::MAX_SKIP_FRAMES),
                policy.skip_frames,
            ));
        }
    }

    if let Some(prefixes) = raw.exclusion_prefixes {
        if prefixes.len() > constants::MAX_EXCLUSION_PREFIXES {
            warnings.push(format!(
                "[{section}] exclusion_prefixes has {} entries, maximum is {}. \
                 Only the first {} are used.",
                prefixes.len(),
                constants::MAX_EXCLUSION_PREFIXES,
                constants::MAX_EXCLUSION_PREFIXES,
            ));
        }
        for prefix in prefixes.into_iter().take(constants::MAX_EXCLUSION_PREFIXES) {
            // An empty prefix would exclude every frame.
            if prefix.is_empty() {
                warnings.push(format!(
                    "[{section}] exclusion_prefixes contains an empty string. Ignored."
                ));
            } else if !policy.exclusion_prefixes.contains(&prefix) {
                policy.exclusion_prefixes.push(prefix);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_text: &str) -> (AppConfig, Vec<String>) {
        validate(toml::from_str(toml_text).expect("test TOML parses"))
    }

    #[test]
    fn test_defaults_include_crate_and_framework_prefixes() {
        let config = AppConfig::default();
        assert_eq!(config.log4j.skip_frames, constants::DEFAULT_LOG4J_SKIP_FRAMES);
        assert_eq!(config.log4j2.skip_frames, constants::DEFAULT_LOG4J2_SKIP_FRAMES);
        for policy in [&config.log4j, &config.log4j2, &config.logback] {
            assert!(policy
                .exclusion_prefixes
                .iter()
                .any(|p| p == constants::CRATE_FRAME_PREFIX));
        }
        assert!(config
            .logback
            .exclusion_prefixes
            .iter()
            .any(|p| p == "ch.qos.logback."));
    }

    #[test]
    fn test_framework_section_overrides() {
        let (config, warnings) = parse(
            r#"
            [log4j2]
            skip_frames = 5
            exclusion_prefixes = ["com.acme.logging."]
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.log4j2.skip_frames, 5);
        assert!(config
            .log4j2
            .exclusion_prefixes
            .contains(&"com.acme.logging.".to_string()));
        // Other frameworks keep their defaults.
        assert_eq!(config.log4j.skip_frames, constants::DEFAULT_LOG4J_SKIP_FRAMES);
    }

    #[test]
    fn test_out_of_range_skip_warns_and_keeps_default() {
        let (config, warnings) = parse("[logback]\nskip_frames = 10000\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0],
            "Config 'logback.skip_frames' = '10000' is out of range. Expected: 0-64. \
             Using default (0)."
        );
        assert_eq!(config.logback.skip_frames, constants::DEFAULT_LOGBACK_SKIP_FRAMES);
    }

    #[test]
    fn test_empty_prefix_is_rejected() {
        let (config, warnings) = parse("[log4j]\nexclusion_prefixes = [\"\", \"a.b.\"]\n");
        assert_eq!(warnings.len(), 1);
        assert!(!config.log4j.exclusion_prefixes.iter().any(String::is_empty));
        assert!(config.log4j.exclusion_prefixes.contains(&"a.b.".to_string()));
    }

    #[test]
    fn test_exception_mode_applies_to_all_frameworks() {
        let (config, warnings) = parse("[attribution]\nexception_mode = \"skip-excluded\"\n");
        assert!(warnings.is_empty());
        assert_eq!(config.log4j.exception_mode, ExceptionMode::SkipExcluded);
        assert_eq!(config.logback.exception_mode, ExceptionMode::SkipExcluded);

        let (config, warnings) = parse("[attribution]\nexception_mode = \"deepest\"\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.log4j2.exception_mode, ExceptionMode::Outer);
    }

    #[test]
    fn test_logging_level_validation() {
        let (config, warnings) = parse("[logging]\nlevel = \"DEBUG\"\n");
        assert!(warnings.is_empty());
        assert_eq!(config.log_level.as_deref(), Some("DEBUG"));

        let (config, warnings) = parse("[logging]\nlevel = \"loud\"\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Config 'logging.level' = 'loud'"), "{warnings:?}");
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_load_missing_file_is_silent_default() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert!(warnings.is_empty());
        assert_eq!(config.log4j.skip_frames, constants::DEFAULT_LOG4J_SKIP_FRAMES);
    }

    #[test]
    fn test_load_unparseable_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[log4j\nskip_frames = ").unwrap();
        let (_, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Config parse error"), "{warnings:?}");
    }

    #[test]
    fn test_strict_load_rejects_missing_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_config_strict(&dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[log4j\nskip_frames = ").unwrap();
        assert!(matches!(load_config_strict(&path), Err(ConfigError::TomlParse { .. })));

        std::fs::write(&path, "[log4j]\nskip_frames = 4\n").unwrap();
        let (config, warnings) = load_config_strict(&path).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(config.log4j.skip_frames, 4);
    }

    #[test]
    fn test_read_config_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_config(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
