//! Configuration management for conlog

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::LoggerError;
use crate::level::Level;
use crate::sink::SinkTarget;
use crate::style::StyleName;
use crate::wrap::DEFAULT_WORD_BREAK;

/// Console width used when the terminal size cannot be detected
pub const FALLBACK_CONSOLE_WIDTH: usize = 260;

/// Environment variable overriding the active level
pub const LEVEL_ENV: &str = "CONLOG_LEVEL";

/// Environment variable overriding the console width
pub const WIDTH_ENV: &str = "CONLOG_WIDTH";

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Active level; this level and every later one is shown
    #[serde(default = "default_level")]
    pub level: Level,

    /// Console width in columns (detected from the terminal when unset)
    #[serde(default)]
    pub console_width: Option<usize>,

    /// Styles applied to the body of every wrapped row
    #[serde(default)]
    pub colors: Vec<StyleName>,

    /// Characters a line may be broken after
    #[serde(default = "default_word_break")]
    pub word_break: String,

    /// Stream for the formatted output: "stdout" (default) or "stderr"
    #[serde(default)]
    pub output: SinkTarget,
}

fn default_level() -> Level {
    Level::Detail
}

fn default_word_break() -> String {
    DEFAULT_WORD_BREAK.to_string()
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            console_width: None,
            colors: Vec::new(),
            word_break: default_word_break(),
            output: SinkTarget::default(),
        }
    }
}

impl LoggerConfig {
    /// Load configuration from the default file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `path`, or return default if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
            Ok(config.without_zero_width())
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Drop a zero console width so the terminal width is detected instead
    fn without_zero_width(mut self) -> Self {
        if self.console_width == Some(0) {
            tracing::warn!("Ignoring console_width = 0 in config file");
            self.console_width = None;
        }
        self
    }

    /// Load the config file, apply environment overrides and detect the
    /// terminal width; any failure falls back to defaults
    pub fn load_or_default() -> Self {
        let config = Self::load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring config file: {:#}", e);
            Self::default()
        });
        let config = config.clone().with_env().unwrap_or_else(|e| {
            tracing::warn!("Ignoring environment overrides: {}", e);
            config
        });
        config.with_detected_width()
    }

    /// Apply `CONLOG_LEVEL` and `CONLOG_WIDTH` from the process environment
    pub fn with_env(self) -> Result<Self, LoggerError> {
        self.with_overrides(
            std::env::var(LEVEL_ENV).ok().as_deref(),
            std::env::var(WIDTH_ENV).ok().as_deref(),
        )
    }

    /// Apply textual level and width overrides, validating both first
    pub fn with_overrides(
        mut self,
        level: Option<&str>,
        width: Option<&str>,
    ) -> Result<Self, LoggerError> {
        let level = level
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<Level>)
            .transpose()?;
        let width = width
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match s.parse::<usize>() {
                Ok(w) if w > 0 => Ok(w),
                _ => Err(LoggerError::InvalidWidth),
            })
            .transpose()?;

        if let Some(level) = level {
            self.level = level;
        }
        if let Some(width) = width {
            self.console_width = Some(width);
        }
        Ok(self)
    }

    /// Fill in the console width from the terminal if none is configured
    pub fn with_detected_width(mut self) -> Self {
        if self.console_width.is_none() {
            self.console_width = Some(detect_console_width());
        }
        self
    }

    /// Configured console width, or the fallback
    pub fn width(&self) -> usize {
        self.console_width.unwrap_or(FALLBACK_CONSOLE_WIDTH)
    }
}

/// Columns of the attached terminal, or [`FALLBACK_CONSOLE_WIDTH`]
pub fn detect_console_width() -> usize {
    match crossterm::terminal::size() {
        Ok((columns, _)) if columns > 0 => columns as usize,
        Ok(_) => FALLBACK_CONSOLE_WIDTH,
        Err(e) => {
            tracing::debug!("Could not detect terminal size: {}", e);
            FALLBACK_CONSOLE_WIDTH
        }
    }
}

/// Get the base configuration directory (~/.conlog)
/// Falls back to ./.conlog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine home directory, using current directory for config");
        PathBuf::from(".conlog")
    })
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".conlog"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, Level::Detail);
        assert_eq!(config.console_width, None);
        assert_eq!(config.width(), FALLBACK_CONSOLE_WIDTH);
        assert!(config.colors.is_empty());
        assert_eq!(config.word_break, " \t-.");
        assert_eq!(config.output, SinkTarget::Stdout);
    }

    #[test]
    fn test_config_serialization() {
        let mut config = LoggerConfig::default();
        config.level = Level::Warn;
        config.console_width = Some(120);
        config.colors = vec![StyleName::Bold];

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: LoggerConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: LoggerConfig = toml::from_str(r#"level = "sql""#).unwrap();
        assert_eq!(parsed.level, Level::Sql);
        assert_eq!(parsed.word_break, DEFAULT_WORD_BREAK);
        assert_eq!(parsed.output, SinkTarget::Stdout);
    }

    #[test]
    fn test_config_rejects_unknown_values() {
        assert!(toml::from_str::<LoggerConfig>(r#"level = "trace""#).is_err());
        assert!(toml::from_str::<LoggerConfig>(r#"output = "syslog""#).is_err());
        assert!(toml::from_str::<LoggerConfig>(r#"colors = ["sparkly"]"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "level = \"warn\"\nconsole_width = 100\ncolors = [\"bold\"]\noutput = \"stderr\"\n",
        )
        .unwrap();

        let config = LoggerConfig::load_from(&path).unwrap();
        assert_eq!(config.level, Level::Warn);
        assert_eq!(config.width(), 100);
        assert_eq!(config.colors, vec![StyleName::Bold]);
        assert_eq!(config.output, SinkTarget::Stderr);
    }

    #[test]
    fn test_zero_width_in_file_keeps_other_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "level = \"error\"\nconsole_width = 0\ncolors = [\"dim\"]\noutput = \"stderr\"\n",
        )
        .unwrap();

        let config = LoggerConfig::load_from(&path).unwrap();
        assert_eq!(config.console_width, None);
        assert_eq!(config.level, Level::Error);
        assert_eq!(config.colors, vec![StyleName::Dim]);
        assert_eq!(config.output, SinkTarget::Stderr);

        let logger = crate::logger::Logger::new(config.with_detected_width()).unwrap();
        assert_eq!(logger.level(), Level::Error);
        assert!(logger.console_width() > 0);
    }

    #[test]
    fn test_load_from_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = LoggerConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, LoggerConfig::default());
    }

    #[test]
    fn test_load_from_malformed_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "level = [").unwrap();
        assert!(LoggerConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let config = LoggerConfig::default()
            .with_overrides(Some("error"), Some(" 72 "))
            .unwrap();
        assert_eq!(config.level, Level::Error);
        assert_eq!(config.console_width, Some(72));
    }

    #[test]
    fn test_overrides_validate_before_applying() {
        let err = LoggerConfig::default()
            .with_overrides(Some("loud"), Some("80"))
            .unwrap_err();
        assert_eq!(err, LoggerError::UnknownLevel("loud".to_string()));

        assert_eq!(
            LoggerConfig::default()
                .with_overrides(None, Some("0"))
                .unwrap_err(),
            LoggerError::InvalidWidth
        );
        assert_eq!(
            LoggerConfig::default()
                .with_overrides(None, Some("wide"))
                .unwrap_err(),
            LoggerError::InvalidWidth
        );
    }

    #[test]
    fn test_detected_width_keeps_explicit_width() {
        let mut config = LoggerConfig::default();
        config.console_width = Some(42);
        assert_eq!(config.with_detected_width().width(), 42);
        assert!(LoggerConfig::default().with_detected_width().width() > 0);
    }

    #[test]
    fn test_config_dir_does_not_panic() {
        let dir = config_dir();
        assert!(dir.ends_with(".conlog"));
        assert!(config_file_path().ends_with("config.toml"));
    }
}
