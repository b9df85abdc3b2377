//! Leveled console logger
//!
//! [`Logger`] owns the active level, console width, style overrides and the
//! output. Each emit checks the level gate, composes
//! `timestamp [LABEL] <id> service.class: text` and hands the line to the
//! output, which by default wraps it to the console width.

use std::io::Write;
use std::sync::{Mutex, OnceLock, RwLock};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::LoggerConfig;
use crate::error::LoggerError;
use crate::level::{Level, LevelDef, LevelRegistry};
use crate::scope::ScopedLogger;
use crate::sink::{FormatContext, LineSink, Output, SinkTarget};
use crate::style::{parse_styles, AnsiStyler, StyleName, Styler};

/// Optional call-site labels attached to a message
///
/// Empty strings count as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tags<'a> {
    pub class: Option<&'a str>,
    pub service: Option<&'a str>,
    pub id: Option<&'a str>,
}

impl<'a> Tags<'a> {
    /// No class, service or id
    pub fn none() -> Self {
        Self::default()
    }

    /// Tags carrying only a class
    pub fn class(class: &'a str) -> Self {
        Self::default().with_class(class)
    }

    pub fn with_class(mut self, class: &'a str) -> Self {
        self.class = non_empty(Some(class));
        self
    }

    pub fn with_service(mut self, service: &'a str) -> Self {
        self.service = non_empty(Some(service));
        self
    }

    /// Correlation id, printed as `<id>`
    pub fn with_id(mut self, id: &'a str) -> Self {
        self.id = non_empty(Some(id));
        self
    }

    /// `service.class`, or whichever of the two is present
    pub fn scope_label(&self) -> Option<String> {
        match (non_empty(self.service), non_empty(self.class)) {
            (Some(service), Some(class)) => Some(format!("{}.{}", service, class)),
            (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
            (None, None) => None,
        }
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// ISO-8601 UTC timestamp with millisecond precision and a `Z` suffix
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the unwrapped log line for one message
pub fn compose(
    timestamp: &str,
    def: &LevelDef,
    text: &str,
    tags: Tags<'_>,
    styler: &dyn Styler,
) -> String {
    let mut line = format!("{} [{}] ", timestamp, def.styled_label(styler));
    if let Some(id) = non_empty(tags.id) {
        line.push_str(&format!("<{}> ", id));
    }
    if let Some(scope) = tags.scope_label() {
        line.push_str(&styler.apply(&format!("{}: ", scope), &def.body_styles));
    }
    line.push_str(&styler.apply(text, &def.body_styles));
    line
}

/// Mutable logger settings
#[derive(Debug, Clone)]
struct LoggerState {
    level: Level,
    console_width: usize,
    colors: Vec<StyleName>,
}

/// Process-wide instance, see [`Logger::global`]
static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Leveled console logger
pub struct Logger {
    registry: LevelRegistry,
    state: RwLock<LoggerState>,
    output: Mutex<Output>,
    target: SinkTarget,
    word_break: String,
    styler: Box<dyn Styler>,
}

impl Logger {
    /// Create a logger from explicit configuration
    pub fn new(config: LoggerConfig) -> Result<Self, LoggerError> {
        Self::with_styler(config, Box::new(AnsiStyler))
    }

    /// Create a logger with a custom styling backend
    pub fn with_styler(config: LoggerConfig, styler: Box<dyn Styler>) -> Result<Self, LoggerError> {
        if config.width() == 0 {
            return Err(LoggerError::InvalidWidth);
        }
        Ok(Self::build(config, styler))
    }

    fn build(config: LoggerConfig, styler: Box<dyn Styler>) -> Self {
        Self {
            registry: LevelRegistry::builtin(),
            state: RwLock::new(LoggerState {
                level: config.level,
                console_width: config.width().max(1),
                colors: config.colors,
            }),
            output: Mutex::new(config.output.output()),
            target: config.output,
            word_break: config.word_break,
            styler,
        }
    }

    /// Shared process-wide logger, created on first access
    ///
    /// Reads `~/.conlog/config.toml` and the `CONLOG_*` environment once and
    /// detects the terminal width.
    pub fn global() -> &'static Logger {
        GLOBAL.get_or_init(|| {
            let logger = Logger::new(LoggerConfig::load_or_default()).unwrap_or_else(|e| {
                tracing::warn!("Invalid logger config ({}), using defaults", e);
                Logger::build(LoggerConfig::default().with_detected_width(), Box::new(AnsiStyler))
            });
            logger.info(
                "Logger instance initialized",
                Tags::class("Logger").with_service("conlog"),
            );
            logger
        })
    }

    /// Registered levels, in gating order
    pub fn registry(&self) -> &LevelRegistry {
        &self.registry
    }

    /// Current active level
    pub fn level(&self) -> Level {
        self.state
            .read()
            .map(|s| s.level)
            .unwrap_or(Level::Detail)
    }

    /// Set the active level
    pub fn set_level(&self, level: Level) {
        if let Ok(mut state) = self.state.write() {
            state.level = level;
        }
    }

    /// Set the active level by identifier
    ///
    /// Fails without changing anything if `id` is not a registered level.
    pub fn set_level_name(&self, id: &str) -> Result<(), LoggerError> {
        let level: Level = id.parse()?;
        self.set_level(level);
        Ok(())
    }

    /// Whether messages at `level` are currently shown
    pub fn is_active(&self, level: Level) -> bool {
        self.state.read().map(|s| level >= s.level).unwrap_or(false)
    }

    /// Whether messages at the level named `id` are currently shown
    ///
    /// Unknown identifiers are never active.
    pub fn is_active_name(&self, id: &str) -> bool {
        self.registry.is_active(self.level().as_str(), id)
    }

    pub fn console_width(&self) -> usize {
        self.state
            .read()
            .map(|s| s.console_width)
            .unwrap_or(crate::config::FALLBACK_CONSOLE_WIDTH)
    }

    /// Set the console width used for wrapping
    pub fn set_console_width(&self, width: usize) -> Result<(), LoggerError> {
        if width == 0 {
            return Err(LoggerError::InvalidWidth);
        }
        if let Ok(mut state) = self.state.write() {
            state.console_width = width;
        }
        Ok(())
    }

    /// Styles applied to the body of every wrapped row
    pub fn colors(&self) -> Vec<StyleName> {
        self.state
            .read()
            .map(|s| s.colors.clone())
            .unwrap_or_default()
    }

    /// Replace the style overrides; an empty list clears them
    pub fn set_colors(&self, colors: Vec<StyleName>) {
        if let Ok(mut state) = self.state.write() {
            state.colors = colors;
        }
    }

    /// Replace the style overrides by name, rejecting unknown names
    pub fn set_color_names<S: AsRef<str>>(&self, names: &[S]) -> Result<(), LoggerError> {
        let colors = parse_styles(names)?;
        self.set_colors(colors);
        Ok(())
    }

    /// Send composed lines to a custom sink instead of the terminal
    pub fn set_sink(&self, sink: impl LineSink + 'static) {
        self.replace_output(Output::Sink(Box::new(sink)));
    }

    /// Keep the wrapped format but write it to `writer`
    pub fn set_writer(&self, writer: impl Write + Send + 'static) {
        self.replace_output(Output::Formatted(Box::new(writer)));
    }

    /// Restore the default wrapped output on the configured stream
    pub fn reset_sink(&self) {
        self.replace_output(self.target.output());
    }

    fn replace_output(&self, output: Output) {
        if let Ok(mut current) = self.output.lock() {
            *current = output;
        }
    }

    /// Emit `text` at `level`
    ///
    /// Returns `false` without touching the output when the level is gated.
    pub fn emit(&self, level: Level, text: &str, tags: Tags<'_>) -> bool {
        let Ok(state) = self.state.read().map(|s| s.clone()) else {
            return false;
        };
        if level < state.level {
            return false;
        }

        let builtin;
        let def = match self.registry.get(level.as_str()) {
            Some(def) => def,
            None => {
                builtin = level.def();
                &builtin
            }
        };
        let record = LogRecord {
            timestamp: Utc::now(),
            def,
            tags,
            text,
        };
        let line = record.compose(self.styler.as_ref());

        let ctx = FormatContext {
            width: state.console_width,
            word_break: &self.word_break,
            overrides: &state.colors,
            styler: self.styler.as_ref(),
        };
        match self.output.lock() {
            Ok(mut output) => {
                output.write(&line, &ctx);
                true
            }
            Err(_) => false,
        }
    }

    /// Bind a class and service to every message sent through the result
    pub fn bind(&self, class: Option<&str>, service: Option<&str>) -> ScopedLogger<'_> {
        ScopedLogger::new(self, class, service)
    }

    pub fn detail(&self, text: &str, tags: Tags<'_>) -> bool {
        self.emit(Level::Detail, text, tags)
    }

    pub fn sql(&self, text: &str, tags: Tags<'_>) -> bool {
        self.emit(Level::Sql, text, tags)
    }

    pub fn info(&self, text: &str, tags: Tags<'_>) -> bool {
        self.emit(Level::Info, text, tags)
    }

    pub fn sess(&self, text: &str, tags: Tags<'_>) -> bool {
        self.emit(Level::Sess, text, tags)
    }

    pub fn warn(&self, text: &str, tags: Tags<'_>) -> bool {
        self.emit(Level::Warn, text, tags)
    }

    pub fn module(&self, text: &str, tags: Tags<'_>) -> bool {
        self.emit(Level::Module, text, tags)
    }

    pub fn error(&self, text: &str, tags: Tags<'_>) -> bool {
        self.emit(Level::Error, text, tags)
    }
}

/// One message on its way to the output
#[derive(Debug, Clone, Copy)]
struct LogRecord<'a> {
    timestamp: DateTime<Utc>,
    def: &'a LevelDef,
    tags: Tags<'a>,
    text: &'a str,
}

impl LogRecord<'_> {
    fn compose(&self, styler: &dyn Styler) -> String {
        compose(
            &format_timestamp(self.timestamp),
            self.def,
            self.text,
            self.tags,
            styler,
        )
    }
}
