//! Loggers with a fixed class/service prefix

use crate::level::Level;
use crate::logger::{non_empty, Logger, Tags};

/// Dot-join a bound prefix with a call-site value
fn join(bound: Option<&str>, call: Option<&str>) -> Option<String> {
    match (non_empty(bound), non_empty(call)) {
        (Some(bound), Some(call)) => Some(format!("{}.{}", bound, call)),
        (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
        (None, None) => None,
    }
}

/// A [`Logger`] view that prefixes every message with a bound class and service
///
/// Call-site class and service are appended to the bound ones, so binding
/// `("X", "Y")` and logging with class `"Z"` produces the scope `Y.X.Z`.
#[derive(Clone)]
pub struct ScopedLogger<'a> {
    logger: &'a Logger,
    class: Option<String>,
    service: Option<String>,
}

impl<'a> ScopedLogger<'a> {
    pub fn new(logger: &'a Logger, class: Option<&str>, service: Option<&str>) -> Self {
        Self {
            logger,
            class: non_empty(class).map(str::to_string),
            service: non_empty(service).map(str::to_string),
        }
    }

    /// Narrow this scope further
    pub fn bind(&self, class: Option<&str>, service: Option<&str>) -> ScopedLogger<'a> {
        ScopedLogger {
            logger: self.logger,
            class: join(self.class.as_deref(), class),
            service: join(self.service.as_deref(), service),
        }
    }

    /// The underlying logger
    pub fn logger(&self) -> &'a Logger {
        self.logger
    }

    pub fn bound_class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn bound_service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Emit through the underlying logger with the merged scope
    pub fn emit(&self, level: Level, text: &str, tags: Tags<'_>) -> bool {
        let class = join(self.class.as_deref(), tags.class);
        let service = join(self.service.as_deref(), tags.service);
        self.logger.emit(
            level,
            text,
            Tags {
                class: class.as_deref(),
                service: service.as_deref(),
                id: tags.id,
            },
        )
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
