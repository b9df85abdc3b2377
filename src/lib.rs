//! conlog - Leveled console logger with terminal-width word wrapping
//!
//! Timestamps, tags and colorizes log lines, gates them by severity level and
//! re-flows long lines to the console width, keeping continuation rows aligned
//! under the `timestamp [LABEL]` header.

pub mod bridge;
pub mod config;
pub mod error;
pub mod level;
pub mod logger;
pub mod scope;
pub mod sink;
pub mod style;
pub mod wrap;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use level::{Level, LevelDef, LevelRegistry};
pub use logger::{Logger, Tags};
pub use scope::ScopedLogger;
pub use sink::{LineSink, SinkTarget};
pub use style::{AnsiStyler, PlainStyler, StyleName, Styler};
pub use wrap::LineWrapper;
