//! Error types for logger configuration

use thiserror::Error;

/// Errors raised by configuration calls
///
/// Emitting a message never fails; only changing the logger's settings can.
/// Every configuration method validates before it mutates, so a rejected call
/// leaves the previous settings in effect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoggerError {
    #[error("no such level: {0}")]
    UnknownLevel(String),

    #[error("invalid output sink: {0}")]
    InvalidSink(String),

    #[error("unknown style: {0}")]
    UnknownStyle(String),

    #[error("console width must be at least 1 column")]
    InvalidWidth,

    #[error("level defined more than once: {0}")]
    DuplicateLevel(String),
}
