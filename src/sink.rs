//! Output targets for composed log lines

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LoggerError;
use crate::style::{StyleName, Styler};
use crate::wrap::LineWrapper;

/// Receives each composed log line, unwrapped
///
/// Called with the logger's output locked, so a sink must not log through
/// the same [`Logger`](crate::Logger). Events a sink raises through `tracing`
/// are dropped by [`ConsoleLayer`](crate::bridge::ConsoleLayer).
pub trait LineSink: Send {
    fn write_line(&mut self, line: &str);
}

impl<F> LineSink for F
where
    F: FnMut(&str) + Send,
{
    fn write_line(&mut self, line: &str) {
        self(line)
    }
}

/// Standard stream used by the default formatted output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SinkTarget {
    #[default]
    Stdout,
    Stderr,
}

impl SinkTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkTarget::Stdout => "stdout",
            SinkTarget::Stderr => "stderr",
        }
    }

    /// Formatted output bound to this stream
    pub fn output(&self) -> Output {
        match self {
            SinkTarget::Stdout => Output::Formatted(Box::new(io::stdout())),
            SinkTarget::Stderr => Output::Formatted(Box::new(io::stderr())),
        }
    }
}

impl fmt::Display for SinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinkTarget {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdout" => Ok(SinkTarget::Stdout),
            "stderr" => Ok(SinkTarget::Stderr),
            _ => Err(LoggerError::InvalidSink(s.to_string())),
        }
    }
}

impl TryFrom<String> for SinkTarget {
    type Error = LoggerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SinkTarget> for String {
    fn from(target: SinkTarget) -> Self {
        target.as_str().to_string()
    }
}

/// Settings the formatted output reads at write time
pub struct FormatContext<'a> {
    pub width: usize,
    pub word_break: &'a str,
    pub overrides: &'a [StyleName],
    pub styler: &'a dyn Styler,
}

/// Where composed lines go
pub enum Output {
    /// Wrap to the console width, then write to the stream
    Formatted(Box<dyn Write + Send>),
    /// Hand the composed line to a custom sink as-is
    Sink(Box<dyn LineSink>),
}

impl Output {
    /// Deliver one composed line
    ///
    /// Stream errors are dropped; a failed terminal write is not reported.
    pub fn write(&mut self, line: &str, ctx: &FormatContext<'_>) {
        match self {
            Output::Sink(sink) => sink.write_line(line),
            Output::Formatted(writer) => {
                let rows = LineWrapper::new(ctx.width, ctx.word_break).wrap(
                    line,
                    ctx.styler,
                    ctx.overrides,
                );
                let _ = writeln!(writer, "{}", rows.join("\n"));
                let _ = writer.flush();
            }
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Formatted(_) => f.write_str("Output::Formatted"),
            Output::Sink(_) => f.write_str("Output::Sink"),
        }
    }
}
