//! Route `tracing` events through a [`Logger`]
//!
//! Install with
//! `tracing_subscriber::registry().with(ConsoleLayer::new(logger)).init()` to
//! get the console format for every `tracing` macro in the process. The event
//! target becomes the class of the scope label.

use std::cell::Cell;
use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::level::Level;
use crate::logger::{Logger, Tags};

/// Map a tracing level onto the console levels
pub fn level_for(level: &tracing::Level) -> Level {
    match *level {
        tracing::Level::TRACE | tracing::Level::DEBUG => Level::Detail,
        tracing::Level::INFO => Level::Info,
        tracing::Level::WARN => Level::Warn,
        tracing::Level::ERROR => Level::Error,
    }
}

/// Collects the `message` field and renders the rest as `key=value`
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            if !self.fields.is_empty() {
                self.fields.push(' ');
            }
            let _ = write!(self.fields, "{}={:?}", field.name(), value);
        }
    }
}

thread_local! {
    static EMITTING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside [`ConsoleLayer::on_event`]
struct EmitGuard;

impl EmitGuard {
    /// `None` if this thread is already emitting
    fn enter() -> Option<Self> {
        EMITTING.with(|flag| {
            if flag.replace(true) {
                None
            } else {
                Some(EmitGuard)
            }
        })
    }
}

impl Drop for EmitGuard {
    fn drop(&mut self) {
        EMITTING.with(|flag| flag.set(false));
    }
}

/// `tracing_subscriber` layer that emits events through a [`Logger`]
///
/// Events raised while the layer is already emitting on the same thread, for
/// example by a sink that logs through `tracing`, are dropped. Forwarding them
/// would lock the logger's output a second time.
pub struct ConsoleLayer {
    logger: &'static Logger,
}

impl ConsoleLayer {
    pub fn new(logger: &'static Logger) -> Self {
        Self { logger }
    }

    /// Layer bound to [`Logger::global`]
    pub fn global() -> Self {
        Self::new(Logger::global())
    }
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = level_for(metadata.level());
        if !self.logger.is_active(level) {
            return;
        }

        let Some(_guard) = EmitGuard::enter() else {
            return;
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.logger
            .emit(level, &visitor.finish(), Tags::class(metadata.target()));
    }
}
