use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use conlog::bridge::ConsoleLayer;
use conlog::{Level, Logger, LoggerConfig, Tags};

fn main() -> Result<()> {
    // Environment and terminal detection happen once, here
    let config = LoggerConfig::load()?
        .with_env()
        .context("Invalid CONLOG_* environment override")?
        .with_detected_width();

    // Lives for the rest of the process, like the tracing subscriber holding it
    let logger: &'static Logger = Box::leak(Box::new(Logger::new(config)?));

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "conlog=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(ConsoleLayer::new(logger))
        .init();

    tracing::info!(
        "Console width {} columns, level {}",
        logger.console_width(),
        logger.level()
    );

    let log = logger.bind(Some("index"), Some("demo"));
    for level in Level::ALL {
        log.emit(
            level,
            &format!("This is a {} message", level),
            Tags::class("main"),
        );
    }

    log.info(
        "A long message wraps at the console width and every continuation row \
         lines up under the timestamp and level tag so the text stays readable \
         even when it runs across several rows of the terminal.",
        Tags::class("main").with_id("wrap-demo"),
    );

    Ok(())
}
