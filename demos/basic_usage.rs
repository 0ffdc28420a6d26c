//! Basic usage of the fan-out logging pipeline.
//!
//! Run with: cargo run --example basic_usage

use fanlog::handlers::{HistoryHandler, ServiceFileHandler};
use fanlog::prelude::*;
use std::sync::Arc;

fn main() -> fanlog::Result<()> {
    let history = Arc::new(HistoryHandler::new(100));
    let rolling = Arc::new(ServiceFileHandler::new("demo-logs", "basic-usage")?);

    let mut logger = Logger::builder()
        .console(true)
        .handler(history.clone())
        .handler(rolling.clone())
        .build()?;

    logger.write_banner("Demo starting");
    logger.write_line("plain line");
    logline!(logger, "formatted value: {}", 42);

    let red = FormatInfo::new().with_fore_color(LogColor::Red).with_bold(FontStyle::On);
    logger.write_line_with(red, "something urgent");

    // Standing color applies to everything written after it
    logger.set_fore_color(LogColor::DarkGreen);
    logger.write_line("now in green");
    logger.set_fore_color(LogColor::NoChange);

    // Multi-line text is split into individual lines
    logger.write_line("first\nsecond\nthird");

    // Errors are reported with their whole source chain
    let err = std::io::Error::new(std::io::ErrorKind::NotFound, "settings.toml");
    logger.write_exception_short(&err, "could not load configuration");

    logger.flush()?;
    println!("--- last 5 lines from history ---");
    for line in history.get_history(5, None) {
        println!("{line}");
    }
    if let Some(path) = rolling.current_file() {
        println!("--- rolling log file: {} ---", path.display());
    }

    logger.close();
    Ok(())
}
