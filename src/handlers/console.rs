//! Colored stdout handler

use crate::core::error::Result;
use crate::core::format::{FontStyle, FormatInfo};
use crate::core::handler::Handler;
use colored::Colorize;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

static CONSOLE: Lazy<Arc<ConsoleHandler>> = Lazy::new(|| {
    Arc::new(ConsoleHandler {
        current: Mutex::new(FormatInfo::UNFORMATTED),
    })
});

/// Writes lines to stdout with ANSI color and style.
///
/// One instance per process. stdout is a shared resource, so the handler is
/// a singleton and loggers registering it dedup on identity; the standing
/// format is likewise process-wide.
pub struct ConsoleHandler {
    current: Mutex<FormatInfo>,
}

impl ConsoleHandler {
    pub fn singleton() -> Arc<ConsoleHandler> {
        Arc::clone(&CONSOLE)
    }

    /// The standing format layered with the line's one-shot override.
    fn effective_format(&self, over: Option<&FormatInfo>) -> FormatInfo {
        let current = self.current.lock();
        match over {
            Some(over) => current.layered(over),
            None => *current,
        }
    }
}

fn render(line: &str, format: &FormatInfo) -> String {
    let mut fore = format.fore_color;
    if format.bold.is_on() {
        fore = fore.bold_promotion();
    }

    let mut styled = line.normal();
    if let Some(color) = fore.terminal_color() {
        styled = styled.color(color);
    }
    if let Some(color) = format.back_color.terminal_color() {
        styled = styled.on_color(color);
    }
    if format.bold.is_on() {
        styled = styled.bold();
    }
    if format.italic.is_on() {
        styled = styled.italic();
    }
    if format.underline.is_on() {
        styled = styled.underline();
    }
    styled.to_string()
}

impl Handler for ConsoleHandler {
    fn write(&self, format: Option<&FormatInfo>, line: &str) -> Result<()> {
        let effective = self.effective_format(format);
        let rendered = render(line, &effective);

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{rendered}")?;
        Ok(())
    }

    fn set_format(&self, format: &FormatInfo) {
        let mut current = self.current.lock();
        *current = current.layered(format);
    }

    fn flush(&self) -> Result<()> {
        std::io::stdout().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::LogColor;

    #[test]
    fn test_singleton_identity() {
        let a = ConsoleHandler::singleton();
        let b = ConsoleHandler::singleton();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_render_plain_when_unformatted() {
        colored::control::set_override(false);
        assert_eq!(render("hello", &FormatInfo::UNFORMATTED), "hello");
        colored::control::unset_override();
    }

    #[test]
    fn test_render_applies_color() {
        colored::control::set_override(true);
        let format = FormatInfo::new().with_fore_color(LogColor::Red);
        let rendered = render("hello", &format);
        assert!(rendered.contains("hello"));
        assert_ne!(rendered, "hello");
        colored::control::unset_override();
    }

    #[test]
    fn test_effective_format_layers_override() {
        let handler = ConsoleHandler {
            current: Mutex::new(FormatInfo::new().with_back_color(LogColor::Blue)),
        };
        let over = FormatInfo::new()
            .with_fore_color(LogColor::Red)
            .with_bold(FontStyle::On);

        let effective = handler.effective_format(Some(&over));
        assert_eq!(effective.fore_color, LogColor::Red);
        assert_eq!(effective.back_color, LogColor::Blue);
        assert!(effective.bold.is_on());
    }
}
