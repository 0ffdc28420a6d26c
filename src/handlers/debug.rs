//! Diagnostic stderr handler

use crate::core::error::Result;
use crate::core::format::FormatInfo;
use crate::core::handler::Handler;
use once_cell::sync::Lazy;
use std::io::Write;
use std::sync::Arc;

static DEBUG: Lazy<Arc<DebugHandler>> = Lazy::new(|| Arc::new(DebugHandler::default()));

/// Plain-text handler for the diagnostic stream (stderr). Ignores all
/// formatting. Process-wide singleton like the console handler.
#[derive(Default)]
pub struct DebugHandler;

impl DebugHandler {
    pub fn singleton() -> Arc<DebugHandler> {
        Arc::clone(&DEBUG)
    }
}

impl Handler for DebugHandler {
    fn write(&self, _format: Option<&FormatInfo>, line: &str) -> Result<()> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{line}")?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "debug"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singleton_identity() {
        assert!(Arc::ptr_eq(
            &DebugHandler::singleton(),
            &DebugHandler::singleton()
        ));
    }

    #[test]
    fn test_write_succeeds() {
        let handler = DebugHandler;
        assert!(handler.write(None, "diagnostic line").is_ok());
        assert!(handler.flush().is_ok());
    }
}
