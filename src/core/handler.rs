//! Handler trait for log output destinations

use super::error::Result;
use super::format::FormatInfo;
use std::sync::Arc;

/// An output sink that receives fanned-out log lines.
///
/// Methods take `&self`: the dispatcher serializes all calls, and handlers
/// with mutable state (files, buffers) guard it with their own lock so a
/// single instance can be shared by several Loggers.
///
/// Lifecycle: `initialize` is called once when the handler is added to a
/// Logger, `write` zero or more times by the dispatcher, `flush` on explicit
/// flush requests and at shutdown, and `cleanup` once when the Logger closes.
/// Removing a handler does NOT call `cleanup`; the caller owns that.
///
/// `write` is expected to let errors propagate. The dispatcher catches them,
/// counts consecutive failures per handler, and stops invoking a handler
/// after five in a row.
pub trait Handler: Send + Sync {
    /// Called once when the handler is added to a Logger.
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Called by the dispatcher for every line of output. `format` applies
    /// to this line only.
    fn write(&self, format: Option<&FormatInfo>, line: &str) -> Result<()>;

    /// Update the standing format. Handlers that cannot display formatting
    /// ignore this.
    fn set_format(&self, _format: &FormatInfo) {}

    /// Flush any buffered output.
    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Release resources (close files, sockets, etc).
    fn cleanup(&self) {}

    fn name(&self) -> &str;
}

/// Identity comparison for registered handlers. The process-wide singletons
/// (console, debug, delegate) are always the same allocation, so identity
/// dedup is what keeps them single in the fan-out set.
pub(crate) fn same_handler(a: &Arc<dyn Handler>, b: &Arc<dyn Handler>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullHandler;

    impl Handler for NullHandler {
        fn write(&self, _format: Option<&FormatInfo>, _line: &str) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "null"
        }
    }

    #[test]
    fn test_same_handler_identity() {
        let a: Arc<dyn Handler> = Arc::new(NullHandler);
        let b: Arc<dyn Handler> = Arc::new(NullHandler);
        let a2 = Arc::clone(&a);

        assert!(same_handler(&a, &a2));
        assert!(!same_handler(&a, &b));
    }
}
