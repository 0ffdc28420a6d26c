//! Logger facade
//!
//! The [`Logger`] owns a dispatcher thread and a fan-out set of handlers.
//! All write operations are fire-and-forget: they enqueue and return without
//! touching any sink. Delivery order is the enqueue order, and within one
//! line the fan-out follows handler insertion order.

use super::dispatcher::{self, HandlerEntry, Shared};
use super::error::{LoggerError, Result};
use super::format::{FormatInfo, LogColor};
use super::handler::{same_handler, Handler};
use super::history::{ExceptionHistory, ExceptionRecord};
use super::message::WorkerMessage;
use crate::handlers::console::ConsoleHandler;
use crate::handlers::debug::DebugHandler;
use crate::handlers::delegate::{DelegateHandler, Subscription};
use crate::handlers::file::FileHandler;
use crossbeam_channel::bounded;
use parking_lot::Mutex;
use std::error::Error;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Timestamp prefix used unless overridden, e.g. `2026/08/25 14:03:07.123`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// How long [`Logger::flush`] and [`Logger::close`] wait by default.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

const BANNER_RULE: &str =
    "################################################################################";
const EXCEPTION_RULE: &str =
    "********************************************************************************";

/// Asynchronous fan-out logger.
///
/// Cheap to write to from any thread; all sink I/O happens on a dedicated
/// background thread. Dropping the Logger closes it with the default
/// timeout.
///
/// # Examples
///
/// ```no_run
/// use fanlog::Logger;
///
/// let logger = Logger::builder()
///     .console(true)
///     .file("app.log")
///     .build()
///     .unwrap();
///
/// logger.write_line("starting up");
/// logger.flush().unwrap();
/// ```
pub struct Logger {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    console_enabled: Mutex<bool>,
    debug_enabled: Mutex<bool>,
    default_format: Mutex<FormatInfo>,
    exception_history: ExceptionHistory,
}

impl Logger {
    /// Create a logger with no output sinks except the process-wide
    /// delegate handler, which is always registered so subscribers set up
    /// via [`Logger::on_log_message`] see every line.
    pub fn new() -> Self {
        let shared = Arc::new(Shared::new(DEFAULT_TIMESTAMP_FORMAT, true));

        // The delegate singleton is registered directly, bypassing
        // add_handler, and keeps raw (un-timestamped) lines.
        let delegate: Arc<dyn Handler> = DelegateHandler::singleton();
        shared.handlers.lock().push(HandlerEntry::new(delegate, false));

        let worker = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("fanlog-dispatcher".to_string())
                .spawn(move || dispatcher::run(shared))
                .expect("spawn dispatcher thread")
        };

        Self {
            shared,
            worker: Some(worker),
            console_enabled: Mutex::new(false),
            debug_enabled: Mutex::new(false),
            default_format: Mutex::new(FormatInfo::UNFORMATTED),
            exception_history: ExceptionHistory::default(),
        }
    }

    /// Logger writing to the console.
    pub fn with_console() -> Result<Self> {
        Self::builder().console(true).build()
    }

    /// Logger writing to a single file, truncated on open.
    pub fn with_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().file(path).build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    // ------------------------------------------------------------------
    // Writing

    /// Queue a line of text. Embedded newlines split the text into
    /// separate lines; trailing whitespace is trimmed from each.
    /// Silently dropped after [`Logger::close`].
    pub fn write_line(&self, text: impl AsRef<str>) {
        self.write_line_impl(None, text.as_ref());
    }

    /// Queue a line with a one-shot format override for this line only.
    pub fn write_line_with(&self, format: FormatInfo, text: impl AsRef<str>) {
        self.write_line_impl(Some(format), text.as_ref());
    }

    fn write_line_impl(&self, format: Option<FormatInfo>, text: &str) {
        if self.is_closed() {
            return;
        }
        self.shared.enqueue_text(format, text);
    }

    /// Queue a framed banner: a rule line, the message, a rule line, and a
    /// trailing blank line.
    pub fn write_banner(&self, message: impl AsRef<str>) {
        self.write_line_impl(None, BANNER_RULE);
        self.write_line_impl(None, &format!("### {}", message.as_ref()));
        self.write_line_impl(None, BANNER_RULE);
        self.write_line_impl(None, "");
    }

    /// Banner with a one-shot format override.
    pub fn write_banner_with(&self, format: FormatInfo, message: impl AsRef<str>) {
        self.write_line_impl(Some(format), BANNER_RULE);
        self.write_line_impl(Some(format), &format!("### {}", message.as_ref()));
        self.write_line_impl(Some(format), BANNER_RULE);
        self.write_line_impl(Some(format), "");
    }

    /// Queue a framed report of an error and its full source chain, and
    /// record it in the exception history.
    ///
    /// Each error in the chain contributes a blank line, its debug
    /// representation, and its display message, outermost error first.
    pub fn write_exception(&self, error: &(dyn Error + 'static), message: impl AsRef<str>) {
        let message = message.as_ref();
        for line in exception_report(message, error) {
            self.write_line_impl(None, &line);
        }
        self.exception_history.record(message, render_chain(error));
    }

    /// Compact one-line-per-error rendition of an error chain. Also
    /// recorded in the exception history.
    pub fn write_exception_short(&self, error: &(dyn Error + 'static), message: impl AsRef<str>) {
        let message = message.as_ref();
        if !message.is_empty() {
            self.write_line_impl(None, message);
        }
        let mut current: Option<&(dyn Error + 'static)> = Some(error);
        while let Some(err) = current {
            self.write_line_impl(None, &format!("  - {err}"));
            current = err.source();
        }
        self.exception_history.record(message, render_chain(error));
    }

    /// Recorded exceptions, oldest first, bounded at 1000 entries.
    pub fn exception_history(&self) -> Vec<ExceptionRecord> {
        self.exception_history.get_history()
    }

    pub fn clear_exception_history(&self) {
        self.exception_history.clear();
    }

    // ------------------------------------------------------------------
    // Handlers

    /// Initialize `handler` and add it to the fan-out set. Adding the same
    /// instance twice is a no-op, which keeps the process-wide singletons
    /// single. Flushes first so the new handler never sees lines queued
    /// before it joined.
    pub fn add_handler(&self, handler: Arc<dyn Handler>) -> Result<()> {
        if !self.is_suspended() {
            // Timeout here is not an error; the handler just joins late.
            let _ = self.flush();
        }

        handler.initialize()?;

        let mut handlers = self.shared.handlers.lock();
        if handlers.iter().any(|e| same_handler(&e.handler, &handler)) {
            return Ok(());
        }
        let timestamp_enabled = self.shared.stamp.read().default_enabled;
        handlers.push(HandlerEntry::new(handler, timestamp_enabled));
        Ok(())
    }

    /// Create, initialize, and register a [`FileHandler`] writing to
    /// `path`. Returns the handler so it can be removed later.
    pub fn add_file(&self, path: impl AsRef<Path>) -> Result<Arc<FileHandler>> {
        let handler = Arc::new(FileHandler::new(path.as_ref()));
        self.add_handler(handler.clone())?;
        Ok(handler)
    }

    /// Remove a handler by identity. Returns whether it was present.
    /// Does not call the handler's `cleanup`; the caller still owns it.
    pub fn remove_handler(&self, handler: &Arc<dyn Handler>) -> bool {
        let mut handlers = self.shared.handlers.lock();
        match handlers.iter().position(|e| same_handler(&e.handler, handler)) {
            Some(index) => {
                handlers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn handler_count(&self) -> usize {
        self.shared.handlers.lock().len()
    }

    /// Toggle the process-wide console handler on this logger.
    pub fn enable_console_output(&self, enabled: bool) -> Result<()> {
        let mut flag = self.console_enabled.lock();
        if *flag == enabled {
            return Ok(());
        }
        *flag = enabled;
        let console: Arc<dyn Handler> = ConsoleHandler::singleton();
        if enabled {
            self.add_handler(console)
        } else {
            self.remove_handler(&console);
            Ok(())
        }
    }

    pub fn console_output_enabled(&self) -> bool {
        *self.console_enabled.lock()
    }

    /// Toggle the process-wide debug (stderr) handler on this logger.
    pub fn enable_debug_output(&self, enabled: bool) -> Result<()> {
        let mut flag = self.debug_enabled.lock();
        if *flag == enabled {
            return Ok(());
        }
        *flag = enabled;
        let debug: Arc<dyn Handler> = DebugHandler::singleton();
        if enabled {
            self.add_handler(debug)
        } else {
            self.remove_handler(&debug);
            Ok(())
        }
    }

    pub fn debug_output_enabled(&self) -> bool {
        *self.debug_enabled.lock()
    }

    /// Subscribe a callback to every line this process logs through the
    /// delegate handler. Lines arrive on the dispatcher thread.
    pub fn on_log_message(
        &self,
        callback: impl Fn(&str) + Send + Sync + 'static,
    ) -> Subscription {
        DelegateHandler::singleton().subscribe(callback)
    }

    pub fn remove_log_subscriber(&self, subscription: Subscription) -> bool {
        DelegateHandler::singleton().unsubscribe(subscription)
    }

    // ------------------------------------------------------------------
    // Timestamps and formatting

    /// Enable or disable the timestamp prefix. Applies to every currently
    /// registered handler and becomes the default for handlers added later.
    pub fn set_timestamp_enabled(&self, enabled: bool) {
        self.shared.stamp.write().default_enabled = enabled;
        for entry in self.shared.handlers.lock().iter_mut() {
            entry.timestamp_enabled = enabled;
        }
    }

    pub fn timestamp_enabled(&self) -> bool {
        self.shared.stamp.read().default_enabled
    }

    /// Override the timestamp prefix for a single handler.
    pub fn set_handler_timestamp(&self, handler: &Arc<dyn Handler>, enabled: bool) -> bool {
        let mut handlers = self.shared.handlers.lock();
        for entry in handlers.iter_mut() {
            if same_handler(&entry.handler, handler) {
                entry.timestamp_enabled = enabled;
                return true;
            }
        }
        false
    }

    /// Set the chrono format string used for timestamps. An empty string
    /// produces bare lines even on handlers with timestamps enabled.
    pub fn set_timestamp_format(&self, format: impl Into<String>) {
        self.shared.stamp.write().format = format.into();
    }

    pub fn timestamp_format(&self) -> String {
        self.shared.stamp.read().format.clone()
    }

    /// Set the standing foreground color on every format-aware handler.
    /// Applied in queue order, so it only affects lines written after it.
    pub fn set_fore_color(&self, color: LogColor) {
        let mut format = self.default_format.lock();
        let updated = format.with_fore_color(color);
        *format = updated;
        drop(format);
        self.send_format(FormatInfo::new().with_fore_color(color));
    }

    pub fn fore_color(&self) -> LogColor {
        self.default_format.lock().fore_color
    }

    /// Set the standing background color on every format-aware handler.
    pub fn set_back_color(&self, color: LogColor) {
        let mut format = self.default_format.lock();
        let updated = format.with_back_color(color);
        *format = updated;
        drop(format);
        self.send_format(FormatInfo::new().with_back_color(color));
    }

    pub fn back_color(&self) -> LogColor {
        self.default_format.lock().back_color
    }

    /// Layer an arbitrary standing format onto every format-aware handler.
    pub fn set_format(&self, format: FormatInfo) {
        let mut current = self.default_format.lock();
        let updated = current.layered(&format);
        *current = updated;
        drop(current);
        self.send_format(format);
    }

    fn send_format(&self, format: FormatInfo) {
        if self.is_closed() {
            return;
        }
        self.shared.enqueue(WorkerMessage::SetFormat(format));
    }

    // ------------------------------------------------------------------
    // Flush, suspend, close

    /// Block until everything queued so far has reached every handler, or
    /// the default timeout elapses. Returns whether the flush completed.
    ///
    /// Errors with [`LoggerError::FlushWhileSuspended`] if called while
    /// suspended; waiting would deadlock against the parked dispatcher.
    pub fn flush(&self) -> Result<bool> {
        self.flush_timeout(DEFAULT_TIMEOUT)
    }

    pub fn flush_timeout(&self, timeout: Duration) -> Result<bool> {
        if self.shared.worker_done.load(Ordering::Acquire) {
            return Ok(true);
        }
        if self.is_suspended() {
            return Err(LoggerError::FlushWhileSuspended);
        }

        let (done_tx, done_rx) = bounded::<()>(1);
        self.shared.enqueue(WorkerMessage::Flush(Box::new(move || {
            let _ = done_tx.send(());
        })));
        Ok(done_rx.recv_timeout(timeout).is_ok())
    }

    /// Flush, then park the dispatcher until [`Logger::resume`]. Returns
    /// once the dispatcher is parked. Writes issued while suspended queue
    /// up and are delivered after resume, in order. Nested suspends are
    /// no-ops.
    pub fn suspend(&self) {
        if self.shared.worker_done.load(Ordering::Acquire) || self.is_suspended() {
            return;
        }

        self.shared.resume.close();

        let (parked_tx, parked_rx) = bounded::<()>(1);
        let shared = Arc::clone(&self.shared);
        self.shared.enqueue(WorkerMessage::Flush(Box::new(move || {
            shared.suspended.store(true, Ordering::Release);
            let _ = parked_tx.send(());
            shared.resume.wait();
            shared.suspended.store(false, Ordering::Release);
        })));

        let _ = parked_rx.recv();
    }

    /// Release a suspended dispatcher. Safe to call when not suspended.
    pub fn resume(&self) {
        self.shared.resume.open();
    }

    pub fn is_suspended(&self) -> bool {
        self.shared.suspended.load(Ordering::Acquire)
    }

    fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
            || self.shared.worker_done.load(Ordering::Acquire)
    }

    /// Shut the pipeline down with the default timeout.
    pub fn close(&mut self) -> bool {
        self.close_timeout(DEFAULT_TIMEOUT)
    }

    /// Flush, stop the dispatcher, and clean up every handler in insertion
    /// order. Returns false when the dispatcher did not finish within
    /// `timeout` and was abandoned; cleanup still runs. Subsequent writes
    /// are dropped, subsequent flushes succeed immediately. Idempotent.
    pub fn close_timeout(&mut self, timeout: Duration) -> bool {
        let Some(handle) = self.worker.take() else {
            return true;
        };

        // Fails only while suspended; close proceeds regardless.
        let _ = self.flush_timeout(timeout);

        self.shared.closed.store(true, Ordering::Release);
        self.shared.signal_quit();

        let mut completed = true;
        let deadline = Instant::now() + timeout;
        loop {
            if handle.is_finished() {
                let _ = handle.join();
                break;
            }
            if Instant::now() >= deadline {
                // Abandon the thread; dropping the handle detaches it.
                completed = false;
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        self.shared.worker_done.store(true, Ordering::Release);

        for entry in self.shared.handlers.lock().iter() {
            entry.handler.cleanup();
        }

        completed
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.close_timeout(DEFAULT_TIMEOUT);
        }
    }
}

/// Framed multi-line report of an error chain: a rule of asterisks, the
/// caller's message, then per error a blank line, the debug representation,
/// and the display message, closed by another rule and a blank line.
pub(crate) fn exception_report(message: &str, error: &(dyn Error + 'static)) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(EXCEPTION_RULE.to_string());
    if !message.is_empty() {
        lines.push(message.to_string());
    }

    let mut current: Option<&(dyn Error + 'static)> = Some(error);
    while let Some(err) = current {
        lines.push(String::new());
        lines.push(format!("{err:?}"));
        lines.push(err.to_string());
        current = err.source();
    }

    lines.push(EXCEPTION_RULE.to_string());
    lines.push(String::new());
    lines
}

fn render_chain(error: &(dyn Error + 'static)) -> String {
    let mut parts = Vec::new();
    let mut current: Option<&(dyn Error + 'static)> = Some(error);
    while let Some(err) = current {
        parts.push(err.to_string());
        current = err.source();
    }
    parts.join("\n")
}

/// Builder for [`Logger`].
///
/// ```no_run
/// use fanlog::Logger;
///
/// let logger = Logger::builder()
///     .timestamp_enabled(false)
///     .console(true)
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    timestamp_format: String,
    timestamp_enabled: bool,
    console: bool,
    debug_output: bool,
    handlers: Vec<Arc<dyn Handler>>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            timestamp_enabled: true,
            console: false,
            debug_output: false,
            handlers: Vec::new(),
        }
    }

    pub fn timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    pub fn timestamp_enabled(mut self, enabled: bool) -> Self {
        self.timestamp_enabled = enabled;
        self
    }

    pub fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    pub fn debug_output(mut self, enabled: bool) -> Self {
        self.debug_output = enabled;
        self
    }

    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Shorthand for adding a [`FileHandler`].
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.handlers.push(Arc::new(FileHandler::new(path.as_ref())));
        self
    }

    pub fn build(self) -> Result<Logger> {
        let logger = Logger::new();
        logger.set_timestamp_format(self.timestamp_format);
        logger.set_timestamp_enabled(self.timestamp_enabled);
        for handler in self.handlers {
            logger.add_handler(handler)?;
        }
        if self.console {
            logger.enable_console_output(true)?;
        }
        if self.debug_output {
            logger.enable_debug_output(true)?;
        }
        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("disk full")]
    struct DiskFull;

    #[derive(Debug, thiserror::Error)]
    #[error("write failed")]
    struct WriteFailed(#[source] DiskFull);

    #[test]
    fn test_exception_report_layout() {
        let err = WriteFailed(DiskFull);
        let lines = exception_report("saving state", &err);

        assert_eq!(
            lines,
            vec![
                EXCEPTION_RULE.to_string(),
                "saving state".to_string(),
                String::new(),
                "WriteFailed(DiskFull)".to_string(),
                "write failed".to_string(),
                String::new(),
                "DiskFull".to_string(),
                "disk full".to_string(),
                EXCEPTION_RULE.to_string(),
                String::new(),
            ]
        );
    }

    #[test]
    fn test_exception_report_without_message() {
        let lines = exception_report("", &DiskFull);
        assert_eq!(lines[0], EXCEPTION_RULE);
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "DiskFull");
    }

    #[test]
    fn test_render_chain() {
        let err = WriteFailed(DiskFull);
        assert_eq!(render_chain(&err), "write failed\ndisk full");
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut logger = Logger::new();
        assert!(logger.close());
        assert!(logger.close());
    }

    #[test]
    fn test_flush_after_close_succeeds() {
        let mut logger = Logger::new();
        logger.close();
        assert!(logger.flush().unwrap());
    }
}
