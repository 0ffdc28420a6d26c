//! # fanlog
//!
//! Asynchronous fan-out logging pipeline.
//!
//! A [`Logger`] accepts lines from any thread and hands them to a dedicated
//! dispatcher thread, which delivers each line to every registered
//! [`Handler`] in insertion order. Writes never block on sink I/O; a
//! misbehaving handler is isolated and, after five consecutive failures,
//! dropped from the fan-out.
//!
//! ## Quick start
//!
//! ```no_run
//! use fanlog::Logger;
//!
//! let logger = Logger::builder()
//!     .console(true)
//!     .file("app.log")
//!     .build()
//!     .unwrap();
//!
//! logger.write_line("service starting");
//! fanlog::logline!(logger, "listening on port {}", 8080);
//! logger.flush().unwrap();
//! ```
//!
//! ## Handlers
//!
//! | Handler | Sink |
//! |---------|------|
//! | [`handlers::ConsoleHandler`] | stdout with ANSI color |
//! | [`handlers::DebugHandler`] | stderr, plain text |
//! | [`handlers::DelegateHandler`] | in-process callbacks |
//! | [`handlers::HistoryHandler`] | bounded in-memory buffer |
//! | [`handlers::FileHandler`] | a single file |
//! | [`handlers::ServiceFileHandler`] | rolling files with space budgets |
//!
//! Custom sinks implement the [`Handler`] trait.

pub mod core;
pub mod handlers;
pub mod macros;

pub use crate::core::{
    FontStyle, FormatInfo, Handler, LogColor, Logger, LoggerBuilder, LoggerError, Result,
};

/// Common imports.
///
/// ```
/// use fanlog::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{
        ExceptionHistory, ExceptionRecord, FontStyle, FormatInfo, Handler, HistoryBuffer,
        LogColor, Logger, LoggerBuilder, LoggerError, Result,
    };
    pub use crate::handlers::{
        ConsoleHandler, DebugHandler, DelegateHandler, FileHandler, HistoryHandler,
        LogFileSize, LogFileSpace, ServiceFileHandler, Subscription,
    };
    pub use crate::{logline, logline_with};
}
