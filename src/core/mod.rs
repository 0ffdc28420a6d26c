//! Core pipeline: message queue, dispatcher, handler contract, and the
//! Logger facade.

pub(crate) mod dispatcher;
pub mod error;
pub mod format;
pub mod handler;
pub mod history;
pub mod logger;
pub(crate) mod message;

pub use error::{LoggerError, Result};
pub use format::{FontStyle, FormatInfo, LogColor};
pub use handler::Handler;
pub use history::{ExceptionHistory, ExceptionRecord, HistoryBuffer, DEFAULT_EXCEPTION_HISTORY};
pub use logger::{Logger, LoggerBuilder, DEFAULT_TIMEOUT, DEFAULT_TIMESTAMP_FORMAT};
