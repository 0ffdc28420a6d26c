//! Built-in handler implementations

pub mod console;
pub mod debug;
pub mod delegate;
pub mod file;
pub mod history;
pub mod service_file;

pub use console::ConsoleHandler;
pub use debug::DebugHandler;
pub use delegate::{DelegateHandler, Subscription};
pub use file::FileHandler;
pub use history::{HistoryHandler, HistoryItem, DEFAULT_MAX_HISTORY};
pub use service_file::{LogFileSize, LogFileSpace, ServiceFileHandler};
