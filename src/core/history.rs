//! Bounded in-memory history buffers

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Fixed-capacity FIFO of the most recent items.
///
/// Pushing past capacity evicts the oldest entries. Reads are snapshot
/// copies taken under the same lock as writes, so a read never observes a
/// write in progress.
pub struct HistoryBuffer<T> {
    items: Mutex<VecDeque<T>>,
    max_items: usize,
}

impl<T> HistoryBuffer<T> {
    pub fn new(max_items: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            max_items,
        }
    }

    pub fn push(&self, item: T) {
        let mut items = self.items.lock();
        items.push_back(item);
        while items.len() > self.max_items {
            items.pop_front();
        }
    }

    pub fn clear(&self) {
        self.items.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Maximum number of items retained.
    pub fn max_items(&self) -> usize {
        self.max_items
    }
}

impl<T: Clone> HistoryBuffer<T> {
    /// Snapshot of the most recent `count` items, oldest first.
    pub fn recent(&self, count: usize) -> Vec<T> {
        let items = self.items.lock();
        let skip = items.len().saturating_sub(count);
        items.iter().skip(skip).cloned().collect()
    }

    /// Snapshot of the most recent `count` items that satisfy `keep`.
    pub fn recent_filtered(&self, count: usize, keep: impl Fn(&T) -> bool) -> Vec<T> {
        let items = self.items.lock();
        let skip = items.len().saturating_sub(count);
        items.iter().skip(skip).filter(|i| keep(i)).cloned().collect()
    }
}

/// One recorded exception report.
#[derive(Debug, Clone)]
pub struct ExceptionRecord {
    /// When the exception was logged.
    pub timestamp: DateTime<Local>,
    /// The message the application logged alongside the error, if any.
    pub message: String,
    /// Rendered error chain, outermost first.
    pub detail: String,
}

/// Bounded record of every exception written through a Logger.
///
/// Useful for surfacing "what went wrong recently" in a status page or a
/// post-mortem dump without re-parsing log files.
pub struct ExceptionHistory {
    buffer: HistoryBuffer<ExceptionRecord>,
}

pub const DEFAULT_EXCEPTION_HISTORY: usize = 1000;

impl ExceptionHistory {
    pub fn new(max_items: usize) -> Self {
        Self {
            buffer: HistoryBuffer::new(max_items),
        }
    }

    pub(crate) fn record(&self, message: &str, detail: String) {
        self.buffer.push(ExceptionRecord {
            timestamp: Local::now(),
            message: message.to_string(),
            detail,
        });
    }

    /// Copy of the current history, oldest first.
    pub fn get_history(&self) -> Vec<ExceptionRecord> {
        self.buffer.recent(usize::MAX)
    }

    pub fn clear(&self) {
        self.buffer.clear();
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for ExceptionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_EXCEPTION_HISTORY)
    }
}
