//! In-memory history handler

use crate::core::error::Result;
use crate::core::format::FormatInfo;
use crate::core::handler::Handler;
use crate::core::history::HistoryBuffer;

/// Default number of lines a [`HistoryHandler`] retains.
pub const DEFAULT_MAX_HISTORY: usize = 2500;

/// One captured line with the one-shot format it carried, if any.
#[derive(Debug, Clone)]
pub struct HistoryItem {
    pub format: Option<FormatInfo>,
    pub message: String,
}

/// Keeps the most recent lines in memory instead of writing them anywhere.
///
/// Backs "recent log" views in status UIs and makes pipeline behavior easy
/// to assert in tests. Oldest lines are evicted once `max_history` is
/// reached.
pub struct HistoryHandler {
    items: HistoryBuffer<HistoryItem>,
}

impl HistoryHandler {
    pub fn new(max_history: usize) -> Self {
        Self {
            items: HistoryBuffer::new(max_history),
        }
    }

    /// The most recent `count` lines, oldest first. `filter` keeps only
    /// lines containing the given substring.
    pub fn get_history(&self, count: usize, filter: Option<&str>) -> Vec<String> {
        match filter {
            Some(needle) => self
                .items
                .recent_filtered(count, |item| item.message.contains(needle))
                .into_iter()
                .map(|item| item.message)
                .collect(),
            None => self
                .items
                .recent(count)
                .into_iter()
                .map(|item| item.message)
                .collect(),
        }
    }

    /// Like [`HistoryHandler::get_history`] but keeps the per-line formats.
    pub fn get_history_with_format(&self, count: usize) -> Vec<HistoryItem> {
        self.items.recent(count)
    }

    pub fn clear(&self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_history(&self) -> usize {
        self.items.max_items()
    }
}

impl Default for HistoryHandler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl Handler for HistoryHandler {
    fn write(&self, format: Option<&FormatInfo>, line: &str) -> Result<()> {
        self.items.push(HistoryItem {
            format: format.copied(),
            message: line.to_string(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "history"
    }
}
