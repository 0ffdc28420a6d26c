//! Units of work exchanged between the Logger facade and the dispatcher

use super::format::FormatInfo;

/// Callback invoked on the dispatcher thread once a flush has reached every
/// handler. Suspend is built on this: its callback parks the dispatcher
/// before returning.
pub type FlushCallback = Box<dyn FnOnce() + Send>;

/// One unit of work on the pipeline queue. Immutable once enqueued,
/// consumed exactly once by the dispatcher.
pub enum WorkerMessage {
    /// A single physical line. Splitting on embedded newlines and
    /// right-trimming happen in the facade, so `line` never contains `\n`.
    Text {
        format: Option<FormatInfo>,
        timestamp: String,
        line: String,
    },
    /// Change the standing format in every handler that tracks one.
    SetFormat(FormatInfo),
    /// Flush every handler, then run the callback.
    Flush(FlushCallback),
}

impl std::fmt::Debug for WorkerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerMessage::Text { line, .. } => f.debug_struct("Text").field("line", line).finish(),
            WorkerMessage::SetFormat(format) => f.debug_tuple("SetFormat").field(format).finish(),
            WorkerMessage::Flush(_) => f.write_str("Flush"),
        }
    }
}
