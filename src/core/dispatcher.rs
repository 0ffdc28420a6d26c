//! Dispatcher state and worker loop
//!
//! One dedicated background thread per Logger drains the message queue and
//! fans each message out to every registered handler. Producers only ever
//! enqueue and signal; handler code runs exclusively on the worker thread.

use super::format::FormatInfo;
use super::handler::Handler;
use super::logger::exception_report;
use super::message::WorkerMessage;
use chrono::Local;
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A handler is skipped for the rest of the session once it has thrown this
/// many exceptions in a row.
pub(crate) const MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// A registered handler plus the bookkeeping the dispatcher owns for it.
pub(crate) struct HandlerEntry {
    pub handler: Arc<dyn Handler>,
    pub timestamp_enabled: bool,
    pub failures: u32,
}

impl HandlerEntry {
    pub fn new(handler: Arc<dyn Handler>, timestamp_enabled: bool) -> Self {
        Self {
            handler,
            timestamp_enabled,
            failures: 0,
        }
    }
}

pub(crate) struct StampConfig {
    pub format: String,
    pub default_enabled: bool,
}

/// Manual-reset gate the worker parks on while suspended.
pub(crate) struct ResumeGate {
    open: Mutex<bool>,
    cond: Condvar,
}

impl ResumeGate {
    fn new() -> Self {
        Self {
            open: Mutex::new(true),
            cond: Condvar::new(),
        }
    }

    pub fn close(&self) {
        *self.open.lock() = false;
    }

    pub fn open(&self) {
        let mut open = self.open.lock();
        *open = true;
        self.cond.notify_all();
    }

    pub fn wait(&self) {
        let mut open = self.open.lock();
        while !*open {
            self.cond.wait(&mut open);
        }
    }
}

/// State shared between the Logger facade and its worker thread.
pub(crate) struct Shared {
    /// Producer side of the double-buffered queue pair. The worker swaps
    /// this wholesale into its private working queue, so producers only
    /// contend with the swap, never with a drain.
    pending: Mutex<VecDeque<WorkerMessage>>,
    data_ready: Condvar,
    pub quit: AtomicBool,
    pub worker_done: AtomicBool,
    pub closed: AtomicBool,
    pub suspended: AtomicBool,
    pub resume: ResumeGate,
    /// Fan-out set; insertion order is delivery order.
    pub handlers: Mutex<Vec<HandlerEntry>>,
    pub stamp: RwLock<StampConfig>,
}

impl Shared {
    pub fn new(timestamp_format: &str, timestamp_enabled: bool) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            data_ready: Condvar::new(),
            quit: AtomicBool::new(false),
            worker_done: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            suspended: AtomicBool::new(false),
            resume: ResumeGate::new(),
            handlers: Mutex::new(Vec::new()),
            stamp: RwLock::new(StampConfig {
                format: timestamp_format.to_string(),
                default_enabled: timestamp_enabled,
            }),
        }
    }

    pub fn enqueue(&self, message: WorkerMessage) {
        self.pending.lock().push_back(message);
        self.data_ready.notify_one();
    }

    /// Enqueue a block of text as individual line messages: split on
    /// embedded newlines, right-trim each sub-line, stamp them all with one
    /// timestamp, signal once.
    pub fn enqueue_text(&self, format: Option<FormatInfo>, text: &str) {
        let timestamp = self.current_timestamp();
        {
            let mut pending = self.pending.lock();
            for raw in text.split('\n') {
                pending.push_back(WorkerMessage::Text {
                    format,
                    timestamp: timestamp.clone(),
                    line: raw.trim_end().to_string(),
                });
            }
        }
        self.data_ready.notify_one();
    }

    pub fn current_timestamp(&self) -> String {
        let stamp = self.stamp.read();
        if stamp.format.is_empty() {
            String::new()
        } else {
            Local::now().format(&stamp.format).to_string()
        }
    }

    pub fn signal_quit(&self) {
        self.quit.store(true, Ordering::Release);
        self.data_ready.notify_all();
    }
}

/// Worker thread main loop. Runs until quit is signaled and the queue has
/// drained, then gives every handler a final flush.
pub(crate) fn run(shared: Arc<Shared>) {
    let mut working: VecDeque<WorkerMessage> = VecDeque::new();

    loop {
        {
            let mut pending = shared.pending.lock();
            while pending.is_empty() && !shared.quit.load(Ordering::Acquire) {
                shared.data_ready.wait(&mut pending);
            }
            std::mem::swap(&mut *pending, &mut working);
        }

        if working.is_empty() {
            // quit was signaled and there is nothing left to drain
            break;
        }

        while let Some(message) = working.pop_front() {
            dispatch(&shared, message);
        }
    }

    // Make sure all handler buffers hit their sinks before the thread dies.
    // Anything still sitting in the pending queue at this point is lost.
    for entry in shared.handlers.lock().iter() {
        let _ = entry.handler.flush();
    }

    shared.worker_done.store(true, Ordering::Release);
}

fn dispatch(shared: &Arc<Shared>, message: WorkerMessage) {
    match message {
        WorkerMessage::Text {
            format,
            timestamp,
            line,
        } => deliver_line(shared, format.as_ref(), &timestamp, &line),

        WorkerMessage::SetFormat(format) => {
            for entry in shared.handlers.lock().iter() {
                entry.handler.set_format(&format);
            }
        }

        WorkerMessage::Flush(callback) => {
            for entry in shared.handlers.lock().iter() {
                let _ = entry.handler.flush();
            }
            // The callback may park this thread (suspend protocol), which is
            // exactly why it runs here and not on the producer side.
            callback();
        }
    }
}

/// Fan one line out to every handler, each inside its own failure boundary.
/// A failing handler never blocks delivery to the others; after five
/// consecutive failures it is skipped for the rest of the session.
fn deliver_line(shared: &Arc<Shared>, format: Option<&FormatInfo>, timestamp: &str, line: &str) {
    let mut handlers = shared.handlers.lock();

    for entry in handlers.iter_mut() {
        if entry.failures >= MAX_CONSECUTIVE_FAILURES {
            continue;
        }

        let stamped;
        let out = if entry.timestamp_enabled && !timestamp.is_empty() {
            stamped = format!("{timestamp} {line}");
            stamped.as_str()
        } else {
            line
        };

        match entry.handler.write(format, out) {
            Ok(()) => entry.failures = 0,
            Err(err) => {
                entry.failures += 1;

                // Both reports go through the pipeline itself so they reach
                // every still-functioning sink.
                if entry.failures >= MAX_CONSECUTIVE_FAILURES {
                    shared.enqueue_text(
                        None,
                        &format!(
                            "Handler {} has thrown {} consecutive exceptions, and will be disabled!",
                            entry.handler.name(),
                            MAX_CONSECUTIVE_FAILURES
                        ),
                    );
                } else if entry.failures == 1 {
                    for report_line in exception_report(
                        &format!("Handler {} threw an exception!", entry.handler.name()),
                        &err,
                    ) {
                        shared.enqueue_text(None, &report_line);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_gate_starts_open() {
        let gate = ResumeGate::new();
        // Must not block
        gate.wait();
    }

    #[test]
    fn test_resume_gate_close_open() {
        let gate = Arc::new(ResumeGate::new());
        gate.close();

        let waiter = {
            let gate = Arc::clone(&gate);
            std::thread::spawn(move || gate.wait())
        };

        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(!waiter.is_finished());

        gate.open();
        waiter.join().expect("waiter thread");
    }

    #[test]
    fn test_enqueue_text_splits_and_trims() {
        let shared = Shared::new("", false);
        shared.enqueue_text(None, "a\nb  \n c ");

        let pending = shared.pending.lock();
        let lines: Vec<&str> = pending
            .iter()
            .map(|m| match m {
                WorkerMessage::Text { line, .. } => line.as_str(),
                _ => panic!("expected text message"),
            })
            .collect();
        assert_eq!(lines, vec!["a", "b", " c"]);
    }

    #[test]
    fn test_empty_format_yields_empty_timestamp() {
        let shared = Shared::new("", true);
        assert_eq!(shared.current_timestamp(), "");
    }

    #[test]
    fn test_literal_format_yields_literal_timestamp() {
        let shared = Shared::new("[ts]", true);
        assert_eq!(shared.current_timestamp(), "[ts]");
    }
}
