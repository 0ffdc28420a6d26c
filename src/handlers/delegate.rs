//! Callback fan-out handler

use crate::core::error::Result;
use crate::core::format::FormatInfo;
use crate::core::handler::Handler;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static DELEGATE: Lazy<Arc<DelegateHandler>> = Lazy::new(|| Arc::new(DelegateHandler::new()));

type Callback = Box<dyn Fn(&str) + Send + Sync>;

/// Token returned by [`DelegateHandler::subscribe`]; pass it back to
/// [`DelegateHandler::unsubscribe`] to stop receiving lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

/// Forwards every line to registered callbacks. Formatting is dropped;
/// subscribers get raw text on the dispatcher thread, so callbacks should
/// return quickly or hand off to their own queue.
///
/// Process-wide singleton: every Logger registers the same instance, so a
/// subscriber sees lines from all loggers in the process.
pub struct DelegateHandler {
    subscribers: Mutex<Vec<(u64, Callback)>>,
    next_id: AtomicU64,
}

impl DelegateHandler {
    fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn singleton() -> Arc<DelegateHandler> {
        Arc::clone(&DELEGATE)
    }

    pub fn subscribe(&self, callback: impl Fn(&str) + Send + Sync + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push((id, Box::new(callback)));
        Subscription(id)
    }

    /// Returns whether the subscription was still registered.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(id, _)| *id != subscription.0);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl Handler for DelegateHandler {
    fn write(&self, _format: Option<&FormatInfo>, line: &str) -> Result<()> {
        for (_, callback) in self.subscribers.lock().iter() {
            callback(line);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "delegate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_receives_lines() {
        let handler = DelegateHandler::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sub = {
            let seen = Arc::clone(&seen);
            handler.subscribe(move |line| seen.lock().push(line.to_string()))
        };

        handler.write(None, "one").unwrap();
        handler.write(None, "two").unwrap();
        assert_eq!(*seen.lock(), vec!["one", "two"]);

        assert!(handler.unsubscribe(sub));
        handler.write(None, "three").unwrap();
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_unsubscribe_unknown_returns_false() {
        let handler = DelegateHandler::new();
        let sub = handler.subscribe(|_| {});
        assert!(handler.unsubscribe(sub));
        assert!(!handler.unsubscribe(sub));
    }

    #[test]
    fn test_multiple_subscribers_all_called() {
        let handler = DelegateHandler::new();
        let count = Arc::new(AtomicU64::new(0));

        for _ in 0..3 {
            let count = Arc::clone(&count);
            handler.subscribe(move |_| {
                count.fetch_add(1, Ordering::Relaxed);
            });
        }
        assert_eq!(handler.subscriber_count(), 3);

        handler.write(None, "fan out").unwrap();
        assert_eq!(count.load(Ordering::Relaxed), 3);
    }
}
