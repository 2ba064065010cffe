//! User-facing notices for cart changes.
//!
//! The engine never renders anything; it hands a [`Notice`] to whatever sink
//! the caller injected. [`NoticeBus`] fans notices out to any number of UI
//! subscribers.

use std::sync::{Mutex, mpsc};
use std::time::Duration;

/// How long a toast stays on screen.
pub const NOTICE_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
}

/// A toast describing one committed cart change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub duration: Duration,
}

impl Notice {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
            duration: NOTICE_DURATION,
        }
    }
}

/// Receiver of cart notices, injected by the UI layer.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

impl<F> NotificationSink for F
where
    F: Fn(Notice) + Send + Sync,
{
    fn notify(&self, notice: Notice) {
        self(notice)
    }
}

/// A subscription to a [`NoticeBus`].
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::Receiver<Notice>,
}

impl Subscription {
    /// Block until the next notice is available.
    pub fn recv(&self) -> Result<Notice, mpsc::RecvError> {
        self.receiver.recv()
    }

    pub fn try_recv(&self) -> Result<Notice, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Notice, mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Everything delivered so far, without blocking.
    pub fn drain(&self) -> Vec<Notice> {
        self.receiver.try_iter().collect()
    }
}

/// Broadcast sink: every subscriber gets a copy of every notice.
#[derive(Debug, Default)]
pub struct NoticeBus {
    subscribers: Mutex<Vec<mpsc::Sender<Notice>>>,
}

impl NoticeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        // A poisoned lock still hands out a subscription; it just stays silent.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        Subscription { receiver: rx }
    }
}

impl NotificationSink for NoticeBus {
    fn notify(&self, notice: Notice) {
        let Ok(mut subs) = self.subscribers.lock() else {
            tracing::warn!("notice bus lock poisoned; dropping notice");
            return;
        };
        // Drop any dead subscribers while publishing.
        subs.retain(|tx| tx.send(notice.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn bus_fans_out_to_every_subscriber() {
        let bus = NoticeBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.notify(Notice::new(Severity::Success, "Item Added to Cart", "x"));

        assert_eq!(a.drain().len(), 1);
        assert_eq!(b.try_recv().unwrap().severity, Severity::Success);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = NoticeBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());

        bus.notify(Notice::new(Severity::Info, "t", "m"));
        bus.notify(Notice::new(Severity::Info, "t", "m"));

        assert_eq!(kept.drain().len(), 2);
        assert_eq!(bus.subscribers.lock().unwrap().len(), 1);
    }

    #[test]
    fn closures_are_sinks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let sink: Arc<dyn NotificationSink> = Arc::new(move |n: Notice| {
            captured.lock().unwrap().push(n.title);
        });

        sink.notify(Notice::new(Severity::Warning, "Cart Cleared", ""));
        assert_eq!(*seen.lock().unwrap(), vec!["Cart Cleared".to_string()]);
    }

    #[test]
    fn notices_default_to_two_seconds() {
        let notice = Notice::new(Severity::Info, "t", "m");
        assert_eq!(notice.duration, Duration::from_secs(2));
    }
}
