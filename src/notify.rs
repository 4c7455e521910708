//! Transient notifications: the short-lived success/error messages both
//! panels surface after commands and failed requests.
//!
//! Messages are logged as they are posted and expire out of the active set
//! after a fixed display TTL. The buffer is shared between the API client
//! (failures) and the panels (optimistic confirmations) via cheap clones.

use log::{error, info};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    posted_at: Instant,
}

impl Notification {
    pub fn age(&self) -> Duration {
        self.posted_at.elapsed()
    }
}

#[derive(Clone)]
pub struct Notifier {
    inner: Rc<RefCell<Vec<Notification>>>,
    ttl: Duration,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Notifier {
            inner: Rc::new(RefCell::new(Vec::new())),
            ttl,
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.post(Level::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.post(Level::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.post(Level::Error, message.into());
    }

    fn post(&self, level: Level, message: String) {
        match level {
            Level::Error => error!("{}", message),
            _ => info!("{}", message),
        }
        self.inner.borrow_mut().push(Notification {
            level,
            message,
            posted_at: Instant::now(),
        });
    }

    /// Unexpired notifications, oldest first. Expired ones are dropped from
    /// the buffer as a side effect.
    pub fn active(&self) -> Vec<Notification> {
        let mut buffer = self.inner.borrow_mut();
        let ttl = self.ttl;
        buffer.retain(|n| n.age() < ttl);
        buffer.clone()
    }

    pub fn latest(&self) -> Option<Notification> {
        self.inner.borrow().last().cloned()
    }

    /// All messages posted at the given level since creation, regardless of
    /// expiry.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.inner
            .borrow()
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.clone())
            .collect()
    }
}
