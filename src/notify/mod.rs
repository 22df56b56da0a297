//! Transient user-facing messages. Each one expires on its own timer; dismissing
//! early cancels that timer, and teardown cancels all of them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_LIFETIME: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
}

#[derive(Default)]
struct Inner {
    visible: Vec<Notification>,
    timers: HashMap<Uuid, JoinHandle<()>>,
    closed: bool,
}

impl Inner {
    fn cancel_all(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Mutex<Inner>>,
    lifetime: Duration,
}

impl Notifier {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            lifetime,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // a panic while holding the lock cannot leave the list half-written
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Shows a message and schedules its expiry. Outside a tokio runtime it stays until dismissed.
    pub fn show(&self, message: impl Into<String>, severity: Severity) -> Uuid {
        let note = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
        };
        let id = note.id;
        let mut inner = self.lock();
        if inner.closed {
            debug!(%id, "notifier torn down; message dropped");
            return id;
        }
        debug!(%id, ?severity, message = %note.message, "notification shown");
        inner.visible.push(note);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let weak = Arc::downgrade(&self.inner);
                let lifetime = self.lifetime;
                let timer = handle.spawn(async move {
                    tokio::time::sleep(lifetime).await;
                    expire(&weak, id);
                });
                inner.timers.insert(id, timer);
            }
            Err(_) => warn!(%id, "no async runtime; notification will not auto-expire"),
        }
        id
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.show(message, Severity::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> Uuid {
        self.show(message, Severity::Error)
    }

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.show(message, Severity::Info)
    }

    /// Removes a message before it expires. Returns whether it was still visible.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut inner = self.lock();
        if let Some(timer) = inner.timers.remove(&id) {
            timer.abort();
        }
        let before = inner.visible.len();
        inner.visible.retain(|n| n.id != id);
        inner.visible.len() != before
    }

    pub fn visible(&self) -> Vec<Notification> {
        self.lock().visible.clone()
    }

    pub fn pending_timers(&self) -> usize {
        self.lock().timers.len()
    }

    /// Cancels every pending expiry and stops accepting messages.
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        inner.cancel_all();
        inner.visible.clear();
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_LIFETIME)
    }
}

fn expire(inner: &Weak<Mutex<Inner>>, id: Uuid) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
    inner.timers.remove(&id);
    inner.visible.retain(|n| n.id != id);
}
