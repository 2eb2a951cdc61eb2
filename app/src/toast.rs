//! Single-slot, auto-dismissing notifications.
//!
//! # Design
//! `ToastService` is created once at start-up and cloned into whatever needs
//! to notify; clones share one slot. The slot is a `watch` channel so a
//! renderer can wait for changes instead of polling. Each `show` cancels the
//! previous dismissal timer and arms a new one; a generation counter makes a
//! timer that lost the race with `abort` a no-op.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Error,
    Success,
    Info,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToastKind::Error => "error",
            ToastKind::Success => "success",
            ToastKind::Info => "info",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

#[derive(Clone)]
pub struct ToastService {
    inner: Arc<Inner>,
}

struct Inner {
    slot: watch::Sender<Option<Toast>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    generation: AtomicU64,
    duration: Duration,
}

impl Inner {
    fn expire(&self, generation: u64) {
        if self.generation.load(Ordering::SeqCst) == generation {
            debug!("toast expired");
            self.slot.send_replace(None);
        }
    }

    fn cancel_timer(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timer.take() {
            handle.abort();
        }
    }
}

impl ToastService {
    pub fn new(duration: Duration) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                slot,
                timer: Mutex::new(None),
                generation: AtomicU64::new(0),
                duration,
            }),
        }
    }

    /// Replace whatever is showing with `message`.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind) {
        let toast = Toast {
            message: message.into(),
            kind,
        };
        debug!(kind = %toast.kind, message = %toast.message, "showing toast");

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.cancel_timer();
        self.inner.slot.send_replace(Some(toast));

        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime, toast stays until dismissed");
            return;
        };
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let duration = self.inner.duration;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire(generation);
            }
        });
        *self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    pub fn dismiss(&self) {
        debug!("dismissing toast");
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.cancel_timer();
        self.inner.slot.send_replace(None);
    }

    pub fn current(&self) -> Option<Toast> {
        self.inner.slot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Toast>> {
        self.inner.slot.subscribe()
    }
}

impl Default for ToastService {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl fmt::Debug for ToastService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastService")
            .field("current", &self.current())
            .field("duration", &self.inner.duration)
            .finish()
    }
}
