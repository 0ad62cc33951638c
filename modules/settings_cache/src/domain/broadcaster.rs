//! In-process change notification for settings
//!
//! Every successful local change is fanned out to all current subscribers:
//! - Handlers run synchronously inside `publish`, in subscription order
//! - A panicking handler is isolated and logged; the rest still run
//! - Subscriptions are removed on `unsubscribe` or when the handle is dropped

use crate::contract::SettingsRecord;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

type Handler = Arc<dyn Fn(&SettingsRecord) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

/// Publish/subscribe channel carrying the full new settings record
#[derive(Default)]
pub struct SettingsBroadcaster {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl SettingsBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler invoked with every published record
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&SettingsRecord) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        let mut subscribers = self.subscribers.lock();
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.handlers.push((id, handler));
        tracing::debug!(subscriber = id, "settings subscriber registered");

        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
            active: AtomicBool::new(true),
        }
    }

    /// Invoke every current subscriber once with `record`.
    ///
    /// Returns the number of handlers that completed without panicking.
    pub fn publish(&self, record: &SettingsRecord) -> usize {
        // Snapshot so handlers can subscribe or unsubscribe re-entrantly.
        let handlers: Vec<(u64, Handler)> = self.subscribers.lock().handlers.clone();

        let mut delivered = 0;
        for (id, handler) in &handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(record))) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    tracing::error!(
                        subscriber = *id,
                        panic = %panic_message(payload.as_ref()),
                        "settings subscriber panicked during publish"
                    );
                }
            }
        }

        tracing::debug!(
            subscribers = handlers.len(),
            delivered,
            language = %record.language,
            "settings change published"
        );
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().handlers.len()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Handle to a registered subscriber. Dropping it unsubscribes.
#[must_use = "dropping a Subscription immediately unsubscribes the handler"]
pub struct Subscription {
    id: u64,
    subscribers: Weak<Mutex<Subscribers>>,
    active: AtomicBool,
}

impl Subscription {
    /// Remove the handler. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers
                .lock()
                .handlers
                .retain(|(id, _)| *id != self.id);
            tracing::debug!(subscriber = self.id, "settings subscriber removed");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
