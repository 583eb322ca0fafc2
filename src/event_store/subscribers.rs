//! Explicit observer lists with unsubscribe handles

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T: ?Sized> {
    next_id: u64,
    handlers: Vec<(u64, Handler<T>)>,
}

/// Callback registry for one notification channel
pub(crate) struct Subscribers<T: ?Sized> {
    inner: Arc<Mutex<Registry<T>>>,
}

impl<T: ?Sized + 'static> Subscribers<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    /// Register a handler; it only sees notifications sent after this call
    pub(crate) fn add<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.inner.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.handlers.push((id, Arc::new(handler)));
            id
        };

        let registry: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().handlers.retain(|(hid, _)| *hid != id);
            }
        })
    }

    /// Call every handler in registration order
    ///
    /// The lock is released before handlers run, so a handler may
    /// unsubscribe itself or others.
    pub(crate) fn notify(&self, value: &T) {
        let handlers: Vec<Handler<T>> = self
            .inner
            .lock()
            .handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(value);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().handlers.len()
    }
}

/// Handle returned by a subscribe call
///
/// Dropping the handle keeps the handler registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[must_use = "keep the subscription to be able to unsubscribe later"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new<F>(dispose: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_handlers_receive_notifications_until_unsubscribed() {
        let subscribers: Subscribers<str> = Subscribers::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let subscription = subscribers.add(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        subscribers.notify("a");
        subscribers.notify("b");
        subscription.unsubscribe();
        subscribers.notify("c");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(subscribers.len(), 0);
    }

    #[test]
    fn test_unsubscribe_only_removes_its_own_handler() {
        let subscribers: Subscribers<u32> = Subscribers::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first_seen = Arc::clone(&seen);
        let first = subscribers.add(move |v| first_seen.lock().push(("first", *v)));
        let second_seen = Arc::clone(&seen);
        let _second = subscribers.add(move |v| second_seen.lock().push(("second", *v)));

        subscribers.notify(&1);
        first.unsubscribe();
        subscribers.notify(&2);

        assert_eq!(
            *seen.lock(),
            vec![("first", 1), ("second", 1), ("second", 2)]
        );
    }

    #[test]
    fn test_handler_may_unsubscribe_during_notify() {
        let subscribers: Arc<Subscribers<u32>> = Arc::new(Subscribers::new());
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let slot_in_handler = Arc::clone(&slot);
        let subscription = subscribers.add(move |_| {
            if let Some(subscription) = slot_in_handler.lock().take() {
                subscription.unsubscribe();
            }
        });
        *slot.lock() = Some(subscription);

        subscribers.notify(&1);
        assert_eq!(subscribers.len(), 0);
    }
}
