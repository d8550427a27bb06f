//! Typed observable cell backing every store field.
//!
//! # Responsibility
//! - Hold the latest value of one store field.
//! - Fan out every write to registered callbacks.
//!
//! # Invariants
//! - `subscribe` replays the current value (or a newer one written
//!   concurrently) to the new callback, so late subscribers never start
//!   uninitialized.
//! - Callbacks run synchronously, in registration order, after the internal
//!   lock is released. A callback may read, write or subscribe re-entrantly.
//! - Every write gets a version. A callback only ever moves forward: once it
//!   has been handed version `n` it is never handed an older one, so the last
//!   value a subscriber saw is the value the field holds once writers settle.
//! - One callback is never run concurrently with itself. A write arriving
//!   while that callback is running (from another thread or re-entrantly) is
//!   delivered by the running pass after it returns; if several arrive, only
//!   the newest is delivered.
//! - Writes are not diffed: setting an equal value still notifies.
//! - A disposed subscription is never invoked again, even when a notification
//!   pass that snapshotted it is still running.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Per-callback mailbox.
struct Delivery<T> {
    /// Newest version accepted for this callback.
    latest: Option<u64>,
    pending: Option<T>,
    running: bool,
}

struct Listener<T> {
    id: u64,
    active: Arc<AtomicBool>,
    callback: Callback<T>,
    delivery: Arc<Mutex<Delivery<T>>>,
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            active: Arc::clone(&self.active),
            callback: Arc::clone(&self.callback),
            delivery: Arc::clone(&self.delivery),
        }
    }
}

impl<T> Listener<T> {
    /// Hands `value` (written as `version`) to the callback unless a newer
    /// version already reached it.
    fn deliver(&self, version: u64, value: T) {
        {
            let mut delivery = lock(&self.delivery);
            if delivery.latest.is_some_and(|seen| seen >= version) {
                return;
            }
            delivery.latest = Some(version);
            delivery.pending = Some(value);
            if delivery.running {
                return;
            }
            delivery.running = true;
        }

        let _running = RunningGuard {
            delivery: &self.delivery,
        };
        loop {
            let next = {
                let mut delivery = lock(&self.delivery);
                match delivery.pending.take() {
                    Some(next) => next,
                    None => {
                        delivery.running = false;
                        return;
                    }
                }
            };
            if self.active.load(Ordering::Acquire) {
                (self.callback)(&next);
            }
        }
    }
}

/// Releases the mailbox when a callback panics mid-pass.
struct RunningGuard<'a, T> {
    delivery: &'a Mutex<Delivery<T>>,
}

impl<T> Drop for RunningGuard<'_, T> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            return;
        }
        let mut delivery = lock(self.delivery);
        delivery.running = false;
        delivery.pending = None;
    }
}

struct Slot<T> {
    value: T,
    version: u64,
    next_id: u64,
    listeners: Vec<Listener<T>>,
}

/// Observable value with subscribe-then-replay semantics.
pub struct Observable<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Observable<T>
where
    T: Clone + Send + 'static,
{
    /// Creates an observable holding `value` with no subscribers.
    pub fn new(value: T) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                value,
                version: 0,
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        lock(&self.slot).value.clone()
    }

    /// Runs `f` against the current value without cloning it.
    ///
    /// `f` runs under the internal lock and must not touch this observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&lock(&self.slot).value)
    }

    /// Number of writes so far.
    pub fn version(&self) -> u64 {
        lock(&self.slot).version
    }

    /// Replaces the value and notifies every subscriber.
    pub fn set(&self, value: T) {
        self.update(move |_| value);
    }

    /// Derives the next value from the current one and notifies.
    ///
    /// The read and the write happen under one lock acquisition.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let (version, snapshot, listeners) = {
            let mut slot = lock(&self.slot);
            slot.value = f(&slot.value);
            slot.version += 1;
            (slot.version, slot.value.clone(), slot.listeners.clone())
        };
        for listener in &listeners {
            listener.deliver(version, snapshot.clone());
        }
    }

    /// Registers `callback` and immediately invokes it with the current value.
    ///
    /// The returned [`Subscription`] removes the callback when disposed or
    /// dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let (listener, version, snapshot) = {
            let mut slot = lock(&self.slot);
            let listener = Listener {
                id: slot.next_id,
                active: Arc::clone(&active),
                callback: Arc::new(callback),
                delivery: Arc::new(Mutex::new(Delivery {
                    latest: None,
                    pending: None,
                    running: false,
                })),
            };
            slot.next_id += 1;
            slot.listeners.push(listener.clone());
            (listener, slot.version, slot.value.clone())
        };

        listener.deliver(version, snapshot);
        let id = listener.id;

        let weak: Weak<Mutex<Slot<T>>> = Arc::downgrade(&self.slot);
        Subscription::new(move || {
            active.store(false, Ordering::Release);
            if let Some(slot) = weak.upgrade() {
                lock(&slot).listeners.retain(|listener| listener.id != id);
            }
        })
    }

    /// Number of currently registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.slot).listeners.len()
    }
}

impl<T> Default for Observable<T>
where
    T: Clone + Default + Send + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for Observable<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = lock(&self.slot);
        f.debug_struct("Observable")
            .field("value", &slot.value)
            .field("subscribers", &slot.listeners.len())
            .finish()
    }
}

/// Disposer returned by [`Observable::subscribe`].
///
/// Dropping it unsubscribes, so callers that want the subscription to live
/// must keep the value around (hook adapters store them until unmount).
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new(dispose: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// Removes the callback from its observable.
    pub fn unsubscribe(mut self) {
        self.dispose_now();
    }

    /// Whether this disposer has not run yet.
    pub fn is_active(&self) -> bool {
        self.dispose.is_some()
    }

    fn dispose_now(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

fn lock<S>(mutex: &Mutex<S>) -> MutexGuard<'_, S> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
