/// Access serializer — one transfer at a time per device.
///
/// Owns the backing store behind a spin mutex. Every transfer runs inside
/// `with_exclusive`; the guard is dropped on every exit path, including
/// early error returns from the closure.
use core::sync::atomic::{AtomicUsize, Ordering};
use spin::Mutex;

use crate::store::BackingStore;

pub struct AccessSerializer {
    store: Mutex<BackingStore>,
    /// Transfers currently inside the critical section. Never above 1.
    in_flight: AtomicUsize,
    /// Highest value `in_flight` has reached.
    peak: AtomicUsize,
}

/// Decrements the in-flight count when the critical section ends.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl AccessSerializer {
    pub fn new(store: BackingStore) -> Self {
        Self {
            store: Mutex::new(store),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Run `f` with exclusive access to the store, spinning until the
    /// current holder releases it.
    pub fn with_exclusive<R>(&self, f: impl FnOnce(&mut BackingStore) -> R) -> R {
        let mut store = self.store.lock();
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(now, Ordering::AcqRel);
        // Dropped before `store`, so the count falls while the lock is still held.
        let _in_flight = InFlight(&self.in_flight);
        f(&mut *store)
    }

    /// Highest number of transfers ever observed inside the critical section.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }

    pub fn is_locked(&self) -> bool {
        self.store.is_locked()
    }

    /// Give the store back for teardown.
    pub fn into_store(self) -> BackingStore {
        self.store.into_inner()
    }
}
