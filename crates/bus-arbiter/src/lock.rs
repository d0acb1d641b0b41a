use portable_atomic::{AtomicBool, Ordering};

/// Advisory single-owner lock embedded in every bus object.
///
/// The lock does not record *who* holds it: [`unlock`](Self::unlock) clears
/// it for any caller, including one that never acquired it. Clients are
/// expected to pair every successful [`try_lock`](Self::try_lock) with an
/// `unlock` of their own.
#[derive(Debug, Default)]
pub struct BusLock {
    locked: AtomicBool,
}

impl BusLock {
    /// Create an unlocked lock.
    pub const fn new() -> Self {
        Self { locked: AtomicBool::new(false) }
    }

    /// Take the lock if it is free. Never blocks.
    ///
    /// Not reentrant: while the lock is held every call returns `false`,
    /// including calls from the current holder.
    pub fn try_lock(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Whether the lock is currently held by anyone.
    #[inline]
    pub fn has_lock(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Release the lock unconditionally.
    pub fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}
