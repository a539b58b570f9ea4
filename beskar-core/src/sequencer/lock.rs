//! Process-wide scan exclusion

use core::sync::atomic::{AtomicBool, Ordering};

/// Allows at most one scan batch at a time
///
/// Intended to live in a `static` shared by every session.
#[derive(Debug, Default)]
pub struct ScanLock {
    held: AtomicBool,
}

impl ScanLock {
    /// Create an unheld lock
    pub const fn new() -> Self {
        Self {
            held: AtomicBool::new(false),
        }
    }

    /// Take the lock, or `None` if a scan is already running
    pub fn try_acquire(&self) -> Option<ScanGuard<'_>> {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| ScanGuard { lock: self })
    }

    /// Check if a scan holds the lock
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Releases the [`ScanLock`] when dropped
#[derive(Debug)]
pub struct ScanGuard<'a> {
    lock: &'a ScanLock,
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.lock.held.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails() {
        let lock = ScanLock::new();
        let guard = lock.try_acquire();
        assert!(guard.is_some());
        assert!(lock.is_held());
        assert!(lock.try_acquire().is_none());
    }

    #[test]
    fn test_drop_releases() {
        let lock = ScanLock::new();
        drop(lock.try_acquire());
        assert!(!lock.is_held());
        assert!(lock.try_acquire().is_some());
    }
}
