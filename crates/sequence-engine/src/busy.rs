//! Process-wide busy indicator with scoped acquisition.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Counts in-flight blocking operations (saves, renders, assistant calls).
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct BusyIndicator {
    count: Arc<AtomicUsize>,
}

impl BusyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The indicator shared by every editor in this process.
    pub fn global() -> &'static BusyIndicator {
        static GLOBAL: OnceLock<BusyIndicator> = OnceLock::new();
        GLOBAL.get_or_init(BusyIndicator::new)
    }

    /// Mark busy until the returned guard is dropped.
    pub fn acquire(&self, label: &'static str) -> BusyGuard {
        let previous = self.count.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(label, depth = previous + 1, "Busy acquired");
        BusyGuard {
            count: Arc::clone(&self.count),
            label,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.count.load(Ordering::SeqCst) > 0
    }

    pub fn depth(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// Releases its hold on the indicator when dropped, on every exit path.
#[derive(Debug)]
#[must_use = "the indicator is released as soon as the guard is dropped"]
pub struct BusyGuard {
    count: Arc<AtomicUsize>,
    label: &'static str,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let previous = self.count.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(label = self.label, depth = previous.saturating_sub(1), "Busy released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_scopes_busy_flag() {
        let busy = BusyIndicator::new();
        assert!(!busy.is_busy());
        {
            let _guard = busy.acquire("save");
            assert!(busy.is_busy());
            let _nested = busy.clone().acquire("render");
            assert_eq!(busy.depth(), 2);
        }
        assert!(!busy.is_busy());
    }

    #[test]
    fn released_on_early_return() {
        fn fails(busy: &BusyIndicator) -> Result<(), &'static str> {
            let _guard = busy.acquire("fallible");
            if busy.is_busy() {
                return Err("boom");
            }
            Ok(())
        }
        let busy = BusyIndicator::new();
        assert!(fails(&busy).is_err());
        assert!(!busy.is_busy());
    }

    #[test]
    fn global_is_shared() {
        let a = BusyIndicator::global();
        let b = BusyIndicator::global();
        assert!(std::ptr::eq(a, b));
    }
}
