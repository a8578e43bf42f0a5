//! Ordered, process-lifetime storage for audit hooks.
//!
//! The registry is read on every dispatch and mutated only by the rare
//! append (registration) and the single clear (finalization). Dispatch
//! iterates a snapshot taken under the read lock, so appends concurrent
//! with an in-flight dispatch are never visible to that dispatch and a
//! partially-appended entry can never be observed. A relaxed atomic count
//! gives the hot path its empty check without touching the lock.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::ArcHook;

/// Insertion-ordered hook storage with snapshot-on-read semantics.
///
/// Duplicate hooks (by identity) are permitted and invoked once per
/// occurrence. Once cleared, the registry stays empty for the rest of the
/// process lifetime and further appends are dropped.
#[derive(Default)]
pub struct HookRegistry {
    hooks: RwLock<Vec<ArcHook>>,
    // Mirrors hooks.len(); updated under the write lock.
    active: AtomicUsize,
    cleared: AtomicBool,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock-free check used to short-circuit dispatch when no hooks exist.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed) != 0
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        !self.is_active()
    }

    /// Append a hook at the tail.
    ///
    /// Returns false if the registry has already been cleared; after
    /// shutdown has begun no further registrations are observable.
    pub fn append(&self, hook: ArcHook) -> bool {
        let mut hooks = self.hooks.write();
        if self.cleared.load(Ordering::Acquire) {
            return false;
        }
        hooks.push(hook);
        self.active.store(hooks.len(), Ordering::Release);
        true
    }

    /// Stable view of the current hooks for one dispatch.
    pub fn snapshot(&self) -> Vec<ArcHook> {
        self.hooks.read().clone()
    }

    /// Atomically empty the registry, handing ownership of the previous
    /// contents to the caller.
    ///
    /// Callable once per process lifetime; later calls are a no-op and
    /// return `None`. After this returns, every dispatch sees the empty
    /// registry.
    pub fn clear_and_release(&self) -> Option<Vec<ArcHook>> {
        let mut hooks = self.hooks.write();
        if self.cleared.swap(true, Ordering::AcqRel) {
            return None;
        }
        self.active.store(0, Ordering::Release);
        Some(std::mem::take(&mut *hooks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::Value;

    use crate::error::AuditError;
    use crate::hooks::AuditHook;

    struct Noop;
    impl AuditHook for Noop {
        fn on_event(&self, _event: &str, _args: &[Value]) -> Result<(), AuditError> {
            Ok(())
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = HookRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.is_active());
        assert_eq!(registry.len(), 0);
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let registry = HookRegistry::new();
        let a: ArcHook = Arc::new(Noop);
        let b: ArcHook = Arc::new(Noop);
        assert!(registry.append(a.clone()));
        assert!(registry.append(b.clone()));

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(Arc::ptr_eq(&snapshot[0], &a));
        assert!(Arc::ptr_eq(&snapshot[1], &b));
    }

    #[test]
    fn test_duplicates_by_identity_are_kept() {
        let registry = HookRegistry::new();
        let a: ArcHook = Arc::new(Noop);
        registry.append(a.clone());
        registry.append(a.clone());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_snapshot_is_stable_across_append() {
        let registry = HookRegistry::new();
        registry.append(Arc::new(Noop));
        let snapshot = registry.snapshot();
        registry.append(Arc::new(Noop));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let registry = HookRegistry::new();
        registry.append(Arc::new(Noop));

        let drained = registry.clear_and_release();
        assert_eq!(drained.map(|h| h.len()), Some(1));
        assert!(registry.is_empty());

        assert!(registry.clear_and_release().is_none());
    }

    #[test]
    fn test_append_after_clear_is_dropped() {
        let registry = HookRegistry::new();
        registry.clear_and_release();
        assert!(!registry.append(Arc::new(Noop)));
        assert!(registry.is_empty());
    }
}
