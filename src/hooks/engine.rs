//! Event dispatch, gated registration, and the finalization broadcast.
//!
//! Hooks run in trust order: the first-registered, most-privileged hook
//! gets first look and first veto. A failing hook terminates the dispatch
//! so a successful veto can never be masked by a later, less-trusted
//! hook's silent success.

use std::sync::Arc;

use serde_json::Value;

use crate::error::AuditError;
use crate::event::names;
use crate::telemetry::{
    record_audit_event, record_finalized_hooks, record_hook_added, record_veto,
};

use super::registry::HookRegistry;
use super::ArcHook;

/// Dispatch engine over one hook registry.
///
/// Cloning is cheap and clones share the same registry. One process-wide
/// instance backs the crate-level free functions; tests build local ones.
#[derive(Clone, Default)]
pub struct AuditEngine {
    registry: Arc<HookRegistry>,
}

impl AuditEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if at least one hook is registered.
    ///
    /// Lock-free; callers with expensive argument construction should
    /// check this (or use [`audit_lazy`](Self::audit_lazy)) first.
    pub fn is_enabled(&self) -> bool {
        self.registry.is_active()
    }

    /// Number of registered hooks.
    pub fn hook_count(&self) -> usize {
        self.registry.len()
    }

    /// Broadcast `(event, args)` to every registered hook in order.
    ///
    /// The first failure stops iteration and propagates to the caller
    /// unchanged: a `Vetoed` failure is the call site's to swallow or
    /// translate, a `Fatal` one must escalate. With no hooks registered
    /// this returns immediately without allocating.
    pub fn audit(&self, event: &str, args: &[Value]) -> Result<(), AuditError> {
        if !self.registry.is_active() {
            return Ok(());
        }
        self.dispatch(event, args)
    }

    /// Like [`audit`](Self::audit), but builds the arguments only when at
    /// least one hook will observe them.
    pub fn audit_lazy<F>(&self, event: &str, make_args: F) -> Result<(), AuditError>
    where
        F: FnOnce() -> Vec<Value>,
    {
        if !self.registry.is_active() {
            return Ok(());
        }
        self.dispatch(event, &make_args())
    }

    fn dispatch(&self, event: &str, args: &[Value]) -> Result<(), AuditError> {
        // The snapshot is taken under the read lock and released before
        // any hook runs, so a hook may itself call add_hook without
        // deadlocking, and appends during this dispatch stay invisible.
        let snapshot = self.registry.snapshot();
        record_audit_event(event);
        for hook in &snapshot {
            if let Err(err) = hook.on_event(event, args) {
                record_veto(event, err.is_fatal());
                tracing::debug!(event, hook = hook.name(), %err, "audit dispatch stopped");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Register a hook, giving the already-registered hooks first refusal.
    ///
    /// The `sys.addaudithook` event is dispatched against the current
    /// registry before the candidate is appended, so a hook can never veto
    /// its own admission. A `Vetoed` failure silently blocks the addition
    /// (the caller observes success); a `Fatal` failure aborts the
    /// registration visibly. This is the one place where the dispatcher's
    /// propagate-to-caller default is overridden.
    pub fn add_hook(&self, hook: ArcHook) -> Result<(), AuditError> {
        let payload = [Value::String(hook.name().to_owned())];
        match self.audit(names::ADD_AUDIT_HOOK, &payload) {
            Ok(()) => {
                if self.registry.append(hook) {
                    record_hook_added();
                } else {
                    tracing::warn!("hook registration dropped: registry already finalized");
                }
                Ok(())
            }
            Err(err @ AuditError::Fatal(_)) => Err(err),
            Err(veto) => {
                tracing::info!(hook = payload[0].as_str(), %veto, "hook registration vetoed");
                Ok(())
            }
        }
    }

    /// One-time finalization broadcast.
    ///
    /// Takes ownership of the registry contents (later dispatches see the
    /// empty registry), notifies every hook with `sys._clearaudithooks` in
    /// registration order with all failures discarded, then releases the
    /// hooks in registration order. Each hook's notification
    /// happens-before its release. Subsequent calls are no-ops.
    pub fn finalize(&self) {
        let hooks = match self.registry.clear_and_release() {
            Some(hooks) => hooks,
            None => return,
        };
        tracing::debug!(count = hooks.len(), "clearing audit hooks");
        for hook in &hooks {
            if let Err(err) = hook.on_event(names::CLEAR_AUDIT_HOOKS, &[]) {
                // This runs during teardown; there is no caller left to
                // receive a failure, fatal or not.
                tracing::debug!(hook = hook.name(), %err, "ignored failure during hook clearance");
            }
        }
        record_finalized_hooks(hooks.len());
        drop(hooks);
    }
}
