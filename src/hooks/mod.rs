//! Audit hook registry and dispatch engine.
//!
//! Hooks are opaque observer callables registered process-wide. They are
//! invoked synchronously, in registration order, for every audited event,
//! and any one of them may veto the operation by returning a failure.
//! Hooks cannot be removed individually; the whole set is notified and
//! released exactly once, at finalization. This one-way ratchet is what
//! makes the mechanism usable as a security control: an untrusted later
//! stage cannot disable an earlier observer.

pub mod engine;
pub mod registry;

use std::sync::Arc;

use serde_json::Value;

use crate::error::AuditError;

pub use engine::AuditEngine;
pub use registry::HookRegistry;

/// An audit observer.
///
/// Implementations must be cheap and non-blocking: hooks run in-line on
/// the caller's thread for every audited event, and a slow hook stalls
/// every dispatch behind it.
pub trait AuditHook: Send + Sync {
    /// Observe one audited event. Returning an error vetoes the operation.
    fn on_event(&self, event: &str, args: &[Value]) -> Result<(), AuditError>;

    /// Identifying name reported in the `sys.addaudithook` payload.
    fn name(&self) -> &str {
        "<anonymous>"
    }
}

/// Closures observe events directly.
impl<F> AuditHook for F
where
    F: Fn(&str, &[Value]) -> Result<(), AuditError> + Send + Sync,
{
    fn on_event(&self, event: &str, args: &[Value]) -> Result<(), AuditError> {
        (self)(event, args)
    }
}

/// Shared ownership handle for stored hooks.
pub type ArcHook = Arc<dyn AuditHook>;
