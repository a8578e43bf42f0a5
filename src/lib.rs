//! SENTRA - Sentinel Runtime Auditing.
//!
//! An embedded security auditing subsystem: a runtime broadcasts
//! "sensitive operation occurred" events to an ordered set of registered
//! hooks, any of which may veto the operation by signaling failure.
//!
//! # Design Principles
//!
//! - **Always on**: audited call sites cost nothing while no hooks are
//!   registered; the empty check is lock-free and allocation-free.
//! - **Trust order**: hooks run in registration order; the earliest,
//!   most privileged hook sees every event first and its veto cannot be
//!   masked by later hooks.
//! - **One-way ratchet**: hooks cannot be unregistered. The registry is
//!   notified and cleared exactly once, at process finalization.
//! - **Two failure kinds**: a recoverable veto may be swallowed by the
//!   registration gate; a fatal failure always propagates.
//!
//! # Process-global engine
//!
//! The crate-level free functions ([`audit`], [`add_hook`],
//! [`finalize_hooks`], ...) operate on one process-wide [`AuditEngine`],
//! which is how a host runtime embeds the subsystem. Library users who
//! need isolation (tests, embedded scopes) construct their own engine.

pub mod config;
pub mod error;
pub mod event;
pub mod hooks;
pub mod restricted;
pub mod sites;
pub mod telemetry;

use std::sync::OnceLock;

use serde_json::Value;

pub use error::AuditError;
pub use hooks::{ArcHook, AuditEngine, AuditHook};

static GLOBAL_ENGINE: OnceLock<AuditEngine> = OnceLock::new();

/// The process-wide audit engine backing the free functions.
pub fn global_engine() -> &'static AuditEngine {
    GLOBAL_ENGINE.get_or_init(AuditEngine::new)
}

/// True if at least one hook is registered process-wide.
pub fn auditing_enabled() -> bool {
    global_engine().is_enabled()
}

/// Number of process-wide registered hooks.
pub fn hook_count() -> usize {
    global_engine().hook_count()
}

/// Broadcast an audit event to every process-wide hook in order.
///
/// See [`AuditEngine::audit`] for the propagation contract.
pub fn audit(event: &str, args: &[Value]) -> Result<(), AuditError> {
    global_engine().audit(event, args)
}

/// Like [`audit`], building arguments only when a hook will observe them.
pub fn audit_lazy<F>(event: &str, make_args: F) -> Result<(), AuditError>
where
    F: FnOnce() -> Vec<Value>,
{
    global_engine().audit_lazy(event, make_args)
}

/// Register a hook process-wide through the audited gate.
///
/// See [`AuditEngine::add_hook`] for the veto asymmetry.
pub fn add_hook(hook: ArcHook) -> Result<(), AuditError> {
    global_engine().add_hook(hook)
}

/// Notify and release every process-wide hook. Call once, at teardown.
pub fn finalize_hooks() {
    global_engine().finalize()
}
