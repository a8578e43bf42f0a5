//! Telemetry for the audit subsystem.
//!
//! Structured logging via `tracing` and counters via the `metrics` facade.
//! The restricted-mode audit trail is separate (see `crate::restricted`);
//! telemetry observes the subsystem itself and never participates in veto
//! decisions.

mod logging;
mod metrics;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use metrics::{
    init_metrics, record_audit_event, record_finalized_hooks, record_hook_added, record_veto,
};
