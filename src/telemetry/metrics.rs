//! Metric recording helpers built on the `metrics` facade.
//!
//! Counters only; the subsystem sits on hot paths and anything heavier
//! belongs in the exporter. All helpers are no-ops until a recorder is
//! installed by the embedding process.

use metrics::{counter, describe_counter};

/// Register metric descriptions. Call once at startup.
pub fn init_metrics() {
    describe_counter!(
        "sentra_audit_events_total",
        "Audit events dispatched to at least one hook"
    );
    describe_counter!(
        "sentra_audit_vetoes_total",
        "Audit dispatches stopped by a hook failure"
    );
    describe_counter!("sentra_hooks_added_total", "Hooks admitted by the gate");
    describe_counter!(
        "sentra_hooks_finalized_total",
        "Hooks notified and released at finalization"
    );
}

/// Record one dispatched event. Only called when hooks are registered;
/// the empty-registry fast path bypasses telemetry entirely.
pub fn record_audit_event(event: &str) {
    counter!("sentra_audit_events_total", "event" => event.to_owned()).increment(1);
}

/// Record a dispatch stopped by a hook failure.
pub fn record_veto(event: &str, fatal: bool) {
    let kind = if fatal { "fatal" } else { "vetoed" };
    counter!("sentra_audit_vetoes_total", "event" => event.to_owned(), "kind" => kind)
        .increment(1);
}

/// Record a successful hook registration.
pub fn record_hook_added() {
    counter!("sentra_hooks_added_total").increment(1);
}

/// Record the finalization broadcast.
pub fn record_finalized_hooks(count: usize) {
    counter!("sentra_hooks_finalized_total").increment(count as u64);
}
