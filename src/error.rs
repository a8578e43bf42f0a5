//! Audit failure types for SENTRA.
//!
//! Every hook failure is one of exactly two kinds. `Vetoed` is the ordinary
//! veto signal: it stops dispatch and may be suppressed by specific call
//! sites (hook registration swallows it). `Fatal` must always propagate;
//! no call site in this crate is permitted to discard it outside the
//! finalization broadcast, where every failure is discarded by contract.

use thiserror::Error;

/// Failure raised by an audit hook, classified for propagation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuditError {
    /// Recoverable veto of the audited operation.
    #[error("audit event '{event}' vetoed: {reason}")]
    Vetoed { event: String, reason: String },

    /// Fatal condition that must never be swallowed.
    #[error("fatal audit failure: {0}")]
    Fatal(String),
}

impl AuditError {
    /// Build a recoverable veto for `event`.
    pub fn vetoed(event: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Vetoed {
            event: event.into(),
            reason: reason.into(),
        }
    }

    /// Build a fatal failure.
    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::Fatal(reason.into())
    }

    /// Returns true for failures that must always propagate.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}
