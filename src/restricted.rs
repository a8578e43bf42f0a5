//! Restricted execution host.
//!
//! Installs a single privileged logging hook at process start, before any
//! untrusted work runs. The hook appends every audited event to a log
//! file and enforces the restricted policy: no further hooks may attach
//! and no global references may resolve. Because hooks cannot be removed
//! and the logging hook holds first position, nothing registered later
//! can observe events before it or disable it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use rand::RngCore;
use serde_json::Value;
use thiserror::Error;

use crate::config::EnvConfig;
use crate::error::AuditError;
use crate::event::{names, render_args};
use crate::hooks::{AuditEngine, AuditHook};

/// Errors raised while entering restricted mode.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to open audit log {path}: {source}")]
    OpenLog {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The engine refused the logging hook itself.
    #[error(transparent)]
    Audit(#[from] AuditError),
}

/// Generate a short session identifier for the log header.
fn session_id() -> String {
    let mut bytes = [0u8; 8];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The privileged logging hook installed by the restricted host.
///
/// Log lines are `event: message`, one per event, matching what the
/// external log consumers parse. Write failures are ignored: the hook
/// must never turn an I/O problem into a spurious veto, and during
/// finalization there is no caller left to tell.
pub struct RestrictedLogHook {
    sink: Mutex<BufWriter<File>>,
    max_render_len: usize,
}

impl RestrictedLogHook {
    /// Open the audit log and write its session header.
    pub fn open(path: &Path, max_render_len: usize) -> Result<Self, HostError> {
        let file = File::create(path).map_err(|source| HostError::OpenLog {
            path: path.to_owned(),
            source,
        })?;
        let mut sink = BufWriter::new(file);
        let _ = writeln!(
            sink,
            "# sentra audit log session={} opened={}",
            session_id(),
            Utc::now().to_rfc3339()
        );
        let _ = sink.flush();
        Ok(Self {
            sink: Mutex::new(sink),
            max_render_len,
        })
    }

    fn log_line(&self, event: &str, message: &str) {
        let mut sink = self.sink.lock();
        let _ = writeln!(sink, "{event}: {message}");
        let _ = sink.flush();
    }
}

impl AuditHook for RestrictedLogHook {
    fn on_event(&self, event: &str, args: &[Value]) -> Result<(), AuditError> {
        match event {
            names::CLEAR_AUDIT_HOOKS => {
                self.log_line(event, "closing log");
                Ok(())
            }
            names::ADD_AUDIT_HOOK => {
                self.log_line(event, "hook was not added");
                Err(AuditError::vetoed(event, "hook not permitted"))
            }
            names::PICKLE_FIND_CLASS => {
                let module = args.first().and_then(Value::as_str).unwrap_or("?");
                let qualname = args.get(1).and_then(Value::as_str).unwrap_or("?");
                self.log_line(event, &format!("finding {module}.{qualname} blocked"));
                Err(AuditError::vetoed(
                    event,
                    "resolving arbitrary globals is disallowed",
                ))
            }
            _ => {
                self.log_line(event, &render_args(args, self.max_render_len));
                Ok(())
            }
        }
    }

    fn name(&self) -> &str {
        "restricted-log"
    }
}

/// Enter restricted mode on `engine`.
///
/// Must run before any untrusted code gets a chance to register its own
/// hook; the logging hook's first-position veto is what keeps the
/// registry closed afterwards.
pub fn install(engine: &AuditEngine, config: &EnvConfig) -> Result<(), HostError> {
    let hook = RestrictedLogHook::open(&config.audit_log, config.max_render_len)?;
    engine.add_hook(std::sync::Arc::new(hook))?;
    tracing::info!(path = %config.audit_log.display(), "restricted mode active");
    Ok(())
}
