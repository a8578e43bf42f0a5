//! Audit event names and argument rendering.
//!
//! Event names are the wire contract between emitters and hooks: a
//! namespaced string paired with an ordered argument sequence whose arity
//! and meaning are fixed per event by convention. The dispatcher itself
//! treats arguments opaquely; only the per-event emitters and consumers
//! agree on shape. Positions beyond the documented ones are
//! forward-compatible payload and must be passed through untouched.

use serde_json::Value;

/// Well-known event names emitted by the core and its call sites.
pub mod names {
    /// Emitted by the registration gate before a hook is appended.
    /// Args: `[hook_name]`.
    pub const ADD_AUDIT_HOOK: &str = "sys.addaudithook";

    /// Emitted once per hook during finalization. Args: `[]`.
    /// Failures raised for this event are always discarded.
    pub const CLEAR_AUDIT_HOOKS: &str = "sys._clearaudithooks";

    /// Emitted before an attribute mutation. Args: `[object_tag, attr, value]`.
    pub const SETATTR: &str = "object.__setattr__";

    /// Emitted before an attribute deletion. Args: `[object_tag, attr]`.
    pub const DELATTR: &str = "object.__delattr__";

    /// Emitted before a decoder resolves a global reference.
    /// Args: `[module, qualname]`.
    pub const PICKLE_FIND_CLASS: &str = "pickle.find_class";
}

/// Render an argument sequence for human-readable log output.
///
/// Long renderings are truncated to `max_len` with a trailing ellipsis so
/// a hostile payload cannot flood the audit log.
pub fn render_args(args: &[Value], max_len: usize) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match arg {
            Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }
        if out.len() > max_len {
            let mut cut = max_len;
            while !out.is_char_boundary(cut) {
                cut -= 1;
            }
            out.truncate(cut);
            out.push_str("...");
            break;
        }
    }
    out
}
