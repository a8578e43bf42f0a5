//! Audited attribute mutation.
//!
//! The attribute path is the pervasive hot call site: every mutation
//! raises `object.__setattr__` (or `object.__delattr__`) before touching
//! the table, and with no hooks registered the audit must cost nothing.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::AuditError;
use crate::event::names;
use crate::hooks::AuditEngine;

/// A tagged bag of dynamic attributes whose mutations are audited.
///
/// The tag identifies the object in event payloads the way an object
/// reference would; hooks receive `[tag, attr, value]` for assignment and
/// `[tag, attr]` for deletion.
pub struct AttrTable {
    engine: AuditEngine,
    tag: String,
    attrs: HashMap<String, Value>,
}

impl AttrTable {
    pub fn new(engine: AuditEngine, tag: impl Into<String>) -> Self {
        Self {
            engine,
            tag: tag.into(),
            attrs: HashMap::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn get(&self, attr: &str) -> Option<&Value> {
        self.attrs.get(attr)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Assign `attr = value`, auditing first.
    ///
    /// Any hook failure aborts the mutation and propagates unchanged; the
    /// table is only touched when no hook objected.
    pub fn set_attr(&mut self, attr: &str, value: Value) -> Result<(), AuditError> {
        self.engine.audit_lazy(names::SETATTR, || {
            vec![
                Value::String(self.tag.clone()),
                Value::String(attr.to_owned()),
                value.clone(),
            ]
        })?;
        self.attrs.insert(attr.to_owned(), value);
        Ok(())
    }

    /// Remove `attr`, auditing first. Removing an absent attribute is
    /// audited like any other deletion and then succeeds as a no-op.
    pub fn del_attr(&mut self, attr: &str) -> Result<(), AuditError> {
        self.engine.audit_lazy(names::DELATTR, || {
            vec![
                Value::String(self.tag.clone()),
                Value::String(attr.to_owned()),
            ]
        })?;
        self.attrs.remove(attr);
        Ok(())
    }
}
