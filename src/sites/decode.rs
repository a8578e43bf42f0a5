//! Audited payload decoding.
//!
//! Decodes a self-describing JSON document into a value tree. Plain data
//! decodes unconditionally; a `{"$global": {...}}` node is a reference to
//! executable behavior and must be resolved through the allow-table, with
//! `pickle.find_class` raised first so a hook can refuse the resolution.
//! A veto aborts the whole decode with nothing instantiated.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::error::AuditError;
use crate::event::names;
use crate::hooks::AuditEngine;

/// Constructor invoked when a global reference resolves.
pub type Constructor = fn(&[Value]) -> Result<Value, DecodeError>;

/// Errors raised while decoding a payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A hook refused the operation; identity preserved verbatim.
    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error("unknown global {module}.{qualname}")]
    UnknownGlobal { module: String, qualname: String },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Allow-table mapping `(module, qualname)` to constructors.
#[derive(Default)]
pub struct GlobalResolver {
    table: HashMap<(String, String), Constructor>,
}

impl GlobalResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver preloaded with the built-in constructors.
    pub fn with_builtins() -> Self {
        let mut resolver = Self::new();
        resolver.register("std", "str", builtin_str);
        resolver.register("std", "concat", builtin_concat);
        resolver
    }

    pub fn register(&mut self, module: &str, qualname: &str, ctor: Constructor) {
        self.table
            .insert((module.to_owned(), qualname.to_owned()), ctor);
    }

    fn lookup(&self, module: &str, qualname: &str) -> Option<Constructor> {
        self.table
            .get(&(module.to_owned(), qualname.to_owned()))
            .copied()
    }
}

fn builtin_str(args: &[Value]) -> Result<Value, DecodeError> {
    match args {
        [Value::String(s)] => Ok(Value::String(s.clone())),
        [other] => Ok(Value::String(other.to_string())),
        _ => Err(DecodeError::InvalidPayload(
            "std.str takes exactly one argument".into(),
        )),
    }
}

fn builtin_concat(args: &[Value]) -> Result<Value, DecodeError> {
    let mut out = String::new();
    for arg in args {
        match arg {
            Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }
    }
    Ok(Value::String(out))
}

/// Decoder for self-describing payloads with audited global resolution.
pub struct PayloadDecoder {
    engine: AuditEngine,
    resolver: GlobalResolver,
}

impl PayloadDecoder {
    pub fn new(engine: AuditEngine, resolver: GlobalResolver) -> Self {
        Self { engine, resolver }
    }

    /// Decode a serialized payload.
    pub fn decode_str(&self, payload: &str) -> Result<Value, DecodeError> {
        let doc: Value = serde_json::from_str(payload)
            .map_err(|e| DecodeError::InvalidPayload(e.to_string()))?;
        self.decode(&doc)
    }

    /// Decode a parsed document, resolving global references depth-first.
    pub fn decode(&self, doc: &Value) -> Result<Value, DecodeError> {
        match doc {
            Value::Object(map) if map.contains_key("$global") => self.instantiate(doc),
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), self.decode(value)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.decode(item)?);
                }
                Ok(Value::Array(out))
            }
            scalar => Ok(scalar.clone()),
        }
    }

    fn instantiate(&self, node: &Value) -> Result<Value, DecodeError> {
        let spec = node
            .get("$global")
            .and_then(Value::as_object)
            .ok_or_else(|| DecodeError::InvalidPayload("$global must be an object".into()))?;
        let module = spec
            .get("module")
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::InvalidPayload("$global.module missing".into()))?;
        let qualname = spec
            .get("qualname")
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::InvalidPayload("$global.qualname missing".into()))?;

        // The audit fires before any lookup so a hook can refuse even
        // references that would not have resolved.
        self.engine.audit(
            names::PICKLE_FIND_CLASS,
            &[
                Value::String(module.to_owned()),
                Value::String(qualname.to_owned()),
            ],
        )?;

        let ctor =
            self.resolver
                .lookup(module, qualname)
                .ok_or_else(|| DecodeError::UnknownGlobal {
                    module: module.to_owned(),
                    qualname: qualname.to_owned(),
                })?;

        let args = match node.get("args") {
            Some(Value::Array(items)) => {
                let mut decoded = Vec::with_capacity(items.len());
                for item in items {
                    decoded.push(self.decode(item)?);
                }
                decoded
            }
            None => Vec::new(),
            Some(_) => {
                return Err(DecodeError::InvalidPayload("args must be an array".into()));
            }
        };

        ctor(&args)
    }
}
