//! End-to-end tests for hook registration, dispatch, and veto semantics.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};

use sentra_core::error::AuditError;
use sentra_core::event::names;
use sentra_core::hooks::{AuditEngine, AuditHook};
use sentra_core::sites::{AttrTable, DecodeError, GlobalResolver, PayloadDecoder};

/// Collects every observed event; vetoes the configured ones.
struct TestHook {
    seen: Mutex<Vec<(String, Vec<Value>)>>,
    raise_on_events: Vec<&'static str>,
    fatal: bool,
}

impl TestHook {
    fn new() -> Arc<Self> {
        Self::raising(vec![], false)
    }

    fn raising(raise_on_events: Vec<&'static str>, fatal: bool) -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            raise_on_events,
            fatal,
        })
    }

    fn seen_events(&self) -> Vec<String> {
        self.seen.lock().iter().map(|(e, _)| e.clone()).collect()
    }
}

impl AuditHook for TestHook {
    fn on_event(&self, event: &str, args: &[Value]) -> Result<(), AuditError> {
        self.seen.lock().push((event.to_owned(), args.to_vec()));
        if self.raise_on_events.contains(&event) {
            let reason = format!("saw event {event}");
            if self.fatal {
                return Err(AuditError::fatal(reason));
            }
            return Err(AuditError::vetoed(event, reason));
        }
        Ok(())
    }
}

#[test]
fn test_basic() {
    let engine = AuditEngine::new();
    let hook = TestHook::new();
    engine.add_hook(hook.clone()).unwrap();

    engine
        .audit("test_event", &[json!(1), json!(2), json!(3)])
        .unwrap();

    let seen = hook.seen.lock();
    assert_eq!(seen[0].0, "test_event");
    assert_eq!(seen[0].1, vec![json!(1), json!(2), json!(3)]);
}

#[test]
fn test_block_add_hook() {
    // A recoverable veto prevents a new hook from being added but does
    // not propagate out of the registration call.
    let engine = AuditEngine::new();
    let hook1 = TestHook::raising(vec![names::ADD_AUDIT_HOOK], false);
    engine.add_hook(hook1.clone()).unwrap();

    let hook2 = TestHook::new();
    engine.add_hook(hook2.clone()).unwrap();
    assert_eq!(engine.hook_count(), 1);

    engine.audit("test_event", &[]).unwrap();
    assert!(hook1.seen_events().contains(&"test_event".to_string()));
    assert!(!hook2.seen_events().contains(&"test_event".to_string()));
}

#[test]
fn test_block_add_hook_fatal() {
    // A fatal failure propagates out of the registration call.
    let engine = AuditEngine::new();
    let hook1 = TestHook::raising(vec![names::ADD_AUDIT_HOOK], true);
    engine.add_hook(hook1).unwrap();

    let err = engine.add_hook(TestHook::new()).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(engine.hook_count(), 1);
}

#[test]
fn test_dispatch_order_matches_registration_order() {
    let engine = AuditEngine::new();
    let hooks: Vec<_> = (0..4).map(|_| TestHook::new()).collect();
    for hook in &hooks {
        engine.add_hook(hook.clone()).unwrap();
    }

    engine.audit("ordered", &[]).unwrap();

    // Hook i observed the registrations of hooks i+1.. plus the event.
    for (i, hook) in hooks.iter().enumerate() {
        let events = hook.seen_events();
        let registrations = events
            .iter()
            .filter(|e| *e == names::ADD_AUDIT_HOOK)
            .count();
        assert_eq!(registrations, hooks.len() - i - 1);
        assert_eq!(events.last().unwrap(), "ordered");
    }
}

#[test]
fn test_veto_stops_dispatch_and_reaches_caller() {
    let engine = AuditEngine::new();
    let vetoer = TestHook::raising(vec!["guarded.op"], false);
    let bystander = TestHook::new();
    engine.add_hook(vetoer.clone()).unwrap();
    engine.add_hook(bystander.clone()).unwrap();

    let err = engine.audit("guarded.op", &[json!("ctx")]).unwrap_err();
    assert_eq!(
        err,
        AuditError::vetoed("guarded.op", "saw event guarded.op")
    );
    assert!(!bystander
        .seen_events()
        .contains(&"guarded.op".to_string()));
}

#[test]
fn test_monkeypatch_style_attribute_audit() {
    let engine = AuditEngine::new();
    let hook = TestHook::new();
    engine.add_hook(hook.clone()).unwrap();

    let mut table = AttrTable::new(engine, "ClassC");
    table.set_attr("__name__", json!("X")).unwrap();
    table.set_attr("new_attr", json!(123)).unwrap();
    table.del_attr("new_attr").unwrap();

    let seen = hook.seen.lock();
    let actual: Vec<_> = seen
        .iter()
        .filter(|(e, _)| e == names::SETATTR || e == names::DELATTR)
        .map(|(e, a)| (e.clone(), a[0].clone(), a[1].clone()))
        .collect();
    assert_eq!(
        actual,
        vec![
            (names::SETATTR.to_string(), json!("ClassC"), json!("__name__")),
            (names::SETATTR.to_string(), json!("ClassC"), json!("new_attr")),
            (names::DELATTR.to_string(), json!("ClassC"), json!("new_attr")),
        ]
    );
}

#[test]
fn test_vetoed_attribute_mutation_leaves_value_unchanged() {
    let engine = AuditEngine::new();
    let mut table = AttrTable::new(engine.clone(), "obj");
    table.set_attr("state", json!("before")).unwrap();

    engine
        .add_hook(TestHook::raising(vec![names::SETATTR], false))
        .unwrap();

    assert!(table.set_attr("state", json!("after")).is_err());
    assert_eq!(table.get("state"), Some(&json!("before")));
}

#[test]
fn test_decode_payloads_with_and_without_globals() {
    let engine = AuditEngine::new();
    let hook = TestHook::raising(vec![names::PICKLE_FIND_CLASS], false);
    engine.add_hook(hook.clone()).unwrap();

    let decoder = PayloadDecoder::new(engine, GlobalResolver::with_builtins());

    // Payloads with no global references are okay.
    let plain = json!(["a", "b", "c", 1, 2, 3]);
    assert_eq!(decoder.decode(&plain).unwrap(), plain);

    // With the hook enabled, resolving globals is not allowed.
    let global = json!({"$global": {"module": "std", "qualname": "str"},
                        "args": ["Pwned!"]});
    let err = decoder.decode(&global).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Audit(AuditError::Vetoed { .. })
    ));
    assert!(hook
        .seen_events()
        .contains(&names::PICKLE_FIND_CLASS.to_string()));
}

#[test]
fn test_finalize_notifies_every_hook_once_in_order() {
    let engine = AuditEngine::new();
    let first = TestHook::raising(vec![names::CLEAR_AUDIT_HOOKS], true);
    let second = TestHook::new();
    engine.add_hook(first.clone()).unwrap();
    engine.add_hook(second.clone()).unwrap();

    engine.finalize();
    engine.finalize();

    let clears = |h: &TestHook| {
        h.seen_events()
            .iter()
            .filter(|e| *e == names::CLEAR_AUDIT_HOOKS)
            .count()
    };
    assert_eq!(clears(&first), 1);
    assert_eq!(clears(&second), 1);
    assert_eq!(engine.hook_count(), 0);

    // Dispatches after finalization are no-ops.
    engine.audit("late", &[]).unwrap();
    assert!(!first.seen_events().contains(&"late".to_string()));
}
