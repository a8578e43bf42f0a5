//! Dispatch overhead benchmarks.
//!
//! The attribute-mutation call site audits pervasively, so the
//! empty-registry path must stay close to free. The registered-hook cases
//! measure the cost strict ordering imposes once observers exist.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};

use sentra_core::error::AuditError;
use sentra_core::hooks::AuditEngine;

fn counting_hook() -> Arc<dyn sentra_core::hooks::AuditHook> {
    Arc::new(|_event: &str, args: &[Value]| {
        black_box(args.len());
        Ok::<(), AuditError>(())
    })
}

fn bench_empty_registry(c: &mut Criterion) {
    let engine = AuditEngine::new();
    c.bench_function("audit_empty_registry", |b| {
        b.iter(|| engine.audit(black_box("object.__setattr__"), black_box(&[])))
    });

    c.bench_function("audit_lazy_empty_registry", |b| {
        b.iter(|| {
            engine.audit_lazy(black_box("object.__setattr__"), || {
                vec![json!("obj"), json!("attr"), json!(1)]
            })
        })
    });
}

fn bench_registered_hooks(c: &mut Criterion) {
    let args = [json!("obj"), json!("attr"), json!(1)];

    for hooks in [1usize, 4, 16] {
        let engine = AuditEngine::new();
        for _ in 0..hooks {
            engine.add_hook(counting_hook()).unwrap();
        }
        c.bench_function(&format!("audit_{hooks}_hooks"), |b| {
            b.iter(|| engine.audit(black_box("object.__setattr__"), black_box(&args)))
        });
    }
}

criterion_group!(benches, bench_empty_registry, bench_registered_hooks);
criterion_main!(benches);
