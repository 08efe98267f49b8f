//! Criterion benchmarks for the compile pipeline
//!
//! Covers: normalization, script assembly per selector policy, and the
//! full raw-flow-to-text path at increasing flow lengths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flow_compiler::{normalize, CompilerConfig, RawFlow, RawInteraction, ScriptCompiler, SelectorResolutionPolicy};

/// A flow cycling through every interaction kind
fn make_flow(steps: u32) -> RawFlow {
    let mut flow = RawFlow::new("benchmark flow", "https://bench.example.com");
    for i in 1..=steps {
        let interaction = match i % 7 {
            0 => RawInteraction::navigate(i, format!("https://bench.example.com/page/{}", i)),
            1 => RawInteraction::wait(i, 250),
            2 => RawInteraction::click(i, &["#submit", "role=button[name=\"Submit\"]", "text=Submit"]),
            3 => RawInteraction::type_text(i, &["#search"], "criterion"),
            4 => RawInteraction::press_key(i, &["#search"], "Enter"),
            5 => RawInteraction::scroll(i, 0, 480),
            _ => RawInteraction::switch_tab(i, "Results"),
        };
        flow.push(interaction);
    }
    flow
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    for steps in [10u32, 100, 1000] {
        let flow = make_flow(steps);
        group.bench_with_input(BenchmarkId::from_parameter(steps), &flow, |b, flow| {
            b.iter(|| normalize(black_box(flow.clone())).unwrap());
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Script assembly
// ---------------------------------------------------------------------------

fn bench_compile_by_policy(c: &mut Criterion) {
    let flow = normalize(make_flow(100)).unwrap();
    let policies = [
        SelectorResolutionPolicy::FirstOnly,
        SelectorResolutionPolicy::TryInOrderWithTimeout { per_attempt_ms: 2000 },
        SelectorResolutionPolicy::TryAllConcurrentFirstWin,
    ];

    let mut group = c.benchmark_group("compile_by_policy");
    for policy in policies {
        let compiler = ScriptCompiler::with_config(CompilerConfig {
            selector_policy: policy,
            ..Default::default()
        });
        group.bench_function(policy.name(), |b| {
            b.iter(|| compiler.compile(black_box(&flow)));
        });
    }
    group.finish();
}

fn bench_compile_raw(c: &mut Criterion) {
    let compiler = ScriptCompiler::new();

    let mut group = c.benchmark_group("compile_raw");
    for steps in [10u32, 100, 1000] {
        let flow = make_flow(steps);
        group.bench_with_input(BenchmarkId::from_parameter(steps), &flow, |b, flow| {
            b.iter(|| compiler.compile_raw(black_box(flow.clone())).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_compile_by_policy, bench_compile_raw);
criterion_main!(benches);
