//! Performance benchmarks for the quill compile pipeline.
//!
//! Each sample program from `test_scripts/` is measured three ways: parse
//! only, full compile, and full compile without constant folding.
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to collect phase timings:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

#![allow(clippy::collapsible_if)]

use bumpalo::Bump;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use quill::{CompilerOptions, Parser, compile_source, compile_source_with};
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
use std::collections::HashMap;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

const SCRIPTS: &[(&str, &str)] = &[
    ("fib", include_str!("../test_scripts/fib.ql")),
    ("tree", include_str!("../test_scripts/tree.ql")),
    ("arrays", include_str!("../test_scripts/arrays.ql")),
    ("control_flow", include_str!("../test_scripts/control_flow.ql")),
    ("linked_list", include_str!("../test_scripts/linked_list.ql")),
];

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// Sum every scope's duration, descending into children.
#[cfg(feature = "profile-with-puffin")]
fn collect_scopes_recursive(
    stream: &puffin::Stream,
    scope: &puffin::Scope,
    scope_collection: &puffin::ScopeCollection,
    scope_timings: &mut HashMap<String, i64>,
) {
    use puffin::Reader;

    if let Some(details) = scope_collection.fetch_by_id(&scope.id) {
        let name = details.name().to_string();
        *scope_timings.entry(name).or_insert(0) += scope.record.duration_ns;
    }

    if scope.child_begin_position < scope.child_end_position {
        if let Ok(reader) = Reader::with_offset(stream, scope.child_begin_position) {
            if let Ok(children) = reader.read_top_scopes() {
                for child in children {
                    collect_scopes_recursive(stream, &child, scope_collection, scope_timings);
                }
            }
        }
    }
}

#[cfg(feature = "profile-with-puffin")]
fn print_profiling_stats() {
    use puffin::Reader;

    let Some(frame_view) = FRAME_VIEW.get() else {
        println!("Profiler not initialized");
        return;
    };

    let view = frame_view.lock();
    let scope_collection = view.scope_collection();

    let mut scope_timings: HashMap<String, i64> = HashMap::new();
    let mut frame_count = 0i64;

    for frame in view.recent_frames() {
        frame_count += 1;
        let Ok(unpacked) = frame.unpacked() else {
            continue;
        };
        for (_thread_info, stream_info) in unpacked.thread_streams.iter() {
            let reader = Reader::from_start(&stream_info.stream);
            if let Ok(scopes) = reader.read_top_scopes() {
                for scope in scopes {
                    collect_scopes_recursive(
                        &stream_info.stream,
                        &scope,
                        scope_collection,
                        &mut scope_timings,
                    );
                }
            }
        }
    }

    println!("\n=== Profiling Summary ({} frames) ===", frame_count);
    let mut entries: Vec<_> = scope_timings.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1));
    for (name, ns) in entries {
        let avg_ns = if frame_count > 0 { *ns / frame_count } else { *ns };
        println!(
            "  {:30} {:>10.2?} avg",
            name,
            std::time::Duration::from_nanos(avg_ns as u64)
        );
    }
    println!("=====================================\n");
}

#[cfg(not(feature = "profile-with-puffin"))]
fn print_profiling_stats() {}

fn parse_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/parse");
    for (name, source) in SCRIPTS {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(*name, |b| {
            b.iter(|| {
                let arena = Bump::new();
                let program = Parser::parse(black_box(source), &arena).unwrap();
                black_box(program.node_count())
            });
        });
    }
    group.finish();
}

fn compile_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("pipeline/compile");
    for (name, source) in SCRIPTS {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(*name, |b| {
            b.iter(|| {
                let module = compile_source(black_box(source)).unwrap();
                end_profiling_frame();
                black_box(module.functions().count())
            });
        });
    }
    group.finish();

    print_profiling_stats();
}

fn unfolded_benchmarks(c: &mut Criterion) {
    let options = CompilerOptions::new()
        .with_constant_folding(false)
        .with_cfg_verification(false);

    let mut group = c.benchmark_group("pipeline/compile_unfolded");
    for (name, source) in SCRIPTS {
        group.bench_function(*name, |b| {
            b.iter(|| {
                let module = compile_source_with(black_box(source), options).unwrap();
                black_box(module.render().len())
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    parse_benchmarks,
    compile_benchmarks,
    unfolded_benchmarks
);
criterion_main!(benches);
