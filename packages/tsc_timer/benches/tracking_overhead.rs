//! Benchmarks to measure the overhead of `tsc_timer` slot transitions.
//!
//! Every transition costs one counter read plus a scan over the slots, so the benchmarks
//! compare the counter read strategies and a few slot counts.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::time::Instant;

use criterion::{Criterion, criterion_group, criterion_main};
use tsc_timer::{CounterRead, Label, Timer};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("tsc_timer_overhead");

    // Baseline measurement - the monotonic clock the counter is calibrated against.
    group.bench_function("std_instant_now", |b| {
        b.iter(|| black_box(Instant::now()));
    });

    for (name, counter_read) in [
        ("serialized", CounterRead::Serialized),
        ("light", CounterRead::Light),
    ] {
        let mut timer = Timer::<1>::builder().counter_read(counter_read).build();

        group.bench_function(format!("start_end_1_slot_{name}"), |b| {
            b.iter(|| {
                timer.start(black_box(&[Label::Start(0)]));
                timer.end(black_box(&[0]));
            });
        });

        let mut timer = Timer::<8>::builder().counter_read(counter_read).build();

        group.bench_function(format!("handover_8_slots_{name}"), |b| {
            b.iter(|| {
                timer.start(black_box(&[Label::Start(0), Label::Start(1)]));
                timer.start(black_box(&[
                    Label::Start(0),
                    Label::Stop(1),
                    Label::Start(2),
                ]));
                timer.end(black_box(&[0, 2]));
            });
        });
    }

    group.finish();
}
