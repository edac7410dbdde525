use std::time::Duration;

use criterion::{black_box, criterion_group, Criterion};
use orrery::physics::util::clock::FrameScheduler;

fn bench_uneven_frames(c: &mut Criterion) {
    let deltas = [7u64, 16, 9, 33, 16, 70, 1]
        .iter()
        .map(|ms| Duration::from_millis(*ms))
        .collect::<Vec<_>>();
    c.bench_function("scheduler_uneven_frames", |b| {
        b.iter(|| {
            let mut scheduler = FrameScheduler::default();
            for delta in deltas.iter().cycle().take(1_000) {
                black_box(scheduler.tick(black_box(*delta)));
            }
        })
    });
}

criterion_group!(benches, bench_uneven_frames);
