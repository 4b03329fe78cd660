// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use diffn::{
    disjoint::{Disjoint, ProfileMode},
    rectangle::Rectangle,
};
use diffn_store::{engine::PropagationEngine, store::Store};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::hint::black_box;

/// Builds `count` rectangles with random sizes in a square container
/// roomy enough that root propagation succeeds.
fn random_instance(count: usize, seed: u64) -> (Store<i64>, Vec<Rectangle>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut store = Store::new();
    let side = (count as i64 * 4).max(8);

    let rectangles = (0..count)
        .map(|_| {
            let w = rng.random_range(1..=4);
            let h = rng.random_range(1..=4);
            let origins = [store.new_var(0, side - w), store.new_var(0, side - h)];
            let lengths = [store.new_fixed(w), store.new_fixed(h)];
            Rectangle::new(origins, lengths)
        })
        .collect();
    (store, rectangles)
}

/// Fixes rectangles left to right along a diagonal, propagating after each
/// decision and backtracking everything at the end.
fn dive(engine: &mut PropagationEngine<i64>, rectangles: &[Rectangle]) -> usize {
    let mut depth = 0;
    for rect in rectangles {
        let store = engine.store_mut();
        store.push_level();
        let x = rect.origin(0);
        let y = rect.origin(1);
        let (x_min, y_min) = (store.min(x), store.min(y));
        if store.fix(x, x_min).is_err() || store.fix(y, y_min).is_err() {
            break;
        }
        depth += 1;
        if engine.propagate().is_err() {
            break;
        }
    }
    while engine.store_mut().backtrack() {}
    depth
}

fn bench_root_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("disjoint_root_propagation");

    for &count in &[8usize, 16, 32, 64] {
        for mode in [ProfileMode::Pairwise, ProfileMode::Profile] {
            group.throughput(Throughput::Elements(count as u64));
            group.bench_with_input(BenchmarkId::new(mode.to_string(), count), &count, |b, &count| {
                b.iter(|| {
                    let (store, rectangles) = random_instance(count, 42);
                    let mut engine = PropagationEngine::new(store);
                    engine.post(Disjoint::new(rectangles, mode));
                    black_box(engine.propagate().is_ok())
                })
            });
        }
    }
    group.finish();
}

fn bench_dive_and_backtrack(c: &mut Criterion) {
    let mut group = c.benchmark_group("disjoint_dive");

    for &count in &[8usize, 16, 32] {
        let (store, rectangles) = random_instance(count, 7);
        let mut engine = PropagationEngine::new(store);
        engine.post(Disjoint::new(rectangles.clone(), ProfileMode::Profile));
        if engine.propagate().is_err() {
            eprintln!("Instance with {} rectangles is infeasible at the root. Skipping.", count);
            continue;
        }

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(dive(&mut engine, black_box(&rectangles))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_root_propagation, bench_dive_and_backtrack);
criterion_main!(benches);
