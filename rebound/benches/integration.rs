// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Benchmarks comparing integrator and force-evaluator performance.
//!
//! These benchmarks measure:
//! - Direct-summation throughput for varying particle counts
//! - Leapfrog vs. the adaptive step-doubling integrator on the same system
//! - The cost of a step with no masses present (free motion, cheapest case)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rebound::store::Particle;
use rebound::{AddParticle, DirectSummation, ForceEvaluator, Ias15Like, Integrator, Leapfrog, Simulation};

/// A ring of `n` near-massless particles orbiting a central unit mass at
/// unit distance, spaced evenly in angle.
fn ring_system(n: usize) -> Vec<Particle> {
    let mut sim = Simulation::new();
    sim.add(AddParticle::cartesian(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0)).unwrap();
    for i in 0..n {
        let theta = std::f64::consts::TAU * (i as f64) / (n as f64);
        let (x, y) = (theta.cos(), theta.sin());
        let (vx, vy) = (-theta.sin(), theta.cos());
        sim.add(AddParticle::cartesian(1e-6, x, y, 0.0, vx, vy, 0.0)).unwrap();
    }
    sim.particles().cloned().collect()
}

fn bench_force_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_summation_throughput");

    for &n in &[10usize, 100, 1000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("accelerations", n), &n, |b, &n| {
            let particles = ring_system(n);
            let force = DirectSummation::new();
            let mut out = vec![[0.0_f64; 3]; particles.len()];

            b.iter(|| {
                force.accelerations(black_box(&particles), 1.0, black_box(&mut out));
            });
        });
    }

    group.finish();
}

fn bench_integrator_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrator_throughput");

    for &n in &[10usize, 100, 1000] {
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("leapfrog", n), &n, |b, &n| {
            let mut particles = ring_system(n);
            let force = DirectSummation::new();
            let mut integrator = Leapfrog::new();

            b.iter(|| {
                integrator.step(black_box(&mut particles), &force, 1.0, 0.001);
            });
        });

        group.bench_with_input(BenchmarkId::new("ias15_like", n), &n, |b, &n| {
            let mut particles = ring_system(n);
            let force = DirectSummation::new();
            let mut integrator = Ias15Like::new(1e-9);

            b.iter(|| {
                integrator.step(black_box(&mut particles), &force, 1.0, 0.001);
            });
        });
    }

    group.finish();
}

fn bench_one_orbital_period(c: &mut Criterion) {
    let mut group = c.benchmark_group("one_orbital_period");
    group.sample_size(20);

    let dt = std::f64::consts::TAU / 1000.0;
    let steps = 1000;

    group.bench_function("leapfrog_sun_and_earth", |b| {
        b.iter(|| {
            let mut particles = ring_system(1);
            let force = DirectSummation::new();
            let mut integrator = Leapfrog::new();
            for _ in 0..steps {
                integrator.step(&mut particles, &force, 1.0, dt);
            }
            black_box(particles[1].x)
        });
    });

    group.bench_function("ias15_like_sun_and_earth", |b| {
        b.iter(|| {
            let mut particles = ring_system(1);
            let force = DirectSummation::new();
            let mut integrator = Ias15Like::new(1e-9);
            for _ in 0..steps {
                integrator.step(&mut particles, &force, 1.0, dt);
            }
            black_box(particles[1].x)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_force_throughput,
    bench_integrator_throughput,
    bench_one_orbital_period
);
criterion_main!(benches);
