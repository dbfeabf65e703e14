use RustedLinkage::kinematics::NR_loop_closure::solve_one;
use RustedLinkage::kinematics::analytical::initial_guess;
use RustedLinkage::kinematics::linkage::LinkageParameters;
use RustedLinkage::kinematics::sweep::{ContinuationSweep, SeedingStrategy, angle_range, sweep};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_single_solve(c: &mut Criterion) {
    let params = LinkageParameters::default();
    let (theta3, theta4) = initial_guess(&params, 45.0).unwrap();
    let offset = 20f64.to_radians();
    c.bench_function("solve, 20 deg off", |b| {
        b.iter(|| solve_one(black_box(&params), 45.0, (theta3 + offset, theta4 + offset), false))
    });
}

fn bench_full_turn(c: &mut Criterion) {
    let params = LinkageParameters::default();
    let theta2 = angle_range(0.0, 360.0, 1.0).unwrap();
    let mut group = c.benchmark_group("full turn, 361 samples");
    group.bench_function("warm start", |b| b.iter(|| sweep(black_box(&params), &theta2)));
    let reseed = ContinuationSweep {
        seeding: SeedingStrategy::Reseed,
        ..ContinuationSweep::new()
    };
    group.bench_function("reseed", |b| b.iter(|| reseed.run(black_box(&params), &theta2)));
    group.finish();
}

criterion_group!(benches, bench_single_solve, bench_full_turn);
criterion_main!(benches);
