//! Criterion benchmarks for solving pinned pendulum chains.
//! Focus sizes: links in {4, 16, 64}.
//! Results: by default under target/criterion.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use linkage::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Ground plus `links` unit links at random angles, poses jittered by up to 0.1.
fn jittered_chain(links: usize, seed: u64) -> World {
    let mut rng = StdRng::seed_from_u64(seed);
    let ground = Body::shared("ground", 0.0, 0.0, 0.0);
    let mut constraints: Vec<Constraint> = vec![FixedConstraint::new(&ground).into()];
    let mut parent = ground;
    let (mut px, mut py) = (0.0, 0.0);
    for k in 0..links {
        let a: f64 = rng.gen_range(-3.0..3.0);
        let link = Body::shared(
            format!("link{k}"),
            px + 0.5 * a.cos() + rng.gen_range(-0.1..0.1),
            py + 0.5 * a.sin() + rng.gen_range(-0.1..0.1),
            a + rng.gen_range(-0.1..0.1),
        );
        let parent_anchor = if k == 0 {
            vector![0.0, 0.0]
        } else {
            vector![0.5, 0.0]
        };
        constraints.push(
            RotationalConstraint::new(&parent, parent_anchor, &link, vector![-0.5, 0.0]).into(),
        );
        parent = link;
        px += a.cos();
        py += a.sin();
    }
    World::new(constraints).unwrap()
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");
    for &links in &[4usize, 16, 64] {
        group.bench_with_input(BenchmarkId::new("solve", links), &links, |b, &links| {
            b.iter_batched(
                || jittered_chain(links, 42),
                |mut world| {
                    let _ = world.solve();
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("residual", links), &links, |b, &links| {
            let world = jittered_chain(links, 43);
            let x = world.state();
            b.iter(|| world.residual(&x))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_chain);
criterion_main!(benches);
