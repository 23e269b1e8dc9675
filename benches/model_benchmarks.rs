// benches/model_benchmarks.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lsqt_model::prelude::*;
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Periodic square lattice, one orbital, four nearest-neighbor hops.
fn square(n: usize) -> LatticeSpec {
    let hop = |dx: i64, dy: i64| HoppingTemplate {
        cell_offset: [dx, dy, 0],
        orbital: 0,
        hopping: Complex::new(-1.0, 0.0),
    };
    LatticeSpec {
        cells: [n, n, 1],
        periodic: [true, true, false],
        transport_axis: 0,
        lattice_constant: [1.0, 1.0, 1.0],
        max_neighbor: 4,
        orbital_positions: vec![[0.0, 0.0, 0.0]],
        hoppings: vec![vec![hop(1, 0), hop(-1, 0), hop(0, 1), hop(0, -1)]],
    }
}

fn benchmark_construction(c: &mut Criterion) {
    let spec = square(200);

    c.bench_function("expand_square_200x200", |b| {
        b.iter(|| black_box(spec.expand(false).unwrap()));
    });

    let table = spec.expand(false).unwrap().table;
    c.bench_function("vacancies_4000_of_40000", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| black_box(apply_vacancies(table.clone(), 4_000, &mut rng).unwrap()));
    });

    let small = square(60).expand(true).unwrap();
    let positions = small.positions.unwrap_or_default();
    let mut rng = StdRng::seed_from_u64(2);
    let impurities = place_impurities(positions.len(), 100, 1.0, &mut rng).unwrap();
    let mut potential = vec![0.0; positions.len()];
    c.bench_function("screened_potential_3600_atoms_100_impurities", |b| {
        b.iter(|| {
            accumulate_screened_potential(
                &mut potential,
                &positions,
                &impurities,
                2.0,
                &small.simulation_box,
            );
            black_box(&potential);
        });
    });

    let mut state = StateVector::zeros(table.number_of_atoms());
    c.bench_function("random_state_40000", |b| {
        let mut rng = StdRng::seed_from_u64(3);
        b.iter(|| state.randomize(false, &mut rng));
    });
}

criterion_group!(benches, benchmark_construction);
criterion_main!(benches);
