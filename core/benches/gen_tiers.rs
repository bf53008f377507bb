use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use duelmines_core::*;

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for level in DifficultyLevel::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(level.name()),
            &level,
            |b, &level| {
                let mut seed = 0u64;
                b.iter(|| {
                    seed += 1;
                    black_box(RandomGridGenerator::new(seed).generate(level.board_config()))
                })
            },
        );
    }
    group.finish();
}

fn bench_flood(c: &mut Criterion) {
    let mut group = c.benchmark_group("flood_reveal");
    for level in DifficultyLevel::ALL {
        let grid = RandomGridGenerator::new(17).generate(level.board_config());
        let start = grid
            .coords()
            .find(|&coords| grid.cell_at(coords).kind() == CellKind::Empty)
            .unwrap_or((0, 0));
        group.bench_with_input(
            BenchmarkId::from_parameter(level.name()),
            &grid,
            |b, grid| {
                b.iter(|| {
                    let mut grid = grid.clone();
                    black_box(grid.reveal(start))
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_generate, bench_flood);
criterion_main!(benches);
