use criterion::{black_box, criterion_group, criterion_main, Criterion};

use kanoodle_solver::geometry::orientations;
use kanoodle_solver::pieces::{demo_tetrominoes, demo_trominoes};
use kanoodle_solver::solver::solve_partial;

fn bench_orientations(c: &mut Criterion) {
    let s_tetromino = vec![(1, 0), (2, 0), (0, 1), (1, 1)];
    c.bench_function("orientations/s_tetromino", |b| {
        b.iter(|| orientations(black_box(&s_tetromino)))
    });
}

fn bench_solve_trominoes(c: &mut Criterion) {
    let pieces = demo_trominoes();
    c.bench_function("solve_partial/3x3_trominoes", |b| {
        b.iter(|| solve_partial(3, 3, black_box(&pieces), None, None, None).unwrap())
    });
}

fn bench_solve_tetrominoes(c: &mut Criterion) {
    let pieces = demo_tetrominoes();
    c.bench_function("solve_partial/4x4_tetrominoes", |b| {
        b.iter(|| solve_partial(4, 4, black_box(&pieces), None, None, None).unwrap())
    });
}

criterion_group!(
    benches,
    bench_orientations,
    bench_solve_trominoes,
    bench_solve_tetrominoes
);
criterion_main!(benches);
