use criterion::{criterion_group, criterion_main, Criterion};
use sudoku_engine::{generate, generate_solved, Game};

fn generate_solved_board(c: &mut Criterion) {
    c.bench_function("generate solved board", |b| b.iter(generate_solved));
}

fn generate_puzzle(c: &mut Criterion) {
    c.bench_function("generate puzzle", |b| b.iter(generate));
}

fn generate_unique_game(c: &mut Criterion) {
    c.bench_function("generate unique game", |b| b.iter(|| Game::new().unwrap()));
}

criterion_group!(
    benches,
    generate_solved_board,
    generate_puzzle,
    generate_unique_game,
);
criterion_main!(benches);
