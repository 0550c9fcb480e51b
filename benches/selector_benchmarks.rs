use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use mathmatch::engine::level::LevelBuilder;
use mathmatch::engine::selector::{ProblemSelector, SessionHistory};
use mathmatch::{Answer, Difficulty, Operation, Problem, ProblemCatalog};

fn large_catalog(per_pool: usize) -> ProblemCatalog {
    ProblemCatalog::from_problems(Operation::ALL.into_iter().flat_map(|operation| {
        (0..per_pool).map(move |i| Problem {
            text: format!("{} #{i}", operation.as_str()),
            answer: Answer::from(i as i64),
            operation,
            difficulty: Difficulty::Medium,
        })
    }))
}

fn bench_select_single_pool(c: &mut Criterion) {
    let catalog = ProblemCatalog::bundled().expect("bundled catalog");
    let mut selector = ProblemSelector::new(SmallRng::seed_from_u64(7));

    c.bench_function("select 3 (bundled addition/easy, fresh history)", |b| {
        b.iter(|| {
            let mut history = SessionHistory::new();
            selector.select(
                black_box(&catalog),
                &mut history,
                Operation::Addition,
                Difficulty::Easy,
                3,
            )
        })
    });
}

fn bench_select_until_exhaustion(c: &mut Criterion) {
    let catalog = ProblemCatalog::bundled().expect("bundled catalog");
    let mut selector = ProblemSelector::new(SmallRng::seed_from_u64(7));

    // Twenty levels in a row forces several history resets on a 12-problem pool.
    c.bench_function("select 3 x 20 levels (shared history)", |b| {
        b.iter(|| {
            let mut history = SessionHistory::new();
            for _ in 0..20 {
                let _ = selector.select(
                    &catalog,
                    &mut history,
                    Operation::Subtraction,
                    Difficulty::Easy,
                    3,
                );
            }
            history.len()
        })
    });
}

fn bench_select_mixed_large(c: &mut Criterion) {
    let catalog = large_catalog(1_000);
    let mut selector = ProblemSelector::new(SmallRng::seed_from_u64(7));

    c.bench_function("select_mixed 8 (4 x 1000 problems)", |b| {
        b.iter(|| {
            let mut history = SessionHistory::new();
            selector.select_mixed(
                black_box(&catalog),
                &mut history,
                &Operation::ALL,
                Difficulty::Medium,
                8,
            )
        })
    });
}

fn bench_build_level(c: &mut Criterion) {
    let catalog = ProblemCatalog::bundled().expect("bundled catalog");
    let problems = catalog.problems(Operation::Multiplication, Difficulty::Hard)[..3].to_vec();
    let builder = LevelBuilder::default();

    c.bench_function("build level (3 problems)", |b| {
        b.iter(|| builder.build(black_box(4), black_box(&problems)))
    });
}

criterion_group!(
    benches,
    bench_select_single_pool,
    bench_select_until_exhaustion,
    bench_select_mixed_large,
    bench_build_level
);
criterion_main!(benches);
