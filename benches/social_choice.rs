//! Benchmark: social-choice scoring
//!
//! Scores one test row's ballot profile with every arbiter rule while the
//! number of agents and candidate classes grows.
//!
//! Run with:
//! ```bash
//! cargo bench --bench social_choice
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use featdist::aggregation::{preference_order, SocialChoiceRule};
use featdist::core::seeded_rng;
use rand::Rng;

fn profile(n_agents: usize, n_classes: usize) -> Vec<Vec<usize>> {
    let mut rng = seeded_rng(17);
    (0..n_agents)
        .map(|_| {
            let proba: Vec<f64> = (0..n_classes).map(|_| rng.gen()).collect();
            preference_order(&proba)
        })
        .collect()
}

fn bench_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("social_choice");
    for &(agents, classes) in &[(3, 2), (10, 5), (50, 20)] {
        let ballots = profile(agents, classes);
        for rule in SocialChoiceRule::ALL {
            group.bench_with_input(
                BenchmarkId::new(rule.name(), format!("{}x{}", agents, classes)),
                &ballots,
                |b, ballots| b.iter(|| rule.score(black_box(ballots), classes)),
            );
        }
    }
    group.finish();
}

fn bench_preference_order(c: &mut Criterion) {
    let mut rng = seeded_rng(3);
    let proba: Vec<f64> = (0..100).map(|_| rng.gen()).collect();
    c.bench_function("preference_order_100", |b| {
        b.iter(|| preference_order(black_box(&proba)))
    });
}

criterion_group!(benches, bench_rules, bench_preference_order);
criterion_main!(benches);
