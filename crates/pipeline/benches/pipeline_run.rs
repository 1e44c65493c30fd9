//! Benchmarks for filter composition and query execution
//!
//! Run with: cargo bench --package pipeline
//!
//! Composition should stay negligible next to execution; this keeps an eye on both.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pipeline::filters::{ExactMatch, Limit, NumericRange, Search, Sort};
use pipeline::{FilterPipeline, RequestParams};
use records::{Query, Record, User, UserDraft};

fn build_pipeline() -> FilterPipeline {
    FilterPipeline::new()
        .add_stage(Search::new("name"))
        .and_then(|p| p.add_stage(ExactMatch::new("role")))
        .and_then(|p| p.add_stage(NumericRange::new("age")))
        .and_then(|p| p.add_stage(Sort::new("sort", ["name", "age"])))
        .and_then(|p| p.add_stage(Limit::new("limit", 1000)))
        .expect("Failed to build pipeline")
}

fn build_users(count: u64) -> Vec<User> {
    (1..=count)
        .map(|id| {
            let role = if id % 7 == 0 { "admin" } else { "member" };
            let draft = UserDraft::new(format!("User {id}"), format!("user{id}@example.com"))
                .with_age((18 + id % 60) as u32)
                .with_role(role);
            User::from_draft(id, draft).expect("Failed to build user")
        })
        .collect()
}

fn bench_compose(c: &mut Criterion) {
    let pipeline = build_pipeline();
    let request =
        RequestParams::from_query_string("name=user&role=member&age=20,40&sort=-age&limit=50");

    c.bench_function("pipeline_compose", |b| {
        b.iter(|| {
            let query = pipeline
                .run(black_box(&request), Query::for_record::<User>())
                .unwrap();
            black_box(query)
        })
    });
}

fn bench_execute(c: &mut Criterion) {
    let pipeline = build_pipeline();
    let users = build_users(10_000);
    let request = RequestParams::from_query_string("name=user&role=member&age=20,40&sort=-age");
    let query = pipeline
        .run(&request, Query::for_record::<User>())
        .expect("Failed to compose query");

    c.bench_function("query_execute_10k", |b| {
        b.iter(|| {
            let rows = query.execute(black_box(users.clone()));
            black_box(rows)
        })
    });
}

criterion_group!(benches, bench_compose, bench_execute);
criterion_main!(benches);
