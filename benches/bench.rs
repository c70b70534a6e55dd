//! Criterion benchmarks for predicate construction and compilation.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use kopis::analysis::LowercaseNormalizer;
use kopis::backend::{JsonBackend, NativeBackend, SearchBackend};
use kopis::schema::{FieldDefinition, Schema};
use kopis::scope::SearchScope;

fn bench_schema() -> Schema {
    let mut schema = Schema::new();
    schema
        .add_field(
            "title",
            FieldDefinition::text().with_normalizer(Arc::new(LowercaseNormalizer::new())),
        )
        .unwrap();
    schema.add_field("tags", FieldDefinition::text()).unwrap();
    schema.add_field("price", FieldDefinition::float()).unwrap();
    schema
}

fn build_wide_boolean<B: SearchBackend>(scope: &SearchScope<B>, width: usize) -> B::Fragment {
    let factory = scope.predicate();
    let mut builder = factory.boolean();
    for i in 0..width {
        builder
            .should_with(|f| {
                let mut term = f.term("tags").unwrap();
                term.text(format!("tag-{i}")).unwrap();
                term.build()
            })
            .unwrap();
    }
    builder
        .must_with(|f| {
            let mut wildcard = f.wildcard("title").unwrap();
            wildcard.pattern("Sea*").unwrap();
            wildcard.build()
        })
        .unwrap();
    builder.minimum_should_match_percent(50).unwrap();
    builder.build().unwrap()
}

fn bench_predicate_compilation(c: &mut Criterion) {
    let schema = bench_schema();
    let native_scope = SearchScope::new(&schema, NativeBackend::new()).unwrap();
    let json_scope = SearchScope::new(&schema, JsonBackend::new()).unwrap();

    let mut group = c.benchmark_group("predicate_compilation");
    group.throughput(Throughput::Elements(1));

    group.bench_function("native_wide_boolean", |b| {
        b.iter(|| black_box(build_wide_boolean(&native_scope, 32)))
    });

    group.bench_function("json_wide_boolean", |b| {
        b.iter(|| black_box(build_wide_boolean(&json_scope, 32)))
    });

    group.finish();
}

fn bench_scope_construction(c: &mut Criterion) {
    let schema = bench_schema();
    c.bench_function("scope_construction", |b| {
        b.iter(|| black_box(SearchScope::new(&schema, NativeBackend::new()).unwrap()))
    });
}

criterion_group!(benches, bench_predicate_compilation, bench_scope_construction);
criterion_main!(benches);
