use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use famgraph::db::schema::initialize_database;
use famgraph::graph::source::{fixture_person, MemorySource};
use famgraph::graph::store::FamilyStore;
use famgraph::graph::traversal::{LineageTraversal, TraversalOptions};
use famgraph::types::{Gender, NewPerson, NewRelationship, RelationshipType};

/// Full pedigree of `depth` generations above `n0`: person `n{i}` has
/// parents `n{2i+1}` and `n{2i+2}`.
fn pedigree_size(depth: u32) -> usize {
    (1usize << (depth + 1)) - 1
}

fn build_pedigree(depth: u32) -> MemorySource {
    let total = pedigree_size(depth);
    let mut src = MemorySource::new();
    for i in 0..total {
        src.insert_person(fixture_person(&format!("n{i}")));
    }
    for child in 0..total {
        for parent in [2 * child + 1, 2 * child + 2] {
            if parent < total {
                src.add_edge(
                    &format!("n{parent}"),
                    &format!("n{child}"),
                    RelationshipType::Biological,
                );
            }
        }
    }
    src
}

fn build_store(depth: u32) -> FamilyStore {
    let store = FamilyStore::from_connection(initialize_database(":memory:").unwrap());
    let total = pedigree_size(depth);
    for i in 0..total {
        let id = format!("n{i}");
        store
            .create_person(NewPerson::named(&id, "Bench", Gender::Other).with_id(&id))
            .unwrap();
    }
    for child in 0..total {
        for parent in [2 * child + 1, 2 * child + 2] {
            if parent < total {
                store
                    .create_relationship(NewRelationship::new(
                        &format!("n{parent}"),
                        &format!("n{child}"),
                    ))
                    .unwrap();
            }
        }
    }
    store
}

fn bench_memory_ancestors(c: &mut Criterion) {
    let mut group = c.benchmark_group("ancestors_memory");
    for &depth in &[6u32, 10, 14] {
        let src = build_pedigree(depth);
        let opts = TraversalOptions::new(depth);
        group.throughput(Throughput::Elements(pedigree_size(depth) as u64 - 1));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            let engine = LineageTraversal::new(&src);
            b.iter(|| black_box(engine.ancestors("n0", &opts).unwrap().len()))
        });
    }
    group.finish();
}

fn bench_sqlite_ancestors(c: &mut Criterion) {
    let mut group = c.benchmark_group("ancestors_sqlite");
    for &depth in &[6u32, 9] {
        let store = build_store(depth);
        let opts = TraversalOptions::new(depth);
        group.throughput(Throughput::Elements(pedigree_size(depth) as u64 - 1));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            let engine = LineageTraversal::new(&store);
            b.iter(|| black_box(engine.ancestors("n0", &opts).unwrap().len()))
        });
    }
    group.finish();
}

fn bench_generation_depths(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation_depths");
    for &depth in &[10u32, 14] {
        let src = build_pedigree(depth);
        let ids: Vec<String> = src.persons().map(|p| p.id.clone()).collect();
        group.throughput(Throughput::Elements(ids.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            let engine = LineageTraversal::new(&src);
            b.iter(|| black_box(engine.generation_depths(&ids).unwrap().len()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_memory_ancestors,
    bench_sqlite_ancestors,
    bench_generation_depths
);
criterion_main!(benches);
