/// Performance benchmarks for the Rango directory
///
/// Run with: cargo bench -p rango-tests

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rango_core::{Directory, DirectoryConfig, Slug};
use rango_test_utils::{add_categories, TestDirectory};

fn bench_slug(c: &mut Criterion) {
    let mut group = c.benchmark_group("slug");

    for name in ["Python", "Other Frameworks", "snake_case & C++ tips", "日本語のフレームワーク"] {
        group.throughput(Throughput::Bytes(name.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", name), name, |b, name| {
            b.iter(|| Slug::from_name(black_box(name)));
        });

        let slug = Slug::from_name(name).to_string();
        group.bench_with_input(BenchmarkId::new("decode", name), &slug, |b, slug| {
            b.iter(|| Slug::parse(black_box(slug)).unwrap().to_name());
        });
    }
    group.finish();
}

fn bench_like(c: &mut Criterion) {
    let mut group = c.benchmark_group("like_category");
    group.throughput(Throughput::Elements(1));

    let directory = Directory::in_memory(DirectoryConfig::default()).unwrap();
    let category = directory.add_category("Python").unwrap();
    group.bench_function("in_memory", |b| {
        b.iter(|| directory.like_category(black_box(category.id)).unwrap());
    });
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_category_by_slug");

    for num_categories in [10, 100, 1000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("categories", num_categories),
            &num_categories,
            |b, &num_categories| {
                let directory = Directory::in_memory(DirectoryConfig::default()).unwrap();
                let categories = add_categories(&directory, num_categories);
                let slug = categories[num_categories / 2].slug().to_string();

                b.iter(|| directory.find_category_by_slug(black_box(&slug)).unwrap());
            },
        );
    }
    group.finish();
}

fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush");

    for num_categories in [10, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("categories", num_categories),
            &num_categories,
            |b, &num_categories| {
                let test_dir = TestDirectory::new();
                let categories = add_categories(&test_dir.directory, num_categories);

                b.iter(|| {
                    // Dirty the store so every flush writes
                    test_dir.directory.like_category(categories[0].id).unwrap();
                    test_dir.directory.flush().unwrap()
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_slug, bench_like, bench_lookup, bench_flush);
criterion_main!(benches);
