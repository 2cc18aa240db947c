use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlwhere::{Config, Fields, Input, normalize_and_reduce, where_};

/// A mapping with `n` keys cycling through a few operators:
/// {"col0": 0, "col1__gte": 1, "col2__in": [2, 3], "col3__icontains": "3", ...}
fn build_fields(n: usize) -> Fields {
    (0..n)
        .map(|i| {
            let i = i as i64;
            match i % 4 {
                0 => (format!("col{i}"), sqlwhere::Value::Int(i)),
                1 => (format!("col{i}__gte"), sqlwhere::Value::Int(i)),
                2 => (format!("col{i}__in"), sqlwhere::Value::from(vec![i, i + 1])),
                _ => (format!("col{i}__icontains"), sqlwhere::Value::from(i.to_string())),
            }
        })
        .collect()
}

fn bench_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_where/mapping");
    let cfg = Config::new();

    for n in [1, 5, 10, 50, 100] {
        let fields = build_fields(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &fields, |b, fields| {
            b.iter(|| black_box(normalize_and_reduce(fields.clone(), vec![], false, &cfg)));
        });
    }

    group.finish();
}

fn bench_or_of_mappings(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_where/or_of_mappings");
    let cfg = Config::new().with_table("t");

    for n in [2, 10, 50] {
        let input = Input::any((0..n).map(|_| build_fields(4)));
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| black_box(normalize_and_reduce(input.clone(), vec![], false, &cfg)));
        });
    }

    group.finish();
}

fn bench_plan_numbered(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_where/plan_numbered");

    for n in [1, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let plan = where_(build_fields(n), vec![]).or("archived = ?", sqlwhere::values![true]);
                black_box(plan.to_numbered_sql());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mapping, bench_or_of_mappings, bench_plan_numbered);
criterion_main!(benches);
