use core::hint::black_box;
use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use spud::{FieldRegistry, PageSelector, Query, Record, order_by, paginate};
use std::sync::LazyLock;

#[derive(Clone)]
struct Row {
    id: u64,
    name: String,
    size: i32,
}

impl Record for Row {
    fn fields() -> &'static FieldRegistry<Self> {
        static FIELDS: LazyLock<FieldRegistry<Row>> = LazyLock::new(|| {
            FieldRegistry::<Row>::new()
                .field("id", |row| row.id.to_string())
                .field("name", |row| row.name.clone())
                .field("size", |row| row.size.to_string())
        });
        &FIELDS
    }
}

// Rows per benchmark iteration.
const TOTAL_ROWS: u64 = 10_000;

fn rows() -> Vec<Row> {
    (0..TOTAL_ROWS)
        .map(|id| Row {
            id,
            // Scrambled so the sort does real work.
            name: format!("potato-{}", id.wrapping_mul(2_654_435_761) % TOTAL_ROWS),
            size: (id % 977) as i32,
        })
        .collect()
}

fn bench_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("order");
    group.throughput(Throughput::Elements(TOTAL_ROWS));
    for field in ["id", "name", "size"] {
        group.bench_function(field, |b| {
            b.iter_batched(
                rows,
                |rows| black_box(order_by(rows, black_box(field)).unwrap()),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_paginate(c: &mut Criterion) {
    let mut group = c.benchmark_group("paginate");
    group.throughput(Throughput::Elements(TOTAL_ROWS));
    group.bench_function("middle_page", |b| {
        b.iter_batched(
            rows,
            |rows| black_box(paginate(rows, 100, PageSelector::Token("50")).unwrap()),
            BatchSize::LargeInput,
        )
    });
    group.bench_function("order_then_page", |b| {
        let query = Query::new().order_by("name").page_size(100).page(PageSelector::Index(7));
        b.iter_batched(
            rows,
            |rows| black_box(query.run(rows).unwrap()),
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_order, bench_paginate);
criterion_main!(benches);
