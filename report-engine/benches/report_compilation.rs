//! FILENAME: report-engine/benches/report_compilation.rs
//! Benchmarks for header compilation and record projection.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use report_engine::{
    compile_header, project_records, CellFormat, ColumnNode, SourceRecord,
};
use serde_json::json;

/// A district -> category -> {count, amount} forest, the widest shape
/// the historical reports produce.
fn wide_forest() -> Vec<ColumnNode> {
    let mut columns = vec![ColumnNode::leaf("District", "district")];

    for category in 0..10 {
        let name = format!("Category-{category}");
        columns.push(ColumnNode::group(
            name.clone(),
            vec![
                ColumnNode::leaf("count", format!("categories.{name}.count")),
                ColumnNode::leaf("amount", format!("categories.{name}.amount"))
                    .with_format(CellFormat::currency()),
            ],
        ));
    }

    columns
}

fn sample_records(count: usize) -> Vec<SourceRecord> {
    (0..count)
        .map(|i| {
            let mut categories = serde_json::Map::new();
            for category in 0..10 {
                categories.insert(
                    format!("Category-{category}"),
                    json!({"count": i as f64, "amount": i as f64 * 10.0}),
                );
            }
            json!({"district": format!("District-{i}"), "categories": categories})
        })
        .collect()
}

fn bench_compile_header(c: &mut Criterion) {
    let forest = wide_forest();

    c.bench_function("compile_header_21_leaves", |b| {
        b.iter(|| compile_header(black_box(&forest)).unwrap())
    });
}

fn bench_project_records(c: &mut Criterion) {
    let forest = wide_forest();
    let leaf_order = compile_header(&forest).unwrap().leaf_order;
    let records = sample_records(500);

    c.bench_function("project_500_records", |b| {
        b.iter(|| project_records(black_box(&leaf_order), black_box(&records)))
    });
}

criterion_group!(benches, bench_compile_header, bench_project_records);
criterion_main!(benches);
