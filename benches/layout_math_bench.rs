use bandchart_rs::api::{ChartData, LayoutEngine, create_chart_variant};
use bandchart_rs::core::{
    DataPoint, GroupPadding, Orientation, RecordKeys, Series, StackOffset, StackOrder, Viewport,
    calculate_grouped_layout, compute_stack, transform,
};
use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use std::hint::black_box;

fn generated_series(series_count: usize, categories: usize) -> Vec<Series> {
    (0..series_count)
        .map(|s| {
            let points = (0..categories)
                .map(|c| {
                    let wave = ((s * 31 + c * 17) % 97) as f64;
                    DataPoint::new(format!("c{c:04}"), 1.0 + wave * 0.5)
                })
                .collect();
            Series::new(format!("s{s}"), format!("Series {s}"), points)
        })
        .collect()
}

fn bench_wiggle_stack_50x200(c: &mut Criterion) {
    let series = generated_series(50, 200);

    c.bench_function("wiggle_stack_50x200", |b| {
        b.iter(|| {
            let _ = compute_stack(
                black_box(&series),
                black_box(StackOrder::InsideOut),
                black_box(StackOffset::Wiggle),
            );
        })
    });
}

fn bench_grouped_layout_12x100(c: &mut Criterion) {
    let series = generated_series(12, 100);

    c.bench_function("grouped_layout_12x100", |b| {
        b.iter(|| {
            let layout = calculate_grouped_layout(
                black_box(&series),
                black_box(1920.0),
                black_box(1080.0),
                GroupPadding::default(),
                Orientation::Vertical,
            )
            .expect("valid layout");
            for entry in &series {
                for point in &entry.data {
                    let _ = layout
                        .get_grouped_bar_position(point, &entry.id)
                        .expect("known series");
                }
            }
        })
    });
}

fn bench_transform_10k(c: &mut Criterion) {
    let records = Value::Array(
        (0..10_000)
            .map(|i| json!({ "month": format!("m{i}"), "revenue": i as f64 * 1.5, "name": "row" }))
            .collect(),
    );
    let keys = RecordKeys::new("month", "revenue").with_label("name");

    c.bench_function("transform_10k", |b| {
        b.iter(|| {
            let _ = transform(black_box(&records), black_box(&keys)).expect("array input");
        })
    });
}

fn bench_stacked_engine_layout(c: &mut Criterion) {
    let spec = create_chart_variant(
        "stacked",
        ChartData::Series(generated_series(8, 60)),
        None,
    )
    .expect("stacked variant");
    let engine = LayoutEngine::default();

    c.bench_function("stacked_engine_layout_8x60", |b| {
        b.iter(|| {
            let _ = engine
                .layout(black_box(&spec), black_box(Viewport::new(1600, 900)))
                .expect("layout");
        })
    });
}

criterion_group!(
    benches,
    bench_wiggle_stack_50x200,
    bench_grouped_layout_12x100,
    bench_transform_10k,
    bench_stacked_engine_layout
);
criterion_main!(benches);
