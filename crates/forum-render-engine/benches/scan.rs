use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use forum_render_engine::scan;
mod common;

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    group.sample_size(20);

    let text = common::generate_post_spans(100);
    group.bench_function("plain_post", |b| {
        b.iter(|| black_box(scan(black_box(&text))));
    });

    let quotes = common::generate_nested_quotes(20);
    group.bench_function("nested_quotes_20", |b| {
        b.iter(|| black_box(scan(black_box(&quotes))));
    });

    group.finish();
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
