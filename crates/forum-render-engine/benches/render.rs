use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use forum_render_engine::render::{NoopSink, StickerSet};
use forum_render_engine::{PostContent, PostId, RenderContext, RenderOptions, Renderer};
mod common;

fn bench_render_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_text");
    group.sample_size(20);

    let options = RenderOptions::default();
    let stickers = StickerSet::new(["ac|blink"]);
    let context = RenderContext::for_post(&options, PostId::new("1", "2"));

    for paragraphs in [10, 100] {
        let content = PostContent::from_spans(common::generate_post_spans(paragraphs));
        group.bench_function(format!("paragraphs_{paragraphs}"), |b| {
            let renderer = Renderer::new(&options, &NoopSink).with_stickers(&stickers);
            b.iter(|| black_box(renderer.render_post(black_box(&content), &context)));
        });
    }

    group.finish();
}

fn bench_render_quotes(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_quotes");
    group.sample_size(20);

    let options = RenderOptions::default();
    let context = RenderContext::for_post(&options, PostId::new("1", "2"));
    let content = PostContent::from_spans(common::generate_nested_quotes(20));

    group.bench_function("nested_20", |b| {
        let renderer = Renderer::new(&options, &NoopSink);
        b.iter(|| black_box(renderer.render_post(black_box(&content), &context)));
    });

    group.finish();
}

criterion_group!(benches, bench_render_text, bench_render_quotes);
criterion_main!(benches);
