use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use scapple_rs::builder::{DocumentInput, build_document, encode_scapple_with_id};
use scapple_rs::layout::outline_to_notes;
use scapple_rs::parser::parse_scapple;
use scapple_rs::render::{RenderOptions, render_svg};
use scapple_rs::theme::Theme;
use std::hint::black_box;

/// Outline with `roots` top-level items, each with `fanout` children and
/// `fanout` grandchildren per child.
fn outline_source(roots: usize, fanout: usize) -> String {
    let mut out = String::new();
    for r in 0..roots {
        out.push_str(&format!("Topic {r}\n"));
        for c in 0..fanout {
            out.push_str(&format!("  - Branch {r}.{c} with a longer label\n"));
            for g in 0..fanout {
                out.push_str(&format!("    {}. Leaf {r}.{c}.{g}\n", g + 1));
            }
        }
    }
    out
}

fn markup_source(roots: usize, fanout: usize) -> String {
    let notes = outline_to_notes(&outline_source(roots, fanout));
    let doc = build_document(&DocumentInput {
        notes,
        background_color: None,
    })
    .expect("generated outline should build");
    encode_scapple_with_id(&doc, "BENCH")
}

const SIZES: [(&str, usize, usize); 3] = [("small", 1, 3), ("medium", 4, 6), ("large", 10, 10)];

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for (name, roots, fanout) in SIZES {
        let input = markup_source(roots, fanout);
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, data| {
            b.iter(|| {
                let doc = parse_scapple(black_box(data)).expect("decode failed");
                black_box(doc.notes.len());
            });
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for (name, roots, fanout) in SIZES {
        let doc = parse_scapple(&markup_source(roots, fanout)).expect("decode failed");
        group.bench_with_input(BenchmarkId::from_parameter(name), &doc, |b, doc| {
            b.iter(|| black_box(encode_scapple_with_id(black_box(doc), "BENCH").len()));
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let themed = RenderOptions {
        theme: Some(Theme::paper()),
        ..RenderOptions::default()
    };
    for (name, roots, fanout) in SIZES {
        let doc = parse_scapple(&markup_source(roots, fanout)).expect("decode failed");
        group.bench_with_input(BenchmarkId::from_parameter(name), &doc, |b, doc| {
            b.iter(|| black_box(render_svg(black_box(doc), &themed).len()));
        });
    }
    group.finish();
}

fn bench_outline(c: &mut Criterion) {
    let mut group = c.benchmark_group("outline");
    for (name, roots, fanout) in SIZES {
        let input = outline_source(roots, fanout);
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, data| {
            b.iter(|| black_box(outline_to_notes(black_box(data)).len()));
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_decode, bench_encode, bench_render, bench_outline
);
criterion_main!(benches);
