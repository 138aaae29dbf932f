use std::fmt::Write as _;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use linexml::from_str;

const COMPACT_XML: &str = "<root id=\"1\" name='test'><item value=\"42\"/><child>text</child></root>";
const WRAPPED_XML: &str = "<window title=\"Main\" width=\"1024\"\n        height=\"768\">\n  <description>\n    Main window\n  </description>\n</window>\n";

fn config_document(servers: usize) -> String {
    let mut doc = String::from("<?xml version=\"1.0\"?>\n<config>\n");
    for i in 0..servers {
        let _ = writeln!(doc, "  <server name=\"node{i}\" host=\"10.0.0.{}\">", i % 255);
        let _ = writeln!(doc, "    <port>{}</port>", 8000 + i);
        let _ = writeln!(doc, "    <enabled/>");
        let _ = writeln!(doc, "  </server>");
    }
    doc.push_str("</config>\n");
    doc
}

fn bench_compact(c: &mut Criterion) {
    c.bench_function("linexml_compact", |b| {
        b.iter(|| from_str(black_box(COMPACT_XML)))
    });
}

fn bench_wrapped(c: &mut Criterion) {
    c.bench_function("linexml_wrapped", |b| {
        b.iter(|| from_str(black_box(WRAPPED_XML)))
    });
}

fn bench_large_config(c: &mut Criterion) {
    let input = config_document(1_000);
    c.bench_function("linexml_large_config", |b| {
        b.iter(|| from_str(black_box(&input)))
    });
}

criterion_group!(benches, bench_compact, bench_wrapped, bench_large_config);
criterion_main!(benches);
