//! Performance benchmarks for the PII redaction pass
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pdf_redact_server::redact::redact_text;

/// Build a synthetic document of `paragraphs` paragraphs, every third one
/// carrying contact details.
fn synthetic_document(paragraphs: usize) -> String {
    let mut doc = String::from("Jane Doe\nSenior Widget Engineer\n\n");
    for i in 0..paragraphs {
        if i % 3 == 0 {
            doc.push_str(&format!(
                "Paragraph {} mentions jane.doe{}@example.com, (555) 234-5678 \
                 and https://example.com/reports/{}.\n\n",
                i, i, i
            ));
        } else {
            doc.push_str(&format!(
                "Paragraph {} is ordinary prose describing widget tolerances \
                 and assembly procedures in some detail.\n\n",
                i
            ));
        }
    }
    doc
}

/// Benchmark redaction over documents of increasing size
fn bench_redaction(c: &mut Criterion) {
    let mut group = c.benchmark_group("redaction");

    for paragraphs in [10, 100, 1000] {
        let doc = synthetic_document(paragraphs);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("redact_text", format!("{}_paragraphs", paragraphs)),
            &doc,
            |b, doc| {
                b.iter(|| {
                    let _ = redact_text(black_box(doc));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the no-PII case: the pass should be cheap when nothing matches
fn bench_redaction_clean_text(c: &mut Criterion) {
    let doc = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. "
        .repeat(1000);

    let mut group = c.benchmark_group("redaction_clean");
    group.throughput(Throughput::Bytes(doc.len() as u64));

    group.bench_function("no_matches", |b| {
        b.iter(|| {
            let _ = redact_text(black_box(&doc));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_redaction, bench_redaction_clean_text);

criterion_main!(benches);
