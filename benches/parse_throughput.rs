use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mztab::parser::{parse_str, ParseOptions};
use mztab::writer::{to_string, WriterConfig};

const MINIMAL: &str = include_str!("../tests/data/minimal.mztab");

/// Minimal file with `extra` additional evidence rows
fn generate_test_mztab(extra: usize) -> String {
    let template = MINIMAL
        .lines()
        .rfind(|l| l.starts_with("SME\t"))
        .unwrap_or_default()
        .splitn(3, '\t')
        .nth(2)
        .unwrap_or_default()
        .to_string();

    let mut content = String::from(MINIMAL);
    if !content.ends_with('\n') {
        content.push('\n');
    }
    for i in 0..extra {
        content.push_str(&format!("SME\t{}\t{}\n", i + 4, template));
    }
    content
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let options = ParseOptions::default();

    for rows in [100, 1_000, 10_000] {
        let text = generate_test_mztab(rows);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &text, |b, text| {
            b.iter(|| {
                let outcome = parse_str(text, &options);
                assert!(outcome.file.is_some());
                outcome
            })
        });
    }

    group.finish();
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    let config = WriterConfig::default();

    for rows in [100, 1_000, 10_000] {
        let mztab = parse_str(&generate_test_mztab(rows), &ParseOptions::default())
            .file
            .unwrap();
        group.throughput(Throughput::Elements(rows as u64 + 8));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &mztab, |b, mztab| {
            b.iter(|| to_string(mztab, &config).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_write);
criterion_main!(benches);
