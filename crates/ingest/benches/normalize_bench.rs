//! Normalizer benchmark
//!
//! Measures the per-row normalization cost, which dominates large imports
//! after file I/O.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use vulntriage_ingest::{Normalizer, RawRow};

fn sample_row(index: u64) -> RawRow {
    RawRow {
        index,
        fields: vec![
            ("CVE ID".to_owned(), format!("CVE-2024-{:04}", index % 10_000)),
            ("Product".to_owned(), "enterprise-gateway".to_owned()),
            ("Component".to_owned(), "tls-terminator".to_owned()),
            ("Original Severity".to_owned(), "High".to_owned()),
            (
                "Original Vector".to_owned(),
                "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H".to_owned(),
            ),
            ("Original Score".to_owned(), "8.1".to_owned()),
            ("Disposition Summary".to_owned(), "patch scheduled".to_owned()),
            ("Rationale".to_owned(), "reachable from the public edge".to_owned()),
            ("Scanner Build".to_owned(), "v7.4.2".to_owned()),
        ],
    }
}

fn bench_normalize(c: &mut Criterion) {
    let normalizer = Normalizer::new();
    let row = sample_row(1);

    c.bench_function("normalize_full_row", |b| {
        b.iter(|| {
            let record = normalizer.normalize(black_box(&row)).unwrap();
            black_box(record)
        })
    });

    let rows: Vec<RawRow> = (0..1_000).map(sample_row).collect();
    c.bench_function("normalize_1k_rows", |b| {
        b.iter(|| {
            let mut committed = 0usize;
            for row in &rows {
                if normalizer.normalize(black_box(row)).is_ok() {
                    committed += 1;
                }
            }
            black_box(committed)
        })
    });
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
