use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

fn fixture_bytes(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(path).unwrap()
}

fn bench_parse_message(c: &mut Criterion) {
    let raw = fixture_bytes("nameless.eml");

    c.bench_function("parse_nameless_eml", |b| {
        b.iter(|| mimesplit::parser::mime::parse_message(&raw).unwrap())
    });
}

fn bench_split_message(c: &mut Criterion) {
    let raw = fixture_bytes("nameless.eml");
    let tmp = tempfile::tempdir().unwrap();
    let options = mimesplit::split::SplitOptions::default();

    c.bench_function("split_nameless_eml", |b| {
        b.iter(|| {
            mimesplit::split::split_message(
                &raw,
                tmp.path(),
                &options,
                std::io::sink(),
                std::io::sink(),
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_parse_message, bench_split_message);
criterion_main!(benches);
