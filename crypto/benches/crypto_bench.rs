use criterion::{black_box, criterion_group, criterion_main, Criterion};
use veranode_types::{RumorId, Secret};

fn sha256_bench(c: &mut Criterion) {
    let data = [0xABu8; 256];

    c.bench_function("sha256_256B", |b| {
        b.iter(|| veranode_crypto::sha256(black_box(&data)))
    });
}

fn vote_nullifier_bench(c: &mut Criterion) {
    let secret = Secret::new("a".repeat(64));
    let rumor = RumorId::new([9u8; 16]);

    c.bench_function("vote_nullifier", |b| {
        b.iter(|| veranode_crypto::vote_nullifier(black_box(&secret), black_box(&rumor)))
    });
}

criterion_group!(benches, sha256_bench, vote_nullifier_bench);
criterion_main!(benches);
