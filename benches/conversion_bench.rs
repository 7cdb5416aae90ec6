//! Unit Conversion Benchmarks — Per-Request Hot Path
//!
//! Benchmarks the conversions and classification that run on every
//! send and balance request.
//!
//! Run with: cargo bench --bench conversion_bench

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use multichain_gateway::domain::error::normalize;
use multichain_gateway::domain::network::NetworkId;

/// Benchmark human-unit to base-unit conversion.
fn bench_to_base_units(c: &mut Criterion) {
    c.bench_function("to_base_units_polkadot", |b| {
        b.iter(|| {
            let _base = NetworkId::Polkadot.to_base_units(black_box(dec!(123.4567890123)));
        });
    });
}

/// Benchmark base-unit to human-unit conversion.
fn bench_from_base_units(c: &mut Criterion) {
    c.bench_function("from_base_units_solana", |b| {
        b.iter(|| {
            let _amount = NetworkId::Solana.from_base_units(black_box(1_234_567_890));
        });
    });
}

/// Benchmark keyword classification of raw node errors.
fn bench_normalize_error(c: &mut Criterion) {
    c.bench_function("normalize_node_error", |b| {
        b.iter(|| {
            let _err = normalize(
                NetworkId::Ripple,
                black_box("tecUNFUNDED_PAYMENT: insufficient funds for payment"),
            );
        });
    });
}

criterion_group!(
    benches,
    bench_to_base_units,
    bench_from_base_units,
    bench_normalize_error,
);
criterion_main!(benches);
