// Sighash & signing benchmarks for the ciph protocol engine.
//
// Covers the per-input signing digest (fresh vs reused sub-hashes), schnorr
// signing and verification of a digest, whole-transaction signing at various
// input counts, and fee sizing.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ciph_protocol::address::pay_to_public_key_script;
use ciph_protocol::crypto::keys::SigningKey;
use ciph_protocol::crypto::signatures::{sign_digest, verify_digest};
use ciph_protocol::transaction::sighash::{calc_schnorr_signature_hash, signature_hash, SigHashReusedValues};
use ciph_protocol::transaction::types::{Outpoint, ScriptPublicKey, TransactionId, UnspentOutput};
use ciph_protocol::transaction::{sign_transaction, MassCalculator, Transaction, TransactionBuilder};

fn p2pk(key: &SigningKey) -> ScriptPublicKey {
    pay_to_public_key_script(&key.x_only_public_key_bytes())
}

fn fixture(inputs: usize) -> (SigningKey, Vec<UnspentOutput>, Transaction) {
    let key = SigningKey::from_slice(&[0x42; 32]).unwrap();
    let utxos: Vec<UnspentOutput> = (0..inputs)
        .map(|i| UnspentOutput {
            outpoint: Outpoint::new(TransactionId([(i % 251) as u8; 32]), i as u32),
            amount: 10_000_000,
            script_public_key: p2pk(&key),
            is_coinbase: false,
        })
        .collect();
    let tx = TransactionBuilder::new()
        .inputs(&utxos)
        .output(20_000_000, p2pk(&key))
        .output(1_000_000, p2pk(&key))
        .payload(vec![0x61; 180])
        .build();
    (key, utxos, tx)
}

fn bench_sighash(c: &mut Criterion) {
    let (_, utxos, tx) = fixture(10);
    let spent = utxos[0].spent_output();
    let reused = SigHashReusedValues::new(&tx);

    c.bench_function("sighash/fresh", |b| {
        b.iter(|| signature_hash(&tx, 0, &spent).unwrap());
    });
    c.bench_function("sighash/reused", |b| {
        b.iter(|| calc_schnorr_signature_hash(&tx, 0, &spent, &reused).unwrap());
    });
}

fn bench_sign_digest(c: &mut Criterion) {
    let key = SigningKey::from_slice(&[0x42; 32]).unwrap();
    let digest = [7u8; 32];

    c.bench_function("schnorr/sign_digest", |b| {
        b.iter(|| sign_digest(&key, &digest));
    });
}

fn bench_verify_digest(c: &mut Criterion) {
    let key = SigningKey::from_slice(&[0x42; 32]).unwrap();
    let digest = [7u8; 32];
    let signature = sign_digest(&key, &digest);
    let public_key = key.x_only_public_key();

    c.bench_function("schnorr/verify_digest", |b| {
        b.iter(|| verify_digest(&public_key, &digest, &signature));
    });
}

fn bench_sign_transaction(c: &mut Criterion) {
    let mut group = c.benchmark_group("schnorr/sign_transaction");

    for size in [1, 10, 50, 100] {
        let (key, utxos, tx) = fixture(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &tx, |b, tx| {
            b.iter(|| {
                let mut tx = tx.clone();
                sign_transaction(&mut tx, &utxos, &key).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_required_fee(c: &mut Criterion) {
    let (_, _, tx) = fixture(20);
    let calc = MassCalculator::default();

    c.bench_function("mass/required_fee", |b| {
        b.iter(|| calc.required_fee(&tx).unwrap());
    });
}

criterion_group!(
    benches,
    bench_sighash,
    bench_sign_digest,
    bench_verify_digest,
    bench_sign_transaction,
    bench_required_fee,
);
criterion_main!(benches);
