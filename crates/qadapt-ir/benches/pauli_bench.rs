//! Benchmarks for Pauli-operator algebra and evolution decomposition
//!
//! Run with: cargo bench -p qadapt-ir

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use num_complex::Complex64;
use qadapt_ir::{Circuit, ParameterExpression, PauliString, SparsePauliOp};

/// Dense-ish operator: every XZ-pattern string with a deterministic coefficient.
fn operator(num_qubits: usize, num_terms: usize) -> SparsePauliOp {
    let mask = (1u64 << num_qubits) - 1;
    let terms = (0..num_terms as u64).map(|k| {
        let x = (k.wrapping_mul(0x9E37_79B9)) & mask;
        let z = (k.wrapping_mul(0x85EB_CA6B) >> 3) & mask;
        let pauli = PauliString::from_masks(num_qubits, x, z).unwrap();
        (pauli, Complex64::new(1.0 / (k as f64 + 1.0), 0.0))
    });
    SparsePauliOp::from_terms(num_qubits, terms).unwrap()
}

/// Benchmark operator products and commutators
fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_pauli_op");

    for num_terms in [16, 64, 256] {
        let a = operator(8, num_terms);
        let b = operator(8, num_terms / 2);
        group.bench_with_input(BenchmarkId::new("compose", num_terms), &num_terms, |bench, _| {
            bench.iter(|| black_box(&a).compose(black_box(&b)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("commutator", num_terms), &num_terms, |bench, _| {
            bench.iter(|| black_box(&a).commutator(black_box(&b)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark lowering evolution gates to CX/Rz
fn bench_decompose(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompose");

    for num_qubits in [4usize, 8, 12] {
        let generator = operator(num_qubits, 32);
        let mut circuit = Circuit::with_size("evolution", num_qubits);
        for k in 0..4 {
            circuit
                .evolve(&generator.simplify(1e-12), ParameterExpression::parameter(k), 1)
                .unwrap();
        }
        group.bench_with_input(BenchmarkId::new("evolution", num_qubits), &circuit, |b, circuit| {
            b.iter(|| black_box(circuit).decompose().unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compose, bench_decompose);
criterion_main!(benches);
