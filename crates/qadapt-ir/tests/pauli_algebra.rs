//! Algebraic laws of Pauli strings and sparse Pauli operators.

use num_complex::Complex64;
use proptest::prelude::*;
use qadapt_ir::{PauliString, SparsePauliOp, i_pow};

const WIDTH: usize = 6;

fn pauli_string() -> impl Strategy<Value = PauliString> {
    (0u64..(1 << WIDTH), 0u64..(1 << WIDTH))
        .prop_map(|(x, z)| PauliString::from_masks(WIDTH, x, z).unwrap())
}

/// Dense matrix of `i^k P` acting on basis states, column by column.
fn apply(p: &PauliString, state: &[Complex64]) -> Vec<Complex64> {
    let mut out = vec![Complex64::new(0.0, 0.0); state.len()];
    for (b, amp) in state.iter().enumerate() {
        let (j, k) = p.apply_to_basis(b);
        out[j] += amp * i_pow(k);
    }
    out
}

fn basis(index: usize) -> Vec<Complex64> {
    let mut v = vec![Complex64::new(0.0, 0.0); 1 << WIDTH];
    v[index] = Complex64::new(1.0, 0.0);
    v
}

proptest! {
    #[test]
    fn compose_matches_action(a in pauli_string(), b in pauli_string(), idx in 0usize..(1 << WIDTH)) {
        let (k, ab) = a.compose(&b).unwrap();
        let lhs = apply(&a, &apply(&b, &basis(idx)));
        let rhs: Vec<_> = apply(&ab, &basis(idx)).into_iter().map(|c| c * i_pow(k)).collect();
        for (l, r) in lhs.iter().zip(&rhs) {
            prop_assert!((l - r).norm() < 1e-12);
        }
    }

    #[test]
    fn every_string_squares_to_identity(a in pauli_string()) {
        let (k, sq) = a.compose(&a).unwrap();
        prop_assert_eq!(k, 0);
        prop_assert!(sq.is_identity());
    }

    #[test]
    fn commutation_is_symmetric(a in pauli_string(), b in pauli_string()) {
        prop_assert_eq!(a.commutes(&b), b.commutes(&a));
        let (k1, p1) = a.compose(&b).unwrap();
        let (k2, p2) = b.compose(&a).unwrap();
        prop_assert_eq!(p1, p2);
        let same_phase = k1 == k2;
        prop_assert_eq!(same_phase, a.commutes(&b));
    }

    #[test]
    fn label_round_trip(a in pauli_string()) {
        let parsed = PauliString::from_label(&a.label()).unwrap();
        prop_assert_eq!(parsed, a);
    }

    #[test]
    fn commutator_is_antisymmetric(a in pauli_string(), b in pauli_string(), ca in -2.0f64..2.0, cb in -2.0f64..2.0) {
        let op_a = SparsePauliOp::from_terms(WIDTH, [(a, Complex64::new(ca, 0.0))]).unwrap();
        let op_b = SparsePauliOp::from_terms(WIDTH, [(b, Complex64::new(cb, 0.0))]).unwrap();
        let ab = op_a.commutator(&op_b).unwrap();
        let ba = op_b.commutator(&op_a).unwrap();
        let sum = ab.add(&ba).unwrap().simplify(1e-12);
        prop_assert!(sum.is_empty());
    }

    #[test]
    fn adjoint_of_product(a in pauli_string(), b in pauli_string()) {
        let op_a = SparsePauliOp::from_terms(WIDTH, [(a, Complex64::new(0.3, 0.7))]).unwrap();
        let op_b = SparsePauliOp::from_terms(WIDTH, [(b, Complex64::new(-1.1, 0.2))]).unwrap();
        let lhs = op_a.compose(&op_b).unwrap().adjoint();
        let rhs = op_b.adjoint().compose(&op_a.adjoint()).unwrap();
        let diff = (&lhs - &rhs).simplify(1e-12);
        prop_assert!(diff.is_empty());
    }
}
