//! Property tests: every encoding reproduces the fermionic algebra.

use num_complex::Complex64;
use proptest::prelude::*;
use qadapt_chem::QubitMapping;
use qadapt_ir::{SparsePauliOp, i_pow};

const TOL: f64 = 1e-10;

fn mapping_strategy() -> impl Strategy<Value = QubitMapping> {
    prop_oneof![
        Just(QubitMapping::JordanWigner),
        Just(QubitMapping::Parity),
        Just(QubitMapping::BravyiKitaev),
    ]
}

/// Modes and a pair of mode indices below it.
fn modes_and_pair() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..=6).prop_flat_map(|n| (Just(n), 0..n, 0..n))
}

fn anticommutator(a: &SparsePauliOp, b: &SparsePauliOp) -> SparsePauliOp {
    a.compose(b)
        .unwrap()
        .add(&b.compose(a).unwrap())
        .unwrap()
        .simplify(TOL)
}

/// `⟨index|op|index⟩`.
fn diagonal(op: &SparsePauliOp, index: usize) -> Complex64 {
    op.terms()
        .iter()
        .filter_map(|(pauli, coeff)| {
            let (row, k) = pauli.apply_to_basis(index);
            (row == index).then(|| coeff * i_pow(k))
        })
        .sum()
}

proptest! {
    #[test]
    fn canonical_anticommutation(mapping in mapping_strategy(), (n, i, j) in modes_and_pair()) {
        let a_i = mapping.annihilation(i, n).unwrap();
        let a_j = mapping.annihilation(j, n).unwrap();
        let c_j = mapping.creation(j, n).unwrap();

        let mixed = anticommutator(&a_i, &c_j);
        if i == j {
            prop_assert_eq!(mixed.num_terms(), 1);
            prop_assert!((mixed.identity_coefficient() - Complex64::new(1.0, 0.0)).norm() < TOL);
        } else {
            prop_assert!(mixed.is_empty());
        }
        prop_assert!(anticommutator(&a_i, &a_j).is_empty());
    }

    #[test]
    fn number_operator_reads_occupation(
        mapping in mapping_strategy(),
        occupation in prop::collection::vec(any::<bool>(), 1..=6),
    ) {
        let n = occupation.len();
        let index = mapping
            .encode_occupation(&occupation)
            .iter()
            .enumerate()
            .fold(0usize, |acc, (q, &bit)| acc | (usize::from(bit) << q));
        for (j, &occupied) in occupation.iter().enumerate() {
            let number = mapping
                .creation(j, n)
                .unwrap()
                .compose(&mapping.annihilation(j, n).unwrap())
                .unwrap();
            let value = diagonal(&number, index);
            prop_assert!((value.re - f64::from(u8::from(occupied))).abs() < TOL);
            prop_assert!(value.im.abs() < TOL);
        }
    }
}
