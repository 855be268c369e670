//! Two-qubit reduction for the parity encoding.
//!
//! Under the parity mapping qubit `n/2 - 1` holds the parity of the α
//! electrons and qubit `n - 1` the parity of all electrons. Both are fixed by
//! the particle numbers, so their `Z` eigenvalues can be substituted and the
//! qubits dropped.

use num_complex::Complex64;
use qadapt_ir::{DEFAULT_TOLERANCE, Pauli, SparsePauliOp};
use tracing::debug;

use crate::error::{ChemError, ChemResult};

/// The two qubits removed from an `n`-qubit parity operator, highest first.
pub fn reduced_qubits(num_qubits: usize) -> ChemResult<[usize; 2]> {
    if num_qubits < 2 || num_qubits % 2 != 0 {
        return Err(ChemError::Tapering(format!(
            "operator width {num_qubits} is not an even number of spin orbitals"
        )));
    }
    Ok([num_qubits - 1, num_qubits / 2 - 1])
}

fn parity_sign(count: usize) -> f64 {
    if count % 2 == 0 { 1.0 } else { -1.0 }
}

/// Remove the two symmetry qubits of a parity-mapped operator.
///
/// Fails if any term acts with X or Y on a removed qubit, which means the
/// operator does not conserve the particle-number parities.
pub fn two_qubit_reduction(
    op: &SparsePauliOp,
    num_particles: (usize, usize),
) -> ChemResult<SparsePauliOp> {
    let n = op.num_qubits();
    let [total_qubit, alpha_qubit] = reduced_qubits(n)?;
    let (num_alpha, num_beta) = num_particles;
    let eigenvalues = [
        (total_qubit, parity_sign(num_alpha + num_beta)),
        (alpha_qubit, parity_sign(num_alpha)),
    ];

    let mut current = op.clone();
    for (qubit, sign) in eigenvalues {
        let mut terms = Vec::with_capacity(current.num_terms());
        for (pauli, coeff) in current.terms() {
            let factor = match pauli.get(qubit) {
                Pauli::I => 1.0,
                Pauli::Z => sign,
                other => {
                    return Err(ChemError::Tapering(format!(
                        "term {pauli} acts with {} on symmetry qubit {qubit}",
                        other.as_char()
                    )));
                }
            };
            terms.push((pauli.remove_qubit(qubit)?, *coeff * Complex64::new(factor, 0.0)));
        }
        current = SparsePauliOp::from_terms(current.num_qubits() - 1, terms)?;
    }

    let reduced = current.simplify(DEFAULT_TOLERANCE);
    debug!(
        from = n,
        to = reduced.num_qubits(),
        terms = reduced.num_terms(),
        "two-qubit reduction applied"
    );
    Ok(reduced)
}

/// Drop the symmetry qubits from an encoded basis state.
pub fn reduce_bits(bits: &[bool]) -> ChemResult<Vec<bool>> {
    let [total_qubit, alpha_qubit] = reduced_qubits(bits.len())?;
    Ok(bits
        .iter()
        .enumerate()
        .filter(|(q, _)| *q != total_qubit && *q != alpha_qubit)
        .map(|(_, &b)| b)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn op(labels: &[(&str, f64)]) -> SparsePauliOp {
        let terms: Vec<_> = labels
            .iter()
            .map(|(l, c)| (*l, Complex64::new(*c, 0.0)))
            .collect();
        SparsePauliOp::from_labels(&terms).unwrap()
    }

    #[test]
    fn test_substitutes_eigenvalues() {
        // qubits 3 and 1 are removed; labels read q3 q2 q1 q0
        let h = op(&[("ZIII", 1.0), ("IIZI", 2.0), ("ZZZZ", 0.5), ("IXIX", 0.25)]);
        let reduced = two_qubit_reduction(&h, (1, 1)).unwrap();
        assert_eq!(reduced.num_qubits(), 2);
        // Z3 -> +1 (two electrons), Z1 -> -1 (one α electron)
        let find = |label: &str| {
            reduced
                .terms()
                .iter()
                .find(|(p, _)| p.label() == label)
                .map(|(_, c)| c.re)
        };
        assert_relative_eq!(find("II").unwrap(), 1.0 - 2.0, epsilon = 1e-12);
        assert_relative_eq!(find("ZZ").unwrap(), -0.5, epsilon = 1e-12);
        assert_relative_eq!(find("XX").unwrap(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_non_diagonal_symmetry_qubit() {
        let h = op(&[("XIII", 1.0)]);
        assert!(matches!(
            two_qubit_reduction(&h, (1, 1)),
            Err(ChemError::Tapering(_))
        ));
        assert!(reduced_qubits(3).is_err());
    }

    #[test]
    fn test_reduce_bits() {
        let bits = [true, true, false, false];
        assert_eq!(reduce_bits(&bits).unwrap(), vec![true, false]);
    }
}
