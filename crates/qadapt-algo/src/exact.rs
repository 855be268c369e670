//! Exact minimum eigenvalue by dense diagonalisation.

use nalgebra::{DMatrix, SymmetricEigen};
use num_complex::Complex64;
use qadapt_ir::{SparsePauliOp, i_pow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AlgoError, AlgoResult};

/// Widest operator diagonalised densely.
pub const MAX_EXACT_QUBITS: usize = 14;

/// Lowest eigenpair of an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactResult {
    /// Lowest eigenvalue.
    pub eigenvalue: f64,
    /// Eigenvector over the full register.
    pub eigenstate: Vec<Complex64>,
    /// Number of basis states kept by the filter.
    pub sector_dimension: usize,
}

/// Dense Hermitian eigensolver, optionally restricted to basis states of a
/// given particle number.
///
/// The particle-number operator must be diagonal in the computational basis,
/// which holds for every supported mapping.
#[derive(Debug, Clone)]
pub struct ExactEigensolver<'a> {
    operator: &'a SparsePauliOp,
    filter: Option<(&'a SparsePauliOp, usize)>,
}

impl<'a> ExactEigensolver<'a> {
    /// Solver for the whole Hilbert space.
    pub fn new(operator: &'a SparsePauliOp) -> Self {
        Self {
            operator,
            filter: None,
        }
    }

    /// Keep only basis states with `⟨b|N|b⟩ = particles`.
    #[must_use]
    pub fn with_particle_filter(mut self, number_operator: &'a SparsePauliOp, particles: usize) -> Self {
        self.filter = Some((number_operator, particles));
        self
    }

    fn diagonal(op: &SparsePauliOp, index: usize) -> f64 {
        op.terms()
            .iter()
            .filter_map(|(pauli, coeff)| {
                let (row, k) = pauli.apply_to_basis(index);
                (row == index).then(|| (coeff * i_pow(k)).re)
            })
            .sum()
    }

    /// Diagonalise and return the lowest eigenpair.
    pub fn run(&self) -> AlgoResult<ExactResult> {
        let n = self.operator.num_qubits();
        if n > MAX_EXACT_QUBITS {
            return Err(AlgoError::TooManyQubits {
                requested: n,
                max: MAX_EXACT_QUBITS,
            });
        }
        let dim = 1usize << n;
        let keep: Vec<usize> = match self.filter {
            Some((number, particles)) => {
                if number.num_qubits() != n {
                    return Err(AlgoError::WidthMismatch {
                        operator: number.num_qubits(),
                        ansatz: n,
                    });
                }
                (0..dim)
                    .filter(|&b| (Self::diagonal(number, b) - particles as f64).abs() < 1e-8)
                    .collect()
            }
            None => (0..dim).collect(),
        };
        if keep.is_empty() {
            let particles = self.filter.map_or(0, |(_, p)| p);
            return Err(AlgoError::EmptySector(particles));
        }

        let mut position = vec![None; dim];
        for (i, &b) in keep.iter().enumerate() {
            position[b] = Some(i);
        }
        let mut matrix = DMatrix::<Complex64>::zeros(keep.len(), keep.len());
        for (pauli, coeff) in self.operator.terms() {
            for (col, &b) in keep.iter().enumerate() {
                let (target, k) = pauli.apply_to_basis(b);
                if let Some(row) = position[target] {
                    matrix[(row, col)] += coeff * i_pow(k);
                }
            }
        }

        let eigen = SymmetricEigen::new(matrix);
        let lowest = eigen
            .eigenvalues
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .ok_or(AlgoError::EmptySector(0))?;
        let eigenvalue = eigen.eigenvalues[lowest];
        let mut eigenstate = vec![Complex64::new(0.0, 0.0); dim];
        for (i, &b) in keep.iter().enumerate() {
            eigenstate[b] = eigen.eigenvectors[(i, lowest)];
        }

        debug!(qubits = n, sector = keep.len(), eigenvalue, "exact diagonalisation");
        Ok(ExactResult {
            eigenvalue,
            eigenstate,
            sector_dimension: keep.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(labels: &[(&str, f64)]) -> SparsePauliOp {
        let terms: Vec<_> = labels
            .iter()
            .map(|(l, c)| (*l, Complex64::new(*c, 0.0)))
            .collect();
        SparsePauliOp::from_labels(&terms).unwrap()
    }

    #[test]
    fn test_single_qubit() {
        let h = op(&[("X", 1.0), ("Z", 1.0)]);
        let result = ExactEigensolver::new(&h).run().unwrap();
        assert!((result.eigenvalue + std::f64::consts::SQRT_2).abs() < 1e-12);
        let norm: f64 = result.eigenstate.iter().map(|a| a.norm_sqr()).sum();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_particle_filter() {
        // N = (2 - Z0 - Z1) / 2. In the one-particle sector ZZ = -1 and
        // XX+YY couples |01⟩ and |10⟩ with unit strength, so the minimum is 3 - 1
        let number = op(&[("II", 1.0), ("IZ", -0.5), ("ZI", -0.5)]);
        let h = op(&[("ZZ", -3.0), ("XX", 0.5), ("YY", 0.5)]);
        let full = ExactEigensolver::new(&h).run().unwrap();
        let one = ExactEigensolver::new(&h)
            .with_particle_filter(&number, 1)
            .run()
            .unwrap();
        assert_eq!(one.sector_dimension, 2);
        assert!((full.eigenvalue + 3.0).abs() < 1e-12);
        assert!((one.eigenvalue - 2.0).abs() < 1e-12);
        assert!(matches!(
            ExactEigensolver::new(&h).with_particle_filter(&number, 3).run(),
            Err(AlgoError::EmptySector(3))
        ));
    }
}
