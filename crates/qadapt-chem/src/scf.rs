//! Closed-shell restricted Hartree-Fock.

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};

use crate::error::{ChemError, ChemResult};
use crate::integrals::AoIntegrals;

/// Overlap eigenvalues below this indicate a linearly dependent basis.
const LINEAR_DEPENDENCE_THRESHOLD: f64 = 1e-10;

/// Convergence controls for the SCF loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScfOptions {
    /// Maximum Fock builds.
    pub max_iterations: usize,
    /// Convergence threshold on the energy change.
    pub energy_tolerance: f64,
    /// Convergence threshold on the RMS density change.
    pub density_tolerance: f64,
    /// Number of Fock/error pairs kept for DIIS extrapolation; 0 disables DIIS.
    pub diis_space: usize,
}

impl Default for ScfOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            energy_tolerance: 1e-10,
            density_tolerance: 1e-8,
            diis_space: 8,
        }
    }
}

/// Converged RHF solution.
#[derive(Debug, Clone)]
pub struct ScfResult {
    /// Electronic energy (without nuclear repulsion).
    pub electronic_energy: f64,
    /// Orbital energies, ascending.
    pub mo_energies: Array1<f64>,
    /// MO coefficients, one column per orbital.
    pub mo_coefficients: Array2<f64>,
    /// Final density matrix `P = 2 C_occ C_occᵀ`.
    pub density: Array2<f64>,
    /// Fock builds performed.
    pub iterations: usize,
}

fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

fn to_array(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Eigen-decomposition with eigenvalues sorted ascending and eigenvector
/// signs fixed so the largest-magnitude component is positive.
fn sorted_eigen(m: DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let eig = SymmetricEigen::new(m);
    let n = eig.eigenvalues.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));
    let values = DVector::from_fn(n, |i, _| eig.eigenvalues[order[i]]);
    let mut vectors = DMatrix::from_fn(n, n, |i, j| eig.eigenvectors[(i, order[j])]);
    for mut col in vectors.column_iter_mut() {
        let pivot = col
            .iter()
            .copied()
            .fold(0.0f64, |acc, x| if x.abs() > acc.abs() { x } else { acc });
        if pivot < 0.0 {
            col.neg_mut();
        }
    }
    (values, vectors)
}

/// Symmetric orthogonaliser `X = S^{-1/2}`.
fn symmetric_orthogonalizer(overlap: &DMatrix<f64>) -> ChemResult<DMatrix<f64>> {
    let (values, vectors) = sorted_eigen(overlap.clone());
    let smallest = values.iter().copied().fold(f64::INFINITY, f64::min);
    if smallest < LINEAR_DEPENDENCE_THRESHOLD {
        return Err(ChemError::LinearDependence(smallest));
    }
    let inv_sqrt = DMatrix::from_diagonal(&values.map(|v| 1.0 / v.sqrt()));
    Ok(&vectors * inv_sqrt * vectors.transpose())
}

fn build_density(c: &DMatrix<f64>, n_occ: usize) -> DMatrix<f64> {
    let occ = c.columns(0, n_occ);
    occ * occ.transpose() * 2.0
}

fn build_fock(h: &DMatrix<f64>, density: &DMatrix<f64>, ints: &AoIntegrals) -> DMatrix<f64> {
    let n = h.nrows();
    let mut f = h.clone();
    for mu in 0..n {
        for nu in 0..n {
            let mut g = 0.0;
            for la in 0..n {
                for si in 0..n {
                    let p = density[(la, si)];
                    g += p * (ints.eri[[mu, nu, la, si]] - 0.5 * ints.eri[[mu, la, nu, si]]);
                }
            }
            f[(mu, nu)] += g;
        }
    }
    f
}

fn electronic_energy(density: &DMatrix<f64>, h: &DMatrix<f64>, f: &DMatrix<f64>) -> f64 {
    0.5 * density.component_mul(&(h + f)).sum()
}

/// Pulay DIIS on the commutator error `FPS - SPF`.
struct Diis {
    space: usize,
    focks: VecDeque<DMatrix<f64>>,
    errors: VecDeque<DMatrix<f64>>,
}

impl Diis {
    fn new(space: usize) -> Self {
        Self {
            space,
            focks: VecDeque::with_capacity(space),
            errors: VecDeque::with_capacity(space),
        }
    }

    fn extrapolate(&mut self, fock: DMatrix<f64>, error: DMatrix<f64>) -> DMatrix<f64> {
        if self.space == 0 {
            return fock;
        }
        if self.focks.len() == self.space {
            self.focks.pop_front();
            self.errors.pop_front();
        }
        self.focks.push_back(fock.clone());
        self.errors.push_back(error);
        let m = self.focks.len();
        if m < 2 {
            return fock;
        }

        let mut b = DMatrix::zeros(m + 1, m + 1);
        for i in 0..m {
            for j in 0..=i {
                let v = self.errors[i].dot(&self.errors[j]);
                b[(i, j)] = v;
                b[(j, i)] = v;
            }
            b[(i, m)] = -1.0;
            b[(m, i)] = -1.0;
        }
        let mut rhs = DVector::zeros(m + 1);
        rhs[m] = -1.0;

        match b.lu().solve(&rhs) {
            Some(coeffs) => self
                .focks
                .iter()
                .enumerate()
                .fold(DMatrix::zeros(fock.nrows(), fock.ncols()), |acc, (i, f)| {
                    acc + f * coeffs[i]
                }),
            None => {
                debug!("DIIS system singular, using plain Fock matrix");
                fock
            }
        }
    }
}

/// Solve the closed-shell Roothaan equations for `n_occ` doubly occupied orbitals.
pub fn run_rhf(ints: &AoIntegrals, n_occ: usize, options: &ScfOptions) -> ChemResult<ScfResult> {
    let s = to_dmatrix(&ints.overlap);
    let h = to_dmatrix(&ints.core_hamiltonian());
    let x = symmetric_orthogonalizer(&s)?;

    // Core-Hamiltonian guess
    let (_, c_prime) = sorted_eigen(x.transpose() * &h * &x);
    let mut c = &x * c_prime;
    let mut density = build_density(&c, n_occ);
    let mut energy = 0.0;
    let mut diis = Diis::new(options.diis_space);
    let mut last_delta = f64::INFINITY;

    for iteration in 1..=options.max_iterations {
        let fock = build_fock(&h, &density, ints);
        let new_energy = electronic_energy(&density, &h, &fock);
        let error = &fock * &density * &s - &s * &density * &fock;
        let fock = diis.extrapolate(fock, error);

        let (eps, c_prime) = sorted_eigen(x.transpose() * &fock * &x);
        c = &x * c_prime;
        let new_density = build_density(&c, n_occ);

        let delta_e = (new_energy - energy).abs();
        let n = density.nrows() as f64;
        let rms_d = ((&new_density - &density).norm_squared() / (n * n)).sqrt();
        debug!(iteration, energy = new_energy, delta_e, rms_d, "SCF iteration");

        energy = new_energy;
        density = new_density;
        last_delta = delta_e;

        if iteration > 1 && delta_e < options.energy_tolerance && rms_d < options.density_tolerance {
            let fock = build_fock(&h, &density, ints);
            let electronic = electronic_energy(&density, &h, &fock);
            info!(iterations = iteration, electronic_energy = electronic, "SCF converged");
            return Ok(ScfResult {
                electronic_energy: electronic,
                mo_energies: Array1::from_iter(eps.iter().copied()),
                mo_coefficients: to_array(&c),
                density: to_array(&density),
                iterations: iteration,
            });
        }
    }

    Err(ChemError::ScfNotConverged {
        iterations: options.max_iterations,
        delta_energy: last_delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{BasisSet, build_basis};
    use crate::molecule::{DistanceUnit, Molecule};
    use approx::assert_relative_eq;

    #[test]
    fn test_h2_rhf_energy() {
        let mol = Molecule::from_geometry("H 0 0 0; H 0 0 1.4", DistanceUnit::Bohr, 0, 1).unwrap();
        let basis = build_basis(&mol, BasisSet::Sto3g);
        let ints = AoIntegrals::compute(&basis, &mol);
        let result = run_rhf(&ints, 1, &ScfOptions::default()).unwrap();
        // Szabo & Ostlund: E_elec = -1.8310, orbital energies -0.5782, 0.6703
        assert_relative_eq!(result.electronic_energy, -1.8310, epsilon = 1e-4);
        assert_relative_eq!(result.mo_energies[0], -0.5782, epsilon = 1e-4);
        assert_relative_eq!(result.mo_energies[1], 0.6703, epsilon = 1e-4);
    }

    #[test]
    fn test_orbitals_are_orthonormal() {
        let mol = Molecule::from_geometry("Li 0 0 0; H 0 0 1.6", DistanceUnit::Angstrom, 0, 1)
            .unwrap();
        let basis = build_basis(&mol, BasisSet::Sto3g);
        let ints = AoIntegrals::compute(&basis, &mol);
        let result = run_rhf(&ints, 2, &ScfOptions::default()).unwrap();
        let c = &result.mo_coefficients;
        let ctsc = c.t().dot(&ints.overlap).dot(c);
        for i in 0..ctsc.nrows() {
            for j in 0..ctsc.ncols() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(ctsc[[i, j]], expected, epsilon = 1e-8);
            }
        }
        // Aufbau ordering
        assert!(result.mo_energies.windows(2).into_iter().all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_not_converged() {
        let mol = Molecule::from_geometry("H 0 0 0; H 0 0 1.4", DistanceUnit::Bohr, 0, 1).unwrap();
        let basis = build_basis(&mol, BasisSet::Sto3g);
        let ints = AoIntegrals::compute(&basis, &mol);
        let options = ScfOptions {
            max_iterations: 1,
            ..ScfOptions::default()
        };
        assert!(matches!(
            run_rhf(&ints, 1, &options),
            Err(ChemError::ScfNotConverged { .. })
        ));
    }
}
