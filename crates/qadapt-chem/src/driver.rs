//! Electronic-structure drivers.
//!
//! A driver turns a [`Molecule`] into an [`ElectronicStructure`]: molecular
//! orbitals plus the one- and two-electron integrals expressed in them.

use ndarray::{Array1, Array2, Array4};
use tracing::info;

use crate::basis::{BasisSet, build_basis};
use crate::error::{ChemError, ChemResult};
use crate::integrals::AoIntegrals;
use crate::molecule::Molecule;
use crate::scf::{ScfOptions, run_rhf};

/// Integrals and reference data for one molecule, in the MO basis.
///
/// Immutable once produced by a driver.
#[derive(Debug, Clone)]
pub struct ElectronicStructure {
    /// The molecule these integrals describe.
    pub molecule: Molecule,
    /// Basis set used.
    pub basis: BasisSet,
    /// Number of spatial molecular orbitals.
    pub num_orbitals: usize,
    /// Spin-up electron count.
    pub num_alpha: usize,
    /// Spin-down electron count.
    pub num_beta: usize,
    /// Nuclear repulsion energy.
    pub nuclear_repulsion: f64,
    /// Hartree-Fock total energy (electronic + nuclear repulsion).
    pub hf_energy: f64,
    /// Orbital energies.
    pub mo_energies: Array1<f64>,
    /// MO coefficients (AO × MO).
    pub mo_coefficients: Array2<f64>,
    /// One-electron integrals `h_pq` in the MO basis.
    pub mo_one_body: Array2<f64>,
    /// Two-electron integrals `(pq|rs)` in the MO basis, chemists' notation.
    pub mo_two_body: Array4<f64>,
    /// Number of core orbitals eligible for freezing.
    pub core_orbitals: usize,
}

/// Anything that can produce an [`ElectronicStructure`].
pub trait ElectronicStructureDriver {
    /// Run the calculation.
    fn run(&self) -> ChemResult<ElectronicStructure>;
}

/// Restricted Hartree-Fock driver over the built-in basis sets.
#[derive(Debug, Clone)]
pub struct HartreeFockDriver {
    molecule: Molecule,
    basis: BasisSet,
    options: ScfOptions,
}

impl HartreeFockDriver {
    /// Create a driver with default SCF options.
    pub fn new(molecule: Molecule, basis: BasisSet) -> Self {
        Self {
            molecule,
            basis,
            options: ScfOptions::default(),
        }
    }

    /// Override SCF convergence controls.
    #[must_use]
    pub fn with_options(mut self, options: ScfOptions) -> Self {
        self.options = options;
        self
    }
}

impl ElectronicStructureDriver for HartreeFockDriver {
    fn run(&self) -> ChemResult<ElectronicStructure> {
        let molecule = &self.molecule;
        if molecule.multiplicity() != 1 {
            return Err(ChemError::OpenShell(molecule.multiplicity()));
        }

        let basis = build_basis(molecule, self.basis);
        let ints = AoIntegrals::compute(&basis, molecule);
        let n_occ = molecule.num_alpha();
        let scf = run_rhf(&ints, n_occ, &self.options)?;

        let nuclear_repulsion = molecule.nuclear_repulsion_energy();
        let hf_energy = scf.electronic_energy + nuclear_repulsion;
        let c = &scf.mo_coefficients;
        let mo_one_body = c.t().dot(&ints.core_hamiltonian()).dot(c);
        let mo_two_body = transform_eri(&ints, c);

        info!(
            molecule = %molecule.formula(),
            basis = %self.basis,
            orbitals = ints.num_basis(),
            hf_energy,
            "Hartree-Fock driver finished"
        );

        Ok(ElectronicStructure {
            molecule: molecule.clone(),
            basis: self.basis,
            num_orbitals: ints.num_basis(),
            num_alpha: molecule.num_alpha(),
            num_beta: molecule.num_beta(),
            nuclear_repulsion,
            hf_energy,
            mo_energies: scf.mo_energies,
            mo_coefficients: scf.mo_coefficients,
            mo_one_body,
            mo_two_body,
            core_orbitals: molecule.core_orbitals(),
        })
    }
}

/// AO → MO transformation of `(μν|λσ)`, one index at a time.
fn transform_eri(ints: &AoIntegrals, c: &Array2<f64>) -> Array4<f64> {
    let n = ints.num_basis();
    let m = c.ncols();
    let mut step1 = Array4::<f64>::zeros((m, n, n, n));
    for p in 0..m {
        for nu in 0..n {
            for la in 0..n {
                for si in 0..n {
                    step1[[p, nu, la, si]] = (0..n)
                        .map(|mu| c[[mu, p]] * ints.eri[[mu, nu, la, si]])
                        .sum();
                }
            }
        }
    }
    let mut step2 = Array4::<f64>::zeros((m, m, n, n));
    for p in 0..m {
        for q in 0..m {
            for la in 0..n {
                for si in 0..n {
                    step2[[p, q, la, si]] = (0..n).map(|nu| c[[nu, q]] * step1[[p, nu, la, si]]).sum();
                }
            }
        }
    }
    let mut step3 = Array4::<f64>::zeros((m, m, m, n));
    for p in 0..m {
        for q in 0..m {
            for r in 0..m {
                for si in 0..n {
                    step3[[p, q, r, si]] = (0..n).map(|la| c[[la, r]] * step2[[p, q, la, si]]).sum();
                }
            }
        }
    }
    let mut mo = Array4::<f64>::zeros((m, m, m, m));
    for p in 0..m {
        for q in 0..m {
            for r in 0..m {
                for s in 0..m {
                    mo[[p, q, r, s]] = (0..n).map(|si| c[[si, s]] * step3[[p, q, r, si]]).sum();
                }
            }
        }
    }
    mo
}
