//! Molecular electronic structure and qubit Hamiltonians for qadapt
//!
//! This crate covers everything between a geometry string and the qubit
//! operator a variational algorithm minimises.
//!
//! # Pipeline
//!
//! 1. [`Molecule`] parses and validates the geometry.
//! 2. [`HartreeFockDriver`] builds the STO-3G basis, evaluates integrals,
//!    runs restricted Hartree-Fock and transforms to the MO basis.
//! 3. [`QubitHamiltonianBuilder`] freezes or removes orbitals, builds the
//!    [`FermionicOperator`], maps it with a [`QubitMapping`] and optionally
//!    applies the two-qubit reduction.
//!
//! # Example
//!
//! ```rust,no_run
//! use qadapt_chem::{
//!     BasisSet, DistanceUnit, ElectronicStructureDriver, HartreeFockDriver, Molecule,
//!     QubitHamiltonianBuilder, QubitMapping,
//! };
//!
//! let molecule =
//!     Molecule::from_geometry("H .0 .0 .0; H .0 .0 0.735", DistanceUnit::Angstrom, 0, 1)?;
//! let es = HartreeFockDriver::new(molecule, BasisSet::Sto3g).run()?;
//! let hamiltonian = QubitHamiltonianBuilder::new(QubitMapping::Parity)
//!     .two_qubit_reduction(true)
//!     .build(&es)?;
//! assert_eq!(hamiltonian.num_qubits(), 2);
//! # Ok::<(), qadapt_chem::ChemError>(())
//! ```

pub mod basis;
pub mod driver;
pub mod error;
pub mod fermion;
pub mod hamiltonian;
pub mod integrals;
pub mod mapping;
pub mod molecule;
pub mod scf;
pub mod tapering;

pub use basis::{BasisSet, ContractedGaussian, build_basis};
pub use driver::{ElectronicStructure, ElectronicStructureDriver, HartreeFockDriver};
pub use error::{ChemError, ChemResult};
pub use fermion::{ActiveIntegrals, ActiveSpace, FermionicOperator, reduce_to_active};
pub use hamiltonian::{
    AUX_OPERATOR_NAMES, AuxOperator, QubitHamiltonian, QubitHamiltonianBuilder, spin_from_s_squared,
};
pub use integrals::AoIntegrals;
pub use mapping::QubitMapping;
pub use molecule::{Atom, BOHR_TO_ANGSTROM, DistanceUnit, Element, Molecule, parse_geometry};
pub use scf::{ScfOptions, ScfResult, run_rhf};
pub use tapering::{reduce_bits, reduced_qubits, two_qubit_reduction};
