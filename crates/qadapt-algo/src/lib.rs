//! Variational eigensolvers for qubit Hamiltonians.
//!
//! This crate provides the quantum-classical loop of the qadapt workspace:
//!
//! - **Optimizers**: COBYLA, L-BFGS-B, Nelder-Mead and SPSA behind one trait
//! - **Reference states**: the Hartree-Fock determinant in any supported mapping
//! - **Variational forms**: UCCSD, a hardware-efficient RY/CZ form, and an
//!   adaptive UCC ansatz grown from an operator pool
//! - **Eigensolvers**: VQE, ADAPT-VQE, and exact diagonalisation for reference
//!
//! # Example
//!
//! ```no_run
//! use qadapt_adapter_sim::StatevectorSimulator;
//! use qadapt_algo::{AdaptVqe, AdaptiveAnsatz, OptimizerKind, Uccsd, Vqe};
//! use qadapt_chem::{
//!     BasisSet, DistanceUnit, ElectronicStructureDriver, HartreeFockDriver, Molecule,
//!     QubitHamiltonianBuilder,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let molecule = Molecule::from_geometry("H .0 .0 .0; H .0 .0 0.735", DistanceUnit::Angstrom, 0, 1)?;
//! let structure = HartreeFockDriver::new(molecule, BasisSet::Sto3g).run()?;
//! let hamiltonian = QubitHamiltonianBuilder::default().build(&structure)?;
//! let simulator = StatevectorSimulator::new();
//!
//! let uccsd = Uccsd::new(&hamiltonian)?;
//! let fixed = Vqe::new(&hamiltonian.operator, &uccsd, OptimizerKind::default(), &simulator)?.run()?;
//!
//! let ansatz = AdaptiveAnsatz::new(&hamiltonian)?;
//! let adaptive = AdaptVqe::new(&hamiltonian.operator, ansatz, OptimizerKind::default(), &simulator)?
//!     .run()?;
//!
//! println!("UCCSD {:.6}  ADAPT {:.6}", fixed.eigenvalue, adaptive.vqe.eigenvalue);
//! # Ok(())
//! # }
//! ```

pub mod adapt;
pub mod ansatz;
pub mod error;
pub mod estimator;
pub mod exact;
pub mod initial_state;
pub mod optimizers;
pub mod vqe;

pub use adapt::{
    AdaptResult, AdaptVqe, DEFAULT_DELTA, DEFAULT_THRESHOLD, FinishingCriterion, GradientMethod,
    is_cyclic,
};
pub use ansatz::{
    AdaptiveAnsatz, Excitation, ExcitationSpace, HoppingOperator, TwoLocal, Uccsd, VariationalForm,
};
pub use error::{AlgoError, AlgoResult};
pub use estimator::Estimator;
pub use exact::{ExactEigensolver, ExactResult, MAX_EXACT_QUBITS};
pub use initial_state::HartreeFock;
pub use optimizers::{
    Cobyla, LBfgsB, NelderMead, OptimizationResult, Optimizer, OptimizerKind, Spsa,
};
pub use vqe::{Vqe, VqeResult};
