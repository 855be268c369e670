//! qadapt circuit intermediate representation and Pauli algebra
//!
//! This crate provides the data structures shared by the rest of the
//! workspace: Pauli strings and sparse Pauli operators (the common currency
//! of qubit Hamiltonians and excitation generators) and a small circuit IR
//! for the variational forms that the simulator executes.
//!
//! - [`PauliString`] packs a Pauli word into X and Z bit masks;
//!   [`SparsePauliOp`] is a complex-weighted sum of them with products,
//!   commutators and simplification.
//! - [`Circuit`] is a builder over a [`CircuitDag`]. Gates are either
//!   [`StandardGate`]s or [`PauliEvolutionGate`] blocks `exp(-i t G)`, and
//!   every angle is a [`ParameterExpression`] in the positional `θ[k]`.
//!
//! # Example: an excitation block
//!
//! ```rust
//! use qadapt_ir::{Circuit, ParameterExpression, QubitId, SparsePauliOp};
//! use num_complex::Complex64;
//!
//! let generator = SparsePauliOp::from_labels(&[
//!     ("XY", Complex64::new(0.5, 0.0)),
//!     ("YX", Complex64::new(-0.5, 0.0)),
//! ]).unwrap();
//!
//! let mut circuit = Circuit::with_size("ansatz", 2);
//! circuit.x(QubitId(0)).unwrap();
//! circuit.evolve(&generator, ParameterExpression::parameter(0), 1).unwrap();
//!
//! assert_eq!(circuit.num_parameters(), 1);
//! assert_eq!(circuit.count_ops()["evolution"], 1);
//! ```
//!
//! Standard gates are `id x y z h s sdg rx ry rz cx cz`. An evolution gate
//! counts as a single `evolution` operation until [`Circuit::decompose`]
//! lowers it to that set.

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod pauli;
pub mod qubit;

pub use circuit::Circuit;
pub use dag::{CircuitDag, NodeIndex};
pub use error::{IrError, IrResult};
pub use gate::{Gate, PauliEvolutionGate, StandardGate};
pub use instruction::Instruction;
pub use parameter::ParameterExpression;
pub use pauli::{DEFAULT_TOLERANCE, MAX_PAULI_QUBITS, Pauli, PauliString, SparsePauliOp, i_pow};
pub use qubit::QubitId;
