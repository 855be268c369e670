//! qadapt Local Statevector Simulator
//!
//! Exact statevector simulation of qadapt circuits, used as the execution
//! target of the variational algorithms. Evolution gates are applied as exact
//! Pauli exponentials rather than through their gate decomposition.
//!
//! # Performance
//!
//! | Qubits | Memory | Simulation Speed |
//! |--------|--------|------------------|
//! | 10 | ~16 KB | Instant |
//! | 15 | ~512 KB | Fast |
//! | 20 | ~16 MB | Moderate |
//! | 24 | ~256 MB | Slow |
//!
//! # Example
//!
//! ```rust
//! use num_complex::Complex64;
//! use qadapt_adapter_sim::StatevectorSimulator;
//! use qadapt_ir::{Circuit, QubitId, SparsePauliOp};
//!
//! let mut circuit = Circuit::with_size("flip", 1);
//! circuit.x(QubitId(0)).unwrap();
//!
//! let z = SparsePauliOp::from_labels(&[("Z", Complex64::new(1.0, 0.0))]).unwrap();
//! let state = StatevectorSimulator::new().run(&circuit).unwrap();
//! assert!((state.expectation(&z).unwrap() + 1.0).abs() < 1e-12);
//! ```

mod error;
mod simulator;
mod statevector;

pub use error::{SimError, SimResult};
pub use simulator::{DEFAULT_MAX_QUBITS, SimulatorOptions, StatevectorSimulator};
pub use statevector::Statevector;
