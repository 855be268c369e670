//! Error types for the IR crate.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors raised while building circuits or manipulating Pauli operators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// An operand lies outside the circuit's register.
    #[error("{gate} acts on {qubit}, but the circuit has {num_qubits} qubits")]
    QubitOutOfRange {
        /// Gate name.
        gate: String,
        /// Offending operand.
        qubit: QubitId,
        /// Register width.
        num_qubits: usize,
    },

    /// The same qubit appears twice among a gate's operands.
    #[error("{gate} lists {qubit} more than once")]
    DuplicateQubit {
        /// Gate name.
        gate: String,
        /// Repeated operand.
        qubit: QubitId,
    },

    /// Operand count does not match the gate.
    #[error("{gate} takes {expected} qubits, got {got}")]
    ArityMismatch {
        /// Gate name.
        gate: String,
        /// Qubits the gate acts on.
        expected: usize,
        /// Operands supplied.
        got: usize,
    },

    #[error("Parameter θ[{0}] is unbound")]
    UnboundParameter(usize),

    #[error("Circuit has {expected} parameters, got {got} values")]
    ParameterCountMismatch { expected: usize, got: usize },

    /// Pauli strings are bit masks in a `u64`.
    #[error("Pauli operators support at most {max} qubits, requested {requested}")]
    TooManyQubits { requested: usize, max: usize },

    #[error("Invalid Pauli label '{0}'")]
    InvalidPauliLabel(String),

    /// Operands of different widths were combined.
    #[error("Width mismatch: {left} qubits vs {right} qubits")]
    WidthMismatch { left: usize, right: usize },

    #[error("Evolution generator is not Hermitian (largest imaginary coefficient {0:.3e})")]
    NonHermitianGenerator(f64),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
