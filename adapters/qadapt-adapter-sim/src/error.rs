//! Error types for the simulator.

use thiserror::Error;

/// Errors raised while simulating a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Circuit is wider than the simulator allows.
    #[error("Circuit has {requested} qubits but the simulator supports at most {max}")]
    TooManyQubits {
        /// Qubits in the circuit.
        requested: usize,
        /// Configured limit.
        max: usize,
    },

    /// A gate still refers to a free parameter.
    #[error("Gate '{0}' has an unbound parameter; bind parameters before simulating")]
    UnboundParameter(String),

    /// Observable and state have different widths.
    #[error("Operator acts on {operator} qubits but the state has {state}")]
    WidthMismatch {
        /// Qubits in the state.
        state: usize,
        /// Qubits in the operator.
        operator: usize,
    },

    /// Basis index outside the state space.
    #[error("Basis state {index} out of range for {num_qubits} qubits")]
    BasisState {
        /// Requested index.
        index: usize,
        /// Register width.
        num_qubits: usize,
    },

    /// Circuit IR error.
    #[error("Circuit error: {0}")]
    Ir(#[from] qadapt_ir::IrError),
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
