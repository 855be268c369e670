//! Error types for the variational algorithms.

use thiserror::Error;

/// Errors raised by optimizers, ansätze and eigensolvers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AlgoError {
    /// Parameter vector has the wrong length.
    #[error("Expected {expected} parameters, got {got}")]
    DimensionMismatch {
        /// Required length.
        expected: usize,
        /// Supplied length.
        got: usize,
    },

    /// A bound pair is empty or not finite.
    #[error("Invalid bounds for parameter {index}: ({lower}, {upper})")]
    InvalidBounds {
        /// Parameter index.
        index: usize,
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },

    /// Optimizer name not recognised.
    #[error("Unknown optimizer '{0}' (expected cobyla, l_bfgs_b, nelder_mead or spsa)")]
    UnknownOptimizer(String),

    /// Objective returned NaN or infinity.
    #[error("Objective returned a non-finite value at evaluation {0}")]
    NonFiniteObjective(usize),

    /// Excitation refers to orbitals outside the register or is malformed.
    #[error("Invalid excitation {excitation:?}: {reason}")]
    InvalidExcitation {
        /// The offending orbital indices.
        excitation: Vec<usize>,
        /// What is wrong with it.
        reason: String,
    },

    /// The operator pool has no usable excitations.
    #[error("Excitation pool is empty")]
    EmptyPool,

    /// Pool index out of range.
    #[error("Pool index {index} out of range for a pool of {size} operators")]
    PoolIndex {
        /// Requested index.
        index: usize,
        /// Pool size.
        size: usize,
    },

    /// Operator too wide for dense diagonalisation.
    #[error("Exact diagonalisation supports at most {max} qubits, operator has {requested}")]
    TooManyQubits {
        /// Operator width.
        requested: usize,
        /// Supported limit.
        max: usize,
    },

    /// No basis state satisfies the particle-number filter.
    #[error("No basis state with {0} particles")]
    EmptySector(usize),

    /// Operator and ansatz widths differ.
    #[error("Operator acts on {operator} qubits but the ansatz has {ansatz}")]
    WidthMismatch {
        /// Operator width.
        operator: usize,
        /// Ansatz width.
        ansatz: usize,
    },

    /// Chemistry error.
    #[error(transparent)]
    Chem(#[from] qadapt_chem::ChemError),

    /// Simulator error.
    #[error(transparent)]
    Sim(#[from] qadapt_adapter_sim::SimError),

    /// Circuit IR error.
    #[error(transparent)]
    Ir(#[from] qadapt_ir::IrError),
}

/// Result type for algorithm operations.
pub type AlgoResult<T> = Result<T, AlgoError>;
