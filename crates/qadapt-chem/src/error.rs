//! Error types for the chemistry crate.

use thiserror::Error;

/// Errors produced while building a molecular qubit Hamiltonian.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChemError {
    /// Geometry string could not be parsed.
    #[error("Invalid geometry at byte {position}: {message}")]
    Geometry {
        /// Byte offset of the offending token.
        position: usize,
        /// What went wrong.
        message: String,
    },

    /// Element symbol not known or not covered by the basis.
    #[error("Unknown or unsupported element '{0}'")]
    UnknownElement(String),

    /// Basis set name not recognised.
    #[error("Unsupported basis set '{0}' (available: sto3g)")]
    UnsupportedBasis(String),

    /// Two atoms share a position.
    #[error("Atoms {first} and {second} overlap")]
    OverlappingAtoms {
        /// Index of the first atom.
        first: usize,
        /// Index of the second atom.
        second: usize,
    },

    /// Charge leaves no electrons, or multiplicity is inconsistent.
    #[error("Invalid electronic configuration: {0}")]
    ElectronConfiguration(String),

    /// Only closed-shell references are supported.
    #[error("Open-shell molecule (multiplicity {0}) is not supported by restricted Hartree-Fock")]
    OpenShell(u32),

    /// The SCF procedure did not converge.
    #[error("SCF did not converge in {iterations} iterations (ΔE = {delta_energy:.3e})")]
    ScfNotConverged {
        /// Iterations performed.
        iterations: usize,
        /// Last energy change.
        delta_energy: f64,
    },

    /// Overlap matrix is numerically singular.
    #[error("Basis is linearly dependent (smallest overlap eigenvalue {0:.3e})")]
    LinearDependence(f64),

    /// Orbital index outside the molecular orbital range.
    #[error("Orbital index {index} out of range for {num_orbitals} orbitals")]
    OrbitalIndex {
        /// Requested index (negative counts from the end).
        index: i64,
        /// Number of spatial orbitals.
        num_orbitals: usize,
    },

    /// Mapping name not recognised.
    #[error("Unknown qubit mapping '{0}' (expected jordan_wigner, parity or bravyi_kitaev)")]
    UnknownMapping(String),

    /// Symmetry reduction could not be applied.
    #[error("Two-qubit reduction failed: {0}")]
    Tapering(String),

    /// Pauli algebra error.
    #[error("Pauli algebra error: {0}")]
    Ir(#[from] qadapt_ir::IrError),
}

/// Result type for chemistry operations.
pub type ChemResult<T> = Result<T, ChemError>;
