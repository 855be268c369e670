//! Hartree-Fock reference state.

use qadapt_chem::{QubitHamiltonian, QubitMapping, reduce_bits};
use qadapt_ir::{Circuit, QubitId};
use serde::{Deserialize, Serialize};

use crate::error::AlgoResult;

/// The closed-shell Hartree-Fock determinant, encoded for a given mapping.
///
/// The lowest `N_α` α spin-orbitals and the lowest `N_β` β spin-orbitals are
/// occupied. The occupation vector is encoded with the mapping and, when the
/// Hamiltonian was tapered, the two symmetry qubits are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HartreeFock {
    bits: Vec<bool>,
}

impl HartreeFock {
    /// Build the reference from explicit parameters.
    pub fn new(
        num_spin_orbitals: usize,
        num_particles: (usize, usize),
        mapping: QubitMapping,
        two_qubit_reduction: bool,
    ) -> AlgoResult<Self> {
        let half = num_spin_orbitals / 2;
        let (alpha, beta) = num_particles;
        let occupation: Vec<bool> = (0..num_spin_orbitals)
            .map(|m| m < alpha || (m >= half && m < half + beta))
            .collect();
        let mut bits = mapping.encode_occupation(&occupation);
        if two_qubit_reduction {
            bits = reduce_bits(&bits)?;
        }
        Ok(Self { bits })
    }

    /// Reference matching the layout of a qubit Hamiltonian.
    pub fn for_hamiltonian(hamiltonian: &QubitHamiltonian) -> AlgoResult<Self> {
        Self::new(
            hamiltonian.num_spin_orbitals,
            hamiltonian.num_particles,
            hamiltonian.mapping,
            hamiltonian.two_qubit_reduction,
        )
    }

    /// Qubit values, qubit 0 first.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Register width.
    pub fn num_qubits(&self) -> usize {
        self.bits.len()
    }

    /// Computational basis index of the reference.
    pub fn basis_index(&self) -> usize {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .fold(0, |acc, (q, _)| acc | (1 << q))
    }

    /// A circuit of X gates preparing the reference from `|0…0⟩`.
    pub fn circuit(&self) -> AlgoResult<Circuit> {
        let mut circuit = Circuit::with_size("hartree_fock", self.bits.len());
        for (q, _) in self.bits.iter().enumerate().filter(|(_, b)| **b) {
            circuit.x(QubitId::from(q))?;
        }
        Ok(circuit)
    }
}
