//! Qubit Hamiltonian construction.
//!
//! [`QubitHamiltonianBuilder`] takes an [`ElectronicStructure`] through active
//! space reduction, fermionic operator construction, qubit mapping and the
//! optional two-qubit reduction.

use qadapt_ir::SparsePauliOp;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::driver::ElectronicStructure;
use crate::error::ChemResult;
use crate::fermion::{ActiveSpace, FermionicOperator, reduce_to_active};
use crate::mapping::QubitMapping;
use crate::tapering::two_qubit_reduction;

/// An observable evaluated alongside the energy.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxOperator {
    /// Display name.
    pub name: String,
    /// Mapped (and reduced) operator.
    pub operator: SparsePauliOp,
}

/// Names of the auxiliary operators, in the order they are built.
pub const AUX_OPERATOR_NAMES: [&str; 3] = ["particle_number", "total_spin_squared", "magnetization"];

/// Molecular Hamiltonian as a qubit operator, plus everything needed to
/// interpret its eigenvalues.
#[derive(Debug, Clone)]
pub struct QubitHamiltonian {
    /// Electronic Hamiltonian over the active space.
    pub operator: SparsePauliOp,
    /// Particle number, total spin and magnetisation in the same encoding.
    pub aux_operators: Vec<AuxOperator>,
    /// Constant removed by freezing core orbitals.
    pub energy_shift: f64,
    /// Nuclear repulsion energy.
    pub nuclear_repulsion: f64,
    /// Active `(α, β)` electron counts.
    pub num_particles: (usize, usize),
    /// Active spin orbitals before any qubit reduction.
    pub num_spin_orbitals: usize,
    /// Encoding used.
    pub mapping: QubitMapping,
    /// Whether the two-qubit reduction was applied.
    pub two_qubit_reduction: bool,
    /// Hartree-Fock total energy of the full molecule.
    pub hf_energy: f64,
}

impl QubitHamiltonian {
    /// Number of qubits the operator acts on.
    pub fn num_qubits(&self) -> usize {
        self.operator.num_qubits()
    }

    /// Electronic energy: eigenvalue plus the frozen-core shift.
    pub fn electronic_energy(&self, eigenvalue: f64) -> f64 {
        eigenvalue + self.energy_shift
    }

    /// Total energy including nuclear repulsion.
    pub fn total_energy(&self, eigenvalue: f64) -> f64 {
        self.electronic_energy(eigenvalue) + self.nuclear_repulsion
    }
}

/// Spin quantum number and multiplicity from an `⟨S²⟩` value.
pub fn spin_from_s_squared(s_squared: f64) -> (f64, f64) {
    let spin = (-1.0 + (1.0 + 4.0 * s_squared.max(0.0)).sqrt()) / 2.0;
    (spin, 2.0 * spin + 1.0)
}

/// Options for building a [`QubitHamiltonian`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QubitHamiltonianBuilder {
    /// Fermion-to-qubit encoding.
    pub mapping: QubitMapping,
    /// Remove two qubits by particle-number parity (parity mapping only).
    pub two_qubit_reduction: bool,
    /// Freeze core orbitals into an energy shift.
    pub freeze_core: bool,
    /// Orbitals to freeze (occupied) or remove (virtual); negative indices
    /// count from the end.
    pub orbital_reduction: Vec<i64>,
}

impl Default for QubitHamiltonianBuilder {
    fn default() -> Self {
        Self {
            mapping: QubitMapping::Parity,
            two_qubit_reduction: true,
            freeze_core: false,
            orbital_reduction: Vec::new(),
        }
    }
}

impl QubitHamiltonianBuilder {
    /// Builder with the given mapping and the remaining options at default.
    pub fn new(mapping: QubitMapping) -> Self {
        Self {
            mapping,
            ..Self::default()
        }
    }

    /// Enable or disable the two-qubit reduction.
    #[must_use]
    pub fn two_qubit_reduction(mut self, enabled: bool) -> Self {
        self.two_qubit_reduction = enabled;
        self
    }

    /// Enable or disable core freezing.
    #[must_use]
    pub fn freeze_core(mut self, enabled: bool) -> Self {
        self.freeze_core = enabled;
        self
    }

    /// Set the orbital reduction list.
    #[must_use]
    pub fn orbital_reduction(mut self, orbitals: Vec<i64>) -> Self {
        self.orbital_reduction = orbitals;
        self
    }

    /// True if the two-qubit reduction will actually be applied.
    pub fn reduces_qubits(&self) -> bool {
        self.two_qubit_reduction && self.mapping == QubitMapping::Parity
    }

    /// Build the qubit Hamiltonian and auxiliary operators.
    pub fn build(&self, es: &ElectronicStructure) -> ChemResult<QubitHamiltonian> {
        let core = if self.freeze_core { es.core_orbitals } else { 0 };
        let space = ActiveSpace::resolve(es.num_orbitals, es.num_alpha, core, &self.orbital_reduction)?;
        let integrals = reduce_to_active(es, &space);
        let num_particles = (
            es.num_alpha - space.frozen.len(),
            es.num_beta - space.frozen.len(),
        );

        let fermionic = FermionicOperator::from_spatial(&integrals.one_body, &integrals.two_body);
        let num_spin_orbitals = fermionic.num_modes();

        if self.two_qubit_reduction && !self.reduces_qubits() {
            warn!(mapping = %self.mapping, "two-qubit reduction only applies to the parity mapping, skipping");
        }
        let finish = |op: &FermionicOperator| -> ChemResult<SparsePauliOp> {
            let mapped = self.mapping.map(op)?;
            if self.reduces_qubits() {
                two_qubit_reduction(&mapped, num_particles)
            } else {
                Ok(mapped)
            }
        };

        let operator = finish(&fermionic)?;
        let aux = [
            FermionicOperator::particle_number(num_spin_orbitals),
            FermionicOperator::total_spin_squared(num_spin_orbitals),
            FermionicOperator::magnetization(num_spin_orbitals),
        ];
        let aux_operators = AUX_OPERATOR_NAMES
            .iter()
            .zip(aux.iter())
            .map(|(name, op)| {
                Ok(AuxOperator {
                    name: (*name).to_string(),
                    operator: finish(op)?,
                })
            })
            .collect::<ChemResult<Vec<_>>>()?;

        info!(
            mapping = %self.mapping,
            qubits = operator.num_qubits(),
            terms = operator.num_terms(),
            energy_shift = integrals.energy_shift,
            "qubit Hamiltonian built"
        );

        Ok(QubitHamiltonian {
            operator,
            aux_operators,
            energy_shift: integrals.energy_shift,
            nuclear_repulsion: es.nuclear_repulsion,
            num_particles,
            num_spin_orbitals,
            mapping: self.mapping,
            two_qubit_reduction: self.reduces_qubits(),
            hf_energy: es.hf_energy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spin_from_s_squared() {
        assert_eq!(spin_from_s_squared(0.0), (0.0, 1.0));
        let (s, mult) = spin_from_s_squared(0.75);
        assert_relative_eq!(s, 0.5, epsilon = 1e-12);
        assert_relative_eq!(mult, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reduction_only_with_parity() {
        assert!(QubitHamiltonianBuilder::default().reduces_qubits());
        assert!(!QubitHamiltonianBuilder::new(QubitMapping::JordanWigner).reduces_qubits());
        assert!(
            !QubitHamiltonianBuilder::new(QubitMapping::Parity)
                .two_qubit_reduction(false)
                .reduces_qubits()
        );
    }
}
