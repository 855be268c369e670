//! Unitary coupled-cluster singles and doubles.

use qadapt_chem::QubitHamiltonian;
use qadapt_ir::Circuit;
use tracing::debug;

use super::{Excitation, ExcitationSpace, HoppingOperator, VariationalForm, evolution_circuit};
use crate::error::{AlgoError, AlgoResult};
use crate::initial_state::HartreeFock;

/// Fixed UCCSD ansatz: the Hartree-Fock reference followed by
/// `exp(θ_k (T_k - T_k†))` for every single and double excitation.
#[derive(Debug, Clone)]
pub struct Uccsd {
    num_qubits: usize,
    initial_state: Option<HartreeFock>,
    operators: Vec<HoppingOperator>,
    reps: u32,
}

impl Uccsd {
    /// All singles and doubles of the Hamiltonian's active space, starting
    /// from its Hartree-Fock state.
    pub fn new(hamiltonian: &QubitHamiltonian) -> AlgoResult<Self> {
        let space = ExcitationSpace::for_hamiltonian(hamiltonian);
        Self::with_excitations(hamiltonian, &space.excitations(true))
    }

    /// A restricted excitation list.
    pub fn with_excitations(
        hamiltonian: &QubitHamiltonian,
        excitations: &[Excitation],
    ) -> AlgoResult<Self> {
        let space = ExcitationSpace::for_hamiltonian(hamiltonian);
        let operators = space.hopping_operators(excitations)?;
        if operators.is_empty() {
            return Err(AlgoError::EmptyPool);
        }
        debug!(excitations = operators.len(), "UCCSD ansatz built");
        Ok(Self {
            num_qubits: hamiltonian.num_qubits(),
            initial_state: Some(HartreeFock::for_hamiltonian(hamiltonian)?),
            operators,
            reps: 1,
        })
    }

    /// Replace or remove the reference state.
    #[must_use]
    pub fn with_initial_state(mut self, initial_state: Option<HartreeFock>) -> Self {
        self.initial_state = initial_state;
        self
    }

    /// Set the number of product-formula repetitions per excitation.
    #[must_use]
    pub fn with_reps(mut self, reps: u32) -> Self {
        self.reps = reps.max(1);
        self
    }

    /// The excitations, in parameter order.
    pub fn excitations(&self) -> impl Iterator<Item = &Excitation> + '_ {
        self.operators.iter().map(|op| &op.excitation)
    }

    /// The hopping operators, in parameter order.
    pub fn hopping_operators(&self) -> &[HoppingOperator] {
        &self.operators
    }
}

impl VariationalForm for Uccsd {
    fn name(&self) -> &str {
        "uccsd"
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn num_parameters(&self) -> usize {
        self.operators.len()
    }

    fn construct_circuit(&self) -> AlgoResult<Circuit> {
        evolution_circuit(
            "uccsd",
            self.num_qubits,
            self.initial_state.as_ref(),
            self.operators.iter(),
            self.reps,
        )
    }

    fn preferred_init_point(&self) -> Option<Vec<f64>> {
        Some(vec![0.0; self.operators.len()])
    }
}
