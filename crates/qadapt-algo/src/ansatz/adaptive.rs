//! Ansatz grown one hopping operator at a time.

use qadapt_chem::QubitHamiltonian;
use qadapt_ir::Circuit;

use super::{Excitation, ExcitationSpace, HoppingOperator, VariationalForm, evolution_circuit};
use crate::error::{AlgoError, AlgoResult};
use crate::initial_state::HartreeFock;

/// A UCC-style ansatz over a fixed operator pool whose circuit contains only
/// the operators selected so far.
///
/// Selected operators are stored as pool indices, so the same operator may
/// appear more than once. Each selection adds one parameter.
#[derive(Debug, Clone)]
pub struct AdaptiveAnsatz {
    num_qubits: usize,
    initial_state: Option<HartreeFock>,
    pool: Vec<HoppingOperator>,
    selected: Vec<usize>,
}

impl AdaptiveAnsatz {
    /// Empty ansatz whose pool is every UCCSD excitation of the Hamiltonian.
    pub fn new(hamiltonian: &QubitHamiltonian) -> AlgoResult<Self> {
        let space = ExcitationSpace::for_hamiltonian(hamiltonian);
        Self::with_pool(hamiltonian, &space.excitations(true))
    }

    /// Empty ansatz over a custom excitation pool.
    pub fn with_pool(hamiltonian: &QubitHamiltonian, excitations: &[Excitation]) -> AlgoResult<Self> {
        let space = ExcitationSpace::for_hamiltonian(hamiltonian);
        let pool = space.hopping_operators(excitations)?;
        if pool.is_empty() {
            return Err(AlgoError::EmptyPool);
        }
        Ok(Self {
            num_qubits: hamiltonian.num_qubits(),
            initial_state: Some(HartreeFock::for_hamiltonian(hamiltonian)?),
            pool,
            selected: Vec::new(),
        })
    }

    /// Replace or remove the reference state.
    #[must_use]
    pub fn with_initial_state(mut self, initial_state: Option<HartreeFock>) -> Self {
        self.initial_state = initial_state;
        self
    }

    /// The operator pool.
    pub fn pool(&self) -> &[HoppingOperator] {
        &self.pool
    }

    /// Pool indices of the selected operators, in circuit order.
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// Excitations of the selected operators, in circuit order.
    pub fn selected_excitations(&self) -> Vec<Excitation> {
        self.selected
            .iter()
            .map(|&i| self.pool[i].excitation.clone())
            .collect()
    }

    /// Number of selected operators.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// True if nothing has been selected yet.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Append pool operator `index` to the circuit.
    pub fn push(&mut self, index: usize) -> AlgoResult<()> {
        if index >= self.pool.len() {
            return Err(AlgoError::PoolIndex {
                index,
                size: self.pool.len(),
            });
        }
        self.selected.push(index);
        Ok(())
    }

    /// Remove and return the most recently appended pool index.
    pub fn pop(&mut self) -> Option<usize> {
        self.selected.pop()
    }
}

impl VariationalForm for AdaptiveAnsatz {
    fn name(&self) -> &str {
        "adaptive_uccsd"
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn num_parameters(&self) -> usize {
        self.selected.len()
    }

    fn construct_circuit(&self) -> AlgoResult<Circuit> {
        evolution_circuit(
            "adaptive_uccsd",
            self.num_qubits,
            self.initial_state.as_ref(),
            self.selected.iter().map(|&i| &self.pool[i]),
            1,
        )
    }

    fn preferred_init_point(&self) -> Option<Vec<f64>> {
        Some(vec![0.0; self.selected.len()])
    }
}
