//! Hardware-efficient RY/CZ ansatz.

use qadapt_ir::{Circuit, ParameterExpression, QubitId};

use super::VariationalForm;
use crate::error::AlgoResult;
use crate::initial_state::HartreeFock;

/// Alternating layers of RY rotations and a linear CZ chain, with a final
/// rotation layer.
#[derive(Debug, Clone)]
pub struct TwoLocal {
    num_qubits: usize,
    reps: usize,
    initial_state: Option<HartreeFock>,
}

impl TwoLocal {
    /// `reps` entangling layers on `num_qubits` qubits.
    pub fn new(num_qubits: usize, reps: usize) -> Self {
        Self {
            num_qubits,
            reps,
            initial_state: None,
        }
    }

    /// Prepend a reference state.
    #[must_use]
    pub fn with_initial_state(mut self, initial_state: HartreeFock) -> Self {
        self.initial_state = Some(initial_state);
        self
    }
}

impl VariationalForm for TwoLocal {
    fn name(&self) -> &str {
        "two_local"
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn num_parameters(&self) -> usize {
        self.num_qubits * (self.reps + 1)
    }

    fn construct_circuit(&self) -> AlgoResult<Circuit> {
        let mut circuit = Circuit::with_size("two_local", self.num_qubits);
        if let Some(hf) = &self.initial_state {
            circuit.compose(&hf.circuit()?)?;
        }
        let mut k = 0;
        for layer in 0..=self.reps {
            for q in 0..self.num_qubits {
                circuit.ry(ParameterExpression::parameter(k), QubitId::from(q))?;
                k += 1;
            }
            if layer < self.reps {
                for q in 1..self.num_qubits {
                    circuit.cz(QubitId::from(q - 1), QubitId::from(q))?;
                }
            }
        }
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qadapt_chem::QubitMapping;

    #[test]
    fn test_layout() {
        let form = TwoLocal::new(3, 2);
        let circuit = form.construct_circuit().unwrap();
        assert_eq!(form.num_parameters(), 9);
        assert_eq!(circuit.num_parameters(), 9);
        let counts = circuit.count_ops();
        assert_eq!(counts.get("ry"), Some(&9));
        assert_eq!(counts.get("cz"), Some(&4));
        assert_eq!(form.parameter_bounds().len(), 9);
        assert!(form.preferred_init_point().is_none());
    }

    #[test]
    fn test_reference_prepended() {
        let hf = HartreeFock::new(4, (1, 1), QubitMapping::Parity, true).unwrap();
        let form = TwoLocal::new(2, 1).with_initial_state(hf);
        let circuit = form.construct_circuit().unwrap();
        let counts = circuit.count_ops();
        assert_eq!(counts.get("x"), Some(&1));
        assert_eq!(counts.get("ry"), Some(&4));
        assert_eq!(circuit.instructions().next().unwrap().gate.name(), "x");
        assert_eq!(form.num_parameters(), 4);
    }
}
