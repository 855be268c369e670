//! Expectation-value estimation for parameterised circuits.

use qadapt_adapter_sim::StatevectorSimulator;
use qadapt_ir::{Circuit, SparsePauliOp};

use crate::error::AlgoResult;

/// Evaluates observables on the state prepared by a parameterised circuit.
pub trait Estimator {
    /// Widest circuit the estimator accepts.
    fn max_qubits(&self) -> usize;

    /// Bind `params` into `circuit` and return `⟨O_k⟩` for every observable,
    /// all from a single state preparation.
    fn estimate(
        &self,
        circuit: &Circuit,
        params: &[f64],
        observables: &[&SparsePauliOp],
    ) -> AlgoResult<Vec<f64>>;

    /// Single-observable convenience wrapper.
    fn expectation(
        &self,
        circuit: &Circuit,
        params: &[f64],
        observable: &SparsePauliOp,
    ) -> AlgoResult<f64> {
        Ok(self
            .estimate(circuit, params, &[observable])?
            .first()
            .copied()
            .unwrap_or_default())
    }
}

impl Estimator for StatevectorSimulator {
    fn max_qubits(&self) -> usize {
        StatevectorSimulator::max_qubits(self)
    }

    fn estimate(
        &self,
        circuit: &Circuit,
        params: &[f64],
        observables: &[&SparsePauliOp],
    ) -> AlgoResult<Vec<f64>> {
        let bound = circuit.bind_parameters(params)?;
        let state = self.run(&bound)?;
        observables
            .iter()
            .map(|op| Ok(state.expectation(op)?))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use qadapt_ir::{ParameterExpression, QubitId};

    #[test]
    fn test_estimates_share_one_state() {
        let mut circuit = Circuit::with_size("ry", 1);
        circuit.ry(ParameterExpression::parameter(0), QubitId(0)).unwrap();
        let z = SparsePauliOp::from_labels(&[("Z", Complex64::new(1.0, 0.0))]).unwrap();
        let x = SparsePauliOp::from_labels(&[("X", Complex64::new(1.0, 0.0))]).unwrap();

        let sim = StatevectorSimulator::new();
        let values = sim
            .estimate(&circuit, &[std::f64::consts::FRAC_PI_2], &[&z, &x])
            .unwrap();
        assert!(values[0].abs() < 1e-12);
        assert!((values[1] - 1.0).abs() < 1e-12);
        assert_eq!(Estimator::max_qubits(&sim), 24);
    }

    #[test]
    fn test_width_mismatch_propagates() {
        let circuit = Circuit::with_size("two", 2);
        let z = SparsePauliOp::from_labels(&[("Z", Complex64::new(1.0, 0.0))]).unwrap();
        let sim = StatevectorSimulator::new();
        assert!(sim.expectation(&circuit, &[], &z).is_err());
    }
}
