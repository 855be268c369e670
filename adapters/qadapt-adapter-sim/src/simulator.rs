//! Simulator backend implementation.

use qadapt_ir::{Circuit, SparsePauliOp};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{instrument, trace};

use crate::error::{SimError, SimResult};
use crate::statevector::Statevector;

/// Default register width limit.
pub const DEFAULT_MAX_QUBITS: usize = 24;

/// Simulator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorOptions {
    /// Widest circuit accepted.
    pub max_qubits: usize,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
        }
    }
}

/// Local statevector simulator.
///
/// Executes fully bound circuits exactly; memory grows as `2^n`.
#[derive(Debug, Clone, Default)]
pub struct StatevectorSimulator {
    options: SimulatorOptions,
}

impl StatevectorSimulator {
    /// Create a new simulator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: usize) -> Self {
        Self {
            options: SimulatorOptions { max_qubits },
        }
    }

    /// Create a simulator from options.
    pub fn with_options(options: SimulatorOptions) -> Self {
        Self { options }
    }

    /// Widest circuit accepted.
    pub fn max_qubits(&self) -> usize {
        self.options.max_qubits
    }

    /// Run a bound circuit from `|0…0⟩` and return the final state.
    #[instrument(level = "trace", skip(self, circuit), fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &Circuit) -> SimResult<Statevector> {
        let num_qubits = circuit.num_qubits();
        if num_qubits > self.options.max_qubits {
            return Err(SimError::TooManyQubits {
                requested: num_qubits,
                max: self.options.max_qubits,
            });
        }
        let start = Instant::now();
        let mut sv = Statevector::new(num_qubits);
        for inst in circuit.instructions() {
            sv.apply(inst)?;
        }
        trace!(num_qubits, elapsed = ?start.elapsed(), "circuit simulated");
        Ok(sv)
    }

    /// Bind `params`, run, and return `⟨ψ(θ)|O|ψ(θ)⟩`.
    pub fn expectation(
        &self,
        circuit: &Circuit,
        params: &[f64],
        observable: &SparsePauliOp,
    ) -> SimResult<f64> {
        let bound = circuit.bind_parameters(params)?;
        self.run(&bound)?.expectation(observable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use qadapt_ir::{ParameterExpression, QubitId};

    #[test]
    fn test_simulator_bell_state() {
        let mut circuit = Circuit::with_size("bell", 2);
        circuit.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        let sv = StatevectorSimulator::new().run(&circuit).unwrap();
        let probs = sv.probabilities();
        assert!((probs[0] - 0.5).abs() < 1e-12);
        assert!((probs[3] - 0.5).abs() < 1e-12);
        assert!(probs[1].abs() < 1e-12);
    }

    #[test]
    fn test_simulator_too_many_qubits() {
        let backend = StatevectorSimulator::with_max_qubits(5);
        let circuit = Circuit::with_size("wide", 10);
        assert!(matches!(
            backend.run(&circuit),
            Err(SimError::TooManyQubits {
                requested: 10,
                max: 5
            })
        ));
    }

    #[test]
    fn test_parameterised_expectation() {
        let mut circuit = Circuit::with_size("ry", 1);
        circuit.ry(ParameterExpression::parameter(0), QubitId(0)).unwrap();
        let z = SparsePauliOp::from_labels(&[("Z", Complex64::new(1.0, 0.0))]).unwrap();
        let sim = StatevectorSimulator::new();
        let value = sim.expectation(&circuit, &[std::f64::consts::FRAC_PI_3], &z).unwrap();
        assert!((value - 0.5).abs() < 1e-12);
        assert!(matches!(
            sim.expectation(&circuit, &[], &z),
            Err(SimError::Ir(_))
        ));
    }
}
