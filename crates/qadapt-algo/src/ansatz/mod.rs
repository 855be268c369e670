//! Variational forms.
//!
//! A variational form turns a parameter vector into a state-preparation
//! circuit. Circuits are built once with symbolic parameters `θ[k]` and bound
//! per evaluation.

mod adaptive;
mod excitations;
mod two_local;
mod uccsd;

pub use adaptive::AdaptiveAnsatz;
pub use excitations::{Excitation, ExcitationSpace, HoppingOperator};
pub use two_local::TwoLocal;
pub use uccsd::Uccsd;

use qadapt_ir::{Circuit, ParameterExpression};
use std::f64::consts::PI;

use crate::error::AlgoResult;
use crate::initial_state::HartreeFock;

/// A parameterised state-preparation circuit family.
pub trait VariationalForm {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Register width.
    fn num_qubits(&self) -> usize;

    /// Length of the parameter vector.
    fn num_parameters(&self) -> usize;

    /// Circuit with parameters `θ[0..num_parameters()]` left symbolic.
    fn construct_circuit(&self) -> AlgoResult<Circuit>;

    /// One `(lower, upper)` pair per parameter.
    fn parameter_bounds(&self) -> Vec<(f64, f64)> {
        vec![(-PI, PI); self.num_parameters()]
    }

    /// Starting point the form prefers, if any.
    fn preferred_init_point(&self) -> Option<Vec<f64>> {
        None
    }
}

/// Reference preparation followed by one evolution gate per generator.
pub(crate) fn evolution_circuit<'a>(
    name: &str,
    num_qubits: usize,
    initial_state: Option<&HartreeFock>,
    generators: impl Iterator<Item = &'a HoppingOperator>,
    reps: u32,
) -> AlgoResult<Circuit> {
    let mut circuit = Circuit::with_size(name, num_qubits);
    if let Some(hf) = initial_state {
        circuit.compose(&hf.circuit()?)?;
    }
    for (k, op) in generators.enumerate() {
        circuit.evolve(&op.generator, ParameterExpression::parameter(k), reps)?;
    }
    Ok(circuit)
}
