//! VQE (Variational Quantum Eigensolver).
//!
//! VQE minimises `⟨ψ(θ)|H|ψ(θ)⟩` over the parameters of a variational form
//! with a classical optimizer, evaluating the energy on an [`Estimator`].

use qadapt_chem::AuxOperator;
use qadapt_ir::{Circuit, SparsePauliOp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::ansatz::VariationalForm;
use crate::error::{AlgoError, AlgoResult};
use crate::estimator::Estimator;
use crate::optimizers::{Optimizer, OptimizerKind};

/// Result of a VQE run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VqeResult {
    /// Minimum eigenvalue estimate of the qubit operator.
    pub eigenvalue: f64,
    /// Optimal parameters.
    pub optimal_params: Vec<f64>,
    /// Number of energy evaluations.
    pub evaluations: usize,
    /// Optimizer iterations.
    pub optimizer_iterations: usize,
    /// Energy after each optimizer improvement.
    pub history: Vec<f64>,
    /// Whether the optimizer met its stopping test.
    pub converged: bool,
    /// Gate counts of the ansatz circuit, evolution gates counted once each.
    pub op_counts: BTreeMap<String, usize>,
    /// Gate counts after lowering evolution gates to CX/Rz/basis changes.
    pub decomposed_op_counts: BTreeMap<String, usize>,
    /// `(name, ⟨O⟩)` for every auxiliary operator at the optimum.
    pub aux_values: Vec<(String, f64)>,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl VqeResult {
    /// Value of a named auxiliary operator.
    pub fn aux_value(&self, name: &str) -> Option<f64> {
        self.aux_values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

/// A configured VQE run over a borrowed operator, ansatz and estimator.
pub struct Vqe<'a, E: Estimator> {
    operator: &'a SparsePauliOp,
    var_form: &'a dyn VariationalForm,
    optimizer: OptimizerKind,
    estimator: &'a E,
    initial_point: Option<Vec<f64>>,
    aux_operators: Vec<AuxOperator>,
    seed: u64,
}

impl<'a, E: Estimator> Vqe<'a, E> {
    /// Create a VQE run. Fails if the operator and ansatz widths differ or
    /// the ansatz is wider than the estimator supports.
    pub fn new(
        operator: &'a SparsePauliOp,
        var_form: &'a dyn VariationalForm,
        optimizer: OptimizerKind,
        estimator: &'a E,
    ) -> AlgoResult<Self> {
        if operator.num_qubits() != var_form.num_qubits() {
            return Err(AlgoError::WidthMismatch {
                operator: operator.num_qubits(),
                ansatz: var_form.num_qubits(),
            });
        }
        if var_form.num_qubits() > estimator.max_qubits() {
            return Err(AlgoError::TooManyQubits {
                requested: var_form.num_qubits(),
                max: estimator.max_qubits(),
            });
        }
        Ok(Self {
            operator,
            var_form,
            optimizer,
            estimator,
            initial_point: None,
            aux_operators: Vec::new(),
            seed: 0,
        })
    }

    /// Start the optimizer from `point` instead of the ansatz preference.
    pub fn with_initial_point(mut self, point: Vec<f64>) -> AlgoResult<Self> {
        if point.len() != self.var_form.num_parameters() {
            return Err(AlgoError::DimensionMismatch {
                expected: self.var_form.num_parameters(),
                got: point.len(),
            });
        }
        self.initial_point = Some(point);
        Ok(self)
    }

    /// Operators evaluated at the optimum.
    #[must_use]
    pub fn with_aux_operators(mut self, aux_operators: Vec<AuxOperator>) -> Self {
        self.aux_operators = aux_operators;
        self
    }

    /// Seed for the random initial point used when the ansatz has no preference.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn initial_point(&self) -> Vec<f64> {
        if let Some(point) = self.initial_point.clone().or_else(|| self.var_form.preferred_init_point()) {
            return point;
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.var_form
            .parameter_bounds()
            .into_iter()
            .map(|(lo, hi)| {
                let lo = if lo.is_finite() { lo } else { -2.0 * std::f64::consts::PI };
                let hi = if hi.is_finite() { hi } else { 2.0 * std::f64::consts::PI };
                rng.gen_range(lo..=hi)
            })
            .collect()
    }

    /// Optimize and return the minimum energy found.
    pub fn run(&self) -> AlgoResult<VqeResult> {
        let start = Instant::now();
        let circuit: Circuit = self.var_form.construct_circuit()?;
        let num_params = self.var_form.num_parameters();
        if circuit.num_parameters() != num_params {
            return Err(AlgoError::DimensionMismatch {
                expected: num_params,
                got: circuit.num_parameters(),
            });
        }
        let bounds = self.var_form.parameter_bounds();
        let initial = self.initial_point();

        debug!(
            ansatz = self.var_form.name(),
            qubits = self.var_form.num_qubits(),
            parameters = num_params,
            optimizer = %self.optimizer,
            "starting VQE"
        );

        let objective = |params: &[f64]| self.estimator.expectation(&circuit, params, self.operator);
        let result = self.optimizer.minimize(objective, initial, Some(&bounds))?;
        if !result.converged {
            warn!(
                optimizer = %self.optimizer,
                iterations = result.num_iterations,
                "optimizer stopped before converging"
            );
        }

        let aux_ops: Vec<&SparsePauliOp> = self.aux_operators.iter().map(|a| &a.operator).collect();
        let aux_values = if aux_ops.is_empty() {
            Vec::new()
        } else {
            let values = self.estimator.estimate(&circuit, &result.optimal_params, &aux_ops)?;
            self.aux_operators
                .iter()
                .map(|a| a.name.clone())
                .zip(values)
                .collect()
        };

        let elapsed = start.elapsed();
        info!(
            ansatz = self.var_form.name(),
            energy = result.optimal_value,
            evaluations = result.num_evaluations,
            elapsed = ?elapsed,
            "VQE finished"
        );

        Ok(VqeResult {
            eigenvalue: result.optimal_value,
            optimal_params: result.optimal_params,
            evaluations: result.num_evaluations,
            optimizer_iterations: result.num_iterations,
            history: result.history,
            converged: result.converged,
            op_counts: circuit.count_ops(),
            decomposed_op_counts: circuit.decompose()?.count_ops(),
            aux_values,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansatz::TwoLocal;
    use num_complex::Complex64;
    use qadapt_adapter_sim::StatevectorSimulator;

    fn op(labels: &[(&str, f64)]) -> SparsePauliOp {
        let terms: Vec<_> = labels
            .iter()
            .map(|(l, c)| (*l, Complex64::new(*c, 0.0)))
            .collect();
        SparsePauliOp::from_labels(&terms).unwrap()
    }

    #[test]
    fn test_vqe_single_qubit() {
        // Ground state of X + Z has energy -√2
        let h = op(&[("X", 1.0), ("Z", 1.0)]);
        let form = TwoLocal::new(1, 0);
        let sim = StatevectorSimulator::new();
        let result = Vqe::new(&h, &form, OptimizerKind::default(), &sim)
            .unwrap()
            .with_initial_point(vec![0.1])
            .unwrap()
            .run()
            .unwrap();
        assert!((result.eigenvalue + std::f64::consts::SQRT_2).abs() < 1e-8);
        assert_eq!(result.op_counts.get("ry"), Some(&1));
    }

    #[test]
    fn test_vqe_aux_values() {
        let h = op(&[("Z", 1.0)]);
        let form = TwoLocal::new(1, 0);
        let sim = StatevectorSimulator::new();
        let aux = vec![AuxOperator {
            name: "z".to_string(),
            operator: h.clone(),
        }];
        let result = Vqe::new(&h, &form, OptimizerKind::default(), &sim)
            .unwrap()
            .with_initial_point(vec![1.0])
            .unwrap()
            .with_aux_operators(aux)
            .run()
            .unwrap();
        let z = result.aux_value("z").unwrap();
        assert!((z - result.eigenvalue).abs() < 1e-12);
        assert!(result.aux_value("missing").is_none());
    }

    #[test]
    fn test_vqe_rejects_mismatched_width() {
        let h = op(&[("ZZ", 1.0)]);
        let form = TwoLocal::new(1, 1);
        let sim = StatevectorSimulator::new();
        assert!(matches!(
            Vqe::new(&h, &form, OptimizerKind::default(), &sim),
            Err(AlgoError::WidthMismatch {
                operator: 2,
                ansatz: 1
            })
        ));
        let h1 = op(&[("Z", 1.0)]);
        let run = Vqe::new(&h1, &form, OptimizerKind::default(), &sim).unwrap();
        assert!(run.with_initial_point(vec![0.0]).is_err());
    }

    #[test]
    fn test_seeded_initial_point_is_reproducible() {
        let h = op(&[("ZZ", 1.0), ("XI", 0.5)]);
        let form = TwoLocal::new(2, 1);
        let sim = StatevectorSimulator::new();
        let run = |seed| {
            Vqe::new(&h, &form, OptimizerKind::default(), &sim)
                .unwrap()
                .with_seed(seed)
                .run()
                .unwrap()
        };
        let a = run(3);
        let b = run(3);
        assert_eq!(a.eigenvalue, b.eigenvalue);
        assert_eq!(a.optimal_params, b.optimal_params);
    }
}
