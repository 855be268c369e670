//! ADAPT-VQE.
//!
//! Grows an [`AdaptiveAnsatz`] one pool operator per iteration. Each
//! iteration measures the energy gradient of every pool operator appended to
//! the current circuit at zero angle, appends the operator with the largest
//! magnitude, and re-optimises all parameters starting from the previous
//! optimum with the new angle at zero.

use num_complex::Complex64;
use qadapt_chem::AuxOperator;
use qadapt_ir::SparsePauliOp;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::ansatz::{AdaptiveAnsatz, Excitation, VariationalForm};
use crate::error::{AlgoError, AlgoResult};
use crate::estimator::Estimator;
use crate::optimizers::OptimizerKind;
use crate::vqe::{Vqe, VqeResult};

/// Default gradient threshold below which the ansatz is considered complete.
pub const DEFAULT_THRESHOLD: f64 = 1e-5;

/// Default finite-difference step.
pub const DEFAULT_DELTA: f64 = 1.0;

/// How pool-operator gradients are measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientMethod {
    /// `(E(+δ) - E(-δ)) / 2δ` with the trial operator appended.
    #[default]
    FiniteDifference,
    /// `⟨ψ|i[G, H]|ψ⟩`, exact and needing one state preparation.
    Commutator,
}

/// Why the adaptive loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishingCriterion {
    /// Largest gradient fell below the threshold.
    ThresholdConverged,
    /// The selection history started repeating.
    Cyclicity,
    /// The iteration cap was reached.
    MaxIterations,
}

impl fmt::Display for FinishingCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ThresholdConverged => "Threshold converged",
            Self::Cyclicity => "Aborted due to cyclicity",
            Self::MaxIterations => "Maximum number of iterations reached",
        })
    }
}

/// Result of an ADAPT-VQE run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptResult {
    /// VQE result for the final ansatz.
    pub vqe: VqeResult,
    /// Number of gradient rounds performed.
    pub iterations: usize,
    /// Largest gradient magnitude of the last round.
    pub final_max_gradient: f64,
    /// Largest gradient magnitude of every round.
    pub gradient_history: Vec<f64>,
    /// Why the loop stopped.
    pub finishing_criterion: FinishingCriterion,
    /// Excitations in the final ansatz, in circuit order.
    pub selected: Vec<Excitation>,
}

/// ADAPT-VQE driver. Owns the ansatz it grows.
pub struct AdaptVqe<'a, E: Estimator> {
    operator: &'a SparsePauliOp,
    ansatz: AdaptiveAnsatz,
    optimizer: OptimizerKind,
    estimator: &'a E,
    threshold: f64,
    delta: f64,
    gradient_method: GradientMethod,
    max_iterations: Option<usize>,
    aux_operators: Vec<AuxOperator>,
}

impl<'a, E: Estimator> AdaptVqe<'a, E> {
    /// Create a driver with threshold `1e-5` and delta `1.0`.
    pub fn new(
        operator: &'a SparsePauliOp,
        ansatz: AdaptiveAnsatz,
        optimizer: OptimizerKind,
        estimator: &'a E,
    ) -> AlgoResult<Self> {
        if operator.num_qubits() != ansatz.num_qubits() {
            return Err(AlgoError::WidthMismatch {
                operator: operator.num_qubits(),
                ansatz: ansatz.num_qubits(),
            });
        }
        Ok(Self {
            operator,
            ansatz,
            optimizer,
            estimator,
            threshold: DEFAULT_THRESHOLD,
            delta: DEFAULT_DELTA,
            gradient_method: GradientMethod::default(),
            max_iterations: None,
            aux_operators: Vec::new(),
        })
    }

    /// Set the gradient threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the finite-difference step.
    #[must_use]
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Choose how gradients are measured.
    #[must_use]
    pub fn with_gradient_method(mut self, method: GradientMethod) -> Self {
        self.gradient_method = method;
        self
    }

    /// Cap the number of gradient rounds.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Operators evaluated on the final state.
    #[must_use]
    pub fn with_aux_operators(mut self, aux_operators: Vec<AuxOperator>) -> Self {
        self.aux_operators = aux_operators;
        self
    }

    /// The ansatz in its current state.
    pub fn ansatz(&self) -> &AdaptiveAnsatz {
        &self.ansatz
    }

    /// Give back the grown ansatz.
    pub fn into_ansatz(self) -> AdaptiveAnsatz {
        self.ansatz
    }

    fn vqe(&self, theta: &[f64]) -> AlgoResult<VqeResult> {
        Vqe::new(self.operator, &self.ansatz, self.optimizer.clone(), self.estimator)?
            .with_initial_point(theta.to_vec())?
            .with_aux_operators(self.aux_operators.clone())
            .run()
    }

    /// Signed `∂E/∂θ` at zero for each pool operator appended to the
    /// current ansatz at parameters `theta`.
    pub fn gradients(&mut self, theta: &[f64]) -> AlgoResult<Vec<f64>> {
        match self.gradient_method {
            GradientMethod::FiniteDifference => self.finite_difference_gradients(theta),
            GradientMethod::Commutator => self.commutator_gradients(theta),
        }
    }

    fn finite_difference_gradients(&mut self, theta: &[f64]) -> AlgoResult<Vec<f64>> {
        let mut gradients = Vec::with_capacity(self.ansatz.pool().len());
        let mut point = theta.to_vec();
        point.push(0.0);
        let last = theta.len();
        for index in 0..self.ansatz.pool().len() {
            self.ansatz.push(index)?;
            let evaluated = self.ansatz.construct_circuit().and_then(|circuit| {
                point[last] = self.delta;
                let plus = self.estimator.expectation(&circuit, &point, self.operator)?;
                point[last] = -self.delta;
                let minus = self.estimator.expectation(&circuit, &point, self.operator)?;
                Ok((plus - minus) / (2.0 * self.delta))
            });
            self.ansatz.pop();
            let gradient = evaluated?;
            debug!(
                index,
                excitation = %self.ansatz.pool()[index].excitation,
                gradient,
                "pool gradient"
            );
            gradients.push(gradient);
        }
        Ok(gradients)
    }

    fn commutator_gradients(&self, theta: &[f64]) -> AlgoResult<Vec<f64>> {
        let i = Complex64::new(0.0, 1.0);
        let observables = self
            .ansatz
            .pool()
            .iter()
            .map(|op| Ok(op.generator.commutator(self.operator)?.scale(i)))
            .collect::<AlgoResult<Vec<SparsePauliOp>>>()?;
        let refs: Vec<&SparsePauliOp> = observables.iter().collect();
        let circuit = self.ansatz.construct_circuit()?;
        let gradients = self.estimator.estimate(&circuit, theta, &refs)?;
        for (index, gradient) in gradients.iter().enumerate() {
            debug!(
                index,
                excitation = %self.ansatz.pool()[index].excitation,
                gradient,
                "pool gradient"
            );
        }
        Ok(gradients)
    }

    /// Run the adaptive loop to completion.
    pub fn run(&mut self) -> AlgoResult<AdaptResult> {
        let mut theta: Vec<f64> = self.ansatz.preferred_init_point().unwrap_or_default();
        let mut history: Vec<usize> = Vec::new();
        let mut gradient_history = Vec::new();
        let mut last: Option<VqeResult> = None;
        let mut iterations = 0;
        let mut max_gradient = 0.0;

        // Operators already present in the ansatz need their angles optimised
        if !self.ansatz.is_empty() {
            let result = self.vqe(&theta)?;
            theta.clone_from(&result.optimal_params);
            last = Some(result);
        }

        let criterion = loop {
            if self.max_iterations.is_some_and(|max| iterations >= max) {
                break FinishingCriterion::MaxIterations;
            }
            iterations += 1;
            info!(iteration = iterations, operators = self.ansatz.len(), "ADAPT iteration");

            let gradients = self.gradients(&theta)?;
            // First operator wins ties
            let (index, gradient) = gradients
                .iter()
                .copied()
                .enumerate()
                .fold(None, |best: Option<(usize, f64)>, (i, g)| match best {
                    Some((_, b)) if b.abs() >= g.abs() => best,
                    _ => Some((i, g)),
                })
                .ok_or(AlgoError::EmptyPool)?;
            max_gradient = gradient.abs();
            gradient_history.push(max_gradient);
            history.push(index);
            info!(
                index,
                excitation = %self.ansatz.pool()[index].excitation,
                gradient = max_gradient,
                "largest pool gradient"
            );

            if max_gradient < self.threshold {
                break FinishingCriterion::ThresholdConverged;
            }
            if is_cyclic(&history) {
                break FinishingCriterion::Cyclicity;
            }

            self.ansatz.push(index)?;
            theta.push(0.0);
            let result = self.vqe(&theta)?;
            theta.clone_from(&result.optimal_params);
            info!(
                iteration = iterations,
                energy = result.eigenvalue,
                parameters = theta.len(),
                "ansatz re-optimised"
            );
            last = Some(result);
        };

        let vqe = match last {
            Some(result) => result,
            None => self.vqe(&theta)?,
        };
        info!(
            criterion = %criterion,
            iterations,
            energy = vqe.eigenvalue,
            operators = self.ansatz.len(),
            "ADAPT-VQE finished"
        );
        Ok(AdaptResult {
            vqe,
            iterations,
            final_max_gradient: max_gradient,
            gradient_history,
            finishing_criterion: criterion,
            selected: self.ansatz.selected_excitations(),
        })
    }
}

/// True if the selection history ends with the same index twice or contains
/// two adjacent copies of a block of at least two indices.
pub fn is_cyclic(indices: &[usize]) -> bool {
    let n = indices.len();
    if n >= 2 && indices[n - 1] == indices[n - 2] {
        return true;
    }
    (2..=n / 2).any(|len| {
        (0..=n - 2 * len).any(|start| indices[start..start + len] == indices[start + len..start + 2 * len])
    })
}
