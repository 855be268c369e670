//! Classical optimizers for the variational loop.
//!
//! Every optimizer minimises a fallible objective `FnMut(&[f64]) -> AlgoResult<f64>`
//! from an initial point, optionally inside box bounds, and is deterministic
//! for identical inputs.

mod cobyla;
mod lbfgsb;
mod nelder_mead;
mod spsa;

pub use cobyla::Cobyla;
pub use lbfgsb::LBfgsB;
pub use nelder_mead::NelderMead;
pub use spsa::Spsa;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AlgoError, AlgoResult};

/// Result of an optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Optimal parameter values.
    pub optimal_params: Vec<f64>,
    /// Optimal objective value.
    pub optimal_value: f64,
    /// Number of function evaluations.
    pub num_evaluations: usize,
    /// Number of iterations.
    pub num_iterations: usize,
    /// Best objective value after each improvement.
    pub history: Vec<f64>,
    /// Whether the optimization converged.
    pub converged: bool,
}

/// A local minimiser.
pub trait Optimizer {
    /// Minimise `objective` starting at `initial_params`.
    ///
    /// When `bounds` is given it must have one `(lower, upper)` pair per
    /// parameter; iterates never leave the box.
    fn minimize<F>(
        &self,
        objective: F,
        initial_params: Vec<f64>,
        bounds: Option<&[(f64, f64)]>,
    ) -> AlgoResult<OptimizationResult>
    where
        F: FnMut(&[f64]) -> AlgoResult<f64>;
}

/// The optimizers selectable by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum OptimizerKind {
    /// Linear-model trust region, derivative free.
    Cobyla(Cobyla),
    /// Limited-memory quasi-Newton with box constraints.
    LBfgsB(LBfgsB),
    /// Downhill simplex.
    NelderMead(NelderMead),
    /// Simultaneous perturbation stochastic approximation.
    Spsa(Spsa),
}

impl Default for OptimizerKind {
    fn default() -> Self {
        Self::LBfgsB(LBfgsB::default())
    }
}

impl OptimizerKind {
    /// Canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cobyla(_) => "cobyla",
            Self::LBfgsB(_) => "l_bfgs_b",
            Self::NelderMead(_) => "nelder_mead",
            Self::Spsa(_) => "spsa",
        }
    }

    /// Cap the iteration count, keeping other settings.
    #[must_use]
    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        match self {
            Self::Cobyla(o) => Self::Cobyla(o.with_maxiter(max_iterations)),
            Self::LBfgsB(o) => Self::LBfgsB(o.with_maxiter(max_iterations)),
            Self::NelderMead(o) => Self::NelderMead(o.with_maxiter(max_iterations)),
            Self::Spsa(o) => Self::Spsa(o.with_maxiter(max_iterations)),
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = AlgoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "cobyla" => Ok(Self::Cobyla(Cobyla::default())),
            "l_bfgs_b" | "lbfgsb" | "lbfgs" => Ok(Self::LBfgsB(LBfgsB::default())),
            "nelder_mead" | "neldermead" => Ok(Self::NelderMead(NelderMead::default())),
            "spsa" => Ok(Self::Spsa(Spsa::default())),
            _ => Err(AlgoError::UnknownOptimizer(s.to_string())),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Optimizer for OptimizerKind {
    fn minimize<F>(
        &self,
        objective: F,
        initial_params: Vec<f64>,
        bounds: Option<&[(f64, f64)]>,
    ) -> AlgoResult<OptimizationResult>
    where
        F: FnMut(&[f64]) -> AlgoResult<f64>,
    {
        match self {
            Self::Cobyla(o) => o.minimize(objective, initial_params, bounds),
            Self::LBfgsB(o) => o.minimize(objective, initial_params, bounds),
            Self::NelderMead(o) => o.minimize(objective, initial_params, bounds),
            Self::Spsa(o) => o.minimize(objective, initial_params, bounds),
        }
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Objective wrapper that counts evaluations and rejects non-finite values.
pub(crate) struct Counted<F> {
    objective: F,
    evaluations: usize,
}

impl<F> Counted<F>
where
    F: FnMut(&[f64]) -> AlgoResult<f64>,
{
    pub(crate) fn new(objective: F) -> Self {
        Self {
            objective,
            evaluations: 0,
        }
    }

    pub(crate) fn eval(&mut self, x: &[f64]) -> AlgoResult<f64> {
        self.evaluations += 1;
        let value = (self.objective)(x)?;
        if !value.is_finite() {
            return Err(AlgoError::NonFiniteObjective(self.evaluations));
        }
        Ok(value)
    }

    pub(crate) fn evaluations(&self) -> usize {
        self.evaluations
    }
}

/// Validated box constraints; unbounded when absent.
#[derive(Debug, Clone)]
pub(crate) struct Bounds(Vec<(f64, f64)>);

impl Bounds {
    pub(crate) fn new(n: usize, bounds: Option<&[(f64, f64)]>) -> AlgoResult<Self> {
        let Some(bounds) = bounds else {
            return Ok(Self(vec![(f64::NEG_INFINITY, f64::INFINITY); n]));
        };
        if bounds.len() != n {
            return Err(AlgoError::DimensionMismatch {
                expected: n,
                got: bounds.len(),
            });
        }
        for (index, &(lower, upper)) in bounds.iter().enumerate() {
            if lower.is_nan() || upper.is_nan() || lower > upper {
                return Err(AlgoError::InvalidBounds {
                    index,
                    lower,
                    upper,
                });
            }
        }
        Ok(Self(bounds.to_vec()))
    }

    pub(crate) fn project(&self, x: &mut [f64]) {
        for (xi, &(lo, hi)) in x.iter_mut().zip(&self.0) {
            *xi = xi.clamp(lo, hi);
        }
    }

    pub(crate) fn projected(&self, x: &[f64]) -> Vec<f64> {
        let mut out = x.to_vec();
        self.project(&mut out);
        out
    }

    pub(crate) fn lower(&self, i: usize) -> f64 {
        self.0[i].0
    }

    pub(crate) fn upper(&self, i: usize) -> f64 {
        self.0[i].1
    }
}

pub(crate) fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Index of the smallest value; `values` must be non-empty.
pub(crate) fn argmin(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map_or(0, |(i, _)| i)
}

/// Index of the largest value; `values` must be non-empty.
pub(crate) fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map_or(0, |(i, _)| i)
}

#[cfg(test)]
pub(crate) mod test_functions {
    use crate::error::AlgoResult;

    pub fn quadratic(x: &[f64]) -> AlgoResult<f64> {
        Ok((x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2))
    }

    pub fn rosenbrock(x: &[f64]) -> AlgoResult<f64> {
        Ok((1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optimizer() {
        assert_eq!("L_BFGS_B".parse::<OptimizerKind>().unwrap().name(), "l_bfgs_b");
        assert_eq!("nelder-mead".parse::<OptimizerKind>().unwrap().name(), "nelder_mead");
        assert!(matches!(
            "adam".parse::<OptimizerKind>(),
            Err(AlgoError::UnknownOptimizer(_))
        ));
        assert_eq!(OptimizerKind::default().to_string(), "l_bfgs_b");
    }

    #[test]
    fn test_bounds_validation() {
        assert!(Bounds::new(2, Some(&[(0.0, 1.0)])).is_err());
        assert!(matches!(
            Bounds::new(1, Some(&[(1.0, 0.0)])),
            Err(AlgoError::InvalidBounds { index: 0, .. })
        ));
        let b = Bounds::new(2, Some(&[(0.0, 1.0), (-1.0, 1.0)])).unwrap();
        assert_eq!(b.projected(&[2.0, -3.0]), vec![1.0, -1.0]);
    }

    #[test]
    fn test_every_optimizer_respects_bounds() {
        let bounds = [(-0.5, 0.5), (-0.5, 0.5)];
        for name in ["cobyla", "l_bfgs_b", "nelder_mead", "spsa"] {
            let opt: OptimizerKind = name.parse().unwrap();
            let result = opt
                .minimize(test_functions::quadratic, vec![0.0, 0.0], Some(&bounds))
                .unwrap();
            assert!(
                result.optimal_params.iter().all(|p| p.abs() <= 0.5 + 1e-12),
                "{name} left the box: {:?}",
                result.optimal_params
            );
        }
    }

    #[test]
    fn test_non_finite_objective_is_an_error() {
        let opt = OptimizerKind::default();
        let result = opt.minimize(|_| Ok(f64::NAN), vec![0.0], None);
        assert!(matches!(result, Err(AlgoError::NonFiniteObjective(1))));
    }
}
