//! COBYLA (Constrained Optimization BY Linear Approximation) optimizer.
//!
//! This is a derivative-free optimization algorithm suitable for
//! variational quantum algorithms where gradients are expensive. A linear
//! model is interpolated through `n + 1` points and minimised inside a trust
//! region of radius `ρ`, which shrinks from `rhobeg` to `rhoend`. The only
//! constraints handled are box bounds.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Bounds, Counted, OptimizationResult, Optimizer, argmax, distance};
use crate::error::AlgoResult;

/// COBYLA optimizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cobyla {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Initial trust region radius.
    pub rhobeg: f64,
    /// Final trust region radius.
    pub rhoend: f64,
}

impl Default for Cobyla {
    fn default() -> Self {
        Self {
            maxiter: 1000,
            rhobeg: 1.0,
            rhoend: 1e-4,
        }
    }
}

impl Cobyla {
    /// Create a new COBYLA optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    #[must_use]
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set trust region parameters.
    #[must_use]
    pub fn with_trust_region(mut self, rhobeg: f64, rhoend: f64) -> Self {
        self.rhobeg = rhobeg;
        self.rhoend = rhoend;
        self
    }
}

/// Interpolation set around the current best point.
struct Simplex {
    base: Vec<f64>,
    f_base: f64,
    points: Vec<Vec<f64>>,
    values: Vec<f64>,
}

impl Simplex {
    /// Place one point `rho` along each axis, stepping inward at an upper bound.
    fn build<F>(
        base: Vec<f64>,
        f_base: f64,
        rho: f64,
        bounds: &Bounds,
        objective: &mut Counted<F>,
    ) -> AlgoResult<Self>
    where
        F: FnMut(&[f64]) -> AlgoResult<f64>,
    {
        let n = base.len();
        let mut points = Vec::with_capacity(n);
        let mut values = Vec::with_capacity(n);
        for i in 0..n {
            let mut p = base.clone();
            p[i] = if base[i] + rho <= bounds.upper(i) {
                base[i] + rho
            } else {
                (base[i] - rho).max(bounds.lower(i))
            };
            values.push(objective.eval(&p)?);
            points.push(p);
        }
        Ok(Self {
            base,
            f_base,
            points,
            values,
        })
    }

    /// Gradient of the linear interpolant, if the geometry is non-degenerate.
    fn model_gradient(&self) -> Option<Vec<f64>> {
        let n = self.base.len();
        let d = DMatrix::from_fn(n, n, |i, j| self.points[i][j] - self.base[j]);
        let rhs = DVector::from_fn(n, |i, _| self.values[i] - self.f_base);
        let g = d.lu().solve(&rhs)?;
        g.iter().all(|v| v.is_finite()).then(|| g.iter().copied().collect())
    }

    fn radius(&self) -> f64 {
        self.points
            .iter()
            .map(|p| distance(p, &self.base))
            .fold(0.0, f64::max)
    }
}

impl Optimizer for Cobyla {
    fn minimize<F>(
        &self,
        objective: F,
        initial_params: Vec<f64>,
        bounds: Option<&[(f64, f64)]>,
    ) -> AlgoResult<OptimizationResult>
    where
        F: FnMut(&[f64]) -> AlgoResult<f64>,
    {
        let n = initial_params.len();
        let bounds = Bounds::new(n, bounds)?;
        let mut objective = Counted::new(objective);
        let x0 = bounds.projected(&initial_params);
        let f0 = objective.eval(&x0)?;
        let mut history = vec![f0];

        if n == 0 {
            return Ok(OptimizationResult {
                optimal_params: x0,
                optimal_value: f0,
                num_evaluations: objective.evaluations(),
                num_iterations: 0,
                history,
                converged: true,
            });
        }

        let mut rho = self.rhobeg;
        let mut simplex = Simplex::build(x0, f0, rho, &bounds, &mut objective)?;
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.maxiter {
            iterations += 1;

            // A vertex better than the base becomes the new base
            let best = super::argmin(&simplex.values);
            if simplex.values[best] < simplex.f_base {
                std::mem::swap(&mut simplex.base, &mut simplex.points[best]);
                std::mem::swap(&mut simplex.f_base, &mut simplex.values[best]);
                history.push(simplex.f_base);
            }

            let step = simplex.model_gradient().and_then(|g| {
                let norm = g.iter().map(|v| v * v).sum::<f64>().sqrt();
                (norm > 1e-14).then(|| {
                    let mut trial: Vec<f64> = simplex
                        .base
                        .iter()
                        .zip(&g)
                        .map(|(x, gi)| x - rho * gi / norm)
                        .collect();
                    bounds.project(&mut trial);
                    trial
                })
            });

            let improved = match step {
                Some(trial) if distance(&trial, &simplex.base) > 1e-14 => {
                    let f_trial = objective.eval(&trial)?;
                    trace!(iteration = iterations, rho, f_trial, "cobyla trial");
                    if f_trial < simplex.f_base {
                        // Drop the vertex farthest from the new base
                        let far: Vec<f64> =
                            simplex.points.iter().map(|p| distance(p, &trial)).collect();
                        let k = argmax(&far);
                        simplex.points[k] = std::mem::replace(&mut simplex.base, trial);
                        simplex.values[k] = std::mem::replace(&mut simplex.f_base, f_trial);
                        history.push(simplex.f_base);
                        true
                    } else {
                        let worst = argmax(&simplex.values);
                        if f_trial < simplex.values[worst] {
                            simplex.points[worst] = trial;
                            simplex.values[worst] = f_trial;
                            true
                        } else {
                            false
                        }
                    }
                }
                _ => false,
            };

            if improved && simplex.radius() <= 3.0 * rho {
                continue;
            }
            if !improved {
                if rho <= self.rhoend {
                    converged = true;
                    break;
                }
                rho = (rho * 0.5).max(self.rhoend);
            }
            simplex = Simplex::build(
                simplex.base,
                simplex.f_base,
                rho,
                &bounds,
                &mut objective,
            )?;
        }

        Ok(OptimizationResult {
            optimal_params: simplex.base,
            optimal_value: simplex.f_base,
            num_evaluations: objective.evaluations(),
            num_iterations: iterations,
            history,
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizers::test_functions::{quadratic, rosenbrock};

    #[test]
    fn test_cobyla_simple() {
        let result = Cobyla::new().minimize(quadratic, vec![0.0, 0.0], None).unwrap();

        assert!(result.converged);
        assert!(result.optimal_value < 1e-6);
        assert!((result.optimal_params[0] - 1.0).abs() < 1e-3);
        assert!((result.optimal_params[1] - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_cobyla_rosenbrock() {
        let result = Cobyla::new()
            .with_maxiter(5000)
            .minimize(rosenbrock, vec![0.0, 0.0], None)
            .unwrap();

        // Rosenbrock is hard, just check we improved
        assert!(result.optimal_value < 0.5);
    }

    #[test]
    fn test_cobyla_history_is_monotone() {
        let result = Cobyla::new().minimize(quadratic, vec![3.0, -1.0], None).unwrap();
        assert!(result.history.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(result.history.last().copied(), Some(result.optimal_value));
    }
}
