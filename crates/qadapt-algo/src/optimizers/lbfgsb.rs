//! Limited-memory BFGS with box bounds.
//!
//! Gradients are taken by central differences. Search directions come from
//! the two-loop recursion over the last `memory` curvature pairs; variables
//! pinned at a bound with the gradient pushing outward are held fixed, and
//! each step is projected back into the box before an Armijo backtracking
//! test.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::trace;

use super::{Bounds, Counted, OptimizationResult, Optimizer, dot};
use crate::error::AlgoResult;

const ARMIJO_C1: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 40;

/// L-BFGS-B optimizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LBfgsB {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Maximum number of objective evaluations, gradients included.
    pub maxfun: usize,
    /// Curvature pairs kept.
    pub memory: usize,
    /// Relative reduction factor, in units of machine epsilon.
    pub factr: f64,
    /// Projected-gradient tolerance.
    pub pgtol: f64,
    /// Finite-difference step.
    pub epsilon: f64,
}

impl Default for LBfgsB {
    fn default() -> Self {
        Self {
            maxiter: 15000,
            maxfun: 15000,
            memory: 10,
            factr: 10.0,
            pgtol: 1e-5,
            epsilon: 1e-6,
        }
    }
}

impl LBfgsB {
    /// Create a new L-BFGS-B optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    #[must_use]
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the projected-gradient tolerance.
    #[must_use]
    pub fn with_pgtol(mut self, pgtol: f64) -> Self {
        self.pgtol = pgtol;
        self
    }

    fn gradient<F>(
        &self,
        objective: &mut Counted<F>,
        x: &[f64],
        bounds: &Bounds,
    ) -> AlgoResult<Vec<f64>>
    where
        F: FnMut(&[f64]) -> AlgoResult<f64>,
    {
        let mut g = vec![0.0; x.len()];
        let mut shifted = x.to_vec();
        for i in 0..x.len() {
            let hi = (x[i] + self.epsilon).min(bounds.upper(i));
            let lo = (x[i] - self.epsilon).max(bounds.lower(i));
            shifted[i] = hi;
            let f_hi = objective.eval(&shifted)?;
            shifted[i] = lo;
            let f_lo = objective.eval(&shifted)?;
            shifted[i] = x[i];
            g[i] = if hi > lo { (f_hi - f_lo) / (hi - lo) } else { 0.0 };
        }
        Ok(g)
    }
}

/// Gradient with components that would push a pinned variable out of the box zeroed.
fn projected_gradient(x: &[f64], g: &[f64], bounds: &Bounds) -> Vec<f64> {
    x.iter()
        .zip(g)
        .enumerate()
        .map(|(i, (&xi, &gi))| {
            let at_lower = xi <= bounds.lower(i) && gi > 0.0;
            let at_upper = xi >= bounds.upper(i) && gi < 0.0;
            if at_lower || at_upper { 0.0 } else { gi }
        })
        .collect()
}

/// `-H·g` from the stored pairs.
fn two_loop(g: &[f64], pairs: &VecDeque<(Vec<f64>, Vec<f64>)>) -> Vec<f64> {
    let mut q = g.to_vec();
    let mut alphas = Vec::with_capacity(pairs.len());
    for (s, y) in pairs.iter().rev() {
        let rho = 1.0 / dot(y, s);
        let alpha = rho * dot(s, &q);
        for (qi, yi) in q.iter_mut().zip(y) {
            *qi -= alpha * yi;
        }
        alphas.push((rho, alpha));
    }
    if let Some((s, y)) = pairs.back() {
        let gamma = dot(s, y) / dot(y, y);
        for qi in &mut q {
            *qi *= gamma;
        }
    }
    for ((s, y), (rho, alpha)) in pairs.iter().zip(alphas.iter().rev()) {
        let beta = rho * dot(y, &q);
        for (qi, si) in q.iter_mut().zip(s) {
            *qi += (alpha - beta) * si;
        }
    }
    q.iter().map(|v| -v).collect()
}

impl Optimizer for LBfgsB {
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
        let ftol = self.factr * f64::EPSILON;

        let mut x = bounds.projected(&initial_params);
        let mut f = objective.eval(&x)?;
        let mut history = vec![f];
        let mut g = self.gradient(&mut objective, &x, &bounds)?;
        let mut pairs: VecDeque<(Vec<f64>, Vec<f64>)> = VecDeque::with_capacity(self.memory);
        let mut converged = n == 0;
        let mut iterations = 0;

        while !converged && iterations < self.maxiter && objective.evaluations() < self.maxfun {
            let pg = projected_gradient(&x, &g, &bounds);
            let pg_norm = pg.iter().fold(0.0f64, |m, v| m.max(v.abs()));
            if pg_norm <= self.pgtol {
                converged = true;
                break;
            }
            iterations += 1;

            let mut d = two_loop(&pg, &pairs);
            for (i, di) in d.iter_mut().enumerate() {
                if pg[i] == 0.0 && g[i] != 0.0 {
                    *di = 0.0;
                }
            }
            if dot(&d, &pg) >= 0.0 {
                d = pg.iter().map(|v| -v).collect();
                pairs.clear();
            }

            let d_norm = dot(&d, &d).sqrt();
            let mut step = if pairs.is_empty() { (1.0 / d_norm).min(1.0) } else { 1.0 };
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let mut trial: Vec<f64> = x.iter().zip(&d).map(|(xi, di)| xi + step * di).collect();
                bounds.project(&mut trial);
                let f_trial = objective.eval(&trial)?;
                let decrease: f64 = g.iter().zip(trial.iter().zip(&x)).map(|(gi, (t, xi))| gi * (t - xi)).sum();
                if f_trial <= f + ARMIJO_C1 * decrease {
                    accepted = Some((trial, f_trial));
                    break;
                }
                step *= 0.5;
            }
            let Some((x_new, f_new)) = accepted else {
                trace!(iterations, f, "line search failed to find a decrease");
                break;
            };

            let g_new = self.gradient(&mut objective, &x_new, &bounds)?;
            let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = g_new.iter().zip(&g).map(|(a, b)| a - b).collect();
            if dot(&s, &y) > f64::EPSILON * dot(&y, &y) {
                if pairs.len() == self.memory {
                    pairs.pop_front();
                }
                pairs.push_back((s, y));
            }

            let reduction = (f - f_new) / f.abs().max(f_new.abs()).max(1.0);
            trace!(iterations, f = f_new, step, "l-bfgs-b step");
            x = x_new;
            g = g_new;
            if f_new < f {
                history.push(f_new);
            }
            f = f_new;
            if reduction <= ftol {
                converged = true;
            }
        }

        Ok(OptimizationResult {
            optimal_params: x,
            optimal_value: f,
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
    fn test_lbfgsb_quadratic() {
        let result = LBfgsB::new().minimize(quadratic, vec![0.0, 0.0], None).unwrap();
        assert!(result.converged);
        assert!(result.optimal_value < 1e-10);
        assert!((result.optimal_params[0] - 1.0).abs() < 1e-5);
        assert!((result.optimal_params[1] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_lbfgsb_rosenbrock() {
        let result = LBfgsB::new().minimize(rosenbrock, vec![-1.2, 1.0], None).unwrap();
        assert!(result.optimal_value < 1e-6);
        assert!((result.optimal_params[0] - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_lbfgsb_active_bound() {
        // Unconstrained minimum (1, 2) lies outside the box
        let bounds = [(-1.0, 0.5), (-1.0, 3.0)];
        let result = LBfgsB::new()
            .minimize(quadratic, vec![0.0, 0.0], Some(&bounds))
            .unwrap();
        assert!((result.optimal_params[0] - 0.5).abs() < 1e-8);
        assert!((result.optimal_params[1] - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_lbfgsb_deterministic() {
        let a = LBfgsB::new().minimize(rosenbrock, vec![0.3, 0.1], None).unwrap();
        let b = LBfgsB::new().minimize(rosenbrock, vec![0.3, 0.1], None).unwrap();
        assert_eq!(a, b);
    }
}
