//! Nelder-Mead downhill simplex.

use serde::{Deserialize, Serialize};

use super::{Bounds, Counted, OptimizationResult, Optimizer, argmin};
use crate::error::AlgoResult;

/// Downhill simplex with the standard coefficients: reflection 1,
/// expansion 2, contraction 1/2, shrink 1/2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMead {
    /// Iteration cap.
    pub maxiter: usize,
    /// Maximum number of objective evaluations.
    pub maxfev: usize,
    /// Convergence tolerance on the spread of simplex values.
    pub tol: f64,
    /// Edge length of the initial simplex.
    pub initial_step: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            maxiter: 1000,
            maxfev: 5000,
            tol: 1e-8,
            initial_step: 0.5,
        }
    }
}

impl NelderMead {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Stop once best and worst vertex values are closer than `tol`.
    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }
}

/// A simplex vertex and its objective value.
#[derive(Debug, Clone)]
struct Vertex {
    x: Vec<f64>,
    f: f64,
}

/// `c + t (c - w)`, projected into the box.
fn toward(centroid: &[f64], worst: &[f64], t: f64, bounds: &Bounds) -> Vec<f64> {
    let mut point: Vec<f64> = centroid
        .iter()
        .zip(worst)
        .map(|(c, w)| c + t * (c - w))
        .collect();
    bounds.project(&mut point);
    point
}

impl Optimizer for NelderMead {
    fn minimize<F>(
        &self,
        objective: F,
        initial_params: Vec<f64>,
        bounds: Option<&[(f64, f64)]>,
    ) -> AlgoResult<OptimizationResult>
    where
        F: FnMut(&[f64]) -> AlgoResult<f64>,
    {
        let dim = initial_params.len();
        let bounds = Bounds::new(dim, bounds)?;
        let mut objective = Counted::new(objective);

        let start = bounds.projected(&initial_params);
        let f_start = objective.eval(&start)?;
        let mut history = vec![f_start];

        // One step along each axis, flipped when it would leave the box.
        let mut simplex = Vec::with_capacity(dim + 1);
        for axis in 0..dim {
            let mut x = start.clone();
            x[axis] += self.initial_step;
            if x[axis] > bounds.upper(axis) {
                x[axis] = start[axis] - self.initial_step;
            }
            bounds.project(&mut x);
            let f = objective.eval(&x)?;
            simplex.push(Vertex { x, f });
        }
        simplex.push(Vertex { x: start, f: f_start });

        let mut converged = dim == 0;
        let mut iterations = 0;
        while !converged && iterations < self.maxiter && objective.evaluations() < self.maxfev {
            iterations += 1;
            simplex.sort_by(|a, b| a.f.total_cmp(&b.f));
            let (best, second_worst, worst) = (simplex[0].f, simplex[dim - 1].f, simplex[dim].f);
            if worst - best < self.tol {
                converged = true;
                break;
            }

            let mut centroid = vec![0.0; dim];
            for vertex in &simplex[..dim] {
                for (c, v) in centroid.iter_mut().zip(&vertex.x) {
                    *c += v / dim as f64;
                }
            }

            let reflected = toward(&centroid, &simplex[dim].x, 1.0, &bounds);
            let f_reflected = objective.eval(&reflected)?;
            let replacement = if f_reflected < best {
                let expanded = toward(&centroid, &simplex[dim].x, 2.0, &bounds);
                let f_expanded = objective.eval(&expanded)?;
                Some(if f_expanded < f_reflected {
                    Vertex { x: expanded, f: f_expanded }
                } else {
                    Vertex { x: reflected, f: f_reflected }
                })
            } else if f_reflected < second_worst {
                Some(Vertex { x: reflected, f: f_reflected })
            } else {
                let contracted = toward(&centroid, &simplex[dim].x, -0.5, &bounds);
                let f_contracted = objective.eval(&contracted)?;
                (f_contracted < worst).then_some(Vertex { x: contracted, f: f_contracted })
            };

            match replacement {
                Some(vertex) => simplex[dim] = vertex,
                None => {
                    // shrink onto the best vertex
                    let anchor = simplex[0].x.clone();
                    for vertex in &mut simplex[1..] {
                        for (v, a) in vertex.x.iter_mut().zip(&anchor) {
                            *v = 0.5 * (*v + a);
                        }
                        vertex.f = objective.eval(&vertex.x)?;
                    }
                }
            }

            let values: Vec<f64> = simplex.iter().map(|v| v.f).collect();
            let current = values[argmin(&values)];
            if history.last().is_some_and(|&last| current < last) {
                history.push(current);
            }
        }

        let values: Vec<f64> = simplex.iter().map(|v| v.f).collect();
        let Vertex { x, f } = simplex.swap_remove(argmin(&values));
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
    fn test_quadratic() {
        let result = NelderMead::new().minimize(quadratic, vec![0.0, 0.0], None).unwrap();
        assert!(result.converged);
        assert!(result.optimal_value < 1e-6);
        assert!((result.optimal_params[0] - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_rosenbrock() {
        let result = NelderMead::new()
            .with_maxiter(5000)
            .minimize(rosenbrock, vec![0.0, 0.0], None)
            .unwrap();
        assert!(result.optimal_value < 1e-3);
    }

    #[test]
    fn test_stays_in_bounds() {
        let bounds = [(-0.5, 0.5), (-0.5, 0.5)];
        let result = NelderMead::new()
            .minimize(quadratic, vec![0.4, 0.4], Some(&bounds))
            .unwrap();
        assert!(result.optimal_params.iter().all(|x| x.abs() <= 0.5));
        assert!(result.history.windows(2).all(|w| w[1] < w[0]));
    }
}
