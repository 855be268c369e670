//! Property tests for the classical optimizers on separable quadratics.

use proptest::prelude::*;
use qadapt_algo::{AlgoResult, LBfgsB, Optimizer, OptimizerKind};

const BOX: (f64, f64) = (-0.5, 0.5);

/// Weights and centres of `Σ w_i (x_i - c_i)²`.
fn quadratic_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0.5f64..4.0, -1.0f64..1.0), 1..=4)
}

fn kind_strategy() -> impl Strategy<Value = OptimizerKind> {
    prop::sample::select(vec!["cobyla", "l_bfgs_b", "nelder_mead", "spsa"])
        .prop_map(|name| name.parse::<OptimizerKind>().unwrap().with_max_iterations(200))
}

fn objective(terms: &[(f64, f64)]) -> impl FnMut(&[f64]) -> AlgoResult<f64> + '_ {
    move |x: &[f64]| {
        Ok(terms
            .iter()
            .zip(x)
            .map(|((w, c), xi)| w * (xi - c).powi(2))
            .sum())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn lbfgsb_finds_clamped_centre(terms in quadratic_strategy()) {
        let bounds = vec![BOX; terms.len()];
        let result = LBfgsB::default()
            .minimize(objective(&terms), vec![0.0; terms.len()], Some(&bounds))
            .unwrap();
        for ((_, c), x) in terms.iter().zip(&result.optimal_params) {
            prop_assert!((x - c.clamp(BOX.0, BOX.1)).abs() < 1e-4);
        }
    }

    #[test]
    fn iterates_respect_bounds_and_repeat(kind in kind_strategy(), terms in quadratic_strategy()) {
        let bounds = vec![BOX; terms.len()];
        let mut seen_outside = false;
        let watched = |x: &[f64]| {
            seen_outside |= x.iter().any(|v| *v < BOX.0 || *v > BOX.1);
            objective(&terms)(x)
        };
        let first = kind.minimize(watched, vec![0.1; terms.len()], Some(&bounds)).unwrap();
        prop_assert!(!seen_outside);

        let second = kind
            .minimize(objective(&terms), vec![0.1; terms.len()], Some(&bounds))
            .unwrap();
        prop_assert_eq!(first.optimal_params, second.optimal_params);
        prop_assert_eq!(first.num_evaluations, second.num_evaluations);
        prop_assert!(first.optimal_value <= first.history[0] + 1e-12);
    }
}
