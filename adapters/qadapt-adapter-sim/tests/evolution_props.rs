//! Property tests: exact evolution against its gate decomposition.

use num_complex::Complex64;
use proptest::prelude::*;
use qadapt_adapter_sim::StatevectorSimulator;
use qadapt_ir::{Circuit, PauliString, QubitId, SparsePauliOp};

const WIDTH: usize = 3;

fn pauli_strategy() -> impl Strategy<Value = PauliString> {
    (0u64..(1 << WIDTH), 0u64..(1 << WIDTH))
        .prop_map(|(x, z)| PauliString::from_masks(WIDTH, x, z).unwrap())
}

fn generator_strategy() -> impl Strategy<Value = SparsePauliOp> {
    prop::collection::vec((pauli_strategy(), -1.0f64..1.0), 1..5).prop_map(|terms| {
        SparsePauliOp::from_terms(
            WIDTH,
            terms.into_iter().map(|(p, c)| (p, Complex64::new(c, 0.0))),
        )
        .unwrap()
    })
}

fn prepared(generator: &SparsePauliOp, time: f64) -> Circuit {
    let mut circuit = Circuit::with_size("evolution", WIDTH);
    circuit.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(2)).unwrap();
    circuit.ry(0.3, QubitId(1)).unwrap();
    circuit.evolve(generator, time, 2).unwrap();
    circuit
}

proptest! {
    #[test]
    fn evolution_preserves_norm(generator in generator_strategy(), time in -2.0f64..2.0) {
        let state = StatevectorSimulator::new().run(&prepared(&generator, time)).unwrap();
        prop_assert!((state.norm_sqr() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn decomposition_matches_exact(generator in generator_strategy(), time in -2.0f64..2.0) {
        let sim = StatevectorSimulator::new();
        let circuit = prepared(&generator, time);
        let exact = sim.run(&circuit).unwrap();
        let lowered = sim.run(&circuit.decompose().unwrap()).unwrap();
        let overlap = exact.inner(&lowered).unwrap().norm();
        prop_assert!((overlap - 1.0).abs() < 1e-9);
    }
}
