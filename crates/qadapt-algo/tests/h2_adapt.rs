//! End-to-end eigensolver tests on H2 in STO-3G.

use approx::assert_relative_eq;
use qadapt_adapter_sim::StatevectorSimulator;
use qadapt_algo::{
    AdaptVqe, AdaptiveAnsatz, Excitation, ExactEigensolver, FinishingCriterion, GradientMethod,
    HartreeFock, OptimizerKind, Uccsd, VariationalForm, Vqe,
};
use qadapt_chem::{
    BasisSet, DistanceUnit, ElectronicStructureDriver, HartreeFockDriver, Molecule,
    QubitHamiltonian, QubitHamiltonianBuilder,
};

const H2_FCI_ELECTRONIC: f64 = -1.857_275;

fn h2() -> QubitHamiltonian {
    let mol = Molecule::from_geometry("H .0 .0 .0; H .0 .0 0.735", DistanceUnit::Angstrom, 0, 1)
        .unwrap();
    let es = HartreeFockDriver::new(mol, BasisSet::Sto3g).run().unwrap();
    QubitHamiltonianBuilder::default().build(&es).unwrap()
}

#[test]
fn test_uccsd_and_adapt_reach_fci() {
    let h = h2();
    let sim = StatevectorSimulator::new();

    let uccsd = Uccsd::new(&h).unwrap();
    let fixed = Vqe::new(&h.operator, &uccsd, OptimizerKind::default(), &sim)
        .unwrap()
        .run()
        .unwrap();

    let ansatz = AdaptiveAnsatz::new(&h).unwrap();
    let adaptive = AdaptVqe::new(&h.operator, ansatz, OptimizerKind::default(), &sim)
        .unwrap()
        .run()
        .unwrap();

    let e_fixed = h.electronic_energy(fixed.eigenvalue);
    let e_adapt = h.electronic_energy(adaptive.vqe.eigenvalue);
    assert_relative_eq!(e_fixed, H2_FCI_ELECTRONIC, epsilon = 1e-5);
    assert_relative_eq!(e_adapt, H2_FCI_ELECTRONIC, epsilon = 1e-5);
    assert_relative_eq!(e_fixed, e_adapt, epsilon = 1e-6);
}

#[test]
fn test_adapt_needs_fewer_evolution_gates() {
    let h = h2();
    let sim = StatevectorSimulator::new();

    let uccsd = Uccsd::new(&h).unwrap();
    let fixed = Vqe::new(&h.operator, &uccsd, OptimizerKind::default(), &sim)
        .unwrap()
        .run()
        .unwrap();
    let ansatz = AdaptiveAnsatz::new(&h).unwrap();
    let adaptive = AdaptVqe::new(&h.operator, ansatz, OptimizerKind::default(), &sim)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(fixed.op_counts.get("evolution"), Some(&3));
    assert_eq!(adaptive.vqe.op_counts.get("evolution"), Some(&1));
    assert_eq!(adaptive.selected, vec![Excitation::double(0, 1, 2, 3)]);
    assert_eq!(adaptive.finishing_criterion, FinishingCriterion::ThresholdConverged);
    assert_eq!(adaptive.gradient_history.len(), adaptive.iterations);
    // Lowered circuits only use the synthesis gate set
    assert!(
        adaptive
            .vqe
            .decomposed_op_counts
            .keys()
            .all(|k| ["x", "h", "s", "sdg", "cx", "rz"].contains(&k.as_str()))
    );
}

#[test]
fn test_fixed_vqe_is_deterministic() {
    let h = h2();
    let sim = StatevectorSimulator::new();
    let uccsd = Uccsd::new(&h).unwrap();
    let run = || {
        Vqe::new(&h.operator, &uccsd, OptimizerKind::default(), &sim)
            .unwrap()
            .run()
            .unwrap()
    };
    let a = run();
    let b = run();
    assert_eq!(a.eigenvalue, b.eigenvalue);
    assert_eq!(a.optimal_params, b.optimal_params);
    assert_eq!(a.evaluations, b.evaluations);
}

#[test]
fn test_repeated_selection_aborts() {
    let h = h2();
    let sim = StatevectorSimulator::new();
    let double = Excitation::double(0, 1, 2, 3);
    let ansatz = AdaptiveAnsatz::with_pool(&h, &[double.clone()]).unwrap();
    // With a zero threshold the optimised double is picked again
    let result = AdaptVqe::new(&h.operator, ansatz, OptimizerKind::default(), &sim)
        .unwrap()
        .with_threshold(0.0)
        .run()
        .unwrap();

    assert_eq!(result.finishing_criterion, FinishingCriterion::Cyclicity);
    assert_eq!(result.iterations, 2);
    assert_eq!(result.selected, vec![double]);
    assert_eq!(result.vqe.op_counts.get("evolution"), Some(&1));
    assert_eq!(result.gradient_history.len(), result.iterations);
    assert!(result.gradient_history[1] < result.gradient_history[0]);
    assert_relative_eq!(h.electronic_energy(result.vqe.eigenvalue), H2_FCI_ELECTRONIC, epsilon = 1e-5);
}

#[test]
fn test_uccsd_layout() {
    let h = h2();
    let uccsd = Uccsd::new(&h).unwrap();
    let excitations: Vec<_> = uccsd.excitations().cloned().collect();
    assert_eq!(excitations.len(), 3);
    assert_eq!(excitations[2], Excitation::double(0, 1, 2, 3));
    assert_eq!(uccsd.hopping_operators().len(), 3);
    assert_eq!(uccsd.num_parameters(), 3);

    let once = uccsd.construct_circuit().unwrap();
    let twice = Uccsd::new(&h).unwrap().with_reps(2).construct_circuit().unwrap();
    assert_eq!(once.count_ops().get("evolution"), Some(&3));
    assert_eq!(twice.count_ops().get("evolution"), Some(&3));
    let rz = |c: &qadapt_ir::Circuit| c.decompose().unwrap().count_ops()["rz"];
    assert_eq!(rz(&twice), 2 * rz(&once));
    // Zero repetitions are clamped to one
    let clamped = Uccsd::new(&h).unwrap().with_reps(0).construct_circuit().unwrap();
    assert_eq!(rz(&clamped), rz(&once));
}

#[test]
fn test_initial_state_can_be_dropped() {
    let h = h2();
    let hf_x = HartreeFock::for_hamiltonian(&h).unwrap().circuit().unwrap().count_ops()["x"];
    assert!(hf_x > 0);

    let uccsd = Uccsd::new(&h).unwrap();
    assert_eq!(uccsd.construct_circuit().unwrap().count_ops().get("x"), Some(&hf_x));
    let bare = uccsd.with_initial_state(None).construct_circuit().unwrap();
    assert_eq!(bare.count_ops().get("x"), None);

    let adaptive = AdaptiveAnsatz::new(&h).unwrap();
    assert_eq!(adaptive.construct_circuit().unwrap().count_ops().get("x"), Some(&hf_x));
    let bare = adaptive.with_initial_state(None).construct_circuit().unwrap();
    assert_eq!(bare.count_ops().get("x"), None);
    assert_eq!(bare.num_qubits(), h.num_qubits());
}

#[test]
fn test_commutator_gradient_matches_small_step_difference() {
    let h = h2();
    let sim = StatevectorSimulator::new();

    let fd = AdaptVqe::new(&h.operator, AdaptiveAnsatz::new(&h).unwrap(), OptimizerKind::default(), &sim)
        .unwrap()
        .with_delta(1e-4)
        .gradients(&[])
        .unwrap();
    let exact = AdaptVqe::new(&h.operator, AdaptiveAnsatz::new(&h).unwrap(), OptimizerKind::default(), &sim)
        .unwrap()
        .with_gradient_method(GradientMethod::Commutator)
        .gradients(&[])
        .unwrap();

    assert_eq!(fd.len(), 3);
    for (a, b) in fd.iter().zip(&exact) {
        assert!((a - b).abs() < 1e-6, "finite difference {a} vs commutator {b}");
    }
    // Brillouin: singles have no gradient at the Hartree-Fock state
    assert!(exact[0].abs() < 1e-10 && exact[1].abs() < 1e-10);
    assert!(exact[2].abs() > 0.1);
}

#[test]
fn test_commutator_adapt_reaches_fci() {
    let h = h2();
    let sim = StatevectorSimulator::new();
    let result = AdaptVqe::new(&h.operator, AdaptiveAnsatz::new(&h).unwrap(), OptimizerKind::default(), &sim)
        .unwrap()
        .with_gradient_method(GradientMethod::Commutator)
        .run()
        .unwrap();
    assert_relative_eq!(h.electronic_energy(result.vqe.eigenvalue), H2_FCI_ELECTRONIC, epsilon = 1e-5);
    assert_eq!(result.selected.len(), 1);
}

#[test]
fn test_singles_only_pool_stays_at_hartree_fock() {
    let h = h2();
    let sim = StatevectorSimulator::new();
    let pool = [Excitation::single(0, 1), Excitation::single(2, 3)];
    let ansatz = AdaptiveAnsatz::with_pool(&h, &pool).unwrap();
    let result = AdaptVqe::new(&h.operator, ansatz, OptimizerKind::default(), &sim)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(result.finishing_criterion, FinishingCriterion::ThresholdConverged);
    assert_eq!(result.iterations, 1);
    assert!(result.selected.is_empty());
    assert_relative_eq!(h.total_energy(result.vqe.eigenvalue), h.hf_energy, epsilon = 1e-8);
}

#[test]
fn test_iteration_cap() {
    let h = h2();
    let sim = StatevectorSimulator::new();
    let result = AdaptVqe::new(&h.operator, AdaptiveAnsatz::new(&h).unwrap(), OptimizerKind::default(), &sim)
        .unwrap()
        .with_max_iterations(Some(0))
        .run()
        .unwrap();
    assert_eq!(result.finishing_criterion, FinishingCriterion::MaxIterations);
    assert_eq!(result.iterations, 0);
    assert_eq!(result.vqe.op_counts.get("evolution"), None);
}

#[test]
fn test_final_state_is_a_closed_shell_singlet() {
    let h = h2();
    let sim = StatevectorSimulator::new();
    let result = AdaptVqe::new(&h.operator, AdaptiveAnsatz::new(&h).unwrap(), OptimizerKind::default(), &sim)
        .unwrap()
        .with_aux_operators(h.aux_operators.clone())
        .run()
        .unwrap();
    let aux = |name: &str| result.vqe.aux_value(name).unwrap();
    assert_relative_eq!(aux("particle_number"), 2.0, epsilon = 1e-8);
    assert_relative_eq!(aux("total_spin_squared"), 0.0, epsilon = 1e-8);
    assert_relative_eq!(aux("magnetization"), 0.0, epsilon = 1e-8);
}

#[test]
fn test_exact_reference() {
    let h = h2();
    let exact = ExactEigensolver::new(&h.operator)
        .with_particle_filter(&h.aux_operators[0].operator, 2)
        .run()
        .unwrap();
    assert_relative_eq!(h.electronic_energy(exact.eigenvalue), H2_FCI_ELECTRONIC, epsilon = 1e-5);
    assert_eq!(exact.sector_dimension, 4);
}

#[test]
fn test_alternative_optimizers_agree() {
    let h = h2();
    let sim = StatevectorSimulator::new();
    let uccsd = Uccsd::new(&h).unwrap();
    for name in ["cobyla", "nelder_mead"] {
        let optimizer: OptimizerKind = name.parse().unwrap();
        let result = Vqe::new(&h.operator, &uccsd, optimizer, &sim)
            .unwrap()
            .run()
            .unwrap();
        assert_relative_eq!(h.electronic_energy(result.eigenvalue), H2_FCI_ELECTRONIC, epsilon = 1e-4);
    }
}
