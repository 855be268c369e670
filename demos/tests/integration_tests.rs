//! Integration tests for the demo pipeline.
//!
//! These run the full comparison on H₂ with the statevector simulator.

use approx::assert_relative_eq;
use qadapt_algo::{Excitation, FinishingCriterion, GradientMethod};
use qadapt_demos::config::PipelineConfig;
use indicatif::ProgressBar;
use qadapt_demos::pipeline::{Pipeline, STAGES};

const H2_FCI_ELECTRONIC: f64 = -1.857_275;

/// The shipped configuration parses and matches the built-in defaults.
#[test]
fn test_shipped_config_is_default() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/h2_sto3g.yaml");
    let config = PipelineConfig::from_file(path).unwrap();
    assert_eq!(config, PipelineConfig::default());
    assert!(config.validate().is_ok());
}

#[test]
fn test_lih_config_parses() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/lih_sto3g.yaml");
    let config = PipelineConfig::from_file(path).unwrap();
    assert!(config.hamiltonian.freeze_core);
    assert_eq!(config.hamiltonian.orbital_reduction, vec![-3, -2]);
    assert_eq!(config.adapt.gradient_method, GradientMethod::Commutator);
    assert!(config.validate().is_ok());
}

/// Full pipeline on H₂: both eigensolvers reach the exact energy and ADAPT
/// needs a single evolution gate.
#[test]
fn test_h2_comparison() {
    let report = Pipeline::new(PipelineConfig::default()).run().unwrap();

    assert_eq!(report.molecule.formula, "H2");
    assert_relative_eq!(report.molecule.nuclear_repulsion, 0.719_969, epsilon = 1e-5);
    assert_eq!(report.hamiltonian.num_qubits, 2);

    let exact = report.exact.as_ref().unwrap();
    assert_relative_eq!(exact.electronic_energy, H2_FCI_ELECTRONIC, epsilon = 1e-5);
    assert_relative_eq!(report.fixed.electronic_energy, exact.electronic_energy, epsilon = 1e-5);
    assert_relative_eq!(report.adaptive.electronic_energy, exact.electronic_energy, epsilon = 1e-5);
    assert!(report.energy_difference().abs() < 1e-6);
    assert!(report.fixed.total_energy < report.molecule.hf_energy);

    assert_eq!(report.fixed.gate_count("evolution"), 3);
    assert_eq!(report.adaptive.gate_count("evolution"), 1);
    assert_eq!(report.fixed.num_parameters, 3);
    assert_eq!(report.adaptive.num_parameters, 1);
    assert_eq!(report.adapt.selected, vec![Excitation::double(0, 1, 2, 3)]);
    assert_ne!(report.adapt.finishing_criterion, FinishingCriterion::MaxIterations);
}

/// Progress labels follow the five pipeline stages and end on the comparison.
#[test]
fn test_stage_labels() {
    assert_eq!(STAGES[0], "Computing integrals");
    assert_eq!(STAGES[2], "Reference state and optimizer setup");
    assert_eq!(STAGES[3], "Fixed-ansatz VQE (UCCSD)");

    let mut config = PipelineConfig::default();
    config.vqe.exact_reference = false;
    let progress = ProgressBar::hidden();
    Pipeline::new(config).with_progress(progress.clone()).run().unwrap();
    assert_eq!(progress.message(), "[5/5] Adaptive VQE and comparison");
}

#[test]
fn test_table_lists_every_gate_type() {
    let report = Pipeline::new(PipelineConfig::default()).run().unwrap();
    let table = report.render_table();
    for gate in report.gate_types() {
        assert!(table.contains(&format!("Gates: {gate}")), "missing {gate}");
    }
    assert!(table.contains("UCCSD") && table.contains("ADAPT"));
    assert!(table.contains(&report.adapt.finishing_criterion.to_string()));
}

#[test]
fn test_report_json() {
    let mut config = PipelineConfig::default();
    config.vqe.exact_reference = false;
    config.adapt.gradient_method = GradientMethod::Commutator;
    let report = Pipeline::new(config).run().unwrap();
    assert!(report.exact.is_none());

    let json = report.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["adaptive"]["op_counts"]["evolution"], 1);
    assert_eq!(value["adapt"]["selected"][0], serde_json::json!([0, 1, 2, 3]));
    assert!(value["generated_at"].is_string());
}

#[test]
fn test_jordan_wigner_pipeline() {
    let mut config = PipelineConfig::default();
    config.hamiltonian.mapping = "jordan_wigner".parse().unwrap();
    config.adapt.gradient_method = GradientMethod::Commutator;
    let report = Pipeline::new(config).run().unwrap();
    assert_eq!(report.hamiltonian.num_qubits, 4);
    assert_relative_eq!(report.adaptive.electronic_energy, H2_FCI_ELECTRONIC, epsilon = 1e-5);
}

#[test]
fn test_invalid_geometry_is_reported() {
    let mut config = PipelineConfig::default();
    config.molecule.geometry = "H 0 0; H 0 0 0.7".to_string();
    let err = Pipeline::new(config).run().unwrap_err();
    assert!(format!("{err:#}").contains("invalid molecule configuration"));
}
