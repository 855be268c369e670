//! ADAPT-VQE Demo
//!
//! Computes a molecular ground state twice, once with a fixed UCCSD ansatz
//! and once with ADAPT-VQE, and compares energy and circuit size.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use console::style;
use qadapt_algo::GradientMethod;
use qadapt_demos::config::{LoggingConfig, PipelineConfig};
use qadapt_demos::pipeline::Pipeline;
use qadapt_demos::report::ComparisonReport;
use qadapt_demos::{
    create_spinner, print_header, print_info, print_result, print_section, print_success,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "demo-adapt-vqe")]
#[command(about = "Compare UCCSD-VQE and ADAPT-VQE on a molecular ground state")]
#[command(version)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "QADAPT_CONFIG")]
    config: Option<PathBuf>,

    /// Geometry string, e.g. "H .0 .0 .0; H .0 .0 0.735"
    #[arg(short, long)]
    geometry: Option<String>,

    /// Fermion-to-qubit mapping (parity, jordan_wigner, bravyi_kitaev)
    #[arg(short, long)]
    mapping: Option<String>,

    /// Classical optimizer (l_bfgs_b, cobyla, nelder_mead, spsa)
    #[arg(short, long)]
    optimizer: Option<String>,

    /// ADAPT gradient threshold
    #[arg(short, long)]
    threshold: Option<f64>,

    /// ADAPT finite-difference step
    #[arg(short, long)]
    delta: Option<f64>,

    /// Use the exact commutator gradient instead of finite differences
    #[arg(long)]
    commutator: bool,

    /// Write the full report as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn apply(&self, mut config: PipelineConfig) -> anyhow::Result<PipelineConfig> {
        if let Some(geometry) = &self.geometry {
            config.molecule.geometry.clone_from(geometry);
        }
        if let Some(mapping) = &self.mapping {
            config.hamiltonian.mapping = mapping.parse()?;
        }
        if let Some(optimizer) = &self.optimizer {
            config.optimizer.method.clone_from(optimizer);
        }
        if let Some(threshold) = self.threshold {
            config.adapt.threshold = threshold;
        }
        if let Some(delta) = self.delta {
            config.adapt.delta = delta;
        }
        if self.commutator {
            config.adapt.gradient_method = GradientMethod::Commutator;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(verbose: u8, logging: &LoggingConfig) {
    let filter = match verbose {
        0 => logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_report(report: &ComparisonReport) {
    print_section("Problem Setup");
    print_result("Molecule", &report.molecule.formula);
    print_result("Geometry", &report.molecule.geometry);
    print_result("Basis", &report.molecule.basis);
    print_result("Electrons", report.molecule.num_electrons);
    print_result(
        "Nuclear repulsion",
        format!("{:.6} Hartree", report.molecule.nuclear_repulsion),
    );
    print_result(
        "Hartree-Fock energy",
        format!("{:.6} Hartree", report.molecule.hf_energy),
    );

    print_section("Qubit Hamiltonian");
    print_result("Mapping", &report.hamiltonian.mapping);
    print_result("Two-qubit reduction", report.hamiltonian.two_qubit_reduction);
    print_result("Qubits", report.hamiltonian.num_qubits);
    print_result("Pauli terms", report.hamiltonian.num_terms);
    if let Some(exact) = &report.exact {
        print_result(
            "Exact ground state",
            format!("{:.6} Hartree (electronic)", exact.electronic_energy),
        );
    }

    print_section("ADAPT-VQE");
    print_result("Iterations", report.adapt.iterations);
    print_result("Final max gradient", format!("{:.3e}", report.adapt.final_max_gradient));
    print_result("Finishing criterion", report.adapt.finishing_criterion);
    let selected: Vec<String> = report.adapt.selected.iter().map(ToString::to_string).collect();
    print_result("Selected excitations", selected.join(", "));

    print_section("Comparison");
    for line in report.render_table().lines() {
        println!("  {line}");
    }
    println!();

    let fixed = report.fixed.gate_count("evolution");
    let adaptive = report.adaptive.gate_count("evolution");
    if adaptive <= fixed {
        print_success(&format!(
            "ADAPT used {adaptive} evolution gate(s) against {fixed} for UCCSD"
        ));
    } else {
        print_info(&format!(
            "ADAPT used {adaptive} evolution gate(s) against {fixed} for UCCSD"
        ));
    }
    print_info(&format!(
        "Energy difference (ADAPT - UCCSD): {:.2e} Hartree",
        report.energy_difference()
    ));
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = PipelineConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    let config = args.apply(config)?;
    init_tracing(args.verbose, &config.logging);

    print_header("ADAPT-VQE vs UCCSD-VQE");

    let spinner = create_spinner("Starting...");
    let pipeline = Pipeline::new(config).with_progress(spinner.clone());
    let result = pipeline.run();
    spinner.finish_and_clear();
    let report = result?;

    print_report(&report);

    if let Some(path) = &args.json {
        report.write_json(path)?;
        print_success(&format!("Report written to {}", path.display()));
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("{} {e:#}", style("Error:").red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qadapt_chem::QubitMapping;

    fn applied(argv: &[&str]) -> anyhow::Result<PipelineConfig> {
        let args = Args::try_parse_from(std::iter::once("demo-adapt-vqe").chain(argv.iter().copied()))?;
        args.apply(PipelineConfig::default())
    }

    #[test]
    fn test_no_flags_keeps_config() {
        assert_eq!(applied(&[]).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_overrides_applied() {
        let config = applied(&[
            "-g",
            "Li .0 .0 .0; H .0 .0 1.6",
            "-m",
            "jordan_wigner",
            "-o",
            "cobyla",
            "-t",
            "1e-4",
            "-d",
            "0.01",
        ])
        .unwrap();
        assert_eq!(config.molecule.geometry, "Li .0 .0 .0; H .0 .0 1.6");
        assert_eq!(config.hamiltonian.mapping, QubitMapping::JordanWigner);
        assert_eq!(config.optimizer.method, "cobyla");
        assert_eq!(config.adapt.threshold, 1e-4);
        assert_eq!(config.adapt.delta, 0.01);
        assert_eq!(config.adapt.gradient_method, GradientMethod::FiniteDifference);
    }

    #[test]
    fn test_commutator_flag() {
        let config = applied(&["--commutator"]).unwrap();
        assert_eq!(config.adapt.gradient_method, GradientMethod::Commutator);
    }

    #[test]
    fn test_unknown_mapping_rejected() {
        assert!(applied(&["--mapping", "nope"]).is_err());
    }

    #[test]
    fn test_unknown_optimizer_rejected() {
        assert!(applied(&["--optimizer", "gradient_descent"]).is_err());
    }

    #[test]
    fn test_non_positive_threshold_and_delta_rejected() {
        let err = applied(&["--threshold=-1"]).unwrap_err();
        assert!(err.to_string().contains("adapt.threshold"));
        let err = applied(&["--delta=0"]).unwrap_err();
        assert!(err.to_string().contains("adapt.delta"));
    }
}
