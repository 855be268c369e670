//! Side-by-side comparison of the fixed and adaptive eigensolvers.

use anyhow::Context;
use chrono::{DateTime, Utc};
use qadapt_algo::{AdaptResult, Excitation, ExactResult, FinishingCriterion, VqeResult};
use qadapt_chem::{ElectronicStructure, QubitHamiltonian, spin_from_s_squared};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::Path;

use crate::config::PipelineConfig;

/// The molecule and its Hartree-Fock solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeSummary {
    pub formula: String,
    pub geometry: String,
    pub basis: String,
    pub charge: i32,
    pub multiplicity: u32,
    pub num_electrons: usize,
    pub num_orbitals: usize,
    pub nuclear_repulsion: f64,
    pub hf_energy: f64,
}

impl MoleculeSummary {
    pub fn new(structure: &ElectronicStructure, geometry: &str) -> Self {
        let molecule = &structure.molecule;
        Self {
            formula: molecule.formula(),
            geometry: geometry.to_string(),
            basis: structure.basis.to_string(),
            charge: molecule.charge(),
            multiplicity: molecule.multiplicity(),
            num_electrons: molecule.num_electrons(),
            num_orbitals: structure.num_orbitals,
            nuclear_repulsion: structure.nuclear_repulsion,
            hf_energy: structure.hf_energy,
        }
    }
}

/// Shape of the qubit operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HamiltonianSummary {
    pub mapping: String,
    pub two_qubit_reduction: bool,
    pub num_qubits: usize,
    pub num_terms: usize,
    pub num_spin_orbitals: usize,
    pub num_particles: (usize, usize),
    pub energy_shift: f64,
}

impl HamiltonianSummary {
    pub fn new(hamiltonian: &QubitHamiltonian) -> Self {
        Self {
            mapping: hamiltonian.mapping.to_string(),
            two_qubit_reduction: hamiltonian.two_qubit_reduction,
            num_qubits: hamiltonian.num_qubits(),
            num_terms: hamiltonian.operator.num_terms(),
            num_spin_orbitals: hamiltonian.num_spin_orbitals,
            num_particles: hamiltonian.num_particles,
            energy_shift: hamiltonian.energy_shift,
        }
    }
}

/// Exact diagonalisation in the molecule's particle-number sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactSummary {
    pub electronic_energy: f64,
    pub total_energy: f64,
    pub sector_dimension: usize,
}

impl ExactSummary {
    pub fn new(hamiltonian: &QubitHamiltonian, result: &ExactResult) -> Self {
        Self {
            electronic_energy: hamiltonian.electronic_energy(result.eigenvalue),
            total_energy: hamiltonian.total_energy(result.eigenvalue),
            sector_dimension: result.sector_dimension,
        }
    }
}

/// One eigensolver's outcome, reduced to what the comparison needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverSummary {
    /// Label used in the table header.
    pub name: String,
    /// Raw eigenvalue of the qubit operator.
    pub eigenvalue: f64,
    /// Eigenvalue plus the frozen-core shift.
    pub electronic_energy: f64,
    /// Electronic energy plus nuclear repulsion.
    pub total_energy: f64,
    pub num_parameters: usize,
    pub evaluations: usize,
    pub optimizer_iterations: usize,
    pub converged: bool,
    /// Gate counts with each evolution gate counted once.
    pub op_counts: BTreeMap<String, usize>,
    /// Gate counts after lowering to CX, Rz and basis changes.
    pub decomposed_op_counts: BTreeMap<String, usize>,
    pub aux_values: Vec<(String, f64)>,
    pub elapsed_ms: f64,
}

impl SolverSummary {
    pub fn new(name: &str, hamiltonian: &QubitHamiltonian, result: &VqeResult) -> Self {
        Self {
            name: name.to_string(),
            eigenvalue: result.eigenvalue,
            electronic_energy: hamiltonian.electronic_energy(result.eigenvalue),
            total_energy: hamiltonian.total_energy(result.eigenvalue),
            num_parameters: result.optimal_params.len(),
            evaluations: result.evaluations,
            optimizer_iterations: result.optimizer_iterations,
            converged: result.converged,
            op_counts: result.op_counts.clone(),
            decomposed_op_counts: result.decomposed_op_counts.clone(),
            aux_values: result.aux_values.clone(),
            elapsed_ms: result.elapsed.as_secs_f64() * 1e3,
        }
    }

    /// Count of one gate type, zero if absent.
    pub fn gate_count(&self, gate: &str) -> usize {
        self.op_counts.get(gate).copied().unwrap_or(0)
    }

    fn aux(&self, name: &str) -> Option<f64> {
        self.aux_values.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }
}

/// ADAPT-specific outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptSummary {
    pub iterations: usize,
    pub final_max_gradient: f64,
    pub gradient_history: Vec<f64>,
    pub finishing_criterion: FinishingCriterion,
    pub selected: Vec<Excitation>,
}

impl From<&AdaptResult> for AdaptSummary {
    fn from(result: &AdaptResult) -> Self {
        Self {
            iterations: result.iterations,
            final_max_gradient: result.final_max_gradient,
            gradient_history: result.gradient_history.clone(),
            finishing_criterion: result.finishing_criterion,
            selected: result.selected.clone(),
        }
    }
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub generated_at: DateTime<Utc>,
    pub config: PipelineConfig,
    pub molecule: MoleculeSummary,
    pub hamiltonian: HamiltonianSummary,
    pub exact: Option<ExactSummary>,
    pub fixed: SolverSummary,
    pub adaptive: SolverSummary,
    pub adapt: AdaptSummary,
}

impl ComparisonReport {
    /// `adaptive - fixed` electronic energy.
    pub fn energy_difference(&self) -> f64 {
        self.adaptive.electronic_energy - self.fixed.electronic_energy
    }

    /// Union of the gate names used by either circuit.
    pub fn gate_types(&self) -> BTreeSet<&str> {
        self.fixed
            .op_counts
            .keys()
            .chain(self.adaptive.op_counts.keys())
            .map(String::as_str)
            .collect()
    }

    /// Union of the gate names used by either lowered circuit.
    pub fn decomposed_gate_types(&self) -> BTreeSet<&str> {
        self.fixed
            .decomposed_op_counts
            .keys()
            .chain(self.adaptive.decomposed_op_counts.keys())
            .map(String::as_str)
            .collect()
    }

    /// Plain-text comparison table.
    pub fn render_table(&self) -> String {
        let mut rows: Vec<(String, String, String)> = Vec::new();
        let mut row = |label: &str, fixed: String, adaptive: String| {
            rows.push((label.to_string(), fixed, adaptive));
        };
        let (f, a) = (&self.fixed, &self.adaptive);

        row("Electronic energy (Ha)", format!("{:.8}", f.electronic_energy), format!("{:.8}", a.electronic_energy));
        row("Total energy (Ha)", format!("{:.8}", f.total_energy), format!("{:.8}", a.total_energy));
        if let Some(exact) = &self.exact {
            row(
                "Error vs exact (Ha)",
                format!("{:.2e}", f.electronic_energy - exact.electronic_energy),
                format!("{:.2e}", a.electronic_energy - exact.electronic_energy),
            );
        }
        row("Parameters", f.num_parameters.to_string(), a.num_parameters.to_string());
        row("Energy evaluations", f.evaluations.to_string(), a.evaluations.to_string());
        row("Optimizer iterations", f.optimizer_iterations.to_string(), a.optimizer_iterations.to_string());
        for gate in self.gate_types() {
            row(
                &format!("Gates: {gate}"),
                f.gate_count(gate).to_string(),
                a.gate_count(gate).to_string(),
            );
        }
        for gate in self.decomposed_gate_types() {
            let count = |s: &SolverSummary| s.decomposed_op_counts.get(gate).copied().unwrap_or(0);
            row(&format!("Lowered: {gate}"), count(f).to_string(), count(a).to_string());
        }
        if let (Some(sf), Some(sa)) = (f.aux("total_spin_squared"), a.aux("total_spin_squared")) {
            let spin = |s2| format!("{:.4}", spin_from_s_squared(s2).0);
            row("Spin S", spin(sf), spin(sa));
        }
        row("Wall time (ms)", format!("{:.1}", f.elapsed_ms), format!("{:.1}", a.elapsed_ms));
        row("Finishing criterion", "-".to_string(), self.adapt.finishing_criterion.to_string());

        let width = rows.iter().map(|(l, _, _)| l.chars().count()).max().unwrap_or(0);
        let col = rows
            .iter()
            .flat_map(|(_, x, y)| [x.len(), y.len()])
            .chain([f.name.len(), a.name.len()])
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        let _ = writeln!(out, "{:width$}  {:>col$}  {:>col$}", "", f.name, a.name);
        let _ = writeln!(out, "{}", "-".repeat(width + 2 * col + 4));
        for (label, x, y) in &rows {
            let _ = writeln!(out, "{label:width$}  {x:>col$}  {y:>col$}");
        }
        out
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report as JSON.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
