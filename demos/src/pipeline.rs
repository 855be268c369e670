//! The five-stage comparison: integrals, Hamiltonian, reference state and
//! optimizer, fixed-ansatz VQE, adaptive VQE with the comparison.

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::ProgressBar;
use qadapt_adapter_sim::StatevectorSimulator;
use qadapt_algo::{
    AdaptResult, AdaptVqe, AdaptiveAnsatz, ExactEigensolver, ExactResult, HartreeFock,
    MAX_EXACT_QUBITS, OptimizerKind, Uccsd, VariationalForm, Vqe, VqeResult,
};
use qadapt_chem::{
    ElectronicStructure, ElectronicStructureDriver, HartreeFockDriver, QubitHamiltonian,
};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::report::{
    AdaptSummary, ComparisonReport, ExactSummary, HamiltonianSummary, MoleculeSummary,
    SolverSummary,
};

/// Progress labels, in execution order.
pub const STAGES: [&str; 5] = [
    "Computing integrals",
    "Building qubit Hamiltonian",
    "Reference state and optimizer setup",
    "Fixed-ansatz VQE (UCCSD)",
    "Adaptive VQE and comparison",
];

/// Runs every stage from one validated configuration.
pub struct Pipeline {
    config: PipelineConfig,
    progress: Option<ProgressBar>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Report stage changes on a progress bar or spinner.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn stage(&self, index: usize) {
        let name = STAGES[index - 1];
        info!(stage = index, "{name}");
        if let Some(pb) = &self.progress {
            pb.set_message(format!("[{index}/5] {name}"));
        }
    }

    /// Stage 1: integrals and Hartree-Fock.
    pub fn electronic_structure(&self) -> Result<ElectronicStructure> {
        self.stage(1);
        let molecule = self
            .config
            .molecule
            .build()
            .context("invalid molecule configuration")?;
        HartreeFockDriver::new(molecule, self.config.molecule.basis)
            .run()
            .context("Hartree-Fock calculation failed")
    }

    /// Stage 2: the qubit Hamiltonian.
    pub fn hamiltonian(&self, structure: &ElectronicStructure) -> Result<QubitHamiltonian> {
        self.stage(2);
        let hamiltonian = self
            .config
            .hamiltonian
            .build(structure)
            .context("failed to build the qubit Hamiltonian")?;
        info!(
            qubits = hamiltonian.num_qubits(),
            terms = hamiltonian.operator.num_terms(),
            mapping = %hamiltonian.mapping,
            "qubit Hamiltonian ready"
        );
        Ok(hamiltonian)
    }

    /// Stage 3: Hartree-Fock reference state, optimizer, and the exact
    /// energy in the right particle-number sector.
    ///
    /// The exact energy is skipped when disabled or when the register is too
    /// wide to diagonalise.
    pub fn reference(&self, hamiltonian: &QubitHamiltonian) -> Result<Option<ExactResult>> {
        self.stage(3);
        let hf = HartreeFock::for_hamiltonian(hamiltonian)
            .context("failed to encode the Hartree-Fock reference")?;
        let optimizer = self.optimizer()?;
        info!(
            basis_index = hf.basis_index(),
            optimizer = optimizer.name(),
            "reference state and optimizer ready"
        );
        if !self.config.vqe.exact_reference {
            return Ok(None);
        }
        if hamiltonian.num_qubits() > MAX_EXACT_QUBITS {
            warn!(
                qubits = hamiltonian.num_qubits(),
                max = MAX_EXACT_QUBITS,
                "skipping exact reference"
            );
            return Ok(None);
        }
        let particles = hamiltonian.num_particles.0 + hamiltonian.num_particles.1;
        let mut solver = ExactEigensolver::new(&hamiltonian.operator);
        if let Some(number) = hamiltonian
            .aux_operators
            .iter()
            .find(|a| a.name == "particle_number")
        {
            solver = solver.with_particle_filter(&number.operator, particles);
        }
        let result = solver.run().context("exact diagonalisation failed")?;
        Ok(Some(result))
    }

    fn optimizer(&self) -> Result<OptimizerKind> {
        Ok(self.config.optimizer.build()?)
    }

    fn simulator(&self) -> StatevectorSimulator {
        StatevectorSimulator::with_max_qubits(self.config.backend.max_qubits)
    }

    /// Stage 4: VQE with the full UCCSD ansatz.
    pub fn fixed_vqe(&self, hamiltonian: &QubitHamiltonian) -> Result<VqeResult> {
        self.stage(4);
        let simulator = self.simulator();
        let uccsd = Uccsd::new(hamiltonian).context("failed to build the UCCSD ansatz")?;
        info!(parameters = uccsd.num_parameters(), "UCCSD ansatz");

        let mut vqe = Vqe::new(&hamiltonian.operator, &uccsd, self.optimizer()?, &simulator)?
            .with_seed(self.config.vqe.seed)
            .with_aux_operators(hamiltonian.aux_operators.clone());
        if let Some(point) = &self.config.vqe.initial_point {
            vqe = vqe
                .with_initial_point(point.clone())
                .context("vqe.initial_point does not match the UCCSD ansatz")?;
        }
        Ok(vqe.run()?)
    }

    /// Stage 5: ADAPT-VQE over the configured pool. The comparison report
    /// is assembled by [`Pipeline::run`] once it returns.
    pub fn adapt_vqe(&self, hamiltonian: &QubitHamiltonian) -> Result<AdaptResult> {
        self.stage(5);
        let simulator = self.simulator();
        let settings = &self.config.adapt;
        let ansatz = match &settings.pool {
            Some(pool) => AdaptiveAnsatz::with_pool(hamiltonian, pool),
            None => AdaptiveAnsatz::new(hamiltonian),
        }
        .context("failed to build the operator pool")?;
        info!(pool = ansatz.pool().len(), "operator pool");

        let mut adapt = AdaptVqe::new(&hamiltonian.operator, ansatz, self.optimizer()?, &simulator)?
            .with_threshold(settings.threshold)
            .with_delta(settings.delta)
            .with_gradient_method(settings.gradient_method)
            .with_max_iterations(settings.max_iterations)
            .with_aux_operators(hamiltonian.aux_operators.clone());
        Ok(adapt.run()?)
    }

    /// Run all five stages and assemble the report.
    pub fn run(&self) -> Result<ComparisonReport> {
        let structure = self.electronic_structure()?;
        let hamiltonian = self.hamiltonian(&structure)?;
        let exact = self.reference(&hamiltonian)?;
        let fixed = self.fixed_vqe(&hamiltonian)?;
        let adaptive = self.adapt_vqe(&hamiltonian)?;

        let report = ComparisonReport {
            generated_at: Utc::now(),
            config: self.config.clone(),
            molecule: MoleculeSummary::new(&structure, &self.config.molecule.geometry),
            hamiltonian: HamiltonianSummary::new(&hamiltonian),
            exact: exact.as_ref().map(|e| ExactSummary::new(&hamiltonian, e)),
            fixed: SolverSummary::new("UCCSD", &hamiltonian, &fixed),
            adaptive: SolverSummary::new("ADAPT", &hamiltonian, &adaptive.vqe),
            adapt: AdaptSummary::from(&adaptive),
        };
        info!(
            fixed = report.fixed.electronic_energy,
            adaptive = report.adaptive.electronic_energy,
            difference = report.energy_difference(),
            "comparison complete"
        );
        Ok(report)
    }
}
