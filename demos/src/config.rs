//! Configuration for the comparison pipeline.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with QADAPT_ prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line flags (applied by the binary)
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values
//!
//! The defaults reproduce the reference H₂ calculation: 0.735 Å bond, STO-3G,
//! parity mapping with the two-qubit reduction, L-BFGS-B, ADAPT threshold
//! `1e-5` and finite-difference step `1.0`.

use qadapt_adapter_sim::DEFAULT_MAX_QUBITS;
use qadapt_algo::{DEFAULT_DELTA, DEFAULT_THRESHOLD, Excitation, GradientMethod, OptimizerKind};
use qadapt_chem::{BasisSet, ChemResult, DistanceUnit, Molecule, QubitHamiltonianBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Molecule and basis
    #[serde(default)]
    pub molecule: MoleculeConfig,

    /// Qubit Hamiltonian construction
    #[serde(default)]
    pub hamiltonian: QubitHamiltonianBuilder,

    /// Classical optimizer shared by both eigensolvers
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    /// Fixed-ansatz VQE settings
    #[serde(default)]
    pub vqe: VqeConfig,

    /// ADAPT-VQE settings
    #[serde(default)]
    pub adapt: AdaptConfig,

    /// Simulator settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Molecule to simulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeConfig {
    /// Geometry string, e.g. `"H .0 .0 .0; H .0 .0 0.735"`
    #[serde(default = "default_geometry")]
    pub geometry: String,

    /// Unit of the coordinates
    #[serde(default)]
    pub unit: DistanceUnit,

    /// Total charge
    #[serde(default)]
    pub charge: i32,

    /// Spin multiplicity `2S + 1`
    #[serde(default = "default_multiplicity")]
    pub multiplicity: u32,

    /// Basis set
    #[serde(default)]
    pub basis: BasisSet,
}

/// Optimizer selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Name: `l_bfgs_b`, `cobyla`, `nelder_mead` or `spsa`
    #[serde(default = "default_optimizer")]
    pub method: String,

    /// Iteration cap; the optimizer default when absent
    #[serde(default)]
    pub max_iterations: Option<usize>,
}

/// Fixed UCCSD VQE settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VqeConfig {
    /// Seed for random initial points
    #[serde(default)]
    pub seed: u64,

    /// Explicit starting parameters; zeros when absent
    #[serde(default)]
    pub initial_point: Option<Vec<f64>>,

    /// Diagonalise the Hamiltonian for a reference energy
    #[serde(default = "default_true")]
    pub exact_reference: bool,
}

/// ADAPT-VQE settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptConfig {
    /// Gradient threshold
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Finite-difference step
    #[serde(default = "default_delta")]
    pub delta: f64,

    /// How pool gradients are measured
    #[serde(default)]
    pub gradient_method: GradientMethod,

    /// Cap on gradient rounds; unbounded when absent
    #[serde(default)]
    pub max_iterations: Option<usize>,

    /// Custom operator pool; all UCCSD excitations when absent
    #[serde(default)]
    pub pool: Option<Vec<Excitation>>,
}

/// Simulator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Widest register the simulator accepts
    #[serde(default = "default_max_qubits")]
    pub max_qubits: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error. `-v` flags take precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: console, json
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_geometry() -> String {
    "H .0 .0 .0; H .0 .0 0.735".to_string()
}

fn default_multiplicity() -> u32 {
    1
}

fn default_optimizer() -> String {
    "l_bfgs_b".to_string()
}

fn default_true() -> bool {
    true
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_delta() -> f64 {
    DEFAULT_DELTA
}

fn default_max_qubits() -> usize {
    DEFAULT_MAX_QUBITS
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

impl Default for MoleculeConfig {
    fn default() -> Self {
        Self {
            geometry: default_geometry(),
            unit: DistanceUnit::default(),
            charge: 0,
            multiplicity: default_multiplicity(),
            basis: BasisSet::default(),
        }
    }
}

impl MoleculeConfig {
    /// Parse and validate the molecule.
    pub fn build(&self) -> ChemResult<Molecule> {
        Molecule::from_geometry(&self.geometry, self.unit, self.charge, self.multiplicity)
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            method: default_optimizer(),
            max_iterations: None,
        }
    }
}

impl OptimizerConfig {
    /// Resolve the configured optimizer.
    pub fn build(&self) -> Result<OptimizerKind, ConfigError> {
        let kind: OptimizerKind = self
            .method
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("{e}")))?;
        Ok(match self.max_iterations {
            Some(max) => kind.with_max_iterations(max),
            None => kind,
        })
    }
}

impl Default for VqeConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            initial_point: None,
            exact_reference: default_true(),
        }
    }
}

impl Default for AdaptConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            delta: default_delta(),
            gradient_method: GradientMethod::default(),
            max_iterations: None,
            pool: None,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            max_qubits: default_max_qubits(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml_ng::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml_ng::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// `<config dir>/qadapt/config.yaml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("qadapt").join("config.yaml"))
    }

    /// Load configuration with the following precedence:
    /// 1. Load from `config_file`, or the default path if it exists
    /// 2. Apply environment variable overrides
    /// 3. Validate
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let fallback = Self::default_path().filter(|p| p.is_file());
        let mut config = match config_file.map(Path::to_path_buf).or(fallback) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config = config.merge_env();

        config.validate()?;
        Ok(config)
    }

    /// Merge `QADAPT_*` environment variables into this configuration.
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Merge overrides from any variable source.
    ///
    /// Only variables that are present override the current values;
    /// unparsable numbers are ignored.
    pub fn merge_vars<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Molecule
        if let Some(v) = var("QADAPT_GEOMETRY") {
            self.molecule.geometry = v;
        }
        if let Some(v) = var("QADAPT_UNIT") {
            if let Ok(val) = v.parse() {
                self.molecule.unit = val;
            }
        }
        if let Some(v) = var("QADAPT_CHARGE") {
            if let Ok(val) = v.parse() {
                self.molecule.charge = val;
            }
        }
        if let Some(v) = var("QADAPT_MULTIPLICITY") {
            if let Ok(val) = v.parse() {
                self.molecule.multiplicity = val;
            }
        }
        if let Some(v) = var("QADAPT_BASIS") {
            if let Ok(val) = v.parse() {
                self.molecule.basis = val;
            }
        }

        // Hamiltonian
        if let Some(v) = var("QADAPT_MAPPING") {
            if let Ok(val) = v.parse() {
                self.hamiltonian.mapping = val;
            }
        }
        if let Some(v) = var("QADAPT_TWO_QUBIT_REDUCTION") {
            if let Ok(val) = v.parse() {
                self.hamiltonian.two_qubit_reduction = val;
            }
        }
        if let Some(v) = var("QADAPT_FREEZE_CORE") {
            if let Ok(val) = v.parse() {
                self.hamiltonian.freeze_core = val;
            }
        }

        // Optimizer
        if let Some(v) = var("QADAPT_OPTIMIZER") {
            self.optimizer.method = v;
        }
        if let Some(v) = var("QADAPT_MAX_ITERATIONS") {
            if let Ok(val) = v.parse() {
                self.optimizer.max_iterations = Some(val);
            }
        }
        if let Some(v) = var("QADAPT_SEED") {
            if let Ok(val) = v.parse() {
                self.vqe.seed = val;
            }
        }

        // ADAPT
        if let Some(v) = var("QADAPT_THRESHOLD") {
            if let Ok(val) = v.parse() {
                self.adapt.threshold = val;
            }
        }
        if let Some(v) = var("QADAPT_DELTA") {
            if let Ok(val) = v.parse() {
                self.adapt.delta = val;
            }
        }
        if let Some(v) = var("QADAPT_GRADIENT_METHOD") {
            match v.as_str() {
                "finite_difference" => self.adapt.gradient_method = GradientMethod::FiniteDifference,
                "commutator" => self.adapt.gradient_method = GradientMethod::Commutator,
                _ => {}
            }
        }

        // Backend
        if let Some(v) = var("QADAPT_MAX_QUBITS") {
            if let Ok(val) = v.parse() {
                self.backend.max_qubits = val;
            }
        }

        // Logging
        if let Some(v) = var("QADAPT_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = var("QADAPT_LOG_FORMAT") {
            self.logging.format = v;
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.molecule.geometry.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "molecule.geometry must not be empty".to_string(),
            ));
        }
        if self.molecule.multiplicity == 0 {
            return Err(ConfigError::ValidationError(
                "molecule.multiplicity must be at least 1".to_string(),
            ));
        }

        self.optimizer.build()?;
        if self.optimizer.max_iterations == Some(0) {
            return Err(ConfigError::ValidationError(
                "optimizer.max_iterations must be greater than 0".to_string(),
            ));
        }

        if let Some(point) = &self.vqe.initial_point {
            if point.iter().any(|x| !x.is_finite()) {
                return Err(ConfigError::ValidationError(
                    "vqe.initial_point must be finite".to_string(),
                ));
            }
        }

        if !(self.adapt.threshold.is_finite() && self.adapt.threshold > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "adapt.threshold must be positive, got {}",
                self.adapt.threshold
            )));
        }
        if !(self.adapt.delta.is_finite() && self.adapt.delta > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "adapt.delta must be positive, got {}",
                self.adapt.delta
            )));
        }
        if let Some(pool) = &self.adapt.pool {
            if pool.is_empty() {
                return Err(ConfigError::ValidationError(
                    "adapt.pool must not be empty; omit the field to use all excitations"
                        .to_string(),
                ));
            }
        }

        if !(1..=DEFAULT_MAX_QUBITS).contains(&self.backend.max_qubits) {
            return Err(ConfigError::ValidationError(format!(
                "backend.max_qubits must be in 1..={DEFAULT_MAX_QUBITS}, got {}",
                self.backend.max_qubits
            )));
        }

        // Validate log level
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        // Validate log format
        match self.logging.format.as_str() {
            "console" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {other}"
                )));
            }
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use qadapt_chem::QubitMapping;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.molecule.geometry, "H .0 .0 .0; H .0 .0 0.735");
        assert_eq!(config.hamiltonian.mapping, QubitMapping::Parity);
        assert!(config.hamiltonian.two_qubit_reduction);
        assert_eq!(config.adapt.threshold, 1e-5);
        assert_eq!(config.adapt.delta, 1.0);
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = PipelineConfig::from_yaml("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r"
molecule:
  geometry: 'Li .0 .0 .0; H .0 .0 1.6'
hamiltonian:
  mapping: jordan_wigner
  two_qubit_reduction: false
  freeze_core: true
optimizer:
  method: cobyla
  max_iterations: 500
adapt:
  gradient_method: commutator
  pool:
    - [0, 1]
    - [0, 1, 2, 3]
";
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.hamiltonian.mapping, QubitMapping::JordanWigner);
        assert!(config.hamiltonian.freeze_core);
        assert_eq!(config.molecule.multiplicity, 1);
        assert_eq!(config.adapt.gradient_method, GradientMethod::Commutator);
        assert_eq!(config.adapt.threshold, DEFAULT_THRESHOLD);
        let pool = config.adapt.pool.as_ref().unwrap();
        assert_eq!(pool[1], Excitation::double(0, 1, 2, 3));
        assert_eq!(config.optimizer.build().unwrap().name(), "cobyla");
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = PipelineConfig::default();
        config.vqe.initial_point = Some(vec![0.1, -0.2, 0.0]);
        let parsed = PipelineConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("QADAPT_MAPPING", "bravyi_kitaev"),
            ("QADAPT_THRESHOLD", "1e-3"),
            ("QADAPT_DELTA", "not a number"),
            ("QADAPT_GRADIENT_METHOD", "commutator"),
            ("QADAPT_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();
        let config = PipelineConfig::default().merge_vars(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.hamiltonian.mapping, QubitMapping::BravyiKitaev);
        assert_eq!(config.adapt.threshold, 1e-3);
        assert_eq!(config.adapt.delta, DEFAULT_DELTA);
        assert_eq!(config.adapt.gradient_method, GradientMethod::Commutator);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PipelineConfig::default();
        config.optimizer.method = "gradient_descent".to_string();
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.adapt.threshold = 0.0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.adapt.pool = Some(Vec::new());
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_qubits_capped_at_simulator_limit() {
        let mut config = PipelineConfig::default();
        config.backend.max_qubits = DEFAULT_MAX_QUBITS;
        assert!(config.validate().is_ok());

        config.backend.max_qubits = DEFAULT_MAX_QUBITS + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("backend.max_qubits"));

        config.backend.max_qubits = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::from_file("/nonexistent/qadapt.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
