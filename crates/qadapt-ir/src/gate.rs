//! Gates.

use serde::{Deserialize, Serialize};

use crate::error::IrResult;
use crate::parameter::ParameterExpression;
use crate::pauli::{PauliString, SparsePauliOp};

/// Largest imaginary coefficient accepted in an evolution generator.
const HERMITIAN_TOLERANCE: f64 = 1e-10;

/// Fixed-arity gates with known matrices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    I,
    X,
    Y,
    Z,
    H,
    /// `diag(1, i)`.
    S,
    /// `diag(1, -i)`.
    Sdg,
    /// `exp(-i θ X / 2)`.
    Rx(ParameterExpression),
    /// `exp(-i θ Y / 2)`.
    Ry(ParameterExpression),
    /// `exp(-i θ Z / 2)`.
    Rz(ParameterExpression),
    /// Control first, target second.
    CX,
    CZ,
}

impl StandardGate {
    /// Lower-case name, as used in gate counts.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::I => "id",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::H => "h",
            Self::S => "s",
            Self::Sdg => "sdg",
            Self::Rx(_) => "rx",
            Self::Ry(_) => "ry",
            Self::Rz(_) => "rz",
            Self::CX => "cx",
            Self::CZ => "cz",
        }
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        match self {
            Self::CX | Self::CZ => 2,
            _ => 1,
        }
    }

    /// Rotation angle, for the three rotation gates.
    pub fn parameter(&self) -> Option<&ParameterExpression> {
        match self {
            Self::Rx(p) | Self::Ry(p) | Self::Rz(p) => Some(p),
            _ => None,
        }
    }
}

/// `exp(-i t G)` for a Hermitian Pauli sum `G = Σ c_k P_k`.
///
/// Acts as `∏_k exp(-i (t / reps) c_k P_k)` over the terms in order,
/// repeated `reps` times. With a single term, or commuting terms, this is
/// exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliEvolutionGate {
    /// Terms `(P_k, c_k)`, real coefficients.
    pub generator: Vec<(PauliString, f64)>,
    /// Evolution time `t`.
    pub time: ParameterExpression,
    /// Product-formula repetitions, at least 1.
    pub reps: u32,
    num_qubits: usize,
}

impl PauliEvolutionGate {
    /// Fails if `generator` is not Hermitian.
    pub fn new(
        generator: &SparsePauliOp,
        time: impl Into<ParameterExpression>,
        reps: u32,
    ) -> IrResult<Self> {
        Ok(Self {
            generator: generator.real_terms(HERMITIAN_TOLERANCE)?,
            time: time.into(),
            reps: reps.max(1),
            num_qubits: generator.num_qubits(),
        })
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// `t / reps` at the parameter vector `values`.
    pub fn slice_time(&self, values: &[f64]) -> IrResult<f64> {
        Ok(self.time.evaluate(values)? / f64::from(self.reps))
    }
}

/// Anything a circuit instruction can apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    Standard(StandardGate),
    /// Counted once as `"evolution"` regardless of its term count.
    Evolution(PauliEvolutionGate),
}

impl Gate {
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Self::Standard(g) => g.name(),
            Self::Evolution(_) => "evolution",
        }
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        match self {
            Self::Standard(g) => g.num_qubits(),
            Self::Evolution(g) => g.num_qubits(),
        }
    }

    /// Angle or evolution time, if the gate has one.
    pub fn parameter(&self) -> Option<&ParameterExpression> {
        match self {
            Self::Standard(g) => g.parameter(),
            Self::Evolution(g) => Some(&g.time),
        }
    }

    /// Same gate with its angle replaced by `f(angle)`.
    pub fn map_parameter<F>(&self, f: F) -> IrResult<Gate>
    where
        F: FnOnce(&ParameterExpression) -> IrResult<ParameterExpression>,
    {
        Ok(match self {
            Self::Standard(StandardGate::Rx(p)) => Self::Standard(StandardGate::Rx(f(p)?)),
            Self::Standard(StandardGate::Ry(p)) => Self::Standard(StandardGate::Ry(f(p)?)),
            Self::Standard(StandardGate::Rz(p)) => Self::Standard(StandardGate::Rz(f(p)?)),
            Self::Standard(g) => Self::Standard(g.clone()),
            Self::Evolution(g) => Self::Evolution(PauliEvolutionGate {
                time: f(&g.time)?,
                ..g.clone()
            }),
        })
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Self::Standard(gate)
    }
}

impl From<PauliEvolutionGate> for Gate {
    fn from(gate: PauliEvolutionGate) -> Self {
        Self::Evolution(gate)
    }
}
