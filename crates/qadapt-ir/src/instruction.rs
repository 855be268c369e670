//! A gate bound to its operands.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::parameter::ParameterExpression;
use crate::qubit::QubitId;

/// One circuit operation. For evolution gates, operand `k` carries qubit `k`
/// of the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub gate: Gate,
    pub qubits: Vec<QubitId>,
}

impl Instruction {
    pub fn new(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            gate: gate.into(),
            qubits: qubits.into_iter().collect(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.gate.name()
    }

    pub fn parameter(&self) -> Option<&ParameterExpression> {
        self.gate.parameter()
    }

    /// Operands as bit positions.
    pub fn qubit_indices(&self) -> Vec<usize> {
        self.qubits.iter().map(|q| q.index()).collect()
    }

    /// Check operand count, range and distinctness against a register of
    /// `num_qubits` qubits.
    pub fn validate(&self, num_qubits: usize) -> IrResult<()> {
        let gate = self.name();
        if self.qubits.len() != self.gate.num_qubits() {
            return Err(IrError::ArityMismatch {
                gate: gate.to_string(),
                expected: self.gate.num_qubits(),
                got: self.qubits.len(),
            });
        }
        let mut seen = FxHashSet::default();
        for &qubit in &self.qubits {
            if qubit.index() >= num_qubits {
                return Err(IrError::QubitOutOfRange {
                    gate: gate.to_string(),
                    qubit,
                    num_qubits,
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    gate: gate.to_string(),
                    qubit,
                });
            }
        }
        Ok(())
    }

    /// Same operands, angle replaced by `f(angle)`.
    pub fn map_parameter<F>(&self, f: F) -> IrResult<Instruction>
    where
        F: FnOnce(&ParameterExpression) -> IrResult<ParameterExpression>,
    {
        Ok(Self {
            gate: self.gate.map_parameter(f)?,
            qubits: self.qubits.clone(),
        })
    }
}
