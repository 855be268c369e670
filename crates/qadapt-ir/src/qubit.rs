//! Qubit identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a qubit in a register.
///
/// Qubit `k` is bit `k` of a basis-state index, so `|q1 q0⟩ = |10⟩` is index 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QubitId(pub u32);

impl QubitId {
    /// Bit position in a basis-state index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Single-bit mask selecting this qubit.
    #[inline]
    pub fn mask(self) -> usize {
        1 << self.0
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

// Registers never come close to u32::MAX qubits; Pauli masks stop at 64.
impl From<usize> for QubitId {
    fn from(id: usize) -> Self {
        QubitId(id as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_index_mask() {
        let q = QubitId::from(3usize);
        assert_eq!(q.to_string(), "q3");
        assert_eq!(q.index(), 3);
        assert_eq!(q.mask(), 0b1000);
        assert_eq!(serde_json::to_string(&q).unwrap(), "3");
    }
}
