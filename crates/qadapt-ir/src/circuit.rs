//! Circuit builder.

use std::collections::BTreeMap;

use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::{Gate, PauliEvolutionGate, StandardGate};
use crate::instruction::Instruction;
use crate::parameter::ParameterExpression;
use crate::pauli::{Pauli, PauliString, SparsePauliOp};
use crate::qubit::QubitId;

/// A named, fixed-width circuit over positional parameters `θ[k]`.
///
/// Gate methods validate their operands and return `&mut Self` so calls can
/// be chained with `?`.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    dag: CircuitDag,
}

impl Circuit {
    /// Circuit with no qubits.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_size(name, 0)
    }

    pub fn with_size(name: impl Into<String>, num_qubits: usize) -> Self {
        Self {
            name: name.into(),
            dag: CircuitDag::new(num_qubits),
        }
    }

    pub fn add_qubit(&mut self) -> QubitId {
        self.dag.add_qubit()
    }

    fn push(&mut self, gate: impl Into<Gate>, qubits: &[QubitId]) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::new(gate, qubits.iter().copied()))?;
        Ok(self)
    }

    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(StandardGate::H, &[qubit])
    }

    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(StandardGate::X, &[qubit])
    }

    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(StandardGate::Y, &[qubit])
    }

    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(StandardGate::Z, &[qubit])
    }

    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(StandardGate::S, &[qubit])
    }

    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(StandardGate::Sdg, &[qubit])
    }

    pub fn rx(&mut self, theta: impl Into<ParameterExpression>, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(StandardGate::Rx(theta.into()), &[qubit])
    }

    pub fn ry(&mut self, theta: impl Into<ParameterExpression>, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(StandardGate::Ry(theta.into()), &[qubit])
    }

    pub fn rz(&mut self, theta: impl Into<ParameterExpression>, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(StandardGate::Rz(theta.into()), &[qubit])
    }

    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(StandardGate::CX, &[control, target])
    }

    pub fn cz(&mut self, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.push(StandardGate::CZ, &[a, b])
    }

    /// Append `exp(-i t G)` on qubits `0..G.num_qubits()`, as `reps`
    /// product-formula steps.
    pub fn evolve(
        &mut self,
        generator: &SparsePauliOp,
        time: impl Into<ParameterExpression>,
        reps: u32,
    ) -> IrResult<&mut Self> {
        let width = generator.num_qubits();
        if width > self.num_qubits() {
            return Err(IrError::WidthMismatch {
                left: self.num_qubits(),
                right: width,
            });
        }
        let gate = PauliEvolutionGate::new(generator, time, reps)?;
        let qubits: Vec<QubitId> = (0..width).map(QubitId::from).collect();
        self.push(gate, &qubits)
    }

    /// Append any gate on explicit operands.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::new(gate, qubits))?;
        Ok(self)
    }

    /// Append `other`, renumbering its parameters to follow this circuit's:
    /// `θ[k]` of `other` becomes `θ[self.num_parameters() + k]`.
    pub fn compose(&mut self, other: &Circuit) -> IrResult<&mut Self> {
        if other.num_qubits() > self.num_qubits() {
            return Err(IrError::WidthMismatch {
                left: self.num_qubits(),
                right: other.num_qubits(),
            });
        }
        let offset = self.num_parameters();
        for inst in other.instructions() {
            self.dag.apply(inst.map_parameter(|p| Ok(p.shifted(offset)))?)?;
        }
        Ok(self)
    }

    /// Copy with every `θ[k]` replaced by `values[k]`.
    pub fn bind_parameters(&self, values: &[f64]) -> IrResult<Circuit> {
        let expected = self.num_parameters();
        if values.len() != expected {
            return Err(IrError::ParameterCountMismatch {
                expected,
                got: values.len(),
            });
        }
        let mut bound = Circuit::with_size(self.name.clone(), self.num_qubits());
        for inst in self.instructions() {
            bound.dag.apply(inst.map_parameter(|p| p.bind(values))?)?;
        }
        Ok(bound)
    }

    /// One past the highest parameter index referenced.
    pub fn num_parameters(&self) -> usize {
        self.instructions()
            .filter_map(Instruction::parameter)
            .filter_map(ParameterExpression::index)
            .map(|k| k + 1)
            .max()
            .unwrap_or(0)
    }

    /// Instruction counts by gate name. An evolution gate counts once.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for inst in self.instructions() {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Lower every evolution gate to H, S, Sdg, CX and Rz.
    ///
    /// Each term `exp(-i τ c P)` becomes a basis change onto Z, a CX ladder
    /// over the support, `Rz(2 c τ)` on the last support qubit, and the
    /// mirror image. Identity terms are a global phase and are dropped.
    pub fn decompose(&self) -> IrResult<Circuit> {
        let mut out = Circuit::with_size(format!("{}_decomposed", self.name), self.num_qubits());
        for inst in self.instructions() {
            let Gate::Evolution(evo) = &inst.gate else {
                out.dag.apply(inst.clone())?;
                continue;
            };
            let step = evo.time.scaled(1.0 / f64::from(evo.reps));
            for _ in 0..evo.reps {
                for (pauli, coeff) in &evo.generator {
                    out.exp_pauli(pauli, step.scaled(2.0 * coeff))?;
                }
            }
        }
        Ok(out)
    }

    /// `exp(-i angle/2 P)`.
    fn exp_pauli(&mut self, pauli: &PauliString, angle: ParameterExpression) -> IrResult<()> {
        let support: Vec<QubitId> = (0..pauli.num_qubits())
            .filter(|&q| pauli.get(q) != Pauli::I)
            .map(QubitId::from)
            .collect();
        let Some(&pivot) = support.last() else {
            return Ok(());
        };

        for &q in &support {
            match pauli.get(q.index()) {
                Pauli::X => {
                    self.h(q)?;
                }
                Pauli::Y => {
                    self.sdg(q)?.h(q)?;
                }
                _ => {}
            }
        }
        for pair in support.windows(2) {
            self.cx(pair[0], pair[1])?;
        }
        self.rz(angle, pivot)?;
        for pair in support.windows(2).rev() {
            self.cx(pair[0], pair[1])?;
        }
        for &q in &support {
            match pauli.get(q.index()) {
                Pauli::X => {
                    self.h(q)?;
                }
                Pauli::Y => {
                    self.h(q)?.s(q)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_qubits(&self) -> usize {
        self.dag.num_qubits()
    }

    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> + '_ {
        self.dag.ops()
    }

    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn generator(labels: &[(&str, f64)]) -> SparsePauliOp {
        let terms: Vec<_> = labels
            .iter()
            .map(|(l, c)| (*l, Complex64::new(*c, 0.0)))
            .collect();
        SparsePauliOp::from_labels(&terms).unwrap()
    }

    #[test]
    fn test_chained_builder() {
        let mut circuit = Circuit::with_size("bell", 2);
        circuit.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        assert_eq!(circuit.depth(), 2);
        let counts = circuit.count_ops();
        assert_eq!(counts["h"], 1);
        assert_eq!(counts["cx"], 1);
        assert!(matches!(
            circuit.cx(QubitId(0), QubitId(2)),
            Err(IrError::QubitOutOfRange { .. })
        ));
    }

    #[test]
    fn test_evolution_is_one_instruction() {
        let g = generator(&[("XY", 0.5), ("YX", -0.5)]);
        let mut circuit = Circuit::with_size("evo", 2);
        circuit.x(QubitId(0)).unwrap();
        circuit.evolve(&g, ParameterExpression::parameter(0), 1).unwrap();
        let counts = circuit.count_ops();
        assert_eq!(counts["evolution"], 1);
        assert_eq!(counts["x"], 1);
        assert_eq!(circuit.num_parameters(), 1);
    }

    #[test]
    fn test_bind_parameters() {
        let mut circuit = Circuit::with_size("ry", 1);
        circuit.ry(ParameterExpression::parameter(0), QubitId(0)).unwrap();
        assert!(matches!(
            circuit.bind_parameters(&[]),
            Err(IrError::ParameterCountMismatch { expected: 1, got: 0 })
        ));
        let bound = circuit.bind_parameters(&[0.25]).unwrap();
        assert_eq!(bound.num_parameters(), 0);
        let angle = bound
            .instructions()
            .next()
            .and_then(Instruction::parameter)
            .and_then(ParameterExpression::as_f64);
        assert_eq!(angle, Some(0.25));
    }

    #[test]
    fn test_compose_renumbers() {
        let mut a = Circuit::with_size("a", 1);
        a.rz(ParameterExpression::parameter(0), QubitId(0)).unwrap();
        let b = a.clone();
        a.compose(&b).unwrap();
        assert_eq!(a.num_parameters(), 2);
        assert!(a.compose(&Circuit::with_size("wide", 3)).is_err());
    }

    #[test]
    fn test_decompose_single_term() {
        // X on q0: H twice. Y on q1: Sdg H then H S.
        let g = generator(&[("XY", 1.0)]);
        let mut circuit = Circuit::with_size("evo", 2);
        circuit.evolve(&g, ParameterExpression::parameter(0), 1).unwrap();
        let lowered = circuit.decompose().unwrap();
        let counts = lowered.count_ops();
        assert_eq!(counts["cx"], 2);
        assert_eq!(counts["rz"], 1);
        assert_eq!(counts["h"], 4);
        assert_eq!(counts["sdg"], 1);
        assert_eq!(counts["s"], 1);
        assert!(!counts.contains_key("evolution"));

        let rz = lowered
            .instructions()
            .find(|i| i.name() == "rz")
            .and_then(Instruction::parameter)
            .copied();
        assert_eq!(rz, Some(ParameterExpression::parameter(0).scaled(2.0)));
    }

    #[test]
    fn test_evolve_wider_than_circuit() {
        let g = generator(&[("XYZ", 1.0)]);
        let mut circuit = Circuit::with_size("small", 2);
        assert!(matches!(
            circuit.evolve(&g, 1.0, 1),
            Err(IrError::WidthMismatch { .. })
        ));
    }
}
