//! Statevector simulation engine.

use num_complex::Complex64;
use qadapt_ir::{
    Gate, Instruction, ParameterExpression, PauliEvolutionGate, PauliString, SparsePauliOp,
    StandardGate, i_pow,
};
use std::f64::consts::FRAC_1_SQRT_2;

use crate::error::{SimError, SimResult};

/// A pure state of `n` qubits, little-endian: bit `q` of an index is qubit `q`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// The computational basis state `|index⟩`.
    pub fn basis_state(num_qubits: usize, index: usize) -> SimResult<Self> {
        let mut sv = Self::new(num_qubits);
        if index >= sv.amplitudes.len() {
            return Err(SimError::BasisState { index, num_qubits });
        }
        sv.amplitudes.swap(0, index);
        Ok(sv)
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Measurement probabilities of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Squared norm; 1 for a valid state.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Inner product `⟨self|other⟩`.
    pub fn inner(&self, other: &Statevector) -> SimResult<Complex64> {
        self.check_width(other.num_qubits)?;
        Ok(self
            .amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// Apply a bound instruction.
    pub fn apply(&mut self, instruction: &Instruction) -> SimResult<()> {
        let qubits = instruction.qubit_indices();
        match &instruction.gate {
            Gate::Standard(StandardGate::CX) => self.apply_controlled(qubits[0], qubits[1], &PAULI_X),
            Gate::Standard(StandardGate::CZ) => self.apply_controlled(qubits[0], qubits[1], &PAULI_Z),
            Gate::Standard(StandardGate::I) => {}
            Gate::Standard(gate) => self.apply_single(qubits[0], &single_qubit_matrix(gate)?),
            Gate::Evolution(evo) => self.apply_evolution(evo, &qubits)?,
        }
        Ok(())
    }

    fn apply_evolution(&mut self, evo: &PauliEvolutionGate, qubits: &[usize]) -> SimResult<()> {
        let time = evo
            .time
            .as_f64()
            .ok_or_else(|| SimError::UnboundParameter("evolution".to_string()))?;
        let step = time / f64::from(evo.reps);
        let terms = evo
            .generator
            .iter()
            .map(|(p, c)| Ok((self.embed(p, qubits)?, *c)))
            .collect::<SimResult<Vec<_>>>()?;
        for _ in 0..evo.reps {
            for (pauli, coeff) in &terms {
                self.apply_pauli_exponential(pauli, coeff * step);
            }
        }
        Ok(())
    }

    /// Re-express a gate-local Pauli string on the full register.
    fn embed(&self, pauli: &PauliString, qubits: &[usize]) -> SimResult<PauliString> {
        let mut x = 0u64;
        let mut z = 0u64;
        for (local, &global) in qubits.iter().enumerate().take(pauli.num_qubits()) {
            x |= ((pauli.x_mask() >> local) & 1) << global;
            z |= ((pauli.z_mask() >> local) & 1) << global;
        }
        Ok(PauliString::from_masks(self.num_qubits, x, z)?)
    }

    /// Apply `exp(-i θ P) = cos θ · I - i sin θ · P` exactly.
    pub fn apply_pauli_exponential(&mut self, pauli: &PauliString, theta: f64) {
        if pauli.is_identity() {
            let phase = Complex64::from_polar(1.0, -theta);
            for amp in &mut self.amplitudes {
                *amp *= phase;
            }
            return;
        }
        let cos = Complex64::new(theta.cos(), 0.0);
        let minus_i_sin = Complex64::new(0.0, -theta.sin());
        let flip = pauli.x_mask() as usize;

        if flip == 0 {
            for b in 0..self.amplitudes.len() {
                let (_, k) = pauli.apply_to_basis(b);
                self.amplitudes[b] *= cos + minus_i_sin * i_pow(k);
            }
            return;
        }
        for b in 0..self.amplitudes.len() {
            let partner = b ^ flip;
            if partner < b {
                continue;
            }
            let (_, k_b) = pauli.apply_to_basis(b);
            let (_, k_p) = pauli.apply_to_basis(partner);
            let a = self.amplitudes[b];
            let c = self.amplitudes[partner];
            // (Pψ)[b] = i^{k(partner)} ψ[partner] and vice versa
            self.amplitudes[b] = cos * a + minus_i_sin * i_pow(k_p) * c;
            self.amplitudes[partner] = cos * c + minus_i_sin * i_pow(k_b) * a;
        }
    }

    /// `⟨ψ|P|ψ⟩` for a single Pauli string on the full register.
    pub fn pauli_expectation(&self, pauli: &PauliString) -> SimResult<Complex64> {
        self.check_width(pauli.num_qubits())?;
        Ok(self
            .amplitudes
            .iter()
            .enumerate()
            .map(|(b, amp)| {
                let (j, k) = pauli.apply_to_basis(b);
                self.amplitudes[j].conj() * i_pow(k) * amp
            })
            .sum())
    }

    /// Real part of `⟨ψ|O|ψ⟩`.
    pub fn expectation(&self, op: &SparsePauliOp) -> SimResult<f64> {
        self.check_width(op.num_qubits())?;
        let mut value = Complex64::new(0.0, 0.0);
        for (pauli, coeff) in op.terms() {
            value += coeff * self.pauli_expectation(pauli)?;
        }
        Ok(value.re)
    }

    fn check_width(&self, operator: usize) -> SimResult<()> {
        if operator != self.num_qubits {
            return Err(SimError::WidthMismatch {
                state: self.num_qubits,
                operator,
            });
        }
        Ok(())
    }

    /// `m` on `qubit`, acting on each amplitude pair that differs in that bit.
    fn apply_single(&mut self, qubit: usize, m: &Matrix2) {
        let bit = 1 << qubit;
        for lo in (0..self.amplitudes.len()).filter(|i| i & bit == 0) {
            let hi = lo | bit;
            let (a, b) = (self.amplitudes[lo], self.amplitudes[hi]);
            self.amplitudes[lo] = m[0][0] * a + m[0][1] * b;
            self.amplitudes[hi] = m[1][0] * a + m[1][1] * b;
        }
    }

    /// `m` on `target` where `control` is set.
    fn apply_controlled(&mut self, control: usize, target: usize, m: &Matrix2) {
        let (c, t) = (1 << control, 1 << target);
        for lo in (0..self.amplitudes.len()).filter(|i| i & c != 0 && i & t == 0) {
            let hi = lo | t;
            let (a, b) = (self.amplitudes[lo], self.amplitudes[hi]);
            self.amplitudes[lo] = m[0][0] * a + m[0][1] * b;
            self.amplitudes[hi] = m[1][0] * a + m[1][1] * b;
        }
    }
}

type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

const PAULI_X: Matrix2 = [[ZERO, ONE], [ONE, ZERO]];
const PAULI_Y: Matrix2 = [[ZERO, Complex64::new(0.0, -1.0)], [I, ZERO]];
const PAULI_Z: Matrix2 = [[ONE, ZERO], [ZERO, Complex64::new(-1.0, 0.0)]];

fn single_qubit_matrix(gate: &StandardGate) -> SimResult<Matrix2> {
    let half_angle = || {
        gate.parameter()
            .and_then(ParameterExpression::as_f64)
            .map(|theta| theta / 2.0)
            .ok_or_else(|| SimError::UnboundParameter(gate.name().to_string()))
    };
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    Ok(match gate {
        StandardGate::X => PAULI_X,
        StandardGate::Y => PAULI_Y,
        StandardGate::Z => PAULI_Z,
        StandardGate::H => [[h, h], [h, -h]],
        StandardGate::S => [[ONE, ZERO], [ZERO, I]],
        StandardGate::Sdg => [[ONE, ZERO], [ZERO, -I]],
        StandardGate::Rx(_) => {
            let (sin, cos) = half_angle()?.sin_cos();
            let off = Complex64::new(0.0, -sin);
            [[cos.into(), off], [off, cos.into()]]
        }
        StandardGate::Ry(_) => {
            let (sin, cos) = half_angle()?.sin_cos();
            [[cos.into(), (-sin).into()], [sin.into(), cos.into()]]
        }
        StandardGate::Rz(_) => {
            let phi = half_angle()?;
            [
                [Complex64::from_polar(1.0, -phi), ZERO],
                [ZERO, Complex64::from_polar(1.0, phi)],
            ]
        }
        StandardGate::I | StandardGate::CX | StandardGate::CZ => [[ONE, ZERO], [ZERO, ONE]],
    })
}
