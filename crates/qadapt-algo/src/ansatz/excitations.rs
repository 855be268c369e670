//! Particle-conserving excitations and their qubit hopping operators.

use num_complex::Complex64;
use qadapt_chem::{QubitHamiltonian, QubitMapping, two_qubit_reduction};
use qadapt_ir::{DEFAULT_TOLERANCE, SparsePauliOp};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{AlgoError, AlgoResult};

/// A single `[i, a]` or double `[i, a, j, b]` excitation over spin-orbitals.
///
/// Spin-orbitals `0..n` are α and `n..2n` are β. A single moves an electron
/// from `i` to `a`; a double moves electrons from `i` and `j` to `a` and `b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Excitation {
    orbitals: Vec<usize>,
}

impl Excitation {
    /// A single excitation `i → a`.
    pub fn single(i: usize, a: usize) -> Self {
        Self { orbitals: vec![i, a] }
    }

    /// A double excitation `i, j → a, b`.
    pub fn double(i: usize, a: usize, j: usize, b: usize) -> Self {
        Self {
            orbitals: vec![i, a, j, b],
        }
    }

    /// Orbital indices in `[i, a]` or `[i, a, j, b]` order.
    pub fn orbitals(&self) -> &[usize] {
        &self.orbitals
    }

    /// True for a single excitation.
    pub fn is_single(&self) -> bool {
        self.orbitals.len() == 2
    }

    fn invalid(&self, reason: impl Into<String>) -> AlgoError {
        AlgoError::InvalidExcitation {
            excitation: self.orbitals.clone(),
            reason: reason.into(),
        }
    }

    /// Reject out-of-range, repeated, or spin-flipping indices.
    fn validate(&self, num_spin_orbitals: usize) -> AlgoResult<()> {
        if let Some(&bad) = self.orbitals.iter().find(|&&o| o >= num_spin_orbitals) {
            return Err(self.invalid(format!(
                "orbital {bad} outside {num_spin_orbitals} spin-orbitals"
            )));
        }
        let mut sorted = self.orbitals.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != self.orbitals.len() {
            return Err(self.invalid("orbital indices must be distinct"));
        }
        let half = num_spin_orbitals / 2;
        let alpha = |o: &usize| *o < half;
        let removed = self.orbitals.iter().step_by(2).filter(|o| alpha(o)).count();
        let added = self.orbitals.iter().skip(1).step_by(2).filter(|o| alpha(o)).count();
        if removed != added {
            return Err(self.invalid("excitation changes S_z"));
        }
        Ok(())
    }
}

impl TryFrom<Vec<usize>> for Excitation {
    type Error = AlgoError;

    fn try_from(orbitals: Vec<usize>) -> Result<Self, Self::Error> {
        match orbitals.len() {
            2 | 4 => Ok(Self { orbitals }),
            n => Err(AlgoError::InvalidExcitation {
                excitation: orbitals,
                reason: format!("expected 2 or 4 orbital indices, got {n}"),
            }),
        }
    }
}

impl From<Excitation> for Vec<usize> {
    fn from(excitation: Excitation) -> Self {
        excitation.orbitals
    }
}

impl fmt::Display for Excitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.orbitals)
    }
}

/// An excitation together with its Hermitian qubit generator `G = i(T - T†)`.
///
/// `exp(-iθG)` equals the unitary coupled-cluster factor `exp(θ(T - T†))`.
#[derive(Debug, Clone, PartialEq)]
pub struct HoppingOperator {
    /// The fermionic excitation.
    pub excitation: Excitation,
    /// Mapped, tapered generator.
    pub generator: SparsePauliOp,
}

/// Spin-orbital layout and encoding shared by every excitation of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcitationSpace {
    /// Number of active spin-orbitals.
    pub num_spin_orbitals: usize,
    /// Active `(N_α, N_β)`.
    pub num_particles: (usize, usize),
    /// Fermion-to-qubit mapping.
    pub mapping: QubitMapping,
    /// Whether generators are tapered with the two-qubit reduction.
    pub two_qubit_reduction: bool,
}

impl ExcitationSpace {
    /// The layout of a qubit Hamiltonian.
    pub fn for_hamiltonian(hamiltonian: &QubitHamiltonian) -> Self {
        Self {
            num_spin_orbitals: hamiltonian.num_spin_orbitals,
            num_particles: hamiltonian.num_particles,
            mapping: hamiltonian.mapping,
            two_qubit_reduction: hamiltonian.two_qubit_reduction,
        }
    }

    /// Width of the tapered register.
    pub fn num_qubits(&self) -> usize {
        if self.two_qubit_reduction {
            self.num_spin_orbitals - 2
        } else {
            self.num_spin_orbitals
        }
    }

    /// All singles and doubles out of the Hartree-Fock determinant.
    ///
    /// Order: α singles, β singles, αβ doubles, then (if enabled) αα and ββ
    /// doubles, which need at least two occupied and two virtual orbitals of
    /// that spin.
    pub fn excitations(&self, same_spin_doubles: bool) -> Vec<Excitation> {
        let half = self.num_spin_orbitals / 2;
        let (n_alpha, n_beta) = self.num_particles;
        let occ_alpha: Vec<usize> = (0..n_alpha).collect();
        let vir_alpha: Vec<usize> = (n_alpha..half).collect();
        let occ_beta: Vec<usize> = (half..half + n_beta).collect();
        let vir_beta: Vec<usize> = (half + n_beta..self.num_spin_orbitals).collect();

        let mut out = Vec::new();
        for (occ, vir) in [(&occ_alpha, &vir_alpha), (&occ_beta, &vir_beta)] {
            for &i in occ {
                for &a in vir {
                    out.push(Excitation::single(i, a));
                }
            }
        }

        for &i in &occ_alpha {
            for &a in &vir_alpha {
                for &j in &occ_beta {
                    for &b in &vir_beta {
                        out.push(Excitation::double(i, a, j, b));
                    }
                }
            }
        }

        if same_spin_doubles {
            for (occ, vir) in [(&occ_alpha, &vir_alpha), (&occ_beta, &vir_beta)] {
                if occ.len() < 2 || vir.len() < 2 {
                    continue;
                }
                for (x, &i) in occ.iter().enumerate() {
                    for &j in &occ[x + 1..] {
                        for (y, &a) in vir.iter().enumerate() {
                            for &b in &vir[y + 1..] {
                                out.push(Excitation::double(i, a, j, b));
                            }
                        }
                    }
                }
            }
        }
        out
    }

    /// The hopping operator for one excitation, or `None` if its generator
    /// vanishes after mapping and tapering.
    pub fn hopping_operator(&self, excitation: &Excitation) -> AlgoResult<Option<HoppingOperator>> {
        let m = self.num_spin_orbitals;
        excitation.validate(m)?;

        let o = excitation.orbitals();
        let create = |p: usize| self.mapping.creation(p, m);
        let destroy = |p: usize| self.mapping.annihilation(p, m);
        let forward = if excitation.is_single() {
            create(o[1])?.compose(&destroy(o[0])?)?
        } else {
            create(o[1])?
                .compose(&create(o[3])?)?
                .compose(&destroy(o[2])?)?
                .compose(&destroy(o[0])?)?
        };
        let anti_hermitian = &forward - &forward.adjoint();
        let mut generator = anti_hermitian
            .scale(Complex64::new(0.0, 1.0))
            .simplify(DEFAULT_TOLERANCE);
        if self.two_qubit_reduction {
            generator = two_qubit_reduction(&generator, self.num_particles)?;
        }

        if generator.is_empty() {
            debug!(%excitation, "hopping operator vanishes, skipped");
            return Ok(None);
        }
        Ok(Some(HoppingOperator {
            excitation: excitation.clone(),
            generator,
        }))
    }

    /// Hopping operators for a list of excitations, dropping vanishing ones.
    pub fn hopping_operators(&self, excitations: &[Excitation]) -> AlgoResult<Vec<HoppingOperator>> {
        let mut out = Vec::with_capacity(excitations.len());
        for excitation in excitations {
            if let Some(op) = self.hopping_operator(excitation)? {
                out.push(op);
            }
        }
        debug!(
            requested = excitations.len(),
            kept = out.len(),
            "hopping operators built"
        );
        Ok(out)
    }
}
