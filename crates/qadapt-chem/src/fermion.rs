//! Second-quantised operators in the spin-orbital basis.
//!
//! Spin orbitals are ordered with all α orbitals first, then all β orbitals,
//! so spatial orbital `i` owns modes `i` and `i + n`. An operator is stored as
//!
//! `H = Σ h1[p,q] a†_p a_q + ½ Σ h2[p,q,r,s] a†_p a†_r a_s a_q`
//!
//! where `h2` follows chemists' index order `(pq|rs)`.

use ndarray::{Array2, Array4};
use tracing::debug;

use crate::driver::ElectronicStructure;
use crate::error::{ChemError, ChemResult};

/// A number-conserving fermionic operator with one- and two-body parts.
#[derive(Debug, Clone, PartialEq)]
pub struct FermionicOperator {
    h1: Array2<f64>,
    h2: Array4<f64>,
}

impl FermionicOperator {
    /// Build from spin-orbital tensors.
    ///
    /// # Panics
    ///
    /// Panics if the tensor shapes disagree.
    pub fn new(h1: Array2<f64>, h2: Array4<f64>) -> Self {
        let n = h1.nrows();
        assert_eq!(h1.dim(), (n, n), "h1 must be square");
        assert_eq!(h2.dim(), (n, n, n, n), "h2 must match h1");
        Self { h1, h2 }
    }

    /// Expand spatial-orbital integrals to spin orbitals.
    pub fn from_spatial(h1: &Array2<f64>, h2: &Array4<f64>) -> Self {
        let n = h1.nrows();
        let modes = 2 * n;
        let mut sh1 = Array2::zeros((modes, modes));
        let mut sh2 = Array4::zeros((modes, modes, modes, modes));
        for spin_a in [0, n] {
            for p in 0..n {
                for q in 0..n {
                    sh1[[p + spin_a, q + spin_a]] = h1[[p, q]];
                }
            }
            for spin_b in [0, n] {
                for p in 0..n {
                    for q in 0..n {
                        for r in 0..n {
                            for s in 0..n {
                                sh2[[p + spin_a, q + spin_a, r + spin_b, s + spin_b]] =
                                    h2[[p, q, r, s]];
                            }
                        }
                    }
                }
            }
        }
        Self { h1: sh1, h2: sh2 }
    }

    /// Number of spin orbitals.
    pub fn num_modes(&self) -> usize {
        self.h1.nrows()
    }

    /// One-body coefficients.
    pub fn one_body(&self) -> &Array2<f64> {
        &self.h1
    }

    /// Two-body coefficients.
    pub fn two_body(&self) -> &Array4<f64> {
        &self.h2
    }

    /// Particle number `N = Σ_p a†_p a_p`.
    pub fn particle_number(num_modes: usize) -> Self {
        Self {
            h1: Array2::eye(num_modes),
            h2: Array4::zeros((num_modes, num_modes, num_modes, num_modes)),
        }
    }

    /// Magnetisation `S_z = ½ Σ_i (n_iα - n_iβ)`.
    pub fn magnetization(num_modes: usize) -> Self {
        let n = num_modes / 2;
        let mut h1 = Array2::zeros((num_modes, num_modes));
        for i in 0..n {
            h1[[i, i]] = 0.5;
            h1[[i + n, i + n]] = -0.5;
        }
        Self {
            h1,
            h2: Array4::zeros((num_modes, num_modes, num_modes, num_modes)),
        }
    }

    /// Total spin `S² = S₋S₊ + S_z + S_z²`.
    pub fn total_spin_squared(num_modes: usize) -> Self {
        let n = num_modes / 2;
        let mut h1 = Array2::zeros((num_modes, num_modes));
        let mut h2 = Array4::zeros((num_modes, num_modes, num_modes, num_modes));
        let weight = |p: usize| if p < n { 0.5 } else { -0.5 };

        // S₋S₊ = Σ_i n_iβ - Σ_ij a†_iβ a†_jα a_iα a_jβ
        for i in 0..n {
            h1[[i + n, i + n]] += 1.0;
            for j in 0..n {
                h2[[i + n, j + n, j, i]] -= 1.0;
                h2[[j, i, i + n, j + n]] -= 1.0;
            }
        }
        // S_z + S_z², with n_p n_q = δ_pq n_p + a†_p a†_q a_q a_p
        for p in 0..num_modes {
            h1[[p, p]] += weight(p) + 0.25;
            for q in 0..num_modes {
                if p != q {
                    h2[[p, p, q, q]] += 2.0 * weight(p) * weight(q);
                }
            }
        }
        Self { h1, h2 }
    }
}

/// Partition of the spatial orbitals after active-space reduction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveSpace {
    /// Doubly occupied orbitals folded into an energy shift.
    pub frozen: Vec<usize>,
    /// Virtual orbitals dropped entirely.
    pub removed: Vec<usize>,
    /// Orbitals kept, in ascending order.
    pub active: Vec<usize>,
}

impl ActiveSpace {
    /// Resolve `freeze_core` and `orbital_reduction` against the orbitals.
    ///
    /// `orbital_reduction` entries may be negative to count from the end.
    /// Occupied entries are frozen, virtual entries removed.
    pub fn resolve(
        num_orbitals: usize,
        num_occupied: usize,
        core_orbitals: usize,
        orbital_reduction: &[i64],
    ) -> ChemResult<Self> {
        let mut frozen: Vec<usize> = (0..core_orbitals.min(num_occupied)).collect();
        let mut removed = Vec::new();
        for &entry in orbital_reduction {
            let idx = if entry < 0 {
                num_orbitals as i64 + entry
            } else {
                entry
            };
            if idx < 0 || idx >= num_orbitals as i64 {
                return Err(ChemError::OrbitalIndex {
                    index: entry,
                    num_orbitals,
                });
            }
            let idx = idx as usize;
            if idx < num_occupied {
                frozen.push(idx);
            } else {
                removed.push(idx);
            }
        }
        frozen.sort_unstable();
        frozen.dedup();
        removed.sort_unstable();
        removed.dedup();
        let active = (0..num_orbitals)
            .filter(|i| !frozen.contains(i) && !removed.contains(i))
            .collect();
        Ok(Self {
            frozen,
            removed,
            active,
        })
    }

    /// Number of active spatial orbitals.
    pub fn num_active(&self) -> usize {
        self.active.len()
    }
}

/// Spatial-orbital integrals restricted to an active space.
#[derive(Debug, Clone)]
pub struct ActiveIntegrals {
    /// Effective one-body integrals over active orbitals.
    pub one_body: Array2<f64>,
    /// Two-body integrals over active orbitals.
    pub two_body: Array4<f64>,
    /// Energy of the frozen doubly occupied orbitals.
    pub energy_shift: f64,
}

/// Fold frozen orbitals into an energy shift and an effective one-body term.
///
/// `E_core = Σ_i 2h_ii + Σ_ij (2(ii|jj) - (ij|ji))` and
/// `h'_pq = h_pq + Σ_i (2(pq|ii) - (pi|iq))`, with `i, j` frozen.
pub fn reduce_to_active(es: &ElectronicStructure, space: &ActiveSpace) -> ActiveIntegrals {
    let h = &es.mo_one_body;
    let g = &es.mo_two_body;
    let frozen = &space.frozen;

    let mut energy_shift = 0.0;
    for &i in frozen {
        energy_shift += 2.0 * h[[i, i]];
        for &j in frozen {
            energy_shift += 2.0 * g[[i, i, j, j]] - g[[i, j, j, i]];
        }
    }

    let m = space.num_active();
    let mut one_body = Array2::zeros((m, m));
    let mut two_body = Array4::zeros((m, m, m, m));
    for (a, &p) in space.active.iter().enumerate() {
        for (b, &q) in space.active.iter().enumerate() {
            let mut value = h[[p, q]];
            for &i in frozen {
                value += 2.0 * g[[p, q, i, i]] - g[[p, i, i, q]];
            }
            one_body[[a, b]] = value;
            for (c, &r) in space.active.iter().enumerate() {
                for (d, &s) in space.active.iter().enumerate() {
                    two_body[[a, b, c, d]] = g[[p, q, r, s]];
                }
            }
        }
    }
    debug!(
        frozen = ?space.frozen,
        removed = ?space.removed,
        active = m,
        energy_shift,
        "active space reduced"
    );

    ActiveIntegrals {
        one_body,
        two_body,
        energy_shift,
    }
}
