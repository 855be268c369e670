//! Fermion-to-qubit mappings.
//!
//! All three encodings are expressed through the update, parity and flip
//! sets of each mode, giving the ladder operator
//!
//! `a†_j = ½ (X_U X_j Z_P - i X_U Y_j Z_R)` with `R = P \ F`.
//!
//! Jordan-Wigner stores occupations, the parity encoding stores prefix
//! parities, and Bravyi-Kitaev stores Fenwick-tree partial sums.

use num_complex::Complex64;
use qadapt_ir::{PauliString, SparsePauliOp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{ChemError, ChemResult};
use crate::fermion::FermionicOperator;

/// Coefficients below this are dropped from mapped operators.
const MAPPING_TOLERANCE: f64 = 1e-12;

/// Fermion-to-qubit encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QubitMapping {
    /// Qubit `j` holds the occupation of mode `j`.
    JordanWigner,
    /// Qubit `j` holds the parity of modes `0..=j`.
    #[default]
    Parity,
    /// Qubit `j` holds the parity of a Fenwick-tree range ending at `j`.
    BravyiKitaev,
}

impl FromStr for QubitMapping {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "jordan_wigner" | "jw" => Ok(Self::JordanWigner),
            "parity" => Ok(Self::Parity),
            "bravyi_kitaev" | "bk" => Ok(Self::BravyiKitaev),
            _ => Err(ChemError::UnknownMapping(s.to_string())),
        }
    }
}

impl fmt::Display for QubitMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::JordanWigner => "jordan_wigner",
            Self::Parity => "parity",
            Self::BravyiKitaev => "bravyi_kitaev",
        };
        f.write_str(name)
    }
}

fn bits(indices: &[usize]) -> u64 {
    indices.iter().fold(0, |acc, &k| acc | (1u64 << k))
}

impl QubitMapping {
    /// Qubits other than `j` whose value changes when mode `j` flips.
    pub fn update_set(&self, j: usize, num_modes: usize) -> Vec<usize> {
        match self {
            Self::JordanWigner => Vec::new(),
            Self::Parity => (j + 1..num_modes).collect(),
            Self::BravyiKitaev => {
                let mut set = Vec::new();
                let mut k = j | (j + 1);
                while k < num_modes {
                    set.push(k);
                    k |= k + 1;
                }
                set
            }
        }
    }

    /// Qubits whose combined value is the parity of modes `0..j`.
    pub fn parity_set(&self, j: usize) -> Vec<usize> {
        match self {
            Self::JordanWigner => (0..j).collect(),
            Self::Parity => j.checked_sub(1).into_iter().collect(),
            Self::BravyiKitaev => {
                let mut set = Vec::new();
                let mut k = j as i64 - 1;
                while k >= 0 {
                    set.push(k as usize);
                    k = (k & (k + 1)) - 1;
                }
                set
            }
        }
    }

    /// Qubits that, together with qubit `j`, determine the occupation of mode `j`.
    pub fn flip_set(&self, j: usize) -> Vec<usize> {
        match self {
            Self::JordanWigner => Vec::new(),
            Self::Parity => j.checked_sub(1).into_iter().collect(),
            Self::BravyiKitaev => {
                let floor = (j & (j + 1)) as i64;
                let mut set = Vec::new();
                let mut k = j as i64 - 1;
                while k >= floor {
                    set.push(k as usize);
                    k = (k & (k + 1)) - 1;
                }
                set
            }
        }
    }

    /// Creation operator `a†_j` on `num_modes` qubits.
    pub fn creation(&self, j: usize, num_modes: usize) -> ChemResult<SparsePauliOp> {
        if j >= num_modes {
            return Err(ChemError::OrbitalIndex {
                index: j as i64,
                num_orbitals: num_modes,
            });
        }
        let update = bits(&self.update_set(j, num_modes));
        let parity = self.parity_set(j);
        let flip = self.flip_set(j);
        let remainder: Vec<usize> = parity.iter().copied().filter(|k| !flip.contains(k)).collect();
        let own = 1u64 << j;

        let real = PauliString::from_masks(num_modes, update | own, bits(&parity))?;
        let imag = PauliString::from_masks(num_modes, update | own, bits(&remainder) | own)?;
        Ok(SparsePauliOp::from_terms(
            num_modes,
            [(real, Complex64::new(0.5, 0.0)), (imag, Complex64::new(0.0, -0.5))],
        )?)
    }

    /// Annihilation operator `a_j`.
    pub fn annihilation(&self, j: usize, num_modes: usize) -> ChemResult<SparsePauliOp> {
        Ok(self.creation(j, num_modes)?.adjoint())
    }

    /// Encode mode occupations as qubit values.
    pub fn encode_occupation(&self, occupation: &[bool]) -> Vec<bool> {
        let n = occupation.len();
        match self {
            Self::JordanWigner => occupation.to_vec(),
            Self::Parity => occupation
                .iter()
                .scan(false, |acc, &o| {
                    *acc ^= o;
                    Some(*acc)
                })
                .collect(),
            Self::BravyiKitaev => (0..n)
                .map(|k| occupation[(k & (k + 1))..=k].iter().fold(false, |a, &o| a ^ o))
                .collect(),
        }
    }

    /// Map a fermionic operator to a qubit operator, simplified.
    ///
    /// Uses `a†_p a†_r a_s a_q = E_pq E_rs - δ_qr E_ps` with `E_pq = a†_p a_q`.
    pub fn map(&self, op: &FermionicOperator) -> ChemResult<SparsePauliOp> {
        let m = op.num_modes();
        let h1 = op.one_body();
        let h2 = op.two_body();

        let creators = (0..m)
            .map(|j| self.creation(j, m))
            .collect::<ChemResult<Vec<_>>>()?;
        let mut excitations = Vec::with_capacity(m * m);
        for p in 0..m {
            for q in 0..m {
                excitations.push(creators[p].compose(&creators[q].adjoint())?);
            }
        }
        let e = |p: usize, q: usize| &excitations[p * m + q];

        let mut acc: Vec<(PauliString, Complex64)> = Vec::new();
        let mut axpy = |op: &SparsePauliOp, coeff: f64| {
            if coeff.abs() > MAPPING_TOLERANCE {
                acc.extend(op.terms().iter().map(|(p, c)| (*p, *c * coeff)));
            }
        };

        for p in 0..m {
            for q in 0..m {
                axpy(e(p, q), h1[[p, q]]);

                let mut inner: Vec<(PauliString, Complex64)> = Vec::new();
                for r in 0..m {
                    for s in 0..m {
                        let coeff = h2[[p, q, r, s]];
                        if coeff.abs() > MAPPING_TOLERANCE {
                            inner.extend(e(r, s).terms().iter().map(|(ps, c)| (*ps, *c * coeff)));
                        }
                    }
                }
                if !inner.is_empty() {
                    let inner = SparsePauliOp::from_terms(m, inner)?.simplify(MAPPING_TOLERANCE);
                    axpy(&e(p, q).compose(&inner)?, 0.5);
                }
            }
        }
        for p in 0..m {
            for s in 0..m {
                let contraction: f64 = (0..m).map(|q| h2[[p, q, q, s]]).sum();
                axpy(e(p, s), -0.5 * contraction);
            }
        }

        let mapped = SparsePauliOp::from_terms(m, acc)?.simplify(MAPPING_TOLERANCE);
        debug!(mapping = %self, modes = m, terms = mapped.num_terms(), "fermionic operator mapped");
        Ok(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qadapt_ir::DEFAULT_TOLERANCE;

    const ALL: [QubitMapping; 3] = [
        QubitMapping::JordanWigner,
        QubitMapping::Parity,
        QubitMapping::BravyiKitaev,
    ];

    fn anticommutator(a: &SparsePauliOp, b: &SparsePauliOp) -> SparsePauliOp {
        let ab = a.compose(b).unwrap();
        let ba = b.compose(a).unwrap();
        ab.add(&ba).unwrap().simplify(DEFAULT_TOLERANCE)
    }

    #[test]
    fn test_canonical_anticommutation() {
        let n = 6;
        for mapping in ALL {
            for i in 0..n {
                let ci = mapping.creation(i, n).unwrap();
                for j in 0..n {
                    let aj = mapping.annihilation(j, n).unwrap();
                    let cj = mapping.creation(j, n).unwrap();
                    let mixed = anticommutator(&ci, &aj);
                    if i == j {
                        assert_eq!(mixed.num_terms(), 1, "{mapping}: {{a†_{i}, a_{j}}}");
                        assert!(mixed.terms()[0].0.is_identity());
                        assert_relative_eq!(mixed.terms()[0].1.re, 1.0, epsilon = 1e-12);
                    } else {
                        assert!(mixed.is_empty(), "{mapping}: {{a†_{i}, a_{j}}} != 0");
                    }
                    assert!(anticommutator(&ci, &cj).is_empty());
                }
            }
        }
    }

    #[test]
    fn test_bravyi_kitaev_sets() {
        let bk = QubitMapping::BravyiKitaev;
        assert_eq!(bk.update_set(0, 8), vec![1, 3, 7]);
        assert_eq!(bk.parity_set(6), vec![5, 3]);
        assert_eq!(bk.flip_set(7), vec![6, 5, 3]);
        assert_eq!(bk.flip_set(4), Vec::<usize>::new());
    }

    #[test]
    fn test_encode_occupation() {
        let occ = [true, false, true, false];
        assert_eq!(QubitMapping::JordanWigner.encode_occupation(&occ), occ.to_vec());
        assert_eq!(
            QubitMapping::Parity.encode_occupation(&occ),
            vec![true, true, false, false]
        );
        assert_eq!(
            QubitMapping::BravyiKitaev.encode_occupation(&occ),
            vec![true, true, true, false]
        );
    }

    #[test]
    fn test_number_operator_is_diagonal() {
        // N maps to (n/2)·I - ½ Σ Z_j under Jordan-Wigner
        let op = FermionicOperator::particle_number(4);
        let mapped = QubitMapping::JordanWigner.map(&op).unwrap();
        assert_eq!(mapped.num_terms(), 5);
        assert_relative_eq!(mapped.identity_coefficient().re, 2.0, epsilon = 1e-12);
        assert!(mapped.terms().iter().all(|(p, _)| p.x_mask() == 0));
    }

    #[test]
    fn test_parse_mapping() {
        assert_eq!("Parity".parse::<QubitMapping>().unwrap(), QubitMapping::Parity);
        assert_eq!(
            "bravyi-kitaev".parse::<QubitMapping>().unwrap(),
            QubitMapping::BravyiKitaev
        );
        assert!("majorana".parse::<QubitMapping>().is_err());
        assert_eq!(QubitMapping::JordanWigner.to_string(), "jordan_wigner");
    }
}
