//! Pauli strings and sparse Pauli operators.
//!
//! A [`PauliString`] stores one bit per qubit in an X mask and a Z mask. The
//! string with masks `(x, z)` denotes the operator `i^{|x & z|} X^x Z^z`, so
//! every qubit carries exactly one of I, X, Y or Z with no extra phase.
//! Products of strings pick up a power of `i`, which [`PauliString::compose`]
//! reports alongside the product.

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::error::{IrError, IrResult};

/// Maximum width of a Pauli string.
pub const MAX_PAULI_QUBITS: usize = 64;

/// Coefficients below this magnitude are dropped by default.
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity.
    I,
    /// Pauli X.
    X,
    /// Pauli Y.
    Y,
    /// Pauli Z.
    Z,
}

impl Pauli {
    /// Parse a single label character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'I' | 'i' => Some(Pauli::I),
            'X' | 'x' => Some(Pauli::X),
            'Y' | 'y' => Some(Pauli::Y),
            'Z' | 'z' => Some(Pauli::Z),
            _ => None,
        }
    }

    /// Label character.
    pub fn as_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    #[inline]
    fn bits(self) -> (bool, bool) {
        match self {
            Pauli::I => (false, false),
            Pauli::X => (true, false),
            Pauli::Y => (true, true),
            Pauli::Z => (false, true),
        }
    }
}

/// `i^k` as a complex number.
#[inline]
pub fn i_pow(k: u8) -> Complex64 {
    match k % 4 {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    }
}

#[inline]
fn width_mask(num_qubits: u32) -> u64 {
    if num_qubits as usize >= MAX_PAULI_QUBITS {
        u64::MAX
    } else {
        (1u64 << num_qubits) - 1
    }
}

/// A tensor product of single-qubit Paulis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PauliString {
    num_qubits: u32,
    x: u64,
    z: u64,
}

impl PauliString {
    /// The identity on `num_qubits` qubits.
    pub fn identity(num_qubits: usize) -> IrResult<Self> {
        if num_qubits > MAX_PAULI_QUBITS {
            return Err(IrError::TooManyQubits {
                requested: num_qubits,
                max: MAX_PAULI_QUBITS,
            });
        }
        Ok(Self {
            num_qubits: num_qubits as u32,
            x: 0,
            z: 0,
        })
    }

    /// Build a string directly from its masks. Bits above `num_qubits` are ignored.
    pub fn from_masks(num_qubits: usize, x: u64, z: u64) -> IrResult<Self> {
        let mut p = Self::identity(num_qubits)?;
        let mask = width_mask(p.num_qubits);
        p.x = x & mask;
        p.z = z & mask;
        Ok(p)
    }

    /// Parse a label such as `"IXYZ"`. The leftmost character acts on the
    /// highest qubit.
    pub fn from_label(label: &str) -> IrResult<Self> {
        let chars: Vec<char> = label.chars().collect();
        let mut p = Self::identity(chars.len())?;
        for (pos, c) in chars.iter().rev().enumerate() {
            let pauli =
                Pauli::from_char(*c).ok_or_else(|| IrError::InvalidPauliLabel(label.into()))?;
            p.set(pos, pauli);
        }
        Ok(p)
    }

    /// Build a string from `(qubit, Pauli)` pairs; unlisted qubits are I.
    pub fn from_ops(num_qubits: usize, ops: &[(usize, Pauli)]) -> IrResult<Self> {
        let mut p = Self::identity(num_qubits)?;
        for &(q, pauli) in ops {
            if q >= num_qubits {
                return Err(IrError::WidthMismatch {
                    left: num_qubits,
                    right: q + 1,
                });
            }
            p.set(q, pauli);
        }
        Ok(p)
    }

    /// Set the Pauli acting on `qubit`.
    ///
    /// # Panics
    ///
    /// Panics if `qubit >= num_qubits`.
    pub fn set(&mut self, qubit: usize, pauli: Pauli) {
        assert!(qubit < self.num_qubits as usize, "qubit out of range");
        let bit = 1u64 << qubit;
        let (xb, zb) = pauli.bits();
        self.x = if xb { self.x | bit } else { self.x & !bit };
        self.z = if zb { self.z | bit } else { self.z & !bit };
    }

    /// The Pauli acting on `qubit`.
    pub fn get(&self, qubit: usize) -> Pauli {
        let bit = 1u64 << qubit;
        match (self.x & bit != 0, self.z & bit != 0) {
            (false, false) => Pauli::I,
            (true, false) => Pauli::X,
            (true, true) => Pauli::Y,
            (false, true) => Pauli::Z,
        }
    }

    /// Number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// X mask.
    #[inline]
    pub fn x_mask(&self) -> u64 {
        self.x
    }

    /// Z mask.
    #[inline]
    pub fn z_mask(&self) -> u64 {
        self.z
    }

    /// Number of non-identity factors.
    #[inline]
    pub fn weight(&self) -> u32 {
        (self.x | self.z).count_ones()
    }

    /// True for the identity string.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.x == 0 && self.z == 0
    }

    /// Number of Y factors, which is the power of `i` hidden in `X^x Z^z`.
    #[inline]
    fn y_count(&self) -> u32 {
        (self.x & self.z).count_ones()
    }

    /// Multiply `self · other`.
    ///
    /// Returns `(k, p)` with `self · other = i^k · p`.
    pub fn compose(&self, other: &PauliString) -> IrResult<(u8, PauliString)> {
        self.check_width(other)?;
        let x = self.x ^ other.x;
        let z = self.z ^ other.z;
        let product = PauliString {
            num_qubits: self.num_qubits,
            x,
            z,
        };
        let swaps = (self.z & other.x).count_ones();
        let k = i64::from(self.y_count()) + i64::from(other.y_count())
            - i64::from(product.y_count())
            + 2 * i64::from(swaps);
        Ok((k.rem_euclid(4) as u8, product))
    }

    /// True if the two strings commute.
    #[inline]
    pub fn commutes(&self, other: &PauliString) -> bool {
        ((self.x & other.z).count_ones() + (self.z & other.x).count_ones()) % 2 == 0
    }

    /// Apply the string to the computational basis state `|index⟩`.
    ///
    /// Returns `(j, k)` with `P|index⟩ = i^k |j⟩`.
    #[inline]
    pub fn apply_to_basis(&self, index: usize) -> (usize, u8) {
        let b = index as u64;
        let sign = (self.z & b).count_ones() % 2;
        let k = (self.y_count() + 2 * sign) % 4;
        ((b ^ self.x) as usize, k as u8)
    }

    /// Remove `qubit`, shifting the higher qubits down by one.
    pub fn remove_qubit(&self, qubit: usize) -> IrResult<PauliString> {
        if qubit >= self.num_qubits() {
            return Err(IrError::WidthMismatch {
                left: self.num_qubits(),
                right: qubit + 1,
            });
        }
        let low = (1u64 << qubit) - 1;
        let squeeze = |m: u64| (m & low) | ((m >> 1) & !low);
        Ok(PauliString {
            num_qubits: self.num_qubits - 1,
            x: squeeze(self.x),
            z: squeeze(self.z),
        })
    }

    /// Label with the highest qubit first.
    pub fn label(&self) -> String {
        (0..self.num_qubits())
            .rev()
            .map(|q| self.get(q).as_char())
            .collect()
    }

    fn check_width(&self, other: &PauliString) -> IrResult<()> {
        if self.num_qubits != other.num_qubits {
            return Err(IrError::WidthMismatch {
                left: self.num_qubits(),
                right: other.num_qubits(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A linear combination of Pauli strings with complex coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparsePauliOp {
    num_qubits: usize,
    terms: Vec<(PauliString, Complex64)>,
}

impl SparsePauliOp {
    /// The zero operator on `num_qubits` qubits.
    pub fn zero(num_qubits: usize) -> IrResult<Self> {
        PauliString::identity(num_qubits)?;
        Ok(Self {
            num_qubits,
            terms: Vec::new(),
        })
    }

    /// `coeff · I` on `num_qubits` qubits.
    pub fn identity(num_qubits: usize, coeff: Complex64) -> IrResult<Self> {
        Ok(Self {
            num_qubits,
            terms: vec![(PauliString::identity(num_qubits)?, coeff)],
        })
    }

    /// Build from explicit terms. All strings must have width `num_qubits`.
    pub fn from_terms(
        num_qubits: usize,
        terms: impl IntoIterator<Item = (PauliString, Complex64)>,
    ) -> IrResult<Self> {
        let mut op = Self::zero(num_qubits)?;
        for (p, c) in terms {
            op.add_term(p, c)?;
        }
        Ok(op)
    }

    /// Build from `(label, coeff)` pairs.
    pub fn from_labels(labels: &[(&str, Complex64)]) -> IrResult<Self> {
        let Some((first, _)) = labels.first() else {
            return Self::zero(0);
        };
        let mut op = Self::zero(first.chars().count())?;
        for (label, c) in labels {
            op.add_term(PauliString::from_label(label)?, *c)?;
        }
        Ok(op)
    }

    /// Append a single term without merging.
    pub fn add_term(&mut self, pauli: PauliString, coeff: Complex64) -> IrResult<()> {
        if pauli.num_qubits() != self.num_qubits {
            return Err(IrError::WidthMismatch {
                left: self.num_qubits,
                right: pauli.num_qubits(),
            });
        }
        self.terms.push((pauli, coeff));
        Ok(())
    }

    /// Number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of stored terms.
    #[inline]
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// True if no terms are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Stored terms.
    #[inline]
    pub fn terms(&self) -> &[(PauliString, Complex64)] {
        &self.terms
    }

    /// Coefficient of the identity string (after merging duplicates).
    pub fn identity_coefficient(&self) -> Complex64 {
        self.terms
            .iter()
            .filter(|(p, _)| p.is_identity())
            .map(|(_, c)| *c)
            .sum()
    }

    /// Sum of two operators.
    pub fn add(&self, other: &SparsePauliOp) -> IrResult<SparsePauliOp> {
        self.check_width(other)?;
        let mut terms = self.terms.clone();
        terms.extend_from_slice(&other.terms);
        Ok(SparsePauliOp {
            num_qubits: self.num_qubits,
            terms,
        })
    }

    /// Multiply every coefficient by `factor`.
    pub fn scale(&self, factor: Complex64) -> SparsePauliOp {
        SparsePauliOp {
            num_qubits: self.num_qubits,
            terms: self.terms.iter().map(|(p, c)| (*p, c * factor)).collect(),
        }
    }

    /// Operator product `self · other`, simplified.
    pub fn compose(&self, other: &SparsePauliOp) -> IrResult<SparsePauliOp> {
        self.check_width(other)?;
        let mut terms = Vec::with_capacity(self.terms.len() * other.terms.len());
        for (p1, c1) in &self.terms {
            for (p2, c2) in &other.terms {
                let (k, p) = p1.compose(p2)?;
                terms.push((p, c1 * c2 * i_pow(k)));
            }
        }
        Ok(SparsePauliOp {
            num_qubits: self.num_qubits,
            terms,
        }
        .simplify(DEFAULT_TOLERANCE))
    }

    /// Hermitian conjugate.
    pub fn adjoint(&self) -> SparsePauliOp {
        SparsePauliOp {
            num_qubits: self.num_qubits,
            terms: self.terms.iter().map(|(p, c)| (*p, c.conj())).collect(),
        }
    }

    /// Commutator `[self, other] = self·other − other·self`.
    ///
    /// Only anticommuting string pairs contribute, each with twice its product.
    pub fn commutator(&self, other: &SparsePauliOp) -> IrResult<SparsePauliOp> {
        self.check_width(other)?;
        let mut terms = Vec::new();
        for (p1, c1) in &self.terms {
            for (p2, c2) in &other.terms {
                if p1.commutes(p2) {
                    continue;
                }
                let (k, p) = p1.compose(p2)?;
                terms.push((p, c1 * c2 * i_pow(k) * 2.0));
            }
        }
        Ok(SparsePauliOp {
            num_qubits: self.num_qubits,
            terms,
        }
        .simplify(DEFAULT_TOLERANCE))
    }

    /// Merge duplicate strings and drop coefficients with `|c| <= tol`.
    ///
    /// Terms keep the order of first appearance.
    pub fn simplify(&self, tol: f64) -> SparsePauliOp {
        let mut index: FxHashMap<PauliString, usize> = FxHashMap::default();
        let mut merged: Vec<(PauliString, Complex64)> = Vec::with_capacity(self.terms.len());
        for (p, c) in &self.terms {
            match index.get(p) {
                Some(&i) => merged[i].1 += *c,
                None => {
                    index.insert(*p, merged.len());
                    merged.push((*p, *c));
                }
            }
        }
        merged.retain(|(_, c)| c.norm() > tol);
        SparsePauliOp {
            num_qubits: self.num_qubits,
            terms: merged,
        }
    }

    /// True if every merged coefficient is real within `tol`.
    pub fn is_hermitian(&self, tol: f64) -> bool {
        self.simplify(tol).terms.iter().all(|(_, c)| c.im.abs() <= tol)
    }

    /// Merged terms with real coefficients, for Hermitian operators.
    pub fn real_terms(&self, tol: f64) -> IrResult<Vec<(PauliString, f64)>> {
        let merged = self.simplify(tol);
        let worst = merged
            .terms
            .iter()
            .map(|(_, c)| c.im.abs())
            .fold(0.0, f64::max);
        if worst > tol {
            return Err(IrError::NonHermitianGenerator(worst));
        }
        Ok(merged.terms.iter().map(|(p, c)| (*p, c.re)).collect())
    }

    /// Largest coefficient magnitude.
    pub fn max_abs_coefficient(&self) -> f64 {
        self.terms.iter().map(|(_, c)| c.norm()).fold(0.0, f64::max)
    }

    fn check_width(&self, other: &SparsePauliOp) -> IrResult<()> {
        if self.num_qubits != other.num_qubits {
            return Err(IrError::WidthMismatch {
                left: self.num_qubits,
                right: other.num_qubits,
            });
        }
        Ok(())
    }
}

impl fmt::Display for SparsePauliOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, (p, c)) in self.terms.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if c.im == 0.0 {
                write!(f, "{:+.8} * {p}", c.re)?;
            } else {
                write!(f, "({:+.8}{:+.8}i) * {p}", c.re, c.im)?;
            }
        }
        Ok(())
    }
}

// Operator sugar for same-width operands. Width mismatches are programming
// errors here; use the fallible methods when widths come from user input.

impl Add for &SparsePauliOp {
    type Output = SparsePauliOp;

    fn add(self, rhs: Self) -> SparsePauliOp {
        assert_eq!(self.num_qubits, rhs.num_qubits, "operator width mismatch");
        let mut terms = self.terms.clone();
        terms.extend_from_slice(&rhs.terms);
        SparsePauliOp {
            num_qubits: self.num_qubits,
            terms,
        }
    }
}

impl Sub for &SparsePauliOp {
    type Output = SparsePauliOp;

    fn sub(self, rhs: Self) -> SparsePauliOp {
        self + &(-rhs)
    }
}

impl Neg for &SparsePauliOp {
    type Output = SparsePauliOp;

    fn neg(self) -> SparsePauliOp {
        self.scale(Complex64::new(-1.0, 0.0))
    }
}

impl Mul<Complex64> for &SparsePauliOp {
    type Output = SparsePauliOp;

    fn mul(self, rhs: Complex64) -> SparsePauliOp {
        self.scale(rhs)
    }
}
