//! One- and two-electron integrals over contracted Gaussians.
//!
//! McMurchie–Davidson scheme: products of Cartesian Gaussians are expanded in
//! Hermite Gaussians with coefficients `E^{ij}_t`, and Coulomb-type integrals
//! reduce to the auxiliary integrals `R_{tuv}` built on the Boys function.

use nalgebra::Vector3;
use ndarray::{Array2, Array4};
use std::f64::consts::PI;
use tracing::debug;

use crate::basis::ContractedGaussian;
use crate::molecule::Molecule;

/// Boys function `F_n(T) = ∫_0^1 t^{2n} exp(-T t²) dt`.
pub fn boys(n: u32, t: f64) -> f64 {
    let two_n1 = f64::from(2 * n + 1);
    if t < 1e-10 {
        return 1.0 / two_n1;
    }
    if t > 30.0 {
        // (2n-1)!! / 2^{n+1} · sqrt(π / T^{2n+1})
        let mut df = 1.0;
        let mut k = 2 * i64::from(n) - 1;
        while k > 1 {
            df *= k as f64;
            k -= 2;
        }
        return df / 2f64.powi(n as i32 + 1) * (PI / t.powf(two_n1)).sqrt();
    }
    // e^{-T} Σ_k (2T)^k / [(2n+1)(2n+3)…(2n+2k+1)]
    let mut term = 1.0 / two_n1;
    let mut sum = term;
    let mut denom = two_n1;
    for _ in 0..500 {
        denom += 2.0;
        term *= 2.0 * t / denom;
        sum += term;
        if term < 1e-17 * sum {
            break;
        }
    }
    (-t).exp() * sum
}

/// Hermite expansion coefficient `E^{ij}_t` along one axis.
///
/// `qx` is `A_x - B_x`, `a` and `b` the primitive exponents.
pub fn hermite_e(i: i32, j: i32, t: i32, qx: f64, a: f64, b: f64) -> f64 {
    let p = a + b;
    let q = a * b / p;
    if t < 0 || t > i + j || i < 0 || j < 0 {
        0.0
    } else if i == 0 && j == 0 && t == 0 {
        (-q * qx * qx).exp()
    } else if j == 0 {
        (1.0 / (2.0 * p)) * hermite_e(i - 1, j, t - 1, qx, a, b)
            - (q * qx / a) * hermite_e(i - 1, j, t, qx, a, b)
            + f64::from(t + 1) * hermite_e(i - 1, j, t + 1, qx, a, b)
    } else {
        (1.0 / (2.0 * p)) * hermite_e(i, j - 1, t - 1, qx, a, b)
            + (q * qx / b) * hermite_e(i, j - 1, t, qx, a, b)
            + f64::from(t + 1) * hermite_e(i, j - 1, t + 1, qx, a, b)
    }
}

/// Hermite Coulomb auxiliary integral `R^n_{tuv}(p, PC)`.
#[allow(clippy::many_single_char_names)]
pub fn hermite_r(t: i32, u: i32, v: i32, n: u32, p: f64, pc: &Vector3<f64>) -> f64 {
    if t < 0 || u < 0 || v < 0 {
        return 0.0;
    }
    if t == 0 && u == 0 && v == 0 {
        let big_t = p * pc.norm_squared();
        return (-2.0 * p).powi(n as i32) * boys(n, big_t);
    }
    if t == 0 && u == 0 {
        let mut val = pc.z * hermite_r(t, u, v - 1, n + 1, p, pc);
        if v > 1 {
            val += f64::from(v - 1) * hermite_r(t, u, v - 2, n + 1, p, pc);
        }
        val
    } else if t == 0 {
        let mut val = pc.y * hermite_r(t, u - 1, v, n + 1, p, pc);
        if u > 1 {
            val += f64::from(u - 1) * hermite_r(t, u - 2, v, n + 1, p, pc);
        }
        val
    } else {
        let mut val = pc.x * hermite_r(t - 1, u, v, n + 1, p, pc);
        if t > 1 {
            val += f64::from(t - 1) * hermite_r(t - 2, u, v, n + 1, p, pc);
        }
        val
    }
}

type Powers = [i32; 3];

fn powers(angular: [u32; 3]) -> Powers {
    [angular[0] as i32, angular[1] as i32, angular[2] as i32]
}

fn gaussian_product_center(a: f64, ra: &Vector3<f64>, b: f64, rb: &Vector3<f64>) -> Vector3<f64> {
    (ra * a + rb * b) / (a + b)
}

fn overlap_primitive(a: f64, la: Powers, ra: &Vector3<f64>, b: f64, lb: Powers, rb: &Vector3<f64>) -> f64 {
    let d = ra - rb;
    let sx = hermite_e(la[0], lb[0], 0, d.x, a, b);
    let sy = hermite_e(la[1], lb[1], 0, d.y, a, b);
    let sz = hermite_e(la[2], lb[2], 0, d.z, a, b);
    sx * sy * sz * (PI / (a + b)).powf(1.5)
}

fn kinetic_primitive(a: f64, la: Powers, ra: &Vector3<f64>, b: f64, lb: Powers, rb: &Vector3<f64>) -> f64 {
    let shifted = |axis: usize, delta: i32| {
        let mut l = lb;
        l[axis] += delta;
        if l[axis] < 0 {
            0.0
        } else {
            overlap_primitive(a, la, ra, b, l, rb)
        }
    };
    let total = f64::from(lb[0] + lb[1] + lb[2]);
    let term0 = b * (2.0 * total + 3.0) * overlap_primitive(a, la, ra, b, lb, rb);
    let term1 = -2.0 * b * b * (shifted(0, 2) + shifted(1, 2) + shifted(2, 2));
    let term2 = -0.5
        * (0..3)
            .map(|axis| f64::from(lb[axis] * (lb[axis] - 1)) * shifted(axis, -2))
            .sum::<f64>();
    term0 + term1 + term2
}

fn nuclear_primitive(
    a: f64,
    la: Powers,
    ra: &Vector3<f64>,
    b: f64,
    lb: Powers,
    rb: &Vector3<f64>,
    rc: &Vector3<f64>,
) -> f64 {
    let p = a + b;
    let rp = gaussian_product_center(a, ra, b, rb);
    let pc = rp - rc;
    let d = ra - rb;
    let mut val = 0.0;
    for t in 0..=(la[0] + lb[0]) {
        let ex = hermite_e(la[0], lb[0], t, d.x, a, b);
        for u in 0..=(la[1] + lb[1]) {
            let ey = hermite_e(la[1], lb[1], u, d.y, a, b);
            for v in 0..=(la[2] + lb[2]) {
                let ez = hermite_e(la[2], lb[2], v, d.z, a, b);
                val += ex * ey * ez * hermite_r(t, u, v, 0, p, &pc);
            }
        }
    }
    2.0 * PI / p * val
}

#[allow(clippy::too_many_arguments)]
fn eri_primitive(
    a: f64,
    la: Powers,
    ra: &Vector3<f64>,
    b: f64,
    lb: Powers,
    rb: &Vector3<f64>,
    c: f64,
    lc: Powers,
    rc: &Vector3<f64>,
    d: f64,
    ld: Powers,
    rd: &Vector3<f64>,
) -> f64 {
    let p = a + b;
    let q = c + d;
    let alpha = p * q / (p + q);
    let rp = gaussian_product_center(a, ra, b, rb);
    let rq = gaussian_product_center(c, rc, d, rd);
    let pq = rp - rq;
    let ab = ra - rb;
    let cd = rc - rd;

    let mut val = 0.0;
    for t in 0..=(la[0] + lb[0]) {
        let e1x = hermite_e(la[0], lb[0], t, ab.x, a, b);
        for u in 0..=(la[1] + lb[1]) {
            let e1y = hermite_e(la[1], lb[1], u, ab.y, a, b);
            for v in 0..=(la[2] + lb[2]) {
                let e1z = hermite_e(la[2], lb[2], v, ab.z, a, b);
                let e1 = e1x * e1y * e1z;
                if e1 == 0.0 {
                    continue;
                }
                for tau in 0..=(lc[0] + ld[0]) {
                    let e2x = hermite_e(lc[0], ld[0], tau, cd.x, c, d);
                    for nu in 0..=(lc[1] + ld[1]) {
                        let e2y = hermite_e(lc[1], ld[1], nu, cd.y, c, d);
                        for phi in 0..=(lc[2] + ld[2]) {
                            let e2z = hermite_e(lc[2], ld[2], phi, cd.z, c, d);
                            let sign = if (tau + nu + phi) % 2 == 0 { 1.0 } else { -1.0 };
                            val += e1
                                * sign
                                * e2x
                                * e2y
                                * e2z
                                * hermite_r(t + tau, u + nu, v + phi, 0, alpha, &pq);
                        }
                    }
                }
            }
        }
    }
    2.0 * PI.powf(2.5) / (p * q * (p + q).sqrt()) * val
}

/// Overlap `⟨a|b⟩` of two contracted Gaussians.
pub fn overlap_contracted(fa: &ContractedGaussian, fb: &ContractedGaussian) -> f64 {
    let (la, lb) = (powers(fa.angular), powers(fb.angular));
    let mut s = 0.0;
    for (ea, ca) in fa.exponents.iter().zip(&fa.coefficients) {
        for (eb, cb) in fb.exponents.iter().zip(&fb.coefficients) {
            s += ca * cb * overlap_primitive(*ea, la, &fa.center, *eb, lb, &fb.center);
        }
    }
    s
}

/// Kinetic energy `⟨a|-½∇²|b⟩`.
pub fn kinetic_contracted(fa: &ContractedGaussian, fb: &ContractedGaussian) -> f64 {
    let (la, lb) = (powers(fa.angular), powers(fb.angular));
    let mut s = 0.0;
    for (ea, ca) in fa.exponents.iter().zip(&fa.coefficients) {
        for (eb, cb) in fb.exponents.iter().zip(&fb.coefficients) {
            s += ca * cb * kinetic_primitive(*ea, la, &fa.center, *eb, lb, &fb.center);
        }
    }
    s
}

/// Nuclear attraction `⟨a|-Σ_C Z_C / |r - R_C||b⟩`.
pub fn nuclear_contracted(fa: &ContractedGaussian, fb: &ContractedGaussian, molecule: &Molecule) -> f64 {
    let (la, lb) = (powers(fa.angular), powers(fb.angular));
    let mut s = 0.0;
    for atom in molecule.atoms() {
        let z = f64::from(atom.element.atomic_number());
        for (ea, ca) in fa.exponents.iter().zip(&fa.coefficients) {
            for (eb, cb) in fb.exponents.iter().zip(&fb.coefficients) {
                s -= z
                    * ca
                    * cb
                    * nuclear_primitive(*ea, la, &fa.center, *eb, lb, &fb.center, &atom.position);
            }
        }
    }
    s
}

/// Electron repulsion `(ab|cd)` in chemists' notation.
pub fn eri_contracted(
    fa: &ContractedGaussian,
    fb: &ContractedGaussian,
    fc: &ContractedGaussian,
    fd: &ContractedGaussian,
) -> f64 {
    let (la, lb, lc, ld) = (
        powers(fa.angular),
        powers(fb.angular),
        powers(fc.angular),
        powers(fd.angular),
    );
    let mut s = 0.0;
    for (ea, ca) in fa.exponents.iter().zip(&fa.coefficients) {
        for (eb, cb) in fb.exponents.iter().zip(&fb.coefficients) {
            for (ec, cc) in fc.exponents.iter().zip(&fc.coefficients) {
                for (ed, cd) in fd.exponents.iter().zip(&fd.coefficients) {
                    s += ca
                        * cb
                        * cc
                        * cd
                        * eri_primitive(
                            *ea, la, &fa.center, *eb, lb, &fb.center, *ec, lc, &fc.center, *ed,
                            ld, &fd.center,
                        );
                }
            }
        }
    }
    s
}

/// Atomic-orbital integral tables.
#[derive(Debug, Clone)]
pub struct AoIntegrals {
    /// Overlap matrix `S`.
    pub overlap: Array2<f64>,
    /// Kinetic energy matrix `T`.
    pub kinetic: Array2<f64>,
    /// Nuclear attraction matrix `V`.
    pub nuclear: Array2<f64>,
    /// Electron repulsion tensor `(μν|λσ)`.
    pub eri: Array4<f64>,
}

impl AoIntegrals {
    /// Evaluate every integral over `basis` for the nuclei of `molecule`.
    pub fn compute(basis: &[ContractedGaussian], molecule: &Molecule) -> Self {
        let n = basis.len();
        let mut overlap = Array2::zeros((n, n));
        let mut kinetic = Array2::zeros((n, n));
        let mut nuclear = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                let s = overlap_contracted(&basis[i], &basis[j]);
                let t = kinetic_contracted(&basis[i], &basis[j]);
                let v = nuclear_contracted(&basis[i], &basis[j], molecule);
                overlap[[i, j]] = s;
                overlap[[j, i]] = s;
                kinetic[[i, j]] = t;
                kinetic[[j, i]] = t;
                nuclear[[i, j]] = v;
                nuclear[[j, i]] = v;
            }
        }

        // 8-fold symmetry: (ij|kl) = (ji|kl) = (ij|lk) = (kl|ij) = ...
        let mut eri = Array4::zeros((n, n, n, n));
        let mut unique = 0usize;
        for i in 0..n {
            for j in 0..=i {
                let ij = i * (i + 1) / 2 + j;
                for k in 0..n {
                    for l in 0..=k {
                        let kl = k * (k + 1) / 2 + l;
                        if kl > ij {
                            continue;
                        }
                        let v = eri_contracted(&basis[i], &basis[j], &basis[k], &basis[l]);
                        unique += 1;
                        for (p, q, r, s) in [
                            (i, j, k, l),
                            (j, i, k, l),
                            (i, j, l, k),
                            (j, i, l, k),
                            (k, l, i, j),
                            (l, k, i, j),
                            (k, l, j, i),
                            (l, k, j, i),
                        ] {
                            eri[[p, q, r, s]] = v;
                        }
                    }
                }
            }
        }
        debug!(basis_functions = n, unique_eri = unique, "AO integrals computed");

        Self {
            overlap,
            kinetic,
            nuclear,
            eri,
        }
    }

    /// Core Hamiltonian `T + V`.
    pub fn core_hamiltonian(&self) -> Array2<f64> {
        &self.kinetic + &self.nuclear
    }

    /// Number of basis functions.
    pub fn num_basis(&self) -> usize {
        self.overlap.nrows()
    }
}
