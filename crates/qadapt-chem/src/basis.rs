//! Contracted Cartesian Gaussian basis sets.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::ChemError;
use crate::integrals::overlap_contracted;
use crate::molecule::{Element, Molecule};

/// STO-3G contraction coefficients for 1s, 2s and 2p shells.
const STO3G_1S: [f64; 3] = [0.154_328_97, 0.535_328_14, 0.444_634_54];
const STO3G_2S: [f64; 3] = [-0.099_967_23, 0.399_512_83, 0.700_115_47];
const STO3G_2P: [f64; 3] = [0.155_916_27, 0.607_683_72, 0.391_957_39];

/// Available basis sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasisSet {
    /// Minimal Slater-type orbitals, three Gaussians each.
    #[default]
    #[serde(alias = "sto-3g")]
    Sto3g,
}

impl FromStr for BasisSet {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "sto3g" => Ok(BasisSet::Sto3g),
            _ => Err(ChemError::UnsupportedBasis(s.to_string())),
        }
    }
}

impl fmt::Display for BasisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasisSet::Sto3g => f.write_str("sto3g"),
        }
    }
}

/// STO-3G exponents `(1s, 2sp)` per element.
fn sto3g_exponents(element: Element) -> ([f64; 3], Option<[f64; 3]>) {
    match element {
        Element::H => ([3.425_250_91, 0.623_913_73, 0.168_855_40], None),
        Element::He => ([6.362_421_39, 1.158_923_00, 0.313_649_79], None),
        Element::Li => (
            [16.119_575_0, 2.936_200_7, 0.794_650_5],
            Some([0.636_289_7, 0.147_860_1, 0.048_088_7]),
        ),
        Element::Be => (
            [30.167_871_0, 5.495_115_3, 1.487_192_7],
            Some([1.314_833_1, 0.305_538_9, 0.099_370_7]),
        ),
        Element::B => (
            [48.791_113_0, 8.887_362_2, 2.405_267_0],
            Some([2.236_956_1, 0.519_820_5, 0.169_061_8]),
        ),
        Element::C => (
            [71.616_837_0, 13.045_096_0, 3.530_512_2],
            Some([2.941_249_4, 0.683_483_1, 0.222_289_9]),
        ),
        Element::N => (
            [99.106_169_0, 18.052_312_0, 4.885_660_2],
            Some([3.780_455_9, 0.878_496_6, 0.285_714_4]),
        ),
        Element::O => (
            [130.709_320_0, 23.808_861_0, 6.443_608_3],
            Some([5.033_151_3, 1.169_596_1, 0.380_389_0]),
        ),
        Element::F => (
            [166.679_130_0, 30.360_812_0, 8.216_820_7],
            Some([6.464_803_2, 1.502_281_2, 0.488_588_5]),
        ),
        Element::Ne => (
            [207.015_610_0, 37.708_151_0, 10.205_297_0],
            Some([8.246_315_1, 1.916_266_2, 0.623_229_3]),
        ),
    }
}

fn double_factorial(n: i32) -> f64 {
    let mut acc = 1.0;
    let mut k = n;
    while k > 1 {
        acc *= f64::from(k);
        k -= 2;
    }
    acc
}

/// A contracted Cartesian Gaussian `Σ_k d_k x^l y^m z^n exp(-α_k r²)`.
///
/// The stored coefficients `d_k` already include primitive normalisation,
/// and the contraction as a whole has unit norm.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractedGaussian {
    /// Center in Bohr.
    pub center: Vector3<f64>,
    /// Cartesian powers `(l, m, n)`.
    pub angular: [u32; 3],
    /// Primitive exponents.
    pub exponents: Vec<f64>,
    /// Normalised contraction coefficients.
    pub coefficients: Vec<f64>,
}

impl ContractedGaussian {
    /// Build and normalise a contraction from raw coefficients.
    pub fn new(center: Vector3<f64>, angular: [u32; 3], exponents: &[f64], raw: &[f64]) -> Self {
        let big_l = angular.iter().sum::<u32>() as i32;
        let df = angular
            .iter()
            .map(|&l| double_factorial(2 * l as i32 - 1))
            .product::<f64>();
        let coefficients = exponents
            .iter()
            .zip(raw)
            .map(|(&a, &d)| {
                let norm = (2.0 * a / PI).powf(0.75) * (4.0 * a).powf(f64::from(big_l) / 2.0)
                    / df.sqrt();
                d * norm
            })
            .collect();
        let mut cg = Self {
            center,
            angular,
            exponents: exponents.to_vec(),
            coefficients,
        };
        let self_overlap = overlap_contracted(&cg, &cg);
        let scale = 1.0 / self_overlap.sqrt();
        for c in &mut cg.coefficients {
            *c *= scale;
        }
        cg
    }

    /// Total angular momentum `l + m + n`.
    pub fn angular_momentum(&self) -> u32 {
        self.angular.iter().sum()
    }
}

/// Build the atomic-orbital basis for a molecule, atom by atom, in the
/// order 1s, 2s, 2px, 2py, 2pz.
pub fn build_basis(molecule: &Molecule, basis: BasisSet) -> Vec<ContractedGaussian> {
    let mut functions = Vec::new();
    for atom in molecule.atoms() {
        let (core, valence) = match basis {
            BasisSet::Sto3g => sto3g_exponents(atom.element),
        };
        functions.push(ContractedGaussian::new(atom.position, [0, 0, 0], &core, &STO3G_1S));
        if let Some(sp) = valence {
            functions.push(ContractedGaussian::new(
                atom.position,
                [0, 0, 0],
                &sp,
                &STO3G_2S,
            ));
            for axis in [[1, 0, 0], [0, 1, 0], [0, 0, 1]] {
                functions.push(ContractedGaussian::new(atom.position, axis, &sp, &STO3G_2P));
            }
        }
    }
    functions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::DistanceUnit;
    use approx::assert_relative_eq;

    #[test]
    fn test_basis_size() {
        let lih =
            Molecule::from_geometry("Li 0 0 0; H 0 0 1.6", DistanceUnit::Angstrom, 0, 1).unwrap();
        let basis = build_basis(&lih, BasisSet::Sto3g);
        assert_eq!(basis.len(), 6);
        assert_eq!(basis[2].angular, [1, 0, 0]);
        assert_eq!(basis[5].angular_momentum(), 0);
    }

    #[test]
    fn test_functions_are_normalised() {
        let mol = Molecule::from_geometry("O 0 0 0", DistanceUnit::Bohr, 0, 1).unwrap();
        for f in build_basis(&mol, BasisSet::Sto3g) {
            assert_relative_eq!(overlap_contracted(&f, &f), 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_parse_basis_name() {
        assert_eq!("STO-3G".parse::<BasisSet>().unwrap(), BasisSet::Sto3g);
        assert!(matches!(
            "6-31g".parse::<BasisSet>(),
            Err(ChemError::UnsupportedBasis(_))
        ));
    }
}
