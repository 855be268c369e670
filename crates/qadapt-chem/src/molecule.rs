//! Molecule descriptors and geometry parsing.
//!
//! Geometries use the compact `"H .0 .0 .0; H .0 .0 0.735"` form: atoms are
//! separated by `;`, coordinates by whitespace or commas.

use logos::Logos;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ChemError, ChemResult};

/// Ångström per Bohr.
pub const BOHR_TO_ANGSTROM: f64 = 0.529_177_210_92;

/// Atoms closer than this (in Bohr) are considered overlapping.
const OVERLAP_DISTANCE: f64 = 1e-6;

/// Unit of the coordinates in a geometry string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    /// Ångström.
    #[default]
    Angstrom,
    /// Bohr (atomic units).
    Bohr,
}

impl DistanceUnit {
    /// Factor converting a length in this unit to Bohr.
    pub fn to_bohr(self) -> f64 {
        match self {
            DistanceUnit::Angstrom => 1.0 / BOHR_TO_ANGSTROM,
            DistanceUnit::Bohr => 1.0,
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "angstrom" | "a" | "ang" => Ok(DistanceUnit::Angstrom),
            "bohr" | "au" => Ok(DistanceUnit::Bohr),
            other => Err(ChemError::Geometry {
                position: 0,
                message: format!("unknown distance unit '{other}'"),
            }),
        }
    }
}

/// Elements covered by the built-in basis sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Element {
    H,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
}

impl Element {
    /// Look up an element by symbol, case-insensitively.
    pub fn from_symbol(symbol: &str) -> ChemResult<Self> {
        let element = match symbol.to_ascii_lowercase().as_str() {
            "h" => Element::H,
            "he" => Element::He,
            "li" => Element::Li,
            "be" => Element::Be,
            "b" => Element::B,
            "c" => Element::C,
            "n" => Element::N,
            "o" => Element::O,
            "f" => Element::F,
            "ne" => Element::Ne,
            _ => return Err(ChemError::UnknownElement(symbol.to_string())),
        };
        Ok(element)
    }

    /// Nuclear charge.
    pub fn atomic_number(self) -> u32 {
        match self {
            Element::H => 1,
            Element::He => 2,
            Element::Li => 3,
            Element::Be => 4,
            Element::B => 5,
            Element::C => 6,
            Element::N => 7,
            Element::O => 8,
            Element::F => 9,
            Element::Ne => 10,
        }
    }

    /// Chemical symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Element::H => "H",
            Element::He => "He",
            Element::Li => "Li",
            Element::Be => "Be",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Ne => "Ne",
        }
    }

    /// Number of doubly occupied core orbitals (the 1s shell for Li–Ne).
    pub fn core_orbitals(self) -> usize {
        if self.atomic_number() > 2 { 1 } else { 0 }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A nucleus at a fixed position (Bohr).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Element of the nucleus.
    pub element: Element,
    /// Cartesian position in Bohr.
    pub position: Vector3<f64>,
}

impl Atom {
    /// Create an atom from a position in Bohr.
    pub fn new(element: Element, position: Vector3<f64>) -> Self {
        Self { element, position }
    }
}

/// Tokens of a geometry string.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n,]+")]
enum GeometryToken {
    #[regex(r"[A-Za-z][a-z]?", |lex| lex.slice().to_string())]
    Symbol(String),

    #[regex(r"[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[token(";")]
    Separator,
}

fn geometry_error(position: usize, message: impl Into<String>) -> ChemError {
    ChemError::Geometry {
        position,
        message: message.into(),
    }
}

/// Parse a geometry string into atoms with positions in Bohr.
pub fn parse_geometry(geometry: &str, unit: DistanceUnit) -> ChemResult<Vec<Atom>> {
    let scale = unit.to_bohr();
    let mut lexer = GeometryToken::lexer(geometry);
    let mut atoms = Vec::new();
    let mut current: Option<(Element, Vec<f64>, usize)> = None;

    let mut finish = |entry: Option<(Element, Vec<f64>, usize)>| -> ChemResult<()> {
        if let Some((element, coords, start)) = entry {
            if coords.len() != 3 {
                return Err(geometry_error(
                    start,
                    format!("{element} has {} coordinates, expected 3", coords.len()),
                ));
            }
            atoms.push(Atom::new(
                element,
                Vector3::new(coords[0], coords[1], coords[2]) * scale,
            ));
        }
        Ok(())
    };

    while let Some(token) = lexer.next() {
        let span = lexer.span();
        match token {
            Ok(GeometryToken::Symbol(symbol)) => {
                if current.is_some() {
                    return Err(geometry_error(
                        span.start,
                        format!("expected ';' before '{symbol}'"),
                    ));
                }
                current = Some((Element::from_symbol(&symbol)?, Vec::with_capacity(3), span.start));
            }
            Ok(GeometryToken::Number(value)) => match current.as_mut() {
                Some((_, coords, _)) if coords.len() < 3 => coords.push(value),
                Some(_) => return Err(geometry_error(span.start, "too many coordinates")),
                None => {
                    return Err(geometry_error(span.start, "coordinate before element symbol"));
                }
            },
            Ok(GeometryToken::Separator) => finish(current.take())?,
            Err(()) => {
                return Err(geometry_error(
                    span.start,
                    format!("unexpected '{}'", &geometry[span.clone()]),
                ));
            }
        }
    }
    finish(current.take())?;

    if atoms.is_empty() {
        return Err(geometry_error(0, "no atoms"));
    }
    Ok(atoms)
}

/// An immutable molecule: nuclei, total charge and spin multiplicity.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    atoms: Vec<Atom>,
    charge: i32,
    multiplicity: u32,
}

impl Molecule {
    /// Create a molecule, validating its electronic configuration.
    pub fn new(atoms: Vec<Atom>, charge: i32, multiplicity: u32) -> ChemResult<Self> {
        for i in 0..atoms.len() {
            for j in (i + 1)..atoms.len() {
                if (atoms[i].position - atoms[j].position).norm() < OVERLAP_DISTANCE {
                    return Err(ChemError::OverlappingAtoms {
                        first: i,
                        second: j,
                    });
                }
            }
        }

        let nuclear: i64 = atoms
            .iter()
            .map(|a| i64::from(a.element.atomic_number()))
            .sum();
        let electrons = nuclear - i64::from(charge);
        if electrons <= 0 {
            return Err(ChemError::ElectronConfiguration(format!(
                "charge {charge} leaves {electrons} electrons"
            )));
        }
        if multiplicity == 0 {
            return Err(ChemError::ElectronConfiguration(
                "multiplicity must be at least 1".into(),
            ));
        }
        let unpaired = i64::from(multiplicity) - 1;
        if unpaired > electrons || (electrons - unpaired) % 2 != 0 {
            return Err(ChemError::ElectronConfiguration(format!(
                "multiplicity {multiplicity} is impossible with {electrons} electrons"
            )));
        }

        Ok(Self {
            atoms,
            charge,
            multiplicity,
        })
    }

    /// Parse a geometry string and create a molecule.
    pub fn from_geometry(
        geometry: &str,
        unit: DistanceUnit,
        charge: i32,
        multiplicity: u32,
    ) -> ChemResult<Self> {
        Self::new(parse_geometry(geometry, unit)?, charge, multiplicity)
    }

    /// Nuclei.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Total charge.
    pub fn charge(&self) -> i32 {
        self.charge
    }

    /// Spin multiplicity `2S + 1`.
    pub fn multiplicity(&self) -> u32 {
        self.multiplicity
    }

    /// Total electron count.
    pub fn num_electrons(&self) -> usize {
        let nuclear: i64 = self
            .atoms
            .iter()
            .map(|a| i64::from(a.element.atomic_number()))
            .sum();
        (nuclear - i64::from(self.charge)) as usize
    }

    /// Number of spin-up electrons.
    pub fn num_alpha(&self) -> usize {
        (self.num_electrons() + self.multiplicity as usize - 1) / 2
    }

    /// Number of spin-down electrons.
    pub fn num_beta(&self) -> usize {
        self.num_electrons() - self.num_alpha()
    }

    /// Number of frozen-core candidate orbitals.
    pub fn core_orbitals(&self) -> usize {
        self.atoms.iter().map(|a| a.element.core_orbitals()).sum()
    }

    /// Coulomb repulsion between the nuclei, in Hartree.
    pub fn nuclear_repulsion_energy(&self) -> f64 {
        let mut energy = 0.0;
        for (i, a) in self.atoms.iter().enumerate() {
            for b in &self.atoms[i + 1..] {
                let r = (a.position - b.position).norm();
                energy +=
                    f64::from(a.element.atomic_number()) * f64::from(b.element.atomic_number()) / r;
            }
        }
        energy
    }

    /// Hill-order formula, e.g. `"H2"`, `"LiH"`.
    pub fn formula(&self) -> String {
        let mut counts: Vec<(Element, usize)> = Vec::new();
        for atom in &self.atoms {
            match counts.iter_mut().find(|(e, _)| *e == atom.element) {
                Some((_, n)) => *n += 1,
                None => counts.push((atom.element, 1)),
            }
        }
        let has_carbon = counts.iter().any(|(e, _)| *e == Element::C);
        counts.sort_by_key(|(e, _)| match (has_carbon, e) {
            (true, Element::C) => (0, ""),
            (true, Element::H) => (1, ""),
            _ => (2, e.symbol()),
        });
        counts
            .iter()
            .map(|(e, n)| {
                if *n == 1 {
                    e.symbol().to_string()
                } else {
                    format!("{}{n}", e.symbol())
                }
            })
            .collect()
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (charge {}, multiplicity {}, {} electrons)",
            self.formula(),
            self.charge,
            self.multiplicity,
            self.num_electrons()
        )
    }
}
