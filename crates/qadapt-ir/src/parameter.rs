//! Circuit parameters.
//!
//! Variational forms refer to their parameters positionally: `θ[k]` is the
//! `k`-th entry of the vector handed to [`crate::Circuit::bind_parameters`].
//! Every angle in a circuit is an affine function of at most one parameter,
//! which is all that excitation blocks and their lowering need.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Mul, Neg};

use crate::error::{IrError, IrResult};

/// A gate angle: a constant, or `scale · θ[index] + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterExpression {
    Constant(f64),
    Affine {
        index: usize,
        scale: f64,
        offset: f64,
    },
}

impl ParameterExpression {
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    /// `θ[index]` itself.
    pub fn parameter(index: usize) -> Self {
        Self::Affine {
            index,
            scale: 1.0,
            offset: 0.0,
        }
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Affine { .. })
    }

    /// The value, if no parameter is involved.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Constant(v) => Some(v),
            Self::Affine { .. } => None,
        }
    }

    /// Index of the referenced parameter.
    pub fn index(&self) -> Option<usize> {
        match *self {
            Self::Constant(_) => None,
            Self::Affine { index, .. } => Some(index),
        }
    }

    /// Value at the parameter vector `values`.
    pub fn evaluate(&self, values: &[f64]) -> IrResult<f64> {
        match *self {
            Self::Constant(v) => Ok(v),
            Self::Affine {
                index,
                scale,
                offset,
            } => values
                .get(index)
                .map(|theta| scale * theta + offset)
                .ok_or(IrError::UnboundParameter(index)),
        }
    }

    /// Substitute `values`, leaving a constant.
    pub fn bind(&self, values: &[f64]) -> IrResult<Self> {
        self.evaluate(values).map(Self::Constant)
    }

    /// Multiply by a constant.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        match self {
            Self::Constant(v) => Self::Constant(v * factor),
            Self::Affine {
                index,
                scale,
                offset,
            } => Self::Affine {
                index,
                scale: scale * factor,
                offset: offset * factor,
            },
        }
    }

    /// Renumber `θ[k]` to `θ[k + by]`; used when circuits are composed.
    #[must_use]
    pub fn shifted(self, by: usize) -> Self {
        match self {
            Self::Constant(_) => self,
            Self::Affine {
                index,
                scale,
                offset,
            } => Self::Affine {
                index: index + by,
                scale,
                offset,
            },
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Constant(v) => write!(f, "{v}"),
            Self::Affine {
                index,
                scale,
                offset,
            } => {
                if scale != 1.0 {
                    write!(f, "{scale}·")?;
                }
                write!(f, "θ[{index}]")?;
                if offset != 0.0 {
                    write!(f, " + {offset}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl Mul<f64> for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scaled(rhs)
    }
}

impl Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self {
        self.scaled(-1.0)
    }
}
