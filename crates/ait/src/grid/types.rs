//! Shape tags, center rules and the radial result container.

use std::fmt;

use ndarray::{Array, Dimension, IxDyn};

/// How the center of one axis is placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CenterRule {
    /// `(len - 1) / 2`, the midpoint of the valid index range.
    Span,
    /// `len / 2` for even `len`, `(len - 1) / 2` for odd `len`.
    Parity,
}

impl CenterRule {
    #[inline]
    pub fn center(self, len: usize) -> f64 {
        match self {
            CenterRule::Span => (len as f64 - 1.0) / 2.0,
            CenterRule::Parity => {
                if len % 2 == 0 {
                    len as f64 / 2.0
                } else {
                    (len as f64 - 1.0) / 2.0
                }
            }
        }
    }
}

/// Grid shape tagged by rank. Only ranks 1..=3 have a radial handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridRank {
    D1(usize),
    D2([usize; 2]),
    D3([usize; 3]),
}

impl GridRank {
    pub fn from_shape(shape: &[usize]) -> Result<Self, GridError> {
        match *shape {
            [n] => Ok(GridRank::D1(n)),
            [h, w] => Ok(GridRank::D2([h, w])),
            [x, y, z] => Ok(GridRank::D3([x, y, z])),
            _ => Err(GridError::UnsupportedDimension { ndim: shape.len() }),
        }
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        match self {
            GridRank::D1(_) => 1,
            GridRank::D2(_) => 2,
            GridRank::D3(_) => 3,
        }
    }
}

/// Per-axis offsets and combined radius, all shaped like the source grid.
///
/// Invariants:
/// - `offsets.len()` equals the grid rank.
/// - Rank 1: `radius == offsets[0]` (signed).
/// - Rank 2/3: `radius = sqrt(sum_k offsets[k]^2)` cellwise.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialField<D: Dimension> {
    pub offsets: Vec<Array<f64, D>>,
    pub radius: Array<f64, D>,
}

impl<D: Dimension> RadialField<D> {
    #[inline]
    pub fn ndim(&self) -> usize {
        self.offsets.len()
    }

    /// Erase the static rank (used by the rank-dispatching `radial`).
    pub fn into_dyn(self) -> RadialField<IxDyn> {
        RadialField {
            offsets: self.offsets.into_iter().map(|a| a.into_dyn()).collect(),
            radius: self.radius.into_dyn(),
        }
    }
}

/// Errors surfaced by the radial computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Grid rank outside {1, 2, 3}.
    UnsupportedDimension { ndim: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::UnsupportedDimension { ndim } => write!(
                f,
                "radial offsets need a 1D, 2D or 3D grid (got {} dimensions)",
                ndim
            ),
        }
    }
}

impl std::error::Error for GridError {}
