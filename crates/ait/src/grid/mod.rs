//! Radial offset fields for 1D/2D/3D grids.
//!
//! Purpose
//! - For every cell of a grid, report the signed offset from the grid center
//!   along each axis, plus one combined radius per cell.
//! - Only the grid *shape* matters; element values are never read.
//!
//! Conventions (kept exactly, including the 2D/3D mismatch)
//! - 1D and 2D center each axis at `(len - 1) / 2` (`CenterRule::Span`).
//! - 3D centers each axis at `len / 2` for even lengths and `(len - 1) / 2`
//!   for odd lengths (`CenterRule::Parity`).
//! - 1D radius is the signed offset itself; 2D/3D radius is the Euclidean norm.
//!
//! Code cross-refs: `GridRank`, `RadialField`, `radial`

mod radial;
mod types;

pub use radial::{radial, radial_1d, radial_2d, radial_3d};
pub use types::{CenterRule, GridError, GridRank, RadialField};
