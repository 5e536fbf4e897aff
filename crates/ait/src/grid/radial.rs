use nalgebra::{Vector2, Vector3};
use ndarray::{Array1, Array2, Array3, ArrayBase, Data, Dimension, Ix1, Ix2, Ix3, IxDyn};

use super::types::{CenterRule, GridError, GridRank, RadialField};

/// Radial field for a grid of any rank; ranks other than 1..=3 are rejected.
pub fn radial<S, D>(grid: &ArrayBase<S, D>) -> Result<RadialField<IxDyn>, GridError>
where
    S: Data,
    D: Dimension,
{
    Ok(GridRank::from_shape(grid.shape())?.radial())
}

/// 1D handler. Center `(len - 1) / 2`; radius keeps the sign of the offset.
pub fn radial_1d<S: Data>(grid: &ArrayBase<S, Ix1>) -> RadialField<Ix1> {
    field_1d(grid.len())
}

/// 2D handler. Center `(len - 1) / 2` on both axes.
pub fn radial_2d<S: Data>(grid: &ArrayBase<S, Ix2>) -> RadialField<Ix2> {
    let (h, w) = grid.dim();
    field_2d([h, w])
}

/// 3D handler. Center `len / 2` on even axes, `(len - 1) / 2` on odd axes.
pub fn radial_3d<S: Data>(grid: &ArrayBase<S, Ix3>) -> RadialField<Ix3> {
    let (nx, ny, nz) = grid.dim();
    field_3d([nx, ny, nz])
}

impl GridRank {
    /// One handler per rank; the result shape is the tagged shape.
    pub fn radial(self) -> RadialField<IxDyn> {
        match self {
            GridRank::D1(n) => field_1d(n).into_dyn(),
            GridRank::D2(shape) => field_2d(shape).into_dyn(),
            GridRank::D3(shape) => field_3d(shape).into_dyn(),
        }
    }
}

fn field_1d(n: usize) -> RadialField<Ix1> {
    let c = CenterRule::Span.center(n);
    let rx = Array1::from_shape_fn(n, |i| i as f64 - c);
    RadialField {
        offsets: vec![rx.clone()],
        radius: rx,
    }
}

fn field_2d([h, w]: [usize; 2]) -> RadialField<Ix2> {
    let c = Vector2::new(CenterRule::Span.center(h), CenterRule::Span.center(w));
    let rx = Array2::from_shape_fn((h, w), |(i, _)| i as f64 - c.x);
    let ry = Array2::from_shape_fn((h, w), |(_, j)| j as f64 - c.y);
    let radius = Array2::from_shape_fn((h, w), |(i, j)| {
        (Vector2::new(i as f64, j as f64) - c).norm()
    });
    RadialField {
        offsets: vec![rx, ry],
        radius,
    }
}

fn field_3d([nx, ny, nz]: [usize; 3]) -> RadialField<Ix3> {
    let c = Vector3::new(
        CenterRule::Parity.center(nx),
        CenterRule::Parity.center(ny),
        CenterRule::Parity.center(nz),
    );
    let dim = (nx, ny, nz);
    let rx = Array3::from_shape_fn(dim, |(i, _, _)| i as f64 - c.x);
    let ry = Array3::from_shape_fn(dim, |(_, j, _)| j as f64 - c.y);
    let rz = Array3::from_shape_fn(dim, |(_, _, k)| k as f64 - c.z);
    let radius = Array3::from_shape_fn(dim, |(i, j, k)| {
        (Vector3::new(i as f64, j as f64, k as f64) - c).norm()
    });
    RadialField {
        offsets: vec![rx, ry, rz],
        radius,
    }
}
