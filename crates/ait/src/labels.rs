//! N-dimensional connected-component labelling.
//!
//! Model
//! - Cells equal to `A::default()` (0, `false`) are background and get label 0.
//! - Two neighbouring cells belong to one component iff they hold *equal*
//!   values, so an integer class map yields one component per touching run
//!   of each class.
//! - Neighbours differ by at most one step on each axis, and by a step on at
//!   most `k` axes (`k = ndim` for `Connectivity::Full`).
//! - Labels are consecutive from 1 in row-major order of each component's
//!   first cell.

use std::fmt;

use ndarray::{Array, ArrayBase, Data, Dimension};

/// Neighbourhood used when growing components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Connectivity {
    /// All `3^ndim - 1` neighbours, diagonals included.
    #[default]
    Full,
    /// Neighbours reached by stepping along at most `k` axes at once (`1..=ndim`).
    Hops(usize),
}

impl Connectivity {
    /// Number of axes a single neighbour step may change.
    pub fn resolve(self, ndim: usize) -> Result<usize, LabelError> {
        match self {
            Connectivity::Full => Ok(ndim),
            Connectivity::Hops(k) if (1..=ndim).contains(&k) => Ok(k),
            Connectivity::Hops(k) => Err(LabelError::InvalidConnectivity {
                connectivity: k,
                ndim,
            }),
        }
    }
}

/// Errors surfaced by `label` (and propagated by `isolate_mask`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    /// Scalar input has no neighbourhood.
    ZeroDimensional,
    /// `Connectivity::Hops(k)` with `k` outside `1..=ndim`.
    InvalidConnectivity { connectivity: usize, ndim: usize },
}

impl fmt::Display for LabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelError::ZeroDimensional => {
                write!(f, "labelling needs an array with at least 1 dimension")
            }
            LabelError::InvalidConnectivity { connectivity, ndim } => write!(
                f,
                "connectivity {} is invalid for a {}D array (expected 1..={})",
                connectivity, ndim, ndim
            ),
        }
    }
}

impl std::error::Error for LabelError {}

/// Label connected components; returns the label map and the component count.
pub fn label<A, S, D>(
    arr: &ArrayBase<S, D>,
    connectivity: Connectivity,
) -> Result<(Array<usize, D>, usize), LabelError>
where
    A: PartialEq + Default,
    S: Data<Elem = A>,
    D: Dimension,
{
    let ndim = arr.ndim();
    if ndim == 0 {
        return Err(LabelError::ZeroDimensional);
    }
    let hops = connectivity.resolve(ndim)?;
    let shape = arr.shape().to_vec();
    let steps = neighbour_steps(ndim, hops);
    let background = A::default();
    let values: Vec<&A> = arr.iter().collect();

    let mut flat_labels = vec![0usize; values.len()];
    let mut count = 0;
    let mut stack: Vec<usize> = Vec::new();
    let mut coord = vec![0usize; ndim];
    for seed in 0..values.len() {
        if flat_labels[seed] != 0 || *values[seed] == background {
            continue;
        }
        count += 1;
        flat_labels[seed] = count;
        stack.push(seed);
        while let Some(cell) = stack.pop() {
            unravel(cell, &shape, &mut coord);
            for step in &steps {
                let Some(next) = offset_flat(&coord, step, &shape) else {
                    continue;
                };
                if flat_labels[next] == 0 && values[next] == values[cell] {
                    flat_labels[next] = count;
                    stack.push(next);
                }
            }
        }
    }

    let mut labels = Array::<usize, D>::zeros(arr.raw_dim());
    labels
        .iter_mut()
        .zip(flat_labels)
        .for_each(|(dst, id)| *dst = id);
    Ok((labels, count))
}

/// Cell count per label id (index 0 is background). Empty input gives an empty vec.
pub fn component_sizes<S, D>(labels: &ArrayBase<S, D>) -> Vec<usize>
where
    S: Data<Elem = usize>,
    D: Dimension,
{
    let Some(&max) = labels.iter().max() else {
        return Vec::new();
    };
    let mut sizes = vec![0usize; max + 1];
    for &id in labels.iter() {
        sizes[id] += 1;
    }
    sizes
}

/// Non-zero steps in `{-1, 0, 1}^ndim` touching at most `hops` axes.
fn neighbour_steps(ndim: usize, hops: usize) -> Vec<Vec<isize>> {
    let total = 3usize.pow(ndim as u32);
    let mut steps = Vec::with_capacity(total - 1);
    for code in 0..total {
        let mut rest = code;
        let step: Vec<isize> = (0..ndim)
            .map(|_| {
                let d = (rest % 3) as isize - 1;
                rest /= 3;
                d
            })
            .collect();
        let moved = step.iter().filter(|&&d| d != 0).count();
        if moved > 0 && moved <= hops {
            steps.push(step);
        }
    }
    steps
}

#[inline]
fn unravel(mut flat: usize, shape: &[usize], coord: &mut [usize]) {
    for axis in (0..shape.len()).rev() {
        coord[axis] = flat % shape[axis];
        flat /= shape[axis];
    }
}

#[inline]
fn offset_flat(coord: &[usize], step: &[isize], shape: &[usize]) -> Option<usize> {
    let mut flat = 0usize;
    for ((&c, &d), &n) in coord.iter().zip(step).zip(shape) {
        let moved = c.checked_add_signed(d)?;
        if moved >= n {
            return None;
        }
        flat = flat * n + moved;
    }
    Some(flat)
}
