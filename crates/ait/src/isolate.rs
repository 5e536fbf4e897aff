//! Keep connected components whose cell count lies strictly between two cuts.
//!
//! The background (label 0) is counted like any other component and is kept
//! whenever its size passes the cuts. Callers that only want foreground must
//! mask it out themselves.

use ndarray::{Array, ArrayBase, Data, Dimension};

use crate::labels::{component_sizes, label, Connectivity, LabelError};

/// Size window and neighbourhood for `isolate_mask`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsolateCfg {
    /// Exclusive lower bound on component size.
    pub lower_cut: f64,
    /// Exclusive upper bound on component size.
    pub larger_cut: f64,
    pub connectivity: Connectivity,
}

impl Default for IsolateCfg {
    fn default() -> Self {
        Self {
            lower_cut: 0.0,
            larger_cut: f64::INFINITY,
            connectivity: Connectivity::Full,
        }
    }
}

impl IsolateCfg {
    #[inline]
    pub fn admits(&self, size: usize) -> bool {
        let size = size as f64;
        size > self.lower_cut && size < self.larger_cut
    }
}

/// Boolean mask of the cells whose component size passes `cfg`.
pub fn isolate_mask<A, S, D>(
    arr: &ArrayBase<S, D>,
    cfg: &IsolateCfg,
) -> Result<Array<bool, D>, LabelError>
where
    A: PartialEq + Default,
    S: Data<Elem = A>,
    D: Dimension,
{
    let (labels, _) = label(arr, cfg.connectivity)?;
    let keep: Vec<bool> = component_sizes(&labels)
        .into_iter()
        .map(|size| cfg.admits(size))
        .collect();
    Ok(labels.mapv(|id| keep[id]))
}
