//! BOLD volumes → [samples, voxels] matrices.
//!
//! A 4-D run `(x, y, z, t)` is flattened so that every row is one TR and
//! every column one voxel, voxels in row-major `(x, y, z)` order.  An
//! optional 3-D boolean mask keeps only the voxels where it is `true`.
use ndarray::{Array2, ArrayView3, ArrayView4, Axis};

use crate::clean::{clean, Standardize};
use crate::error::{AlignError, Result};

/// Flatten `volume` ([X, Y, Z, T]) into [T, voxels].
pub fn to_samples_by_voxels(volume: ArrayView4<f64>, mask: Option<ArrayView3<bool>>) -> Result<Array2<f64>> {
    let (nx, ny, nz, nt) = volume.dim();
    if let Some(m) = &mask {
        if m.dim() != (nx, ny, nz) {
            return Err(AlignError::invalid(format!(
                "mask shape {:?} does not match volume shape {:?}",
                m.dim(),
                (nx, ny, nz)
            )));
        }
    }

    let keep: Vec<(usize, usize, usize)> = ndarray::indices((nx, ny, nz))
        .into_iter()
        .filter(|&ix| mask.as_ref().map_or(true, |m| m[ix]))
        .collect();

    let mut out = Array2::<f64>::zeros((nt, keep.len()));
    for (v, &(i, j, k)) in keep.iter().enumerate() {
        let series = volume.slice(ndarray::s![i, j, k, ..]);
        out.index_axis_mut(Axis(1), v).assign(&series);
    }
    Ok(out)
}

/// Flatten, mask and clean one BOLD run.
pub fn preprocess_bold(
    volume: ArrayView4<f64>,
    mask: Option<ArrayView3<bool>>,
    detrend: bool,
    standardize: Standardize,
) -> Result<Array2<f64>> {
    let data = to_samples_by_voxels(volume, mask)?;
    Ok(clean(&data, detrend, standardize))
}
