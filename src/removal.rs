//! Missing-value row removal.
//!
//! [`remove_idx`] decides which rows of a (lagged) stimulus matrix to drop
//! under a [`RemoveNans`] policy; [`delete_rows`] applies those indices to a
//! matrix.  Missing values are NaNs and are always detected with `is_nan()`.
use ndarray::{Array2, ArrayView2, Axis};
use serde::Deserialize;

use crate::error::{AlignError, Result};

/// Policy for dropping rows that contain missing values.
///
/// In a JSON config this is written as `true`, `false`, or a number in
/// `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawRemoveNans")]
pub enum RemoveNans {
    /// Drop every row with at least one missing value (`true`).
    #[default]
    All,
    /// Drop nothing (`false`).  Missing values reach the output.
    Keep,
    /// Drop rows whose missing fraction strictly exceeds the threshold.
    Threshold(f64),
}

impl RemoveNans {
    /// Threshold policy, validated to lie in `[0, 1]`.
    pub fn threshold(t: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&t) {
            Ok(RemoveNans::Threshold(t))
        } else {
            Err(AlignError::invalid(format!(
                "remove_nans needs to be either true, false, or a float between 0 and 1, got {t}"
            )))
        }
    }

    /// Whether the assembler removes rows at all.
    ///
    /// `false` for [`RemoveNans::Keep`] and for a zero threshold, which
    /// behaves like `false`: nothing is removed and nothing zero-filled.
    pub fn is_active(&self) -> bool {
        match *self {
            RemoveNans::Keep => false,
            RemoveNans::Threshold(t) => t != 0.0,
            RemoveNans::All => true,
        }
    }
}

impl From<bool> for RemoveNans {
    fn from(b: bool) -> Self {
        if b { RemoveNans::All } else { RemoveNans::Keep }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRemoveNans {
    Flag(bool),
    Fraction(f64),
}

impl TryFrom<RawRemoveNans> for RemoveNans {
    type Error = AlignError;

    fn try_from(raw: RawRemoveNans) -> Result<Self> {
        match raw {
            RawRemoveNans::Flag(b) => Ok(b.into()),
            RawRemoveNans::Fraction(t) => RemoveNans::threshold(t),
        }
    }
}

/// Row indices of `matrix` to remove under `policy`.
///
/// Returns `None` for [`RemoveNans::Keep`]: there is nothing to remove, and
/// handing that `None` to [`delete_rows`] is an error.
pub fn remove_idx(matrix: ArrayView2<f64>, policy: RemoveNans) -> Result<Option<Vec<usize>>> {
    let n_cols = matrix.ncols();
    let missing = |row: ndarray::ArrayView1<f64>| row.iter().filter(|v| v.is_nan()).count();

    let idx = match policy {
        RemoveNans::Keep => return Ok(None),
        RemoveNans::All => matrix
            .axis_iter(Axis(0))
            .enumerate()
            .filter(|(_, row)| row.iter().any(|v| v.is_nan()))
            .map(|(i, _)| i)
            .collect(),
        RemoveNans::Threshold(t) => {
            // Re-validate: the variant is constructible without `threshold()`.
            RemoveNans::threshold(t)?;
            if n_cols == 0 {
                return Ok(Some(Vec::new()));
            }
            matrix
                .axis_iter(Axis(0))
                .enumerate()
                .filter(|(_, row)| missing(*row) as f64 / n_cols as f64 > t)
                .map(|(i, _)| i)
                .collect()
        }
    };
    Ok(Some(idx))
}

/// Copy of `matrix` without the rows listed in `idx`.
///
/// Indices at or beyond `matrix.nrows()` are ignored, so the same index set
/// can be applied to a stimulus matrix and to a signal run that is shorter at
/// its end.  Duplicates are harmless.
pub fn delete_rows(matrix: ArrayView2<f64>, idx: Option<&[usize]>) -> Result<Array2<f64>> {
    let idx = idx.ok_or_else(|| {
        AlignError::invalid("cannot delete rows: removal policy says remove nothing")
    })?;
    let mut drop = vec![false; matrix.nrows()];
    for &i in idx {
        if let Some(d) = drop.get_mut(i) {
            *d = true;
        }
    }
    let keep: Vec<usize> = (0..matrix.nrows()).filter(|&i| !drop[i]).collect();
    Ok(matrix.select(Axis(0), &keep))
}
