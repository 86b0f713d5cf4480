//! Voxel-wise signal cleaning of fMRI runs.
//!
//! All operations work on [samples, voxels] matrices and treat every column
//! independently:
//!
//! `detrend_inplace`  — least-squares linear trend (and mean) removed per voxel
//! `zscore_inplace`   — (x − μ) / σ per voxel, σ with ddof = 0
//! `psc_inplace`      — percent signal change, (x − μ) / |μ| · 100
//!
//! Constant voxels never divide by zero: z-scoring leaves them centred and
//! percent signal change maps voxels with a ~0 mean to zero.
use ndarray::{Array1, Array2, Axis};
use std::fmt;
use std::str::FromStr;

/// Below this magnitude a standard deviation or mean counts as zero.
const EPS: f64 = 1e-12;

/// Voxel-wise standardisation applied after detrending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Standardize {
    #[default]
    None,
    Zscore,
    Psc,
}

impl FromStr for Standardize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "false" => Ok(Standardize::None),
            "zscore" => Ok(Standardize::Zscore),
            "psc" => Ok(Standardize::Psc),
            other => Err(format!("unknown standardization '{other}' (expected zscore, psc or none)")),
        }
    }
}

impl fmt::Display for Standardize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Standardize::None => "none",
            Standardize::Zscore => "zscore",
            Standardize::Psc => "psc",
        })
    }
}

/// Detrend and/or standardise `data` ([T, V]) voxel-wise.
pub fn clean(data: &Array2<f64>, detrend: bool, standardize: Standardize) -> Array2<f64> {
    let mut out = data.clone();
    // Percent signal change needs the raw mean, which detrending removes.
    let raw_mean = column_means(&out);
    if detrend {
        detrend_inplace(&mut out);
    }
    match standardize {
        Standardize::None => {}
        Standardize::Zscore => zscore_inplace(&mut out),
        Standardize::Psc => {
            if !detrend {
                out -= &raw_mean;
            }
            scale_psc(&mut out, &raw_mean);
        }
    }
    out
}

/// Remove the least-squares line `a + b·t` from every column.
pub fn detrend_inplace(data: &mut Array2<f64>) {
    let n_t = data.nrows();
    if n_t == 0 {
        return;
    }
    let t_mean = (n_t as f64 - 1.0) / 2.0;
    let t_ss: f64 = (0..n_t).map(|t| (t as f64 - t_mean).powi(2)).sum();

    for mut col in data.axis_iter_mut(Axis(1)) {
        let mean = col.sum() / n_t as f64;
        let slope = if t_ss > 0.0 {
            col.iter()
                .enumerate()
                .map(|(t, &v)| (t as f64 - t_mean) * (v - mean))
                .sum::<f64>()
                / t_ss
        } else {
            0.0
        };
        for (t, v) in col.iter_mut().enumerate() {
            *v -= mean + slope * (t as f64 - t_mean);
        }
    }
}

/// Per-voxel z-score.  Columns with zero variance are only centred.
pub fn zscore_inplace(data: &mut Array2<f64>) {
    let n_t = data.nrows();
    if n_t == 0 {
        return;
    }
    for mut col in data.axis_iter_mut(Axis(1)) {
        let mean = col.sum() / n_t as f64;
        let var = col.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n_t as f64;
        let std = if var.sqrt() < EPS { 1.0 } else { var.sqrt() };
        col.mapv_inplace(|v| (v - mean) / std);
    }
}

/// Per-voxel percent signal change relative to the column mean.
pub fn psc_inplace(data: &mut Array2<f64>) {
    let mean = column_means(data);
    *data -= &mean;
    scale_psc(data, &mean);
}

fn column_means(data: &Array2<f64>) -> Array1<f64> {
    data.mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(data.ncols()))
}

fn scale_psc(centred: &mut Array2<f64>, mean: &Array1<f64>) {
    for (mut col, &m) in centred.axis_iter_mut(Axis(1)).zip(mean) {
        if m.abs() < EPS {
            col.fill(0.0);
        } else {
            col.mapv_inplace(|v| v / m.abs() * 100.0);
        }
    }
}
