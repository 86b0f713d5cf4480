/// Shared helpers for building synthetic runs.
use ndarray::Array2;

#[allow(unused)]
/// Stimulus whose value at (t, f) is `t * 100 + f`, so every sample is
/// identifiable after reshaping and lagging.
pub fn ramp_stimulus(samples: usize, features: usize) -> Array2<f64> {
    Array2::from_shape_fn((samples, features), |(t, f)| (t * 100 + f) as f64)
}

#[allow(unused)]
/// fMRI run whose value at (t, v) is `t + v / 1000`.
pub fn ramp_fmri(samples: usize, voxels: usize) -> Array2<f64> {
    Array2::from_shape_fn((samples, voxels), |(t, v)| t as f64 + v as f64 / 1000.0)
}

#[allow(unused)]
/// Number of NaNs in `a`.
pub fn count_nan(a: &Array2<f64>) -> usize {
    a.iter().filter(|v| v.is_nan()).count()
}

#[allow(unused)]
/// Element-wise equality that treats NaN == NaN.
pub fn same_with_nan(a: &Array2<f64>, b: &Array2<f64>) -> bool {
    a.dim() == b.dim()
        && a.iter().zip(b.iter()).all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
}
