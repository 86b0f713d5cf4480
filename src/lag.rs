//! Lag expansion.
//!
//! `make_lagged_stimulus(S, n_lags)` stacks `n_lags` copies of `S` side by
//! side: copy 0 is `S`, copy `k` is `S` shifted down by `k` rows with the
//! first `k` rows set to `fill_value`.  Row `t` of the result therefore holds
//! `S[t], S[t-1], …, S[t-(n_lags-1)]`.
use ndarray::{s, Array2, ArrayView2};

/// Lag-expand `stimulus` ([T, F]) into [T, n_lags · F].
///
/// `n_lags <= 1` returns the stimulus unchanged.  Shifts of at least `T`
/// rows produce copies made entirely of `fill_value`.
pub fn make_lagged_stimulus(stimulus: ArrayView2<f64>, n_lags: usize, fill_value: f64) -> Array2<f64> {
    let (n_t, n_f) = stimulus.dim();
    let n_lags = n_lags.max(1);

    let mut out = Array2::<f64>::from_elem((n_t, n_lags * n_f), fill_value);
    for k in 0..n_lags {
        if k >= n_t {
            break;
        }
        out.slice_mut(s![k.., k * n_f..(k + 1) * n_f])
            .assign(&stimulus.slice(s![..n_t - k, ..]));
    }
    out
}
