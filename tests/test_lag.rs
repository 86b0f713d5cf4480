mod common;
use common::ramp_stimulus;
use ndarray::s;
use voxelwise::make_lagged_stimulus;

#[test]
fn one_lag_returns_input() {
    let x = ramp_stimulus(12, 3);
    assert_eq!(make_lagged_stimulus(x.view(), 1, f64::NAN), x);
}

#[test]
fn shape_scales_with_lags() {
    let x = ramp_stimulus(12, 3);
    for k in 1..6 {
        let out = make_lagged_stimulus(x.view(), k, f64::NAN);
        assert_eq!(out.dim(), (12, k * 3), "n_lags = {k}");
    }
}

#[test]
fn copy_k_is_shifted_by_k_rows() {
    let x = ramp_stimulus(10, 2);
    let out = make_lagged_stimulus(x.view(), 4, -1.0);
    for k in 0..4 {
        let block = out.slice(s![.., k * 2..(k + 1) * 2]);
        for t in 0..10 {
            if t < k {
                assert!(block.row(t).iter().all(|&v| v == -1.0), "k={k} t={t}");
            } else {
                assert_eq!(block.row(t), x.row(t - k), "k={k} t={t}");
            }
        }
    }
}
