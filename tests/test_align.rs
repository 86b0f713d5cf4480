mod common;
use common::{count_nan, ramp_stimulus};
use ndarray::s;
use voxelwise::{align_stimulus, AlignConfig, AlignError, AlignmentWarning, RemoveNans};

fn cfg(tr: f64, stim_tr: f64, lag_time: Option<f64>) -> AlignConfig {
    AlignConfig {
        lag_time,
        remove_nans: RemoveNans::Keep,
        ..AlignConfig::new(tr, stim_tr)
    }
}

#[test]
fn chunks_are_row_major_per_tr() {
    let x = ramp_stimulus(800, 2);
    let out = align_stimulus(x.view(), 100, 0.0, &cfg(2.0, 0.25, Some(2.0))).unwrap();
    assert_eq!(out.stimulus.dim(), (100, 16));
    for r in [0usize, 17, 99] {
        for j in 0..8 {
            for f in 0..2 {
                let expected = ((r * 8 + j) * 100 + f) as f64;
                assert_eq!(out.stimulus[[r, j * 2 + f]], expected, "r={r} j={j} f={f}");
            }
        }
    }
}

#[test]
fn lag_equal_to_tr_does_not_lag() {
    let x = ramp_stimulus(800, 3);
    let out = align_stimulus(x.view(), 100, 0.0, &cfg(2.0, 0.25, Some(2.0))).unwrap();
    assert_eq!(out.stimulus.ncols(), 8 * 3);
    assert_eq!(out.timing.lag_tr, 1);
    assert!(out.warnings.contains(&AlignmentWarning::NoLagging { tr: 2.0 }));
    assert_eq!(count_nan(&out.stimulus), 0);
}

#[test]
fn lagged_half_repeats_previous_tr() {
    let x = ramp_stimulus(800, 3);
    let out = align_stimulus(x.view(), 100, 0.0, &cfg(2.0, 0.25, Some(4.0))).unwrap();
    let m = &out.stimulus;
    assert_eq!(m.dim(), (100, 48));
    assert!(m.slice(s![0, 24..]).iter().all(|v| v.is_nan()));
    for t in 1..100 {
        assert_eq!(m.slice(s![t, 24..]), m.slice(s![t - 1, ..24]), "row {t}");
    }
}

#[test]
fn start_time_prepends_fill_samples() {
    // 1 s onset at 0.25 s sampling → 4 fill samples in front.
    let x = ramp_stimulus(796, 1);
    let c = AlignConfig { fill_value: -1.0, ..cfg(2.0, 0.25, None) };
    let out = align_stimulus(x.view(), 100, 1.0, &c).unwrap();
    assert_eq!(out.stimulus.dim(), (100, 8));
    assert!(out.stimulus.slice(s![0, ..4]).iter().all(|&v| v == -1.0));
    assert_eq!(out.stimulus[[0, 4]], 0.0);
    assert_eq!(out.stimulus[[0, 7]], 300.0);
}

#[test]
fn offset_prepends_fill_rows() {
    let x = ramp_stimulus(800, 1);
    let c = AlignConfig { offset_stim: 4.0, ..cfg(2.0, 0.25, None) };
    let out = align_stimulus(x.view(), 100, 0.0, &c).unwrap();
    assert_eq!(out.timing.offset_tr, 2);
    assert_eq!(out.stimulus.nrows(), 102);
    assert_eq!(count_nan(&out.stimulus), 2 * 8);
    assert_eq!(out.stimulus[[2, 0]], 0.0);
}

#[test]
fn non_integer_rate_warns_and_rounds() {
    // 2.0 / 0.3 ≈ 6.67 → 7 samples per TR.
    let x = ramp_stimulus(70, 1);
    let out = align_stimulus(x.view(), 10, 0.0, &cfg(2.0, 0.3, None)).unwrap();
    assert_eq!(out.stimulus.dim(), (10, 7));
    assert!(out
        .warnings
        .iter()
        .any(|w| matches!(w, AlignmentWarning::NonIntegerSampleRatio { rounded: 7, .. })));
}

#[test]
fn invalid_timing_is_rejected() {
    let x = ramp_stimulus(10, 1);
    let is_invalid = |r: Result<_, AlignError>| matches!(r, Err(AlignError::InvalidArgument(_)));
    // Stimulus coarser than fMRI.
    assert!(is_invalid(align_stimulus(x.view(), 10, 0.0, &cfg(1.0, 2.0, None)).map(|_| ())));
    // Lag not a multiple of TR.
    assert!(is_invalid(align_stimulus(x.view(), 10, 0.0, &cfg(2.0, 1.0, Some(3.0))).map(|_| ())));
    // Non-positive TR.
    assert!(is_invalid(align_stimulus(x.view(), 10, 0.0, &cfg(0.0, 1.0, None)).map(|_| ())));
}

#[test]
fn zero_lag_behaves_like_no_lag() {
    let x = ramp_stimulus(40, 2);
    let zero = align_stimulus(x.view(), 20, 0.0, &cfg(2.0, 1.0, Some(0.0))).unwrap();
    let none = align_stimulus(x.view(), 20, 0.0, &cfg(2.0, 1.0, None)).unwrap();
    assert_eq!(zero.stimulus, none.stimulus);
    assert!(zero.warnings.contains(&AlignmentWarning::ZeroLagReset { tr: 2.0 }));
}
