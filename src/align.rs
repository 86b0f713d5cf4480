//! Temporal alignment of one stimulus run to one fMRI run.
//!
//! Steps (all sample counts derived with ties-to-even rounding):
//!   1. `spt = tr / stim_tr` stimulus samples per TR; must be >= 1, rounded
//!      with a warning when not integral.
//!   2. Resolve `lag_time` (None or ~0 → `tr`) and check it is a multiple of
//!      `tr`; `lag_tr = lag_time / tr`.
//!   3. `offset_tr = offset_stim / tr`.
//!   4. Prepend `start_time / stim_tr` fill rows (a negative start drops that
//!      many leading samples instead).
//!   5. Make the length divisible by `spt`: if the stimulus already covers
//!      more than `fmri_samples` TRs the remainder is trimmed at the END,
//!      otherwise fill rows are prepended at the START.
//!   6. Reshape to [n_tr, spt · F]: one row per TR.
//!   7. Prepend `offset_tr` fill rows when `offset_stim > 0`.
//!   8. Lag-expand with `lag_tr` copies unless lagging is disabled.
//!
//! The row count of the result equals `fmri_samples` for well-formed
//! inputs but may differ through offset and padding; the assembler
//! reconciles the difference.
use ndarray::{s, Array2, ArrayView2};

use crate::config::AlignConfig;
use crate::error::{AlignError, AlignmentWarning, Result};
use crate::lag::make_lagged_stimulus;
use crate::timing::{is_close, round_half_even, Ratio};

/// Aligned stimulus of one run plus the advisories raised while aligning.
#[derive(Debug, Clone)]
pub struct Aligned {
    /// [rows, lag_tr · spt · F]
    pub stimulus: Array2<f64>,
    pub timing: Timing,
    pub warnings: Vec<AlignmentWarning>,
}

/// Sample-count bookkeeping derived from an [`AlignConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Stimulus samples per fMRI TR.
    pub samples_per_tr: usize,
    /// Lagged copies per row; 1 means no lagging.
    pub lag_tr: usize,
    /// Fill rows prepended for `offset_stim`.
    pub offset_tr: usize,
}

impl Timing {
    /// Validate the sampling and lag parameters of `cfg`.
    pub fn resolve(cfg: &AlignConfig, warnings: &mut Vec<AlignmentWarning>) -> Result<Self> {
        let (tr, stim_tr) = (cfg.tr, cfg.stim_tr);
        if !(tr.is_finite() && tr > 0.0) {
            return Err(AlignError::invalid(format!("TR must be positive, got {tr}")));
        }
        if !(stim_tr.is_finite() && stim_tr > 0.0) {
            return Err(AlignError::invalid(format!("stimulus TR must be positive, got {stim_tr}")));
        }

        let spt = Ratio::of(tr, stim_tr);
        if spt.value < 1.0 {
            return Err(AlignError::invalid(format!(
                "stimulus TR ({stim_tr}) is larger than fMRI TR ({tr})"
            )));
        }
        if !spt.is_integral() {
            AlignmentWarning::NonIntegerSampleRatio {
                ratio: spt.value,
                rounded: spt.rounded as usize,
                tr,
                stim_tr,
            }
            .emit(warnings);
        }

        let mut lag_time = cfg.lag_time.unwrap_or(tr);
        if !lag_time.is_finite() {
            return Err(AlignError::invalid(format!("lag_time must be finite, got {lag_time}")));
        }
        if is_close(lag_time, 0.0) {
            AlignmentWarning::ZeroLagReset { tr }.emit(warnings);
            lag_time = tr;
        }
        if lag_time < 0.0 {
            return Err(AlignError::invalid(format!("lag_time must not be negative, got {lag_time}")));
        }
        if lag_time < tr {
            AlignmentWarning::LagShorterThanTr { lag_time, tr }.emit(warnings);
        }
        let lag = Ratio::of(lag_time, tr);
        if !lag.is_integral() {
            return Err(AlignError::invalid(format!(
                "lag_time ({lag_time}) should be a multiple of TR ({tr}) so that \
                 stimulus/fMRI alignment does not change"
            )));
        }
        // Lags below one TR round to 0 copies; keep the current TR.
        let lag_tr = (lag.rounded as usize).max(1);
        if lag_tr == 1 {
            AlignmentWarning::NoLagging { tr }.emit(warnings);
        }

        let offset_tr = round_half_even(cfg.offset_stim / tr).max(0) as usize;

        Ok(Self {
            samples_per_tr: spt.rounded as usize,
            lag_tr,
            offset_tr,
        })
    }
}

/// Build the lagged stimulus of one run, aligned to `fmri_samples` TRs.
///
/// `stimulus` is [stim_samples, F] sampled every `cfg.stim_tr` seconds;
/// `start_time` is the stimulus onset relative to the fMRI recording.
pub fn align_stimulus(
    stimulus: ArrayView2<f64>,
    fmri_samples: usize,
    start_time: f64,
    cfg: &AlignConfig,
) -> Result<Aligned> {
    let mut warnings = Vec::new();
    let timing = Timing::resolve(cfg, &mut warnings)?;
    if !start_time.is_finite() {
        return Err(AlignError::invalid(format!("start_time must be finite, got {start_time}")));
    }

    let n_features = stimulus.ncols();
    let spt = timing.samples_per_tr;
    let fill = cfg.fill_value;

    // Neither shift may reach past the stimulus plus the whole fMRI run.
    let max_shift = stimulus.nrows() + fmri_samples * spt;
    if timing.offset_tr > max_shift {
        return Err(AlignError::invalid(format!(
            "offset_stim ({}) shifts the stimulus by {} TRs, beyond the run",
            cfg.offset_stim, timing.offset_tr
        )));
    }

    // 4. Shift for the stimulus onset.
    let n_prepend = round_half_even(start_time / cfg.stim_tr);
    if n_prepend.unsigned_abs() > max_shift as u64 {
        return Err(AlignError::invalid(format!(
            "start_time ({start_time}) shifts the stimulus by {n_prepend} samples, beyond the run"
        )));
    }
    let mut stim = if n_prepend >= 0 {
        prepend_fill(stimulus, n_prepend as usize, fill)
    } else {
        let drop = (n_prepend.unsigned_abs() as usize).min(stimulus.nrows());
        stimulus.slice(s![drop.., ..]).to_owned()
    };

    // 5. Make divisible into whole TRs.
    let remainder = stim.nrows() % spt;
    if remainder > 0 {
        if stim.nrows() as f64 / spt as f64 > fmri_samples as f64 {
            let keep = stim.nrows() - remainder;
            stim = stim.slice(s![..keep, ..]).to_owned();
        } else {
            stim = prepend_fill(stim.view(), spt - remainder, fill);
        }
    }

    // 6. One row per TR.
    let n_tr = stim.nrows() / spt;
    let flat: Vec<f64> = stim.iter().copied().collect();
    let mut stim = Array2::from_shape_vec((n_tr, spt * n_features), flat)
        .map_err(|e| AlignError::invalid(format!("reshaping stimulus into TR chunks: {e}")))?;

    // 7. Offset.
    if cfg.offset_stim > 0.0 {
        stim = prepend_fill(stim.view(), timing.offset_tr, fill);
    }

    // 8. Lag.
    if timing.lag_tr > 1 {
        stim = make_lagged_stimulus(stim.view(), timing.lag_tr, fill);
    }

    tracing::debug!(
        rows = stim.nrows(),
        cols = stim.ncols(),
        fmri_samples,
        "aligned stimulus"
    );
    Ok(Aligned { stimulus: stim, timing, warnings })
}

fn prepend_fill(x: ArrayView2<f64>, n: usize, fill: f64) -> Array2<f64> {
    let mut out = Array2::from_elem((n + x.nrows(), x.ncols()), fill);
    out.slice_mut(s![n.., ..]).assign(&x);
    out
}
