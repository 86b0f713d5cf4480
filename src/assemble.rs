//! Multi-run assembly of the feature matrix `X` and target matrix `Y`.
//!
//! Each run is aligned on its own, missing-value rows are removed from the
//! stimulus and the matching fMRI rows, any remaining length difference is
//! trimmed from the end of the longer matrix, and finally all runs are
//! stacked in input order.  Removal indices never cross run boundaries.
use ndarray::{concatenate, s, Array2, ArrayView2, Axis};

use crate::align::align_stimulus;
use crate::config::AlignConfig;
use crate::error::{AlignError, AlignmentWarning, Result};
use crate::removal::{delete_rows, remove_idx, RemoveNans};

/// Output of [`assemble`].
#[derive(Debug, Clone)]
pub struct Assembled {
    /// Lagged stimulus features, [N, lag_tr · spt · F].
    pub x: Array2<f64>,
    /// fMRI samples, [N, voxels], row-aligned with `x`.
    pub y: Array2<f64>,
    /// Row in `x`/`y` where each run begins.
    pub run_starts: Vec<usize>,
    pub warnings: Vec<AlignmentWarning>,
}

/// One run after alignment, removal and trimming.
struct RunPair {
    x: Array2<f64>,
    y: Array2<f64>,
    warnings: Vec<AlignmentWarning>,
}

/// Align every stimulus run to its fMRI run and concatenate along time.
///
/// `stimuli[i]` is [stim_samples_i, F] and `fmri[i]` is [samples_i, V].
///
/// # Errors
///
/// [`AlignError::InvalidArgument`] if the run counts differ, no runs are
/// given, feature or voxel counts differ between runs, `start_times` does
/// not have one entry per run, or any run's parameters are rejected by
/// [`align_stimulus`].
pub fn assemble(stimuli: &[Array2<f64>], fmri: &[Array2<f64>], cfg: &AlignConfig) -> Result<Assembled> {
    validate_runs(stimuli, fmri, cfg)?;

    let runs = stimuli
        .iter()
        .zip(fmri)
        .enumerate()
        .map(|(i, (stim, bold))| assemble_run(i, stim.view(), bold.view(), cfg))
        .collect::<Result<Vec<_>>>()?;

    let run_starts: Vec<usize> = runs
        .iter()
        .scan(0usize, |acc, r| {
            let start = *acc;
            *acc += r.x.nrows();
            Some(start)
        })
        .collect();

    let xs: Vec<_> = runs.iter().map(|r| r.x.view()).collect();
    let ys: Vec<_> = runs.iter().map(|r| r.y.view()).collect();
    let x = concatenate(Axis(0), &xs)
        .map_err(|e| AlignError::invalid(format!("concatenating stimulus runs: {e}")))?;
    let y = concatenate(Axis(0), &ys)
        .map_err(|e| AlignError::invalid(format!("concatenating fMRI runs: {e}")))?;
    let warnings = runs.into_iter().flat_map(|r| r.warnings).collect();

    tracing::debug!(rows = x.nrows(), features = x.ncols(), voxels = y.ncols(), "assembled X/Y");
    Ok(Assembled { x, y, run_starts, warnings })
}

/// [`assemble`] returning only `(X, Y)`.
pub fn make_x_y(
    stimuli: &[Array2<f64>],
    fmri: &[Array2<f64>],
    cfg: &AlignConfig,
) -> Result<(Array2<f64>, Array2<f64>)> {
    let out = assemble(stimuli, fmri, cfg)?;
    Ok((out.x, out.y))
}

fn validate_runs(stimuli: &[Array2<f64>], fmri: &[Array2<f64>], cfg: &AlignConfig) -> Result<()> {
    if stimuli.len() != fmri.len() {
        return Err(AlignError::invalid(format!(
            "stimulus and fMRI need to have the same number of runs, \
             instead fMRI has {} and stimulus {} runs",
            fmri.len(),
            stimuli.len()
        )));
    }
    let (Some(first_stim), Some(first_bold)) = (stimuli.first(), fmri.first()) else {
        return Err(AlignError::invalid("no runs given"));
    };
    if stimuli.iter().any(|s| s.ncols() != first_stim.ncols()) {
        return Err(AlignError::invalid("stimulus has different number of features per run"));
    }
    if fmri.iter().any(|f| f.ncols() != first_bold.ncols()) {
        return Err(AlignError::invalid("fMRI has different number of voxels per run"));
    }
    if let Some(starts) = &cfg.start_times {
        if starts.len() != stimuli.len() {
            return Err(AlignError::invalid(format!(
                "{} start times given for {} runs",
                starts.len(),
                stimuli.len()
            )));
        }
    }
    Ok(())
}

fn assemble_run(
    run: usize,
    stimulus: ArrayView2<f64>,
    bold: ArrayView2<f64>,
    cfg: &AlignConfig,
) -> Result<RunPair> {
    let aligned = align_stimulus(stimulus, bold.nrows(), cfg.start_time(run), cfg)?;
    let offset_tr = aligned.timing.offset_tr;
    let mut warnings = aligned.warnings;
    let mut x = aligned.stimulus;
    let mut y = bold.to_owned();

    if cfg.remove_nans.is_active() {
        // The same indices apply to both matrices; rows past the end of the
        // fMRI run have no counterpart and are trimmed below anyway.
        let idx = remove_idx(x.view(), cfg.remove_nans)?;
        x = delete_rows(x.view(), idx.as_deref())?;
        y = delete_rows(y.view(), idx.as_deref())?;
        if let RemoveNans::Threshold(_) = cfg.remove_nans {
            x.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v });
        }
    }

    let (n_y, n_x) = (y.nrows(), x.nrows());
    if n_y != n_x {
        if offset_tr < n_y.abs_diff(n_x) {
            AlignmentWarning::RunLengthMismatch {
                run,
                fmri_rows: n_y,
                stimulus_rows: n_x,
                tr: cfg.tr,
            }
            .emit(&mut warnings);
        }
        let n = n_y.min(n_x);
        y = y.slice(s![..n, ..]).to_owned();
        x = x.slice(s![..n, ..]).to_owned();
    }

    tracing::debug!(run, rows = x.nrows(), "run assembled");
    Ok(RunPair { x, y, warnings })
}
