//! Error and advisory types for the alignment core.
//!
//! Fatal problems with the inputs surface as [`AlignError`].  Conditions the
//! core can recover from (by rounding, resetting or trimming) are reported as
//! [`AlignmentWarning`] values: each one is logged through `tracing::warn!`
//! and also handed back to the caller so it can be inspected.
use std::fmt;
use thiserror::Error;

/// Fatal error raised by the alignment core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignError {
    /// Malformed parameter or inconsistent input shapes.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl AlignError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        AlignError::InvalidArgument(msg.into())
    }
}

pub type Result<T, E = AlignError> = std::result::Result<T, E>;

/// Non-fatal alignment advisory.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentWarning {
    /// `tr / stim_tr` is not an integer; it was rounded to `rounded`.
    NonIntegerSampleRatio {
        ratio: f64,
        rounded: usize,
        tr: f64,
        stim_tr: f64,
    },
    /// `lag_time` is shorter than one TR.
    LagShorterThanTr { lag_time: f64, tr: f64 },
    /// `lag_time` was zero and has been reset to one TR.
    ZeroLagReset { tr: f64 },
    /// `lag_time` resolves to exactly one TR, so no lagged copies are added.
    NoLagging { tr: f64 },
    /// Signal and stimulus row counts of a run differed by more than the
    /// offset accounts for; the longer one was trimmed at its end.
    RunLengthMismatch {
        run: usize,
        fmri_rows: usize,
        stimulus_rows: usize,
        tr: f64,
    },
}

impl fmt::Display for AlignmentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            AlignmentWarning::NonIntegerSampleRatio { ratio, rounded, tr, stim_tr } => write!(
                f,
                "stimulus and fMRI timing do not align: {ratio} stimulus samples per fMRI \
                 sample (stimulus TR {stim_tr}, fMRI TR {tr}); rounding to {rounded}"
            ),
            AlignmentWarning::LagShorterThanTr { lag_time, tr } => {
                write!(f, "lag_time ({lag_time}) should not be smaller than TR ({tr})")
            }
            AlignmentWarning::ZeroLagReset { tr } => write!(
                f,
                "lag_time set to 0; to disable lagging set lag_time to None or TR ({tr}). \
                 Using lag_time = TR"
            ),
            AlignmentWarning::NoLagging { tr } => {
                write!(f, "lag_time is None or equal to TR ({tr}), no stimulus lagging will be done")
            }
            AlignmentWarning::RunLengthMismatch { run, fmri_rows, stimulus_rows, tr } => write!(
                f,
                "run {run}: fMRI and stimulus samples differ (fMRI: {}s, stimulus: {}s); \
                 trimming the longer one. The recording may have continued after the stimulus \
                 ended, stopped early, or preprocessing went wrong",
                tr * fmri_rows as f64,
                tr * stimulus_rows as f64
            ),
        }
    }
}

impl AlignmentWarning {
    /// Log the advisory and append it to `sink`.
    pub(crate) fn emit(self, sink: &mut Vec<AlignmentWarning>) {
        tracing::warn!("{self}");
        sink.push(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_message() {
        let e = AlignError::invalid("bad policy");
        assert_eq!(e.to_string(), "invalid argument: bad policy");
    }

    #[test]
    fn mismatch_warning_reports_seconds() {
        let w = AlignmentWarning::RunLengthMismatch {
            run: 1,
            fmri_rows: 10,
            stimulus_rows: 7,
            tr: 2.0,
        };
        let msg = w.to_string();
        assert!(msg.contains("fMRI: 20s"), "{msg}");
        assert!(msg.contains("stimulus: 14s"), "{msg}");
    }
}
