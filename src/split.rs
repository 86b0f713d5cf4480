//! Leave-one-run-out cross-validation folds.
//!
//! Given the row where each run starts in the concatenated `X`/`Y` (see
//! [`Assembled::run_starts`](crate::Assembled)), every run is used once as
//! the test set while all other rows form the training set.
use crate::error::{AlignError, Result};

/// Train/test row indices of one fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Leave-one-run-out splitter over `n_samples` rows.
#[derive(Debug, Clone)]
pub struct LeaveOneRunOut {
    run_starts: Vec<usize>,
    n_samples: usize,
}

impl LeaveOneRunOut {
    /// `run_starts` must be strictly increasing, begin at 0, and lie below
    /// `n_samples`.
    pub fn new(run_starts: Vec<usize>, n_samples: usize) -> Result<Self> {
        if run_starts.first() != Some(&0) {
            return Err(AlignError::invalid("run start indices must begin at 0"));
        }
        if run_starts.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AlignError::invalid("run start indices must be strictly increasing"));
        }
        if run_starts.last().is_some_and(|&s| s >= n_samples) {
            return Err(AlignError::invalid(format!(
                "run start index beyond the {n_samples} available samples"
            )));
        }
        Ok(Self { run_starts, n_samples })
    }

    pub fn n_splits(&self) -> usize {
        self.run_starts.len()
    }

    /// Rows `[start, end)` of run `i`.
    fn bounds(&self, i: usize) -> (usize, usize) {
        let start = self.run_starts[i];
        let end = self.run_starts.get(i + 1).copied().unwrap_or(self.n_samples);
        (start, end)
    }

    /// One fold per run, in run order.
    pub fn split(&self) -> impl Iterator<Item = Fold> + '_ {
        (0..self.n_splits()).map(move |i| {
            let (start, end) = self.bounds(i);
            Fold {
                train: (0..start).chain(end..self.n_samples).collect(),
                test: (start..end).collect(),
            }
        })
    }
}
