//! # voxelwise — stimulus/fMRI alignment for voxel-wise encoding models
//!
//! `voxelwise` turns per-run stimulus representations and per-run fMRI
//! recordings into one pair of matrices `(X, Y)` ready for regression:
//! every row of `Y` is one fMRI sample and the same row of `X` holds the
//! (lagged) stimulus features that are allowed to predict it.
//!
//! ## Pipeline overview
//!
//! ```text
//! stimulus run i  [S_i, F] @ stim_tr        fMRI run i  [T_i, V] @ tr
//!   │                                          │
//!   ├─ align::align_stimulus()                 │   (optional) clean::clean()
//!   │    onset shift → TR chunking → offset → lag
//!   ├─ removal::remove_idx()  ─── same rows ───┤
//!   ├─ trim longer run at its end ─────────────┤
//!   │                                          │
//!   └──────── assemble::assemble() concatenates runs in order ───→ (X, Y)
//! ```
//!
//! ## Quick start
//!
//! ```
//! use voxelwise::{make_x_y, AlignConfig, RemoveNans};
//! use ndarray::Array2;
//!
//! // One run: 100 fMRI samples at TR = 2 s, stimulus sampled every 0.25 s.
//! let fmri     = vec![Array2::<f64>::zeros((100, 50))];
//! let stimulus = vec![Array2::<f64>::ones((800, 3))];
//!
//! let cfg = AlignConfig {
//!     lag_time: Some(4.0),            // current TR + one TR back
//!     remove_nans: RemoveNans::Keep,
//!     ..AlignConfig::new(2.0, 0.25)
//! };
//! let (x, y) = make_x_y(&stimulus, &fmri, &cfg).unwrap();
//! assert_eq!(x.dim(), (100, 2 * 8 * 3));
//! assert_eq!(y.nrows(), 100);
//! ```

pub mod align;
pub mod assemble;
pub mod bold;
pub mod clean;
pub mod config;
pub mod error;
pub mod io;
pub mod lag;
pub mod removal;
pub mod split;
pub mod timing;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use align::{align_stimulus, Aligned, Timing};
pub use assemble::{assemble, make_x_y, Assembled};
pub use bold::{preprocess_bold, to_samples_by_voxels};
pub use clean::{clean, Standardize};
pub use config::AlignConfig;
pub use error::{AlignError, AlignmentWarning};
pub use io::{write_xy, RunSet};
pub use lag::make_lagged_stimulus;
pub use removal::{delete_rows, remove_idx, RemoveNans};
pub use split::{Fold, LeaveOneRunOut};
