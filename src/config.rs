//! Alignment configuration.
//!
//! [`AlignConfig`] holds every parameter of the alignment and lagging step.
//! It can be built in code with struct-update syntax or parsed from the JSON
//! "preprocessing config" used by analysis scripts:
//!
//! ```json
//! { "tr": 2.0, "stim_tr": 0.1, "lag_time": 6.0, "offset_stim": 0.0,
//!   "start_times": [0.0, 2.0], "fill_value": null, "remove_nans": 0.5 }
//! ```
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::removal::RemoveNans;

/// Configuration for aligning stimulus runs to fMRI runs.
///
/// ```
/// use voxelwise::{AlignConfig, RemoveNans};
///
/// let cfg = AlignConfig {
///     lag_time: Some(4.0),
///     remove_nans: RemoveNans::Keep,
///     ..AlignConfig::new(2.0, 0.25)
/// };
/// assert_eq!(cfg.offset_stim, 0.0);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AlignConfig {
    /// Repetition time of the fMRI data in seconds.
    pub tr: f64,

    /// Sampling interval of the stimulus representation in seconds.
    /// Must not be larger than `tr`.
    pub stim_tr: f64,

    /// Total lag window in seconds; must be a multiple of `tr`.
    ///
    /// `lag_time / tr` copies of the TR-chunked stimulus are stacked per row.
    /// `None` (JSON `null`) or a value equal to `tr` disables lagging.
    ///
    /// Default: `Some(6.0)`.
    #[serde(default = "default_lag_time")]
    pub lag_time: Option<f64>,

    /// Per-run start time of the stimulus relative to the fMRI recording,
    /// in seconds.  `None` means every run starts at 0.
    #[serde(default)]
    pub start_times: Option<Vec<f64>>,

    /// Shift the stimulus this many seconds later relative to the fMRI, so
    /// that the sample at time `t` is predicted only from stimulus before
    /// `t - offset_stim`.
    ///
    /// Default: `0.0`.
    #[serde(default)]
    pub offset_stim: f64,

    /// Value placed where no stimulus exists (before the start, padding,
    /// offset and lag rows).  JSON `null` means NaN.
    ///
    /// Default: NaN.
    #[serde(default = "default_fill_value", deserialize_with = "nan_if_null")]
    pub fill_value: f64,

    /// Missing-value row removal policy.
    ///
    /// Default: [`RemoveNans::All`].
    #[serde(default)]
    pub remove_nans: RemoveNans,
}

fn default_lag_time() -> Option<f64> {
    Some(6.0)
}

fn default_fill_value() -> f64 {
    f64::NAN
}

fn nan_if_null<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
}

impl AlignConfig {
    /// Defaults for the given fMRI and stimulus sampling intervals:
    /// 6 s lag window, no offset, NaN fill, remove every row with NaNs.
    pub fn new(tr: f64, stim_tr: f64) -> Self {
        Self {
            tr,
            stim_tr,
            lag_time: default_lag_time(),
            start_times: None,
            offset_stim: 0.0,
            fill_value: default_fill_value(),
            remove_nans: RemoveNans::default(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("failed to parse alignment config")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Start time for run `run`, 0 when no start times are configured.
    pub fn start_time(&self, run: usize) -> f64 {
        self.start_times
            .as_ref()
            .and_then(|t| t.get(run).copied())
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_defaults() {
        let cfg = AlignConfig::from_json_str(r#"{"tr": 2.0, "stim_tr": 0.5}"#).unwrap();
        assert_eq!(cfg.lag_time, Some(6.0));
        assert_eq!(cfg.offset_stim, 0.0);
        assert!(cfg.fill_value.is_nan());
        assert_eq!(cfg.remove_nans, RemoveNans::All);
        assert_eq!(cfg.start_time(3), 0.0);
    }

    #[test]
    fn json_full() {
        let cfg = AlignConfig::from_json_str(
            r#"{"tr": 2.0, "stim_tr": 0.1, "lag_time": null, "start_times": [0.0, 1.5],
                "offset_stim": 4.0, "fill_value": 0.0, "remove_nans": 0.3}"#,
        )
        .unwrap();
        assert_eq!(cfg.lag_time, None);
        assert_eq!(cfg.start_time(1), 1.5);
        assert_eq!(cfg.fill_value, 0.0);
        assert_eq!(cfg.remove_nans, RemoveNans::Threshold(0.3));
    }

    #[test]
    fn null_fill_is_nan() {
        let cfg = AlignConfig::from_json_str(r#"{"tr": 1.0, "stim_tr": 1.0, "fill_value": null}"#)
            .unwrap();
        assert!(cfg.fill_value.is_nan());
    }

    #[test]
    fn missing_tr_is_error() {
        assert!(AlignConfig::from_json_str(r#"{"stim_tr": 0.5}"#).is_err());
        assert!(AlignConfig::from_json_str(r#"{"tr": 2.0, "stim_tr": 0.5, "remove_nans": 2}"#).is_err());
    }
}
