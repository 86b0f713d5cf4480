//! Safetensors I/O for stimulus/fMRI runs and assembled X/Y matrices.
//!
//! Input layout (one file per subject/task):
//!   stimulus_0, stimulus_1, …   [stim_samples_i, F]   F32 or F64
//!   fmri_0,     fmri_1,     …   [samples_i, V]        F32 or F64
//!
//! [`RunSet::save`] writes the input layout; [`write_xy`] writes:
//!   X            [N, features]   F64
//!   Y            [N, voxels]     F64
//!   run_starts   [runs]          I64
use anyhow::{bail, ensure, Context, Result};
use ndarray::Array2;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::assemble::Assembled;

// ── Low-level safetensors parser ─────────────────────────────────────────────

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, Value>, usize)> {
    ensure!(bytes.len() >= 8, "safetensors file too small");
    let n = u64::from_le_bytes(bytes[..8].try_into()?) as usize;
    ensure!(bytes.len() >= 8 + n, "safetensors header truncated");
    let header: HashMap<String, Value> =
        serde_json::from_slice(&bytes[8..8 + n]).context("failed to parse safetensors header")?;
    Ok((header, 8 + n))
}

fn read_matrix(bytes: &[u8], data_start: usize, name: &str, entry: &Value) -> Result<Array2<f64>> {
    let offsets = entry["data_offsets"]
        .as_array()
        .with_context(|| format!("'{name}': missing data_offsets"))?;
    let (s, e) = match offsets.as_slice() {
        [s, e] => (
            s.as_u64().context("bad offset")? as usize,
            e.as_u64().context("bad offset")? as usize,
        ),
        _ => bail!("'{name}': data_offsets must have two entries"),
    };
    let raw = bytes
        .get(data_start + s..data_start + e)
        .with_context(|| format!("'{name}': data out of bounds"))?;

    let shape: Vec<usize> = entry["shape"]
        .as_array()
        .with_context(|| format!("'{name}': missing shape"))?
        .iter()
        .map(|v| v.as_u64().map(|x| x as usize).context("bad shape entry"))
        .collect::<Result<_>>()?;
    ensure!(shape.len() == 2, "'{name}': expected a 2-D tensor, got shape {shape:?}");

    let values: Vec<f64> = match entry["dtype"].as_str() {
        Some("F32") => raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
            .collect(),
        Some("F64") => raw
            .chunks_exact(8)
            .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
            .collect(),
        other => bail!("'{name}': unsupported dtype {other:?}"),
    };
    Array2::from_shape_vec((shape[0], shape[1]), values)
        .with_context(|| format!("'{name}': shape does not match data length"))
}

// ── Runs ──────────────────────────────────────────────────────────────────────

/// Stimulus and fMRI runs loaded from one safetensors file.
#[derive(Debug, Clone)]
pub struct RunSet {
    /// [stim_samples_i, F] per run.
    pub stimuli: Vec<Array2<f64>>,
    /// [samples_i, V] per run.
    pub fmri: Vec<Array2<f64>>,
}

impl RunSet {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let (header, data_start) = parse_header(&bytes)?;

        let load_series = |prefix: &str| -> Result<Vec<Array2<f64>>> {
            let mut out = Vec::new();
            while let Some(entry) = header.get(&format!("{prefix}_{}", out.len())) {
                let name = format!("{prefix}_{}", out.len());
                out.push(read_matrix(&bytes, data_start, &name, entry)?);
            }
            Ok(out)
        };

        let stimuli = load_series("stimulus")?;
        let fmri = load_series("fmri")?;
        ensure!(!stimuli.is_empty(), "no 'stimulus_0' tensor in {}", path.display());
        Ok(RunSet { stimuli, fmri })
    }
}

// ── Writer ────────────────────────────────────────────────────────────────────

/// A named tensor queued for writing; payload already little-endian.
struct Tensor {
    name: String,
    dtype: &'static str,
    shape: Vec<usize>,
    bytes: Vec<u8>,
}

impl Tensor {
    fn matrix(name: impl Into<String>, m: &Array2<f64>) -> Self {
        Self {
            name: name.into(),
            dtype: "F64",
            shape: vec![m.nrows(), m.ncols()],
            bytes: m.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    fn indices(name: impl Into<String>, idx: &[usize]) -> Self {
        Self {
            name: name.into(),
            dtype: "I64",
            shape: vec![idx.len()],
            bytes: idx.iter().flat_map(|&i| (i as i64).to_le_bytes()).collect(),
        }
    }
}

/// Header length, space-padded JSON header, then the payloads in order.
fn write_tensors(tensors: &[Tensor], path: &Path) -> Result<()> {
    use std::io::Write;

    let mut header = serde_json::Map::new();
    let mut offset = 0usize;
    for t in tensors {
        let end = offset + t.bytes.len();
        header.insert(
            t.name.clone(),
            serde_json::json!({ "dtype": t.dtype, "shape": t.shape, "data_offsets": [offset, end] }),
        );
        offset = end;
    }
    let mut hdr = serde_json::to_vec(&header)?;
    hdr.resize(hdr.len().next_multiple_of(8), b' ');

    let mut f = std::io::BufWriter::new(
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    f.write_all(&(hdr.len() as u64).to_le_bytes())?;
    f.write_all(&hdr)?;
    for t in tensors {
        f.write_all(&t.bytes)?;
    }
    f.flush()?;
    Ok(())
}

impl RunSet {
    /// Write the runs in the layout [`RunSet::load`] reads.
    pub fn save(&self, path: &Path) -> Result<()> {
        let stim = self.stimuli.iter().enumerate().map(|(i, m)| Tensor::matrix(format!("stimulus_{i}"), m));
        let fmri = self.fmri.iter().enumerate().map(|(i, m)| Tensor::matrix(format!("fmri_{i}"), m));
        write_tensors(&stim.chain(fmri).collect::<Vec<_>>(), path)
    }
}

/// Write `X`, `Y` and `run_starts` of an assembly.
pub fn write_xy(out: &Assembled, path: &Path) -> Result<()> {
    write_tensors(
        &[
            Tensor::matrix("X", &out.x),
            Tensor::matrix("Y", &out.y),
            Tensor::indices("run_starts", &out.run_starts),
        ],
        path,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn runs_load_in_index_order() {
        let path = std::env::temp_dir().join(format!("voxelwise_runs_{}.safetensors", std::process::id()));
        let saved = RunSet {
            stimuli: vec![array![[5.0]], array![[7.0], [8.0]]],
            fmri: vec![array![[1.0, 2.0]], array![[3.0, 4.0]]],
        };
        saved.save(&path).unwrap();

        let runs = RunSet::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(runs.stimuli.len(), 2);
        assert_eq!(runs.fmri.len(), 2);
        assert_eq!(runs.stimuli[1], array![[7.0], [8.0]]);
        assert_eq!(runs.fmri[1], array![[3.0, 4.0]]);
    }

    #[test]
    fn xy_layout() {
        let path = std::env::temp_dir().join(format!("voxelwise_xy_{}.safetensors", std::process::id()));
        let out = Assembled {
            x: array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
            y: array![[0.5], [0.25], [0.125]],
            run_starts: vec![0, 2],
            warnings: vec![],
        };
        write_xy(&out, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let (header, data_start) = parse_header(&bytes).unwrap();
        assert_eq!(data_start % 8, 0);
        assert_eq!(read_matrix(&bytes, data_start, "X", &header["X"]).unwrap(), out.x);
        assert_eq!(read_matrix(&bytes, data_start, "Y", &header["Y"]).unwrap(), out.y);

        let starts = &header["run_starts"];
        assert_eq!(starts["dtype"], "I64");
        let s = starts["data_offsets"][0].as_u64().unwrap() as usize + data_start;
        let raw = &bytes[s..s + 16];
        assert_eq!(i64::from_le_bytes(raw[..8].try_into().unwrap()), 0);
        assert_eq!(i64::from_le_bytes(raw[8..].try_into().unwrap()), 2);
    }

    #[test]
    fn truncated_file_is_error() {
        assert!(parse_header(&[1, 2, 3]).is_err());
        assert!(parse_header(&[255, 0, 0, 0, 0, 0, 0, 0, b'{']).is_err());
    }
}
