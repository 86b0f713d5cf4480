use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use voxelwise::{assemble, clean, io::write_xy, AlignConfig, RunSet, Standardize};

#[derive(Parser, Debug)]
#[command(name = "make_xy", about = "Align stimulus runs to fMRI runs and write lagged X / aligned Y")]
struct Args {
    /// Safetensors file with stimulus_<i> and fmri_<i> tensors.
    #[arg(long)]
    input: PathBuf,

    /// JSON alignment config (tr, stim_tr, lag_time, offset_stim, ...).
    #[arg(long)]
    config: PathBuf,

    /// Output safetensors path (X, Y, run_starts).
    #[arg(long)]
    output: PathBuf,

    /// Override the fMRI repetition time from the config (s).
    #[arg(long)]
    tr: Option<f64>,

    /// Override the stimulus sampling interval from the config (s).
    #[arg(long)]
    stim_tr: Option<f64>,

    /// Linearly detrend every voxel before alignment.
    #[arg(long)]
    detrend: bool,

    /// Voxel-wise standardisation: zscore, psc or none.
    #[arg(long, default_value_t = Standardize::None)]
    standardize: Standardize,

    /// trace, debug, info, warn or error.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut cfg = AlignConfig::from_json_file(&args.config)?;
    if let Some(tr) = args.tr {
        cfg.tr = tr;
    }
    if let Some(stim_tr) = args.stim_tr {
        cfg.stim_tr = stim_tr;
    }
    info!(?cfg, "alignment config");

    let runs = RunSet::load(&args.input)?;
    info!("Loaded {} runs from {}", runs.stimuli.len(), args.input.display());

    let fmri: Vec<_> = if args.detrend || args.standardize != Standardize::None {
        runs.fmri.iter().map(|f| clean(f, args.detrend, args.standardize)).collect()
    } else {
        runs.fmri
    };

    let out = assemble(&runs.stimuli, &fmri, &cfg)?;
    if !out.warnings.is_empty() {
        warn!("{} alignment warnings", out.warnings.len());
    }
    info!("X: {:?}  Y: {:?}", out.x.dim(), out.y.dim());

    write_xy(&out, &args.output)?;
    info!("Written → {}", args.output.display());
    Ok(())
}
