use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::models::NumericField;

#[derive(Parser)]
#[command(name = "spotviz", about = "Chart data from a music-track metadata CSV")]
pub struct Cli {
    /// Suppress stderr output (progress, logs).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output the chart document as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Output tooltip text for each record instead of TSV.
    #[arg(long, global = true, conflicts_with = "json")]
    pub tooltips: bool,

    /// Track CSV (defaults to the configured `data_path`).
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Config file (defaults to the per-user `spotviz/config.toml` if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Average energy per year, with the genres heard that year.
    Line,

    /// Bubbles of tracks binned by two numeric fields.
    Bubble(BubbleArgs),

    /// Genre-compatibility matrix for a chord diagram.
    Chord(ChordArgs),

    /// One bubble per genre with its most popular track.
    Network,

    /// Every track on the loudness/energy plane.
    Scatter,

    /// Write every chart as `<chart>.json` into a directory.
    Export {
        /// Output directory (created if missing).
        out_dir: PathBuf,
    },
}

#[derive(Args, Default)]
pub struct BubbleArgs {
    /// Field binned along x.
    #[arg(long, value_enum)]
    pub x_field: Option<NumericField>,

    /// Bin width along x.
    #[arg(long)]
    pub x_width: Option<f64>,

    /// Field binned along y.
    #[arg(long, value_enum)]
    pub y_field: Option<NumericField>,

    /// Bin width along y.
    #[arg(long)]
    pub y_width: Option<f64>,
}

#[derive(Args, Default)]
pub struct ChordArgs {
    /// Number of most frequent genres kept.
    #[arg(long)]
    pub max_genres: Option<usize>,

    /// Largest popularity difference of a compatible pair.
    #[arg(short = 't', long)]
    pub threshold: Option<f64>,

    /// Cells below this count are zeroed.
    #[arg(long)]
    pub min_count: Option<u64>,
}
