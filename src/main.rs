#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod bins;
mod charts;
mod chord;
mod cli;
mod config;
mod load;
mod models;
mod rollup;
mod scales;
mod tooltip;

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use charts::{ChartData, ChartKind};
use cli::{BubbleArgs, ChordArgs, Cli, Command};
use config::Config;

#[derive(Clone, Copy)]
struct OutputOptions {
    json: bool,
    tooltips: bool,
}

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let result = run(cli);

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }
    let out = OutputOptions {
        json: cli.json,
        tooltips: cli.tooltips,
    };

    match cli.command {
        Command::Line => cmd_chart(ChartKind::Line, &config, cli.quiet, out),
        Command::Bubble(args) => {
            apply_bubble_args(&mut config, &args);
            cmd_chart(ChartKind::Bubble, &config, cli.quiet, out)
        }
        Command::Chord(args) => {
            apply_chord_args(&mut config, &args);
            cmd_chart(ChartKind::Chord, &config, cli.quiet, out)
        }
        Command::Network => cmd_chart(ChartKind::Network, &config, cli.quiet, out),
        Command::Scatter => cmd_chart(ChartKind::Scatter, &config, cli.quiet, out),
        Command::Export { out_dir } => cmd_export(&out_dir, &config, cli.quiet),
    }
}

fn apply_bubble_args(config: &mut Config, args: &BubbleArgs) {
    let bubble = &mut config.bubble;
    if let Some(field) = args.x_field {
        bubble.x.field = field;
    }
    if let Some(width) = args.x_width {
        bubble.x.width = width;
    }
    if let Some(field) = args.y_field {
        bubble.y.field = field;
    }
    if let Some(width) = args.y_width {
        bubble.y.width = width;
    }
}

fn apply_chord_args(config: &mut Config, args: &ChordArgs) {
    let chord = &mut config.chord;
    if let Some(n) = args.max_genres {
        chord.max_genres = n;
    }
    if let Some(t) = args.threshold {
        chord.popularity_threshold = t;
    }
    if let Some(m) = args.min_count {
        chord.min_count = m;
    }
}

fn cmd_chart(kind: ChartKind, config: &Config, quiet: bool, out: OutputOptions) -> Result<i32> {
    config.validate()?;
    let tracks = load::load_tracks(&config.data_path, quiet)?;
    let chart = charts::build_chart(kind, &tracks, config);
    if chart.is_empty() {
        info!(chart = kind.name(), tracks = tracks.len(), "chart has no records");
    }
    output_chart(&chart, out)?;
    Ok(0)
}

fn cmd_export(out_dir: &Path, config: &Config, quiet: bool) -> Result<i32> {
    config.validate()?;
    let tracks = load::load_tracks(&config.data_path, quiet)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    for kind in ChartKind::ALL {
        let chart = charts::build_chart(kind, &tracks, config);
        let path = out_dir.join(format!("{}.json", chart.kind().name()));
        let body = serde_json::to_string_pretty(&chart)?;
        std::fs::write(&path, body)
            .with_context(|| format!("failed to write {}", path.display()))?;
        if !quiet {
            eprintln!("Wrote {} ({} records)", path.display(), chart.len());
        }
    }
    Ok(0)
}

fn output_chart(chart: &ChartData, out: OutputOptions) -> Result<()> {
    if out.json {
        println!("{}", serde_json::to_string(chart)?);
    } else if out.tooltips {
        for tip in chart.tooltips() {
            println!("{tip}\n");
        }
    } else {
        for line in chart.tsv_lines() {
            println!("{line}");
        }
    }
    Ok(())
}
