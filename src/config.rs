//! Chart configuration: built-in defaults, an optional TOML file, then
//! command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bins::BinSpec;
use crate::chord::ChordParams;
use crate::models::{DEFAULT_DATA_FILE, NumericField};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleParams {
    pub x: BinSpec,
    pub y: BinSpec,
}

impl Default for BubbleParams {
    fn default() -> Self {
        Self {
            x: BinSpec {
                field: NumericField::Loudness,
                width: 2.0,
            },
            y: BinSpec {
                field: NumericField::Energy,
                width: 10.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineParams {
    /// Added above the highest mean energy on the y domain.
    pub energy_headroom: f64,
}

impl Default for LineParams {
    fn default() -> Self {
        Self {
            energy_headroom: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    /// Longest genre label drawn inside a bubble.
    pub label_chars: usize,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self { label_chars: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterParams {
    pub zoom_min: f64,
    pub zoom_max: f64,
}

impl Default for ScatterParams {
    fn default() -> Self {
        Self {
            zoom_min: 1.0,
            zoom_max: 5.0,
        }
    }
}

/// Everything the chart pipelines read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_path: PathBuf,
    pub bubble: BubbleParams,
    pub chord: ChordParams,
    pub line: LineParams,
    pub network: NetworkParams,
    pub scatter: ScatterParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            bubble: BubbleParams::default(),
            chord: ChordParams::default(),
            line: LineParams::default(),
            network: NetworkParams::default(),
            scatter: ScatterParams::default(),
        }
    }
}

/// Per-user config file location.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spotviz").join("config.toml"))
}

impl Config {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid config")
    }

    /// Load the explicit config file if given (it must exist), otherwise the
    /// per-user file if present, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.is_file() => p,
                _ => {
                    debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Reject values the pipelines cannot work with.
    pub fn validate(&self) -> Result<()> {
        for (name, spec) in [("bubble.x", self.bubble.x), ("bubble.y", self.bubble.y)] {
            if !(spec.width.is_finite() && spec.width > 0.0) {
                bail!("{name}.width must be a positive number, got {}", spec.width);
            }
        }
        let threshold = self.chord.popularity_threshold;
        if !(threshold.is_finite() && threshold >= 0.0) {
            bail!("chord.popularity_threshold must be zero or more, got {threshold}");
        }
        if self.chord.max_genres == 0 {
            bail!("chord.max_genres must be at least 1");
        }
        if !self.line.energy_headroom.is_finite() {
            bail!("line.energy_headroom must be a finite number");
        }
        let (lo, hi) = (self.scatter.zoom_min, self.scatter.zoom_max);
        if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo <= hi) {
            bail!("scatter zoom extent must satisfy 0 < zoom_min <= zoom_max, got [{lo}, {hi}]");
        }
        Ok(())
    }
}
