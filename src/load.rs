use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use crate::models::{REQUIRED_COLUMNS, Track, parse_number, parse_year};

/// Positions of the required columns in the header row.
struct Columns {
    title: usize,
    artist: usize,
    top_genre: usize,
    year: usize,
    energy: usize,
    loudness_db: usize,
    popularity: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| find(*c).is_none())
            .collect();
        if !missing.is_empty() {
            bail!("missing required column(s): {}", missing.join(", "));
        }

        // Every lookup below succeeded in the check above.
        let at = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            title: at("title"),
            artist: at("artist"),
            top_genre: at("top_genre"),
            year: at("year"),
            energy: at("energy"),
            loudness_db: at("loudness_db"),
            popularity: at("popularity"),
        })
    }

    fn track(&self, record: &csv::StringRecord) -> Track {
        let text = |i: usize| record.get(i).unwrap_or_default().trim().to_string();
        let number = |i: usize| record.get(i).and_then(parse_number);
        Track {
            title: text(self.title),
            artist: text(self.artist),
            top_genre: text(self.top_genre),
            year: record.get(self.year).and_then(parse_year),
            energy: number(self.energy),
            loudness_db: number(self.loudness_db),
            popularity: number(self.popularity),
        }
    }
}

/// Per-column counts of numeric cells that were empty or not numbers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub rows: usize,
    pub missing_year: usize,
    pub missing_energy: usize,
    pub missing_loudness: usize,
    pub missing_popularity: usize,
}

impl LoadReport {
    fn record(&mut self, track: &Track) {
        self.rows += 1;
        self.missing_year += usize::from(track.year.is_none());
        self.missing_energy += usize::from(track.energy.is_none());
        self.missing_loudness += usize::from(track.loudness_db.is_none());
        self.missing_popularity += usize::from(track.popularity.is_none());
    }

    fn has_gaps(&self) -> bool {
        self.missing_year + self.missing_energy + self.missing_loudness + self.missing_popularity
            > 0
    }
}

/// Read tracks from any CSV source.
pub fn read_tracks<R: Read>(reader: R, pb: &ProgressBar) -> Result<(Vec<Track>, LoadReport)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers().context("failed to read CSV header")?.clone();
    let columns = Columns::from_headers(&headers)?;

    let mut tracks = Vec::new();
    let mut report = LoadReport::default();
    for (idx, record) in csv_reader.records().enumerate() {
        // Row numbers are 1-based and count the header line.
        let record = record.with_context(|| format!("failed to read CSV row {}", idx + 2))?;
        let track = columns.track(&record);
        report.record(&track);
        tracks.push(track);
        pb.inc(1);
    }

    if report.has_gaps() {
        warn!(
            rows = report.rows,
            missing_year = report.missing_year,
            missing_energy = report.missing_energy,
            missing_loudness = report.missing_loudness,
            missing_popularity = report.missing_popularity,
            "some numeric cells are missing or not numbers; affected records are left out of those aggregates"
        );
    }

    Ok((tracks, report))
}

/// Load the track file at `path`.
pub fn load_tracks(path: &Path, quiet: bool) -> Result<Vec<Track>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("[{elapsed_precise}] {spinner} {pos} rows {msg}")
                .context("progress bar template")?,
        );
        pb.set_message(format!("Loading {}", path.display()));
        pb
    };

    let (tracks, report) = read_tracks(file, &pb)
        .with_context(|| format!("failed to load {}", path.display()))?;
    pb.finish_and_clear();

    debug!(rows = report.rows, path = %path.display(), "loaded tracks");
    Ok(tracks)
}
