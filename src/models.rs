#![allow(clippy::doc_markdown)]

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// CSV file the charts are built from unless configured otherwise.
pub const DEFAULT_DATA_FILE: &str = "spotclean.csv";

/// Columns every input file must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "title", "artist", "top_genre", "year", "energy", "loudness_db", "popularity",
];

/// Display name used for records with an empty genre.
pub const UNKNOWN_GENRE: &str = "Unknown";

/// One row of the input file. Numeric values are `None` when the cell was
/// empty or not a finite number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub top_genre: String,
    pub year: Option<i32>,
    pub energy: Option<f64>,
    pub loudness_db: Option<f64>,
    pub popularity: Option<f64>,
}

impl Track {
    /// Value of a numeric field, if present.
    #[must_use]
    pub fn value(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::Year => self.year.map(f64::from),
            NumericField::Energy => self.energy,
            NumericField::Loudness => self.loudness_db,
            NumericField::Popularity => self.popularity,
        }
    }

    /// Genre as shown to the user.
    #[must_use]
    pub fn genre_label(&self) -> &str {
        if self.top_genre.is_empty() {
            UNKNOWN_GENRE
        } else {
            &self.top_genre
        }
    }
}

/// Numeric columns that can be binned or averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Year,
    Energy,
    Loudness,
    Popularity,
}

impl NumericField {
    /// Name used in tooltips.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Year => "Year",
            Self::Energy => "Energy",
            Self::Loudness => "Loudness",
            Self::Popularity => "Popularity",
        }
    }
}

/// Parse a numeric cell. Empty, non-numeric and non-finite values are missing.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a year cell. Accepts `2010` and `2010.0`, rejects fractional years.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn parse_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    let value = parse_number(trimmed)?;
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return None;
    }
    Some(value as i32)
}

/// Format an optional mean for display.
#[must_use]
pub fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

/// Arithmetic mean of the present values, with the number of samples used.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_of<I>(values: I) -> (Option<f64>, usize)
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values.into_iter().flatten() {
        sum += v;
        n += 1;
    }
    if n == 0 {
        (None, 0)
    } else {
        (Some(sum / n as f64), n)
    }
}

#[cfg(test)]
pub(crate) fn make_track(
    genre: &str,
    year: Option<i32>,
    energy: Option<f64>,
    loudness: Option<f64>,
    popularity: Option<f64>,
) -> Track {
    Track {
        title: format!("{genre} song"),
        artist: format!("{genre} artist"),
        top_genre: genre.to_string(),
        year,
        energy,
        loudness_db: loudness,
        popularity,
    }
}
