use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{NumericField, Track, mean_of};

/// A numeric field and the width of the intervals it is cut into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    pub field: NumericField,
    pub width: f64,
}

impl BinSpec {
    /// Index of the interval containing `value`, rounding toward negative infinity.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn index(self, value: f64) -> i64 {
        (value / self.width).floor() as i64
    }

    /// Lower edge of the interval with the given index.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn edge(self, index: i64) -> f64 {
        index as f64 * self.width
    }
}

/// Mean of one field over the members of a bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMean {
    pub field: NumericField,
    /// `None` when no member had a value for the field.
    pub mean: Option<f64>,
    /// Number of members that contributed to `mean`.
    pub samples: usize,
}

/// Summary of all records that fall into one (x, y) bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinAggregate {
    pub x_bin: f64,
    pub y_bin: f64,
    pub count: usize,
    pub means: Vec<FieldMean>,
    /// Set when at least one member was missing a value for an averaged field.
    pub incomplete: bool,
}

impl BinAggregate {
    #[must_use]
    pub fn mean(&self, field: NumericField) -> Option<f64> {
        self.means
            .iter()
            .find(|m| m.field == field)
            .and_then(|m| m.mean)
    }

    /// Format as TSV line: x bin, y bin, count, then one column per mean.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        let mut cols = vec![
            self.x_bin.to_string(),
            self.y_bin.to_string(),
            self.count.to_string(),
        ];
        cols.extend(
            self.means
                .iter()
                .map(|m| m.mean.map_or_else(String::new, |v| format!("{v:.4}"))),
        );
        cols.join("\t")
    }
}

/// Result of binning a record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binned {
    pub bins: Vec<BinAggregate>,
    /// Records that could not be placed because a binning field was missing.
    pub skipped: usize,
}

/// Group records by the (x, y) bin of two fields and average up to three fields per bin.
///
/// Bins appear in the order their first member was seen. A record missing
/// either binning value is skipped. A record missing an averaged value still
/// counts toward `count` but not toward that field's mean, and marks the bin
/// `incomplete`.
#[must_use]
pub fn aggregate_bins(
    tracks: &[Track],
    x: BinSpec,
    y: BinSpec,
    averaged: &[NumericField],
) -> Binned {
    let mut slots: HashMap<(i64, i64), usize> = HashMap::new();
    let mut members: Vec<((i64, i64), Vec<&Track>)> = Vec::new();
    let mut skipped = 0;

    for track in tracks {
        let (Some(xv), Some(yv)) = (track.value(x.field), track.value(y.field)) else {
            skipped += 1;
            continue;
        };
        let key = (x.index(xv), y.index(yv));
        let slot = *slots.entry(key).or_insert_with(|| {
            members.push((key, Vec::new()));
            members.len() - 1
        });
        members[slot].1.push(track);
    }

    let bins = members
        .into_iter()
        .map(|((xi, yi), group)| {
            let means: Vec<FieldMean> = averaged
                .iter()
                .map(|&field| {
                    let (mean, samples) = mean_of(group.iter().map(|t| t.value(field)));
                    FieldMean { field, mean, samples }
                })
                .collect();
            let incomplete = means.iter().any(|m| m.samples < group.len());
            BinAggregate {
                x_bin: x.edge(xi),
                y_bin: y.edge(yi),
                count: group.len(),
                means,
                incomplete,
            }
        })
        .collect();

    Binned { bins, skipped }
}
