use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Track;

/// Parameters of the genre-compatibility matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChordParams {
    /// Number of most frequent genres kept.
    pub max_genres: usize,
    /// Two tracks are compatible when their popularity differs by at most this much.
    pub popularity_threshold: f64,
    /// Cells below this count are zeroed.
    pub min_count: u64,
}

impl Default for ChordParams {
    fn default() -> Self {
        Self {
            max_genres: 15,
            popularity_threshold: 10.0,
            min_count: 10,
        }
    }
}

/// Square, symmetric count table over a list of genres.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatMatrix {
    pub genres: Vec<String>,
    pub cells: Vec<Vec<u64>>,
}

/// One non-zero cell of the upper triangle, diagonal included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordLink {
    pub source: String,
    pub target: String,
    pub count: u64,
}

impl ChordLink {
    /// Format as TSV line: source, target, count.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        format!("{}\t{}\t{}", self.source, self.target, self.count)
    }
}

impl CompatMatrix {
    fn zeroed(genres: Vec<String>) -> Self {
        let n = genres.len();
        Self {
            genres,
            cells: vec![vec![0; n]; n],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genres.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    #[cfg(test)]
    pub fn index_of(&self, genre: &str) -> Option<usize> {
        self.genres.iter().position(|g| g == genre)
    }

    /// Count for a pair of genres, `None` if either is not in the matrix.
    #[cfg(test)]
    pub fn get(&self, a: &str, b: &str) -> Option<u64> {
        Some(self.cells[self.index_of(a)?][self.index_of(b)?])
    }

    /// Zero every cell below `min_count`.
    pub fn zero_below(&mut self, min_count: u64) {
        for cell in self.cells.iter_mut().flatten() {
            if *cell < min_count {
                *cell = 0;
            }
        }
    }

    /// Row sums, one per genre.
    #[must_use]
    pub fn group_totals(&self) -> Vec<u64> {
        self.cells.iter().map(|row| row.iter().sum()).collect()
    }

    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        let n = self.len();
        self.cells.len() == n
            && self.cells.iter().all(|row| row.len() == n)
            && (0..n).all(|i| (0..i).all(|j| self.cells[i][j] == self.cells[j][i]))
    }

    /// Non-zero cells with `row <= col`.
    #[must_use]
    pub fn links(&self) -> Vec<ChordLink> {
        let mut links = Vec::new();
        for (i, row) in self.cells.iter().enumerate() {
            for (j, &count) in row.iter().enumerate().skip(i) {
                if count > 0 {
                    links.push(ChordLink {
                        source: self.genres[i].clone(),
                        target: self.genres[j].clone(),
                        count,
                    });
                }
            }
        }
        links
    }
}

/// The `n` most frequent genres, most frequent first.
///
/// Equal counts keep the order in which the genres first appeared.
#[must_use]
pub fn top_genres(tracks: &[Track], n: usize) -> Vec<(String, usize)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for track in tracks {
        let genre = track.genre_label();
        let slot = *slots.entry(genre).or_insert_with(|| {
            counts.push((genre.to_string(), 0));
            counts.len() - 1
        });
        counts[slot].1 += 1;
    }

    // Stable sort keeps first-seen order among ties.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    counts
}

/// Count compatible track pairs between every pair of top genres.
///
/// Tracks are sorted by popularity and a window of width `threshold` slides
/// over them. The window keeps a per-genre tally, so each track adds its
/// pairs with every earlier compatible track in O(genres) instead of
/// comparing against each one. A track is never paired with itself, and a
/// same-genre pair adds one to the diagonal cell.
#[must_use]
pub fn pair_counts(tracks: &[Track], genres: Vec<String>, threshold: f64) -> CompatMatrix {
    let mut matrix = CompatMatrix::zeroed(genres);
    let n = matrix.len();
    if n == 0 {
        return matrix;
    }

    let index: HashMap<&str, usize> = matrix
        .genres
        .iter()
        .enumerate()
        .map(|(i, g)| (g.as_str(), i))
        .collect();

    let mut eligible: Vec<(f64, usize)> = tracks
        .iter()
        .filter_map(|t| Some((t.popularity?, *index.get(t.genre_label())?)))
        .collect();
    eligible.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut cells = vec![vec![0u64; n]; n];
    let mut window = vec![0u64; n];
    let mut start = 0;
    for (k, &(popularity, genre)) in eligible.iter().enumerate() {
        while start < k && popularity - eligible[start].0 > threshold {
            window[eligible[start].1] -= 1;
            start += 1;
        }
        for (other, &count) in window.iter().enumerate() {
            if count == 0 {
                continue;
            }
            cells[genre][other] += count;
            if other != genre {
                cells[other][genre] += count;
            }
        }
        window[genre] += 1;
    }

    matrix.cells = cells;
    matrix
}

/// Build the zero-thresholded genre-compatibility matrix.
#[must_use]
pub fn compatibility_matrix(tracks: &[Track], params: &ChordParams) -> CompatMatrix {
    let genres: Vec<String> = top_genres(tracks, params.max_genres)
        .into_iter()
        .map(|(g, _)| g)
        .collect();
    let mut matrix = pair_counts(tracks, genres, params.popularity_threshold);
    if matrix.is_empty() {
        debug!("no genres to pair");
        return matrix;
    }
    matrix.zero_below(params.min_count);
    debug_assert!(matrix.is_symmetric());
    debug!(
        genres = matrix.len(),
        links = matrix.links().len(),
        "built genre compatibility matrix"
    );
    matrix
}
