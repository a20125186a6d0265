use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use crate::models::{NumericField, Track, fmt_opt, mean_of};

/// Group records by key, keeping groups in the order their key first appeared.
#[must_use]
pub fn group_by<'a, K, F>(tracks: &'a [Track], mut key: F) -> (Vec<(K, Vec<&'a Track>)>, usize)
where
    K: Eq + Hash + Clone,
    F: FnMut(&Track) -> Option<K>,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&Track>)> = Vec::new();
    let mut skipped = 0;
    for track in tracks {
        let Some(k) = key(track) else {
            skipped += 1;
            continue;
        };
        let slot = *slots.entry(k.clone()).or_insert_with(|| {
            groups.push((k, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(track);
    }
    (groups, skipped)
}

/// Member with the largest value of `field`, first one on ties.
///
/// Members without a value never win.
#[must_use]
pub fn top_by<'a>(members: &[&'a Track], field: NumericField) -> Option<&'a Track> {
    let mut best: Option<(&'a Track, f64)> = None;
    for &track in members {
        let Some(v) = track.value(field) else {
            continue;
        };
        if best.is_none_or(|(_, b)| v > b) {
            best = Some((track, v));
        }
    }
    best.map(|(t, _)| t)
}

/// Average energy and genres observed for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearRollup {
    pub year: i32,
    pub energy: Option<f64>,
    pub tracks: usize,
    /// Distinct genres in first-seen order.
    pub genres: Vec<String>,
}

impl YearRollup {
    /// Genres joined for display.
    #[must_use]
    pub fn genres_text(&self) -> String {
        self.genres.join(", ")
    }

    /// Format as TSV line: year, mean energy, track count, genres.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.year,
            fmt_opt(self.energy),
            self.tracks,
            self.genres_text()
        )
    }
}

/// Roll tracks up by year, sorted by ascending year. Returns the rollups and
/// the number of tracks without a usable year.
#[must_use]
pub fn rollup_by_year(tracks: &[Track]) -> (Vec<YearRollup>, usize) {
    let (groups, skipped) = group_by(tracks, |t| t.year);
    let mut years: Vec<YearRollup> = groups
        .into_iter()
        .map(|(year, members)| {
            let (energy, _) = mean_of(members.iter().map(|t| t.energy));
            let mut genres: Vec<String> = Vec::new();
            for t in &members {
                let label = t.genre_label();
                if !genres.iter().any(|g| g == label) {
                    genres.push(label.to_string());
                }
            }
            YearRollup {
                year,
                energy,
                tracks: members.len(),
                genres,
            }
        })
        .collect();
    years.sort_by_key(|y| y.year);
    (years, skipped)
}

/// Most popular track of a genre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopTrack {
    pub title: String,
    pub artist: String,
    pub popularity: f64,
}

/// Size and headline track of one genre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreSummary {
    pub genre: String,
    pub count: usize,
    pub popularity: Option<f64>,
    pub top: Option<TopTrack>,
}

impl GenreSummary {
    /// Genre cut to `max_chars` characters for bubble labels.
    #[must_use]
    pub fn short_label(&self, max_chars: usize) -> String {
        if self.genre.chars().count() > max_chars {
            let cut: String = self.genre.chars().take(max_chars).collect();
            format!("{cut}...")
        } else {
            self.genre.clone()
        }
    }

    /// Format as TSV line: genre, count, mean popularity, top artist, top title.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        let (artist, title) = self
            .top
            .as_ref()
            .map_or(("", ""), |t| (t.artist.as_str(), t.title.as_str()));
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.genre,
            self.count,
            fmt_opt(self.popularity),
            artist,
            title
        )
    }
}

/// Roll tracks up by genre in first-seen order.
#[must_use]
pub fn rollup_by_genre(tracks: &[Track]) -> Vec<GenreSummary> {
    let (groups, _) = group_by(tracks, |t| Some(t.genre_label().to_string()));
    groups
        .into_iter()
        .map(|(genre, members)| {
            let (popularity, _) = mean_of(members.iter().map(|t| t.popularity));
            let top = top_by(&members, NumericField::Popularity).map(|t| TopTrack {
                title: t.title.clone(),
                artist: t.artist.clone(),
                popularity: t.popularity.unwrap_or_default(),
            });
            GenreSummary {
                genre,
                count: members.len(),
                popularity,
                top,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::make_track;

    fn make_year(year: i32, energy: f64, genre: &str) -> Track {
        make_track(genre, Some(year), Some(energy), Some(-5.0), Some(50.0))
    }

    fn make_song(genre: &str, title: &str, popularity: Option<f64>) -> Track {
        let mut t = make_track(genre, Some(2014), Some(50.0), Some(-5.0), popularity);
        t.title = title.to_string();
        t
    }

    #[test]
    fn test_year_means() {
        let tracks = vec![
            make_year(2011, 50.0, "rock"),
            make_year(2010, 60.0, "pop"),
            make_year(2010, 80.0, "pop"),
        ];
        let (years, skipped) = rollup_by_year(&tracks);
        assert_eq!(skipped, 0);
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].year, 2010);
        assert!((years[0].energy.unwrap() - 70.0).abs() < f64::EPSILON);
        assert_eq!(years[0].tracks, 2);
        assert_eq!(years[1].year, 2011);
        assert!((years[1].energy.unwrap() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_year_genres_distinct_in_order() {
        let tracks = vec![
            make_year(2012, 1.0, "pop"),
            make_year(2012, 1.0, ""),
            make_year(2012, 1.0, "pop"),
            make_year(2012, 1.0, "edm"),
        ];
        let (years, _) = rollup_by_year(&tracks);
        assert_eq!(years[0].genres, vec!["pop", "Unknown", "edm"]);
        assert_eq!(years[0].genres_text(), "pop, Unknown, edm");
    }

    #[test]
    fn test_year_skips_missing_year_and_energy() {
        let mut no_year = make_year(2010, 10.0, "pop");
        no_year.year = None;
        let mut no_energy = make_year(2010, 0.0, "pop");
        no_energy.energy = None;
        let tracks = vec![no_year, no_energy, make_year(2010, 40.0, "pop")];
        let (years, skipped) = rollup_by_year(&tracks);
        assert_eq!(skipped, 1);
        assert_eq!(years[0].tracks, 2);
        assert!((years[0].energy.unwrap() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_member_group() {
        let tracks = vec![make_song("folk", "Only", Some(33.0))];
        let genres = rollup_by_genre(&tracks);
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].count, 1);
        assert_eq!(genres[0].popularity, Some(33.0));
        assert_eq!(genres[0].top.as_ref().unwrap().title, "Only");
    }

    #[test]
    fn test_top_track_first_on_ties() {
        let tracks = vec![
            make_song("pop", "Early", Some(80.0)),
            make_song("rock", "Other", Some(99.0)),
            make_song("pop", "Late", Some(80.0)),
            make_song("pop", "Low", Some(10.0)),
        ];
        let genres = rollup_by_genre(&tracks);
        assert_eq!(genres[0].genre, "pop");
        assert_eq!(genres[0].count, 3);
        let top = genres[0].top.as_ref().unwrap();
        assert_eq!(top.title, "Early");
        assert!((top.popularity - 80.0).abs() < f64::EPSILON);
        assert_eq!(genres[1].genre, "rock");
    }

    #[test]
    fn test_top_ignores_missing_popularity() {
        let tracks = vec![make_song("pop", "Unknown", None), make_song("pop", "Known", Some(1.0))];
        let genres = rollup_by_genre(&tracks);
        assert_eq!(genres[0].top.as_ref().unwrap().title, "Known");

        let silent = vec![make_song("pop", "Silent", None)];
        let genres = rollup_by_genre(&silent);
        assert!(genres[0].top.is_none());
        assert_eq!(genres[0].popularity, None);
    }

    #[test]
    fn test_short_label() {
        let summary = GenreSummary {
            genre: "dance electropop".to_string(),
            count: 1,
            popularity: None,
            top: None,
        };
        assert_eq!(summary.short_label(10), "dance elec...");
        assert_eq!(summary.short_label(40), "dance electropop");
    }

    #[test]
    fn test_empty_rollups() {
        let (years, skipped) = rollup_by_year(&[]);
        assert!(years.is_empty());
        assert_eq!(skipped, 0);
        assert!(rollup_by_genre(&[]).is_empty());
    }
}
