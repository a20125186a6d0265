use crate::bins::BinAggregate;
use crate::chord::ChordLink;
use crate::charts::ScatterPoint;
use crate::models::fmt_opt;
use crate::rollup::{GenreSummary, YearRollup};

/// Text shown when a single record is hovered or clicked.
pub trait Tooltip {
    fn tooltip(&self) -> String;
}

impl Tooltip for YearRollup {
    fn tooltip(&self) -> String {
        format!(
            "Year: {}\nAverage Energy: {}\nGenres: {}",
            self.year,
            fmt_opt(self.energy),
            self.genres_text()
        )
    }
}

impl Tooltip for BinAggregate {
    fn tooltip(&self) -> String {
        let mut lines: Vec<String> = self
            .means
            .iter()
            .map(|m| format!("Avg {}: {}", m.field.label(), fmt_opt(m.mean)))
            .collect();
        lines.push(format!("Song Count: {}", self.count));
        lines.join("\n")
    }
}

impl Tooltip for ChordLink {
    fn tooltip(&self) -> String {
        format!("{} -> {}\nShared Songs: {}", self.source, self.target, self.count)
    }
}

/// Detail panel for a genre bubble.
impl Tooltip for GenreSummary {
    fn tooltip(&self) -> String {
        let (artist, title) = self
            .top
            .as_ref()
            .map_or(("n/a", "n/a"), |t| (t.artist.as_str(), t.title.as_str()));
        format!("{}\nTop Artist: {artist}\nTop Song: {title}", self.genre)
    }
}

impl Tooltip for ScatterPoint {
    fn tooltip(&self) -> String {
        format!(
            "Title: {}\nArtist: {}\nGenre: {}\nEnergy: {}\nLoudness: {}",
            self.title, self.artist, self.genre, self.energy, self.loudness_db
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bins::FieldMean;
    use crate::models::NumericField;
    use crate::rollup::TopTrack;

    #[test]
    fn test_year_tooltip() {
        let y = YearRollup {
            year: 2010,
            energy: Some(70.0),
            tracks: 2,
            genres: vec!["pop".into(), "edm".into()],
        };
        assert_eq!(y.tooltip(), "Year: 2010\nAverage Energy: 70.00\nGenres: pop, edm");
    }

    #[test]
    fn test_bin_tooltip_marks_missing_mean() {
        let b = BinAggregate {
            x_bin: -6.0,
            y_bin: 80.0,
            count: 3,
            means: vec![
                FieldMean { field: NumericField::Loudness, mean: Some(-5.0333), samples: 3 },
                FieldMean { field: NumericField::Energy, mean: Some(83.3333), samples: 3 },
                FieldMean { field: NumericField::Popularity, mean: None, samples: 0 },
            ],
            incomplete: true,
        };
        assert_eq!(
            b.tooltip(),
            "Avg Loudness: -5.03\nAvg Energy: 83.33\nAvg Popularity: n/a\nSong Count: 3"
        );
    }

    #[test]
    fn test_bin_tooltip_follows_averaged_fields() {
        let b = BinAggregate {
            x_bin: 2008.0,
            y_bin: 40.0,
            count: 2,
            means: vec![
                FieldMean { field: NumericField::Year, mean: Some(2009.5), samples: 2 },
                FieldMean { field: NumericField::Popularity, mean: Some(41.0), samples: 2 },
            ],
            incomplete: false,
        };
        assert_eq!(b.tooltip(), "Avg Year: 2009.50\nAvg Popularity: 41.00\nSong Count: 2");
    }

    #[test]
    fn test_link_and_genre_tooltips() {
        let link = ChordLink {
            source: "pop".into(),
            target: "rock".into(),
            count: 12,
        };
        assert_eq!(link.tooltip(), "pop -> rock\nShared Songs: 12");

        let g = GenreSummary {
            genre: "dance pop".into(),
            count: 4,
            popularity: Some(70.0),
            top: Some(TopTrack {
                title: "Hit".into(),
                artist: "Star".into(),
                popularity: 90.0,
            }),
        };
        assert_eq!(g.tooltip(), "dance pop\nTop Artist: Star\nTop Song: Hit");
    }

    #[test]
    fn test_scatter_tooltip() {
        let p = ScatterPoint {
            title: "Song".into(),
            artist: "Band".into(),
            genre: "pop".into(),
            energy: 89.0,
            loudness_db: -4.0,
        };
        assert_eq!(
            p.tooltip(),
            "Title: Song\nArtist: Band\nGenre: pop\nEnergy: 89\nLoudness: -4"
        );
    }
}
