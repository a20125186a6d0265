//! The five chart pipelines. Each one is a pure function of the loaded
//! tracks and the configuration and returns the records the renderer binds
//! to, plus the domains of its scales.

use serde::Serialize;
use tracing::{debug, warn};

use crate::bins::{BinAggregate, aggregate_bins};
use crate::chord::{ChordLink, compatibility_matrix};
use crate::config::{BubbleParams, Config};
use crate::models::{NumericField, Track};
use crate::rollup::{GenreSummary, YearRollup, rollup_by_genre, rollup_by_year};
use crate::scales::{Domain, extent, zero_to_max};
use crate::tooltip::Tooltip;

/// Fields averaged inside each bubble-chart bin: both axis fields, then
/// popularity for the color scale. Each field appears once.
#[must_use]
pub fn bubble_means(params: &BubbleParams) -> Vec<NumericField> {
    let mut fields = Vec::with_capacity(3);
    for field in [params.x.field, params.y.field, NumericField::Popularity] {
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    fields
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bubble,
    Chord,
    Network,
    Scatter,
}

impl ChartKind {
    pub const ALL: [Self; 5] = [
        Self::Line,
        Self::Bubble,
        Self::Chord,
        Self::Network,
        Self::Scatter,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bubble => "bubble",
            Self::Chord => "chord",
            Self::Network => "network",
            Self::Scatter => "scatter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub points: Vec<YearRollup>,
    pub skipped: usize,
    pub x_domain: Option<Domain>,
    pub y_domain: Option<Domain>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleChart {
    pub bins: Vec<BinAggregate>,
    pub skipped: usize,
    pub x_domain: Option<Domain>,
    pub y_domain: Option<Domain>,
    pub size_domain: Option<Domain>,
    pub color_domain: Option<Domain>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordChart {
    /// Also the color domain.
    pub genres: Vec<String>,
    pub matrix: Vec<Vec<u64>>,
    pub group_totals: Vec<u64>,
    pub links: Vec<ChordLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkNode {
    #[serde(flatten)]
    pub summary: GenreSummary,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkChart {
    pub nodes: Vec<NetworkNode>,
    pub size_domain: Option<Domain>,
    pub color_domain: Option<Domain>,
}

/// One track placed on the loudness/energy plane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub energy: f64,
    pub loudness_db: f64,
}

impl ScatterPoint {
    /// Format as TSV line: loudness, energy, genre, artist, title.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.loudness_db, self.energy, self.genre, self.artist, self.title
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub points: Vec<ScatterPoint>,
    pub skipped: usize,
    pub x_domain: Option<Domain>,
    pub y_domain: Option<Domain>,
    pub zoom_extent: Domain,
}

/// Output of one pipeline, ready to hand to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "chart", rename_all = "snake_case")]
pub enum ChartData {
    Line(LineChart),
    Bubble(BubbleChart),
    Chord(ChordChart),
    Network(NetworkChart),
    Scatter(ScatterChart),
}

impl ChartData {
    #[must_use]
    pub fn kind(&self) -> ChartKind {
        match self {
            Self::Line(_) => ChartKind::Line,
            Self::Bubble(_) => ChartKind::Bubble,
            Self::Chord(_) => ChartKind::Chord,
            Self::Network(_) => ChartKind::Network,
            Self::Scatter(_) => ChartKind::Scatter,
        }
    }

    /// One TSV line per record.
    #[must_use]
    pub fn tsv_lines(&self) -> Vec<String> {
        match self {
            Self::Line(c) => c.points.iter().map(YearRollup::to_tsv).collect(),
            Self::Bubble(c) => c.bins.iter().map(BinAggregate::to_tsv).collect(),
            Self::Chord(c) => c.links.iter().map(ChordLink::to_tsv).collect(),
            Self::Network(c) => c.nodes.iter().map(|n| n.summary.to_tsv()).collect(),
            Self::Scatter(c) => c.points.iter().map(ScatterPoint::to_tsv).collect(),
        }
    }

    /// Tooltip text of every record, in record order. Chord charts list the
    /// arc tooltips before the ribbon tooltips.
    #[must_use]
    pub fn tooltips(&self) -> Vec<String> {
        match self {
            Self::Line(c) => c.points.iter().map(Tooltip::tooltip).collect(),
            Self::Bubble(c) => c.bins.iter().map(Tooltip::tooltip).collect(),
            Self::Chord(c) => c
                .genres
                .iter()
                .cloned()
                .chain(c.links.iter().map(Tooltip::tooltip))
                .collect(),
            Self::Network(c) => c.nodes.iter().map(|n| n.summary.tooltip()).collect(),
            Self::Scatter(c) => c.points.iter().map(Tooltip::tooltip).collect(),
        }
    }

    /// Number of records bound to marks.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Line(c) => c.points.len(),
            Self::Bubble(c) => c.bins.len(),
            Self::Chord(c) => c.links.len(),
            Self::Network(c) => c.nodes.len(),
            Self::Scatter(c) => c.points.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn note_skipped(chart: ChartKind, skipped: usize) {
    if skipped > 0 {
        warn!(chart = chart.name(), skipped, "records left out for missing values");
    }
}

/// Mean energy per year.
#[must_use]
pub fn line_chart(tracks: &[Track], config: &Config) -> LineChart {
    let (points, skipped) = rollup_by_year(tracks);
    note_skipped(ChartKind::Line, skipped);
    let x_domain = extent(points.iter().map(|p| f64::from(p.year)));
    let y_domain = extent(points.iter().filter_map(|p| p.energy))
        .map(|d| Domain::new(0.0, d.max + config.line.energy_headroom));
    LineChart {
        points,
        skipped,
        x_domain,
        y_domain,
    }
}

/// Two-level bins with the axis fields and popularity averaged per bin.
#[must_use]
pub fn bubble_chart(tracks: &[Track], config: &Config) -> BubbleChart {
    let params = config.bubble;
    let binned = aggregate_bins(tracks, params.x, params.y, &bubble_means(&params));
    note_skipped(ChartKind::Bubble, binned.skipped);
    let incomplete = binned.bins.iter().filter(|b| b.incomplete).count();
    if incomplete > 0 {
        warn!(incomplete, "bins averaged over members with missing values");
    }

    let bins = binned.bins;
    let x_domain = extent(bins.iter().filter_map(|b| b.mean(params.x.field)));
    let y_domain = extent(bins.iter().filter_map(|b| b.mean(params.y.field)));
    #[allow(clippy::cast_precision_loss)]
    let size_domain = zero_to_max(bins.iter().map(|b| b.count as f64));
    let color_domain = extent(bins.iter().filter_map(|b| b.mean(NumericField::Popularity)));
    BubbleChart {
        bins,
        skipped: binned.skipped,
        x_domain,
        y_domain,
        size_domain,
        color_domain,
    }
}

/// Genre compatibility matrix with its arcs and ribbons.
#[must_use]
pub fn chord_chart(tracks: &[Track], config: &Config) -> ChordChart {
    let matrix = compatibility_matrix(tracks, &config.chord);
    let group_totals = matrix.group_totals();
    let links = matrix.links();
    ChordChart {
        genres: matrix.genres,
        matrix: matrix.cells,
        group_totals,
        links,
    }
}

/// One bubble per genre, sized and colored by track count.
#[must_use]
pub fn network_chart(tracks: &[Track], config: &Config) -> NetworkChart {
    let nodes: Vec<NetworkNode> = rollup_by_genre(tracks)
        .into_iter()
        .map(|summary| NetworkNode {
            label: summary.short_label(config.network.label_chars),
            summary,
        })
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let counts = || nodes.iter().map(|n| n.summary.count as f64);
    let size_domain = zero_to_max(counts());
    let color_domain = extent(counts());
    NetworkChart {
        nodes,
        size_domain,
        color_domain,
    }
}

/// Every track with both loudness and energy.
#[must_use]
pub fn scatter_chart(tracks: &[Track], config: &Config) -> ScatterChart {
    let points: Vec<ScatterPoint> = tracks
        .iter()
        .filter_map(|t| {
            Some(ScatterPoint {
                title: t.title.clone(),
                artist: t.artist.clone(),
                genre: t.genre_label().to_string(),
                energy: t.energy?,
                loudness_db: t.loudness_db?,
            })
        })
        .collect();
    let skipped = tracks.len() - points.len();
    note_skipped(ChartKind::Scatter, skipped);
    let x_domain = extent(points.iter().map(|p| p.loudness_db));
    let y_domain = extent(points.iter().map(|p| p.energy));
    ScatterChart {
        points,
        skipped,
        x_domain,
        y_domain,
        zoom_extent: Domain::new(config.scatter.zoom_min, config.scatter.zoom_max),
    }
}

/// Run the pipeline for `kind`.
#[must_use]
pub fn build_chart(kind: ChartKind, tracks: &[Track], config: &Config) -> ChartData {
    let data = match kind {
        ChartKind::Line => ChartData::Line(line_chart(tracks, config)),
        ChartKind::Bubble => ChartData::Bubble(bubble_chart(tracks, config)),
        ChartKind::Chord => ChartData::Chord(chord_chart(tracks, config)),
        ChartKind::Network => ChartData::Network(network_chart(tracks, config)),
        ChartKind::Scatter => ChartData::Scatter(scatter_chart(tracks, config)),
    };
    debug!(chart = kind.name(), records = data.len(), "built chart");
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::make_track;

    fn sample() -> Vec<Track> {
        vec![
            make_track("pop", Some(2010), Some(60.0), Some(-8.5), Some(50.0)),
            make_track("pop", Some(2010), Some(80.0), Some(-7.9), Some(55.0)),
            make_track("rock", Some(2011), Some(50.0), Some(-3.0), Some(52.0)),
        ]
    }

    #[test]
    fn test_line_domains() {
        let chart = line_chart(&sample(), &Config::default());
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.x_domain, Some(Domain::new(2010.0, 2011.0)));
        // Max mean energy is 70 (2010), plus headroom.
        assert_eq!(chart.y_domain, Some(Domain::new(0.0, 80.0)));
    }

    #[test]
    fn test_bubble_domains() {
        let chart = bubble_chart(&sample(), &Config::default());
        assert_eq!(chart.bins.len(), 3);
        assert_eq!(chart.size_domain, Some(Domain::new(0.0, 1.0)));
        assert_eq!(chart.x_domain, Some(Domain::new(-8.5, -3.0)));
        assert_eq!(chart.y_domain, Some(Domain::new(50.0, 80.0)));
        assert_eq!(chart.color_domain, Some(Domain::new(50.0, 55.0)));
    }

    #[test]
    fn test_bubble_with_year_axis() {
        let mut config = Config::default();
        config.bubble.x.field = NumericField::Year;
        config.bubble.x.width = 4.0;
        let chart = bubble_chart(&sample(), &config);
        assert_eq!(chart.bins.len(), 3);
        let x_bins: Vec<f64> = chart.bins.iter().map(|b| b.x_bin).collect();
        assert_eq!(x_bins, vec![2008.0, 2008.0, 2008.0]);
        assert_eq!(chart.x_domain, Some(Domain::new(2010.0, 2011.0)));
        assert_eq!(chart.y_domain, Some(Domain::new(50.0, 80.0)));
        assert_eq!(chart.color_domain, Some(Domain::new(50.0, 55.0)));
        assert!(chart.bins[0].tooltip().starts_with("Avg Year: 2010.00\nAvg Energy: 60.00"));
    }

    #[test]
    fn test_bubble_means_dedup() {
        let mut config = Config::default();
        assert_eq!(
            bubble_means(&config.bubble),
            vec![NumericField::Loudness, NumericField::Energy, NumericField::Popularity]
        );
        config.bubble.x.field = NumericField::Popularity;
        config.bubble.y.field = NumericField::Popularity;
        assert_eq!(bubble_means(&config.bubble), vec![NumericField::Popularity]);
    }

    #[test]
    fn test_chord_chart_from_config() {
        let mut config = Config::default();
        config.chord.min_count = 1;
        let chart = chord_chart(&sample(), &config);
        assert_eq!(chart.genres, vec!["pop", "rock"]);
        assert_eq!(chart.matrix, vec![vec![1, 2], vec![2, 0]]);
        assert_eq!(chart.group_totals, vec![3, 2]);
        assert_eq!(chart.links.len(), 2);
    }

    #[test]
    fn test_chord_default_min_count_suppresses_noise() {
        let chart = chord_chart(&sample(), &Config::default());
        assert!(chart.matrix.iter().flatten().all(|&c| c == 0));
        assert!(chart.links.is_empty());
    }

    #[test]
    fn test_network_nodes() {
        let chart = network_chart(&sample(), &Config::default());
        assert_eq!(chart.nodes.len(), 2);
        assert_eq!(chart.nodes[0].summary.genre, "pop");
        assert_eq!(chart.nodes[0].summary.count, 2);
        assert_eq!(chart.size_domain, Some(Domain::new(0.0, 2.0)));
        assert_eq!(chart.color_domain, Some(Domain::new(1.0, 2.0)));
    }

    #[test]
    fn test_scatter_skips_incomplete_points() {
        let mut tracks = sample();
        tracks[1].energy = None;
        let chart = scatter_chart(&tracks, &Config::default());
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.skipped, 1);
        assert_eq!(chart.x_domain, Some(Domain::new(-8.5, -3.0)));
        assert_eq!(chart.zoom_extent, Domain::new(1.0, 5.0));
    }

    #[test]
    fn test_empty_dataset_builds_empty_charts() {
        let config = Config::default();
        for kind in ChartKind::ALL {
            let chart = build_chart(kind, &[], &config);
            assert_eq!(chart.kind(), kind);
            assert!(chart.is_empty());
            assert!(chart.tooltips().is_empty());
        }
        let ChartData::Bubble(bubble) = build_chart(ChartKind::Bubble, &[], &config) else {
            panic!("expected bubble chart");
        };
        assert_eq!(bubble.x_domain, None);
        assert_eq!(bubble.size_domain, None);
    }

    #[test]
    fn test_json_is_tagged_by_chart() {
        let chart = build_chart(ChartKind::Line, &sample(), &Config::default());
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["chart"], "line");
        assert_eq!(json["points"][0]["year"], 2010);
        assert_eq!(json["points"][0]["genres"][0], "pop");
    }

    #[test]
    fn test_tooltips_cover_every_record() {
        let mut config = Config::default();
        config.chord.min_count = 1;
        let chord = build_chart(ChartKind::Chord, &sample(), &config);
        let tips = chord.tooltips();
        assert_eq!(tips.len(), 4);
        assert_eq!(tips[0], "pop");
        assert_eq!(tips[3], "pop -> rock\nShared Songs: 2");

        let line = build_chart(ChartKind::Line, &sample(), &config);
        assert_eq!(line.tooltips().len(), line.tsv_lines().len());
    }
}
