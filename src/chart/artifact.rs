use serde::Serialize;

use super::correlation::CorrelationMatrix;
use super::request::ChartKind;

/// Label used for rows whose color/group value is missing.
pub const MISSING_LABEL: &str = "(missing)";

/// The computed, plot-ready data of one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartArtifact {
    /// The view (or the plotted columns) had no rows to draw.
    NoData { kind: ChartKind },
    /// The request could not be served; `reason` says why.
    Unsupported { reason: String },
    Histogram(Histogram),
    CategoryCounts(CategoryCounts),
    Scatter(Scatter),
    ScatterMatrix(ScatterMatrix),
    BoxPlot(BoxPlot),
    Heatmap(CorrelationMatrix),
    ParallelCoordinates(ParallelCoordinates),
}

impl ChartArtifact {
    pub fn title(&self) -> String {
        match self {
            ChartArtifact::NoData { kind } => format!("{kind}: no data"),
            ChartArtifact::Unsupported { .. } => "Selection unsupported".to_string(),
            ChartArtifact::Histogram(h) => format!("Distribution of {}", h.column),
            ChartArtifact::CategoryCounts(c) => format!("Count of {}", c.column),
            ChartArtifact::Scatter(s) => format!("{} vs {}", s.y, s.x),
            ChartArtifact::ScatterMatrix(_) => "Scatter matrix".to_string(),
            ChartArtifact::BoxPlot(b) => format!("{} grouped by {}", b.value, b.group),
            ChartArtifact::Heatmap(_) => "Correlation heatmap".to_string(),
            ChartArtifact::ParallelCoordinates(_) => "Parallel coordinates".to_string(),
        }
    }

    /// Whether this is a placeholder rather than a chart.
    pub fn is_placeholder(&self) -> bool {
        matches!(
            self,
            ChartArtifact::NoData { .. } | ChartArtifact::Unsupported { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    pub bins: Vec<Bin>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCounts {
    pub column: String,
    /// Label → count, in label order.
    pub counts: Vec<(String, usize)>,
}

/// Points sharing one color label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: Option<String>,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter {
    pub x: String,
    pub y: String,
    pub color: Option<String>,
    pub series: Vec<Series>,
}

impl Scatter {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

/// `panels[row * n + col]` plots `dimensions[col]` against `dimensions[row]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterMatrix {
    pub dimensions: Vec<String>,
    pub color: Option<String>,
    pub panels: Vec<Scatter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub group: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Min-max whisker box plot of `value` per `group`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlot {
    pub value: String,
    pub group: String,
    pub boxes: Vec<BoxSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParallelCoordinates {
    pub dimensions: Vec<String>,
    /// Observed `(min, max)` per dimension over the plotted rows.
    pub ranges: Vec<(f64, f64)>,
    /// One polyline per row, each coordinate normalized to `[0, 1]`.
    pub lines: Vec<Vec<f64>>,
    pub color: String,
    /// Normalized color value per line.
    pub color_values: Vec<f64>,
}
