use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Default and maximum histogram bin counts offered by the bins slider.
pub const DEFAULT_BINS: usize = 20;
pub const MAX_BINS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ChartKind {
    Histogram,
    CategoryCounts,
    Scatter,
    ScatterMatrix,
    BoxPlot,
    CorrelationHeatmap,
    ParallelCoordinates,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Histogram,
        ChartKind::CategoryCounts,
        ChartKind::Scatter,
        ChartKind::ScatterMatrix,
        ChartKind::BoxPlot,
        ChartKind::CorrelationHeatmap,
        ChartKind::ParallelCoordinates,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Histogram => "Histogram",
            ChartKind::CategoryCounts => "Category counts",
            ChartKind::Scatter => "Scatter plot",
            ChartKind::ScatterMatrix => "Scatter matrix",
            ChartKind::BoxPlot => "Box plot",
            ChartKind::CorrelationHeatmap => "Correlation heatmap",
            ChartKind::ParallelCoordinates => "Parallel coordinates",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A role a column can play in a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Slot {
    X,
    Y,
    Color,
    Dimensions,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::X => write!(f, "x"),
            Slot::Y => write!(f, "y"),
            Slot::Color => write!(f, "color"),
            Slot::Dimensions => write!(f, "dimensions"),
        }
    }
}

/// What the user asked to see: a chart kind and the columns bound to its
/// slots.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub bindings: BTreeMap<Slot, Vec<String>>,
    pub bins: usize,
}

impl ChartRequest {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            bindings: BTreeMap::new(),
            bins: DEFAULT_BINS,
        }
    }

    /// Append a column to a slot.
    pub fn bind(mut self, slot: Slot, column: impl Into<String>) -> Self {
        self.bindings.entry(slot).or_default().push(column.into());
        self
    }

    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Replace a slot's columns; an empty list unbinds the slot.
    pub fn set(&mut self, slot: Slot, columns: Vec<String>) {
        if columns.is_empty() {
            self.bindings.remove(&slot);
        } else {
            self.bindings.insert(slot, columns);
        }
    }

    pub fn columns(&self, slot: Slot) -> &[String] {
        self.bindings.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, slot: Slot) -> Option<&str> {
        self.columns(slot).first().map(String::as_str)
    }
}
