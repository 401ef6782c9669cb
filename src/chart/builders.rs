//! Chart builders. Each one receives a request that already passed slot
//! validation and a view with at least one row.

use std::collections::BTreeMap;

use super::artifact::{
    Bin, BoxPlot, BoxSummary, CategoryCounts, ChartArtifact, Histogram, ParallelCoordinates,
    Scatter, ScatterMatrix, Series, MISSING_LABEL,
};
use super::correlation::pearson_matrix;
use super::registry::Bound;
use super::request::{Slot, MAX_BINS};
use crate::data::stats::quantile;
use crate::data::view::FilteredView;
use crate::error::UnsupportedRequest;

type BuildResult = Result<ChartArtifact, UnsupportedRequest>;

fn no_data(bound: &Bound<'_>) -> BuildResult {
    Ok(ChartArtifact::NoData {
        kind: bound.request.kind,
    })
}

pub fn histogram(bound: &Bound<'_>) -> BuildResult {
    let x = bound.column(Slot::X)?;
    let values = bound.view.numbers(x);
    if values.is_empty() {
        return no_data(bound);
    }
    Ok(ChartArtifact::Histogram(Histogram {
        column: bound.name(x).to_string(),
        bins: equal_width_bins(&values, bound.request.bins),
    }))
}

/// Equal-width bins over the observed range; the last bin is closed.
fn equal_width_bins(values: &[f64], bins: usize) -> Vec<Bin> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if min == max {
        return vec![Bin {
            lo: min,
            hi: max,
            count: values.len(),
        }];
    }

    let n = bins.clamp(1, MAX_BINS);
    let width = (max - min) / n as f64;
    let mut counts = vec![0usize; n];
    for &v in values {
        let idx = (((v - min) / width).floor() as usize).min(n - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            lo: min + width * i as f64,
            hi: if i + 1 == n {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

pub fn category_counts(bound: &Bound<'_>) -> BuildResult {
    let x = bound.column(Slot::X)?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for label in bound.view.values(x).filter_map(|v| v.label()) {
        *counts.entry(label.into_owned()).or_default() += 1;
    }
    if counts.is_empty() {
        return no_data(bound);
    }
    Ok(ChartArtifact::CategoryCounts(CategoryCounts {
        column: bound.name(x).to_string(),
        counts: counts.into_iter().collect(),
    }))
}

pub fn scatter(bound: &Bound<'_>) -> BuildResult {
    let x = bound.column(Slot::X)?;
    let y = bound.column(Slot::Y)?;
    let scatter = scatter_between(bound.view, x, y, bound.optional(Slot::Color));
    if scatter.point_count() == 0 {
        return no_data(bound);
    }
    Ok(ChartArtifact::Scatter(scatter))
}

/// Points for rows where both `x` and `y` are present, one series per color
/// label (or a single unlabeled series).
fn scatter_between(view: &FilteredView, x: usize, y: usize, color: Option<usize>) -> Scatter {
    let table = view.table();
    let mut groups: BTreeMap<Option<String>, Vec<[f64; 2]>> = BTreeMap::new();
    for &row in view.rows() {
        let (Some(px), Some(py)) = (table.value(row, x).as_f64(), table.value(row, y).as_f64())
        else {
            continue;
        };
        let label = color.map(|c| {
            table
                .value(row, c)
                .label()
                .map_or_else(|| MISSING_LABEL.to_string(), |l| l.into_owned())
        });
        groups.entry(label).or_default().push([px, py]);
    }

    let columns = table.columns();
    Scatter {
        x: columns[x].clone(),
        y: columns[y].clone(),
        color: color.map(|c| columns[c].clone()),
        series: groups
            .into_iter()
            .map(|(label, points)| Series { label, points })
            .collect(),
    }
}

pub fn scatter_matrix(bound: &Bound<'_>) -> BuildResult {
    let dims = bound.columns(Slot::Dimensions);
    let color = bound.optional(Slot::Color);
    let panels: Vec<Scatter> = dims
        .iter()
        .flat_map(move |&row_dim| {
            dims.iter()
                .map(move |&col_dim| scatter_between(bound.view, col_dim, row_dim, color))
        })
        .collect();
    if panels.iter().all(|p| p.point_count() == 0) {
        return no_data(bound);
    }
    Ok(ChartArtifact::ScatterMatrix(ScatterMatrix {
        dimensions: dims.iter().map(|&d| bound.name(d).to_string()).collect(),
        color: color.map(|c| bound.name(c).to_string()),
        panels,
    }))
}

pub fn box_plot(bound: &Bound<'_>) -> BuildResult {
    let group = bound.column(Slot::X)?;
    let value = bound.column(Slot::Y)?;
    let table = bound.view.table();

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for &row in bound.view.rows() {
        let (Some(label), Some(v)) = (
            table.value(row, group).label(),
            table.value(row, value).as_f64(),
        ) else {
            continue;
        };
        groups.entry(label.into_owned()).or_default().push(v);
    }
    if groups.is_empty() {
        return no_data(bound);
    }

    let boxes = groups
        .into_iter()
        .map(|(group, mut values)| {
            values.sort_by(f64::total_cmp);
            BoxSummary {
                group,
                count: values.len(),
                min: values[0],
                q1: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                max: values[values.len() - 1],
            }
        })
        .collect();

    Ok(ChartArtifact::BoxPlot(BoxPlot {
        value: bound.name(value).to_string(),
        group: bound.name(group).to_string(),
        boxes,
    }))
}

pub fn correlation_heatmap(bound: &Bound<'_>) -> BuildResult {
    let dims = bound.columns(Slot::Dimensions);
    Ok(ChartArtifact::Heatmap(pearson_matrix(bound.view, dims)))
}

pub fn parallel_coordinates(bound: &Bound<'_>) -> BuildResult {
    let dims = bound.columns(Slot::Dimensions);
    let color = match bound.optional(Slot::Color) {
        Some(c) => c,
        None => *dims.first().ok_or(UnsupportedRequest::Unbound(Slot::Dimensions))?,
    };
    let table = bound.view.table();

    // Rows complete in every dimension and in the color column.
    let mut raw: Vec<Vec<f64>> = Vec::new();
    let mut raw_colors: Vec<f64> = Vec::new();
    for &row in bound.view.rows() {
        let line: Option<Vec<f64>> = dims.iter().map(|&d| table.value(row, d).as_f64()).collect();
        if let (Some(line), Some(c)) = (line, table.value(row, color).as_f64()) {
            raw.push(line);
            raw_colors.push(c);
        }
    }
    if raw.is_empty() {
        return no_data(bound);
    }

    let ranges: Vec<(f64, f64)> = (0..dims.len())
        .map(|i| min_max(raw.iter().map(|line| line[i])))
        .collect();
    let lines = raw
        .iter()
        .map(|line| {
            line.iter()
                .zip(&ranges)
                .map(|(&v, &range)| normalize(v, range))
                .collect()
        })
        .collect();
    let color_range = min_max(raw_colors.iter().copied());

    Ok(ChartArtifact::ParallelCoordinates(ParallelCoordinates {
        dimensions: dims.iter().map(|&d| bound.name(d).to_string()).collect(),
        ranges,
        lines,
        color: bound.name(color).to_string(),
        color_values: raw_colors
            .into_iter()
            .map(|c| normalize(c, color_range))
            .collect(),
    }))
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Map `v` into `[0, 1]`; a zero-width range maps to the middle.
fn normalize(v: f64, (min, max): (f64, f64)) -> f64 {
    if max > min {
        (v - min) / (max - min)
    } else {
        0.5
    }
}
