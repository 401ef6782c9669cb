use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoint,
    PlotPoints, Points, Polygon, Text,
};

use crate::chart::artifact::{
    CategoryCounts, Histogram, ParallelCoordinates, Scatter, ScatterMatrix,
};
use crate::chart::correlation::CorrelationMatrix;
use crate::chart::{artifact, ChartArtifact};
use crate::color::{self, ColorMap};
use crate::data::model::format_number;
use crate::state::AppState;

const DEFAULT_COLOR: Color32 = Color32::LIGHT_BLUE;

// ---------------------------------------------------------------------------
// Chart tab (central panel)
// ---------------------------------------------------------------------------

/// Render the current chart in the central panel.
pub fn chart_view(ui: &mut Ui, state: &mut AppState) {
    if state.dataset().is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore it  (File → Open…)");
        });
        return;
    }

    let color_map = state.color_map().cloned();
    let Some(artifact) = state.artifact() else {
        return;
    };

    ui.heading(artifact.title());
    match artifact {
        ChartArtifact::NoData { .. } => placeholder(ui, "No rows match the current filters."),
        ChartArtifact::Unsupported { reason } => placeholder(ui, reason),
        ChartArtifact::Histogram(h) => histogram(ui, h),
        ChartArtifact::CategoryCounts(c) => category_counts(ui, c),
        ChartArtifact::Scatter(s) => {
            scatter_plot("scatter")
                .legend(Legend::default())
                .x_axis_label(s.x.as_str())
                .y_axis_label(s.y.as_str())
                .show(ui, |plot_ui| draw_series(plot_ui, s, color_map.as_ref(), 3.0));
        }
        ChartArtifact::ScatterMatrix(m) => scatter_matrix(ui, m, color_map.as_ref()),
        ChartArtifact::BoxPlot(b) => box_plot(ui, b),
        ChartArtifact::Heatmap(m) => heatmap(ui, m),
        ChartArtifact::ParallelCoordinates(p) => parallel_coordinates(ui, p),
    }
}

fn placeholder(ui: &mut Ui, message: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(RichText::new(message).italics().size(16.0));
    });
}

/// Axis formatter showing `labels[i]` at integer position `i`.
fn label_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

fn histogram(ui: &mut Ui, h: &Histogram) {
    let bars: Vec<Bar> = h
        .bins
        .iter()
        .map(|bin| {
            let width = if bin.hi > bin.lo { bin.hi - bin.lo } else { 1.0 };
            Bar::new((bin.lo + bin.hi) / 2.0, bin.count as f64)
                .width(width)
                .name(format!("[{}, {}]", format_number(bin.lo), format_number(bin.hi)))
        })
        .collect();

    Plot::new("histogram")
        .x_axis_label(h.column.as_str())
        .y_axis_label("count")
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(DEFAULT_COLOR));
        });
}

fn category_counts(ui: &mut Ui, c: &CategoryCounts) {
    let bars: Vec<Bar> = c
        .counts
        .iter()
        .enumerate()
        .map(|(i, (label, n))| Bar::new(i as f64, *n as f64).width(0.7).name(label))
        .collect();
    let labels = c.counts.iter().map(|(label, _)| label.clone()).collect();

    Plot::new("category_counts")
        .x_axis_label(c.column.as_str())
        .y_axis_label("count")
        .x_axis_formatter(label_formatter(labels))
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(DEFAULT_COLOR));
        });
}

// ---------------------------------------------------------------------------
// Scatter plots
// ---------------------------------------------------------------------------

fn scatter_plot<'a>(id: impl std::hash::Hash) -> Plot<'a> {
    Plot::new(id)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
}

fn draw_series(
    plot_ui: &mut egui_plot::PlotUi,
    s: &Scatter,
    color_map: Option<&ColorMap>,
    radius: f32,
) {
    for series in &s.series {
        let color = match (&series.label, color_map) {
            (Some(label), Some(cm)) => cm.color_for(label),
            _ => DEFAULT_COLOR,
        };
        let mut points = Points::new(PlotPoints::from(series.points.clone()))
            .radius(radius)
            .color(color);
        if let Some(label) = &series.label {
            points = points.name(label);
        }
        plot_ui.points(points);
    }
}

fn scatter_matrix(ui: &mut Ui, m: &ScatterMatrix, color_map: Option<&ColorMap>) {
    let n = m.dimensions.len();

    if let Some(cm) = color_map {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            ui.label(format!("{}:", cm.column));
            for (label, c) in cm.legend_entries() {
                ui.label(RichText::new(label).color(c));
            }
            ui.label(RichText::new(artifact::MISSING_LABEL).color(Color32::GRAY));
        });
    }

    let spacing = ui.spacing().item_spacing.x;
    let size = ((ui.available_width() - spacing * n as f32) / n as f32).clamp(80.0, 240.0);

    egui::ScrollArea::both().show(ui, |ui: &mut Ui| {
        egui::Grid::new("scatter_matrix").show(ui, |ui: &mut Ui| {
            for row in 0..n {
                for col in 0..n {
                    let panel = &m.panels[row * n + col];
                    if row == col {
                        ui.allocate_ui(egui::vec2(size, size), |ui: &mut Ui| {
                            ui.centered_and_justified(|ui: &mut Ui| {
                                ui.strong(&m.dimensions[row]);
                            });
                        });
                        continue;
                    }
                    scatter_plot(("scatter_matrix", row, col))
                        .width(size)
                        .height(size)
                        .show_axes([row + 1 == n, col == 0])
                        .show(ui, |plot_ui| draw_series(plot_ui, panel, color_map, 1.5));
                }
                ui.end_row();
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

fn box_plot(ui: &mut Ui, b: &artifact::BoxPlot) {
    let palette = color::generate_palette(b.boxes.len());
    let elems: Vec<BoxElem> = b
        .boxes
        .iter()
        .zip(palette)
        .enumerate()
        .map(|(i, (summary, c))| {
            BoxElem::new(
                i as f64,
                BoxSpread::new(summary.min, summary.q1, summary.median, summary.q3, summary.max),
            )
            .name(format!("{} (n = {})", summary.group, summary.count))
            .box_width(0.5)
            .whisker_width(0.3)
            .fill(c.linear_multiply(0.3))
            .stroke(Stroke::new(1.5, c))
        })
        .collect();
    let labels = b.boxes.iter().map(|s| s.group.clone()).collect();

    Plot::new("box_plot")
        .x_axis_label(b.group.as_str())
        .y_axis_label(b.value.as_str())
        .x_axis_formatter(label_formatter(labels))
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(elems));
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

fn heatmap(ui: &mut Ui, m: &CorrelationMatrix) {
    let n = m.len();
    // Row i is drawn at y = n - 1 - i so the first column sits on top.
    let x_labels: Vec<String> = m.columns.clone();
    let y_labels: Vec<String> = m.columns.iter().rev().cloned().collect();

    Plot::new("correlation_heatmap")
        .data_aspect(1.0)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .x_axis_formatter(label_formatter(x_labels))
        .y_axis_formatter(label_formatter(y_labels))
        .show(ui, |plot_ui| {
            for i in 0..n {
                for j in 0..n {
                    let r = m.get(i, j);
                    let (x, y) = (j as f64, (n - 1 - i) as f64);
                    let cell = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(cell))
                            .fill_color(color::diverging(r))
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                    let text = if r.is_nan() {
                        "n/a".to_string()
                    } else {
                        format!("{r:.2}")
                    };
                    plot_ui.text(
                        Text::new(PlotPoint::new(x, y), RichText::new(text).strong())
                            .color(Color32::BLACK),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Parallel coordinates
// ---------------------------------------------------------------------------

fn parallel_coordinates(ui: &mut Ui, p: &ParallelCoordinates) {
    ui.label(format!("Lines coloured by {}", p.color));

    Plot::new("parallel_coordinates")
        .x_axis_formatter(label_formatter(p.dimensions.clone()))
        .show_axes([true, false])
        .include_y(-0.1)
        .include_y(1.1)
        .show(ui, |plot_ui| {
            for (line, &c) in p.lines.iter().zip(&p.color_values) {
                let points: PlotPoints = line
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| [i as f64, v])
                    .collect();
                plot_ui.line(Line::new(points).color(color::sequential(c)).width(1.0));
            }

            for (i, &(min, max)) in p.ranges.iter().enumerate() {
                let x = i as f64;
                plot_ui.line(
                    Line::new(PlotPoints::from(vec![[x, 0.0], [x, 1.0]]))
                        .color(Color32::DARK_GRAY)
                        .width(2.0),
                );
                plot_ui.text(Text::new(PlotPoint::new(x, -0.05), format_number(min)));
                plot_ui.text(Text::new(PlotPoint::new(x, 1.05), format_number(max)));
            }
        });
}
