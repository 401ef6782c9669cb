use eframe::egui::{self, Align, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{format_number, Table, Value};
use crate::data::stats::Summary;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;
const HEADER_HEIGHT: f32 = 22.0;

// ---------------------------------------------------------------------------
// Data table tab – raw filtered rows
// ---------------------------------------------------------------------------

pub fn data_table(ui: &mut Ui, state: &mut AppState) {
    let Some((indices, table)) = state.visible_rows() else {
        ui.label("No dataset loaded.");
        return;
    };
    if table.is_empty() {
        ui.label(RichText::new("No rows match the current filters.").italics());
        return;
    }

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| rows_table(ui, indices, table));
}

/// `indices[i]` is the dataset row that `table` row `i` was copied from.
fn rows_table(ui: &mut Ui, indices: &[usize], table: &Table) {
    let columns = table.columns();

    TableBuilder::new(ui)
        .id_salt("data_table")
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::auto().at_least(40.0))
        .columns(Column::auto().at_least(60.0).clip(true), columns.len())
        .header(HEADER_HEIGHT, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            for name in columns {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, table.len(), |mut row| {
                let i = row.index();
                row.col(|ui| {
                    ui.label(RichText::new(indices[i].to_string()).weak());
                });
                for value in &table.rows()[i] {
                    row.col(|ui| match value {
                        Value::Missing => {
                            ui.label(RichText::new(value.to_string()).weak().italics());
                        }
                        _ => {
                            ui.label(value.to_string());
                        }
                    });
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Summary tab
// ---------------------------------------------------------------------------

pub fn summary_tab(ui: &mut Ui, state: &mut AppState) {
    let Some(summary) = state.summary() else {
        ui.label("No dataset loaded.");
        return;
    };

    ui.label(format!("{} visible rows", summary.rows));
    egui::ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        if !summary.numeric.is_empty() {
            ui.heading("Numeric columns");
            ui.push_id("numeric_summary", |ui: &mut Ui| numeric_table(ui, summary));
            ui.add_space(12.0);
        }
        if !summary.categorical.is_empty() {
            ui.heading("Categorical columns");
            ui.push_id("categorical_summary", |ui: &mut Ui| categorical_table(ui, summary));
        }
    });
}

/// NaN prints as an empty cell.
fn stat(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else if v.fract() == 0.0 {
        format_number(v)
    } else {
        format!("{v:.3}")
    }
}

fn numeric_table(ui: &mut Ui, summary: &Summary) {
    const HEADERS: [&str; 9] = [
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max",
    ];

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(60.0), HEADERS.len())
        .header(HEADER_HEIGHT, |mut header| {
            for name in HEADERS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|mut body| {
            for s in &summary.numeric {
                body.row(ROW_HEIGHT, |mut row| {
                    row.col(|ui| {
                        ui.label(&s.column);
                    });
                    row.col(|ui| {
                        ui.label(s.count.to_string());
                    });
                    for v in [s.mean, s.std, s.min, s.q1, s.median, s.q3, s.max] {
                        row.col(|ui| {
                            ui.label(stat(v));
                        });
                    }
                });
            }
        });
}

fn categorical_table(ui: &mut Ui, summary: &Summary) {
    const HEADERS: [&str; 5] = ["column", "count", "unique", "top", "freq"];

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(60.0), HEADERS.len())
        .header(HEADER_HEIGHT, |mut header| {
            for name in HEADERS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|mut body| {
            for s in &summary.categorical {
                body.row(ROW_HEIGHT, |mut row| {
                    row.col(|ui| {
                        ui.label(&s.column);
                    });
                    row.col(|ui| {
                        ui.label(s.count.to_string());
                    });
                    row.col(|ui| {
                        ui.label(s.unique.to_string());
                    });
                    row.col(|ui| {
                        ui.label(s.top.as_deref().unwrap_or(""));
                    });
                    row.col(|ui| {
                        ui.label(s.freq.to_string());
                    });
                });
            }
        });
}
