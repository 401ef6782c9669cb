use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::chart::registry::SlotRule;
use crate::chart::{ChartKind, Slot, MAX_BINS};
use crate::data::classify::{ColumnSpec, Domain};
use crate::data::filter::Predicate;
use crate::data::loader::TextEncoding;
use crate::data::model::format_number;
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets and chart controls
// ---------------------------------------------------------------------------

/// Render the left panel. Filter edits only mark the filters dirty; the
/// caller recomputes the view once afterwards.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset().map(Arc::clone) else {
        ui.heading("Filters");
        ui.separator();
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            chart_controls(ui, state);
            ui.add_space(8.0);

            ui.horizontal(|ui: &mut Ui| {
                ui.heading("Filters");
                let active = state.filters().active_count();
                if ui
                    .add_enabled(active > 0, egui::Button::new(format!("Reset ({active})")))
                    .clicked()
                {
                    state.reset_filters();
                }
            });
            ui.separator();

            for spec in &dataset.specs {
                filter_widget(ui, state, spec);
            }
        });
}

fn filter_widget(ui: &mut Ui, state: &mut AppState, spec: &ColumnSpec) {
    let col = spec.name.as_str();
    let active = state.filters().is_active(col);
    let header_text = match (&spec.domain, state.filters().predicate(col)) {
        (Domain::Categories(all), Some(Predicate::OneOf(selected))) => {
            format!("{col}  ({}/{})", selected.len(), all.len())
        }
        (Domain::Range { .. }, Some(Predicate::Between { lo, hi })) => {
            format!("{col}  [{}, {}]", format_number(*lo), format_number(*hi))
        }
        _ => col.to_string(),
    };
    let mut header = RichText::new(header_text).strong();
    if active {
        header = header.color(ui.visuals().warn_fg_color);
    }

    egui::CollapsingHeader::new(header)
        .id_salt(col)
        .default_open(false)
        .show(ui, |ui: &mut Ui| match &spec.domain {
            Domain::Categories(all) if all.is_empty() => {
                ui.label(RichText::new("no values").italics());
            }
            Domain::Categories(all) => categorical_filter(ui, state, col, all.iter()),
            Domain::Range { min, max } => numeric_filter(ui, state, col, *min, *max),
        });
}

fn categorical_filter<'a>(
    ui: &mut Ui,
    state: &mut AppState,
    col: &str,
    labels: impl Iterator<Item = &'a String>,
) {
    // Select all / none buttons
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.edit_filters(|f| f.select_all(col));
        }
        if ui.small_button("None").clicked() {
            state.edit_filters(|f| f.select_none(col));
        }
    });

    let colored = state.color_map().filter(|cm| cm.column == col).cloned();
    for label in labels {
        let mut checked = match state.filters().predicate(col) {
            Some(Predicate::OneOf(selected)) => selected.contains(label),
            _ => true,
        };

        // Show colour swatch if this is the colour column
        let mut text = RichText::new(label);
        if let Some(cm) = &colored {
            text = text.color(cm.color_for(label));
        }

        if ui.checkbox(&mut checked, text).changed() {
            state.edit_filters(|f| f.toggle(col, label));
        }
    }
}

fn numeric_filter(ui: &mut Ui, state: &mut AppState, col: &str, min: f64, max: f64) {
    let (mut lo, mut hi) = match state.filters().predicate(col) {
        Some(Predicate::Between { lo, hi }) => (*lo, *hi),
        _ => (min, max),
    };

    let lo_changed = ui
        .add(egui::Slider::new(&mut lo, min..=max).text("min"))
        .changed();
    let hi_changed = ui
        .add(egui::Slider::new(&mut hi, min..=max).text("max"))
        .changed();
    if lo_changed || hi_changed {
        // An inverted range is rejected and the sliders snap back.
        state.edit_filters(|f| f.set_numeric_range(col, lo, hi));
    }

    if state.filters().is_active(col) && ui.small_button("Reset").clicked() {
        state.edit_filters(|f| f.reset(col));
    }
}

// ---------------------------------------------------------------------------
// Chart controls
// ---------------------------------------------------------------------------

fn chart_controls(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Chart");
    ui.separator();

    let current = state.request().kind;
    egui::ComboBox::from_id_salt("chart_kind")
        .selected_text(current.label())
        .show_ui(ui, |ui: &mut Ui| {
            let kinds: Vec<ChartKind> = state.registry.kinds().collect();
            for kind in kinds {
                if ui.selectable_label(kind == current, kind.label()).clicked() {
                    state.set_chart_kind(kind);
                }
            }
        });

    let Some(dataset) = state.dataset().map(Arc::clone) else {
        return;
    };
    let Some(entry) = state.registry.entry(current).copied() else {
        return;
    };

    for rule in entry.slots {
        let candidates = dataset.columns_of_kind(rule.kind);
        if rule.max == Some(1) {
            single_slot(ui, state, rule, &candidates);
        } else {
            multi_slot(ui, state, rule, &candidates);
        }
    }

    if current == ChartKind::Histogram {
        let mut bins = state.request().bins;
        if ui
            .add(egui::Slider::new(&mut bins, 1..=MAX_BINS).text("bins"))
            .changed()
        {
            state.set_bins(bins);
        }
    }

    let has_chart = state.artifact().is_some_and(|a| !a.is_placeholder());
    if ui
        .add_enabled(has_chart, egui::Button::new("Copy chart data as JSON"))
        .clicked()
    {
        if let Some(json) = state.artifact_json() {
            ui.ctx().copy_text(json);
        }
    }
}

fn slot_label(slot: Slot) -> &'static str {
    match slot {
        Slot::X => "X",
        Slot::Y => "Y",
        Slot::Color => "Color by",
        Slot::Dimensions => "Dimensions",
    }
}

fn single_slot(ui: &mut Ui, state: &mut AppState, rule: &SlotRule, candidates: &[String]) {
    let selected = state.request().first(rule.slot).map(str::to_string);
    let none = "(none)";
    ui.horizontal(|ui: &mut Ui| {
        ui.label(slot_label(rule.slot));
        egui::ComboBox::from_id_salt(("slot", rule.slot))
            .selected_text(selected.as_deref().unwrap_or(none))
            .show_ui(ui, |ui: &mut Ui| {
                if rule.min == 0 && ui.selectable_label(selected.is_none(), none).clicked() {
                    state.set_slot(rule.slot, Vec::new());
                }
                for col in candidates {
                    if ui
                        .selectable_label(selected.as_ref() == Some(col), col)
                        .clicked()
                    {
                        state.set_slot(rule.slot, vec![col.clone()]);
                    }
                }
            });
    });
}

fn multi_slot(ui: &mut Ui, state: &mut AppState, rule: &SlotRule, candidates: &[String]) {
    let selected = state.request().columns(rule.slot).to_vec();
    egui::CollapsingHeader::new(format!(
        "{}  ({} selected)",
        slot_label(rule.slot),
        selected.len()
    ))
    .id_salt(("slot", rule.slot))
    .default_open(true)
    .show(ui, |ui: &mut Ui| {
        for col in candidates {
            let mut checked = selected.contains(col);
            if ui.checkbox(&mut checked, col).changed() {
                // Keep the dataset's column order.
                let columns = candidates
                    .iter()
                    .filter(|c| if *c == col { checked } else { selected.contains(*c) })
                    .cloned()
                    .collect();
                state.set_slot(rule.slot, columns);
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                // Failures are reported in the status line.
                let _ = state.reload();
                ui.close_menu();
            }
            ui.separator();
            ui.label("CSV encoding");
            for encoding in [TextEncoding::Utf8, TextEncoding::Latin1] {
                if ui
                    .radio(state.load_options.encoding == encoding, encoding.to_string())
                    .clicked()
                    && state.load_options.encoding != encoding
                {
                    state.load_options.encoding = encoding;
                    let _ = state.reload();
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (state.dataset(), state.view()) {
            ui.label(format!(
                "{} rows loaded, {} visible",
                ds.len(),
                view.len()
            ));
        }

        ui.separator();

        ui.selectable_value(&mut state.tab, Tab::Chart, "Chart");
        ui.selectable_value(&mut state.tab, Tab::Table, "Data table");
        ui.selectable_value(&mut state.tab, Tab::Summary, "Summary");

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        // Failures are reported in the status line.
        let _ = state.open(&path);
    }
}
