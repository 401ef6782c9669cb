use eframe::egui;

use crate::state::{AppState, Tab};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ExplorerApp {
    pub state: AppState,
}

impl ExplorerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: chart controls and filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // All widget edits of this frame are in; filter once.
        self.state.refilter();

        // ---- Central panel: chart, data table or summary ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.tab {
            Tab::Chart => plot::chart_view(ui, &mut self.state),
            Tab::Table => table::data_table(ui, &mut self.state),
            Tab::Summary => table::summary_tab(ui, &mut self.state),
        });
    }
}
