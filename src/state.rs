use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::chart::{ChartArtifact, ChartKind, ChartRegistry, ChartRequest, Slot, DEFAULT_BINS};
use crate::color::ColorMap;
use crate::data::cache::DatasetCache;
use crate::data::classify::Domain;
use crate::data::filter::FilterWidgets;
use crate::data::loader::LoadOptions;
use crate::data::model::{Dataset, Table};
use crate::data::stats::{describe, Summary};
use crate::data::view::{apply, FilteredView};
use crate::error::{FilterError, LoadError};

/// Most columns a multi-column slot is pre-filled with.
pub const MAX_SUGGESTED_DIMENSIONS: usize = 6;

/// The tabs of the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Chart,
    Table,
    Summary,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// File the current dataset was read from.
    pub source: Option<PathBuf>,
    pub load_options: LoadOptions,
    cache: DatasetCache,

    /// Loaded dataset (None until user loads a file).
    dataset: Option<Arc<Dataset>>,
    filters: FilterWidgets,
    /// Rows passing the current filters.
    view: Option<FilteredView>,
    /// Set by filter edits, cleared by [`AppState::refilter`].
    filters_dirty: bool,

    pub registry: ChartRegistry,
    request: ChartRequest,
    artifact: Option<ChartArtifact>,
    color_map: Option<ColorMap>,
    summary: Option<Summary>,
    /// The visible rows copied out for the data table tab.
    visible: Option<Table>,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(LoadOptions::default(), DEFAULT_BINS)
    }
}

impl AppState {
    pub fn new(load_options: LoadOptions, default_bins: usize) -> Self {
        Self {
            source: None,
            load_options,
            cache: DatasetCache::default(),
            dataset: None,
            filters: FilterWidgets::default(),
            view: None,
            filters_dirty: false,
            registry: ChartRegistry::with_builtin(),
            request: ChartRequest::new(ChartKind::Histogram).with_bins(default_bins),
            artifact: None,
            color_map: None,
            summary: None,
            visible: None,
            tab: Tab::default(),
            status_message: None,
        }
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.dataset.as_ref()
    }

    pub fn view(&self) -> Option<&FilteredView> {
        self.view.as_ref()
    }

    pub fn filters(&self) -> &FilterWidgets {
        &self.filters
    }

    pub fn request(&self) -> &ChartRequest {
        &self.request
    }

    pub fn color_map(&self) -> Option<&ColorMap> {
        self.color_map.as_ref()
    }

    // -- loading ------------------------------------------------------------

    /// Load `path` with the current options. On failure the previous
    /// dataset stays loaded and the error is shown in the status line.
    pub fn open(&mut self, path: &Path) -> Result<(), LoadError> {
        match self.cache.get_or_load(path, &self.load_options) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    dataset.len(),
                    dataset.table.columns()
                );
                self.source = Some(path.to_path_buf());
                self.set_dataset(dataset);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Re-read the current source from disk.
    pub fn reload(&mut self) -> Result<(), LoadError> {
        let Some(path) = self.source.clone() else {
            return Ok(());
        };
        self.cache.invalidate();
        self.open(&path)
    }

    /// Ingest a newly loaded dataset: open filters, full view and a chart
    /// request suggested for the current chart kind.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        for warning in &dataset.warnings {
            log::warn!("{warning}");
        }
        self.status_message = match dataset.warnings.len() {
            0 => None,
            1 => Some(dataset.warnings[0].to_string()),
            n => Some(format!("{n} columns have no values")),
        };

        self.filters = FilterWidgets::new(&dataset.specs);
        self.view = Some(FilteredView::all(Arc::clone(&dataset)));
        self.filters_dirty = false;
        self.summary = None;
        self.visible = None;
        self.dataset = Some(dataset);
        self.set_chart_kind(self.request.kind);
    }

    // -- filtering ----------------------------------------------------------

    /// Run one widget edit. A rejected edit leaves the filters unchanged and
    /// is only logged.
    pub fn edit_filters<T>(
        &mut self,
        edit: impl FnOnce(&mut FilterWidgets) -> Result<T, FilterError>,
    ) -> Option<T> {
        match edit(&mut self.filters) {
            Ok(value) => {
                self.filters_dirty = true;
                Some(value)
            }
            Err(e) => {
                log::debug!("Filter input rejected: {e}");
                None
            }
        }
    }

    pub fn reset_filters(&mut self) {
        self.filters.reset_all();
        self.filters_dirty = true;
    }

    /// Recompute the view if any filter changed since the last call.
    /// Called once per frame after all widgets have run.
    pub fn refilter(&mut self) {
        if !self.filters_dirty {
            return;
        }
        self.filters_dirty = false;
        let Some(dataset) = &self.dataset else {
            return;
        };
        let view = apply(dataset, self.filters.state());
        log::debug!(
            "Filtered to {} of {} rows ({} active filters)",
            view.len(),
            dataset.len(),
            self.filters.active_count()
        );
        if self.view.as_ref() != Some(&view) {
            self.view = Some(view);
            self.artifact = None;
            self.summary = None;
            self.visible = None;
        }
    }

    // -- charts -------------------------------------------------------------

    /// Switch chart kind, pre-filling its slots from the dataset's columns.
    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        let bins = self.request.bins;
        self.request = match &self.dataset {
            Some(dataset) => self
                .registry
                .suggest(kind, dataset, MAX_SUGGESTED_DIMENSIONS),
            None => ChartRequest::new(kind),
        }
        .with_bins(bins);
        self.chart_changed();
    }

    pub fn set_slot(&mut self, slot: Slot, columns: Vec<String>) {
        if self.request.columns(slot) != columns.as_slice() {
            self.request.set(slot, columns);
            self.chart_changed();
        }
    }

    pub fn set_bins(&mut self, bins: usize) {
        if self.request.bins != bins {
            self.request.bins = bins;
            self.chart_changed();
        }
    }

    fn chart_changed(&mut self) {
        self.artifact = None;
        self.color_map = self.request.first(Slot::Color).and_then(|column| {
            match &self.dataset.as_ref()?.spec(column)?.domain {
                Domain::Categories(labels) => Some(ColorMap::new(column, labels)),
                Domain::Range { .. } => None,
            }
        });
    }

    /// The chart for the current view and request, rebuilt only after one
    /// of them changed.
    pub fn artifact(&mut self) -> Option<&ChartArtifact> {
        let view = self.view.as_ref()?;
        if self.artifact.is_none() {
            log::debug!("Rendering {:?}", self.request);
            self.artifact = Some(self.registry.render_or_placeholder(view, &self.request));
        }
        self.artifact.as_ref()
    }

    /// Pretty JSON of the current chart data.
    pub fn artifact_json(&mut self) -> Option<String> {
        let artifact = self.artifact()?;
        match serde_json::to_string_pretty(artifact) {
            Ok(json) => Some(json),
            Err(e) => {
                log::error!("Failed to serialise chart data: {e}");
                None
            }
        }
    }

    /// The visible rows as a table, paired with their indices in the
    /// loaded dataset.
    pub fn visible_rows(&mut self) -> Option<(&[usize], &Table)> {
        let view = self.view.as_ref()?;
        if self.visible.is_none() {
            self.visible = Some(view.materialize());
        }
        Some((view.rows(), self.visible.as_ref()?))
    }

    /// Summary statistics of the current view.
    pub fn summary(&mut self) -> Option<&Summary> {
        let view = self.view.as_ref()?;
        if self.summary.is_none() {
            self.summary = Some(describe(view));
        }
        self.summary.as_ref()
    }
}
