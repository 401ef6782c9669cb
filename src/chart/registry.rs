use std::collections::BTreeMap;

use super::artifact::ChartArtifact;
use super::builders;
use super::request::{ChartKind, ChartRequest, Slot};
use crate::data::classify::ColumnKind;
use crate::data::model::Dataset;
use crate::data::view::FilteredView;
use crate::error::UnsupportedRequest;

/// How many columns of given kind the chart accepts for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRule {
    pub slot: Slot,
    pub kind: ColumnKind,
    pub min: usize,
    /// `None` means unbounded.
    pub max: Option<usize>,
}

impl SlotRule {
    pub const fn one(slot: Slot, kind: ColumnKind) -> Self {
        Self {
            slot,
            kind,
            min: 1,
            max: Some(1),
        }
    }

    pub const fn optional(slot: Slot, kind: ColumnKind) -> Self {
        Self {
            slot,
            kind,
            min: 0,
            max: Some(1),
        }
    }

    pub const fn at_least(slot: Slot, kind: ColumnKind, min: usize) -> Self {
        Self {
            slot,
            kind,
            min,
            max: None,
        }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }

    fn describe_count(&self) -> String {
        match self.max {
            Some(max) if max == self.min => format!("exactly {max}"),
            Some(max) => format!("{}..={max}", self.min),
            None => format!("at least {}", self.min),
        }
    }
}

/// Builds an artifact from a validated request over a non-empty view.
pub type BuildFn = fn(&Bound<'_>) -> Result<ChartArtifact, UnsupportedRequest>;

#[derive(Debug, Clone, Copy)]
pub struct ChartEntry {
    pub kind: ChartKind,
    pub slots: &'static [SlotRule],
    pub build: BuildFn,
}

/// A request whose columns have been resolved to table indices and checked
/// against the chart's slot rules.
#[derive(Debug)]
pub struct Bound<'a> {
    pub view: &'a FilteredView,
    pub request: &'a ChartRequest,
    columns: BTreeMap<Slot, Vec<usize>>,
}

impl Bound<'_> {
    /// The single column bound to `slot`.
    pub fn column(&self, slot: Slot) -> Result<usize, UnsupportedRequest> {
        self.optional(slot).ok_or(UnsupportedRequest::Unbound(slot))
    }

    pub fn optional(&self, slot: Slot) -> Option<usize> {
        self.columns(slot).first().copied()
    }

    pub fn columns(&self, slot: Slot) -> &[usize] {
        self.columns.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn name(&self, column: usize) -> &str {
        &self.view.table().columns()[column]
    }
}

// ---------------------------------------------------------------------------
// Built-in charts
// ---------------------------------------------------------------------------

const BUILTIN: &[ChartEntry] = &[
    ChartEntry {
        kind: ChartKind::Histogram,
        slots: &[SlotRule::one(Slot::X, ColumnKind::Numeric)],
        build: builders::histogram,
    },
    ChartEntry {
        kind: ChartKind::CategoryCounts,
        slots: &[SlotRule::one(Slot::X, ColumnKind::Categorical)],
        build: builders::category_counts,
    },
    ChartEntry {
        kind: ChartKind::Scatter,
        slots: &[
            SlotRule::one(Slot::X, ColumnKind::Numeric),
            SlotRule::one(Slot::Y, ColumnKind::Numeric),
            SlotRule::optional(Slot::Color, ColumnKind::Categorical),
        ],
        build: builders::scatter,
    },
    ChartEntry {
        kind: ChartKind::ScatterMatrix,
        slots: &[
            SlotRule::at_least(Slot::Dimensions, ColumnKind::Numeric, 2),
            SlotRule::optional(Slot::Color, ColumnKind::Categorical),
        ],
        build: builders::scatter_matrix,
    },
    ChartEntry {
        kind: ChartKind::BoxPlot,
        slots: &[
            SlotRule::one(Slot::X, ColumnKind::Categorical),
            SlotRule::one(Slot::Y, ColumnKind::Numeric),
        ],
        build: builders::box_plot,
    },
    ChartEntry {
        kind: ChartKind::CorrelationHeatmap,
        slots: &[SlotRule::at_least(Slot::Dimensions, ColumnKind::Numeric, 2)],
        build: builders::correlation_heatmap,
    },
    ChartEntry {
        kind: ChartKind::ParallelCoordinates,
        slots: &[
            SlotRule::at_least(Slot::Dimensions, ColumnKind::Numeric, 2),
            SlotRule::optional(Slot::Color, ColumnKind::Numeric),
        ],
        build: builders::parallel_coordinates,
    },
];

// ---------------------------------------------------------------------------
// Registry / dispatcher
// ---------------------------------------------------------------------------

/// Maps chart kinds to builders together with the column requirements of
/// each builder. New kinds are added with [`ChartRegistry::register`].
#[derive(Debug, Clone, Default)]
pub struct ChartRegistry {
    entries: BTreeMap<ChartKind, ChartEntry>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in chart.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for entry in BUILTIN {
            registry.register(*entry);
        }
        registry
    }

    /// Add or replace the builder for a kind, returning the previous one.
    pub fn register(&mut self, entry: ChartEntry) -> Option<ChartEntry> {
        self.entries.insert(entry.kind, entry)
    }

    pub fn entry(&self, kind: ChartKind) -> Option<&ChartEntry> {
        self.entries.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ChartKind> + '_ {
        self.entries.keys().copied()
    }

    /// Check a request against the view's columns and the chart's slots.
    pub fn validate<'a>(
        &self,
        view: &'a FilteredView,
        request: &'a ChartRequest,
    ) -> Result<Bound<'a>, UnsupportedRequest> {
        let kind = request.kind;
        let entry = self
            .entries
            .get(&kind)
            .ok_or(UnsupportedRequest::Unregistered(kind))?;

        for (slot, names) in &request.bindings {
            if !names.is_empty() && !entry.slots.iter().any(|r| r.slot == *slot) {
                return Err(UnsupportedRequest::UnexpectedSlot { kind, slot: *slot });
            }
        }

        let dataset = view.dataset();
        let mut columns = BTreeMap::new();
        for rule in entry.slots {
            let names = request.columns(rule.slot);
            if !rule.accepts(names.len()) {
                return Err(UnsupportedRequest::Arity {
                    kind,
                    slot: rule.slot,
                    expected: rule.describe_count(),
                    got: names.len(),
                });
            }
            let mut indices = Vec::with_capacity(names.len());
            for name in names {
                let spec = dataset
                    .spec(name)
                    .ok_or_else(|| UnsupportedRequest::UnknownColumn(name.clone()))?;
                if spec.kind() != rule.kind {
                    return Err(UnsupportedRequest::WrongKind {
                        kind,
                        slot: rule.slot,
                        column: name.clone(),
                        expected: rule.kind,
                        actual: spec.kind(),
                    });
                }
                indices.push(spec.index);
            }
            columns.insert(rule.slot, indices);
        }

        Ok(Bound {
            view,
            request,
            columns,
        })
    }

    /// Validate and build. An empty view yields [`ChartArtifact::NoData`]
    /// without invoking the builder.
    pub fn render(
        &self,
        view: &FilteredView,
        request: &ChartRequest,
    ) -> Result<ChartArtifact, UnsupportedRequest> {
        let bound = self.validate(view, request)?;
        if view.is_empty() {
            return Ok(ChartArtifact::NoData { kind: request.kind });
        }
        let entry = self
            .entries
            .get(&request.kind)
            .ok_or(UnsupportedRequest::Unregistered(request.kind))?;
        (entry.build)(&bound)
    }

    /// Like [`render`](Self::render), with failures turned into a
    /// placeholder artifact.
    pub fn render_or_placeholder(
        &self,
        view: &FilteredView,
        request: &ChartRequest,
    ) -> ChartArtifact {
        self.render(view, request).unwrap_or_else(|err| {
            log::debug!("Chart request rejected: {err}");
            ChartArtifact::Unsupported {
                reason: err.to_string(),
            }
        })
    }

    /// A request for `kind` with slots filled from the dataset's columns:
    /// required slots take the first unused columns of the right kind,
    /// multi-column slots take up to `max_dimensions`, optional slots stay
    /// empty.
    pub fn suggest(
        &self,
        kind: ChartKind,
        dataset: &Dataset,
        max_dimensions: usize,
    ) -> ChartRequest {
        let mut request = ChartRequest::new(kind);
        let Some(entry) = self.entries.get(&kind) else {
            return request;
        };

        let mut used: Vec<String> = Vec::new();
        for rule in entry.slots {
            let wanted = if rule.min == 0 {
                0
            } else {
                rule.max.unwrap_or(max_dimensions.max(rule.min))
            };
            let picked: Vec<String> = dataset
                .specs
                .iter()
                .filter(|s| s.kind() == rule.kind && !used.contains(&s.name))
                .take(wanted)
                .map(|s| s.name.clone())
                .collect();
            if rule.max == Some(1) {
                used.extend(picked.iter().cloned());
            }
            for name in picked {
                request = request.bind(rule.slot, name);
            }
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::chart::artifact::Series;
    use crate::data::filter::FilterWidgets;
    use crate::data::model::Table;
    use crate::data::view::apply;

    fn scores() -> Arc<Dataset> {
        let table = Table::from_text_records(
            vec!["gender".into(), "math".into(), "reading".into()],
            vec![
                vec!["M".into(), "70".into(), "72".into()],
                vec!["F".into(), "85".into(), "90".into()],
                vec!["M".into(), "60".into(), "".into()],
            ],
        );
        Arc::new(Dataset::new(table))
    }

    #[test]
    fn histogram_on_categorical_is_unsupported() {
        let view = FilteredView::all(scores());
        let request = ChartRequest::new(ChartKind::Histogram).bind(Slot::X, "gender");
        let err = ChartRegistry::with_builtin()
            .render(&view, &request)
            .unwrap_err();
        assert_eq!(
            err,
            UnsupportedRequest::WrongKind {
                kind: ChartKind::Histogram,
                slot: Slot::X,
                column: "gender".into(),
                expected: ColumnKind::Numeric,
                actual: ColumnKind::Categorical,
            }
        );
    }

    #[test]
    fn empty_view_renders_no_data() {
        let dataset = scores();
        let mut widgets = FilterWidgets::new(&dataset.specs);
        widgets.select_none("gender").unwrap();
        let view = apply(&dataset, widgets.state());
        assert!(view.is_empty());

        let request = ChartRequest::new(ChartKind::Histogram).bind(Slot::X, "math");
        assert_eq!(
            ChartRegistry::with_builtin().render(&view, &request),
            Ok(ChartArtifact::NoData {
                kind: ChartKind::Histogram
            })
        );
    }

    #[test]
    fn validation_errors() {
        let registry = ChartRegistry::with_builtin();
        let view = FilteredView::all(scores());

        let unknown = ChartRequest::new(ChartKind::Histogram).bind(Slot::X, "science");
        assert_eq!(
            registry.render(&view, &unknown),
            Err(UnsupportedRequest::UnknownColumn("science".into()))
        );

        let short = ChartRequest::new(ChartKind::CorrelationHeatmap).bind(Slot::Dimensions, "math");
        assert!(matches!(
            registry.render(&view, &short),
            Err(UnsupportedRequest::Arity { got: 1, .. })
        ));

        let extra = ChartRequest::new(ChartKind::Histogram)
            .bind(Slot::X, "math")
            .bind(Slot::Y, "reading");
        assert_eq!(
            registry.render(&view, &extra),
            Err(UnsupportedRequest::UnexpectedSlot {
                kind: ChartKind::Histogram,
                slot: Slot::Y
            })
        );

        let unregistered = ChartRegistry::new();
        assert_eq!(
            unregistered.render(&view, &ChartRequest::new(ChartKind::Scatter)),
            Err(UnsupportedRequest::Unregistered(ChartKind::Scatter))
        );
    }

    #[test]
    fn placeholder_carries_the_reason() {
        let view = FilteredView::all(scores());
        let request = ChartRequest::new(ChartKind::BoxPlot).bind(Slot::Y, "math");
        let artifact = ChartRegistry::with_builtin().render_or_placeholder(&view, &request);
        assert!(artifact.is_placeholder());
        assert!(matches!(artifact, ChartArtifact::Unsupported { reason } if reason.contains("x")));
    }

    #[test]
    fn scatter_groups_by_color() {
        let view = FilteredView::all(scores());
        let request = ChartRequest::new(ChartKind::Scatter)
            .bind(Slot::X, "math")
            .bind(Slot::Y, "reading")
            .bind(Slot::Color, "gender");
        let artifact = ChartRegistry::with_builtin().render(&view, &request).unwrap();
        let ChartArtifact::Scatter(scatter) = artifact else {
            panic!("expected a scatter plot");
        };
        assert_eq!(
            scatter.series,
            vec![
                Series {
                    label: Some("F".into()),
                    points: vec![[85.0, 90.0]],
                },
                Series {
                    label: Some("M".into()),
                    points: vec![[70.0, 72.0]],
                },
            ]
        );
    }

    #[test]
    fn custom_builders_can_be_registered() {
        fn counts_only(bound: &Bound<'_>) -> Result<ChartArtifact, UnsupportedRequest> {
            Ok(ChartArtifact::Unsupported {
                reason: format!("{} rows", bound.view.len()),
            })
        }
        let mut registry = ChartRegistry::with_builtin();
        let previous = registry.register(ChartEntry {
            kind: ChartKind::Histogram,
            slots: &[],
            build: counts_only,
        });
        assert!(previous.is_some());

        let view = FilteredView::all(scores());
        let artifact = registry
            .render(&view, &ChartRequest::new(ChartKind::Histogram))
            .unwrap();
        assert_eq!(
            artifact,
            ChartArtifact::Unsupported {
                reason: "3 rows".into()
            }
        );
    }

    #[test]
    fn suggestions_satisfy_the_slot_rules() {
        let registry = ChartRegistry::with_builtin();
        let dataset = scores();
        let view = FilteredView::all(Arc::clone(&dataset));
        for kind in ChartKind::ALL {
            let request = registry.suggest(kind, &dataset, 6);
            assert!(
                registry.validate(&view, &request).is_ok(),
                "{kind}: {request:?}"
            );
        }

        let scatter = registry.suggest(ChartKind::Scatter, &dataset, 6);
        assert_eq!(scatter.first(Slot::X), Some("math"));
        assert_eq!(scatter.first(Slot::Y), Some("reading"));
        assert_eq!(scatter.first(Slot::Color), None);
    }
}
