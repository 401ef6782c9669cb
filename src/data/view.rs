use std::sync::Arc;

use super::filter::{FilterState, Predicate};
use super::model::{Dataset, Table, Value};

// ---------------------------------------------------------------------------
// FilteredView – the rows that survive the current filters
// ---------------------------------------------------------------------------

/// A derived subset of a dataset's rows. Never edited in place: every
/// filter change produces a fresh view.
#[derive(Debug, Clone)]
pub struct FilteredView {
    dataset: Arc<Dataset>,
    rows: Vec<usize>,
}

impl PartialEq for FilteredView {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.dataset, &other.dataset) && self.rows == other.rows
    }
}

impl FilteredView {
    /// The unfiltered view.
    pub fn all(dataset: Arc<Dataset>) -> Self {
        let rows = (0..dataset.len()).collect();
        Self { dataset, rows }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn table(&self) -> &Table {
        &self.dataset.table
    }

    /// Indices into the dataset's table, in table order.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The values of one column over the visible rows.
    pub fn values(&self, column: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows
            .iter()
            .map(move |&row| self.dataset.table.value(row, column))
    }

    /// The non-missing numbers of one column over the visible rows.
    pub fn numbers(&self, column: usize) -> Vec<f64> {
        self.values(column).filter_map(Value::as_f64).collect()
    }

    /// Filter this view further.
    pub fn refine(&self, filters: &FilterState) -> FilteredView {
        let constraints = active_constraints(&self.dataset, filters);
        let rows = self
            .rows
            .iter()
            .copied()
            .filter(|&row| row_passes(&self.dataset.table, row, &constraints))
            .collect();
        FilteredView {
            dataset: Arc::clone(&self.dataset),
            rows,
        }
    }

    /// Copy the visible rows into a standalone table.
    pub fn materialize(&self) -> Table {
        self.dataset.table.select_rows(&self.rows)
    }
}

// ---------------------------------------------------------------------------
// Compositor
// ---------------------------------------------------------------------------

/// Return the view of rows that pass all active filters.
///
/// A row passes when, for every column whose predicate does not cover the
/// column's whole domain, the row's value satisfies the predicate. Missing
/// values never satisfy an active predicate. Table order is preserved.
pub fn apply(dataset: &Arc<Dataset>, filters: &FilterState) -> FilteredView {
    FilteredView::all(Arc::clone(dataset)).refine(filters)
}

/// Predicates that actually constrain rows, paired with their column index.
fn active_constraints<'a>(
    dataset: &Dataset,
    filters: &'a FilterState,
) -> Vec<(usize, &'a Predicate)> {
    filters
        .iter()
        .filter_map(|(column, predicate)| {
            let spec = dataset.spec(column)?;
            if predicate.covers(&spec.domain) {
                None
            } else {
                Some((spec.index, predicate))
            }
        })
        .collect()
}

fn row_passes(table: &Table, row: usize, constraints: &[(usize, &Predicate)]) -> bool {
    constraints
        .iter()
        .all(|(column, predicate)| predicate.matches(table.value(row, *column)))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::classify::Domain;
    use crate::data::filter::FilterWidgets;

    fn scores() -> Arc<Dataset> {
        let table = Table::from_text_records(
            vec!["gender".into(), "math".into()],
            vec![
                vec!["M".into(), "70".into()],
                vec!["F".into(), "85".into()],
                vec!["M".into(), "60".into()],
            ],
        );
        Arc::new(Dataset::new(table))
    }

    #[test]
    fn gender_and_full_math_range() {
        let dataset = scores();
        let mut widgets = FilterWidgets::new(&dataset.specs);
        widgets.set_categorical_selection("gender", ["M"]).unwrap();
        widgets.set_numeric_range("math", 0.0, 100.0).unwrap();

        let view = apply(&dataset, widgets.state());
        assert_eq!(view.rows(), &[0, 2]);
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn math_range_alone() {
        let dataset = scores();
        let mut widgets = FilterWidgets::new(&dataset.specs);
        widgets.set_numeric_range("math", 65.0, 100.0).unwrap();

        let view = apply(&dataset, widgets.state());
        assert_eq!(view.rows(), &[1]);
        assert_eq!(view.values(1).next(), Some(&Value::Number(85.0)));
    }

    #[test]
    fn math_range_above_every_score_hides_all_rows() {
        let dataset = scores();
        let mut widgets = FilterWidgets::new(&dataset.specs);
        assert_eq!(
            widgets.set_numeric_range("math", 90.0, 100.0),
            Ok((90.0, 100.0))
        );

        let view = apply(&dataset, widgets.state());
        assert!(view.is_empty());
    }

    #[test]
    fn missing_values_only_fail_active_predicates() {
        let table = Table::from_text_records(
            vec!["age".into()],
            vec![vec!["21".into()], vec!["".into()], vec!["30".into()]],
        );
        let dataset = Arc::new(Dataset::new(table));
        let mut widgets = FilterWidgets::new(&dataset.specs);
        assert_eq!(apply(&dataset, widgets.state()).len(), 3);

        widgets.set_numeric_range("age", 21.0, 29.0).unwrap();
        assert_eq!(apply(&dataset, widgets.state()).rows(), &[0]);
    }

    #[test]
    fn materialize_keeps_visible_rows_in_order() {
        let dataset = scores();
        let mut widgets = FilterWidgets::new(&dataset.specs);
        widgets.set_categorical_selection("gender", ["M"]).unwrap();
        let table = apply(&dataset, widgets.state()).materialize();
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(1, 1), &Value::Number(60.0));
    }

    // -- properties over random tables and filters --

    fn arb_dataset() -> impl Strategy<Value = Arc<Dataset>> {
        let cell = prop_oneof![
            1 => Just(String::new()),
            4 => prop::sample::select(vec!["A", "B", "C"]).prop_map(str::to_string),
        ];
        let score = prop_oneof![
            1 => Just(String::new()),
            4 => (0u32..=100).prop_map(|v| v.to_string()),
        ];
        prop::collection::vec((cell, score), 1..40).prop_map(|rows| {
            let records = rows.into_iter().map(|(c, s)| vec![c, s]).collect();
            let table = Table::from_text_records(vec!["group".into(), "score".into()], records);
            Arc::new(Dataset::new(table))
        })
    }

    fn arb_case() -> impl Strategy<Value = (Arc<Dataset>, FilterState)> {
        (
            arb_dataset(),
            prop::sample::subsequence(vec!["A", "B", "C"], 0..=3),
            0.0f64..=100.0,
            0.0f64..=100.0,
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(dataset, groups, a, b, use_groups, use_range)| {
                let mut widgets = FilterWidgets::new(&dataset.specs);
                if use_groups {
                    let selected: Vec<&str> = groups
                        .into_iter()
                        .filter(|g| {
                            matches!(
                                widgets.domain("group"),
                                Some(Domain::Categories(all)) if all.contains(*g)
                            )
                        })
                        .collect();
                    let _ = widgets.set_categorical_selection("group", selected);
                }
                if use_range {
                    let _ = widgets.set_numeric_range("score", a.min(b), a.max(b));
                }
                let state = widgets.state().clone();
                (dataset, state)
            })
    }

    fn satisfies_active(dataset: &Dataset, filters: &FilterState, row: usize) -> bool {
        active_constraints(dataset, filters)
            .iter()
            .all(|(col, pred)| pred.matches(dataset.table.value(row, *col)))
    }

    proptest! {
        #[test]
        fn open_filters_are_the_identity(dataset in arb_dataset()) {
            let widgets = FilterWidgets::new(&dataset.specs);
            let view = apply(&dataset, widgets.state());
            prop_assert_eq!(view.rows().to_vec(), (0..dataset.len()).collect::<Vec<_>>());
        }

        #[test]
        fn filtering_is_sound_and_complete((dataset, filters) in arb_case()) {
            let view = apply(&dataset, &filters);
            for row in 0..dataset.len() {
                let visible = view.rows().contains(&row);
                prop_assert_eq!(visible, satisfies_active(&dataset, &filters, row));
            }
            prop_assert!(view.rows().windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn filtering_is_idempotent((dataset, filters) in arb_case()) {
            let once = apply(&dataset, &filters);
            prop_assert_eq!(once.refine(&filters), once.clone());

            let again = Arc::new(Dataset::new(once.materialize()));
            let twice = apply(&again, &filters);
            prop_assert_eq!(twice.materialize(), once.materialize());
        }
    }
}
