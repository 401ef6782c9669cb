use std::collections::{BTreeMap, BTreeSet};

use super::classify::{ColumnKind, ColumnSpec, Domain};
use super::model::Value;
use crate::error::FilterError;

// ---------------------------------------------------------------------------
// Predicate: the test a single column filter applies to a value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Categorical membership.
    OneOf(BTreeSet<String>),
    /// Closed numeric interval.
    Between { lo: f64, hi: f64 },
}

impl Predicate {
    /// The predicate that lets every observed value through.
    pub fn open(domain: &Domain) -> Self {
        match domain {
            Domain::Categories(all) => Predicate::OneOf(all.clone()),
            Domain::Range { min, max } => Predicate::Between { lo: *min, hi: *max },
        }
    }

    /// Whether this predicate admits the entire domain. Such a predicate
    /// places no constraint on rows, not even on rows with missing values.
    /// A column without any values has nothing to filter on.
    pub fn covers(&self, domain: &Domain) -> bool {
        match (self, domain) {
            (_, Domain::Categories(all)) if all.is_empty() => true,
            (Predicate::OneOf(selected), Domain::Categories(all)) => {
                all.iter().all(|v| selected.contains(v))
            }
            (Predicate::Between { lo, hi }, Domain::Range { min, max }) => lo <= min && hi >= max,
            _ => false,
        }
    }

    /// A missing value never satisfies a predicate.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Predicate::OneOf(selected) => value
                .label()
                .is_some_and(|label| selected.contains(label.as_ref())),
            Predicate::Between { lo, hi } => value.as_f64().is_some_and(|v| *lo <= v && v <= *hi),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter state: column name → predicate
// ---------------------------------------------------------------------------

/// Per-column predicates. A column absent from the map is unconstrained.
pub type FilterState = BTreeMap<String, Predicate>;

/// Initialise a [`FilterState`] with every predicate open (show everything).
pub fn init_filter_state(specs: &[ColumnSpec]) -> FilterState {
    specs
        .iter()
        .map(|spec| (spec.name.clone(), Predicate::open(&spec.domain)))
        .collect()
}

// ---------------------------------------------------------------------------
// Filter widgets
// ---------------------------------------------------------------------------

/// The editable filter set behind the sidebar: one predicate per column,
/// validated against the column's domain. Changing a predicate never
/// recomputes the filtered view; callers batch changes and run the
/// compositor once.
#[derive(Debug, Clone, Default)]
pub struct FilterWidgets {
    domains: BTreeMap<String, Domain>,
    state: FilterState,
}

impl FilterWidgets {
    pub fn new(specs: &[ColumnSpec]) -> Self {
        Self {
            domains: specs
                .iter()
                .map(|spec| (spec.name.clone(), spec.domain.clone()))
                .collect(),
            state: init_filter_state(specs),
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn predicate(&self, column: &str) -> Option<&Predicate> {
        self.state.get(column)
    }

    pub fn domain(&self, column: &str) -> Option<&Domain> {
        self.domains.get(column)
    }

    /// Whether the column's predicate currently excludes anything.
    pub fn is_active(&self, column: &str) -> bool {
        match (self.state.get(column), self.domains.get(column)) {
            (Some(pred), Some(domain)) => !pred.covers(domain),
            _ => false,
        }
    }

    pub fn active_count(&self) -> usize {
        self.domains.keys().filter(|c| self.is_active(c)).count()
    }

    /// Replace the selected labels of a categorical column. Every label
    /// must belong to the column's domain; otherwise nothing changes.
    pub fn set_categorical_selection<I, S>(
        &mut self,
        column: &str,
        subset: I,
    ) -> Result<(), FilterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domain = self.categories(column)?;
        let (selected, rejected): (BTreeSet<String>, BTreeSet<String>) = subset
            .into_iter()
            .map(Into::into)
            .partition(|label| domain.contains(label));

        if !rejected.is_empty() {
            return Err(FilterError::InvalidSelection {
                column: column.to_string(),
                rejected: rejected.into_iter().collect(),
            });
        }
        self.state
            .insert(column.to_string(), Predicate::OneOf(selected));
        Ok(())
    }

    /// Set the closed range of a numeric column. The range is intersected
    /// with the observed range and the range actually applied is returned.
    /// A range disjoint from the observed one is stored as given, so it
    /// stays active and admits no row.
    pub fn set_numeric_range(
        &mut self,
        column: &str,
        lo: f64,
        hi: f64,
    ) -> Result<(f64, f64), FilterError> {
        let (min, max) = self.range(column)?;
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(FilterError::InvalidRange {
                column: column.to_string(),
                lo,
                hi,
            });
        }

        let (lo, hi) = if hi < min || lo > max {
            (lo, hi)
        } else {
            (lo.max(min), hi.min(max))
        };
        self.state
            .insert(column.to_string(), Predicate::Between { lo, hi });
        Ok((lo, hi))
    }

    /// Flip a single label of a categorical column.
    pub fn toggle(&mut self, column: &str, label: &str) -> Result<(), FilterError> {
        let mut selected = match self.state.get(column) {
            Some(Predicate::OneOf(selected)) => selected.clone(),
            _ => self.categories(column)?.clone(),
        };
        if !selected.remove(label) {
            selected.insert(label.to_string());
        }
        self.set_categorical_selection(column, selected)
    }

    /// Select all values in a categorical column.
    pub fn select_all(&mut self, column: &str) -> Result<(), FilterError> {
        let all = self.categories(column)?.clone();
        self.set_categorical_selection(column, all)
    }

    /// Deselect all values in a categorical column.
    pub fn select_none(&mut self, column: &str) -> Result<(), FilterError> {
        self.set_categorical_selection(column, Vec::<String>::new())
    }

    /// Reopen one column's predicate.
    pub fn reset(&mut self, column: &str) -> Result<(), FilterError> {
        let domain = self
            .domains
            .get(column)
            .ok_or_else(|| FilterError::UnknownColumn(column.to_string()))?;
        self.state
            .insert(column.to_string(), Predicate::open(domain));
        Ok(())
    }

    pub fn reset_all(&mut self) {
        for (column, domain) in &self.domains {
            self.state.insert(column.clone(), Predicate::open(domain));
        }
    }

    fn categories(&self, column: &str) -> Result<&BTreeSet<String>, FilterError> {
        match self.domains.get(column) {
            Some(Domain::Categories(all)) => Ok(all),
            Some(Domain::Range { .. }) => Err(FilterError::KindMismatch {
                column: column.to_string(),
                expected: ColumnKind::Categorical,
                actual: ColumnKind::Numeric,
            }),
            None => Err(FilterError::UnknownColumn(column.to_string())),
        }
    }

    fn range(&self, column: &str) -> Result<(f64, f64), FilterError> {
        match self.domains.get(column) {
            Some(Domain::Range { min, max }) => Ok((*min, *max)),
            Some(Domain::Categories(_)) => Err(FilterError::KindMismatch {
                column: column.to_string(),
                expected: ColumnKind::Numeric,
                actual: ColumnKind::Categorical,
            }),
            None => Err(FilterError::UnknownColumn(column.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec {
                name: "gender".into(),
                index: 0,
                domain: Domain::Categories(["F", "M"].iter().map(|s| s.to_string()).collect()),
            },
            ColumnSpec {
                name: "math".into(),
                index: 1,
                domain: Domain::Range {
                    min: 0.0,
                    max: 100.0,
                },
            },
        ]
    }

    #[test]
    fn new_widgets_are_open() {
        let widgets = FilterWidgets::new(&specs());
        assert_eq!(widgets.active_count(), 0);
        assert_eq!(
            widgets.predicate("math"),
            Some(&Predicate::Between {
                lo: 0.0,
                hi: 100.0
            })
        );
    }

    #[test]
    fn categorical_selection_narrows_one_column() {
        let mut widgets = FilterWidgets::new(&specs());
        widgets.set_categorical_selection("gender", ["M"]).unwrap();
        assert!(widgets.is_active("gender"));
        assert!(!widgets.is_active("math"));
        assert_eq!(widgets.active_count(), 1);
    }

    #[test]
    fn selection_outside_domain_keeps_last_valid_state() {
        let mut widgets = FilterWidgets::new(&specs());
        widgets.set_categorical_selection("gender", ["F"]).unwrap();
        let err = widgets
            .set_categorical_selection("gender", ["M", "X"])
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidSelection {
                column: "gender".into(),
                rejected: vec!["X".into()],
            }
        );
        assert_eq!(
            widgets.predicate("gender"),
            Some(&Predicate::OneOf(["F".to_string()].into_iter().collect()))
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut widgets = FilterWidgets::new(&specs());
        widgets.set_numeric_range("math", 10.0, 20.0).unwrap();
        assert!(matches!(
            widgets.set_numeric_range("math", 50.0, 40.0),
            Err(FilterError::InvalidRange { .. })
        ));
        assert!(widgets.set_numeric_range("math", f64::NAN, 40.0).is_err());
        assert_eq!(
            widgets.predicate("math"),
            Some(&Predicate::Between { lo: 10.0, hi: 20.0 })
        );
    }

    #[test]
    fn out_of_domain_bounds_are_clamped() {
        let mut widgets = FilterWidgets::new(&specs());
        assert_eq!(
            widgets.set_numeric_range("math", -0.0001, 100.0001),
            Ok((0.0, 100.0))
        );
        assert!(!widgets.is_active("math"));
        assert_eq!(widgets.set_numeric_range("math", 65.0, 250.0), Ok((65.0, 100.0)));
        assert!(widgets.is_active("math"));
    }

    #[test]
    fn range_beyond_the_domain_is_not_snapped_to_an_edge() {
        let mut widgets = FilterWidgets::new(&specs());
        assert_eq!(
            widgets.set_numeric_range("math", 150.0, 200.0),
            Ok((150.0, 200.0))
        );
        assert!(widgets.is_active("math"));
        let predicate = widgets.predicate("math").unwrap();
        assert!(!predicate.matches(&Value::Number(100.0)));

        assert_eq!(
            widgets.set_numeric_range("math", -20.0, -10.0),
            Ok((-20.0, -10.0))
        );
        assert!(!widgets.predicate("math").unwrap().matches(&Value::Number(0.0)));
    }

    #[test]
    fn kind_mismatch_and_unknown_column() {
        let mut widgets = FilterWidgets::new(&specs());
        assert!(matches!(
            widgets.set_numeric_range("gender", 0.0, 1.0),
            Err(FilterError::KindMismatch { .. })
        ));
        assert!(matches!(
            widgets.set_categorical_selection("math", ["1"]),
            Err(FilterError::KindMismatch { .. })
        ));
        assert_eq!(
            widgets.reset("nope"),
            Err(FilterError::UnknownColumn("nope".into()))
        );
    }

    #[test]
    fn toggle_all_none_and_reset() {
        let mut widgets = FilterWidgets::new(&specs());
        widgets.toggle("gender", "F").unwrap();
        assert_eq!(
            widgets.predicate("gender"),
            Some(&Predicate::OneOf(["M".to_string()].into_iter().collect()))
        );
        widgets.select_none("gender").unwrap();
        assert_eq!(
            widgets.predicate("gender"),
            Some(&Predicate::OneOf(BTreeSet::new()))
        );
        widgets.select_all("gender").unwrap();
        assert!(!widgets.is_active("gender"));

        widgets.set_numeric_range("math", 1.0, 2.0).unwrap();
        widgets.toggle("gender", "M").unwrap();
        widgets.reset("math").unwrap();
        assert_eq!(widgets.active_count(), 1);
        widgets.reset_all();
        assert_eq!(widgets.active_count(), 0);
    }

    #[test]
    fn missing_values_fail_every_predicate() {
        let one_of = Predicate::OneOf(["M".to_string()].into_iter().collect());
        let between = Predicate::Between { lo: 0.0, hi: 1.0 };
        assert!(!one_of.matches(&Value::Missing));
        assert!(!between.matches(&Value::Missing));
        assert!(one_of.matches(&Value::Text("M".into())));
        assert!(between.matches(&Value::Number(1.0)));
    }
}
