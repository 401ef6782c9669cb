use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::data::model::{Table, Value};
use crate::error::ClassificationError;

// ---------------------------------------------------------------------------
// Column kinds and domains
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ColumnKind {
    Categorical,
    Numeric,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Categorical => write!(f, "categorical"),
            ColumnKind::Numeric => write!(f, "numeric"),
        }
    }
}

/// The observed values of a column: the sorted distinct labels of a
/// categorical column, or the `[min, max]` range of a numeric one.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    Categories(BTreeSet<String>),
    Range { min: f64, max: f64 },
}

/// Derived once from the table and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    /// Position of the column in the table.
    pub index: usize,
    pub domain: Domain,
}

impl ColumnSpec {
    pub fn kind(&self) -> ColumnKind {
        match self.domain {
            Domain::Categories(_) => ColumnKind::Categorical,
            Domain::Range { .. } => ColumnKind::Numeric,
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Produce one [`ColumnSpec`] per column. A column is numeric iff every
/// non-missing value is a number. Columns without any values come back as
/// empty categorical columns together with a [`ClassificationError`].
pub fn classify(table: &Table) -> (Vec<ColumnSpec>, Vec<ClassificationError>) {
    let mut specs = Vec::with_capacity(table.width());
    let mut warnings = Vec::new();

    for (index, name) in table.columns().iter().enumerate() {
        let present: Vec<&Value> = table
            .rows()
            .iter()
            .map(|row| &row[index])
            .filter(|v| !v.is_missing())
            .collect();

        let domain = if present.is_empty() {
            let warning = ClassificationError {
                column: name.clone(),
            };
            log::warn!("{warning}");
            warnings.push(warning);
            Domain::Categories(BTreeSet::new())
        } else if present.iter().all(|v| matches!(v, Value::Number(_))) {
            let (min, max) = present
                .iter()
                .filter_map(|v| v.as_f64())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });
            Domain::Range { min, max }
        } else {
            Domain::Categories(
                present
                    .iter()
                    .filter_map(|v| v.label())
                    .map(|l| l.into_owned())
                    .collect(),
            )
        };

        specs.push(ColumnSpec {
            name: name.clone(),
            index,
            domain,
        });
    }

    (specs, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::from_text_records(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn numeric_and_categorical_columns() {
        let t = table(
            &["gender", "math"],
            &[&["M", "70"], &["F", "85"], &["M", "60"]],
        );
        let (specs, warnings) = classify(&t);
        assert!(warnings.is_empty());
        assert_eq!(specs[0].kind(), ColumnKind::Categorical);
        assert_eq!(
            specs[0].domain,
            Domain::Categories(["F", "M"].iter().map(|s| s.to_string()).collect())
        );
        assert_eq!(specs[1].domain, Domain::Range { min: 60.0, max: 85.0 });
        assert_eq!(specs[1].index, 1);
    }

    #[test]
    fn missing_values_do_not_affect_the_domain() {
        let t = table(&["age"], &[&["21"], &[""], &["NaN"], &["30"]]);
        let (specs, _) = classify(&t);
        assert_eq!(specs[0].domain, Domain::Range { min: 21.0, max: 30.0 });
    }

    #[test]
    fn empty_column_degrades_to_empty_categorical() {
        let t = table(&["blank", "x"], &[&["", "1"], &["NA", "2"]]);
        let (specs, warnings) = classify(&t);
        assert_eq!(specs[0].kind(), ColumnKind::Categorical);
        assert_eq!(specs[0].domain, Domain::Categories(BTreeSet::new()));
        assert_eq!(
            warnings,
            vec![ClassificationError {
                column: "blank".into()
            }]
        );
        assert_eq!(specs[1].kind(), ColumnKind::Numeric);
    }
}
