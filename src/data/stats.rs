use std::collections::BTreeMap;

use serde::Serialize;

use super::classify::ColumnKind;
use super::view::FilteredView;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1).
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    /// Most frequent label; ties go to the label that sorts first.
    pub top: Option<String>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub rows: usize,
    pub numeric: Vec<NumericSummary>,
    pub categorical: Vec<CategoricalSummary>,
}

/// Per-column summary statistics of the visible rows.
pub fn describe(view: &FilteredView) -> Summary {
    let mut numeric = Vec::new();
    let mut categorical = Vec::new();

    for spec in &view.dataset().specs {
        match spec.kind() {
            ColumnKind::Numeric => {
                numeric.push(summarize_numbers(&spec.name, view.numbers(spec.index)));
            }
            ColumnKind::Categorical => {
                let mut counts: BTreeMap<String, usize> = BTreeMap::new();
                for label in view.values(spec.index).filter_map(|v| v.label()) {
                    *counts.entry(label.into_owned()).or_default() += 1;
                }
                let mut top: Option<(&String, usize)> = None;
                for (label, &n) in &counts {
                    if top.map_or(true, |(_, best)| n > best) {
                        top = Some((label, n));
                    }
                }
                categorical.push(CategoricalSummary {
                    column: spec.name.clone(),
                    count: counts.values().sum(),
                    unique: counts.len(),
                    top: top.map(|(label, _)| label.clone()),
                    freq: top.map_or(0, |(_, n)| n),
                });
            }
        }
    }

    Summary {
        rows: view.len(),
        numeric,
        categorical,
    }
}

fn summarize_numbers(column: &str, mut values: Vec<f64>) -> NumericSummary {
    values.sort_by(f64::total_cmp);
    let count = values.len();
    let mean = if count == 0 {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / count as f64
    };
    let std = if count < 2 {
        f64::NAN
    } else {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    };

    NumericSummary {
        column: column.to_string(),
        count,
        mean,
        std,
        min: values.first().copied().unwrap_or(f64::NAN),
        q1: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q3: quantile(&values, 0.75),
        max: values.last().copied().unwrap_or(f64::NAN),
    }
}

/// Quantile of sorted values with linear interpolation between the two
/// nearest ranks. NaN for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::model::{Dataset, Table};

    fn view(rows: &[[&str; 2]]) -> FilteredView {
        let table = Table::from_text_records(
            vec!["lunch".into(), "reading".into()],
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        );
        FilteredView::all(Arc::new(Dataset::new(table)))
    }

    #[test]
    fn quantiles_interpolate() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), 1.0);
        assert_eq!(quantile(&v, 0.5), 2.5);
        assert_eq!(quantile(&v, 0.25), 1.75);
        assert_eq!(quantile(&v, 1.0), 4.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn describes_numeric_and_categorical_columns() {
        let summary = describe(&view(&[
            ["standard", "72"],
            ["free/reduced", "90"],
            ["standard", ""],
            ["standard", "60"],
        ]));
        assert_eq!(summary.rows, 4);

        let reading = &summary.numeric[0];
        assert_eq!(reading.count, 3);
        assert_eq!(reading.mean, 74.0);
        assert_eq!(reading.min, 60.0);
        assert_eq!(reading.median, 72.0);
        assert_eq!(reading.max, 90.0);
        assert!((reading.std - 15.0995).abs() < 1e-3);

        let lunch = &summary.categorical[0];
        assert_eq!(lunch.count, 4);
        assert_eq!(lunch.unique, 2);
        assert_eq!(lunch.top.as_deref(), Some("standard"));
        assert_eq!(lunch.freq, 3);
    }

    #[test]
    fn single_value_has_no_spread() {
        let summary = describe(&view(&[["standard", "50"]]));
        assert!(summary.numeric[0].std.is_nan());
        assert_eq!(summary.numeric[0].q1, 50.0);
    }
}
