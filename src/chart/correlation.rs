use serde::Serialize;

use crate::data::view::FilteredView;

/// Symmetric matrix of pairwise Pearson correlations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Pearson correlation coefficient. NaN when fewer than two pairs are given
/// or either side has zero variance.
pub fn pearson(pairs: &[(f64, f64)]) -> f64 {
    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }
    // Rounding in the mean leaves a tiny nonzero spread for constant
    // inexact values, so constancy is checked on the values themselves.
    let (x0, y0) = pairs[0];
    if pairs.iter().all(|p| p.0 == x0) || pairs.iter().all(|p| p.1 == y0) {
        return f64::NAN;
    }
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Correlations between the given table columns over the visible rows,
/// each pair using only the rows where both values are present.
pub fn pearson_matrix(view: &FilteredView, columns: &[usize]) -> CorrelationMatrix {
    let table = view.table();
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|&c| view.values(c).map(|v| v.as_f64()).collect())
        .collect();

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let pairs: Vec<(f64, f64)> = series[i]
                .iter()
                .zip(&series[j])
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .collect();
            let r = if i == j {
                if pearson(&pairs).is_nan() {
                    f64::NAN
                } else {
                    1.0
                }
            } else {
                pearson(&pairs)
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: columns
            .iter()
            .map(|&c| table.columns()[c].clone())
            .collect(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::*;
    use crate::data::model::{Dataset, Table, Value};

    fn view_of(rows: Vec<Vec<Value>>) -> FilteredView {
        let headers = (0..rows[0].len()).map(|i| format!("c{i}")).collect();
        let table = Table::from_values(headers, rows);
        FilteredView::all(Arc::new(Dataset::new(table)))
    }

    #[test]
    fn perfect_and_inverse_correlation() {
        assert!((pearson(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]) - 1.0).abs() < 1e-12);
        assert!((pearson(&[(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_are_nan() {
        assert!(pearson(&[(1.0, 1.0)]).is_nan());
        assert!(pearson(&[(1.0, 5.0), (2.0, 5.0)]).is_nan());
    }

    #[test]
    fn uses_pairwise_complete_observations() {
        use Value::{Missing as M, Number as N};
        let view = view_of(vec![
            vec![N(1.0), N(1.0), M],
            vec![N(2.0), N(2.0), N(10.0)],
            vec![N(3.0), M, N(20.0)],
            vec![N(4.0), N(4.0), N(30.0)],
        ]);
        let m = pearson_matrix(&view, &[0, 1, 2]);
        assert_eq!(m.columns, vec!["c0", "c1", "c2"]);
        // c0/c1 share rows 0, 1 and 3; c0/c2 share rows 1, 2 and 3.
        assert!((m.get(0, 1) - 1.0).abs() < 1e-12);
        assert!((m.get(0, 2) - 1.0).abs() < 1e-12);
        assert!((m.get(1, 2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_column_has_nan_diagonal() {
        use Value::Number as N;
        let view = view_of(vec![vec![N(1.0), N(7.0)], vec![N(2.0), N(7.0)]]);
        let m = pearson_matrix(&view, &[0, 1]);
        assert_eq!(m.get(0, 0), 1.0);
        assert!(m.get(1, 1).is_nan());
        assert!(m.get(0, 1).is_nan());
    }

    #[test]
    fn constant_fractional_column_is_nan() {
        use Value::Number as N;
        let view = view_of(vec![
            vec![N(0.1), N(1.0)],
            vec![N(0.1), N(2.0)],
            vec![N(0.1), N(3.0)],
        ]);
        let m = pearson_matrix(&view, &[0, 1]);
        assert!(m.get(0, 0).is_nan());
        assert!(m.get(0, 1).is_nan());
        assert!(m.get(1, 0).is_nan());
        assert_eq!(m.get(1, 1), 1.0);
        assert!(pearson(&[(0.3, 1.0), (0.3, 5.0), (0.3, 2.0)]).is_nan());
    }

    proptest! {
        #[test]
        fn matrix_is_symmetric_with_unit_diagonal(
            rows in prop::collection::vec(
                prop::collection::vec(prop::option::weighted(0.8, -50i32..50), 3),
                2..30,
            )
        ) {
            let rows: Vec<Vec<Value>> = rows
                .into_iter()
                .map(|r| {
                    r.into_iter()
                        .map(|v| v.map_or(Value::Missing, |v| Value::Number(v as f64)))
                        .collect()
                })
                .collect();
            let view = view_of(rows);
            let numeric: Vec<usize> = view
                .dataset()
                .specs
                .iter()
                .filter(|s| s.kind() == crate::data::classify::ColumnKind::Numeric)
                .map(|s| s.index)
                .collect();
            let m = pearson_matrix(&view, &numeric);
            for i in 0..m.len() {
                for j in 0..m.len() {
                    let (a, b) = (m.get(i, j), m.get(j, i));
                    prop_assert!(a == b || (a.is_nan() && b.is_nan()));
                    prop_assert!(a.is_nan() || (-1.0..=1.0).contains(&a));
                }
                let column = view.numbers(numeric[i]);
                let varies = column.iter().any(|v| *v != column[0]);
                if varies {
                    prop_assert_eq!(m.get(i, i), 1.0);
                }
            }
        }
    }
}
