use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use crate::data::classify::{classify, ColumnKind, ColumnSpec};
use crate::error::ClassificationError;

/// Cell contents treated as missing when reading text sources.
pub const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "#N/A", "<NA>",
];

pub fn is_missing_token(s: &str) -> bool {
    MISSING_TOKENS.contains(&s.trim())
}

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A typed cell. After a [`Table`] is built, a column holds either only
/// `Number`/`Missing` or only `Text`/`Missing`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// The categorical label of this value, if it has one.
    pub fn label(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Missing => None,
            Value::Text(s) => Some(Cow::Borrowed(s)),
            Value::Number(v) => Some(Cow::Owned(format_number(*v))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => write!(f, "<missing>"),
            Value::Number(v) => write!(f, "{}", format_number(*v)),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Whole numbers print without a fractional part.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

// ---------------------------------------------------------------------------
// Table – rows of typed values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build from raw text cells. A column becomes numeric when every
    /// non-missing cell parses as a finite number; otherwise every
    /// non-missing cell is kept verbatim as text.
    pub fn from_text_records(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let columns = dedupe_headers(headers);
        let width = columns.len();

        let numeric: Vec<bool> = (0..width)
            .map(|c| {
                records.iter().all(|rec| match rec.get(c) {
                    Some(cell) if !is_missing_token(cell) => parse_number(cell).is_some(),
                    _ => true,
                })
            })
            .collect();

        let rows: Vec<Vec<Value>> = records
            .into_iter()
            .map(|rec| {
                let mut cells = rec.into_iter();
                (0..width)
                    .map(|c| match cells.next() {
                        None => Value::Missing,
                        Some(cell) if is_missing_token(&cell) => Value::Missing,
                        Some(cell) if numeric[c] => {
                            parse_number(&cell).map_or(Value::Missing, Value::Number)
                        }
                        Some(cell) => Value::Text(cell),
                    })
                    .collect()
            })
            .collect();

        Table { columns, rows }
    }

    /// Build from already-typed cells. Columns mixing numbers and text are
    /// coerced to text so that every column has a single kind.
    pub fn from_values(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let columns = dedupe_headers(headers);
        let width = columns.len();

        let mut rows: Vec<Vec<Value>> = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Missing);
                row
            })
            .collect();

        for c in 0..width {
            let has_text = rows.iter().any(|r| matches!(r[c], Value::Text(_)));
            if !has_text {
                continue;
            }
            for row in &mut rows {
                if let Value::Number(v) = row[c] {
                    row[c] = Value::Text(format_number(v));
                }
            }
        }

        Table { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn value(&self, row: usize, column: usize) -> &Value {
        &self.rows[row][column]
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// A new table holding the given rows, in the given order, without
    /// re-inferring column kinds.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Repeated header names get `.1`, `.2`, ... suffixes.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    headers
        .into_iter()
        .map(|h| {
            let mut name = h.clone();
            let mut n = 1;
            while seen.contains(&name) {
                name = format!("{h}.{n}");
                n += 1;
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dataset – a table with its column specs
// ---------------------------------------------------------------------------

/// A loaded table plus the column specs derived from it once at load time.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub table: Table,
    pub specs: Vec<ColumnSpec>,
    pub warnings: Vec<ClassificationError>,
}

impl Dataset {
    pub fn new(table: Table) -> Self {
        let (specs, warnings) = classify(&table);
        Dataset {
            table,
            specs,
            warnings,
        }
    }

    pub fn spec(&self, column: &str) -> Option<&ColumnSpec> {
        self.specs.iter().find(|s| s.name == column)
    }

    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.specs
            .iter()
            .filter(|s| s.kind() == kind)
            .map(|s| s.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
