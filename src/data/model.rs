use std::fmt;

use anyhow::{Result, bail};

// ---------------------------------------------------------------------------
// CellValue – a single cell of an uploaded table
// ---------------------------------------------------------------------------

/// Text markers read as a missing value, matching the Pandas CSV defaults.
const NA_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A dynamically-typed cell value mirroring the common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`. Booleans count as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Infer a typed value from raw text (CSV cells).
    ///
    /// Empty cells, NA markers and any spelling of NaN become `Null`.
    pub fn parse(s: &str) -> CellValue {
        let s = s.trim();
        if s.is_empty() || NA_MARKERS.contains(&s) {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return if f.is_nan() {
                CellValue::Null
            } else {
                CellValue::Float(f)
            };
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Table – rectangular, ordered columns and rows
// ---------------------------------------------------------------------------

/// A rectangular table: ordered named columns and ordered rows.
///
/// Every row holds exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table, rejecting ragged rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                bail!(
                    "Row {i} has {} cells but the header has {} columns",
                    row.len(),
                    columns.len()
                );
            }
        }
        Ok(Table { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// The first `n` rows as a new table (like `DataFrame.head`).
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// The numeric view of a column, or `None` when any non-null cell is not
    /// numeric. Nulls become `None` entries.
    pub fn numeric_column(&self, idx: usize) -> Option<Vec<Option<f64>>> {
        self.column(idx)
            .map(|cell| match cell {
                CellValue::Null => Some(None),
                CellValue::Float(v) if v.is_nan() => Some(None),
                other => other.as_f64().map(Some),
            })
            .collect()
    }

    /// Append a column. `values` must hold one cell per row.
    pub fn push_column(&mut self, name: &str, values: Vec<CellValue>) -> Result<()> {
        if values.len() != self.rows.len() {
            bail!(
                "Column '{name}' has {} values but the table has {} rows",
                values.len(),
                self.rows.len()
            );
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![CellValue::Integer(1), CellValue::String("x".into())],
                vec![CellValue::Float(2.5), CellValue::Null],
                vec![CellValue::Bool(true), CellValue::String("y".into())],
            ],
        )
        .unwrap()
    }

    #[test]
    fn parse_infers_types() {
        assert_eq!(CellValue::parse(""), CellValue::Null);
        assert_eq!(CellValue::parse(" 42 "), CellValue::Integer(42));
        assert_eq!(CellValue::parse("0.25"), CellValue::Float(0.25));
        assert_eq!(CellValue::parse("true"), CellValue::Bool(true));
        assert_eq!(CellValue::parse("inf"), CellValue::Float(f64::INFINITY));
        assert_eq!(CellValue::parse("n.a."), CellValue::String("n.a.".into()));
    }

    #[test]
    fn nan_and_na_markers_are_missing() {
        for text in ["NaN", "nan", "NA", "N/A", "null", "None", "#N/A", "<NA>", " NaN "] {
            assert_eq!(CellValue::parse(text), CellValue::Null, "{text:?}");
        }
        // Rust's float parser accepts these spellings too.
        assert_eq!(CellValue::parse("NAN"), CellValue::Null);
        assert_eq!(CellValue::parse("-nan"), CellValue::Null);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Table::new(vec!["a".into()], vec![vec![CellValue::Null, CellValue::Null]]);
        assert!(err.is_err());
    }

    #[test]
    fn numeric_column_excludes_text() {
        let t = sample();
        assert_eq!(t.numeric_column(0), Some(vec![Some(1.0), Some(2.5), Some(1.0)]));
        assert_eq!(t.numeric_column(1), None);

        let t = Table::new(
            vec!["v".into()],
            vec![vec![CellValue::Float(f64::NAN)], vec![CellValue::Float(0.5)]],
        )
        .unwrap();
        assert_eq!(t.numeric_column(0), Some(vec![None, Some(0.5)]));
    }

    #[test]
    fn head_and_push_column() {
        let mut t = sample();
        assert_eq!(t.head(2).len(), 2);
        assert_eq!(t.head(10).len(), 3);

        t.push_column("c", vec![CellValue::Null; 3]).unwrap();
        assert_eq!(t.width(), 3);
        assert!(t.rows().iter().all(|r| r.len() == 3));
        assert!(t.push_column("d", vec![CellValue::Null]).is_err());
    }
}
