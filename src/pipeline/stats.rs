use crate::data::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Label distribution
// ---------------------------------------------------------------------------

/// Counts per distinct label, largest first (ties keep first-seen order).
/// Null cells are counted separately as `unlabeled`.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub counts: Vec<(String, usize)>,
    pub unlabeled: usize,
}

impl Distribution {
    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a CellValue>) -> Self {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut unlabeled = 0;
        for cell in cells {
            if cell.is_null() {
                unlabeled += 1;
                continue;
            }
            let key = cell.to_string();
            match counts.iter_mut().find(|(k, _)| *k == key) {
                Some((_, n)) => *n += 1,
                None => counts.push((key, 1)),
            }
        }
        // Stable sort keeps first-seen order among equal counts.
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        Distribution { counts, unlabeled }
    }

    /// Number of labeled rows (sum over slices).
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// Share of each label in percent.
    pub fn percentages(&self) -> Vec<(String, f64)> {
        let total = self.total();
        self.counts
            .iter()
            .map(|(k, n)| (k.clone(), 100.0 * *n as f64 / total as f64))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Pairwise Pearson correlation between the numeric columns of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()²` entries. NaN where undefined.
    pub values: Vec<f64>,
}

impl CorrelationMatrix {
    /// Non-numeric columns are skipped silently.
    pub fn from_table(table: &Table) -> Self {
        let numeric: Vec<(String, Vec<Option<f64>>)> = (0..table.width())
            .filter_map(|idx| {
                table
                    .numeric_column(idx)
                    .map(|values| (table.columns()[idx].clone(), values))
            })
            .collect();

        let n = numeric.len();
        let mut values = vec![f64::NAN; n * n];
        for i in 0..n {
            for j in i..n {
                let r = pearson(&numeric[i].1, &numeric[j].1);
                values[i * n + j] = r;
                values[j * n + i] = r;
            }
        }

        CorrelationMatrix {
            columns: numeric.into_iter().map(|(name, _)| name).collect(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.columns.len() + col]
    }
}

/// Pearson correlation over rows where both values are present.
/// Fewer than two complete pairs or a zero-variance side yields NaN.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.into())
    }

    #[test]
    fn distribution_orders_by_count() {
        let cells = vec![s("Bankrupt"), s("Not Bankrupt"), s("Bankrupt")];
        let d = Distribution::from_cells(&cells);
        assert_eq!(
            d.counts,
            vec![("Bankrupt".to_string(), 2), ("Not Bankrupt".to_string(), 1)]
        );
        assert_eq!(d.total(), 3);

        let pct = d.percentages();
        assert!((pct[0].1 - 66.666).abs() < 0.01);
        assert_eq!(format!("{:.1}%", pct[1].1), "33.3%");
    }

    #[test]
    fn single_category_is_whole_pie() {
        let cells = vec![s("Not Bankrupt"); 4];
        let d = Distribution::from_cells(&cells);
        assert_eq!(d.counts.len(), 1);
        assert_eq!(d.percentages()[0].1, 100.0);
    }

    #[test]
    fn nulls_are_unlabeled() {
        let cells = vec![s("Bankrupt"), CellValue::Null];
        let d = Distribution::from_cells(&cells);
        assert_eq!(d.total(), 1);
        assert_eq!(d.unlabeled, 1);
    }

    #[test]
    fn pearson_basics() {
        let x = [Some(1.0), Some(2.0), Some(3.0)];
        let y = [Some(2.0), Some(4.0), Some(6.0)];
        let z = [Some(3.0), Some(2.0), Some(1.0)];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &z) + 1.0).abs() < 1e-12);

        let flat = [Some(5.0), Some(5.0), Some(5.0)];
        assert!(pearson(&x, &flat).is_nan());

        let gappy = [Some(1.0), None, Some(3.0)];
        assert!((pearson(&x, &gappy) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_skips_text_columns() {
        let table = Table::new(
            vec!["a".into(), "name".into(), "b".into()],
            vec![
                vec![CellValue::Integer(1), s("x"), CellValue::Float(1.0)],
                vec![CellValue::Integer(2), s("y"), CellValue::Float(0.0)],
                vec![CellValue::Integer(3), s("z"), CellValue::Float(-1.0)],
            ],
        )
        .unwrap();
        let m = CorrelationMatrix::from_table(&table);
        assert_eq!(m.columns, vec!["a", "b"]);
        assert!((m.get(0, 0) - 1.0).abs() < 1e-12);
        assert!((m.get(0, 1) + 1.0).abs() < 1e-12);
        assert_eq!(m.get(0, 1), m.get(1, 0));
    }
}
