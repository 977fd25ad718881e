use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt8Type,
    UInt16Type, UInt32Type, UInt64Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an uploaded table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – comma-separated, first row is the header (the usual upload)
/// * `.json`    – `[{ "col": value, ... }, ...]`
/// * `.parquet` – flat columns of primitive types
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per row.  Cell types are
/// inferred per cell; a record with the wrong number of fields fails the load.
pub fn load_csv(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_csv(file)
}

/// Parse CSV from any reader.
pub fn read_csv<R: std::io::Read>(input: R) -> Result<Table> {
    let mut reader = csv::Reader::from_reader(input);
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(CellValue::parse).collect());
    }

    Table::new(columns, rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "current_ratio": 1.4, "debt_ratio": 0.62, "sector": "retail" },
///   ...
/// ]
/// ```
///
/// Columns are the union of all keys; a key missing from a record is null.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut objects = Vec::with_capacity(records.len());
    let mut keys: BTreeSet<String> = BTreeSet::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        keys.extend(obj.keys().cloned());
        objects.push(obj);
    }

    let columns: Vec<String> = keys.into_iter().collect();
    let rows = objects
        .iter()
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Table::new(columns, rows)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat primitive columns, as written by
/// `df.to_parquet()` (Pandas) or `df.write_parquet()` (Polars).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .zip(&columns)
                .map(|(col, name)| {
                    extract_cell(col, row).with_context(|| format!("Row {row}, column '{name}'"))
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(cells);
        }
    }

    Table::new(columns, rows)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => {
            CellValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64)
        }
        DataType::UInt32 => {
            CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64)
        }
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v)
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Float(v as f64))
        }
        DataType::Float32 => {
            CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64)
        }
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        other => bail!("Unsupported column type {other:?}"),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "bankruptcy-dashboard-{}-{name}",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn csv_header_and_rows() {
        let table = read_csv("roa,debt_ratio,sector\n0.12,0.4,retail\n-0.3,,energy\n".as_bytes())
            .unwrap();
        assert_eq!(table.columns(), ["roa", "debt_ratio", "sector"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1][0], CellValue::Float(-0.3));
        assert_eq!(table.rows()[1][1], CellValue::Null);
        assert_eq!(table.rows()[0][2], CellValue::String("retail".into()));
    }

    #[test]
    fn csv_nan_and_na_cells_are_missing() {
        let table = read_csv("a,b,c\nNaN,1,NA\n0.5,nan,N/A\n".as_bytes()).unwrap();
        assert_eq!(table.rows()[0][0], CellValue::Null);
        assert_eq!(table.rows()[0][1], CellValue::Integer(1));
        assert_eq!(table.rows()[0][2], CellValue::Null);
        assert_eq!(table.rows()[1][1], CellValue::Null);
        assert_eq!(table.numeric_column(2), Some(vec![None, None]));
    }

    #[test]
    fn csv_ragged_row_fails() {
        assert!(read_csv("a,b\n1,2\n3\n".as_bytes()).is_err());
    }

    #[test]
    fn csv_header_only_is_empty_table() {
        let table = read_csv("a,b\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.width(), 2);
    }

    #[test]
    fn json_records_union_keys() {
        let path = temp_file(
            "records.json",
            r#"[{"b": 1, "a": "x"}, {"a": "y", "c": true}]"#,
        );
        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.columns(), ["a", "b", "c"]);
        assert_eq!(table.rows()[0][2], CellValue::Null);
        assert_eq!(table.rows()[1][2], CellValue::Bool(true));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("companies.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
