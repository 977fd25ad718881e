//! Pre-trained classifier boundary.
//!
//! The dashboard only ever talks to a model through [`Classifier`]; the
//! concrete artifact ([`forest::ForestModel`]) is loaded once at startup and
//! treated as read-only afterwards.

pub mod forest;

use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::{CellValue, Table};

pub use forest::ForestModel;

/// Errors raised while loading an artifact or predicting with it.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("X has {found} features, but the model is expecting {expected} features as input")]
    FeatureCountMismatch { expected: usize, found: usize },

    #[error("feature '{0}' seen at fit time is missing from the input")]
    MissingFeature(String),

    #[error("could not convert value '{value}' in column '{column}' (row {row}) to float")]
    NonNumericValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("input contains a missing value in column '{column}' (row {row})")]
    MissingValue { row: usize, column: String },

    #[error("input contains infinity in column '{column}' (row {row})")]
    NonFiniteValue { row: usize, column: String },

    #[error("found array with 0 sample(s) while a minimum of 1 is required")]
    EmptyInput,
}

/// An opaque, pre-trained classifier.
pub trait Classifier {
    /// Number of input features the model was trained on.
    fn n_features(&self) -> usize;

    /// Feature names persisted alongside the model, in training order.
    fn feature_names(&self) -> Option<&[String]>;

    /// Per-feature importance scores, aligned with the training columns.
    fn feature_importances(&self) -> &[f64];

    /// Predict one class label per table row, as a single batch.
    fn predict(&self, table: &Table) -> Result<Vec<i64>, ModelError>;
}

/// Resolve the model's input columns in `table` and convert them to a dense
/// row-major feature matrix.
///
/// With stored feature names, columns are matched by name (input order does
/// not matter). Without them, the table's columns are taken as-is.
pub fn feature_matrix(
    table: &Table,
    n_features: usize,
    feature_names: Option<&[String]>,
) -> Result<Vec<Vec<f64>>, ModelError> {
    if table.width() != n_features {
        return Err(ModelError::FeatureCountMismatch {
            expected: n_features,
            found: table.width(),
        });
    }

    let indices: Vec<usize> = match feature_names {
        Some(names) => names
            .iter()
            .map(|name| {
                table
                    .column_index(name)
                    .ok_or_else(|| ModelError::MissingFeature(name.clone()))
            })
            .collect::<Result<_, _>>()?,
        None => (0..n_features).collect(),
    };
    if table.is_empty() {
        return Err(ModelError::EmptyInput);
    }

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(row_no, row)| {
            indices
                .iter()
                .map(|&col| {
                    let column = || table.columns()[col].clone();
                    match &row[col] {
                        CellValue::Null => Err(ModelError::MissingValue {
                            row: row_no,
                            column: column(),
                        }),
                        cell => match cell.as_f64() {
                            Some(x) if x.is_nan() => Err(ModelError::MissingValue {
                                row: row_no,
                                column: column(),
                            }),
                            Some(x) if x.is_infinite() => Err(ModelError::NonFiniteValue {
                                row: row_no,
                                column: column(),
                            }),
                            Some(x) => Ok(x),
                            None => Err(ModelError::NonNumericValue {
                                row: row_no,
                                column: column(),
                                value: cell.to_string(),
                            }),
                        },
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        Table::new(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn positional_matrix() {
        let t = table(
            &["a", "b"],
            vec![vec![CellValue::Integer(1), CellValue::Float(0.5)]],
        );
        assert_eq!(feature_matrix(&t, 2, None).unwrap(), vec![vec![1.0, 0.5]]);
    }

    #[test]
    fn named_matrix_reorders_columns() {
        let t = table(
            &["b", "a"],
            vec![vec![CellValue::Integer(2), CellValue::Integer(1)]],
        );
        let names = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            feature_matrix(&t, 2, Some(&names)).unwrap(),
            vec![vec![1.0, 2.0]]
        );
    }

    #[test]
    fn count_mismatch_fails() {
        let t = table(&["a"], vec![vec![CellValue::Integer(1)]]);
        let err = feature_matrix(&t, 2, None).unwrap_err();
        assert!(matches!(
            err,
            ModelError::FeatureCountMismatch { expected: 2, found: 1 }
        ));
    }

    #[test]
    fn missing_named_feature_fails() {
        let t = table(&["a", "z"], vec![]);
        let names = vec!["a".to_string(), "b".to_string()];
        let err = feature_matrix(&t, 2, Some(&names)).unwrap_err();
        assert!(matches!(err, ModelError::MissingFeature(ref n) if n == "b"));
    }

    #[test]
    fn bad_cells_fail_the_batch() {
        let t = table(
            &["a"],
            vec![
                vec![CellValue::Integer(1)],
                vec![CellValue::String("abc".into())],
            ],
        );
        let err = feature_matrix(&t, 1, None).unwrap_err();
        assert!(matches!(err, ModelError::NonNumericValue { row: 1, .. }));

        let t = table(&["a"], vec![vec![CellValue::Null]]);
        let err = feature_matrix(&t, 1, None).unwrap_err();
        assert!(matches!(err, ModelError::MissingValue { row: 0, .. }));
    }

    #[test]
    fn non_finite_floats_fail_the_batch() {
        let t = table(
            &["a"],
            vec![vec![CellValue::Float(0.1)], vec![CellValue::Float(f64::NAN)]],
        );
        let err = feature_matrix(&t, 1, None).unwrap_err();
        assert!(matches!(err, ModelError::MissingValue { row: 1, ref column } if column == "a"));

        let t = table(&["a"], vec![vec![CellValue::Float(f64::NEG_INFINITY)]]);
        let err = feature_matrix(&t, 1, None).unwrap_err();
        assert!(matches!(err, ModelError::NonFiniteValue { row: 0, .. }));
    }

    #[test]
    fn empty_table_has_no_samples() {
        let t = table(&["a", "b"], vec![]);
        let err = feature_matrix(&t, 2, None).unwrap_err();
        assert!(matches!(err, ModelError::EmptyInput));

        // Schema problems are still reported first.
        let err = feature_matrix(&t, 3, None).unwrap_err();
        assert!(matches!(err, ModelError::FeatureCountMismatch { .. }));
    }
}
