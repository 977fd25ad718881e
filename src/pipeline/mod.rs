//! Inference-and-report pipeline.
//!
//! One upload event runs the whole chain once:
//! ```text
//!  Table ──▶ predict ──▶ label ──▶ augmented Table
//!                                     │
//!                 ┌───────────────────┼────────────────────┐
//!                 ▼                   ▼                    ▼
//!           Distribution     CorrelationMatrix     FeatureImportance
//! ```
//! Nothing is cached between uploads; each call builds a fresh report.

pub mod importance;
pub mod label;
pub mod stats;

use std::time::Instant;

use thiserror::Error;

use crate::classifier::{Classifier, ModelError};
use crate::data::model::{CellValue, Table};
use importance::{FeatureImportance, ImportanceError};
use stats::{CorrelationMatrix, Distribution};

pub const PREDICTION_COLUMN: &str = "Prediction";
pub const LABEL_COLUMN: &str = "Prediction Label";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Predict(#[from] ModelError),

    #[error("model returned {found} predictions for {expected} rows")]
    PredictionCount { expected: usize, found: usize },

    #[error(transparent)]
    Augment(#[from] anyhow::Error),
}

/// Everything the central panel renders for one upload.
#[derive(Debug, Clone)]
pub struct PredictionReport {
    /// First rows of the raw upload.
    pub preview: Table,
    /// The upload plus `Prediction` and `Prediction Label`.
    pub results: Table,
    pub distribution: Distribution,
    pub correlation: CorrelationMatrix,
    /// Fails on its own without invalidating the rest of the report.
    pub importances: Result<Vec<FeatureImportance>, ImportanceError>,
}

/// Run the full pipeline over one uploaded table.
///
/// A prediction failure aborts the whole pass: no partial report exists.
pub fn run_pipeline(
    model: &dyn Classifier,
    table: Table,
    preview_rows: usize,
) -> Result<PredictionReport, PipelineError> {
    let started = Instant::now();
    let preview = table.head(preview_rows);
    let input_columns = table.columns().to_vec();

    let predictions = model.predict(&table)?;
    if predictions.len() != table.len() {
        return Err(PipelineError::PredictionCount {
            expected: table.len(),
            found: predictions.len(),
        });
    }
    log::debug!("predicted {} rows in {:?}", predictions.len(), started.elapsed());

    let labels: Vec<CellValue> = predictions.iter().map(|&p| label::label_cell(p)).collect();
    let mut results = table;
    results.push_column(
        PREDICTION_COLUMN,
        predictions.into_iter().map(CellValue::Integer).collect(),
    )?;
    results.push_column(LABEL_COLUMN, labels)?;

    let distribution = Distribution::from_cells(results.column(results.width() - 1));
    let correlation = CorrelationMatrix::from_table(&results);
    let importances = importance::feature_importances(model, &input_columns);
    if let Err(e) = &importances {
        log::warn!("feature importance unavailable: {e}");
    }

    log::debug!("report built in {:?}", started.elapsed());
    Ok(PredictionReport {
        preview,
        results,
        distribution,
        correlation,
        importances,
    })
}
