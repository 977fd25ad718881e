use crate::classifier::Classifier;
use crate::config::DashboardConfig;
use crate::data::model::Table;
use crate::pipeline::{PredictionReport, run_pipeline};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded once at startup, read-only afterwards.
    model: Box<dyn Classifier>,

    /// Rows shown in the raw upload preview.
    pub preview_rows: usize,

    /// Report for the latest upload (None until a file succeeds).
    pub report: Option<PredictionReport>,

    /// File name of the latest upload attempt.
    pub source_name: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(model: Box<dyn Classifier>, config: &DashboardConfig) -> Self {
        Self {
            model,
            preview_rows: config.preview_rows,
            report: None,
            source_name: None,
            status_message: None,
        }
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    /// Run the pipeline on a freshly uploaded table. The previous report is
    /// always dropped first, so a failed upload never shows stale results.
    pub fn ingest(&mut self, source_name: String, table: Table) {
        self.report = None;
        self.source_name = Some(source_name);

        log::info!(
            "Running predictions on {} rows with columns {:?}",
            table.len(),
            table.columns()
        );
        match run_pipeline(self.model.as_ref(), table, self.preview_rows) {
            Ok(report) => {
                log::info!(
                    "Prediction completed: {:?} ({} unlabeled)",
                    report.distribution.counts,
                    report.distribution.unlabeled
                );
                self.report = Some(report);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Prediction failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// The upload could not be parsed into a table at all.
    pub fn upload_failed(&mut self, source_name: String, err: anyhow::Error) {
        log::error!("Failed to load file: {err:#}");
        self.report = None;
        self.source_name = Some(source_name);
        self.status_message = Some(format!("Error: {err:#}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ModelError;
    use crate::data::model::CellValue;

    /// Predicts bankrupt whenever the first column is negative.
    struct SignModel;

    impl Classifier for SignModel {
        fn n_features(&self) -> usize {
            1
        }
        fn feature_names(&self) -> Option<&[String]> {
            None
        }
        fn feature_importances(&self) -> &[f64] {
            &[1.0]
        }
        fn predict(&self, table: &Table) -> Result<Vec<i64>, ModelError> {
            crate::classifier::feature_matrix(table, 1, None)
                .map(|m| m.iter().map(|x| i64::from(x[0] < 0.0)).collect())
        }
    }

    fn table(values: &[f64]) -> Table {
        Table::new(
            vec!["net_income".into()],
            values.iter().map(|&v| vec![CellValue::Float(v)]).collect(),
        )
        .unwrap()
    }

    fn state() -> AppState {
        AppState::new(Box::new(SignModel), &DashboardConfig::default())
    }

    #[test]
    fn reupload_replaces_results() {
        let mut s = state();
        s.ingest("first.csv".into(), table(&[-1.0, 2.0, -3.0, 4.0]));
        assert_eq!(s.report.as_ref().unwrap().results.len(), 4);

        s.ingest("second.csv".into(), table(&[5.0]));
        let report = s.report.as_ref().unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.distribution.counts, vec![("Not Bankrupt".to_string(), 1)]);
        assert_eq!(s.source_name.as_deref(), Some("second.csv"));
    }

    #[test]
    fn failed_prediction_clears_previous_report() {
        let mut s = state();
        s.ingest("good.csv".into(), table(&[1.0]));
        assert!(s.report.is_some());

        let wide = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![CellValue::Integer(1), CellValue::Integer(2)]],
        )
        .unwrap();
        s.ingest("wide.csv".into(), wide);
        assert!(s.report.is_none());
        assert!(s.status_message.as_deref().unwrap().contains("expecting 1 features"));

        s.ingest("good.csv".into(), table(&[1.0]));
        assert!(s.report.is_some());
        assert!(s.status_message.is_none());
    }

    #[test]
    fn unreadable_upload_clears_report() {
        let mut s = state();
        s.ingest("good.csv".into(), table(&[1.0]));
        s.upload_failed("bad.csv".into(), anyhow::anyhow!("CSV row 3"));
        assert!(s.report.is_none());
        assert_eq!(s.status_message.as_deref(), Some("Error: CSV row 3"));
    }
}
