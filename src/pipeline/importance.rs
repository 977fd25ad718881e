use thiserror::Error;

use crate::classifier::Classifier;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportanceError {
    #[error("{scores} importance scores cannot be paired with {features} feature columns")]
    LengthMismatch { scores: usize, features: usize },
}

/// One bar of the importance chart.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportance {
    pub feature: String,
    pub score: f64,
}

/// Pair the model's importance scores with feature names.
///
/// Names stored with the model win. Otherwise the scores are paired by
/// position with `input_columns` (the uploaded columns, before any derived
/// prediction columns are appended), which must have the same length.
pub fn feature_importances(
    model: &dyn Classifier,
    input_columns: &[String],
) -> Result<Vec<FeatureImportance>, ImportanceError> {
    let scores = model.feature_importances();
    let names = model.feature_names().unwrap_or(input_columns);

    if names.len() != scores.len() {
        return Err(ImportanceError::LengthMismatch {
            scores: scores.len(),
            features: names.len(),
        });
    }

    Ok(names
        .iter()
        .zip(scores)
        .map(|(feature, &score)| FeatureImportance {
            feature: feature.clone(),
            score,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ModelError;
    use crate::data::model::Table;

    struct Fixed {
        names: Option<Vec<String>>,
        scores: Vec<f64>,
    }

    impl Classifier for Fixed {
        fn n_features(&self) -> usize {
            self.scores.len()
        }
        fn feature_names(&self) -> Option<&[String]> {
            self.names.as_deref()
        }
        fn feature_importances(&self) -> &[f64] {
            &self.scores
        }
        fn predict(&self, table: &Table) -> Result<Vec<i64>, ModelError> {
            Ok(vec![0; table.len()])
        }
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn stored_names_take_precedence() {
        let model = Fixed {
            names: Some(cols(&["roa", "debt_ratio"])),
            scores: vec![0.3, 0.7],
        };
        // Upload order differs from training order.
        let bars = feature_importances(&model, &cols(&["debt_ratio", "roa"])).unwrap();
        assert_eq!(bars[0].feature, "roa");
        assert_eq!(bars[0].score, 0.3);
        assert_eq!(bars[1].feature, "debt_ratio");
    }

    #[test]
    fn positional_fallback() {
        let model = Fixed {
            names: None,
            scores: vec![0.6, 0.4],
        };
        let bars = feature_importances(&model, &cols(&["a", "b"])).unwrap();
        assert_eq!(
            bars,
            vec![
                FeatureImportance { feature: "a".into(), score: 0.6 },
                FeatureImportance { feature: "b".into(), score: 0.4 },
            ]
        );
    }

    #[test]
    fn positional_length_mismatch() {
        let model = Fixed {
            names: None,
            scores: vec![0.6, 0.4],
        };
        let err = feature_importances(&model, &cols(&["a", "b", "c"])).unwrap_err();
        assert_eq!(err, ImportanceError::LengthMismatch { scores: 2, features: 3 });
    }
}
