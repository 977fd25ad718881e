use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use super::{Classifier, ModelError, feature_matrix};
use crate::data::model::Table;

// ---------------------------------------------------------------------------
// DecisionTree – one CART tree in array layout
// ---------------------------------------------------------------------------

const LEAF: i64 = -1;

/// A fitted tree stored as parallel node arrays.
///
/// Node `i` is a leaf when `children_left[i] == -1`. Internal nodes send a
/// sample left when `x[feature[i]] <= threshold[i]`. `value[i]` holds the
/// per-class weights observed at that node.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<Vec<f64>>,
}

impl DecisionTree {
    pub fn n_nodes(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        let n = self.n_nodes();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err("node arrays have different lengths".into());
        }

        for node in 0..n {
            if self.value[node].len() != n_classes {
                return Err(format!(
                    "node {node} has {} class weights, expected {n_classes}",
                    self.value[node].len()
                ));
            }
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                continue;
            }
            // Children always come after their parent, so traversal terminates.
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {node} has out-of-range child {child}"));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {node} splits on unknown feature {feature}"));
            }
        }
        Ok(())
    }

    /// Normalized class distribution of the leaf reached by `x`.
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }

        let weights = &self.value[node];
        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            weights.iter().map(|w| w / total).collect()
        } else {
            vec![0.0; weights.len()]
        }
    }
}

// ---------------------------------------------------------------------------
// ForestModel – the loaded artifact
// ---------------------------------------------------------------------------

fn default_model_type() -> String {
    "random_forest".to_string()
}

/// A random forest classifier loaded from a JSON export.
#[derive(Debug, Clone, Deserialize)]
pub struct ForestModel {
    #[serde(default = "default_model_type")]
    model_type: String,
    classes: Vec<i64>,
    n_features: usize,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    feature_importances: Vec<f64>,
    trees: Vec<DecisionTree>,
}

impl ForestModel {
    /// Load and validate an artifact from disk.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ModelError> {
        let model: ForestModel = serde_json::from_str(text)?;
        model.validate().map_err(ModelError::InvalidArtifact)?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), String> {
        if self.model_type != "random_forest" {
            return Err(format!("unsupported model type '{}'", self.model_type));
        }
        if self.classes.is_empty() {
            return Err("no classes".into());
        }
        if self.trees.is_empty() {
            return Err("no trees".into());
        }
        if self.n_features == 0 {
            return Err("n_features must be positive".into());
        }
        if self.feature_importances.len() != self.n_features {
            return Err(format!(
                "{} feature importances for {} features",
                self.feature_importances.len(),
                self.n_features
            ));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.n_features {
                return Err(format!(
                    "{} feature names for {} features",
                    names.len(),
                    self.n_features
                ));
            }
            let unique: BTreeSet<&String> = names.iter().collect();
            if unique.len() != names.len() {
                return Err("duplicate feature names".into());
            }
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.classes.len())
                .map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean of the per-tree leaf distributions.
    pub fn predict_proba_row(&self, x: &[f64]) -> Vec<f64> {
        let mut mean = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in mean.iter_mut().zip(tree.predict_proba(x)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        mean.iter_mut().for_each(|p| *p /= n);
        mean
    }

    /// Class with the highest mean probability; the first class wins ties.
    pub fn predict_row(&self, x: &[f64]) -> i64 {
        let proba = self.predict_proba_row(x);
        let mut best = 0;
        for (i, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = i;
            }
        }
        self.classes[best]
    }
}

impl Classifier for ForestModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    fn predict(&self, table: &Table) -> Result<Vec<i64>, ModelError> {
        let matrix = feature_matrix(table, self.n_features, self.feature_names())?;
        Ok(matrix.iter().map(|x| self.predict_row(x)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    /// Two stumps on feature 0 (`debt_ratio`); the second one only counts
    /// above 0.8, so the forest says "bankrupt" above 0.5.
    const TWO_STUMPS: &str = r#"{
        "model_type": "random_forest",
        "classes": [0, 1],
        "n_features": 2,
        "feature_names": ["debt_ratio", "roa"],
        "feature_importances": [0.75, 0.25],
        "trees": [
            {
                "children_left":  [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature":        [0, -2, -2],
                "threshold":      [0.5, -2.0, -2.0],
                "value":          [[10, 10], [9, 1], [0, 10]]
            },
            {
                "children_left":  [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature":        [0, -2, -2],
                "threshold":      [0.8, -2.0, -2.0],
                "value":          [[10, 10], [6, 4], [1, 9]]
            }
        ]
    }"#;

    #[test]
    fn loads_and_predicts_rows() {
        let model = ForestModel::from_json_str(TWO_STUMPS).unwrap();
        assert_eq!(model.n_trees(), 2);
        assert_eq!(model.n_features(), 2);

        assert_eq!(model.predict_row(&[0.2, 0.0]), 0);
        assert_eq!(model.predict_row(&[0.6, 0.0]), 1);
        assert_eq!(model.predict_row(&[0.9, 0.0]), 1);

        let p = model.predict_proba_row(&[0.6, 0.0]);
        assert!((p[0] - 0.3).abs() < 1e-12);
        assert!((p[1] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn threshold_is_inclusive_on_the_left() {
        let model = ForestModel::from_json_str(TWO_STUMPS).unwrap();
        // 0.5 goes left in both trees: (0.9 + 0.6) / 2 = 0.75 for class 0.
        assert_eq!(model.predict_row(&[0.5, 0.0]), 0);
    }

    #[test]
    fn batch_predict_by_name() {
        let model = ForestModel::from_json_str(TWO_STUMPS).unwrap();
        let table = Table::new(
            vec!["roa".into(), "debt_ratio".into()],
            vec![
                vec![CellValue::Float(0.1), CellValue::Float(0.9)],
                vec![CellValue::Float(0.1), CellValue::Float(0.1)],
            ],
        )
        .unwrap();
        assert_eq!(model.predict(&table).unwrap(), vec![1, 0]);
    }

    #[test]
    fn rejects_corrupt_artifacts() {
        assert!(matches!(
            ForestModel::from_json_str("{ not json"),
            Err(ModelError::Parse(_))
        ));

        let bad_child = TWO_STUMPS.replacen("[2, -1, -1]", "[0, -1, -1]", 1);
        assert!(matches!(
            ForestModel::from_json_str(&bad_child),
            Err(ModelError::InvalidArtifact(_))
        ));

        let bad_feature = TWO_STUMPS.replacen("[0, -2, -2]", "[7, -2, -2]", 1);
        assert!(matches!(
            ForestModel::from_json_str(&bad_feature),
            Err(ModelError::InvalidArtifact(_))
        ));

        let bad_importances = TWO_STUMPS.replace("[0.75, 0.25]", "[1.0]");
        assert!(matches!(
            ForestModel::from_json_str(&bad_importances),
            Err(ModelError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ForestModel::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }
}
