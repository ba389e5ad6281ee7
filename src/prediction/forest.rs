//! Random-forest classifier loaded from a JSON export of the trained model.
//!
//! Each tree uses the array layout of a fitted decision tree: parallel
//! `children_left`, `children_right`, `feature`, `threshold` and `value`
//! arrays indexed by node, node 0 being the root. A node whose left child is
//! `-1` is a leaf. Split nodes send a row left when `x[feature] <= threshold`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::tabular::DIABETES_FEATURE_ORDER;
use super::{ensure_artifact_exists, PredictionError, TabularClassifier};

const LEAF: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestModel {
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights (sample counts or fractions).
    pub value: Vec<Vec<f64>>,
}

impl RandomForestModel {
    /// Read and validate a model artifact. Any inconsistency is a load
    /// failure, so a bad artifact stops startup instead of a request.
    pub fn load(path: &Path) -> Result<Self, PredictionError> {
        ensure_artifact_exists(path)?;
        let bytes = std::fs::read(path)
            .map_err(|e| PredictionError::ModelLoad(format!("{}: {e}", path.display())))?;
        let model = Self::from_json(&bytes)?;
        tracing::info!(
            path = %path.display(),
            trees = model.trees.len(),
            "Diabetes model loaded"
        );
        Ok(model)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, PredictionError> {
        let model: Self = serde_json::from_slice(bytes)
            .map_err(|e| PredictionError::ModelLoad(format!("Malformed model JSON: {e}")))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), PredictionError> {
        if self.feature_names.iter().map(String::as_str).ne(DIABETES_FEATURE_ORDER) {
            return Err(PredictionError::ModelLoad(format!(
                "Model features {:?} do not match expected order {:?}",
                self.feature_names, DIABETES_FEATURE_ORDER
            )));
        }
        if self.classes != [0, 1] {
            return Err(PredictionError::ModelLoad(format!(
                "Expected binary classes [0, 1], got {:?}",
                self.classes
            )));
        }
        if self.trees.is_empty() {
            return Err(PredictionError::ModelLoad("Model has no trees".into()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_names.len(), self.classes.len())
                .map_err(|reason| PredictionError::ModelLoad(format!("Tree {i}: {reason}")))?;
        }
        Ok(())
    }
}

impl DecisionTree {
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("empty tree".into());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err("node arrays differ in length".into());
        }

        for node in 0..n {
            let weights = &self.value[node];
            if weights.len() != n_classes {
                return Err(format!("node {node} has {} class weights", weights.len()));
            }
            if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(format!("node {node} has invalid class weights"));
            }

            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                if right != LEAF {
                    return Err(format!("node {node} has only one child"));
                }
                if weights.iter().sum::<f64>() <= 0.0 {
                    return Err(format!("leaf {node} has no weight"));
                }
                continue;
            }

            // Children always follow their parent, which also rules out cycles.
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {node} has out-of-range child {child}"));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {node} splits on unknown feature {feature}"));
            }
            if !self.threshold[node].is_finite() {
                return Err(format!("node {node} has a non-finite threshold"));
            }
        }
        Ok(())
    }

    /// Normalized class distribution of the leaf `row` lands in.
    fn leaf_distribution(&self, row: &[f64]) -> Vec<f64> {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        let weights = &self.value[node];
        let total: f64 = weights.iter().sum();
        weights.iter().map(|w| w / total).collect()
    }
}

impl TabularClassifier for RandomForestModel {
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, PredictionError> {
        if row.len() != self.feature_names.len() {
            return Err(PredictionError::InvalidInput(format!(
                "expected {} features, got {}",
                self.feature_names.len(),
                row.len()
            )));
        }

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.leaf_distribution(row)) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        for p in &mut proba {
            *p /= n_trees;
        }
        Ok(proba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stump on glucose (feature 1) at 127.5.
    fn glucose_stump(low: [f64; 2], high: [f64; 2]) -> DecisionTree {
        DecisionTree {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![1, -2, -2],
            threshold: vec![127.5, -2.0, -2.0],
            value: vec![vec![10.0, 10.0], low.to_vec(), high.to_vec()],
        }
    }

    /// Stump on BMI (feature 5) at 30.0.
    fn bmi_stump() -> DecisionTree {
        DecisionTree {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![5, -2, -2],
            threshold: vec![30.0, -2.0, -2.0],
            value: vec![vec![5.0, 5.0], vec![4.0, 1.0], vec![1.0, 4.0]],
        }
    }

    fn model(trees: Vec<DecisionTree>) -> RandomForestModel {
        RandomForestModel {
            feature_names: DIABETES_FEATURE_ORDER.iter().map(|s| s.to_string()).collect(),
            classes: vec![0, 1],
            trees,
        }
    }

    fn row(glucose: f64, bmi: f64) -> Vec<f64> {
        vec![2.0, glucose, 90.0, 30.0, 100.0, bmi, 0.8, 34.0]
    }

    #[test]
    fn single_tree_routes_on_threshold() {
        let forest = model(vec![glucose_stump([9.0, 1.0], [2.0, 8.0])]);
        let low = forest.predict_proba(&row(100.0, 20.0)).unwrap();
        assert!((low[0] - 0.9).abs() < 1e-12);

        let high = forest.predict_proba(&row(180.0, 20.0)).unwrap();
        assert!((high[1] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn threshold_equality_goes_left() {
        let forest = model(vec![glucose_stump([1.0, 0.0], [0.0, 1.0])]);
        let proba = forest.predict_proba(&row(127.5, 20.0)).unwrap();
        assert_eq!(proba, vec![1.0, 0.0]);
    }

    #[test]
    fn forest_averages_tree_distributions() {
        let forest = model(vec![glucose_stump([9.0, 1.0], [2.0, 8.0]), bmi_stump()]);
        // glucose high -> [0.2, 0.8]; bmi high -> [0.2, 0.8]
        let proba = forest.predict_proba(&row(180.0, 35.0)).unwrap();
        assert!((proba[1] - 0.8).abs() < 1e-12);
        // glucose high -> [0.2, 0.8]; bmi low -> [0.8, 0.2]
        let mixed = forest.predict_proba(&row(180.0, 25.0)).unwrap();
        assert!((mixed[0] - 0.5).abs() < 1e-12);
        assert!((mixed.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn json_round_trip_through_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diabetes_model.json");
        let forest = model(vec![bmi_stump()]);
        std::fs::write(&path, serde_json::to_vec(&forest).unwrap()).unwrap();

        let loaded = RandomForestModel::load(&path).unwrap();
        assert_eq!(loaded.trees.len(), 1);
        let proba = loaded.predict_proba(&row(100.0, 35.0)).unwrap();
        assert!((proba[1] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = RandomForestModel::load(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(PredictionError::ModelNotFound(_))));
    }

    #[test]
    fn garbage_json_is_load_failure() {
        let result = RandomForestModel::from_json(b"{not json");
        assert!(matches!(result, Err(PredictionError::ModelLoad(_))));
    }

    #[test]
    fn wrong_feature_order_is_rejected() {
        let mut forest = model(vec![bmi_stump()]);
        forest.feature_names.swap(0, 1);
        let json = serde_json::to_vec(&forest).unwrap();
        assert!(matches!(
            RandomForestModel::from_json(&json),
            Err(PredictionError::ModelLoad(msg)) if msg.contains("expected order")
        ));
    }

    #[test]
    fn non_binary_classes_are_rejected() {
        let mut forest = model(vec![bmi_stump()]);
        forest.classes = vec![0, 1, 2];
        let json = serde_json::to_vec(&forest).unwrap();
        assert!(RandomForestModel::from_json(&json).is_err());
    }

    #[test]
    fn cyclic_tree_is_rejected() {
        let mut tree = bmi_stump();
        tree.children_left[0] = 0;
        let json = serde_json::to_vec(&model(vec![tree])).unwrap();
        assert!(matches!(
            RandomForestModel::from_json(&json),
            Err(PredictionError::ModelLoad(msg)) if msg.contains("out-of-range child")
        ));
    }

    #[test]
    fn unknown_split_feature_is_rejected() {
        let mut tree = bmi_stump();
        tree.feature[0] = 8;
        let json = serde_json::to_vec(&model(vec![tree])).unwrap();
        assert!(RandomForestModel::from_json(&json).is_err());
    }

    #[test]
    fn empty_forest_is_rejected() {
        let json = serde_json::to_vec(&model(Vec::new())).unwrap();
        assert!(RandomForestModel::from_json(&json).is_err());
    }

    #[test]
    fn wrong_row_width_is_invalid_input() {
        let forest = model(vec![bmi_stump()]);
        let result = forest.predict_proba(&[1.0, 2.0]);
        assert!(matches!(result, Err(PredictionError::InvalidInput(_))));
    }
}
