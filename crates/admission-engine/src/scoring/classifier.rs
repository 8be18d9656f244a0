//! Inference contract for trained admission classifiers and the exported model formats
//! the service can evaluate natively.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Output of a binary classifier for a single feature vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label, as trained (normally `0` or `1`).
    pub label: i64,
    /// Probability of the positive (approved) class.
    pub probability: f64,
}

/// Narrow contract the dispatcher relies on: numbers in, label and probability out.
pub trait Classifier: Send + Sync + fmt::Debug {
    fn predict(&self, features: &[f64]) -> Result<Prediction, ClassifierError>;
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClassifierError {
    #[error("classifier expects {expected} features, received {found}")]
    FeatureCount { expected: usize, found: usize },
    #[error("invalid classifier artifact: {0}")]
    InvalidArtifact(String),
    #[error("classifier produced a non-finite probability")]
    NonFiniteOutput,
}

fn default_classes() -> [i64; 2] {
    [0, 1]
}

/// Classifier exported from the training notebooks as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticModel),
    RandomForest(ForestModel),
}

impl ClassifierArtifact {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Structural checks run once at load time so inference can stay branch-light.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        match self {
            Self::LogisticRegression(model) => model.validate(),
            Self::RandomForest(model) => model.validate(),
        }
    }

    fn classes(&self) -> [i64; 2] {
        match self {
            Self::LogisticRegression(model) => model.classes,
            Self::RandomForest(model) => model.classes,
        }
    }

    fn positive_probability(&self, features: &[f64]) -> Result<f64, ClassifierError> {
        match self {
            Self::LogisticRegression(model) => model.positive_probability(features),
            Self::RandomForest(model) => model.positive_probability(features),
        }
    }
}

impl Classifier for ClassifierArtifact {
    fn predict(&self, features: &[f64]) -> Result<Prediction, ClassifierError> {
        let probability = self.positive_probability(features)?;
        if !probability.is_finite() {
            return Err(ClassifierError::NonFiniteOutput);
        }

        // argmax over [1 - p, p]; a tie resolves to the first class
        let classes = self.classes();
        let label = if probability > 0.5 {
            classes[1]
        } else {
            classes[0]
        };

        Ok(Prediction { label, probability })
    }
}

/// Standardisation applied ahead of the linear model: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    #[serde(default = "default_classes")]
    pub classes: [i64; 2],
}

impl LogisticModel {
    fn validate(&self) -> Result<(), ClassifierError> {
        if self.coefficients.is_empty() {
            return Err(ClassifierError::InvalidArtifact(
                "logistic regression has no coefficients".to_string(),
            ));
        }
        if let Some(scaler) = &self.scaler {
            let width = self.coefficients.len();
            if scaler.mean.len() != width || scaler.scale.len() != width {
                return Err(ClassifierError::InvalidArtifact(format!(
                    "scaler width ({} mean, {} scale) does not match {} coefficients",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    width
                )));
            }
        }
        Ok(())
    }

    fn positive_probability(&self, features: &[f64]) -> Result<f64, ClassifierError> {
        if features.len() != self.coefficients.len() {
            return Err(ClassifierError::FeatureCount {
                expected: self.coefficients.len(),
                found: features.len(),
            });
        }

        let mut z = self.intercept;
        for (index, (value, weight)) in features.iter().zip(&self.coefficients).enumerate() {
            let value = match &self.scaler {
                Some(scaler) => {
                    let scale = scaler.scale.get(index).copied().unwrap_or(1.0);
                    // zero-variance features are left unscaled
                    let scale = if scale == 0.0 { 1.0 } else { scale };
                    (value - scaler.mean.get(index).copied().unwrap_or(0.0)) / scale
                }
                None => *value,
            };
            z += weight * value;
        }

        Ok(sigmoid(z))
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Averaged ensemble of decision trees; each leaf stores the positive-class probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
    #[serde(default = "default_classes")]
    pub classes: [i64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Flat node list; node 0 is the root.
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// `x[feature] <= threshold` continues at `left`, otherwise at `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        probability: f64,
    },
}

impl ForestModel {
    fn validate(&self) -> Result<(), ClassifierError> {
        if self.trees.is_empty() {
            return Err(ClassifierError::InvalidArtifact(
                "random forest has no trees".to_string(),
            ));
        }

        for (tree_index, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ClassifierError::InvalidArtifact(format!(
                    "tree {tree_index} has no nodes"
                )));
            }
            for (node_index, node) in tree.nodes.iter().enumerate() {
                match *node {
                    TreeNode::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        // children must point forward so traversal always terminates
                        if feature >= self.n_features
                            || left <= node_index
                            || right <= node_index
                            || left >= tree.nodes.len()
                            || right >= tree.nodes.len()
                        {
                            return Err(ClassifierError::InvalidArtifact(format!(
                                "tree {tree_index} node {node_index} has an out-of-range split"
                            )));
                        }
                    }
                    TreeNode::Leaf { probability } => {
                        if !(0.0..=1.0).contains(&probability) {
                            return Err(ClassifierError::InvalidArtifact(format!(
                                "tree {tree_index} node {node_index} has probability {probability}"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn positive_probability(&self, features: &[f64]) -> Result<f64, ClassifierError> {
        if features.len() != self.n_features {
            return Err(ClassifierError::FeatureCount {
                expected: self.n_features,
                found: features.len(),
            });
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(features)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}

impl DecisionTree {
    fn evaluate(&self, features: &[f64]) -> Result<f64, ClassifierError> {
        let mut index = 0;
        // a well-formed tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { probability }) => return Ok(*probability),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).copied().ok_or(
                        ClassifierError::FeatureCount {
                            expected: feature + 1,
                            found: features.len(),
                        },
                    )?;
                    index = if value <= *threshold { *left } else { *right };
                }
                None => break,
            }
        }
        Err(ClassifierError::InvalidArtifact(
            "decision tree traversal did not reach a leaf".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f64, low: f64, high: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 3,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { probability: low },
                TreeNode::Leaf { probability: high },
            ],
        }
    }

    #[test]
    fn logistic_regression_applies_scaler_and_sigmoid() {
        let model = ClassifierArtifact::LogisticRegression(LogisticModel {
            coefficients: vec![0.0, 0.0, 0.0, 2.0, 0.0],
            intercept: 0.0,
            scaler: Some(StandardScaler {
                mean: vec![0.0, 0.0, 0.0, 50.0, 0.0],
                scale: vec![1.0, 1.0, 1.0, 10.0, 0.0],
            }),
            classes: [0, 1],
        });
        model.validate().expect("valid model");

        let at_mean = model.predict(&[1.0, 2.0, 3.0, 50.0, 9.0]).expect("predicts");
        assert!((at_mean.probability - 0.5).abs() < 1e-12);
        assert_eq!(at_mean.label, 0, "ties resolve to the first class");

        let above = model.predict(&[0.0, 0.0, 0.0, 60.0, 0.0]).expect("predicts");
        assert!((above.probability - sigmoid(2.0)).abs() < 1e-12);
        assert_eq!(above.label, 1);
    }

    #[test]
    fn sigmoid_is_stable_for_large_magnitudes() {
        assert_eq!(sigmoid(1_000.0), 1.0);
        assert_eq!(sigmoid(-1_000.0), 0.0);
    }

    #[test]
    fn forest_averages_tree_probabilities() {
        let model = ClassifierArtifact::RandomForest(ForestModel {
            n_features: 5,
            trees: vec![stump(60.0, 0.1, 0.9), stump(80.0, 0.2, 0.6)],
            classes: [0, 1],
        });
        model.validate().expect("valid forest");

        let prediction = model.predict(&[0.0, 0.0, 0.0, 70.0, 0.0]).expect("predicts");
        assert!((prediction.probability - 0.55).abs() < 1e-12);
        assert_eq!(prediction.label, 1);

        let boundary = model.predict(&[0.0, 0.0, 0.0, 60.0, 0.0]).expect("predicts");
        assert!((boundary.probability - 0.15).abs() < 1e-12);
        assert_eq!(boundary.label, 0);
    }

    #[test]
    fn wrong_feature_count_is_rejected() {
        let model = ClassifierArtifact::LogisticRegression(LogisticModel {
            coefficients: vec![1.0; 5],
            intercept: 0.0,
            scaler: None,
            classes: [0, 1],
        });
        assert_eq!(
            model.predict(&[1.0, 2.0]),
            Err(ClassifierError::FeatureCount {
                expected: 5,
                found: 2
            })
        );
    }

    #[test]
    fn malformed_forests_fail_validation() {
        let looping = ForestModel {
            n_features: 5,
            trees: vec![DecisionTree {
                nodes: vec![TreeNode::Split {
                    feature: 0,
                    threshold: 1.0,
                    left: 0,
                    right: 0,
                }],
            }],
            classes: [0, 1],
        };
        assert!(matches!(
            ClassifierArtifact::RandomForest(looping).validate(),
            Err(ClassifierError::InvalidArtifact(_))
        ));

        let empty = ForestModel {
            n_features: 5,
            trees: Vec::new(),
            classes: [0, 1],
        };
        assert!(ClassifierArtifact::RandomForest(empty).validate().is_err());
    }

    #[test]
    fn parses_exported_json() {
        let raw = r#"{
            "kind": "random_forest",
            "n_features": 5,
            "trees": [
                {"nodes": [
                    {"feature": 2, "threshold": 10.5, "left": 1, "right": 2},
                    {"probability": 0.25},
                    {"probability": 0.75}
                ]}
            ]
        }"#;
        let artifact = ClassifierArtifact::from_json(raw).expect("parses");
        artifact.validate().expect("valid");
        let prediction = artifact.predict(&[0.0, 0.0, 20.0, 0.0, 0.0]).expect("predicts");
        assert_eq!(prediction.probability, 0.75);

        let logistic = ClassifierArtifact::from_json(
            r#"{"kind": "logistic_regression", "coefficients": [0.1, 0.2, 0.3, 0.4, 0.5], "intercept": -1.0, "classes": [0, 1]}"#,
        )
        .expect("parses");
        assert!(matches!(logistic, ClassifierArtifact::LogisticRegression(_)));
    }
}
