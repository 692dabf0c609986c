//! On-disk model format.
//!
//! A model directory holds two JSON files:
//!
//! - `model.json`: a [`ForestArtifact`]: decision trees plus one importance
//!   weight per feature.
//! - `features.json`: a [`ModelManifest`]: the ordered feature list and the
//!   SHA-256 digest of `model.json`.
//!
//! Trees are flat node arrays rooted at index 0. A split sends a vector left
//! when `vector[feature] <= threshold`. Child indices always point forward, so
//! every walk terminates.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use hemaguard_contracts::error::{HemaError, HemaResult};

pub const MODEL_FILE: &str = "model.json";
pub const MANIFEST_FILE: &str = "features.json";
pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// P(anemic) for vectors reaching this leaf.
        probability: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

impl DecisionTree {
    /// Check structure against a feature vector of `width` entries.
    pub fn validate(&self, width: usize) -> HemaResult<()> {
        if self.nodes.is_empty() {
            return Err(HemaError::model_load("tree has no nodes"));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= width {
                        return Err(HemaError::model_load(format!(
                            "node {} splits on feature {} but the manifest lists {}",
                            i, feature, width
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(HemaError::model_load(format!(
                            "node {} has a non-finite threshold",
                            i
                        )));
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(HemaError::model_load(format!(
                                "node {} has invalid child index {}",
                                i, child
                            )));
                        }
                    }
                }
                Node::Leaf { probability } => {
                    if !(0.0..=1.0).contains(&probability) {
                        return Err(HemaError::model_load(format!(
                            "leaf {} probability {} is outside [0, 1]",
                            i, probability
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf probability for `vector`. The tree must have passed `validate`
    /// for a width no larger than `vector.len()`.
    pub fn predict(&self, vector: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf { probability } => return probability,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if vector[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Contents of `model.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub trees: Vec<DecisionTree>,
    /// Raw importance per feature, in manifest order. Normalized on load.
    pub feature_importances: Vec<f64>,
}

/// Contents of `features.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: u32,
    pub features: Vec<String>,
    /// Lowercase hex SHA-256 of the exact `model.json` bytes.
    pub model_sha256: String,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
