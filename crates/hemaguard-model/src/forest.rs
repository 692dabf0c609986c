//! `ForestClassifier`, the `Classifier` implementation backed by a model
//! directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use hemaguard_contracts::{
    error::{HemaError, HemaResult},
    report::{FeatureWeight, Prediction},
};
use hemaguard_core::traits::Classifier;

use crate::artifact::{
    sha256_hex, DecisionTree, ForestArtifact, ModelManifest, MANIFEST_FILE, MANIFEST_VERSION,
    MODEL_FILE,
};

/// Averages leaf probabilities across all trees.
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    features: Vec<String>,
    trees: Vec<DecisionTree>,
    importances: Vec<FeatureWeight>,
}

impl ForestClassifier {
    /// Build from an in-memory artifact. Importances are normalized to sum
    /// to 1.0.
    pub fn from_parts(features: Vec<String>, artifact: ForestArtifact) -> HemaResult<Self> {
        if features.is_empty() {
            return Err(HemaError::model_load("feature list is empty"));
        }
        let mut seen = BTreeSet::new();
        for name in &features {
            if !seen.insert(name.as_str()) {
                return Err(HemaError::model_load(format!(
                    "feature '{}' is listed twice",
                    name
                )));
            }
        }
        if artifact.trees.is_empty() {
            return Err(HemaError::model_load("model has no trees"));
        }
        for (i, tree) in artifact.trees.iter().enumerate() {
            match tree.validate(features.len()) {
                Ok(()) => {}
                Err(HemaError::ModelLoad { reason }) => {
                    return Err(HemaError::model_load(format!("tree {}: {}", i, reason)));
                }
                Err(other) => {
                    return Err(HemaError::model_load(format!("tree {}: {}", i, other)));
                }
            }
        }

        if artifact.feature_importances.len() != features.len() {
            return Err(HemaError::model_load(format!(
                "{} importances for {} features",
                artifact.feature_importances.len(),
                features.len()
            )));
        }
        if artifact
            .feature_importances
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(HemaError::model_load(
                "feature importances must be finite and non-negative",
            ));
        }
        let total: f64 = artifact.feature_importances.iter().sum();
        if total <= 0.0 {
            return Err(HemaError::model_load("feature importances are all zero"));
        }

        let importances = features
            .iter()
            .zip(&artifact.feature_importances)
            .map(|(feature, w)| FeatureWeight {
                feature: feature.clone(),
                weight: w / total,
            })
            .collect();

        Ok(Self {
            features,
            trees: artifact.trees,
            importances,
        })
    }

    /// Load `model.json` and `features.json` from `dir`, verifying the
    /// manifest digest before parsing the model.
    pub fn load(dir: &Path) -> HemaResult<Self> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let manifest_raw = fs::read_to_string(&manifest_path).map_err(|e| {
            HemaError::model_load(format!(
                "failed to read '{}': {}",
                manifest_path.display(),
                e
            ))
        })?;
        let manifest: ModelManifest = serde_json::from_str(&manifest_raw).map_err(|e| {
            HemaError::model_load(format!("failed to parse {}: {}", MANIFEST_FILE, e))
        })?;
        if manifest.version != MANIFEST_VERSION {
            return Err(HemaError::model_load(format!(
                "unsupported manifest version {} (expected {})",
                manifest.version, MANIFEST_VERSION
            )));
        }

        let model_path = dir.join(MODEL_FILE);
        let model_bytes = fs::read(&model_path).map_err(|e| {
            HemaError::model_load(format!("failed to read '{}': {}", model_path.display(), e))
        })?;
        let digest = sha256_hex(&model_bytes);
        if !digest.eq_ignore_ascii_case(&manifest.model_sha256) {
            return Err(HemaError::model_load(format!(
                "{} digest mismatch: manifest {}, file {}",
                MODEL_FILE, manifest.model_sha256, digest
            )));
        }
        debug!(digest = %digest, "model digest verified");

        let artifact: ForestArtifact = serde_json::from_slice(&model_bytes).map_err(|e| {
            HemaError::model_load(format!("failed to parse {}: {}", MODEL_FILE, e))
        })?;

        let classifier = Self::from_parts(manifest.features, artifact)?;
        info!(
            dir = %dir.display(),
            trees = classifier.trees.len(),
            features = classifier.features.len(),
            "model loaded"
        );
        Ok(classifier)
    }

    /// Like [`load`](Self::load), but also require the manifest's feature
    /// order to equal `expected`.
    pub fn load_expecting(dir: &Path, expected: &[String]) -> HemaResult<Self> {
        let classifier = Self::load(dir)?;
        if classifier.features != expected {
            return Err(HemaError::model_load(format!(
                "feature order mismatch: model has {:?}, expected {:?}",
                classifier.features, expected
            )));
        }
        Ok(classifier)
    }

    /// Write `artifact` and a matching manifest into `dir`.
    pub fn save(
        dir: &Path,
        features: &[String],
        artifact: &ForestArtifact,
    ) -> HemaResult<ModelManifest> {
        // Reject anything `load` would refuse.
        Self::from_parts(features.to_vec(), artifact.clone())?;

        let model_json = serde_json::to_string_pretty(artifact)
            .map_err(|e| HemaError::Io { reason: format!("failed to encode model: {}", e) })?;
        let manifest = ModelManifest {
            version: MANIFEST_VERSION,
            features: features.to_vec(),
            model_sha256: sha256_hex(model_json.as_bytes()),
        };
        let manifest_json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| HemaError::Io { reason: format!("failed to encode manifest: {}", e) })?;

        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
        fs::write(dir.join(MODEL_FILE), model_json).map_err(|e| io_error(dir, e))?;
        fs::write(dir.join(MANIFEST_FILE), manifest_json).map_err(|e| io_error(dir, e))?;
        Ok(manifest)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for ForestClassifier {
    fn feature_order(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, vector: &[f64]) -> HemaResult<Prediction> {
        if vector.len() != self.features.len() {
            return Err(HemaError::invalid_record(format!(
                "feature vector has {} values, model expects {}",
                vector.len(),
                self.features.len()
            )));
        }
        if let Some(i) = vector.iter().position(|v| !v.is_finite()) {
            return Err(HemaError::invalid_record(format!(
                "feature '{}' is not a finite number",
                self.features[i]
            )));
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(vector)).sum();
        Ok(Prediction::from_probability(sum / self.trees.len() as f64))
    }

    fn feature_importances(&self) -> &[FeatureWeight] {
        &self.importances
    }
}

fn io_error(dir: &Path, e: std::io::Error) -> HemaError {
    HemaError::Io {
        reason: format!("failed to write model to '{}': {}", dir.display(), e),
    }
}
