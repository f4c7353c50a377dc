//! The persisted product of a training run.

use crate::Matrix;
use crate::cluster::KMeans;
use crate::error::ModelError;
use crate::features::FeatureSet;
use crate::preprocessing::StandardScaler;
use serde::{Deserialize, Serialize};

/// Fitted model plus everything needed to apply it to new data.
///
/// `features` fixes both which columns a prediction needs and the order in
/// which their values are fed to `scaler` and `model`. Construction and
/// [`ModelArtifact::validate`] check that all three agree on that
/// dimensionality and that the model has exactly `k_value` centers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    model: KMeans,
    scaler: StandardScaler,
    features: FeatureSet,
    k_value: usize,
    score: f64,
}

impl ModelArtifact {
    pub fn new(
        model: KMeans,
        scaler: StandardScaler,
        features: FeatureSet,
        k_value: usize,
        score: f64,
    ) -> Result<Self, ModelError> {
        let artifact = Self {
            model,
            scaler,
            features,
            k_value,
            score,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let centers = self
            .model
            .cluster_centers
            .as_ref()
            .ok_or(ModelError::NotFitted("KMeans"))?;
        let n_features = self.features.len();

        if self.scaler.n_features() != n_features {
            return Err(ModelError::InconsistentArtifact(format!(
                "scaler fitted on {} features, artifact lists {}",
                self.scaler.n_features(),
                n_features
            )));
        }
        if centers.ncols() != n_features {
            return Err(ModelError::InconsistentArtifact(format!(
                "model fitted on {} features, artifact lists {}",
                centers.ncols(),
                n_features
            )));
        }
        if self.k_value < 2 || centers.nrows() != self.k_value || self.model.n_clusters() != self.k_value {
            return Err(ModelError::InconsistentArtifact(format!(
                "k_value={} but model has {} centers",
                self.k_value,
                centers.nrows()
            )));
        }
        if !self.score.is_finite() {
            return Err(ModelError::InconsistentArtifact(format!(
                "score {} is not finite",
                self.score
            )));
        }

        Ok(())
    }

    /// Cluster labels for raw (unscaled) rows whose columns follow `features`.
    pub fn assign(&self, x: &Matrix) -> Result<Vec<usize>, ModelError> {
        let x_scaled = self.scaler.transform(x)?;
        self.model.predict(&x_scaled)
    }

    pub fn model(&self) -> &KMeans {
        &self.model
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn k_value(&self) -> usize {
        self.k_value
    }

    pub fn score(&self) -> f64 {
        self.score
    }
}
