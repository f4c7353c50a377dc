//! Train and predict operations over raw CSV uploads.
//!
//! These are the two entry points an HTTP or CLI front end calls. Failures
//! come back as an [`ApiError`] carrying a 400 (caller's data) or 500
//! (server-side) status and a readable detail string.

use crate::dataset::Dataset;
use crate::error::{ApiError, PredictError, TrainError};
use crate::predict::{LabeledDataset, apply_artifact};
use crate::search::{ClusterSearch, SearchOutcome};
use crate::store::ArtifactStore;
use log::{error, info, warn};
use serde::Serialize;

pub const RESULT_PAGE: &str = "/result";
pub const PREDICTIONS_FILENAME: &str = "predictions.csv";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainResponse {
    pub message: String,
    pub redirect: String,
    pub k_found: usize,
}

/// Labeled CSV ready to be sent as a download.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictResponse {
    pub content_type: &'static str,
    pub filename: &'static str,
    #[serde(skip)]
    pub body: Vec<u8>,
}

impl PredictResponse {
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename={}", self.filename)
    }
}

pub struct ClusterService<S: ArtifactStore> {
    store: S,
    search: ClusterSearch,
}

impl<S: ArtifactStore> ClusterService<S> {
    pub fn new(store: S) -> Self {
        Self::with_search(store, ClusterSearch::new())
    }

    pub fn with_search(store: S, search: ClusterSearch) -> Self {
        Self { store, search }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fits on `content` and replaces the stored artifact. Nothing is stored
    /// unless the whole search succeeds.
    pub fn train_artifact(&self, content: &[u8]) -> Result<SearchOutcome, TrainError> {
        let dataset = Dataset::from_csv_bytes(content)?;
        let outcome = self.search.fit(&dataset)?;
        self.store.save(&outcome.artifact)?;
        Ok(outcome)
    }

    pub fn train(&self, content: &[u8]) -> Result<TrainResponse, ApiError> {
        let outcome = self.train_artifact(content).map_err(|e| {
            if e.is_client_error() {
                warn!("Training rejected: {}", e);
            } else {
                error!("Training failed: {}", e);
            }
            ApiError::from(e)
        })?;

        let artifact = &outcome.artifact;
        info!(
            "Training finished: k={}, score={:.4}",
            artifact.k_value(),
            artifact.score()
        );

        Ok(TrainResponse {
            message: format!(
                "Training successful! Optimal clusters found: {} (Score: {:.2})",
                artifact.k_value(),
                artifact.score()
            ),
            redirect: RESULT_PAGE.to_string(),
            k_found: artifact.k_value(),
        })
    }

    pub fn predict_labels(&self, content: &[u8]) -> Result<LabeledDataset, PredictError> {
        let artifact = self.store.load()?.ok_or(PredictError::NoModelTrained)?;
        let dataset = Dataset::from_csv_bytes(content)?;
        apply_artifact(&artifact, dataset)
    }

    pub fn predict(&self, content: &[u8]) -> Result<PredictResponse, ApiError> {
        let labeled = self
            .predict_labels(content)
            .and_then(|labeled| labeled.to_csv_bytes().map_err(PredictError::from))
            .map_err(|e| {
                if e.is_client_error() {
                    warn!("Prediction rejected: {}", e);
                } else {
                    error!("Prediction failed: {}", e);
                }
                ApiError::from(e)
            })?;

        Ok(PredictResponse {
            content_type: "text/csv",
            filename: PREDICTIONS_FILENAME,
            body: labeled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryArtifactStore;

    const TRAIN: &[u8] = b"a,b,label\n0,0,x\n0.2,0.1,x\n5,5,y\n5.1,4.9,y\n";

    #[test]
    fn test_train_response() {
        let service = ClusterService::new(MemoryArtifactStore::new());
        let response = service.train(TRAIN).unwrap();

        assert_eq!(response.k_found, 2);
        assert_eq!(response.redirect, "/result");
        assert!(response.message.starts_with("Training successful! Optimal clusters found: 2 (Score: "));
    }

    #[test]
    fn test_train_validation_errors_are_400() {
        let service = ClusterService::new(MemoryArtifactStore::new());

        let err = service.train(b"name\nann\nbob\n").unwrap_err();
        assert_eq!(err.status, 400);
        assert_eq!(err.detail, "No numerical columns found in dataset.");

        let err = service.train(b"a,b\n1,2\n").unwrap_err();
        assert_eq!(err.status, 400);

        let err = service.train(b"a,b\n1,2\n3\n").unwrap_err();
        assert_eq!(err.status, 400);
    }

    #[test]
    fn test_failed_training_keeps_previous_artifact() {
        let service = ClusterService::new(MemoryArtifactStore::new());
        service.train(TRAIN).unwrap();

        let err = service.train(b"a\n1\n1\n1\n").unwrap_err();
        assert_eq!(err.status, 500);

        let stored = service.store().load().unwrap().unwrap();
        assert_eq!(stored.features().names(), &["a", "b"]);
    }

    #[test]
    fn test_predict_before_training() {
        let service = ClusterService::new(MemoryArtifactStore::new());
        let err = service.predict(b"a,b\n1,2\n").unwrap_err();

        assert_eq!(err.status, 400);
        assert_eq!(err.detail, "Model not found. Please train the model first.");
    }

    #[test]
    fn test_predict_returns_csv_download() {
        let service = ClusterService::new(MemoryArtifactStore::new());
        service.train(TRAIN).unwrap();

        let response = service.predict(b"b,a\n5,5\n0,0\n").unwrap();
        assert_eq!(response.content_type, "text/csv");
        assert_eq!(response.content_disposition(), "attachment; filename=predictions.csv");

        let body = String::from_utf8(response.body).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "b,a,Cluster_ID");
        let label = |line: &str| line.rsplit(',').next().unwrap().to_string();
        assert_ne!(label(lines[1]), label(lines[2]));
    }

    #[test]
    fn test_predict_missing_columns_is_400() {
        let service = ClusterService::new(MemoryArtifactStore::new());
        service.train(TRAIN).unwrap();

        let err = service.predict(b"a\n1\n").unwrap_err();
        assert_eq!(err.status, 400);
        assert_eq!(err.detail, r#"Missing columns: ["b"]"#);
    }
}
