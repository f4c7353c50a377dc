//! Error types for training, prediction and artifact storage.

use serde::Serialize;
use std::io;
use thiserror::Error;

/// Failures raised by the estimators and metrics themselves.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Input matrix must have at least one sample and one feature")]
    EmptyInput,

    #[error("n_samples={n_samples} should be >= n_clusters={n_clusters}")]
    TooFewSamples { n_samples: usize, n_clusters: usize },

    #[error("{0} not fitted. Call fit() first.")]
    NotFitted(&'static str),

    #[error("Number of features in X ({actual}) doesn't match training data ({expected})")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Number of labels is {distinct}. Valid values are 2 or more")]
    DegenerateLabels { distinct: usize },

    #[error("Non-finite value produced: {0}")]
    NonFinite(String),

    #[error("Inconsistent artifact: {0}")]
    InconsistentArtifact(String),
}

/// Failures reading or writing tabular data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset has no header row")]
    MissingHeader,

    #[error("Column '{column}' is not numeric: value '{value}' in row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Row {row} has {actual} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to write output: {0}")]
    Output(String),
}

/// Failures of the single-slot artifact store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Artifact serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored artifact is invalid: {0}")]
    Invalid(#[from] ModelError),
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("No numerical columns found in dataset.")]
    NoNumericFeatures,

    #[error("Not enough data points to cluster ({rows} rows).")]
    InsufficientData { rows: usize },

    #[error("Clustering failed for k={k}: {source}")]
    FitFailure {
        k: usize,
        #[source]
        source: ModelError,
    },

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Model not found. Please train the model first.")]
    NoModelTrained,

    #[error("Missing columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TrainError {
    /// Whether the caller's input, rather than the server, caused the failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TrainError::NoNumericFeatures | TrainError::InsufficientData { .. } | TrainError::Data(_)
        )
    }
}

impl PredictError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictError::NoModelTrained | PredictError::MissingColumns(_) | PredictError::Data(_)
        )
    }
}

/// Classified failure handed to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{status}: {detail}")]
pub struct ApiError {
    pub status: u16,
    pub detail: String,
}

impl ApiError {
    pub const BAD_REQUEST: u16 = 400;
    pub const INTERNAL: u16 = 500;

    fn classify(client: bool, detail: String) -> Self {
        let status = if client { Self::BAD_REQUEST } else { Self::INTERNAL };
        Self { status, detail }
    }
}

impl From<TrainError> for ApiError {
    fn from(err: TrainError) -> Self {
        Self::classify(err.is_client_error(), err.to_string())
    }
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        Self::classify(err.is_client_error(), err.to_string())
    }
}
