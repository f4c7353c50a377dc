//! Automatic k-means clustering for tabular data.
//!
//! Training standardizes the numeric columns of a CSV upload, searches the
//! cluster count, scores every candidate with the silhouette coefficient and
//! persists the winner as a single [`ModelArtifact`]. Prediction applies the
//! stored scaler and model to new data and appends a `Cluster_ID` column.
//!
//! ```rust
//! use autocluster::{ClusterService, MemoryArtifactStore};
//!
//! let service = ClusterService::new(MemoryArtifactStore::new());
//! let csv = b"x,y\n0.0,0.1\n0.2,0.0\n9.8,10.1\n10.0,9.9\n";
//!
//! let trained = service.train(csv).unwrap();
//! assert!(trained.k_found >= 2);
//!
//! let labeled = service.predict(b"x,y\n0.1,0.1\n").unwrap();
//! assert!(String::from_utf8(labeled.body).unwrap().starts_with("x,y,Cluster_ID"));
//! ```

pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod artifact;
pub mod cluster;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod metrics;
pub mod predict;
pub mod preprocessing;
pub mod search;
pub mod service;
pub mod store;

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;

pub use artifact::ModelArtifact;
pub use cluster::KMeans;
pub use config::{AppConfig, SearchConfig};
pub use dataset::Dataset;
pub use error::{ApiError, DataError, ModelError, PredictError, StoreError, TrainError};
pub use features::{FeatureSet, select_numeric_features};
pub use predict::{CLUSTER_COLUMN, LabeledDataset, apply_artifact};
pub use preprocessing::StandardScaler;
pub use search::{CandidateScore, ClusterSearch, SearchOutcome};
pub use service::{ClusterService, PredictResponse, TrainResponse};
pub use store::{ArtifactStore, FileArtifactStore, MemoryArtifactStore};
