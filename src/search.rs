//! Automatic selection of the number of clusters.
//!
//! The search standardizes the feature matrix, fits a [`KMeans`] model for
//! every `k` in `2..=min(max_k_cap, n_samples)` and keeps the model with the
//! highest silhouette score. `max_k_cap` is held within `2..=10`. A score only replaces the current best when it
//! is strictly greater, so on ties the smaller `k` wins.

use crate::Matrix;
use crate::artifact::ModelArtifact;
use crate::cluster::KMeans;
use crate::config::SearchConfig;
use crate::dataset::Dataset;
use crate::error::{ModelError, TrainError};
use crate::features::{FeatureSet, select_numeric_features};
use crate::metrics::silhouette_score;
use crate::preprocessing::StandardScaler;
use log::{debug, info};
use serde::Serialize;

pub const MIN_K: usize = 2;
pub const MAX_K_CAP: usize = 10;
pub const MIN_N_INIT: usize = 10;

/// Score of one evaluated cluster count.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateScore {
    pub k: usize,
    pub score: f64,
    pub inertia: f64,
}

#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub artifact: ModelArtifact,
    /// Every evaluated candidate, in ascending `k`.
    pub candidates: Vec<CandidateScore>,
}

#[derive(Clone, Debug)]
pub struct ClusterSearch {
    max_k_cap: usize,
    n_init: usize,
    random_state: u64,
    max_iter: usize,
    tolerance: f64,
}

impl ClusterSearch {
    pub fn new() -> Self {
        Self::from_config(&SearchConfig::default())
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            max_k_cap: config.max_k_cap.clamp(MIN_K, MAX_K_CAP),
            n_init: config.n_init.max(MIN_N_INIT),
            random_state: config.random_state,
            max_iter: config.max_iter,
            tolerance: config.tolerance,
        }
    }

    /// Upper bound on `k`, clamped to `MIN_K..=MAX_K_CAP`.
    pub fn max_k_cap(mut self, max_k_cap: usize) -> Self {
        self.max_k_cap = max_k_cap.clamp(MIN_K, MAX_K_CAP);
        self
    }

    /// Seedings per candidate, never fewer than [`MIN_N_INIT`].
    pub fn n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(MIN_N_INIT);
        self
    }

    pub fn random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Largest cluster count tried for `n_samples` rows.
    pub fn max_k(&self, n_samples: usize) -> usize {
        self.max_k_cap.min(n_samples)
    }

    /// Selects the numeric columns of `dataset` and searches over them.
    pub fn fit(&self, dataset: &Dataset) -> Result<SearchOutcome, TrainError> {
        let features = select_numeric_features(dataset)?;
        let x = dataset.numeric_matrix(features.names())?;
        self.fit_matrix(features, &x)
    }

    /// Searches over raw feature values whose columns follow `features`.
    pub fn fit_matrix(&self, features: FeatureSet, x: &Matrix) -> Result<SearchOutcome, TrainError> {
        if x.ncols() != features.len() {
            return Err(ModelError::DimensionMismatch {
                expected: features.len(),
                actual: x.ncols(),
            }
            .into());
        }

        let n_samples = x.nrows();
        let max_k = self.max_k(n_samples);
        if max_k < MIN_K {
            return Err(TrainError::InsufficientData { rows: n_samples });
        }

        let mut scaler = StandardScaler::new();
        let x_scaled = scaler.fit_transform(x)?;

        info!(
            "Searching k in {}..={} over {} samples, {} features",
            MIN_K,
            max_k,
            n_samples,
            features.len()
        );

        let mut candidates = Vec::with_capacity(max_k - MIN_K + 1);
        let mut models = Vec::with_capacity(max_k - MIN_K + 1);

        for k in MIN_K..=max_k {
            let (model, candidate) = self
                .evaluate(k, &x_scaled)
                .map_err(|source| TrainError::FitFailure { k, source })?;

            debug!(
                "k={}: silhouette={:.4}, inertia={:.4}",
                k, candidate.score, candidate.inertia
            );

            models.push(model);
            candidates.push(candidate);
        }

        let best = select_best(&candidates).ok_or(TrainError::InsufficientData { rows: n_samples })?;
        let (k_value, best_score) = (candidates[best].k, candidates[best].score);
        let model = models.swap_remove(best);
        info!("Selected k={} (silhouette={:.4})", k_value, best_score);

        let artifact = ModelArtifact::new(model, scaler, features, k_value, best_score)?;
        Ok(SearchOutcome {
            artifact,
            candidates,
        })
    }

    fn evaluate(&self, k: usize, x_scaled: &Matrix) -> Result<(KMeans, CandidateScore), ModelError> {
        let mut model = KMeans::new(k)
            .max_iter(self.max_iter)
            .tolerance(self.tolerance)
            .n_init(self.n_init)
            .random_state(self.random_state);

        let labels = model.fit_predict(x_scaled)?;
        let score = silhouette_score(x_scaled, &labels)?;
        let inertia = model.inertia.ok_or(ModelError::NotFitted("KMeans"))?;

        Ok((model, CandidateScore { k, score, inertia }))
    }
}

/// Index of the winning candidate. Candidates are in ascending `k`; a later
/// one wins only with a strictly greater score, so ties keep the smaller `k`.
fn select_best(candidates: &[CandidateScore]) -> Option<usize> {
    let mut best_score = f64::NEG_INFINITY;
    let mut best = None;
    for (i, candidate) in candidates.iter().enumerate() {
        if candidate.score > best_score {
            best_score = candidate.score;
            best = Some(i);
        }
    }
    best
}

impl Default for ClusterSearch {
    fn default() -> Self {
        Self::new()
    }
}
