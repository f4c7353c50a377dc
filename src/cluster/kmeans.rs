use crate::Matrix;
use crate::error::ModelError;
use crate::metrics::{euclidean_distance, squared_distance};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KMeans {
    pub cluster_centers: Option<Matrix>,
    #[serde(skip)]
    pub labels: Option<Vec<usize>>,
    pub inertia: Option<f64>,
    pub n_iter: Option<usize>,
    n_clusters: usize,
    max_iter: usize,
    tolerance: f64,
    n_init: usize,
    random_state: u64,
}

/// Outcome of a single k-means++ seeding followed by Lloyd iterations.
struct Run {
    centroids: Matrix,
    labels: Vec<usize>,
    inertia: f64,
    n_iter: usize,
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            cluster_centers: None,
            labels: None,
            inertia: None,
            n_iter: None,
            n_clusters,
            max_iter: 300,
            tolerance: 1e-4,
            n_init: 10,
            random_state: 42,
        }
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Number of independent seedings; the run with the lowest inertia is kept.
    pub fn n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    pub fn random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    pub fn n_features(&self) -> Option<usize> {
        self.cluster_centers.as_ref().map(|c| c.ncols())
    }

    pub fn fit(&mut self, x: &Matrix) -> Result<(), ModelError> {
        self.validate_params()?;

        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(ModelError::EmptyInput);
        }

        if x.nrows() < self.n_clusters {
            return Err(ModelError::TooFewSamples {
                n_samples: x.nrows(),
                n_clusters: self.n_clusters,
            });
        }

        // One generator for all restarts: each seeding draws fresh values
        // while the whole fit stays reproducible for a given random_state.
        let mut rng = StdRng::seed_from_u64(self.random_state);
        let mut best: Option<Run> = None;

        for _ in 0..self.n_init {
            let centroids = self.initialize_centroids(x, &mut rng);
            let run = self.run_lloyd(x, centroids);

            if !run.inertia.is_finite() {
                return Err(ModelError::NonFinite(format!(
                    "inertia for n_clusters={}",
                    self.n_clusters
                )));
            }

            if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }

        let best = best.ok_or_else(|| ModelError::InvalidParameter("n_init must be > 0".to_string()))?;

        self.cluster_centers = Some(best.centroids);
        self.labels = Some(best.labels);
        self.inertia = Some(best.inertia);
        self.n_iter = Some(best.n_iter);

        Ok(())
    }

    pub fn predict(&self, x: &Matrix) -> Result<Vec<usize>, ModelError> {
        let centroids = self
            .cluster_centers
            .as_ref()
            .ok_or(ModelError::NotFitted("KMeans"))?;

        if x.ncols() != centroids.ncols() {
            return Err(ModelError::DimensionMismatch {
                expected: centroids.ncols(),
                actual: x.ncols(),
            });
        }

        let mut labels = vec![0; x.nrows()];
        assign_labels(x, centroids, &mut labels);
        Ok(labels)
    }

    pub fn fit_predict(&mut self, x: &Matrix) -> Result<Vec<usize>, ModelError> {
        self.fit(x)?;
        self.labels.clone().ok_or(ModelError::NotFitted("KMeans"))
    }

    fn validate_params(&self) -> Result<(), ModelError> {
        if self.n_clusters == 0 {
            return Err(ModelError::InvalidParameter(format!(
                "n_clusters must be > 0, got {}",
                self.n_clusters
            )));
        }
        if self.n_init == 0 {
            return Err(ModelError::InvalidParameter("n_init must be > 0".to_string()));
        }
        if self.max_iter == 0 {
            return Err(ModelError::InvalidParameter("max_iter must be > 0".to_string()));
        }
        if !(self.tolerance >= 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "tolerance must be >= 0, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    /// k-means++ seeding: the first center is uniform, each next one is drawn
    /// with probability proportional to its squared distance from the
    /// nearest center chosen so far.
    fn initialize_centroids(&self, x: &Matrix, rng: &mut StdRng) -> Matrix {
        let n_samples = x.nrows();
        let mut centroids = Matrix::zeros((self.n_clusters, x.ncols()));

        let first_idx = rng.gen_range(0..n_samples);
        centroids.row_mut(0).assign(&x.row(first_idx));

        let mut closest: Vec<f64> = (0..n_samples)
            .map(|i| squared_distance(&x.row(i), &centroids.row(0)))
            .collect();

        for k in 1..self.n_clusters {
            let total: f64 = closest.iter().sum();

            let next_idx = if total > 0.0 {
                let target = rng.gen_range(0.0..total);
                let mut chosen = closest.iter().rposition(|&d| d > 0.0).unwrap_or(0);
                let mut cumulative = 0.0;
                for (i, &d) in closest.iter().enumerate() {
                    cumulative += d;
                    if cumulative > target {
                        chosen = i;
                        break;
                    }
                }
                chosen
            } else {
                // Every point coincides with a center already
                rng.gen_range(0..n_samples)
            };

            centroids.row_mut(k).assign(&x.row(next_idx));

            for (i, d) in closest.iter_mut().enumerate() {
                let dist = squared_distance(&x.row(i), &centroids.row(k));
                if dist < *d {
                    *d = dist;
                }
            }
        }

        centroids
    }

    fn run_lloyd(&self, x: &Matrix, mut centroids: Matrix) -> Run {
        let mut labels = vec![0; x.nrows()];
        let mut n_iter = 0;

        for iteration in 0..self.max_iter {
            n_iter = iteration + 1;
            let old_centroids = centroids.clone();

            assign_labels(x, &centroids, &mut labels);

            // Update centroids; an empty cluster keeps its previous center
            let mut sums = Matrix::zeros(centroids.raw_dim());
            let mut counts = vec![0usize; self.n_clusters];
            for (i, &label) in labels.iter().enumerate() {
                let mut sum = sums.row_mut(label);
                sum += &x.row(i);
                counts[label] += 1;
            }
            for (k, &count) in counts.iter().enumerate() {
                if count > 0 {
                    let mean = &sums.row(k) / count as f64;
                    centroids.row_mut(k).assign(&mean);
                }
            }

            if max_centroid_shift(&old_centroids, &centroids) < self.tolerance {
                break;
            }
        }

        assign_labels(x, &centroids, &mut labels);

        let inertia = labels
            .iter()
            .enumerate()
            .map(|(i, &label)| squared_distance(&x.row(i), &centroids.row(label)))
            .sum();

        Run {
            centroids,
            labels,
            inertia,
            n_iter,
        }
    }
}

/// Nearest-center assignment; ties go to the lower cluster index.
fn assign_labels(x: &Matrix, centroids: &Matrix, labels: &mut [usize]) {
    for (i, label) in labels.iter_mut().enumerate() {
        let mut min_distance = f64::INFINITY;
        let mut closest_cluster = 0;

        for k in 0..centroids.nrows() {
            let distance = squared_distance(&x.row(i), &centroids.row(k));
            if distance < min_distance {
                min_distance = distance;
                closest_cluster = k;
            }
        }

        *label = closest_cluster;
    }
}

fn max_centroid_shift(old_centroids: &Matrix, new_centroids: &Matrix) -> f64 {
    old_centroids
        .rows()
        .into_iter()
        .zip(new_centroids.rows())
        .map(|(old, new)| euclidean_distance(&old, &new))
        .fold(0.0, f64::max)
}
