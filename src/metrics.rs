use crate::Matrix;
use crate::error::ModelError;
use ndarray::ArrayView1;

pub fn squared_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

pub fn euclidean_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    squared_distance(a, b).sqrt()
}

/// Mean silhouette coefficient over all samples, in `[-1, 1]`.
///
/// For sample `i` with mean intra-cluster distance `a` and smallest mean
/// distance `b` to another cluster, `s(i) = (b - a) / max(a, b)`. Samples in
/// singleton clusters contribute 0. At least two distinct labels are required.
pub fn silhouette_score(x: &Matrix, labels: &[usize]) -> Result<f64, ModelError> {
    if x.nrows() != labels.len() {
        return Err(ModelError::DimensionMismatch {
            expected: x.nrows(),
            actual: labels.len(),
        });
    }
    if x.nrows() == 0 {
        return Err(ModelError::EmptyInput);
    }

    let n_labels = labels.iter().max().map_or(0, |&max| max + 1);
    let mut counts = vec![0usize; n_labels];
    for &label in labels {
        counts[label] += 1;
    }

    let distinct = counts.iter().filter(|&&c| c > 0).count();
    if distinct < 2 {
        return Err(ModelError::DegenerateLabels { distinct });
    }

    let mut total = 0.0;
    let mut dist_sums = vec![0.0; n_labels];

    for i in 0..x.nrows() {
        let own = labels[i];
        if counts[own] == 1 {
            continue;
        }

        dist_sums.iter_mut().for_each(|d| *d = 0.0);
        for j in 0..x.nrows() {
            if i != j {
                dist_sums[labels[j]] += euclidean_distance(&x.row(i), &x.row(j));
            }
        }

        let a = dist_sums[own] / (counts[own] - 1) as f64;
        let b = (0..n_labels)
            .filter(|&c| c != own && counts[c] > 0)
            .map(|c| dist_sums[c] / counts[c] as f64)
            .fold(f64::INFINITY, f64::min);

        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }

    let score = total / x.nrows() as f64;
    if !score.is_finite() {
        return Err(ModelError::NonFinite("silhouette score".to_string()));
    }

    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_distances() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];
        assert_eq!(squared_distance(&a.view(), &b.view()), 25.0);
        assert_eq!(euclidean_distance(&a.view(), &b.view()), 5.0);
    }

    #[test]
    fn test_silhouette_known_value() {
        // Cluster 0 = {0, 1}, cluster 1 = {4}
        // s(0) = (4 - 1) / 4, s(1) = (3 - 1) / 3, s(2) = 0
        let x = array![[0.0], [1.0], [4.0]];
        let score = silhouette_score(&x, &[0, 0, 1]).unwrap();
        let expected = (0.75 + 2.0 / 3.0) / 3.0;
        assert!((score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_silhouette_rewards_separation() {
        let x = array![[0.0, 0.0], [0.1, 0.0], [10.0, 10.0], [10.1, 10.0]];
        let good = silhouette_score(&x, &[0, 0, 1, 1]).unwrap();
        let bad = silhouette_score(&x, &[0, 1, 0, 1]).unwrap();

        assert!(good > 0.9);
        assert!(bad < 0.0);
        assert!(good <= 1.0 && bad >= -1.0);
    }

    #[test]
    fn test_silhouette_all_singletons_is_zero() {
        let x = array![[0.0], [1.0], [3.0]];
        assert_eq!(silhouette_score(&x, &[0, 1, 2]).unwrap(), 0.0);
    }

    #[test]
    fn test_silhouette_ignores_unused_label_ids() {
        let x = array![[0.0], [1.0], [4.0]];
        let dense = silhouette_score(&x, &[0, 0, 1]).unwrap();
        let sparse = silhouette_score(&x, &[0, 0, 3]).unwrap();
        assert!((dense - sparse).abs() < 1e-12);
    }

    #[test]
    fn test_silhouette_single_label_rejected() {
        let x = array![[0.0], [1.0]];
        assert!(matches!(
            silhouette_score(&x, &[0, 0]),
            Err(ModelError::DegenerateLabels { distinct: 1 })
        ));
    }

    #[test]
    fn test_silhouette_length_mismatch() {
        let x = array![[0.0], [1.0]];
        assert!(silhouette_score(&x, &[0]).is_err());
    }
}
