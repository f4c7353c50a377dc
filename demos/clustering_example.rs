use autocluster::{ClusterSearch, FeatureSet, Matrix};
use ndarray::{Array2, array, concatenate, Axis};
use ndarray_rand::RandomExt;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand_distr::Uniform;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Automatic K Selection ===\n");

    // Three blobs around (2, 2), (8, 8) and (2, 8)
    let mut rng = StdRng::seed_from_u64(7);
    let centers = array![[2.0, 2.0], [8.0, 8.0], [2.0, 8.0]];
    let x = blobs(&centers, 15, 0.6, &mut rng)?;

    println!("Dataset: {} samples, {} features", x.nrows(), x.ncols());
    println!("Expected: 3 natural clusters\n");

    let features = FeatureSet::new(vec!["x".to_string(), "y".to_string()])?;
    let outcome = ClusterSearch::new().fit_matrix(features, &x)?;

    println!("{:>4} {:>12} {:>12}", "k", "silhouette", "inertia");
    for candidate in &outcome.candidates {
        let marker = if candidate.k == outcome.artifact.k_value() { " <-" } else { "" };
        println!(
            "{:>4} {:>12.4} {:>12.4}{}",
            candidate.k, candidate.score, candidate.inertia, marker
        );
    }

    let artifact = &outcome.artifact;
    println!("\nSelected k={} (silhouette {:.4})", artifact.k_value(), artifact.score());

    let new_points = array![[2.1, 1.9], [7.7, 8.3], [1.8, 8.1]];
    let labels = artifact.assign(&new_points)?;
    for (point, label) in new_points.rows().into_iter().zip(labels) {
        println!("  ({:.1}, {:.1}) -> cluster {}", point[0], point[1], label);
    }

    Ok(())
}

fn blobs(centers: &Matrix, per_center: usize, spread: f64, rng: &mut StdRng) -> Result<Matrix, Box<dyn std::error::Error>> {
    let parts: Vec<Matrix> = centers
        .rows()
        .into_iter()
        .map(|center| {
            let noise = Array2::random_using((per_center, centers.ncols()), Uniform::new(-spread, spread), &mut *rng);
            noise + &center
        })
        .collect();
    let views: Vec<_> = parts.iter().map(|p| p.view()).collect();
    Ok(concatenate(Axis(0), &views)?)
}
