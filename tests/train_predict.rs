//! Integration test: train on CSV, persist to disk, label new CSV.

use autocluster::{
    ArtifactStore, ClusterService, Dataset, FileArtifactStore, MemoryArtifactStore, PredictError, TrainError,
};
use ndarray::{Array2, array};
use ndarray_rand::RandomExt;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand_distr::Uniform;
use std::collections::HashSet;

fn blob_csv(centers: &Array2<f64>, per_center: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut csv = String::from("id,width,height,tag\n");
    let mut id = 0;

    for center in centers.rows() {
        let noise = Array2::random_using((per_center, 2), Uniform::new(-0.3, 0.3), &mut rng);
        for row in noise.rows() {
            csv.push_str(&format!(
                "{},{},{},t{}\n",
                id,
                center[0] + row[0],
                center[1] + row[1],
                id % 3
            ));
            id += 1;
        }
    }

    csv.into_bytes()
}

fn file_service(dir: &tempfile::TempDir) -> ClusterService<FileArtifactStore> {
    ClusterService::new(FileArtifactStore::new(dir.path().join("server_model.json")))
}

#[test]
fn test_train_then_predict_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let centers = array![[0.0, 0.0], [6.0, 6.0], [0.0, 6.0]];

    let trained = file_service(&dir).train(&blob_csv(&centers, 8, 1)).unwrap();
    assert!(trained.k_found >= 2 && trained.k_found <= 10);

    // A fresh service sees the artifact persisted by the first one
    let service = file_service(&dir);
    let input = blob_csv(&centers, 4, 2);
    let response = service.predict(&input).unwrap();

    let original = Dataset::from_csv_bytes(&input).unwrap();
    let labeled = Dataset::from_csv_bytes(&response.body).unwrap();

    assert_eq!(labeled.n_samples(), original.n_samples());
    assert_eq!(&labeled.columns()[..4], original.columns());
    assert_eq!(labeled.columns()[4], "Cluster_ID");
    for (out_row, in_row) in labeled.rows().iter().zip(original.rows()) {
        assert_eq!(&out_row[..4], &in_row[..]);
        let label: usize = out_row[4].parse().unwrap();
        assert!(label < trained.k_found);
    }
}

#[test]
fn test_blobs_recover_cluster_count() {
    let dir = tempfile::tempdir().unwrap();
    let centers = array![[0.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
    let service = file_service(&dir);

    // id is a numeric feature too; keep it small relative to the blob gaps
    let csv = String::from_utf8(blob_csv(&centers, 10, 3))
        .unwrap()
        .lines()
        .map(|line| line.split_once(',').map_or(line, |(_, rest)| rest).to_string() + "\n")
        .collect::<String>();

    let trained = service.train(csv.as_bytes()).unwrap();
    assert_eq!(trained.k_found, 3);

    let stored = service.store().load().unwrap().unwrap();
    assert_eq!(stored.features().names(), &["width", "height"]);
    assert!(stored.score() > 0.7);
}

#[test]
fn test_training_is_deterministic() {
    let centers = array![[0.0, 0.0], [3.0, 1.0], [1.0, 4.0]];
    let csv = blob_csv(&centers, 5, 11);

    let first = ClusterService::new(MemoryArtifactStore::new());
    let second = ClusterService::new(MemoryArtifactStore::new());
    let a = first.train_artifact(&csv).unwrap();
    let b = second.train_artifact(&csv).unwrap();

    assert_eq!(a.artifact.k_value(), b.artifact.k_value());
    assert_eq!(a.artifact.score(), b.artifact.score());
}

#[test]
fn test_search_range_follows_row_count() {
    let service = ClusterService::new(MemoryArtifactStore::new());

    let small = service.train_artifact(b"v\n1\n2\n10\n11\n").unwrap();
    let ks: Vec<usize> = small.candidates.iter().map(|c| c.k).collect();
    assert_eq!(ks, vec![2, 3, 4]);

    let centers = array![[0.0, 0.0], [5.0, 5.0]];
    let large = service.train_artifact(&blob_csv(&centers, 12, 5)).unwrap();
    let ks: Vec<usize> = large.candidates.iter().map(|c| c.k).collect();
    assert_eq!(ks, (2..=10).collect::<Vec<_>>());

    for outcome in [&small, &large] {
        let best = outcome.artifact.score();
        assert!(outcome.candidates.iter().all(|c| c.score <= best));
    }
}

#[test]
fn test_five_row_scenario() {
    let service = ClusterService::new(MemoryArtifactStore::new());
    let outcome = service
        .train_artifact(b"x,y\n0,0\n0.1,0.1\n5,5\n5.1,5.1\n10,0\n")
        .unwrap();

    assert!((2..=5).contains(&outcome.artifact.k_value()));
    assert!(outcome.artifact.score() > 0.0);
}

#[test]
fn test_single_row_is_insufficient() {
    let service = ClusterService::new(MemoryArtifactStore::new());
    assert!(matches!(
        service.train_artifact(b"x,y\n1,2\n"),
        Err(TrainError::InsufficientData { rows: 1 })
    ));
    assert!(matches!(
        service.train_artifact(b"x,y\n"),
        Err(TrainError::InsufficientData { rows: 0 })
    ));
}

#[test]
fn test_text_only_dataset() {
    let service = ClusterService::new(MemoryArtifactStore::new());
    assert!(matches!(
        service.train_artifact(b"name,city\nann,paris\nbob,oslo\nal,rome\n"),
        Err(TrainError::NoNumericFeatures)
    ));
}

#[test]
fn test_missing_column_scenario() {
    let service = ClusterService::new(MemoryArtifactStore::new());
    service.train(b"a,b\n0,0\n1,1\n9,9\n10,10\n").unwrap();

    match service.predict_labels(b"a\n3\n") {
        Err(PredictError::MissingColumns(missing)) => assert_eq!(missing, vec!["b"]),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_predict_without_model() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(&dir);

    assert!(matches!(
        service.predict_labels(b"a\n1\n"),
        Err(PredictError::NoModelTrained)
    ));
}

#[test]
fn test_retraining_replaces_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(&dir);

    service.train(b"a,b\n0,0\n1,1\n9,9\n10,10\n").unwrap();
    service.train(b"c\n0\n1\n50\n51\n100\n101\n").unwrap();

    let stored = service.store().load().unwrap().unwrap();
    assert_eq!(stored.features().names(), &["c"]);

    let labeled = service.predict_labels(b"c\n0.5\n100.5\n50\n").unwrap();
    let distinct: HashSet<usize> = labeled.labels().iter().copied().collect();
    assert_eq!(distinct.len(), 3);
}
