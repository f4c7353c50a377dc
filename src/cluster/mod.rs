//! Centroid-based clustering.
//!
//! `KMeans` partitions samples into `n_clusters` groups using k-means++
//! seeding and Lloyd iterations. Fitting repeats the seeding `n_init` times
//! from a single seeded generator and keeps the run with the lowest inertia,
//! so a fixed `random_state` always reproduces the same model.
//!
//! # Examples
//!
//! ```rust
//! use autocluster::KMeans;
//! use ndarray::array;
//!
//! let x = array![
//!     [1.0, 1.0],
//!     [1.5, 2.0],
//!     [3.0, 4.0],
//!     [5.0, 7.0],
//!     [3.5, 5.0],
//!     [4.5, 5.0]
//! ];
//!
//! let mut kmeans = KMeans::new(2).max_iter(100).random_state(42);
//! let labels = kmeans.fit_predict(&x).unwrap();
//! assert_eq!(labels.len(), 6);
//!
//! // Within-cluster sum of squares of the kept run
//! let inertia = kmeans.inertia.unwrap();
//! println!("Inertia: {:.4}", inertia);
//! ```

mod kmeans;

pub use kmeans::KMeans;
