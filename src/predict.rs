use crate::artifact::ModelArtifact;
use crate::dataset::Dataset;
use crate::error::{DataError, PredictError};
use log::debug;

/// Name of the label column added to predicted datasets.
pub const CLUSTER_COLUMN: &str = "Cluster_ID";

/// Input dataset with its cluster assignments attached.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledDataset {
    dataset: Dataset,
    labels: Vec<usize>,
}

impl LabeledDataset {
    /// The input rows, in input order, with the `Cluster_ID` column set.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, DataError> {
        self.dataset.to_csv_bytes()
    }
}

/// Labels every row of `dataset` with the stored model.
///
/// The artifact's feature columns are read in the artifact's order and
/// scaled with the training-time parameters. Every trained column absent
/// from `dataset` is reported at once.
pub fn apply_artifact(artifact: &ModelArtifact, dataset: Dataset) -> Result<LabeledDataset, PredictError> {
    let features = artifact.features();

    let missing = features.missing_from(&dataset);
    if !missing.is_empty() {
        return Err(PredictError::MissingColumns(missing));
    }

    let x = dataset.numeric_matrix(features.names())?;
    let labels = artifact.assign(&x)?;
    debug!("Assigned {} rows to {} clusters", labels.len(), artifact.k_value());

    let values = labels.iter().map(|label| label.to_string()).collect();
    let dataset = dataset.with_column(CLUSTER_COLUMN, values)?;

    Ok(LabeledDataset { dataset, labels })
}
