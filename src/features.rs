//! Selection of the columns usable for clustering.

use crate::dataset::Dataset;
use crate::error::TrainError;
use serde::{Deserialize, Serialize};

/// Ordered, non-empty list of numeric column names.
///
/// The order is the column order of the training dataset and is the order in
/// which every later prediction must present its values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSet(Vec<String>);

impl FeatureSet {
    pub fn new(names: Vec<String>) -> Result<Self, TrainError> {
        if names.is_empty() {
            return Err(TrainError::NoNumericFeatures);
        }
        Ok(Self(names))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Trained columns absent from `dataset`, in feature order.
    pub fn missing_from(&self, dataset: &Dataset) -> Vec<String> {
        self.0
            .iter()
            .filter(|name| !dataset.has_column(name))
            .cloned()
            .collect()
    }
}

impl TryFrom<Vec<String>> for FeatureSet {
    type Error = TrainError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<FeatureSet> for Vec<String> {
    fn from(features: FeatureSet) -> Self {
        features.0
    }
}

/// Numeric columns of `dataset`, in their original order.
pub fn select_numeric_features(dataset: &Dataset) -> Result<FeatureSet, TrainError> {
    let names = dataset
        .columns()
        .iter()
        .enumerate()
        .filter(|(index, _)| dataset.is_numeric_column(*index))
        .map(|(_, name)| name.clone())
        .collect();

    FeatureSet::new(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selects_numeric_columns_in_order() {
        let dataset =
            Dataset::from_csv_bytes(b"id,name,height,city,weight\n1,ann,1.6,x,60\n2,bob,1.8,y,80\n")
                .unwrap();
        let features = select_numeric_features(&dataset).unwrap();
        assert_eq!(features.names(), &["id", "height", "weight"]);
    }

    #[test]
    fn test_text_only_dataset_rejected() {
        let dataset = Dataset::from_csv_bytes(b"name,city\nann,x\nbob,y\n").unwrap();
        assert!(matches!(
            select_numeric_features(&dataset),
            Err(TrainError::NoNumericFeatures)
        ));
    }

    #[test]
    fn test_missing_from_reports_all_names() {
        let features = FeatureSet::new(vec!["a".into(), "b".into(), "c".into()]).unwrap();
        let dataset = Dataset::from_csv_bytes(b"a\n1\n").unwrap();
        assert_eq!(features.missing_from(&dataset), vec!["b", "c"]);
    }

    #[test]
    fn test_empty_feature_set_fails_deserialization() {
        assert!(serde_json::from_str::<FeatureSet>("[]").is_err());
        let features: FeatureSet = serde_json::from_str(r#"["x","y"]"#).unwrap();
        assert_eq!(features.len(), 2);
    }
}
