use crate::error::ModelError;
use crate::{Matrix, Vector};
use serde::{Deserialize, Serialize};

/// Per-feature standardization to zero mean and unit variance.
///
/// Uses the population standard deviation. Features with zero variance are
/// only centered (their scale is fixed at 1.0).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Option<Vector>,
    scale: Option<Vector>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            mean: None,
            scale: None,
        }
    }

    pub fn fit(&mut self, data: &Matrix) -> Result<(), ModelError> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(ModelError::EmptyInput);
        }

        let mean = data
            .mean_axis(ndarray::Axis(0))
            .ok_or(ModelError::EmptyInput)?;
        let scale = data
            .std_axis(ndarray::Axis(0), 0.0)
            .mapv(|s| if s > 0.0 { s } else { 1.0 });

        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(())
    }

    pub fn transform(&self, data: &Matrix) -> Result<Matrix, ModelError> {
        let mean = self.mean.as_ref().ok_or(ModelError::NotFitted("StandardScaler"))?;
        let scale = self.scale.as_ref().ok_or(ModelError::NotFitted("StandardScaler"))?;

        if data.ncols() != mean.len() {
            return Err(ModelError::DimensionMismatch {
                expected: mean.len(),
                actual: data.ncols(),
            });
        }

        let mut result = data.clone();
        for mut row in result.axis_iter_mut(ndarray::Axis(0)) {
            row -= mean;
            row /= scale;
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, data: &Matrix) -> Result<Matrix, ModelError> {
        self.fit(data)?;
        self.transform(data)
    }

    pub fn mean(&self) -> Option<&Vector> {
        self.mean.as_ref()
    }

    pub fn scale(&self) -> Option<&Vector> {
        self.scale.as_ref()
    }

    /// Number of features seen during `fit`, or 0 if unfitted.
    pub fn n_features(&self) -> usize {
        self.mean.as_ref().map_or(0, |m| m.len())
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}
