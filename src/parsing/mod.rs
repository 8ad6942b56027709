use ndarray::{Array1, Array2};

use crate::error::{Result, VizError};

pub mod points;
pub mod synthetic;
pub mod weights;

/// A labeled collection of 2-D points. Row `i` of `data` carries label `target[i]`
#[derive(Debug, Clone)]
pub struct Dataset {
    pub data: Array2<f64>,
    pub target: Array1<usize>,
}

impl Dataset {
    pub fn new(data: Array2<f64>, target: Array1<usize>) -> Result<Dataset> {
        if data.nrows() != target.len() {
            return Err(VizError::ShapeMismatch {
                what: "labels",
                expected: data.nrows(),
                actual: target.len(),
            });
        }

        Ok(Dataset { data, target })
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }
}
