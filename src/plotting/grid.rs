use ndarray::{Array, Array1, Array2, ArrayView1, ArrayView2};

use super::Extent;
use crate::error::{Result, VizError};

/// Side length of the square grid closest to `point_count` samples
/// without exceeding it: `floor(sqrt(point_count))`
pub fn grid_side(point_count: usize) -> usize {
    let mut side = (point_count as f64).sqrt() as usize;
    // Float rounding can land one off for large counts
    while side * side > point_count {
        side -= 1;
    }
    while (side + 1) * (side + 1) <= point_count {
        side += 1;
    }
    side
}

/// A regular `side x side` lattice spanning an extent.
///
/// Sample `k` of [`SamplingGrid::points`] sits at row `i = k / side` and
/// column `j = k % side`, i.e. at `(xs[j], ys[i])`. Reshaping a flat
/// per-sample sequence with [`SamplingGrid::reshape`] gives back an array
/// indexed `[[i, j]]` in that same layout.
#[derive(Debug, Clone)]
pub struct SamplingGrid {
    extent: Extent,
    xs: Array1<f64>,
    ys: Array1<f64>,
    points: Array2<f64>,
}

impl SamplingGrid {
    pub fn new(extent: Extent, point_count: usize) -> Result<SamplingGrid> {
        if point_count == 0 {
            return Err(VizError::InvalidPointCount(point_count));
        }

        let side = grid_side(point_count);
        let xs = Array::linspace(extent.x_min, extent.x_max, side);
        let ys = Array::linspace(extent.y_min, extent.y_max, side);

        let mut points = Array2::zeros((side * side, 2));
        for (i, &y) in ys.iter().enumerate() {
            for (j, &x) in xs.iter().enumerate() {
                let k = i * side + j;
                points[[k, 0]] = x;
                points[[k, 1]] = y;
            }
        }

        Ok(SamplingGrid {
            extent,
            xs,
            ys,
            points,
        })
    }

    pub fn side(&self) -> usize {
        self.xs.len()
    }

    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn xs(&self) -> ArrayView1<f64> {
        self.xs.view()
    }

    pub fn ys(&self) -> ArrayView1<f64> {
        self.ys.view()
    }

    /// All samples, one row each
    pub fn points(&self) -> ArrayView2<f64> {
        self.points.view()
    }

    /// Lay a flat per-sample sequence back out as `[[row, column]]`
    pub fn reshape<T: Clone>(&self, values: Array1<T>) -> Result<Array2<T>> {
        let side = self.side();
        if values.len() != side * side {
            return Err(VizError::ShapeMismatch {
                what: "grid values",
                expected: side * side,
                actual: values.len(),
            });
        }

        let flat: Vec<T> = values.iter().cloned().collect();
        Array2::from_shape_vec((side, side), flat).map_err(|_| VizError::ShapeMismatch {
            what: "grid values",
            expected: side * side,
            actual: values.len(),
        })
    }
}
