use super::Dataset;
use ndarray::{Array1, Array2};
use rand::distributions::{Distribution, Uniform};
use rand::{rngs::StdRng, SeedableRng};
use std::f64::consts::TAU;

use crate::error::{Result, VizError};

/// Generate `n` points spread over `classes` blobs placed evenly on a circle
/// of radius 2. Each point lies within distance `spread` of its blob center.
/// The same seed always yields the same dataset
pub fn blobs(n: usize, classes: usize, spread: f64, seed: u64) -> Result<Dataset> {
    if n == 0 || classes == 0 {
        return Err(VizError::EmptyDataset);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let angle = Uniform::new(0.0, TAU);
    let radius = Uniform::new_inclusive(0.0, spread.abs());

    let mut data = Array2::zeros((n, 2));
    let mut target = Array1::zeros(n);

    for i in 0..n {
        let label = i % classes;
        let center = TAU * label as f64 / classes as f64;
        let theta = angle.sample(&mut rng);
        let r = radius.sample(&mut rng);

        data[[i, 0]] = 2.0 * center.cos() + r * theta.cos();
        data[[i, 1]] = 2.0 * center.sin() + r * theta.sin();
        target[i] = label;
    }

    Dataset::new(data, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blobs_are_seeded() {
        let a = blobs(40, 3, 0.5, 7).unwrap();
        let b = blobs(40, 3, 0.5, 7).unwrap();

        assert_eq!(a.data, b.data);
        assert_eq!(a.target, b.target);
    }

    #[test]
    fn test_blobs_stay_near_centers() {
        let dataset = blobs(100, 4, 0.5, 1).unwrap();

        for (point, &label) in dataset.data.outer_iter().zip(dataset.target.iter()) {
            let center = TAU * label as f64 / 4.0;
            let dx = point[0] - 2.0 * center.cos();
            let dy = point[1] - 2.0 * center.sin();
            assert!((dx * dx + dy * dy).sqrt() <= 0.5 + 1e-9);
        }
        assert_eq!(dataset.target.iter().filter(|&&l| l == 3).count(), 25);
    }

    #[test]
    fn test_empty_request() {
        assert!(blobs(0, 2, 1.0, 0).is_err());
        assert!(blobs(10, 0, 1.0, 0).is_err());
    }
}
