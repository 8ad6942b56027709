use log::debug;
use ndarray::{Array1, Array2};
use std::{fs, path::Path};

use crate::error::{Result, VizError};

/// Parse exported network weights.
/// The keys are e.g. W0, b0, W1, b1. Each weight matrix is stored as a flat
/// row-major array; its row count follows from the length of the matching bias
pub fn parse_weights(text: &str) -> Result<Vec<(Array2<f64>, Array1<f64>)>> {
    let data = json::parse(text)?;
    if !data.is_object() {
        return Err(VizError::InvalidWeights("expected a JSON object".into()));
    }

    let mut layers = vec![];

    for i in 0.. {
        let w_key = format!("W{}", i);
        let b_key = format!("b{}", i);

        if !data.has_key(&w_key) {
            break;
        }

        let w = read_floats(&data[w_key.as_str()], &w_key)?;
        let b = read_floats(&data[b_key.as_str()], &b_key)?;

        if b.is_empty() || w.len() % b.len() != 0 {
            return Err(VizError::InvalidWeights(format!(
                "{} has {} values, not a multiple of {} biases",
                w_key,
                w.len(),
                b.len()
            )));
        }

        let rows = w.len() / b.len();
        let weights = Array2::from_shape_vec((rows, b.len()), w)
            .map_err(|e| VizError::InvalidWeights(e.to_string()))?;

        layers.push((weights, Array1::from(b)));
    }

    debug!("parsed {} layers", layers.len());

    Ok(layers)
}

/// Read the weights file at `path`
pub fn load_weights<P: AsRef<Path>>(path: P) -> Result<Vec<(Array2<f64>, Array1<f64>)>> {
    let text = fs::read_to_string(path)?;

    parse_weights(&text)
}

fn read_floats(value: &json::JsonValue, key: &str) -> Result<Vec<f64>> {
    if !value.is_array() {
        return Err(VizError::InvalidWeights(format!("{} is not an array", key)));
    }

    value
        .members()
        .map(|x| {
            x.as_f64()
                .ok_or_else(|| VizError::InvalidWeights(format!("{} holds a non-number", key)))
        })
        .collect()
}
