use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use super::{Classifier, MarginModel};
use crate::error::{Result, VizError};

/// Represents a trained feed-forward neural net, used for inference only
#[derive(Debug, Clone)]
pub struct NeuralNet {
    pub layers: Vec<(Array2<f64>, Array1<f64>)>, // Each layer holds a weight matrix and a bias vector
    pub activation_function: ActivationFunction,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum ActivationFunction {
    ReLU,
    Sigmoid,
    Tanh,
    Linear,
    LeakyReLU,
}

impl NeuralNet {
    /// Build a network from already trained layers.
    /// Consecutive layers must agree on their width.
    pub fn new(
        layers: Vec<(Array2<f64>, Array1<f64>)>,
        activation_function: ActivationFunction,
    ) -> Result<NeuralNet> {
        if layers.is_empty() {
            return Err(VizError::InvalidWeights("network has no layers".into()));
        }

        for (i, (weights, bias)) in layers.iter().enumerate() {
            if weights.ncols() != bias.len() {
                return Err(VizError::InvalidWeights(format!(
                    "layer {} has {} outputs but {} biases",
                    i,
                    weights.ncols(),
                    bias.len()
                )));
            }
        }

        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].0.ncols() != pair[1].0.nrows() {
                return Err(VizError::InvalidWeights(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i,
                    pair[0].0.ncols(),
                    i + 1,
                    pair[1].0.nrows()
                )));
            }
        }

        Ok(NeuralNet {
            layers,
            activation_function,
        })
    }

    /// Number of input features
    pub fn input_size(&self) -> usize {
        self.layers[0].0.nrows()
    }

    /// Number of classes scored by the output layer
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].0.ncols()
    }

    /// Perform a forward pass of the network on some input.
    /// Returns the raw scores of the output layer, one row per instance
    pub fn scores(&self, inputs: &ArrayView2<f64>) -> Array2<f64> {
        let mut hidden = inputs.to_owned();
        let mut it = self.layers.iter().peekable();

        while let Some(layer) = it.next() {
            // The output of the layer without applying the activation function
            let lin_output = hidden.dot(&layer.0) + &layer.1;

            // Hidden layers are activated, the output layer stays linear
            hidden = match it.peek() {
                Some(_) => lin_output.mapv(|x| activation(self.activation_function, x)),
                None => lin_output,
            };
        }

        hidden
    }

    /// Class probabilities for a set of instances - each instance is a row in "inputs"
    pub fn probabilities(&self, inputs: &ArrayView2<f64>) -> Array2<f64> {
        let mut scores = self.scores(inputs);

        for mut row in scores.axis_iter_mut(Axis(0)) {
            let probs = softmax(row.view());
            row.assign(&probs);
        }

        scores
    }
}

impl Classifier for NeuralNet {
    fn predict(&self, inputs: &ArrayView2<f64>) -> Array1<usize> {
        self.scores(inputs)
            .axis_iter(Axis(0))
            .map(argmax)
            .collect()
    }
}

impl MarginModel for NeuralNet {
    /// Logit difference between class 1 and class 0.
    /// Only meaningful for two-class networks; otherwise every score is zero
    fn margin(&self, inputs: &ArrayView2<f64>) -> Array1<f64> {
        let scores = self.scores(inputs);
        if scores.ncols() != 2 {
            return Array1::zeros(scores.nrows());
        }

        scores
            .axis_iter(Axis(0))
            .map(|row| row[1] - row[0])
            .collect()
    }
}

fn activation(name: ActivationFunction, z: f64) -> f64 {
    match name {
        ActivationFunction::ReLU => z.max(0f64),
        ActivationFunction::Sigmoid => (1f64 + (-z).exp()).recip(),
        ActivationFunction::Tanh => z.tanh(),
        ActivationFunction::Linear => z,
        ActivationFunction::LeakyReLU => z.max(0.01 * z),
    }
}

/// Index of the highest score; the first one wins ties
fn argmax(scores: ArrayView1<f64>) -> usize {
    scores
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &s)| {
            if s > best.1 {
                (i, s)
            } else {
                best
            }
        })
        .0
}

/// Softmax function - Convert scores into a probability distribution
fn softmax(scores: ArrayView1<f64>) -> Array1<f64> {
    let max = scores.fold(f64::NEG_INFINITY, |m, &x| m.max(x));
    // Shift by the max so exp never overflows
    let shifted = scores.mapv(|x| (x - max).exp());
    let sum = shifted.sum();

    shifted / sum
}
