use ndarray::{Array1, ArrayView2};

pub mod neural_net;

/// A trained classifier: maps every row of `inputs` to a class label.
/// The output has one label per input row, in the same order.
pub trait Classifier {
    fn predict(&self, inputs: &ArrayView2<f64>) -> Array1<usize>;
}

/// A continuous decision score whose -1 and +1 level sets bound the margin
pub trait MarginModel {
    fn margin(&self, inputs: &ArrayView2<f64>) -> Array1<f64>;
}

impl<F> Classifier for F
where
    F: Fn(&ArrayView2<f64>) -> Array1<usize>,
{
    fn predict(&self, inputs: &ArrayView2<f64>) -> Array1<usize> {
        self(inputs)
    }
}

impl<F> MarginModel for F
where
    F: Fn(&ArrayView2<f64>) -> Array1<f64>,
{
    fn margin(&self, inputs: &ArrayView2<f64>) -> Array1<f64> {
        self(inputs)
    }
}
