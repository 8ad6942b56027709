use super::Dataset;
use csv::ReaderBuilder;
use log::debug;
use ndarray::{Array1, Array2};
use serde::Deserialize;
use std::{fs::File, io::Read, path::Path};

use crate::error::{Result, VizError};

/// One line of a point file: `label,x0,x1`
#[derive(Debug, Deserialize)]
struct PointRecord {
    label: usize,
    x0: f64,
    x1: f64,
}

/// Parse a labeled 2-D dataset from any CSV source.
/// The first line is a header naming the columns `label`, `x0` and `x1`
pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut coords = Vec::new();
    let mut labels = Vec::new();

    for record in rdr.deserialize() {
        let record: PointRecord = record?;
        coords.push(record.x0);
        coords.push(record.x1);
        labels.push(record.label);
    }

    if labels.is_empty() {
        return Err(VizError::EmptyDataset);
    }

    let n = labels.len();
    let actual = coords.len();
    let data = Array2::from_shape_vec((n, 2), coords).map_err(|_| VizError::ShapeMismatch {
        what: "coordinates",
        expected: 2 * n,
        actual,
    })?;
    debug!("parsed {} labeled points", n);

    Dataset::new(data, Array1::from(labels))
}

/// Return the dataset stored in the CSV file at `path`
pub fn parse_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let file = File::open(path)?;

    read_dataset(file)
}
