use thiserror::Error;

#[derive(Debug, Error)]
pub enum VizError {
    #[error("{what}: expected {expected} entries, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("coordinates need exactly 2 columns, got {columns}")]
    ColumnCount { columns: usize },
    #[error("dataset is empty")]
    EmptyDataset,
    #[error("transparency must lie in [0, 1], got {0}")]
    InvalidAlpha(f64),
    #[error("sampling grid needs at least one point, got {0}")]
    InvalidPointCount(usize),
    #[error("no palette color for class label {label}")]
    MissingColor { label: usize },
    #[error("image should have either 0, 1, or 3 color channels, got {channels}")]
    UnsupportedChannels { channels: usize },
    #[error("image must be 2- or 3-dimensional, got {ndim} dimensions")]
    UnsupportedRank { ndim: usize },
    #[error("value {0:?} is not ASCII")]
    NonAscii(String),
    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),
    #[error("invalid weights: {0}")]
    InvalidWeights(String),
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, VizError>;
