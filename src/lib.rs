//! Diagnostic plots for interactive classifier experiments: decision
//! boundaries over a labeled 2-D dataset, normalized image display and
//! answer fingerprints.

pub mod error;
pub mod fingerprint;
pub mod model;
pub mod parsing;
pub mod plotting;

pub use error::{Result, VizError};
