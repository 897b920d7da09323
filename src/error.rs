use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced when loading or normalizing a curve dataset.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DatasetError {
    #[error("dataset has no \"curves\" value or an unrecognized shape")]
    Malformed,

    #[error("failed to read dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by percentile classification.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ClassifyError {
    /// No curve in the set could produce a y-value at the query x, so the
    /// point can be neither bracketed nor matched.
    #[error("no curve data available at x={x}")]
    NoCurveData { x: f32 },
}
