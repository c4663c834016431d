//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, SAFE, GDAL and parameter-file errors, and provides
//! semantic variants for the masking failures a caller may want to match on.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SAFE reader error: {0}")]
    Safe(#[from] crate::io::SafeError),

    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("Parameter file error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("No good mask pixels: no pixel carries any of the classes [{keep}]")]
    NoValidPixels { keep: String },

    #[error("Invalid input combination: {0}")]
    InvalidInputCombination(String),

    #[error("Zipped SAFE archives are not supported, extract first: {path:?}")]
    UnsupportedArchiveForm { path: PathBuf },

    #[error(
        "Shape mismatch: image is {image_rows}x{image_cols}, mask is {mask_rows}x{mask_cols}"
    )]
    ShapeMismatch {
        image_rows: usize,
        image_cols: usize,
        mask_rows: usize,
        mask_cols: usize,
    },

    #[error("Unsupported image sample type: {0}. Expected UInt16 or Float32")]
    UnsupportedSampleType(String),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },
}
