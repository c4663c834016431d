//! Raster writers for masked outputs.
pub mod tiff;
