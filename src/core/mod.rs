//! Core processing building blocks: parameters, the in-memory raster model,
//! and the masking stages. These are primitives consumed by the high-level
//! `api` module.
pub mod params;
pub mod processing;
pub mod raster;
