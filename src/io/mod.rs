//! I/O layer for locating and importing Sentinel-2 SAFE products and
//! GDAL-backed rasters.
//! Provides the `sentinel2` SAFE importer, the `gdal` reader adapter, and
//! `writers` for compressed GeoTIFF output.
pub mod sentinel2;
pub use sentinel2::{AcquiredProduct, ProductMetadata, SafeError, SafeProduct};

pub mod gdal;
pub use self::gdal::{GdalError, GdalRasterReader};

pub mod writers;
