use gdal::raster::{GdalDataType, GdalType};
use gdal::{Dataset, Metadata, errors::GdalError as GdalCrateError};
use ndarray::Array2;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::raster::{GeoContext, RasterSource};
use crate::error::Error;
use crate::types::SampleType;

/// Errors encountered when using GDAL reader
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Dimension mismatch: expected {0}x{1}, got {2} samples")]
    DimensionMismatch(usize, usize, usize),
    #[error("Band index {index} out of range (raster has {bands} bands)")]
    BandOutOfRange { index: usize, bands: usize },
}

/// Reader for GDAL-supported rasters (GeoTIFF, VRT, ...)
///
/// The dataset handle is closed when the reader is dropped.
pub struct GdalRasterReader {
    pub path: PathBuf,
    pub dataset: Dataset,
    pub size_x: usize,
    pub size_y: usize,
    pub bands: usize,
    pub context: GeoContext,
}

impl GdalRasterReader {
    /// Open a GDAL-supported dataset and capture its georeferencing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GdalError> {
        let dataset = Dataset::open(path.as_ref())?;
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat("No raster bands found".into()));
        }
        let geotransform = match dataset.geo_transform() {
            Ok(gt) => Some(gt),
            Err(_) => {
                warn!("No geotransform in {:?}", path.as_ref());
                None
            }
        };
        let projection = dataset.projection();
        // Collect metadata entries (domain "")
        let mut metadata = HashMap::new();
        if let Some(entries) = dataset.metadata_domain("") {
            for entry in entries {
                if let Some((key, val)) = entry.split_once('=') {
                    metadata.insert(key.to_string(), val.to_string());
                }
            }
        }
        debug!(
            "Opened {:?}: {}x{} pixels, {} bands, {} metadata items",
            path.as_ref(),
            size_x,
            size_y,
            bands,
            metadata.len()
        );
        Ok(GdalRasterReader {
            path: path.as_ref().to_path_buf(),
            dataset,
            size_x,
            size_y,
            bands,
            context: GeoContext {
                geotransform,
                projection,
                metadata,
            },
        })
    }

    /// Read a single band (1-based index) as an ndarray of shape (height, width)
    pub fn read_band<T: GdalType + Copy>(&self, index: usize) -> Result<Array2<T>, GdalError> {
        if index == 0 || index > self.bands {
            return Err(GdalError::BandOutOfRange {
                index,
                bands: self.bands,
            });
        }
        let band = self.dataset.rasterband(index)?;
        let window = (self.size_x, self.size_y);
        let buf = band.read_as::<T>((0, 0), window, window, None)?;
        let data_vec = buf.data().to_vec();
        let len = data_vec.len();
        Array2::from_shape_vec((self.size_y, self.size_x), data_vec)
            .map_err(|_| GdalError::DimensionMismatch(self.size_y, self.size_x, len))
    }

    /// GDAL data type of the first band
    pub fn band_type(&self) -> Result<GdalDataType, GdalError> {
        Ok(self.dataset.rasterband(1)?.band_type())
    }
}

impl RasterSource for GdalRasterReader {
    fn size(&self) -> (usize, usize) {
        (self.size_y, self.size_x)
    }

    fn band_count(&self) -> usize {
        self.bands
    }

    fn sample_type(&self) -> crate::Result<SampleType> {
        match self.band_type()? {
            GdalDataType::UInt16 => Ok(SampleType::UInt16),
            GdalDataType::Float32 => Ok(SampleType::Float32),
            other => Err(Error::UnsupportedSampleType(format!("{:?}", other))),
        }
    }

    fn context(&self) -> &GeoContext {
        &self.context
    }

    fn read_band_u8(&self, index: usize) -> crate::Result<Array2<u8>> {
        Ok(self.read_band::<u8>(index)?)
    }

    fn read_band_u16(&self, index: usize) -> crate::Result<Array2<u16>> {
        Ok(self.read_band::<u16>(index)?)
    }

    fn read_band_f32(&self, index: usize) -> crate::Result<Array2<f32>> {
        Ok(self.read_band::<f32>(index)?)
    }
}
