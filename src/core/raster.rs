//! In-memory raster model shared by the masking stages: geospatial context,
//! typed band stacks, and the `RasterSource` seam through which bands are read.
use std::collections::HashMap;

use ndarray::{Array2, Array3, Axis};

use crate::error::Result;
use crate::types::SampleType;

/// Georeferencing carried from the image raster to the output, untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoContext {
    /// Affine geotransform ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height]),
    /// absent when the source has none
    pub geotransform: Option<[f64; 6]>,
    /// Spatial reference as WKT; empty when the source has none
    pub projection: String,
    /// Default-domain metadata key-value pairs
    pub metadata: HashMap<String, String>,
}

/// Bands × rows × cols sample stack in one of the supported numeric types.
#[derive(Debug, Clone, PartialEq)]
pub enum BandStack {
    UInt16(Array3<u16>),
    Float32(Array3<f32>),
}

impl BandStack {
    /// (bands, rows, cols)
    pub fn dim(&self) -> (usize, usize, usize) {
        match self {
            BandStack::UInt16(a) => a.dim(),
            BandStack::Float32(a) => a.dim(),
        }
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            BandStack::UInt16(_) => SampleType::UInt16,
            BandStack::Float32(_) => SampleType::Float32,
        }
    }
}

/// Image bands after masking; same shape and sample type as the source.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedImage {
    pub bands: BandStack,
}

impl MaskedImage {
    pub fn dim(&self) -> (usize, usize, usize) {
        self.bands.dim()
    }
}

/// Band-wise access to a georeferenced raster. Band indices are 1-based.
pub trait RasterSource {
    /// (rows, cols)
    fn size(&self) -> (usize, usize);
    fn band_count(&self) -> usize;
    fn sample_type(&self) -> Result<SampleType>;
    fn context(&self) -> &GeoContext;
    fn read_band_u8(&self, index: usize) -> Result<Array2<u8>>;
    fn read_band_u16(&self, index: usize) -> Result<Array2<u16>>;
    fn read_band_f32(&self, index: usize) -> Result<Array2<f32>>;
}

/// A raster held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    pub bands: BandStack,
    pub context: GeoContext,
}

impl MemoryRaster {
    pub fn new(bands: BandStack, context: GeoContext) -> Self {
        Self { bands, context }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index == 0 || index > self.band_count() {
            return Err(crate::io::GdalError::BandOutOfRange {
                index,
                bands: self.band_count(),
            }
            .into());
        }
        Ok(())
    }
}

impl RasterSource for MemoryRaster {
    fn size(&self) -> (usize, usize) {
        let (_, rows, cols) = self.bands.dim();
        (rows, cols)
    }

    fn band_count(&self) -> usize {
        self.bands.dim().0
    }

    fn sample_type(&self) -> Result<SampleType> {
        Ok(self.bands.sample_type())
    }

    fn context(&self) -> &GeoContext {
        &self.context
    }

    fn read_band_u8(&self, index: usize) -> Result<Array2<u8>> {
        self.check_index(index)?;
        Ok(match &self.bands {
            BandStack::UInt16(a) => a
                .index_axis(Axis(0), index - 1)
                .mapv(|v| v.min(u8::MAX as u16) as u8),
            BandStack::Float32(a) => a.index_axis(Axis(0), index - 1).mapv(|v| v as u8),
        })
    }

    fn read_band_u16(&self, index: usize) -> Result<Array2<u16>> {
        self.check_index(index)?;
        Ok(match &self.bands {
            BandStack::UInt16(a) => a.index_axis(Axis(0), index - 1).to_owned(),
            BandStack::Float32(a) => a.index_axis(Axis(0), index - 1).mapv(|v| v as u16),
        })
    }

    fn read_band_f32(&self, index: usize) -> Result<Array2<f32>> {
        self.check_index(index)?;
        Ok(match &self.bands {
            BandStack::UInt16(a) => a.index_axis(Axis(0), index - 1).mapv(f32::from),
            BandStack::Float32(a) => a.index_axis(Axis(0), index - 1).to_owned(),
        })
    }
}
