use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::processing::mask::{KeepSet, build_mask};
use crate::core::processing::masking::apply_mask;
use crate::core::processing::save::save_masked_image;
use crate::core::raster::RasterSource;
use crate::error::Result;
use crate::types::{OutputEncoding, PixelType};

/// Summary of one masking run
#[derive(Debug, Clone, PartialEq)]
pub struct MaskReport {
    pub output: PathBuf,
    pub bands: usize,
    pub rows: usize,
    pub cols: usize,
    pub included_pixels: usize,
    pub pixel_type: PixelType,
}

/// Mask `image` with the SCL `classification` (band 1) and write the result to `output`.
///
/// Nothing is written when the mask retains no pixel or the grids differ in size.
pub fn run_masking<I, C>(
    image: &I,
    classification: &C,
    keep: &KeepSet,
    encoding: OutputEncoding,
    output: &Path,
) -> Result<MaskReport>
where
    I: RasterSource + ?Sized,
    C: RasterSource + ?Sized,
{
    let scl = classification.read_band_u8(1)?;
    let mask = build_mask(&scl, keep)?;
    drop(scl);

    let (masked, context) = apply_mask(image, &mask)?;
    let (bands, rows, cols) = masked.dim();
    info!(
        "Masked image matrix dimensions: {} bands, {} rows, {} columns.",
        bands, rows, cols
    );

    let pixel_type = save_masked_image(&masked, encoding, &context, output)?;

    Ok(MaskReport {
        output: output.to_path_buf(),
        bands,
        rows,
        cols,
        included_pixels: mask.included_count(),
        pixel_type,
    })
}
