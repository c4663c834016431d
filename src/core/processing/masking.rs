use ndarray::{Array2, Array3, Axis, Zip};
use tracing::info;

use crate::core::processing::mask::InclusionMask;
use crate::core::raster::{BandStack, GeoContext, MaskedImage, RasterSource};
use crate::error::{Error, Result};
use crate::types::SampleType;

/// Sample types the mask can gate.
pub trait MaskSample: Copy {
    const ZERO: Self;
}

impl MaskSample for u16 {
    const ZERO: Self = 0;
}

impl MaskSample for f32 {
    const ZERO: Self = 0.0;
}

/// Zero every excluded pixel of `band` in place; included pixels pass through unchanged.
pub fn mask_band<T: MaskSample>(band: &mut Array2<T>, mask: &InclusionMask) {
    Zip::from(band)
        .and(mask.as_array())
        .for_each(|v, &m| {
            if m == 0 {
                *v = T::ZERO;
            }
        });
}

fn mask_all_bands<T, F>(
    count: usize,
    mask: &InclusionMask,
    mut read: F,
) -> Result<Array3<T>>
where
    T: MaskSample,
    F: FnMut(usize) -> Result<Array2<T>>,
{
    let (rows, cols) = mask.dim();
    let mut masked = Array3::from_elem((count, rows, cols), T::ZERO);
    for (i, mut slot) in masked.axis_iter_mut(Axis(0)).enumerate() {
        info!("Masking band {} of {}.", i + 1, count);
        let mut band = read(i + 1)?;
        if band.dim() != (rows, cols) {
            return Err(Error::ShapeMismatch {
                image_rows: band.nrows(),
                image_cols: band.ncols(),
                mask_rows: rows,
                mask_cols: cols,
            });
        }
        mask_band(&mut band, mask);
        slot.assign(&band);
    }
    Ok(masked)
}

/// Mask every band of `image` and return the stack with the image's georeferencing.
///
/// The image and mask grids must have identical dimensions.
pub fn apply_mask<R: RasterSource + ?Sized>(
    image: &R,
    mask: &InclusionMask,
) -> Result<(MaskedImage, GeoContext)> {
    let (image_rows, image_cols) = image.size();
    let (mask_rows, mask_cols) = mask.dim();
    if (image_rows, image_cols) != (mask_rows, mask_cols) {
        return Err(Error::ShapeMismatch {
            image_rows,
            image_cols,
            mask_rows,
            mask_cols,
        });
    }

    let count = image.band_count();
    let bands = match image.sample_type()? {
        SampleType::UInt16 => {
            BandStack::UInt16(mask_all_bands(count, mask, |i| image.read_band_u16(i))?)
        }
        SampleType::Float32 => {
            BandStack::Float32(mask_all_bands(count, mask, |i| image.read_band_f32(i))?)
        }
    };
    info!("Masking complete.");

    Ok((MaskedImage { bands }, image.context().clone()))
}
