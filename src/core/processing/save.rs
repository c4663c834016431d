use std::path::Path;

use tracing::info;

use crate::core::processing::encode::rescale_to_byte;
use crate::core::raster::{BandStack, GeoContext, MaskedImage};
use crate::error::{Error, Result};
use crate::io::writers::tiff::write_geotiff;
use crate::types::{OutputEncoding, PixelType};

/// Write a masked image to `output` as a compressed GeoTIFF in the requested encoding.
///
/// Returns the pixel type used on disk.
pub fn save_masked_image(
    image: &MaskedImage,
    encoding: OutputEncoding,
    context: &GeoContext,
    output: &Path,
) -> Result<PixelType> {
    let pixel_type = PixelType::resolve(encoding, image.bands.sample_type());
    info!("Creating output file: {:?} ({})", output, pixel_type);

    match (pixel_type, &image.bands) {
        (PixelType::Byte, bands) => write_geotiff(output, &rescale_to_byte(bands), context)?,
        (PixelType::NativeUint16, BandStack::UInt16(data)) => write_geotiff(output, data, context)?,
        (PixelType::NativeFloat32, BandStack::Float32(data)) => {
            write_geotiff(output, data, context)?
        }
        (pixel_type, bands) => {
            return Err(Error::UnsupportedSampleType(format!(
                "{:?} stack cannot be written as {}",
                bands.sample_type(),
                pixel_type
            )));
        }
    }

    info!("Output file saved to disk.");
    Ok(pixel_type)
}
