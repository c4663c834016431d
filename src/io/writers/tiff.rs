use gdal::cpl::CslStringList;
use gdal::raster::{Buffer, GdalType};
use gdal::{DriverManager, Metadata};
use ndarray::{Array3, Axis};
use std::path::Path;
use tracing::info;

use crate::core::raster::GeoContext;
use crate::error::Result;
use crate::io::GdalError;

#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o644;

fn creation_options() -> std::result::Result<CslStringList, GdalError> {
    let mut options = CslStringList::new();
    options.add_string("COMPRESS=LZW")?;
    Ok(options)
}

/// Write a bands × rows × cols stack as an LZW-compressed GeoTIFF.
///
/// Georeferencing and metadata are set on the dataset as a whole. The file is
/// written next to `output` under a temporary name and renamed into place once
/// closed, so a failed write never leaves a partial file at `output`.
pub fn write_geotiff<T: GdalType + Copy>(
    output: &Path,
    data: &Array3<T>,
    context: &GeoContext,
) -> Result<()> {
    let (bands, rows, cols) = data.dim();
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("masked");
    let prefix = format!(".{}_", stem);
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix).suffix(".tif");
    // Scratch files default to 0600; the output gets the usual umask-filtered mode
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(OUTPUT_MODE));
    }
    let tmp = builder.tempfile_in(dir)?.into_temp_path();

    {
        let driver = DriverManager::get_driver_by_name("GTiff").map_err(GdalError::from)?;
        let options = creation_options()?;
        let mut ds = driver
            .create_with_band_type_with_options::<T, _>(&*tmp, cols, rows, bands, &options)
            .map_err(GdalError::from)?;

        if let Some(gt) = context.geotransform {
            ds.set_geo_transform(&gt).map_err(GdalError::from)?;
        }
        if !context.projection.is_empty() {
            ds.set_projection(&context.projection)
                .map_err(GdalError::from)?;
        }
        let mut keys: Vec<&String> = context.metadata.keys().collect();
        keys.sort();
        for key in keys {
            ds.set_metadata_item(key, &context.metadata[key], "")
                .map_err(GdalError::from)?;
        }

        for (i, band_data) in data.axis_iter(Axis(0)).enumerate() {
            info!("Writing band {} of {}.", i + 1, bands);
            let mut band = ds.rasterband(i + 1).map_err(GdalError::from)?;
            let mut buf = Buffer::new((cols, rows), band_data.iter().copied().collect());
            band.write((0, 0), (cols, rows), &mut buf)
                .map_err(GdalError::from)?;
        }
        // Dataset is flushed and closed here
    }

    tmp.persist(output).map_err(|e| e.error)?;
    Ok(())
}
