//! High-level, ergonomic library API: mask an image/SCL pair to a file, or
//! import a SAFE product and mask it in one call. Prefer these entrypoints over
//! the low-level processing modules when integrating SCLMASK.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::params::MaskParams;
use crate::core::processing::pipeline::{MaskReport, run_masking};
use crate::error::{Error, Result};
use crate::io::gdal::GdalRasterReader;
use crate::io::sentinel2::{SafeProduct, find_zipped_product, import_product};

/// Suffix appended to the input file stem for auto-derived output names
pub const MASKED_SUFFIX: &str = "_masked";

fn has_raster_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
        .unwrap_or(false)
}

/// Directory that will hold the output (and any imported intermediates).
pub fn output_dir(outpath: &Path) -> PathBuf {
    if has_raster_extension(outpath) {
        match outpath.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    } else {
        outpath.to_path_buf()
    }
}

/// Resolve the output file for `input`.
///
/// A `.tif`/`.tiff` `outpath` is used as-is; anything else is treated as a
/// directory and the file becomes `<outpath>/<input stem>_masked.tif`.
/// The output directory is created when missing.
pub fn resolve_output_path(outpath: &Path, input: &Path) -> Result<PathBuf> {
    let dir = output_dir(outpath);
    if !dir.is_dir() {
        info!("Creating output directory: {:?}", dir);
        fs::create_dir_all(&dir)?;
    }
    if has_raster_extension(outpath) {
        return Ok(outpath.to_path_buf());
    }
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::InvalidArgument {
            arg: "input",
            value: input.display().to_string(),
        })?;
    let output = dir.join(format!("{}{}.tif", stem, MASKED_SUFFIX));
    info!("Output file will be saved to: {:?}", output);
    Ok(output)
}

/// Mask `image` with the SCL raster `mask` and write the result under `outpath`.
pub fn mask_files_to_path(
    image: &Path,
    mask: &Path,
    outpath: &Path,
    params: &MaskParams,
) -> Result<MaskReport> {
    for (arg, path) in [("--infile", image), ("--maskfile", mask)] {
        if !path.is_file() {
            return Err(Error::InvalidInputCombination(format!(
                "{} does not exist or is not a file: {:?}",
                arg, path
            )));
        }
    }
    let output = resolve_output_path(outpath, image)?;

    info!("Opening SCL mask file: {:?}", mask);
    let classification = GdalRasterReader::open(mask)?;
    info!("Opening image file: {:?}", image);
    let image = GdalRasterReader::open(image)?;

    run_masking(
        &image,
        &classification,
        &params.keep_set(),
        params.encoding,
        &output,
    )
}

/// Import a Sentinel-2 L2A SAFE product into the output directory and mask it.
///
/// Intermediate band files, the VRT stack and any warped rasters are kept next
/// to the output.
pub fn process_safe_to_path(
    safe: &Path,
    outpath: &Path,
    params: &MaskParams,
) -> Result<MaskReport> {
    if let Some(path) = find_zipped_product(safe) {
        return Err(Error::UnsupportedArchiveForm { path });
    }
    let product = SafeProduct::locate(safe)?;

    let dir = output_dir(outpath);
    if !dir.is_dir() {
        info!("Creating output directory: {:?}", dir);
        fs::create_dir_all(&dir)?;
    }
    let acquired = import_product(&product, params.dataset, &dir, params.target_crs.as_deref())?;
    info!(
        "Imported {} (acquired {})",
        acquired.product_id, acquired.acquisition_date
    );

    mask_files_to_path(&acquired.image, &acquired.classification, outpath, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_tif_output_is_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("nested").join("result.TIF");
        let resolved = resolve_output_path(&out, Path::new("/data/scene.vrt")).unwrap();
        assert_eq!(resolved, out);
        assert!(tmp.path().join("nested").is_dir());
    }

    #[test]
    fn directory_output_derives_name_from_input() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");
        let resolved = resolve_output_path(&dir, Path::new("/data/S2A_scene.vrt")).unwrap();
        assert_eq!(resolved, dir.join("S2A_scene_masked.tif"));
        assert!(dir.is_dir());
    }

    #[test]
    fn missing_inputs_are_an_invalid_combination() {
        let tmp = tempfile::tempdir().unwrap();
        let err = mask_files_to_path(
            &tmp.path().join("image.tif"),
            &tmp.path().join("scl.tif"),
            tmp.path(),
            &MaskParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInputCombination(_)));
    }

    #[test]
    fn zipped_safe_is_rejected_before_processing() {
        let tmp = tempfile::tempdir().unwrap();
        let zip = tmp.path().join("S2A_MSIL2A_20220705T114401_N0400_R123_T29UNV_20220705T160523.zip");
        fs::write(&zip, b"PK").unwrap();
        let out = tmp.path().join("out");
        let err = process_safe_to_path(&zip, &out, &MaskParams::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedArchiveForm { .. }));
        assert!(!out.exists());
    }
}
