#![doc = r#"
SCLMASK — cloud, shadow and snow masking for Sentinel-2 L2A imagery.

This crate masks a multi-band surface-reflectance raster with its companion
Scene Classification Layer (SCL). Pixels whose SCL class is not in the caller's
keep set are zeroed in every band, and the result is written as an
LZW-compressed GeoTIFF that carries the image's geotransform, spatial reference
and metadata. Output samples keep their native type (UInt16 or Float32) or are
rescaled to 8-bit. It powers the `sclmask` CLI and can be embedded in your own
Rust applications.

Optionally, a Level-2A SAFE product is imported first: bands are extracted and
resampled onto the 10 m grid, stacked into a VRT, and reprojected on request.

Requirements
------------
- GDAL development headers and runtime available on your system.
- GDAL command-line tools (`gdal_translate`, `gdalbuildvrt`, `gdalwarp`) on
  `PATH` for SAFE import.
- Rust 2024 edition toolchain.

Quick start: mask an image with its SCL raster
----------------------------------------------
```rust,no_run
use std::path::Path;
use sclmask::{mask_files_to_path, MaskParams, OutputEncoding, SclClass};

fn main() -> sclmask::Result<()> {
    let params = MaskParams {
        keep: vec![SclClass::Vegetation, SclClass::NotVegetated, SclClass::Water],
        encoding: OutputEncoding::Native,
        ..MaskParams::default()
    };

    let report = mask_files_to_path(
        Path::new("/data/S2A_stack.tif"),
        Path::new("/data/S2A_SCL.tif"),
        Path::new("/out/"),
        &params,
    )?;
    println!("{} pixels kept in {:?}", report.included_pixels, report.output);
    Ok(())
}
```

Import a SAFE product and mask it
---------------------------------
```rust,no_run
use std::path::Path;
use sclmask::{process_safe_to_path, DatasetType, MaskParams};

fn main() -> sclmask::Result<()> {
    let params = MaskParams {
        dataset: DatasetType::S2Oli,
        target_crs: Some("EPSG:2157".to_string()),
        ..MaskParams::default()
    };

    process_safe_to_path(
        Path::new("/data/S2A_MSIL2A_20220705T114401_N0400_R123_T29UNV_20220705T160523.SAFE"),
        Path::new("/out"),
        &params,
    )?;
    Ok(())
}
```

Working with arrays
-------------------
```rust
use ndarray::array;
use sclmask::{apply_mask, build_mask, BandStack, GeoContext, KeepSet, MemoryRaster};

fn main() -> sclmask::Result<()> {
    let image = MemoryRaster::new(
        BandStack::UInt16(array![[[100, 200], [300, 400]]]),
        GeoContext::default(),
    );
    let mask = build_mask(&array![[4, 4], [5, 0]], &KeepSet::from_codes([4, 5]))?;
    let (masked, _context) = apply_mask(&image, &mask)?;
    assert_eq!(masked.bands, BandStack::UInt16(array![[[100, 200], [300, 0]]]));
    Ok(())
}
```

Error handling
--------------
All public functions return `sclmask::Result<T>`; match on `sclmask::Error` to
handle specific cases.

```rust,no_run
use std::path::Path;
use sclmask::{mask_files_to_path, Error, MaskParams};

fn main() {
    let params = MaskParams::default();
    match mask_files_to_path(Path::new("img.tif"), Path::new("scl.tif"), Path::new("out"), &params) {
        Ok(report) => println!("wrote {:?}", report.output),
        Err(Error::NoValidPixels { keep }) => eprintln!("nothing left after masking with [{keep}]"),
        Err(Error::ShapeMismatch { .. }) => eprintln!("image and SCL grids differ"),
        Err(other) => eprintln!("{other}"),
    }
}
```

Useful modules
--------------
- [`api`] — high-level entry points.
- [`types`] — the SCL class table and encoding enums.
- [`core`] — raster model and masking stages.
- [`io`] — SAFE import, GDAL reader and GeoTIFF writer.
- [`error`] — crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::params::MaskParams;
pub use crate::core::raster::{BandStack, GeoContext, MaskedImage, MemoryRaster, RasterSource};
pub use error::{Error, Result};
pub use types::{DatasetType, OutputEncoding, PixelType, SampleType, SclClass};

// Masking stages
pub use crate::core::processing::mask::{InclusionMask, KeepSet, build_mask};
pub use crate::core::processing::masking::apply_mask;
pub use crate::core::processing::pipeline::{MaskReport, run_masking};
pub use crate::core::processing::save::save_masked_image;

// Readers and SAFE import
pub use io::gdal::{GdalError, GdalRasterReader};
pub use io::sentinel2::{AcquiredProduct, SafeError, SafeProduct, import_product};

// High-level API re-exports
pub use api::{mask_files_to_path, process_safe_to_path, resolve_output_path};
