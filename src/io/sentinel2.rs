use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::types::DatasetType;
use gdal::Dataset;

/// Errors encountered when importing Sentinel-2 SAFE products
#[derive(Debug, Error)]
pub enum SafeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
    #[error("No {file} found for SAFE product at {path:?}")]
    MissingMetadata { file: &'static str, path: PathBuf },
    #[error("Cannot parse Sentinel-2 product name: {0}")]
    InvalidProductName(String),
    #[error("Unsupported SAFE product type: {0}")]
    UnsupportedProduct(String),
    #[error("Invalid target CRS `{0}`, expected AUTHORITY:CODE (e.g. EPSG:2172)")]
    InvalidTargetCrs(String),
    #[error("{tool} failed: {status}")]
    Command { tool: &'static str, status: String },
}

/// Product metadata file of a Level-2A SAFE
pub const L2A_METADATA_FILE: &str = "MTD_MSIL2A.xml";

/// Bands of each SENTINEL2_L2A subdataset, in subdataset band order
const SUBDATASETS: [(&str, &[&str]); 3] = [
    ("10m", &["4", "3", "2", "8"]),
    ("20m", &["5", "6", "7", "8a", "11", "12", "SCL"]),
    ("60m", &["1", "9"]),
];

/// SCL sits two bands past its table position in the 20m subdataset
const SCL_BAND_OFFSET: usize = 2;

/// Band whose 10m grid every extracted band is resampled onto
const REFERENCE_BAND: (&str, &str) = ("10m", "4");

/// A Sentinel-2 L2A product located on disk
#[derive(Debug, Clone, PartialEq)]
pub struct SafeProduct {
    pub safe_dir: PathBuf,
    pub metadata_file: PathBuf,
    /// First 60 characters of the product name
    pub product_id: String,
    pub satellite: String,
    pub acquisition_date: NaiveDate,
    pub utm_zone: u8,
    /// UTM EPSG code as used in subdataset names, e.g. `EPSG_32629`
    pub epsg: String,
}

/// Product-level fields read from `MTD_MSIL2A.xml`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductMetadata {
    pub product_uri: String,
    pub product_type: String,
    pub spacecraft: String,
    pub start_time: String,
    pub processing_baseline: String,
}

/// Files produced by importing a SAFE product
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredProduct {
    pub product_id: String,
    /// Band stack (VRT, or GeoTIFF when warped)
    pub image: PathBuf,
    /// SCL raster on the same grid as `image`
    pub classification: PathBuf,
    pub acquisition_date: NaiveDate,
}

/// Return the zipped product at or directly inside `path`, if any.
pub fn find_zipped_product(path: &Path) -> Option<PathBuf> {
    let is_zip = |p: &Path| {
        p.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("zip"))
            .unwrap_or(false)
    };
    if is_zip(path) {
        return Some(path.to_path_buf());
    }
    if path.is_dir() && !path.join(L2A_METADATA_FILE).is_file() {
        let entries = fs::read_dir(path).ok()?;
        for entry in entries.flatten() {
            let p = entry.path();
            if p.is_file() && is_zip(&p) {
                return Some(p);
            }
        }
    }
    None
}

impl SafeProduct {
    /// Locate a product from its `.SAFE` directory or its `MTD_MSIL2A.xml` file.
    pub fn locate<P: AsRef<Path>>(path: P) -> Result<Self, SafeError> {
        let path = path.as_ref();
        let is_xml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("xml"))
            .unwrap_or(false);

        let (safe_dir, metadata_file) = if path.is_file() && is_xml {
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (dir, path.to_path_buf())
        } else if path.is_dir() && path.join(L2A_METADATA_FILE).is_file() {
            (path.to_path_buf(), path.join(L2A_METADATA_FILE))
        } else {
            return Err(SafeError::MissingMetadata {
                file: L2A_METADATA_FILE,
                path: path.to_path_buf(),
            });
        };

        let dir_name = safe_dir
            .canonicalize()
            .unwrap_or_else(|_| safe_dir.clone())
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| SafeError::InvalidProductName(safe_dir.display().to_string()))?;

        Self::from_name(&dir_name, safe_dir, metadata_file)
    }

    /// Parse the product naming convention
    /// `MMM_MSIL2A_YYYYMMDDTHHMMSS_Nxxyy_ROOO_Txxxxx_<discriminator>`.
    pub fn from_name(
        name: &str,
        safe_dir: PathBuf,
        metadata_file: PathBuf,
    ) -> Result<Self, SafeError> {
        let invalid = || SafeError::InvalidProductName(name.to_string());
        let product_id: String = name.chars().take(60).collect();
        let parts: Vec<&str> = name.split('_').collect();
        if parts.len() < 6 {
            return Err(invalid());
        }

        let satellite = parts[0].to_string();
        let date_str = parts[2].get(..8).ok_or_else(invalid)?;
        let acquisition_date =
            NaiveDate::parse_from_str(date_str, "%Y%m%d").map_err(|_| invalid())?;

        // Tile: T + UTM zone (2 digits) + latitude band + square id
        let tile = parts[5];
        if !tile.starts_with('T') {
            return Err(invalid());
        }
        let utm_zone: u8 = tile
            .get(1..3)
            .and_then(|z| z.parse().ok())
            .filter(|z| (1..=60).contains(z))
            .ok_or_else(invalid)?;
        let latitude_band = tile.chars().nth(3).ok_or_else(invalid)?;
        let hemisphere = match latitude_band.to_ascii_uppercase() {
            'C'..='M' => 7,
            'N'..='X' => 6,
            _ => return Err(invalid()),
        };
        let epsg = format!("EPSG_32{}{:02}", hemisphere, utm_zone);

        Ok(SafeProduct {
            safe_dir,
            metadata_file,
            product_id,
            satellite,
            acquisition_date,
            utm_zone,
            epsg,
        })
    }

    /// GDAL subdataset name for one resolution group
    pub fn subdataset(&self, resolution: &str) -> String {
        format!(
            "SENTINEL2_L2A:{}:{}:{}",
            self.metadata_file.display(),
            resolution,
            self.epsg
        )
    }

    /// Read product-level fields from the product metadata file
    pub fn read_metadata(&self) -> Result<ProductMetadata, SafeError> {
        parse_product_metadata(&self.metadata_file)
    }
}

/// Parse the `Product_Info` fields of an `MTD_MSIL2A.xml` file
pub fn parse_product_metadata(path: &Path) -> Result<ProductMetadata, SafeError> {
    let mut reader = Reader::from_file(path)?;
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut curr = String::new();
    let mut meta = ProductMetadata::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                curr = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
            }
            Event::End(_) => curr.clear(),
            Event::Text(e) => {
                let txt = e.unescape()?;
                match curr.as_str() {
                    "PRODUCT_URI" => meta.product_uri = txt.to_string(),
                    "PRODUCT_TYPE" => meta.product_type = txt.to_string(),
                    "SPACECRAFT_NAME" => meta.spacecraft = txt.to_string(),
                    "PRODUCT_START_TIME" => meta.start_time = txt.to_string(),
                    "PROCESSING_BASELINE" => meta.processing_baseline = txt.to_string(),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(meta)
}

fn run_tool(tool: &'static str, args: &[String]) -> Result<(), SafeError> {
    debug!("Running {} {}", tool, args.join(" "));
    let status = Command::new(tool)
        .args(args)
        .status()
        .map_err(|e| SafeError::Command {
            tool,
            status: format!("exec error: {}", e),
        })?;
    if !status.success() {
        return Err(SafeError::Command {
            tool,
            status: status.to_string(),
        });
    }
    Ok(())
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// `gdal_translate` arguments extracting one band onto the reference grid
pub fn translate_args(
    subdataset: &str,
    band: usize,
    size: (usize, usize),
    resample: &str,
    output: &Path,
) -> Vec<String> {
    vec![
        "-of".into(),
        "GTiff".into(),
        "-b".into(),
        band.to_string(),
        "-outsize".into(),
        size.0.to_string(),
        size.1.to_string(),
        "-r".into(),
        resample.into(),
        "-a_nodata".into(),
        "0".into(),
        subdataset.into(),
        path_arg(output),
    ]
}

/// `gdalbuildvrt` arguments stacking one source file per band
pub fn build_vrt_args(output: &Path, sources: &[PathBuf]) -> Vec<String> {
    let mut args: Vec<String> = vec!["-overwrite".into(), "-separate".into(), path_arg(output)];
    args.extend(sources.iter().map(|p| path_arg(p)));
    args
}

/// `gdalwarp` arguments reprojecting `input` to `target_crs`
pub fn warp_args(input: &Path, output: &Path, target_crs: &str, resample: &str) -> Vec<String> {
    vec![
        "-overwrite".into(),
        "-of".into(),
        "GTiff".into(),
        "-t_srs".into(),
        target_crs.into(),
        "-r".into(),
        resample.into(),
        path_arg(input),
        path_arg(output),
    ]
}

/// Directory name for warped outputs: the code part of `AUTHORITY:CODE`
pub fn projection_dir_name(target_crs: &str) -> Result<&str, SafeError> {
    match target_crs.split_once(':') {
        Some((auth, code)) if !auth.is_empty() && !code.is_empty() => Ok(code),
        _ => Err(SafeError::InvalidTargetCrs(target_crs.to_string())),
    }
}

/// One `gdal_translate` extraction from a resolution subdataset
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionStep {
    pub resolution: &'static str,
    pub band: &'static str,
    /// 1-based band index within the subdataset
    pub index: usize,
    pub resample: &'static str,
    pub output: PathBuf,
}

/// Extractions for `dataset` in subdataset order, the SCL layer included.
pub fn plan_extraction(
    product_id: &str,
    dataset: DatasetType,
    output_dir: &Path,
) -> Vec<ExtractionStep> {
    let band_list = dataset.band_list();
    let mut steps = Vec::new();
    for (resolution, names) in SUBDATASETS {
        for (pos, &band) in names.iter().enumerate() {
            if band == "SCL" {
                steps.push(ExtractionStep {
                    resolution,
                    band,
                    index: pos + 1 + SCL_BAND_OFFSET,
                    resample: "nearest",
                    output: output_dir.join(format!("{}_SCL.tif", product_id)),
                });
            } else if band_list.contains(&band) {
                steps.push(ExtractionStep {
                    resolution,
                    band,
                    index: pos + 1,
                    resample: "bilinear",
                    output: output_dir.join(format!("{}_B{}.tif", product_id, band)),
                });
            }
        }
    }
    steps
}

/// Extract the selected bands and SCL at 10m, stack them into a VRT, and
/// optionally warp both to `target_crs`. All files are written under `output_dir`.
pub fn import_product(
    product: &SafeProduct,
    dataset: DatasetType,
    output_dir: &Path,
    target_crs: Option<&str>,
) -> Result<AcquiredProduct, SafeError> {
    info!(
        "Now processing scene: {} to type {}.",
        product.product_id, dataset
    );
    let meta = product.read_metadata()?;
    if meta.product_type.is_empty() {
        warn!("No PRODUCT_TYPE in {:?}", product.metadata_file);
    } else if !meta.product_type.to_uppercase().ends_with("2A") {
        return Err(SafeError::UnsupportedProduct(meta.product_type));
    }
    if !meta.spacecraft.is_empty() {
        info!(
            "{} product acquired {} (processing baseline {})",
            meta.spacecraft, meta.start_time, meta.processing_baseline
        );
    }
    if let Some(crs) = target_crs {
        projection_dir_name(crs)?;
    }

    let band_list = dataset.band_list();
    let pid = &product.product_id;

    // Reference 10m grid
    let reference = Dataset::open(product.subdataset(REFERENCE_BAND.0))?;
    let grid = reference.raster_size();
    drop(reference);
    debug!("Reference grid: {}x{}", grid.0, grid.1);

    let mut scl_file = None;
    for step in plan_extraction(pid, dataset, output_dir) {
        if step.band == "SCL" {
            info!("Now extracting the SCL layer at 10m spatial resolution.");
            scl_file = Some(step.output.clone());
        } else if step.resolution == REFERENCE_BAND.0 {
            info!("Now extracting band {}.", step.band);
        } else {
            info!("Now extracting band {} at 10m spatial resolution.", step.band);
        }
        run_tool(
            "gdal_translate",
            &translate_args(
                &product.subdataset(step.resolution),
                step.index,
                grid,
                step.resample,
                &step.output,
            ),
        )?;
    }

    info!("Stacking bands into a VRT.");
    let vrt = output_dir.join(format!("{}.vrt", pid));
    let sources: Vec<PathBuf> = band_list
        .iter()
        .map(|b| output_dir.join(format!("{}_B{}.tif", pid, b)))
        .collect();
    run_tool("gdalbuildvrt", &build_vrt_args(&vrt, &sources))?;

    let (image, classification) = match target_crs {
        Some(crs) => {
            let proj_dir = output_dir.join(projection_dir_name(crs)?);
            fs::create_dir_all(&proj_dir)?;
            info!("Bands stacked. Warping to {}.", crs);
            let warped = proj_dir.join(format!("{}.tif", pid));
            run_tool("gdalwarp", &warp_args(&vrt, &warped, crs, "bilinear"))?;
            info!("Bands warped to {}.", crs);
            info!("Warping SCL layer to {}", crs);
            let warped_scl = proj_dir.join(format!("{}_SCL.tif", pid));
            run_tool("gdalwarp", &warp_args(&scl_file, &warped_scl, crs, "near"))?;
            (warped, warped_scl)
        }
        None => (vrt, scl_file),
    };

    Ok(AcquiredProduct {
        product_id: pid.clone(),
        image,
        classification,
        acquisition_date: product.acquisition_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "S2A_MSIL2A_20220705T114401_N0400_R123_T29UNV_20220705T160523.SAFE";

    fn product(name: &str) -> Result<SafeProduct, SafeError> {
        SafeProduct::from_name(name, PathBuf::from(name), PathBuf::from(name).join(L2A_METADATA_FILE))
    }

    #[test]
    fn parses_product_name() {
        let p = product(NAME).unwrap();
        assert_eq!(
            p.product_id,
            "S2A_MSIL2A_20220705T114401_N0400_R123_T29UNV_20220705T160523"
        );
        assert_eq!(p.satellite, "S2A");
        assert_eq!(p.acquisition_date, NaiveDate::from_ymd_opt(2022, 7, 5).unwrap());
        assert_eq!(p.utm_zone, 29);
        assert_eq!(p.epsg, "EPSG_32629");
    }

    #[test]
    fn southern_tiles_use_south_utm() {
        let p = product("S2B_MSIL2A_20230110T074229_N0509_R092_T35JPM_20230110T100000.SAFE")
            .unwrap();
        assert_eq!(p.epsg, "EPSG_32735");
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(product("not_a_product").is_err());
        assert!(product("S2A_MSIL2A_2022_N0400_R123_T29UNV_X").is_err());
        assert!(product("S2A_MSIL2A_20220705T114401_N0400_R123_X29UNV_X").is_err());
        assert!(product("S2A_MSIL2A_20220705T114401_N0400_R123_T99UNV_X").is_err());
    }

    #[test]
    fn subdataset_name() {
        let p = product(NAME).unwrap();
        assert_eq!(
            p.subdataset("20m"),
            format!("SENTINEL2_L2A:{}/MTD_MSIL2A.xml:20m:EPSG_32629", NAME)
        );
    }

    #[test]
    fn locates_product_from_directory_or_xml() {
        let tmp = tempfile::tempdir().unwrap();
        let safe = tmp.path().join(NAME);
        fs::create_dir(&safe).unwrap();
        assert!(matches!(
            SafeProduct::locate(&safe),
            Err(SafeError::MissingMetadata { .. })
        ));
        fs::write(safe.join(L2A_METADATA_FILE), "<root/>").unwrap();

        let from_dir = SafeProduct::locate(&safe).unwrap();
        let from_xml = SafeProduct::locate(safe.join(L2A_METADATA_FILE)).unwrap();
        assert_eq!(from_dir.metadata_file, safe.join(L2A_METADATA_FILE));
        assert_eq!(from_dir.product_id, from_xml.product_id);
        assert_eq!(from_dir.epsg, "EPSG_32629");
    }

    #[test]
    fn detects_zipped_products() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(
            find_zipped_product(Path::new("/data/S2A_product.zip")),
            Some(PathBuf::from("/data/S2A_product.zip"))
        );
        assert_eq!(find_zipped_product(tmp.path()), None);
        let zip = tmp.path().join("S2A_product.ZIP");
        fs::write(&zip, b"PK").unwrap();
        assert_eq!(find_zipped_product(tmp.path()), Some(zip));
    }

    #[test]
    fn reads_product_info() {
        let tmp = tempfile::tempdir().unwrap();
        let xml = tmp.path().join(L2A_METADATA_FILE);
        fs::write(
            &xml,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<n1:Level-2A_User_Product xmlns:n1="https://psd-14.sentinel2.eo.esa.int/PSD/User_Product_Level-2A.xsd">
  <n1:General_Info>
    <Product_Info>
      <PRODUCT_START_TIME>2022-07-05T11:44:01.024Z</PRODUCT_START_TIME>
      <PRODUCT_URI>S2A_MSIL2A_20220705T114401_N0400_R123_T29UNV_20220705T160523.SAFE</PRODUCT_URI>
      <PROCESSING_LEVEL>Level-2A</PROCESSING_LEVEL>
      <PRODUCT_TYPE>S2MSI2A</PRODUCT_TYPE>
      <PROCESSING_BASELINE>04.00</PROCESSING_BASELINE>
      <Datatake datatakeIdentifier="GS2A_20220705T114401_036753_N04.00">
        <SPACECRAFT_NAME>Sentinel-2A</SPACECRAFT_NAME>
      </Datatake>
    </Product_Info>
  </n1:General_Info>
</n1:Level-2A_User_Product>"#,
        )
        .unwrap();
        let meta = parse_product_metadata(&xml).unwrap();
        assert_eq!(meta.product_type, "S2MSI2A");
        assert_eq!(meta.spacecraft, "Sentinel-2A");
        assert_eq!(meta.processing_baseline, "04.00");
        assert_eq!(meta.start_time, "2022-07-05T11:44:01.024Z");
        assert!(meta.product_uri.starts_with("S2A_MSIL2A"));
    }

    #[test]
    fn tool_arguments() {
        let args = translate_args("SDS", 9, (10980, 10980), "nearest", Path::new("/o/x_SCL.tif"));
        assert_eq!(
            args,
            vec![
                "-of", "GTiff", "-b", "9", "-outsize", "10980", "10980", "-r", "nearest",
                "-a_nodata", "0", "SDS", "/o/x_SCL.tif"
            ]
        );
        let vrt = build_vrt_args(
            Path::new("/o/x.vrt"),
            &[PathBuf::from("/o/x_B2.tif"), PathBuf::from("/o/x_B3.tif")],
        );
        assert_eq!(
            vrt,
            vec!["-overwrite", "-separate", "/o/x.vrt", "/o/x_B2.tif", "/o/x_B3.tif"]
        );
        let warp = warp_args(Path::new("/o/x.vrt"), Path::new("/o/2172/x.tif"), "EPSG:2172", "bilinear");
        assert_eq!(warp[4], "EPSG:2172");
        assert_eq!(warp.last().unwrap(), "/o/2172/x.tif");
    }

    fn planned(dataset: DatasetType) -> Vec<(&'static str, &'static str, usize, &'static str)> {
        plan_extraction("P", dataset, Path::new("/o"))
            .into_iter()
            .map(|s| (s.resolution, s.band, s.index, s.resample))
            .collect()
    }

    #[test]
    fn full_dataset_extracts_every_band_and_scl() {
        assert_eq!(
            planned(DatasetType::Sentinel2),
            vec![
                ("10m", "4", 1, "bilinear"),
                ("10m", "3", 2, "bilinear"),
                ("10m", "2", 3, "bilinear"),
                ("10m", "8", 4, "bilinear"),
                ("20m", "5", 1, "bilinear"),
                ("20m", "6", 2, "bilinear"),
                ("20m", "7", 3, "bilinear"),
                ("20m", "8a", 4, "bilinear"),
                ("20m", "11", 5, "bilinear"),
                ("20m", "12", 6, "bilinear"),
                ("20m", "SCL", 9, "nearest"),
                ("60m", "1", 1, "bilinear"),
                ("60m", "9", 2, "bilinear"),
            ]
        );
    }

    #[test]
    fn oli_dataset_skips_red_edge_and_water_vapour() {
        assert_eq!(
            planned(DatasetType::S2Oli),
            vec![
                ("10m", "4", 1, "bilinear"),
                ("10m", "3", 2, "bilinear"),
                ("10m", "2", 3, "bilinear"),
                ("10m", "8", 4, "bilinear"),
                ("20m", "11", 5, "bilinear"),
                ("20m", "12", 6, "bilinear"),
                ("20m", "SCL", 9, "nearest"),
                ("60m", "1", 1, "bilinear"),
            ]
        );
    }

    #[test]
    fn tm_dataset_has_no_coastal_band() {
        let steps = plan_extraction("P", DatasetType::S2Tm, Path::new("/o"));
        let bands: Vec<&str> = steps.iter().map(|s| s.band).collect();
        assert_eq!(bands, vec!["4", "3", "2", "8", "11", "12", "SCL"]);
        assert_eq!(steps[4].output, PathBuf::from("/o/P_B11.tif"));
        assert_eq!(steps[6].output, PathBuf::from("/o/P_SCL.tif"));
        assert_eq!(steps[6].index, 9);
    }

    #[test]
    fn projection_directory() {
        assert_eq!(projection_dir_name("EPSG:2172").unwrap(), "2172");
        assert!(projection_dir_name("2172").is_err());
        assert!(projection_dir_name("EPSG:").is_err());
    }
}
