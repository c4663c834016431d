use clap::{ArgAction, Parser};
use std::path::PathBuf;

// Class and --uint8 switches accept `--flag`, `--flag true` or `--flag false`.
#[derive(Parser, Debug)]
#[command(
    name = "sclmask",
    version,
    about = "Mask Sentinel-2 L2A data using the SCL (Scene Classification Layer) file."
)]
pub struct CliArgs {
    /// Full path of image file to be masked
    #[arg(short, long)]
    pub infile: Option<PathBuf>,

    /// Full path of SCL mask file
    #[arg(short, long)]
    pub maskfile: Option<PathBuf>,

    /// Full path of unzipped Sentinel-2 SAFE directory (or its MTD_MSIL2A.xml).
    /// If set, this overrides --infile and --maskfile
    #[arg(short, long)]
    pub safefile: Option<PathBuf>,

    /// Masked output path. A ".tif" path names the output file; anything else is
    /// a directory in which "<input>_masked.tif" is created
    #[arg(short, long)]
    pub outpath: PathBuf,

    /// Include "no_data" classified pixels
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = false, default_missing_value = "true")]
    pub no_data: bool,

    /// Include "saturated_or_defective" classified pixels
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = false, default_missing_value = "true")]
    pub saturated_or_defective: bool,

    /// Include "dark_area_pixels" classified pixels
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = false, default_missing_value = "true")]
    pub dark_area_pixels: bool,

    /// Include "cloud_shadows" classified pixels
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = false, default_missing_value = "true")]
    pub cloud_shadows: bool,

    /// Include "vegetation" classified pixels
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = true, default_missing_value = "true")]
    pub vegetation: bool,

    /// Include "not_vegetated" classified pixels
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = true, default_missing_value = "true")]
    pub not_vegetated: bool,

    /// Include "water" classified pixels
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = false, default_missing_value = "true")]
    pub water: bool,

    /// Include "unclassified" classified pixels
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = true, default_missing_value = "true")]
    pub unclassified: bool,

    /// Include "cloud_medium_probability" classified pixels
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = false, default_missing_value = "true")]
    pub cloud_medium_probability: bool,

    /// Include "cloud_high_probability" classified pixels
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = false, default_missing_value = "true")]
    pub cloud_high_probability: bool,

    /// Include "thin_cirrus" classified pixels
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = false, default_missing_value = "true")]
    pub thin_cirrus: bool,

    /// Include "snow" classified pixels
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = false, default_missing_value = "true")]
    pub snow: bool,

    /// Process only bands equivalent to Landsat 4-5 TM / Landsat 7 ETM+
    #[arg(long = "S2TM", default_value_t = false)]
    pub s2tm: bool,

    /// Process only bands equivalent to Landsat 8-9 OLI (overrides --S2TM)
    #[arg(long = "S2OLI", default_value_t = false)]
    pub s2oli: bool,

    /// Warp SAFE data to this projection, formatted "EPSG:XXXXX" (e.g. "EPSG:2172")
    #[arg(long)]
    pub prjstr: Option<String>,

    /// Save output as unsigned 8-bit (byte) data; false keeps the input sample type
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = true, default_missing_value = "true")]
    pub uint8: bool,

    /// JSON parameter preset; replaces the class, --S2TM/--S2OLI, --prjstr and --uint8 options
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
