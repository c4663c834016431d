//! Shared types and enums used across SCLMASK.
//! Includes the Scene Classification table (`SclClass`), `OutputEncoding`,
//! sample/pixel types (`SampleType`, `PixelType`) and `DatasetType`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Sentinel-2 L2A Scene Classification Layer classes.
///
/// The discriminant of each variant is its SCL pixel code.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SclClass {
    NoData = 0,
    SaturatedOrDefective = 1,
    DarkAreaPixels = 2,
    CloudShadows = 3,
    Vegetation = 4,
    NotVegetated = 5,
    Water = 6,
    Unclassified = 7,
    CloudMediumProbability = 8,
    CloudHighProbability = 9,
    ThinCirrus = 10,
    Snow = 11,
}

impl SclClass {
    /// All classes in code order (index == code).
    pub const ALL: [SclClass; 12] = [
        SclClass::NoData,
        SclClass::SaturatedOrDefective,
        SclClass::DarkAreaPixels,
        SclClass::CloudShadows,
        SclClass::Vegetation,
        SclClass::NotVegetated,
        SclClass::Water,
        SclClass::Unclassified,
        SclClass::CloudMediumProbability,
        SclClass::CloudHighProbability,
        SclClass::ThinCirrus,
        SclClass::Snow,
    ];

    /// Classes retained when the caller does not choose any.
    pub const DEFAULT_KEEP: [SclClass; 3] = [
        SclClass::Vegetation,
        SclClass::NotVegetated,
        SclClass::Unclassified,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            SclClass::NoData => "no_data",
            SclClass::SaturatedOrDefective => "saturated_or_defective",
            SclClass::DarkAreaPixels => "dark_area_pixels",
            SclClass::CloudShadows => "cloud_shadows",
            SclClass::Vegetation => "vegetation",
            SclClass::NotVegetated => "not_vegetated",
            SclClass::Water => "water",
            SclClass::Unclassified => "unclassified",
            SclClass::CloudMediumProbability => "cloud_medium_probability",
            SclClass::CloudHighProbability => "cloud_high_probability",
            SclClass::ThinCirrus => "thin_cirrus",
            SclClass::Snow => "snow",
        }
    }
}

impl std::fmt::Display for SclClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How masked samples are represented on disk.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputEncoding {
    /// Keep the source sample type (UInt16 or Float32).
    Native,
    /// Rescale to unsigned 8-bit, clamped to [0, 255].
    Byte,
}

impl Default for OutputEncoding {
    fn default() -> Self {
        OutputEncoding::Byte
    }
}

impl std::fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputEncoding::Native => write!(f, "Native"),
            OutputEncoding::Byte => write!(f, "Byte"),
        }
    }
}

/// Numeric type of the reflectance samples read from the image raster.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum SampleType {
    UInt16,
    Float32,
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleType::UInt16 => write!(f, "UInt16"),
            SampleType::Float32 => write!(f, "Float32"),
        }
    }
}

/// On-disk pixel type of the masked output, resolved once from
/// (`OutputEncoding`, `SampleType`).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PixelType {
    NativeUint16,
    NativeFloat32,
    Byte,
}

impl PixelType {
    pub fn resolve(encoding: OutputEncoding, sample_type: SampleType) -> Self {
        match (encoding, sample_type) {
            (OutputEncoding::Byte, _) => PixelType::Byte,
            (OutputEncoding::Native, SampleType::UInt16) => PixelType::NativeUint16,
            (OutputEncoding::Native, SampleType::Float32) => PixelType::NativeFloat32,
        }
    }
}

impl std::fmt::Display for PixelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelType::NativeUint16 => write!(f, "UInt16"),
            PixelType::NativeFloat32 => write!(f, "Float32"),
            PixelType::Byte => write!(f, "Byte"),
        }
    }
}

/// Band selection used when importing a SAFE product.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum DatasetType {
    /// All twelve surface-reflectance bands.
    Sentinel2,
    /// Bands matching Landsat 4-5 TM / Landsat 7 ETM+.
    S2Tm,
    /// Bands matching Landsat 8-9 OLI.
    S2Oli,
}

impl Default for DatasetType {
    fn default() -> Self {
        DatasetType::Sentinel2
    }
}

impl DatasetType {
    /// Band names to extract, in stacking order.
    pub fn band_list(self) -> &'static [&'static str] {
        match self {
            DatasetType::Sentinel2 => &[
                "1", "2", "3", "4", "5", "6", "7", "8", "8a", "9", "11", "12",
            ],
            DatasetType::S2Oli => &["1", "2", "3", "4", "8", "11", "12"],
            DatasetType::S2Tm => &["2", "3", "4", "8", "11", "12"],
        }
    }
}

impl std::fmt::Display for DatasetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetType::Sentinel2 => write!(f, "Sentinel-2"),
            DatasetType::S2Tm => write!(f, "S2TM"),
            DatasetType::S2Oli => write!(f, "S2OLI"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_table_index_matches_code() {
        for (i, class) in SclClass::ALL.iter().enumerate() {
            assert_eq!(class.code() as usize, i);
            assert_eq!(SclClass::from_code(i as u8), Some(*class));
        }
        assert_eq!(SclClass::from_code(12), None);
        assert_eq!(SclClass::ThinCirrus.name(), "thin_cirrus");
    }

    #[test]
    fn pixel_type_resolution() {
        assert_eq!(
            PixelType::resolve(OutputEncoding::Native, SampleType::UInt16),
            PixelType::NativeUint16
        );
        assert_eq!(
            PixelType::resolve(OutputEncoding::Native, SampleType::Float32),
            PixelType::NativeFloat32
        );
        assert_eq!(
            PixelType::resolve(OutputEncoding::Byte, SampleType::UInt16),
            PixelType::Byte
        );
        assert_eq!(
            PixelType::resolve(OutputEncoding::Byte, SampleType::Float32),
            PixelType::Byte
        );
    }

    #[test]
    fn dataset_band_lists() {
        assert_eq!(DatasetType::Sentinel2.band_list().len(), 12);
        assert_eq!(
            DatasetType::S2Oli.band_list(),
            &["1", "2", "3", "4", "8", "11", "12"]
        );
        assert_eq!(DatasetType::S2Tm.band_list(), &["2", "3", "4", "8", "11", "12"]);
    }
}
