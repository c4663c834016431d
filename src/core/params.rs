use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::processing::mask::KeepSet;
use crate::error::Result;
use crate::types::{DatasetType, OutputEncoding, SclClass};

/// Masking parameters suitable for config files and presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskParams {
    /// SCL classes whose pixels are kept; everything else is zeroed
    pub keep: Vec<SclClass>,
    pub encoding: OutputEncoding,
    /// Band selection for SAFE import
    pub dataset: DatasetType,
    /// Optional target CRS for SAFE import (e.g. "EPSG:2172")
    pub target_crs: Option<String>,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            keep: SclClass::DEFAULT_KEEP.to_vec(),
            encoding: OutputEncoding::Byte,
            dataset: DatasetType::Sentinel2,
            target_crs: None,
        }
    }
}

impl MaskParams {
    /// Load a JSON preset. Missing fields take their default values.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn keep_set(&self) -> KeepSet {
        KeepSet::from_classes(&self.keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_preset_fills_defaults() {
        let params: MaskParams =
            serde_json::from_str(r#"{"keep": ["water", "snow"], "encoding": "native"}"#).unwrap();
        assert_eq!(params.keep, vec![SclClass::Water, SclClass::Snow]);
        assert_eq!(params.encoding, OutputEncoding::Native);
        assert_eq!(params.dataset, DatasetType::Sentinel2);
        assert!(params.target_crs.is_none());
    }

    #[test]
    fn default_keep_set() {
        let codes: Vec<u8> = MaskParams::default().keep_set().iter().collect();
        assert_eq!(codes, vec![4, 5, 7]);
    }
}
