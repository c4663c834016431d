use std::collections::BTreeSet;

use ndarray::{Array2, Zip};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::SclClass;

/// Set of SCL codes whose pixels are kept.
///
/// Codes are not validated against the 0-11 table; unknown codes simply never match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeepSet {
    codes: BTreeSet<u8>,
}

impl KeepSet {
    pub fn from_classes(classes: &[SclClass]) -> Self {
        Self {
            codes: classes.iter().map(|c| c.code()).collect(),
        }
    }

    pub fn from_codes<I: IntoIterator<Item = u8>>(codes: I) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    pub fn contains(&self, code: u8) -> bool {
        self.codes.contains(&code)
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Codes in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.codes.iter().copied()
    }
}

impl std::fmt::Display for KeepSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .iter()
            .map(|code| match SclClass::from_code(code) {
                Some(class) => class.name().to_string(),
                None => code.to_string(),
            })
            .collect();
        write!(f, "{}", names.join(", "))
    }
}

/// Binary inclusion grid: 1 keeps the pixel, 0 excludes it.
#[derive(Debug, Clone, PartialEq)]
pub struct InclusionMask {
    data: Array2<u8>,
    included: usize,
}

impl InclusionMask {
    /// (rows, cols)
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn included_count(&self) -> usize {
        self.included
    }

    pub fn as_array(&self) -> &Array2<u8> {
        &self.data
    }
}

/// Build the inclusion mask for `classification`: a pixel is 1 iff its code is in `keep`.
///
/// Fails with `NoValidPixels` when no pixel is retained.
pub fn build_mask(classification: &Array2<u8>, keep: &KeepSet) -> Result<InclusionMask> {
    if keep.is_empty() {
        warn!("No classes selected for the good pixel mask");
        return Err(Error::NoValidPixels {
            keep: keep.to_string(),
        });
    }
    for code in keep.iter() {
        match SclClass::from_code(code) {
            Some(class) => info!("Adding class to good pixel mask: {}", class),
            None => info!("Adding class to good pixel mask: code {}", code),
        }
    }

    let mut data = Array2::<u8>::zeros(classification.dim());
    Zip::from(&mut data)
        .and(classification)
        .for_each(|m, &code| {
            if keep.contains(code) {
                *m = 1;
            }
        });

    let included = data.iter().filter(|&&m| m == 1).count();
    if included == 0 {
        return Err(Error::NoValidPixels {
            keep: keep.to_string(),
        });
    }
    info!(
        "Good pixel mask: {} of {} pixels retained",
        included,
        data.len()
    );

    Ok(InclusionMask { data, included })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn mask_is_union_of_kept_codes() {
        let scl = array![[4u8, 4], [5, 0]];
        let keep = KeepSet::from_classes(&[SclClass::Vegetation, SclClass::NotVegetated]);
        let mask = build_mask(&scl, &keep).unwrap();
        assert_eq!(mask.as_array(), &array![[1u8, 1], [1, 0]]);
        assert_eq!(mask.included_count(), 3);
    }

    #[test]
    fn every_pixel_matches_set_membership() {
        let scl = Array2::from_shape_fn((12, 12), |(r, c)| ((r * 12 + c) % 12) as u8);
        let keep = KeepSet::from_codes([0, 3, 7, 11]);
        let mask = build_mask(&scl, &keep).unwrap();
        for ((r, c), &code) in scl.indexed_iter() {
            let expected = u8::from(keep.contains(code));
            assert_eq!(mask.as_array()[[r, c]], expected);
        }
        assert_eq!(mask.included_count(), 48);
    }

    #[test]
    fn empty_keep_set_has_no_valid_pixels() {
        let scl = array![[4u8, 5], [7, 9]];
        let keep = KeepSet::from_classes(&[]);
        assert!(keep.is_empty());
        let err = build_mask(&scl, &keep).unwrap_err();
        assert!(matches!(err, Error::NoValidPixels { .. }));
    }

    #[test]
    fn absent_classes_have_no_valid_pixels() {
        let scl = array![[8u8, 9], [10, 3]];
        let keep = KeepSet::from_classes(&SclClass::DEFAULT_KEEP);
        assert!(matches!(
            build_mask(&scl, &keep),
            Err(Error::NoValidPixels { .. })
        ));
    }

    #[test]
    fn out_of_table_codes_are_accepted() {
        let scl = array![[200u8, 1]];
        let keep = KeepSet::from_codes([200]);
        let mask = build_mask(&scl, &keep).unwrap();
        assert_eq!(mask.as_array(), &array![[1u8, 0]]);
        assert_eq!(keep.to_string(), "200");
    }

    #[test]
    fn keep_set_displays_class_names() {
        let keep = KeepSet::from_classes(&[SclClass::Snow, SclClass::Water]);
        assert_eq!(keep.to_string(), "water, snow");
    }
}
