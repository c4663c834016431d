//! Linear rescale of masked reflectance to unsigned 8-bit.
//!
//! UInt16 inputs are taken as reflectance scaled by 10000; Float32 inputs as
//! reflectance already in [0, 1]. Scaled values are clamped to [0, 255] and
//! rounded to nearest, halves away from zero. NaN encodes as 0.
use ndarray::Array3;

use crate::core::raster::BandStack;

/// Reflectance scale factor of Sentinel-2 L2A integer products.
pub const REFLECTANCE_SCALE: f32 = 10000.0;

fn clamp_to_byte(scaled: f32) -> u8 {
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, 255.0).round() as u8
}

pub fn u16_to_byte(value: u16) -> u8 {
    clamp_to_byte(255.0 * f32::from(value) / REFLECTANCE_SCALE)
}

pub fn f32_to_byte(value: f32) -> u8 {
    clamp_to_byte(255.0 * value)
}

pub fn rescale_to_byte(bands: &BandStack) -> Array3<u8> {
    match bands {
        BandStack::UInt16(a) => a.mapv(u16_to_byte),
        BandStack::Float32(a) => a.mapv(f32_to_byte),
    }
}
