//! Masking stages: mask building, band masking, byte encoding and saving,
//! chained by `pipeline`.
pub mod encode;
pub mod mask;
pub mod masking;
pub mod pipeline;
pub mod save;
