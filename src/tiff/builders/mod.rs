//! TIFF builder strategy modules
//!
//! Tag strategies and the file writer used by `TiffBuilder`.

pub mod slice_tags;
pub mod writer;
