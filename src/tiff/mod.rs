//! Multi-page TIFF volume support
//!
//! Reads TIFF and BigTIFF stacks (one full-resolution IFD per z-slice,
//! strips or tiles, integer or float samples in either byte order) and
//! writes little-endian float32 stacks with one strip per slice.

pub mod ifd;
pub(crate) mod types;
pub mod reader;
pub mod builder;
mod builders;
pub(crate) mod constants;
pub(crate) mod validation;
pub mod description;
pub mod slice_reader;
mod format;
#[cfg(test)]
mod tests;

pub use builder::TiffBuilder;
pub use description::VolumeDescription;
pub use format::TiffVolumeFormat;
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
