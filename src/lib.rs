//! Bounding-box extraction for 3D scalar volumes stored as MetaImage or
//! multi-page TIFF.

pub mod volume;
pub mod io;
pub mod compression;
pub mod extractor;
pub mod metaimage;
pub mod tiff;
pub mod utils;
pub mod commands;
pub mod cli;
pub mod api;

pub use crate::api::{extract, read_image, write_image, write_image_with_options};

pub use compression::CompressionKind;
pub use extractor::{ExtractionRequest, Region};
pub use io::format_strategy::WriteOptions;
pub use volume::{Direction, Volume, VolumeError, VolumeResult};
