//! Compression handling for volume files
//!
//! This module implements strategies for the codecs used by the TIFF
//! and MetaImage formats.

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod zstd;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::DeflateHandler;
pub use factory::{CompressionFactory, CompressionKind};
pub use self::zstd::ZstdHandler;
