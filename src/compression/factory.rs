//! Factory for creating compression handlers

use std::fmt;

use crate::volume::errors::{VolumeError, VolumeResult};
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::DeflateHandler;
use super::zstd::ZstdHandler;

/// Codec selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionKind {
    None,
    Deflate,
    Zstd,
}

impl CompressionKind {
    /// Parse a codec name (case-insensitive)
    pub fn from_name(name: &str) -> VolumeResult<Self> {
        match name.to_lowercase().as_str() {
            "uncompressed" | "none" => Ok(CompressionKind::None),
            "deflate" | "zip" | "zlib" => Ok(CompressionKind::Deflate),
            "zstd" => Ok(CompressionKind::Zstd),
            _ => Err(VolumeError::GenericError(format!("Unknown compression type: {}", name))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompressionKind::None => "none",
            CompressionKind::Deflate => "deflate",
            CompressionKind::Zstd => "zstd",
        }
    }

    /// Handler implementing this codec
    pub fn handler(&self) -> Box<dyn CompressionHandler> {
        match self {
            CompressionKind::None => Box::new(UncompressedHandler),
            CompressionKind::Deflate => Box::new(DeflateHandler::new()),
            CompressionKind::Zstd => Box::new(ZstdHandler::new()),
        }
    }
}

impl fmt::Display for CompressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a compression handler for the given TIFF compression code
    pub fn create_handler(compression: u64) -> VolumeResult<Box<dyn CompressionHandler>> {
        match compression {
            1 => Ok(Box::new(UncompressedHandler)),
            8 | 32946 => Ok(Box::new(DeflateHandler::new())),
            50000 => Ok(Box::new(ZstdHandler::new())),
            _ => Err(VolumeError::UnsupportedCompression(compression))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_handlers() {
        assert_eq!(CompressionFactory::create_handler(1).unwrap().name(), "Uncompressed");
        assert_eq!(CompressionFactory::create_handler(8).unwrap().name(), "Deflate");
        assert_eq!(CompressionFactory::create_handler(32946).unwrap().code(), 8);
        assert_eq!(CompressionFactory::create_handler(50000).unwrap().name(), "ZSTD");
        assert!(matches!(
            CompressionFactory::create_handler(5),
            Err(VolumeError::UnsupportedCompression(5))
        ));
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(CompressionKind::from_name("ZSTD").unwrap(), CompressionKind::Zstd);
        assert_eq!(CompressionKind::from_name("Zip").unwrap(), CompressionKind::Deflate);
        assert!(CompressionKind::from_name("lzw").is_err());
    }

    #[test]
    fn handlers_restore_their_input() {
        let data: Vec<u8> = (0..4096u32).flat_map(|v| (v as f32).to_le_bytes()).collect();
        for kind in [CompressionKind::None, CompressionKind::Deflate, CompressionKind::Zstd] {
            let handler = kind.handler();
            let packed = handler.compress(&data).unwrap();
            assert_eq!(handler.decompress(&packed).unwrap(), data, "{}", kind);
        }
    }
}
