//! Handler for zlib/Deflate compressed data
//!
//! Used both for TIFF Adobe Deflate strips and MetaImage `CompressedData`.

use std::io::{Read, Write};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::debug;
use crate::volume::errors::{VolumeError, VolumeResult};
use super::handler::CompressionHandler;

/// Deflate (zlib) compression handler (compression code 8)
pub struct DeflateHandler {
    level: Compression,
}

impl DeflateHandler {
    pub fn new() -> Self {
        DeflateHandler { level: Compression::default() }
    }
}

impl Default for DeflateHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionHandler for DeflateHandler {
    fn decompress(&self, data: &[u8]) -> VolumeResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut decompressed_data = Vec::new();
        decoder
            .read_to_end(&mut decompressed_data)
            .map_err(|e| VolumeError::GenericError(format!("Deflate decompression error: {}", e)))?;
        debug!("Deflate decompressed {} -> {} bytes", data.len(), decompressed_data.len());
        Ok(decompressed_data)
    }

    fn compress(&self, data: &[u8]) -> VolumeResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;
        debug!("Deflate compressed {} -> {} bytes", data.len(), compressed.len());
        Ok(compressed)
    }

    fn name(&self) -> &'static str {
        "Deflate"
    }

    fn code(&self) -> u64 {
        8
    }
}
