//! TIFF format utilities
//!
//! Byte order and TIFF/BigTIFF detection from a file header.

use log::debug;

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::header;
use crate::tiff::validation;
use crate::volume::errors::{VolumeError, VolumeResult};

/// Detects the byte order of a TIFF file
pub fn detect_byte_order(reader: &mut dyn SeekableReader) -> VolumeResult<ByteOrder> {
    let byte_order = ByteOrder::detect(reader)?;
    debug!("Detected byte order: {}", byte_order.name());
    Ok(byte_order)
}

/// Detects whether a file is TIFF or BigTIFF based on its version number
///
/// # Returns
/// A tuple with (is_big_tiff, version_number)
pub fn detect_tiff_format(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler,
) -> VolumeResult<(bool, u16)> {
    let version = byte_order_handler.read_u16(reader)?;
    debug!("TIFF version: {}", version);

    let is_big_tiff = match version {
        header::BIG_TIFF_VERSION => {
            validation::validate_bigtiff_header(reader, byte_order_handler)?;
            true
        }
        header::TIFF_VERSION => false,
        _ => {
            return Err(VolumeError::UnsupportedFormat(format!(
                "TIFF version {}",
                version
            )))
        }
    };

    Ok((is_big_tiff, version))
}
