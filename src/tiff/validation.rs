//! TIFF validation utilities
//!
//! Checks applied while walking a possibly malformed file.

use log::{debug, error, warn};
use std::io::SeekFrom;

use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::header;
use crate::volume::errors::{VolumeError, VolumeResult};

/// Validates an IFD offset against the file size
pub fn validate_ifd_offset(offset: u64, file_size: u64) -> VolumeResult<()> {
    if offset >= file_size || offset < 8 {
        return Err(VolumeError::InvalidHeader(format!(
            "Invalid IFD offset: {} (file size: {})",
            offset, file_size
        )));
    }

    Ok(())
}

/// Validates that a data block lies inside the file
pub fn validate_data_range(offset: u64, length: u64, file_size: u64, what: &str) -> VolumeResult<()> {
    match offset.checked_add(length) {
        Some(end) if end <= file_size => Ok(()),
        _ => Err(VolumeError::InvalidHeader(format!(
            "{} at offset {} with {} bytes runs past the end of the file ({} bytes)",
            what, offset, length, file_size
        ))),
    }
}

/// Gets the file size, restoring the reader position
///
/// Returns u64::MAX when the size cannot be determined.
pub fn get_file_size(reader: &mut dyn SeekableReader) -> VolumeResult<u64> {
    let current_position = reader.stream_position()?;
    let file_size = match reader.seek(SeekFrom::End(0)) {
        Ok(size) => size,
        Err(e) => {
            warn!("Could not determine file size: {}", e);
            u64::MAX
        }
    };
    reader.seek(SeekFrom::Start(current_position))?;

    Ok(file_size)
}

/// Validates the rest of a BigTIFF header after the version number
pub fn validate_bigtiff_header(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler,
) -> VolumeResult<()> {
    let offset_size = byte_order_handler.read_u16(reader)?;
    let zeros = byte_order_handler.read_u16(reader)?;

    debug!("BigTIFF offset size: {}, reserved: {}", offset_size, zeros);

    if offset_size != header::BIGTIFF_OFFSET_SIZE || zeros != 0 {
        error!("Invalid BigTIFF header: offset_size={}, zeros={}", offset_size, zeros);
        return Err(VolumeError::InvalidHeader(format!(
            "Invalid BigTIFF header: offset size {}, reserved {}",
            offset_size, zeros
        )));
    }

    Ok(())
}

/// Validates a numeric value against an inclusive range
pub fn validate_range<T>(value: T, min: T, max: T, name: &str) -> VolumeResult<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(VolumeError::InvalidHeader(format!(
            "Invalid {}: {} (must be between {} and {})",
            name, value, min, max
        )));
    }

    Ok(())
}
