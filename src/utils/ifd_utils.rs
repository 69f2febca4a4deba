//! IFD utilities
//!
//! Offset bookkeeping shared by the TIFF reader and writer.

use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::volume::errors::VolumeResult;

/// Reads an IFD offset (header or chain link)
///
/// # Arguments
/// * `reader` - Reader positioned at the offset field
/// * `is_big_tiff` - Whether offsets are 8 bytes wide
/// * `byte_order_handler` - Handler for the file's byte order
pub fn read_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler,
) -> VolumeResult<u64> {
    if is_big_tiff {
        Ok(byte_order_handler.read_u64(reader)?)
    } else {
        Ok(byte_order_handler.read_u32(reader)? as u64)
    }
}

/// Size in bytes of an IFD with `entry_count` entries, including the
/// count field and the next-IFD link
pub fn calculate_ifd_size(entry_count: usize, is_big_tiff: bool) -> u64 {
    let entries = entry_count as u64;
    if is_big_tiff {
        // 8 (entry count) + 20 (each entry) + 8 (next IFD offset)
        8 + (20 * entries) + 8
    } else {
        // 2 (entry count) + 12 (each entry) + 4 (next IFD offset)
        2 + (12 * entries) + 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ifd_sizes() {
        assert_eq!(calculate_ifd_size(0, false), 6);
        assert_eq!(calculate_ifd_size(10, false), 126);
        assert_eq!(calculate_ifd_size(10, true), 216);
    }
}
