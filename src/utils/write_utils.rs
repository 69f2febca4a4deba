//! TIFF writing utilities
//!
//! Alignment and padding helpers for laying out TIFF files.

use std::io::Write;

use crate::volume::errors::VolumeResult;

/// Align an offset to a 4-byte boundary
pub fn align_to_4_bytes(offset: u64) -> u64 {
    let remainder = offset % 4;
    if remainder == 0 {
        offset
    } else {
        offset + (4 - remainder)
    }
}

/// Calculate padding required to align to 4-byte boundary
pub fn calculate_padding(data_len: usize) -> usize {
    (4 - (data_len % 4)) % 4
}

/// Write padding bytes so the next write starts 4-byte aligned
pub fn write_padding(writer: &mut impl Write, data_len: usize) -> VolumeResult<()> {
    let padding = calculate_padding(data_len);
    if padding > 0 {
        writer.write_all(&[0u8; 3][..padding])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment() {
        assert_eq!(align_to_4_bytes(8), 8);
        assert_eq!(align_to_4_bytes(9), 12);
        assert_eq!(calculate_padding(7), 1);

        let mut out = Vec::new();
        write_padding(&mut out, 5).unwrap();
        assert_eq!(out, vec![0, 0, 0]);
    }
}
