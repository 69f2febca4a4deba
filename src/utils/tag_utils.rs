//! TIFF tag utilities
//!
//! Utilities for working with TIFF tags and their values.

use byteorder::ReadBytesExt;

use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{compression, field_types, tags};
use crate::tiff::ifd::IFDEntry;
use crate::volume::errors::{VolumeError, VolumeResult};

/// Reads an array of integer tag values based on the field type
///
/// # Arguments
/// * `reader` - Reader positioned at the first value
/// * `entry` - The IFD entry with tag information
/// * `handler` - The byte order handler
/// * `values` - The vector to store values in
pub fn read_tag_value_array(
    reader: &mut dyn SeekableReader,
    entry: &IFDEntry,
    handler: &dyn ByteOrderHandler,
    values: &mut Vec<u64>,
) -> VolumeResult<()> {
    for _ in 0..entry.count {
        let value = match entry.field_type {
            field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => reader.read_u8()? as u64,
            field_types::SHORT | field_types::SSHORT => handler.read_u16(reader)? as u64,
            field_types::LONG | field_types::SLONG => handler.read_u32(reader)? as u64,
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => handler.read_u64(reader)?,
            _ => {
                return Err(VolumeError::InvalidHeader(format!(
                    "Tag {} ({}) has non-integer field type {}",
                    entry.tag,
                    get_tag_name(entry.tag),
                    get_field_type_name(entry.field_type)
                )))
            }
        };

        values.push(value);
    }

    Ok(())
}

/// Size in bytes of one value of a field type
pub fn field_type_size(field_type: u16) -> u64 {
    match field_type {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE |
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => 1, // Default for unknown types
    }
}

/// Determines if a tag's value is stored inline or at an offset
///
/// # Arguments
/// * `entry` - The IFD entry to check
/// * `is_big_tiff` - Whether the file is BigTIFF format
///
/// # Returns
/// true if the value is stored inline, false if it's at an offset
pub fn is_value_inline(entry: &IFDEntry, is_big_tiff: bool) -> bool {
    let total_size = field_type_size(entry.field_type).saturating_mul(entry.count);

    if is_big_tiff {
        total_size <= 8 // In BigTIFF, 8 bytes are available for inline storage
    } else {
        total_size <= 4 // In standard TIFF, 4 bytes are available for inline storage
    }
}

/// Get the name of a TIFF tag
///
/// Returns a human-readable name for a tag based on its numeric ID.
/// If the tag is not recognized, returns "Unknown".
pub fn get_tag_name(tag: u16) -> &'static str {
    match tag {
        tags::NEW_SUBFILE_TYPE => "NewSubfileType",
        tags::IMAGE_WIDTH => "ImageWidth",
        tags::IMAGE_LENGTH => "ImageLength",
        tags::BITS_PER_SAMPLE => "BitsPerSample",
        tags::COMPRESSION => "Compression",
        tags::PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        tags::IMAGE_DESCRIPTION => "ImageDescription",
        tags::STRIP_OFFSETS => "StripOffsets",
        tags::SAMPLES_PER_PIXEL => "SamplesPerPixel",
        tags::ROWS_PER_STRIP => "RowsPerStrip",
        tags::STRIP_BYTE_COUNTS => "StripByteCounts",
        tags::PLANAR_CONFIGURATION => "PlanarConfiguration",
        tags::SOFTWARE => "Software",
        tags::PREDICTOR => "Predictor",
        tags::TILE_WIDTH => "TileWidth",
        tags::TILE_LENGTH => "TileLength",
        tags::TILE_OFFSETS => "TileOffsets",
        tags::TILE_BYTE_COUNTS => "TileByteCounts",
        tags::SAMPLE_FORMAT => "SampleFormat",
        _ => "Unknown",
    }
}

/// Get the name of a TIFF field type
pub fn get_field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        field_types::LONG8 => "LONG8",
        field_types::SLONG8 => "SLONG8",
        field_types::IFD8 => "IFD8",
        _ => "Unknown",
    }
}

/// Get the name of a compression method
pub fn get_compression_name(compression_code: u64) -> &'static str {
    match compression_code as u16 {
        compression::NONE => "None",
        compression::DEFLATE | compression::DEFLATE_OLD => "Adobe Deflate",
        compression::ZSTD => "Zstandard",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_storage_depends_on_format() {
        let two_longs = IFDEntry::new(tags::STRIP_OFFSETS, field_types::LONG, 2, 0);
        assert!(!is_value_inline(&two_longs, false));
        assert!(is_value_inline(&two_longs, true));

        let short = IFDEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, 1, 32);
        assert!(is_value_inline(&short, false));
    }

    #[test]
    fn names_cover_volume_codecs() {
        assert_eq!(get_compression_name(50000), "Zstandard");
        assert_eq!(get_compression_name(32946), "Adobe Deflate");
        assert_eq!(get_compression_name(5), "Unknown");
        assert_eq!(get_tag_name(tags::IMAGE_DESCRIPTION), "ImageDescription");
        assert_eq!(get_tag_name(42), "Unknown");
    }
}
