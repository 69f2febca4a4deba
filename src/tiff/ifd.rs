//! Image File Directory (IFD) structures and methods
//!
//! Each IFD of a volume stack describes one z-slice: its size, sample
//! layout and where its strips or tiles live in the file.

use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;

use log::trace;

use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::constants::{new_subfile_type, tags};
use crate::utils::tag_utils;
use crate::volume::errors::VolumeResult;

/// Represents an Image File Directory (IFD) in a TIFF file
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Cached tag values for quick lookup
    tag_map: HashMap<u16, IFDEntry>,
}

/// Represents an entry in an Image File Directory (IFD)
///
/// For inline entries `value_offset` holds the first value already decoded
/// in the file's byte order; `value_bytes` keeps the raw value field so that
/// multi-value inline arrays can be decoded as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Value or offset to values
    pub value_offset: u64,
    /// Raw value field as stored in the file (4 or 8 bytes used)
    pub value_bytes: [u8; 8],
}

impl IFDEntry {
    /// Creates an entry whose value field is `value_offset` in little-endian
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        trace!(
            "New IFD entry: tag={} ({}), type={}, count={}, offset/value={}",
            tag,
            tag_utils::get_tag_name(tag),
            tag_utils::get_field_type_name(field_type),
            count,
            value_offset
        );

        IFDEntry {
            tag,
            field_type,
            count,
            value_offset,
            value_bytes: value_offset.to_le_bytes(),
        }
    }

    /// Creates an entry from the raw value field read from a file
    pub fn from_raw(tag: u16, field_type: u16, count: u64, value_offset: u64, value_bytes: [u8; 8]) -> Self {
        IFDEntry { tag, field_type, count, value_offset, value_bytes }
    }

    /// Determines if the value is stored inline rather than at an offset
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        tag_utils::is_value_inline(self, is_big_tiff)
    }

    /// Decodes the values packed into the entry's value field
    pub fn inline_values(&self, handler: &dyn ByteOrderHandler, is_big_tiff: bool) -> VolumeResult<Vec<u64>> {
        let width = if is_big_tiff { 8 } else { 4 };
        let mut cursor = Cursor::new(self.value_bytes[..width].to_vec());
        let mut values = Vec::with_capacity(self.count as usize);
        tag_utils::read_tag_value_array(&mut cursor, self, handler, &mut values)?;
        Ok(values)
    }

    /// Returns a human-readable description of this entry
    pub fn description(&self) -> String {
        let value_display = match self.tag {
            tags::COMPRESSION => format!(
                "{} ({})",
                self.value_offset,
                tag_utils::get_compression_name(self.value_offset)
            ),
            _ => self.value_offset.to_string(),
        };

        format!(
            "Tag: {} ({}), Type: {}, Count: {}, Value/Offset: {}",
            self.tag,
            tag_utils::get_tag_name(self.tag),
            tag_utils::get_field_type_name(self.field_type),
            self.count,
            value_display
        )
    }
}

impl IFD {
    /// Creates a new, empty IFD
    pub fn new(number: usize, offset: u64) -> Self {
        IFD {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry, replacing any earlier entry for the same tag
    pub fn add_entry(&mut self, entry: IFDEntry) {
        trace!("Adding entry to IFD #{}: {}", self.number, entry.description());

        self.entries.retain(|existing| existing.tag != entry.tag);
        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Gets a tag value (value_offset) directly
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.tag_map.get(&tag).map(|entry| entry.value_offset)
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag)
    }

    /// Width and height of the image described by this IFD
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Number of samples per pixel (default 1 if not specified)
    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Whether this IFD is a reduced-resolution copy of another one
    pub fn is_reduced_resolution(&self) -> bool {
        self.get_tag_value(tags::NEW_SUBFILE_TYPE)
            .map(|flags| flags & new_subfile_type::REDUCED_RESOLUTION != 0)
            .unwrap_or(false)
    }

    /// Whether pixel data is organised in tiles rather than strips
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_OFFSETS)
    }

    /// Gets the number of entries in this IFD
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;
        writeln!(f, "  Number of entries: {}", self.entries.len())?;

        if let Some((width, height)) = self.get_dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }

        writeln!(f, "  Tags:")?;
        for entry in &self.entries {
            writeln!(f, "    {}", entry.description())?;
        }

        Ok(())
    }
}
