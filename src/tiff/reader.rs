//! TIFF file reader implementation
//!
//! Walks the header and IFD chain of TIFF/BigTIFF files, using the
//! byte order strategy detected from the header.

use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, SeekFrom};

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::{read_bytes_at, SeekableReader};
use crate::tiff::constants::field_types;
use crate::tiff::ifd::{IFDEntry, IFD};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::{format_utils, ifd_utils, string_utils, tag_utils};
use crate::volume::errors::{VolumeError, VolumeResult};

/// Upper bound on IFDs followed in one chain
const MAX_IFDS: usize = 65_536;

/// Reader for TIFF and BigTIFF files
pub struct TiffReader {
    /// Byte order detected from the header
    byte_order: Option<ByteOrder>,
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Current file path
    current_file: Option<String>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order: None,
            byte_order_handler: None,
            current_file: None,
            is_big_tiff: false,
        }
    }

    /// Returns the byte order handler, failing before the header was read
    pub fn handler(&self) -> VolumeResult<&dyn ByteOrderHandler> {
        self.byte_order_handler
            .as_deref()
            .ok_or_else(|| VolumeError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Opens the current file for reading
    pub fn create_reader(&self) -> VolumeResult<BufReader<File>> {
        match &self.current_file {
            Some(path) => Ok(BufReader::with_capacity(1024 * 1024, File::open(path)?)),
            None => Err(VolumeError::GenericError("No file path specified".to_string())),
        }
    }

    /// Loads the directory structure of a TIFF file
    ///
    /// # Arguments
    /// * `filepath` - Path to the TIFF file to load
    ///
    /// # Returns
    /// A TIFF structure listing every IFD in the file
    pub fn load(&mut self, filepath: &str) -> VolumeResult<TIFF> {
        info!("Loading TIFF file: {}", filepath);
        self.current_file = Some(filepath.to_string());

        let mut reader = self.create_reader()?;
        self.read(&mut reader)
    }

    /// Reads the header and IFD chain from the given reader
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> VolumeResult<TIFF> {
        reader.seek(SeekFrom::Start(0))?;

        let byte_order = format_utils::detect_byte_order(reader)?;
        self.byte_order = Some(byte_order);
        self.byte_order_handler = Some(byte_order.create_handler());

        let (is_big_tiff, _) = format_utils::detect_tiff_format(reader, self.handler()?)?;
        self.is_big_tiff = is_big_tiff;

        let first_ifd_offset = ifd_utils::read_ifd_offset(reader, is_big_tiff, self.handler()?)?;
        debug!("First IFD offset: {}", first_ifd_offset);

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        let mut tiff = TIFF::new(is_big_tiff, byte_order);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;

        info!("Read {} IFDs from TIFF file", tiff.ifds.len());
        Ok(tiff)
    }

    /// Reads a chain of IFDs starting from the given offset
    ///
    /// A broken link ends the chain with a warning; the first IFD must
    /// always be readable.
    fn read_ifd_chain(
        &self,
        reader: &mut dyn SeekableReader,
        first_ifd_offset: u64,
        file_size: u64,
    ) -> VolumeResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut visited = HashSet::new();
        let mut ifd_offset = first_ifd_offset;

        while ifd_offset != 0 {
            if ifds.len() >= MAX_IFDS {
                warn!("Stopping after {} IFDs", MAX_IFDS);
                break;
            }
            if !visited.insert(ifd_offset) {
                warn!("IFD chain loops back to offset {}, stopping", ifd_offset);
                break;
            }

            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) if !ifds.is_empty() => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
                Err(e) => return Err(e),
            };

            // read_ifd leaves the reader on the next-IFD link
            let next_ifd_offset = match ifd_utils::read_ifd_offset(reader, self.is_big_tiff, self.handler()?) {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    ifds.push(ifd);
                    break;
                }
            };
            ifds.push(ifd);

            if next_ifd_offset != 0 && validation::validate_ifd_offset(next_ifd_offset, file_size).is_err() {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                break;
            }
            ifd_offset = next_ifd_offset;
        }

        Ok(ifds)
    }

    /// Reads a single IFD located at `offset`
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> VolumeResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = self.read_ifd_entry_count(reader)?;
        validation::validate_range(entry_count, 1, 4096, "IFD entry count")?;

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            let entry = self.read_ifd_entry(reader)?;
            ifd.add_entry(entry);
        }

        debug!("Read IFD #{} with {} entries", number, ifd.entry_count());
        Ok(ifd)
    }

    /// Reads the entry count from an IFD
    fn read_ifd_entry_count(&self, reader: &mut dyn SeekableReader) -> VolumeResult<u64> {
        let handler = self.handler()?;
        if self.is_big_tiff {
            Ok(handler.read_u64(reader)?)
        } else {
            Ok(handler.read_u16(reader)? as u64)
        }
    }

    /// Reads a single IFD entry, decoding inline integer values in place
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> VolumeResult<IFDEntry> {
        let handler = self.handler()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let width = if self.is_big_tiff { 8 } else { 4 };
        let mut value_bytes = [0u8; 8];
        reader.read_exact(&mut value_bytes[..width])?;

        let entry = IFDEntry::from_raw(tag, field_type, count, 0, value_bytes);
        let integer_type = !matches!(
            field_type,
            field_types::ASCII
                | field_types::FLOAT
                | field_types::DOUBLE
                | field_types::RATIONAL
                | field_types::SRATIONAL
        );

        let value_offset = if entry.is_value_inline(self.is_big_tiff) && integer_type && count > 0 {
            entry
                .inline_values(handler, self.is_big_tiff)?
                .first()
                .copied()
                .unwrap_or(0)
        } else {
            let mut cursor = Cursor::new(value_bytes[..width].to_vec());
            ifd_utils::read_ifd_offset(&mut cursor, self.is_big_tiff, handler)?
        };

        Ok(IFDEntry::from_raw(tag, field_type, count, value_offset, value_bytes))
    }

    /// Reads all values of an integer tag
    ///
    /// # Arguments
    /// * `reader` - The seekable reader to use
    /// * `ifd` - The IFD containing the tag
    /// * `tag` - The tag number to read
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> VolumeResult<Vec<u64>> {
        let entry = ifd.get_entry(tag).ok_or_else(|| {
            VolumeError::InvalidHeader(format!(
                "IFD #{} has no {} tag",
                ifd.number,
                tag_utils::get_tag_name(tag)
            ))
        })?;
        let handler = self.handler()?;

        if entry.is_value_inline(self.is_big_tiff) {
            return entry.inline_values(handler, self.is_big_tiff);
        }

        let file_size = validation::get_file_size(reader)?;
        let length = entry.count.saturating_mul(tag_utils::field_type_size(entry.field_type));
        validation::validate_data_range(entry.value_offset, length, file_size, tag_utils::get_tag_name(tag))?;

        reader.seek(SeekFrom::Start(entry.value_offset))?;
        let mut values = Vec::with_capacity(entry.count as usize);
        tag_utils::read_tag_value_array(reader, entry, handler, &mut values)?;
        Ok(values)
    }

    /// Reads an ASCII tag, or None when the IFD lacks it
    pub fn read_ascii_tag(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> VolumeResult<Option<String>> {
        let entry = match ifd.get_entry(tag) {
            Some(entry) if entry.field_type == field_types::ASCII => entry,
            Some(entry) => {
                warn!(
                    "Tag {} has type {}, expected ASCII",
                    tag_utils::get_tag_name(tag),
                    tag_utils::get_field_type_name(entry.field_type)
                );
                return Ok(None);
            }
            None => return Ok(None),
        };

        let mut buffer = if entry.is_value_inline(self.is_big_tiff) {
            entry.value_bytes[..entry.count as usize].to_vec()
        } else {
            let file_size = validation::get_file_size(reader)?;
            validation::validate_data_range(entry.value_offset, entry.count, file_size, "ASCII value")?;
            read_bytes_at(reader, entry.value_offset, entry.count)?
        };

        string_utils::trim_trailing_nulls(&mut buffer);
        String::from_utf8(buffer)
            .map(Some)
            .map_err(|e| VolumeError::InvalidHeader(format!("Invalid UTF-8 string: {}", e)))
    }

    /// Byte order of the loaded file
    pub fn byte_order(&self) -> Option<ByteOrder> {
        self.byte_order
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}
