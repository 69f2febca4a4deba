//! Tag strategies for volume slices
//!
//! Every slice is a single-channel 32-bit float plane stored as one strip.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::tiff::constants::{field_types, new_subfile_type, photometric, planar_config, sample_format, tags};
use crate::tiff::ifd::{IFD, IFDEntry};

/// Adds slice tags to an IFD
pub struct SliceTagsBuilder;

impl SliceTagsBuilder {
    /// Add the image structure tags of a float32 slice
    ///
    /// # Arguments
    /// * `ifd` - IFD receiving the tags
    /// * `width` - Slice width in pixels (x extent)
    /// * `height` - Slice height in pixels (y extent)
    /// * `compression_code` - TIFF compression code of the strip
    pub fn add_float_slice_tags(ifd: &mut IFD, width: u32, height: u32, compression_code: u64) {
        debug!("Adding float slice tags for {}x{} slice", width, height);

        // Every page of the stack is a full-resolution image
        ifd.add_entry(IFDEntry::new(
            tags::NEW_SUBFILE_TYPE,
            field_types::LONG,
            1,
            new_subfile_type::SINGLE_PAGE,
        ));

        ifd.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, field_types::LONG, 1, width as u64));
        ifd.add_entry(IFDEntry::new(tags::IMAGE_LENGTH, field_types::LONG, 1, height as u64));

        // One 32-bit IEEE float sample per pixel
        ifd.add_entry(IFDEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, 1, 32));
        ifd.add_entry(IFDEntry::new(tags::SAMPLES_PER_PIXEL, field_types::SHORT, 1, 1));
        ifd.add_entry(IFDEntry::new(
            tags::SAMPLE_FORMAT,
            field_types::SHORT,
            1,
            sample_format::IEEEFP as u64,
        ));

        ifd.add_entry(IFDEntry::new(tags::COMPRESSION, field_types::SHORT, 1, compression_code));
        ifd.add_entry(IFDEntry::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            field_types::SHORT,
            1,
            photometric::BLACK_IS_ZERO as u64,
        ));
        ifd.add_entry(IFDEntry::new(
            tags::PLANAR_CONFIGURATION,
            field_types::SHORT,
            1,
            planar_config::CHUNKY as u64,
        ));
    }

    /// Setup single strip for an IFD
    ///
    /// StripOffsets is a placeholder here; the writer fills in the real
    /// offset once the file layout is known.
    pub fn setup_single_strip(
        ifd: &mut IFD,
        image_data: &mut BTreeMap<usize, Vec<u8>>,
        ifd_index: usize,
        strip_data: Vec<u8>,
        is_big_tiff: bool,
    ) {
        debug!("Setting up single strip for IFD #{}: {} bytes", ifd_index, strip_data.len());

        let offset_type = if is_big_tiff { field_types::LONG8 } else { field_types::LONG };
        ifd.add_entry(IFDEntry::new(tags::STRIP_OFFSETS, offset_type, 1, 0));
        ifd.add_entry(IFDEntry::new(
            tags::STRIP_BYTE_COUNTS,
            offset_type,
            1,
            strip_data.len() as u64,
        ));

        if let Some((_, height)) = ifd.get_dimensions() {
            ifd.add_entry(IFDEntry::new(tags::ROWS_PER_STRIP, field_types::LONG, 1, height));
        }

        image_data.insert(ifd_index, strip_data);
    }

    /// Add an ASCII tag
    ///
    /// Short strings are packed into the entry itself; longer ones are
    /// registered as external data.
    pub fn add_ascii(
        ifd: &mut IFD,
        external_data: &mut BTreeMap<(usize, u16), Vec<u8>>,
        ifd_index: usize,
        tag: u16,
        text: &str,
        is_big_tiff: bool,
    ) {
        let mut data = text.as_bytes().to_vec();
        data.push(0);
        Self::add_ascii_bytes(ifd, external_data, ifd_index, tag, data, is_big_tiff);
    }

    /// Add an ASCII tag from its NUL-terminated bytes
    pub fn add_ascii_bytes(
        ifd: &mut IFD,
        external_data: &mut BTreeMap<(usize, u16), Vec<u8>>,
        ifd_index: usize,
        tag: u16,
        data: Vec<u8>,
        is_big_tiff: bool,
    ) {
        let count = data.len() as u64;
        let inline_capacity = if is_big_tiff { 8 } else { 4 };

        if data.len() <= inline_capacity {
            let mut value_bytes = [0u8; 8];
            value_bytes[..data.len()].copy_from_slice(&data);
            ifd.add_entry(IFDEntry::from_raw(tag, field_types::ASCII, count, 0, value_bytes));
            external_data.remove(&(ifd_index, tag));
        } else {
            info!("Adding {} byte ASCII tag {} to IFD #{}", count, tag, ifd_index);
            ifd.add_entry(IFDEntry::new(tag, field_types::ASCII, count, 0));
            external_data.insert((ifd_index, tag), data);
        }
    }
}
