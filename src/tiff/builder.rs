//! TIFF file construction
//!
//! Collects IFDs, their external tag data and their strips, then hands
//! everything to the writer in one go.

use std::collections::BTreeMap;

use log::{error, info};

use crate::tiff::builders::slice_tags::SliceTagsBuilder;
use crate::tiff::builders::writer::WriterBuilder;
use crate::tiff::constants::{field_types, tags};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::volume::errors::{VolumeError, VolumeResult};

/// Builder for creating TIFF files
pub struct TiffBuilder {
    is_big_tiff: bool,
    pub ifds: Vec<IFD>,
    image_data: BTreeMap<usize, Vec<u8>>,
    external_data: BTreeMap<(usize, u16), Vec<u8>>,
}

impl TiffBuilder {
    /// Create a new TIFF builder
    pub fn new(is_big_tiff: bool) -> Self {
        TiffBuilder {
            is_big_tiff,
            ifds: Vec::new(),
            image_data: BTreeMap::new(),
            external_data: BTreeMap::new(),
        }
    }

    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Add an IFD to the TIFF
    pub fn add_ifd(&mut self, ifd: IFD) -> usize {
        let ifd_index = self.ifds.len();
        self.ifds.push(ifd);
        ifd_index
    }

    fn check_index(&self, ifd_index: usize) -> VolumeResult<()> {
        if ifd_index >= self.ifds.len() {
            error!("Invalid IFD index {}, only have {} IFDs", ifd_index, self.ifds.len());
            return Err(VolumeError::GenericError(format!(
                "Invalid IFD index {}, only have {} IFDs",
                ifd_index,
                self.ifds.len()
            )));
        }
        Ok(())
    }

    /// Add the structure tags of a float32 slice
    pub fn add_float_slice_tags(&mut self, ifd_index: usize, width: u32, height: u32, compression_code: u64) -> VolumeResult<()> {
        self.check_index(ifd_index)?;
        SliceTagsBuilder::add_float_slice_tags(&mut self.ifds[ifd_index], width, height, compression_code);
        Ok(())
    }

    /// Set up a single strip holding the whole slice
    pub fn setup_single_strip(&mut self, ifd_index: usize, strip_data: Vec<u8>) -> VolumeResult<()> {
        self.check_index(ifd_index)?;
        SliceTagsBuilder::setup_single_strip(
            &mut self.ifds[ifd_index],
            &mut self.image_data,
            ifd_index,
            strip_data,
            self.is_big_tiff,
        );
        Ok(())
    }

    /// Add an ASCII tag such as ImageDescription
    pub fn add_ascii_tag(&mut self, ifd_index: usize, tag: u16, text: &str) -> VolumeResult<()> {
        self.check_index(ifd_index)?;
        SliceTagsBuilder::add_ascii(
            &mut self.ifds[ifd_index],
            &mut self.external_data,
            ifd_index,
            tag,
            text,
            self.is_big_tiff,
        );
        Ok(())
    }

    /// Switch to BigTIFF, widening strip offsets and byte counts to LONG8
    ///
    /// ASCII values of up to 8 bytes move into their entries, where a
    /// BigTIFF reader expects them.
    pub fn promote_to_big_tiff(&mut self) {
        info!("Promoting TiffBuilder to BigTIFF");
        self.is_big_tiff = true;
        for ifd in &mut self.ifds {
            for tag in [tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS] {
                if let Some(entry) = ifd.get_entry(tag).cloned() {
                    ifd.add_entry(IFDEntry::new(tag, field_types::LONG8, entry.count, entry.value_offset));
                }
            }
        }

        let repack: Vec<(usize, u16)> = self
            .external_data
            .iter()
            .filter(|(_, data)| data.len() <= 8)
            .map(|(key, _)| *key)
            .collect();
        for (ifd_index, tag) in repack {
            if let (Some(data), Some(ifd)) = (self.external_data.remove(&(ifd_index, tag)), self.ifds.get_mut(ifd_index)) {
                SliceTagsBuilder::add_ascii_bytes(ifd, &mut self.external_data, ifd_index, tag, data, true);
            }
        }
    }

    /// Size of the file this builder would write
    pub fn file_size(&self) -> u64 {
        WriterBuilder::calculate_layout(&self.ifds, &self.external_data, &self.image_data, self.is_big_tiff).file_size
    }

    /// Write the TIFF file to disk
    pub fn write(&self, output_path: &str) -> VolumeResult<()> {
        info!("Writing TIFF to {}", output_path);

        WriterBuilder::write(
            self.is_big_tiff,
            &self.ifds,
            &self.image_data,
            &self.external_data,
            output_path,
        )
    }
}
