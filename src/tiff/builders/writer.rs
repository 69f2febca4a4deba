//! TIFF writing strategies
//!
//! Lays out a little-endian TIFF or BigTIFF file: header, all IFDs, then
//! external tag data, then strip data. Offsets are computed up front so
//! every block is written exactly once.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};

use log::{debug, info};

use crate::tiff::constants::{header, tags};
use crate::tiff::ifd::IFD;
use crate::utils::{ifd_utils, write_utils};
use crate::volume::errors::{VolumeError, VolumeResult};

/// Offsets of every block in the output file
#[derive(Debug, Default)]
pub struct FileLayout {
    /// Offset of each IFD, in order
    pub ifd_offsets: Vec<u64>,
    /// Offset of external data or strip data keyed by (IFD index, tag)
    pub tag_data_offsets: BTreeMap<(usize, u16), u64>,
    /// Total file size
    pub file_size: u64,
}

/// Handles writing TIFF files to disk
pub struct WriterBuilder;

impl WriterBuilder {
    /// Write a complete TIFF file to disk
    pub fn write(
        is_big_tiff: bool,
        ifds: &[IFD],
        image_data: &BTreeMap<usize, Vec<u8>>,
        external_data: &BTreeMap<(usize, u16), Vec<u8>>,
        output_path: &str,
    ) -> VolumeResult<()> {
        let sorted_ifds = Self::prepare_sorted_ifds(ifds);
        let layout = Self::calculate_layout(&sorted_ifds, external_data, image_data, is_big_tiff);

        if !is_big_tiff && layout.file_size > header::CLASSIC_TIFF_LIMIT {
            return Err(VolumeError::GenericError(format!(
                "{} bytes do not fit a classic TIFF, BigTIFF is required",
                layout.file_size
            )));
        }

        info!(
            "Writing {} to {} ({} IFDs, {} bytes)",
            if is_big_tiff { "BigTIFF" } else { "TIFF" },
            output_path,
            sorted_ifds.len(),
            layout.file_size
        );

        let file = File::create(output_path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);

        let first_ifd_offset = layout.ifd_offsets.first().copied().unwrap_or(0);
        Self::write_header(&mut writer, first_ifd_offset, is_big_tiff)?;
        Self::write_ifds(&mut writer, &sorted_ifds, &layout, is_big_tiff)?;
        Self::write_external_data(&mut writer, external_data, &layout)?;
        Self::write_image_data(&mut writer, image_data, &layout)?;

        writer.flush()?;
        Ok(())
    }

    /// Sorts entries by tag number as required by TIFF readers
    fn prepare_sorted_ifds(ifds: &[IFD]) -> Vec<IFD> {
        ifds.iter()
            .map(|ifd| {
                let mut sorted_ifd = ifd.clone();
                sorted_ifd.entries.sort_by_key(|entry| entry.tag);
                sorted_ifd
            })
            .collect()
    }

    /// Calculate offsets for IFDs, external data and strips
    pub fn calculate_layout(
        ifds: &[IFD],
        external_data: &BTreeMap<(usize, u16), Vec<u8>>,
        image_data: &BTreeMap<usize, Vec<u8>>,
        is_big_tiff: bool,
    ) -> FileLayout {
        let mut layout = FileLayout::default();
        let mut current_offset: u64 = if is_big_tiff { 16 } else { 8 };

        for ifd in ifds {
            layout.ifd_offsets.push(current_offset);
            current_offset += ifd_utils::calculate_ifd_size(ifd.entry_count(), is_big_tiff);
        }

        for (key, data) in external_data {
            layout.tag_data_offsets.insert(*key, current_offset);
            current_offset = write_utils::align_to_4_bytes(current_offset + data.len() as u64);
        }

        for (ifd_index, data) in image_data {
            layout.tag_data_offsets.insert((*ifd_index, tags::STRIP_OFFSETS), current_offset);
            current_offset = write_utils::align_to_4_bytes(current_offset + data.len() as u64);
        }

        layout.file_size = current_offset;
        layout
    }

    /// Write the byte order marker, version and first IFD offset
    fn write_header(writer: &mut impl Write, first_ifd_offset: u64, is_big_tiff: bool) -> VolumeResult<()> {
        writer.write_all(&header::LITTLE_ENDIAN_MARKER)?;

        if is_big_tiff {
            writer.write_all(&header::BIG_TIFF_VERSION.to_le_bytes())?;
            writer.write_all(&header::BIGTIFF_OFFSET_SIZE.to_le_bytes())?;
            writer.write_all(&[0u8, 0])?; // Reserved
            writer.write_all(&first_ifd_offset.to_le_bytes())?;
        } else {
            writer.write_all(&header::TIFF_VERSION.to_le_bytes())?;
            writer.write_all(&(first_ifd_offset as u32).to_le_bytes())?;
        }

        Ok(())
    }

    /// Write all IFDs to the file
    fn write_ifds(
        writer: &mut (impl Write + Seek),
        sorted_ifds: &[IFD],
        layout: &FileLayout,
        is_big_tiff: bool,
    ) -> VolumeResult<()> {
        for (i, ifd) in sorted_ifds.iter().enumerate() {
            let next_ifd_offset = layout.ifd_offsets.get(i + 1).copied().unwrap_or(0);
            writer.seek(SeekFrom::Start(layout.ifd_offsets[i]))?;
            Self::write_ifd(writer, ifd, next_ifd_offset, &layout.tag_data_offsets, i, is_big_tiff)?;
        }

        Ok(())
    }

    /// Write all external tag data
    fn write_external_data(
        writer: &mut (impl Write + Seek),
        external_data: &BTreeMap<(usize, u16), Vec<u8>>,
        layout: &FileLayout,
    ) -> VolumeResult<()> {
        for (key, data) in external_data {
            if let Some(offset) = layout.tag_data_offsets.get(key) {
                writer.seek(SeekFrom::Start(*offset))?;
                writer.write_all(data)?;
                write_utils::write_padding(writer, data.len())?;
            }
        }

        Ok(())
    }

    /// Write all strip data
    fn write_image_data(
        writer: &mut (impl Write + Seek),
        image_data: &BTreeMap<usize, Vec<u8>>,
        layout: &FileLayout,
    ) -> VolumeResult<()> {
        for (ifd_index, data) in image_data {
            if let Some(offset) = layout.tag_data_offsets.get(&(*ifd_index, tags::STRIP_OFFSETS)) {
                debug!("Writing strip of IFD #{} at offset {}", ifd_index, offset);
                writer.seek(SeekFrom::Start(*offset))?;
                writer.write_all(data)?;
                write_utils::write_padding(writer, data.len())?;
            }
        }

        Ok(())
    }

    /// Write one IFD: entry count, entries and the next-IFD link
    fn write_ifd(
        writer: &mut impl Write,
        ifd: &IFD,
        next_offset: u64,
        tag_offsets: &BTreeMap<(usize, u16), u64>,
        ifd_index: usize,
        is_big_tiff: bool,
    ) -> VolumeResult<()> {
        match is_big_tiff {
            true => writer.write_all(&(ifd.entries.len() as u64).to_le_bytes())?,
            false => writer.write_all(&(ifd.entries.len() as u16).to_le_bytes())?,
        }

        let width = if is_big_tiff { 8 } else { 4 };
        for entry in &ifd.entries {
            writer.write_all(&entry.tag.to_le_bytes())?;
            writer.write_all(&entry.field_type.to_le_bytes())?;

            match is_big_tiff {
                true => writer.write_all(&entry.count.to_le_bytes())?,
                false => writer.write_all(&(entry.count as u32).to_le_bytes())?,
            }

            // Entries pointing at external or strip data get their real offset
            match tag_offsets.get(&(ifd_index, entry.tag)) {
                Some(offset) => writer.write_all(&offset.to_le_bytes()[..width])?,
                None => writer.write_all(&entry.value_bytes[..width])?,
            }
        }

        match is_big_tiff {
            true => writer.write_all(&next_offset.to_le_bytes())?,
            false => writer.write_all(&(next_offset as u32).to_le_bytes())?,
        }

        Ok(())
    }
}
