//! Decoding of one IFD into a plane of samples
//!
//! Handles both strip and tile organisation. Every strip or tile is
//! decompressed with the handler for the IFD's compression code, then the
//! raw elements are converted to float samples in the file's byte order.

use log::{debug, trace};

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::io::byte_order::ByteOrder;
use crate::io::samples::{decode_samples, ElementKind};
use crate::io::seekable::{read_bytes_at, SeekableReader};
use crate::tiff::constants::{planar_config, predictor, sample_format, tags};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::tiff::validation;
use crate::utils::tag_utils;
use crate::volume::errors::{VolumeError, VolumeResult};
use crate::volume::Sample;

/// Pixel layout of one slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceLayout {
    pub width: usize,
    pub height: usize,
    pub kind: ElementKind,
    pub compression: u64,
}

impl SliceLayout {
    /// Reads and validates the layout tags of an IFD
    pub fn from_ifd(ifd: &IFD) -> VolumeResult<Self> {
        let (width, height) = ifd.get_dimensions().ok_or_else(|| {
            VolumeError::InvalidHeader(format!("IFD #{} has no image dimensions", ifd.number))
        })?;
        if width == 0 || height == 0 {
            return Err(VolumeError::InvalidHeader(format!(
                "IFD #{} has an empty {}x{} image",
                ifd.number, width, height
            )));
        }

        let samples = ifd.get_samples_per_pixel();
        if samples != 1 {
            return Err(VolumeError::UnsupportedSampleType(format!(
                "{} samples per pixel, only scalar slices are supported",
                samples
            )));
        }

        let planar = ifd.get_tag_value(tags::PLANAR_CONFIGURATION).unwrap_or(planar_config::CHUNKY as u64);
        if planar != planar_config::CHUNKY as u64 {
            return Err(VolumeError::UnsupportedFormat(format!("planar configuration {}", planar)));
        }

        let predictor_code = ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64);
        if predictor_code != predictor::NONE as u64 {
            return Err(VolumeError::UnsupportedFormat(format!("TIFF predictor {}", predictor_code)));
        }

        let bits = ifd.get_tag_value(tags::BITS_PER_SAMPLE).unwrap_or(1);
        let format = ifd.get_tag_value(tags::SAMPLE_FORMAT).unwrap_or(sample_format::UNSIGNED as u64);
        let kind = element_kind(bits, format)?;

        let compression = ifd.get_tag_value(tags::COMPRESSION).unwrap_or(1);

        Ok(SliceLayout {
            width: width as usize,
            height: height as usize,
            kind,
            compression,
        })
    }

    /// Samples in one slice
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// Element kind for a BitsPerSample / SampleFormat pair
pub fn element_kind(bits: u64, format: u64) -> VolumeResult<ElementKind> {
    match (bits, format as u16) {
        (8, sample_format::UNSIGNED) => Ok(ElementKind::U8),
        (8, sample_format::SIGNED) => Ok(ElementKind::I8),
        (16, sample_format::UNSIGNED) => Ok(ElementKind::U16),
        (16, sample_format::SIGNED) => Ok(ElementKind::I16),
        (32, sample_format::UNSIGNED) => Ok(ElementKind::U32),
        (32, sample_format::SIGNED) => Ok(ElementKind::I32),
        (32, sample_format::IEEEFP) => Ok(ElementKind::F32),
        (64, sample_format::IEEEFP) => Ok(ElementKind::F64),
        _ => Err(VolumeError::UnsupportedSampleType(format!(
            "{}-bit samples with sample format {}",
            bits, format
        ))),
    }
}

/// Reads slices of one TIFF file
pub struct SliceReader<'a> {
    tiff_reader: &'a TiffReader,
    byte_order: ByteOrder,
    file_size: u64,
}

impl<'a> SliceReader<'a> {
    pub fn new(tiff_reader: &'a TiffReader, reader: &mut dyn SeekableReader) -> VolumeResult<Self> {
        let byte_order = tiff_reader
            .byte_order()
            .ok_or_else(|| VolumeError::GenericError("TIFF header not read".to_string()))?;
        let file_size = validation::get_file_size(reader)?;
        Ok(SliceReader { tiff_reader, byte_order, file_size })
    }

    /// Decodes the full plane described by `ifd`
    pub fn read_slice(
        &self,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        layout: &SliceLayout,
    ) -> VolumeResult<Vec<Sample>> {
        let handler = CompressionFactory::create_handler(layout.compression)?;
        trace!(
            "Slice {}: {}x{} {:?}, {}",
            ifd.number,
            layout.width,
            layout.height,
            layout.kind,
            tag_utils::get_compression_name(layout.compression)
        );

        if ifd.is_tiled() {
            self.read_tiles(reader, ifd, layout, handler.as_ref())
        } else {
            self.read_strips(reader, ifd, layout, handler.as_ref())
        }
    }

    fn read_strips(
        &self,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        layout: &SliceLayout,
        handler: &dyn CompressionHandler,
    ) -> VolumeResult<Vec<Sample>> {
        let rows_per_strip = ifd
            .get_tag_value(tags::ROWS_PER_STRIP)
            .map(|rows| (rows as usize).clamp(1, layout.height))
            .unwrap_or(layout.height);
        let offsets = self.tiff_reader.read_tag_values(reader, ifd, tags::STRIP_OFFSETS)?;
        let byte_counts = self.tiff_reader.read_tag_values(reader, ifd, tags::STRIP_BYTE_COUNTS)?;

        let strip_count = layout.height.div_ceil(rows_per_strip);
        if offsets.len() < strip_count || byte_counts.len() < strip_count {
            return Err(VolumeError::InvalidHeader(format!(
                "IFD #{} lists {} strips, {} rows at {} per strip need {}",
                ifd.number,
                offsets.len().min(byte_counts.len()),
                layout.height,
                rows_per_strip,
                strip_count
            )));
        }
        debug!("IFD #{}: {} strips of {} rows", ifd.number, strip_count, rows_per_strip);

        let row_bytes = layout.width * layout.kind.byte_size();
        let mut bytes = Vec::with_capacity(row_bytes * layout.height);
        for strip in 0..strip_count {
            let rows = rows_per_strip.min(layout.height - strip * rows_per_strip);
            let data = self.read_block(reader, offsets[strip], byte_counts[strip], handler)?;
            let needed = rows * row_bytes;
            if data.len() < needed {
                return Err(VolumeError::InvalidHeader(format!(
                    "Strip {} of IFD #{} decodes to {} bytes, expected {}",
                    strip,
                    ifd.number,
                    data.len(),
                    needed
                )));
            }
            bytes.extend_from_slice(&data[..needed]);
        }

        decode_samples(&bytes, layout.kind, self.byte_order, layout.pixel_count())
    }

    fn read_tiles(
        &self,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        layout: &SliceLayout,
        handler: &dyn CompressionHandler,
    ) -> VolumeResult<Vec<Sample>> {
        let tile_width = ifd.get_tag_value(tags::TILE_WIDTH).unwrap_or(0) as usize;
        let tile_length = ifd.get_tag_value(tags::TILE_LENGTH).unwrap_or(0) as usize;
        if tile_width == 0 || tile_length == 0 {
            return Err(VolumeError::InvalidHeader(format!(
                "IFD #{} is tiled without a tile size",
                ifd.number
            )));
        }

        let offsets = self.tiff_reader.read_tag_values(reader, ifd, tags::TILE_OFFSETS)?;
        let byte_counts = self.tiff_reader.read_tag_values(reader, ifd, tags::TILE_BYTE_COUNTS)?;

        let tiles_across = layout.width.div_ceil(tile_width);
        let tiles_down = layout.height.div_ceil(tile_length);
        let tile_count = tiles_across * tiles_down;
        if offsets.len() < tile_count || byte_counts.len() < tile_count {
            return Err(VolumeError::InvalidHeader(format!(
                "IFD #{} lists {} tiles, expected {}",
                ifd.number,
                offsets.len().min(byte_counts.len()),
                tile_count
            )));
        }
        debug!("IFD #{}: {}x{} tiles of {}x{}", ifd.number, tiles_across, tiles_down, tile_width, tile_length);

        let tile_pixels = tile_width * tile_length;
        let mut samples = vec![0.0 as Sample; layout.pixel_count()];
        for tile_y in 0..tiles_down {
            for tile_x in 0..tiles_across {
                let tile = tile_y * tiles_across + tile_x;
                let data = self.read_block(reader, offsets[tile], byte_counts[tile], handler)?;
                let tile_samples = decode_samples(&data, layout.kind, self.byte_order, tile_pixels)?;

                let x0 = tile_x * tile_width;
                let y0 = tile_y * tile_length;
                let copy_width = tile_width.min(layout.width - x0);
                let copy_rows = tile_length.min(layout.height - y0);
                for row in 0..copy_rows {
                    let src = row * tile_width;
                    let dst = (y0 + row) * layout.width + x0;
                    samples[dst..dst + copy_width].copy_from_slice(&tile_samples[src..src + copy_width]);
                }
            }
        }

        Ok(samples)
    }

    /// Reads and decompresses one strip or tile
    fn read_block(
        &self,
        reader: &mut dyn SeekableReader,
        offset: u64,
        byte_count: u64,
        handler: &dyn CompressionHandler,
    ) -> VolumeResult<Vec<u8>> {
        validation::validate_data_range(offset, byte_count, self.file_size, "Image block")?;
        let compressed = read_bytes_at(reader, offset, byte_count)?;
        handler.decompress(&compressed)
    }
}
