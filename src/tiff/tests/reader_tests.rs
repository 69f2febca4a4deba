//! Tests for the TIFF directory reader and slice decoding

use std::io::Cursor;

use crate::io::byte_order::ByteOrder;
use crate::io::samples::ElementKind;
use crate::tiff::constants::tags;
use crate::tiff::reader::TiffReader;
use crate::tiff::slice_reader::{SliceLayout, SliceReader};
use crate::volume::errors::VolumeError;

use super::test_utils::{big_endian_u16_stack, little_endian_tiled_f32};

#[test]
fn test_big_endian_short_values_are_decoded_inline() {
    let bytes = big_endian_u16_stack(3, 2, &[vec![1, 2, 3, 4, 5, 6]], None);
    let mut cursor = Cursor::new(bytes);

    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    assert_eq!(tiff.byte_order, ByteOrder::BigEndian);
    assert!(!tiff.is_big_tiff);
    let ifd = tiff.main_ifd().unwrap();
    assert_eq!(ifd.get_dimensions(), Some((3, 2)));
    assert_eq!(ifd.get_tag_value(tags::BITS_PER_SAMPLE), Some(16));

    let layout = SliceLayout::from_ifd(ifd).unwrap();
    assert_eq!(layout.kind, ElementKind::U16);
    assert_eq!(layout.pixel_count(), 6);
}

#[test]
fn test_ifd_chain_and_strip_decoding() {
    let slices = vec![vec![10, 20, 30, 40], vec![50, 60, 70, 65535]];
    let bytes = big_endian_u16_stack(2, 2, &slices, Some("spacing=2.5"));
    let mut cursor = Cursor::new(bytes);

    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    assert_eq!(tiff.ifd_count(), 2);

    let description = reader
        .read_ascii_tag(&mut cursor, &tiff.ifds[0], tags::IMAGE_DESCRIPTION)
        .unwrap();
    assert_eq!(description.as_deref(), Some("spacing=2.5"));
    assert_eq!(reader.read_ascii_tag(&mut cursor, &tiff.ifds[1], tags::IMAGE_DESCRIPTION).unwrap(), None);

    let slice_reader = SliceReader::new(&reader, &mut cursor).unwrap();
    let second = &tiff.ifds[1];
    let layout = SliceLayout::from_ifd(second).unwrap();
    let samples = slice_reader.read_slice(&mut cursor, second, &layout).unwrap();
    assert_eq!(samples, vec![50.0, 60.0, 70.0, 65535.0]);
}

#[test]
fn test_tiles_are_reassembled() {
    let mut cursor = Cursor::new(little_endian_tiled_f32());

    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();
    assert!(ifd.is_tiled());

    let layout = SliceLayout::from_ifd(ifd).unwrap();
    assert_eq!(layout.kind, ElementKind::F32);

    let slice_reader = SliceReader::new(&reader, &mut cursor).unwrap();
    let samples = slice_reader.read_slice(&mut cursor, ifd, &layout).unwrap();
    assert_eq!(samples, vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0, 20.0, 21.0, 22.0]);

    let offsets = reader.read_tag_values(&mut cursor, ifd, tags::TILE_OFFSETS).unwrap();
    assert_eq!(offsets.len(), 4);
}

#[test]
fn test_not_a_tiff() {
    let mut cursor = Cursor::new(b"GIF89a\0\0\0\0".to_vec());
    let mut reader = TiffReader::new();
    assert!(matches!(reader.read(&mut cursor), Err(VolumeError::InvalidHeader(_))));
}

#[test]
fn test_unknown_version() {
    let mut cursor = Cursor::new(vec![0x49, 0x49, 44, 0, 8, 0, 0, 0]);
    let mut reader = TiffReader::new();
    assert!(matches!(reader.read(&mut cursor), Err(VolumeError::UnsupportedFormat(_))));
}

#[test]
fn test_truncated_strip_is_an_error() {
    let mut bytes = big_endian_u16_stack(2, 2, &[vec![1, 2, 3, 4]], None);
    bytes.truncate(bytes.len() - 2);
    let mut cursor = Cursor::new(bytes);

    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();
    let layout = SliceLayout::from_ifd(ifd).unwrap();
    let slice_reader = SliceReader::new(&reader, &mut cursor).unwrap();
    assert!(slice_reader.read_slice(&mut cursor, ifd, &layout).is_err());
}
