//! Tests for writing and reading whole volume stacks

use crate::compression::CompressionKind;
use crate::io::format_strategy::{VolumeFormat, WriteOptions};
use crate::tiff::builder::TiffBuilder;
use crate::tiff::description::VolumeDescription;
use crate::tiff::format::TiffVolumeFormat;
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::tiff::constants::tags;
use crate::volume::errors::VolumeError;
use crate::volume::{Direction, Volume};

use super::test_utils::{big_endian_u16_stack, temp_path, write_temp_file};

fn sample_volume() -> Volume {
    Volume::from_fn([4, 3, 5], |x, y, z| x as f32 * 0.5 - (y * 7) as f32 + (z * 100) as f32)
        .unwrap()
        .with_spacing([0.25, 0.5, 3.0])
        .unwrap()
        .with_origin([-1.5, 2.0, 40.125])
        .with_direction(Direction::from_row_major(&[0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0]))
}

fn round_trip(name: &str, options: WriteOptions) {
    let (_dir, path) = temp_path(name);
    let volume = sample_volume();
    let format = TiffVolumeFormat::new();

    format.write(&volume, &path, &options).unwrap();
    let loaded = format.read(&path).unwrap();
    assert_eq!(loaded, volume);
}

#[test]
fn test_uncompressed_round_trip() {
    round_trip("plain.tif", WriteOptions::uncompressed());
}

#[test]
fn test_deflate_round_trip() {
    round_trip("deflate.tif", WriteOptions::compressed(CompressionKind::Deflate));
}

#[test]
fn test_zstd_round_trip() {
    round_trip("zstd.tiff", WriteOptions::compressed(CompressionKind::Zstd));
}

#[test]
fn test_written_file_layout() {
    let (_dir, path) = temp_path("layout.tif");
    TiffVolumeFormat::new()
        .write(&sample_volume(), &path, &WriteOptions::compressed(CompressionKind::Deflate))
        .unwrap();

    let mut reader = TiffReader::new();
    let tiff = reader.load(&path).unwrap();
    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.slices().len(), 5);

    let first = tiff.main_ifd().unwrap();
    assert_eq!(first.get_tag_value(tags::SAMPLE_FORMAT), Some(3));
    assert_eq!(first.get_tag_value(tags::BITS_PER_SAMPLE), Some(32));
    assert_eq!(first.get_tag_value(tags::COMPRESSION), Some(8));
    assert!(tiff.ifds[1].get_entry(tags::IMAGE_DESCRIPTION).is_none());

    let mut file = reader.create_reader().unwrap();
    let text = reader.read_ascii_tag(&mut file, first, tags::IMAGE_DESCRIPTION).unwrap().unwrap();
    let description = VolumeDescription::parse(&text);
    assert_eq!(description.slices, Some(5));
    assert_eq!(description.spacing, [0.25, 0.5, 3.0]);
}

#[test]
fn test_big_tiff_round_trip() {
    let (_dir, path) = temp_path("big.tif");
    let mut builder = TiffBuilder::new(false);
    let index = builder.add_ifd(IFD::new(0, 0));
    builder.add_float_slice_tags(index, 2, 1, 1).unwrap();
    builder
        .add_ascii_tag(index, tags::IMAGE_DESCRIPTION, "volcrop=test\nslices=1\nspacing=1 2 3")
        .unwrap();
    let mut strip = Vec::new();
    strip.extend_from_slice(&1.5f32.to_le_bytes());
    strip.extend_from_slice(&(-4.0f32).to_le_bytes());
    builder.setup_single_strip(index, strip).unwrap();

    let classic_size = builder.file_size();
    builder.promote_to_big_tiff();
    assert!(builder.is_big_tiff());
    assert!(builder.file_size() > classic_size);
    builder.write(&path).unwrap();

    let volume = TiffVolumeFormat::new().read(&path).unwrap();
    assert_eq!(volume.dimensions(), [2, 1, 1]);
    assert_eq!(volume.spacing(), [1.0, 2.0, 3.0]);
    assert_eq!(volume.data(), &[1.5, -4.0]);
}

#[test]
fn test_foreign_stack_with_single_spacing() {
    let slices = vec![vec![1, 2, 3, 4, 5, 6], vec![7, 8, 9, 10, 11, 12]];
    let bytes = big_endian_u16_stack(3, 2, &slices, Some("ImageJ=1.54f\nimages=2\nslices=2\nspacing=4.5\nunit=micron"));
    let (_dir, path) = write_temp_file("imagej.tif", &bytes);

    let volume = TiffVolumeFormat::new().read(&path).unwrap();
    assert_eq!(volume.dimensions(), [3, 2, 2]);
    assert_eq!(volume.spacing(), [1.0, 1.0, 4.5]);
    assert_eq!(volume.voxel(2, 1, 1), Some(12.0));
    assert!(volume.direction().is_identity());
}

#[test]
fn test_slice_count_mismatch_is_rejected() {
    let bytes = big_endian_u16_stack(1, 1, &[vec![1]], Some("volcrop=0.1.0\nslices=3"));
    let (_dir, path) = write_temp_file("mismatch.tif", &bytes);

    let err = TiffVolumeFormat::new().read(&path).unwrap_err();
    assert!(matches!(err, VolumeError::InvalidHeader(_)));
}

#[test]
fn test_short_ascii_moves_inline_on_promotion() {
    let (_dir, path) = temp_path("software.tif");
    let mut builder = TiffBuilder::new(false);
    let index = builder.add_ifd(IFD::new(0, 0));
    builder.add_float_slice_tags(index, 1, 1, 1).unwrap();
    // six bytes with the NUL: external in classic TIFF, inline in BigTIFF
    builder.add_ascii_tag(index, tags::SOFTWARE, "abcde").unwrap();
    builder.setup_single_strip(index, 2.0f32.to_le_bytes().to_vec()).unwrap();

    builder.promote_to_big_tiff();
    builder.write(&path).unwrap();

    let mut reader = TiffReader::new();
    let tiff = reader.load(&path).unwrap();
    assert!(tiff.is_big_tiff);
    let mut file = reader.create_reader().unwrap();
    let software = reader.read_ascii_tag(&mut file, tiff.main_ifd().unwrap(), tags::SOFTWARE).unwrap();
    assert_eq!(software.as_deref(), Some("abcde"));
}
