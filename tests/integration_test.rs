//! End-to-end tests for load, extract and write

use std::fs;

use tempfile::tempdir;
use volcrop::{
    extract, read_image, write_image, write_image_with_options, CompressionKind, Direction, Region, Volume,
    VolumeError, WriteOptions,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 10x10x10 volume whose voxel value encodes its index
fn cube() -> Volume {
    Volume::from_fn([10, 10, 10], |x, y, z| (x + 10 * y + 100 * z) as f32).unwrap()
}

#[test]
fn crops_the_reference_box() {
    init_logging();
    let source = cube();
    let cropped = extract(&source, &Region::new([2, 3, 4], [4, 4, 4])).unwrap();

    assert_eq!(cropped.dimensions(), [4, 4, 4]);
    assert_eq!(cropped.origin(), [2.0, 3.0, 4.0]);
    assert_eq!(cropped.spacing(), [1.0, 1.0, 1.0]);
    assert_eq!(cropped.voxel(0, 0, 0), source.voxel(2, 3, 4));
    assert_eq!(cropped.voxel(3, 3, 3), source.voxel(5, 6, 7));
}

#[test]
fn identity_crop_reproduces_the_volume() {
    let source = cube()
        .with_spacing([0.5, 0.25, 2.0])
        .unwrap()
        .with_origin([-4.0, 1.5, 8.0]);
    let cropped = extract(&source, &Region::full(source.dimensions())).unwrap();
    assert_eq!(cropped, source);
}

#[test]
fn origin_follows_spacing_and_direction() {
    let flip = Direction::from_row_major(&[-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    let source = cube()
        .with_spacing([2.0, 0.5, 1.0])
        .unwrap()
        .with_origin([10.0, 0.0, -1.0])
        .with_direction(flip);

    let cropped = extract(&source, &Region::new([3, 4, 1], [2, 2, 2])).unwrap();
    assert_eq!(cropped.origin(), [4.0, 2.0, 0.0]);
    assert_eq!(*cropped.direction(), flip);
    assert_eq!(cropped.spacing(), [2.0, 0.5, 1.0]);
}

#[test]
fn out_of_bounds_box_writes_nothing() {
    init_logging();
    let source = cube();
    let dir = tempdir().unwrap();
    let output = dir.path().join("never.mha");

    let err = extract(&source, &Region::new([8, 0, 0], [4, 4, 4]))
        .and_then(|cropped| write_image(&cropped, output.to_str(), false))
        .unwrap_err();

    match err {
        VolumeError::RegionOutOfBounds { axis, index, size, dimension } => {
            assert_eq!((axis, index, size, dimension), (0, 8, 4, 10));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!output.exists());
}

#[test]
fn overflowing_box_is_out_of_bounds() {
    let source = cube();
    let err = extract(&source, &Region::new([0, usize::MAX, 0], [1, 2, 1])).unwrap_err();
    assert!(matches!(err, VolumeError::RegionOutOfBounds { axis: 1, .. }));
}

#[test]
fn zero_extent_crop_cannot_be_written() {
    init_logging();
    let source = cube();
    let cropped = extract(&source, &Region::new([3, 3, 3], [0, 4, 4])).unwrap();
    assert_eq!(cropped.dimensions(), [0, 4, 4]);
    assert!(cropped.data().is_empty());

    let dir = tempdir().unwrap();
    let output = dir.path().join("empty.tif");
    let err = write_image(&cropped, output.to_str(), false).unwrap_err();
    assert!(matches!(err, VolumeError::EmptyRegion { axis: 0 }));
    assert!(!output.exists());

    write_image(&cropped, None, false).unwrap();
}

fn assert_round_trip(name: &str, options: WriteOptions) {
    init_logging();
    let source = cube()
        .with_spacing([0.5, 0.75, 3.0])
        .unwrap()
        .with_origin([-12.0, 4.25, 100.0]);
    let cropped = extract(&source, &Region::new([1, 2, 3], [5, 4, 3])).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join(name);
    let path_str = path.to_string_lossy().into_owned();
    write_image_with_options(&cropped, Some(&path_str), &options).unwrap();
    let loaded = read_image(&path_str).unwrap();

    assert_eq!(loaded.dimensions(), cropped.dimensions());
    assert_eq!(loaded.spacing(), cropped.spacing());
    assert_eq!(loaded.origin(), cropped.origin());
    assert_eq!(loaded.direction(), cropped.direction());
    assert_eq!(loaded.data(), cropped.data());
}

#[test]
fn metaimage_round_trip() {
    assert_round_trip("plain.mha", WriteOptions::uncompressed());
}

#[test]
fn compressed_metaimage_round_trip() {
    assert_round_trip("packed.mha", WriteOptions::compressed(CompressionKind::Deflate));
}

#[test]
fn tiff_round_trip() {
    assert_round_trip("plain.tif", WriteOptions::uncompressed());
}

#[test]
fn deflate_tiff_round_trip() {
    assert_round_trip("deflate.tiff", WriteOptions::compressed(CompressionKind::Deflate));
}

#[test]
fn zstd_tiff_round_trip() {
    assert_round_trip("zstd.tif", WriteOptions::compressed(CompressionKind::Zstd));
}

#[test]
fn converts_between_formats() {
    init_logging();
    let dir = tempdir().unwrap();
    let input = dir.path().join("source.mha");
    let output = dir.path().join("converted.tif");
    let source = cube().with_origin([1.0, 2.0, 3.0]);
    write_image(&source, input.to_str(), true).unwrap();

    let loaded = read_image(&input.to_string_lossy()).unwrap();
    let cropped = extract(&loaded, &Region::new([0, 0, 5], [10, 10, 5])).unwrap();
    write_image(&cropped, output.to_str(), true).unwrap();

    let reloaded = read_image(&output.to_string_lossy()).unwrap();
    assert_eq!(reloaded.origin(), [1.0, 2.0, 8.0]);
    assert_eq!(reloaded.voxel(9, 9, 4), source.voxel(9, 9, 9));
}

#[test]
fn integer_metaimage_loads_as_float() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ushort.mha");
    let mut contents = b"ObjectType = Image\nNDims = 3\nDimSize = 2 2 1\nElementType = MET_USHORT\nElementDataFile = LOCAL\n".to_vec();
    for value in [0u16, 1, 65535, 300] {
        contents.extend_from_slice(&value.to_le_bytes());
    }
    fs::write(&path, contents).unwrap();

    let volume = read_image(&path.to_string_lossy()).unwrap();
    assert_eq!(volume.data(), &[0.0, 1.0, 65535.0, 300.0]);
}

#[test]
fn load_failure_names_the_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.tif");
    let path_str = path.to_string_lossy().into_owned();
    let err = read_image(&path_str).unwrap_err();
    assert!(err.to_string().contains(&path_str));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn overflowing_metaimage_dimensions_fail_to_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("huge.mha");
    fs::write(
        &path,
        b"ObjectType = Image\nNDims = 3\nDimSize = 4294967296 4294967296 2\nElementType = MET_UCHAR\nElementDataFile = LOCAL\n\0\0\0\0",
    )
    .unwrap();

    match read_image(&path.to_string_lossy()) {
        Err(VolumeError::ImageLoad { cause, .. }) => assert!(matches!(*cause, VolumeError::InvalidHeader(_))),
        other => panic!("unexpected result: {:?}", other.map(|v| v.dimensions())),
    }
}
