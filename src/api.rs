//! Public entry points: load a volume, crop it, write it back
//!
//! Format-level failures are wrapped here so callers see which path
//! failed and why.

use log::{debug, info};

use crate::compression::CompressionKind;
use crate::io::format_strategy::{FormatFactory, WriteOptions};
use crate::volume::errors::{VolumeError, VolumeResult};
use crate::volume::Volume;

pub use crate::extractor::extract;

/// Loads a volume, picking the format from the file extension
///
/// # Arguments
/// * `path` - Path to a `.mha`, `.mhd`, `.tif` or `.tiff` file
///
/// # Returns
/// The fully decoded volume, or `ImageLoad` naming the path and the cause
pub fn read_image(path: &str) -> VolumeResult<Volume> {
    if path.is_empty() {
        return Err(VolumeError::ImageLoad {
            path: String::new(),
            cause: Box::new(VolumeError::GenericError("empty input path".to_string())),
        });
    }

    info!("Reading image {}", path);
    FormatFactory::create_strategy(path)
        .and_then(|format| format.read(path))
        .map_err(|cause| VolumeError::ImageLoad {
            path: path.to_string(),
            cause: Box::new(cause),
        })
}

/// Writes a volume; `None` as destination is a successful no-op
///
/// With `compress` the default codec (Deflate) is used.
pub fn write_image(volume: &Volume, destination: Option<&str>, compress: bool) -> VolumeResult<()> {
    let options = if compress {
        WriteOptions::compressed(CompressionKind::Deflate)
    } else {
        WriteOptions::uncompressed()
    };
    write_image_with_options(volume, destination, &options)
}

/// Writes a volume with an explicit codec choice
///
/// # Arguments
/// * `volume` - Volume to serialise
/// * `destination` - Output path, or None to skip writing
/// * `options` - Codec selection
///
/// # Returns
/// `EmptyRegion` for a volume with a zero-extent axis (no file is created),
/// `ImageWrite` for any other failure
pub fn write_image_with_options(
    volume: &Volume,
    destination: Option<&str>,
    options: &WriteOptions,
) -> VolumeResult<()> {
    let path = match destination {
        Some(path) => path,
        None => {
            info!("No output requested, skipping write");
            return Ok(());
        }
    };

    if let Some(axis) = volume.dimensions().iter().position(|d| *d == 0) {
        return Err(VolumeError::EmptyRegion { axis });
    }

    debug!("Writing {} with {:?}", volume, options);
    FormatFactory::create_strategy(path)
        .and_then(|format| format.write(volume, path, options))
        .map_err(|cause| VolumeError::ImageWrite {
            path: path.to_string(),
            cause: Box::new(cause),
        })?;

    info!("Wrote {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn empty_path_is_a_load_error() {
        assert!(matches!(read_image(""), Err(VolumeError::ImageLoad { .. })));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.mha").to_string_lossy().into_owned();
        match read_image(&path) {
            Err(VolumeError::ImageLoad { path: failed, cause }) => {
                assert_eq!(failed, path);
                assert!(matches!(*cause, VolumeError::IoError(_)));
            }
            other => panic!("unexpected result: {:?}", other.map(|v| v.dimensions())),
        }
    }

    #[test]
    fn unknown_extension_is_a_load_error() {
        let err = read_image("scan.nii").unwrap_err();
        match err {
            VolumeError::ImageLoad { cause, .. } => {
                assert!(matches!(*cause, VolumeError::UnsupportedFormat(_)))
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn no_destination_is_a_no_op() {
        let volume = Volume::from_fn([2, 2, 2], |x, _, _| x as f32).unwrap();
        write_image(&volume, None, true).unwrap();
    }

    #[test]
    fn zero_extent_volume_is_rejected_before_writing() {
        let volume = Volume::new([3, 0, 2], Vec::new()).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.mha").to_string_lossy().into_owned();
        let err = write_image(&volume, Some(&path), false).unwrap_err();
        assert!(matches!(err, VolumeError::EmptyRegion { axis: 1 }));
        assert!(fs::metadata(&path).is_err());
    }

    #[test]
    fn unknown_output_extension_is_a_write_error() {
        let volume = Volume::from_fn([1, 1, 1], |_, _, _| 1.0).unwrap();
        let err = write_image(&volume, Some("out.png"), false).unwrap_err();
        assert!(matches!(err, VolumeError::ImageWrite { .. }));
    }
}
