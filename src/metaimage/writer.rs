//! MetaImage writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, info};

use crate::compression::{CompressionHandler, CompressionKind, DeflateHandler};
use crate::io::format_strategy::{file_extension, WriteOptions};
use crate::io::samples::encode_samples_le;
use crate::volume::errors::{VolumeError, VolumeResult};
use crate::volume::Volume;

use super::header::{DataFile, MetaHeader};

/// Writes volumes as little-endian MET_FLOAT MetaImages
pub struct MetaImageWriter;

impl MetaImageWriter {
    pub fn new() -> Self {
        MetaImageWriter
    }

    /// Write `volume` to `path`
    ///
    /// `.mha` keeps the payload after the header. `.mhd` places it in a
    /// sibling `<stem>.raw` (or `<stem>.zraw` when compressed).
    pub fn write(&self, volume: &Volume, path: &str, options: &WriteOptions) -> VolumeResult<()> {
        let compressed = match options.compression {
            CompressionKind::None => false,
            CompressionKind::Deflate => true,
            other => return Err(VolumeError::UnsupportedCompression(other.handler().code())),
        };

        let raw = encode_samples_le(volume.data())?;
        let payload = if compressed {
            DeflateHandler::new().compress(&raw)?
        } else {
            raw
        };

        let detached = file_extension(path) == "mhd";
        let data_file = if detached {
            DataFile::External(data_file_name(path, compressed)?)
        } else {
            DataFile::Local
        };

        let mut header = MetaHeader::for_volume(volume, compressed, data_file.clone());
        if compressed {
            header.compressed_size = Some(payload.len());
        }

        info!(
            "Writing MetaImage {} ({} payload bytes, compressed={})",
            path,
            payload.len(),
            compressed
        );

        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(header.render().as_bytes())?;
        match data_file {
            DataFile::Local => writer.write_all(&payload)?,
            DataFile::External(name) => {
                let data_path = match Path::new(path).parent() {
                    Some(dir) => dir.join(&name),
                    None => Path::new(&name).to_path_buf(),
                };
                debug!("Writing voxel payload to {}", data_path.display());
                let mut data_writer = BufWriter::new(File::create(&data_path)?);
                data_writer.write_all(&payload)?;
                data_writer.flush()?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for MetaImageWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn data_file_name(header_path: &str, compressed: bool) -> VolumeResult<String> {
    let stem = Path::new(header_path)
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(|| VolumeError::GenericError(format!("No file name in '{}'", header_path)))?;
    let extension = if compressed { "zraw" } else { "raw" };
    Ok(format!("{}.{}", stem, extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metaimage::reader::MetaImageReader;
    use crate::volume::Direction;
    use tempfile::{tempdir, TempDir};

    /// Path of `name` inside a fresh directory that is removed on drop
    fn temp_path(name: &str) -> (TempDir, String) {
        let dir = tempdir().unwrap();
        let path = dir.path().join(name).to_string_lossy().into_owned();
        (dir, path)
    }

    fn sample_volume() -> Volume {
        Volume::from_fn([3, 2, 2], |x, y, z| (x + 10 * y + 100 * z) as f32)
            .unwrap()
            .with_spacing([0.5, 1.0, 2.5])
            .unwrap()
            .with_origin([1.0, 2.0, 3.0])
            .with_direction(Direction::from_row_major(&[0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]))
    }

    #[test]
    fn compressed_mha_reads_back() {
        let (_dir, path) = temp_path("roundtrip.mha");
        let volume = sample_volume();
        MetaImageWriter::new()
            .write(&volume, &path, &WriteOptions::compressed(CompressionKind::Deflate))
            .unwrap();

        let text = std::fs::read(&path).unwrap();
        assert!(text.starts_with(b"ObjectType = Image\n"));
        assert_eq!(MetaImageReader::new().read(&path).unwrap(), volume);
    }

    #[test]
    fn mhd_payload_goes_to_sibling_file() {
        let (_dir, path) = temp_path("detached.mhd");
        let volume = sample_volume();
        MetaImageWriter::new().write(&volume, &path, &WriteOptions::uncompressed()).unwrap();

        let raw_path = path.replace(".mhd", ".raw");
        assert_eq!(std::fs::metadata(&raw_path).unwrap().len(), 12 * 4);
        assert_eq!(MetaImageReader::new().read(&path).unwrap(), volume);
    }

    #[test]
    fn zstd_is_not_a_metaimage_codec() {
        let (_dir, path) = temp_path("zstd.mha");
        let err = MetaImageWriter::new()
            .write(&sample_volume(), &path, &WriteOptions::compressed(CompressionKind::Zstd))
            .unwrap_err();
        assert!(matches!(err, VolumeError::UnsupportedCompression(50000)));
        assert!(!Path::new(&path).exists());
    }
}
