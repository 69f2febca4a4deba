//! MetaImage reader
//!
//! Loads `.mha` files (header and payload in one file) and `.mhd` files
//! (header pointing at a separate raw data file).

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::compression::{CompressionHandler, DeflateHandler};
use crate::io::samples::decode_samples;
use crate::volume::errors::{VolumeError, VolumeResult};
use crate::volume::Volume;

use super::header::{DataFile, MetaHeader};

/// Reads MetaImage volumes from disk
pub struct MetaImageReader;

impl MetaImageReader {
    pub fn new() -> Self {
        MetaImageReader
    }

    /// Load the volume described by the header at `path`
    pub fn read(&self, path: &str) -> VolumeResult<Volume> {
        info!("Reading MetaImage {}", path);
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let header = MetaHeader::parse(&mut reader)?;

        let stored = match &header.data_file {
            DataFile::Local => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                bytes
            }
            DataFile::External(name) => {
                let data_path = resolve_data_path(path, name);
                debug!("Voxel payload in {}", data_path.display());
                read_external(&data_path, &header)?
            }
        };

        let raw = if header.compressed {
            let payload = match header.compressed_size {
                Some(size) if size <= stored.len() => &stored[..size],
                Some(size) => {
                    return Err(VolumeError::InvalidHeader(format!(
                        "CompressedDataSize {} exceeds the {} payload bytes present",
                        size,
                        stored.len()
                    )))
                }
                None => &stored[..],
            };
            DeflateHandler::new().decompress(payload)?
        } else {
            stored
        };

        let count = header.voxel_count()?;
        let samples = decode_samples(&raw, header.element_kind, header.byte_order, count)?;

        let volume = Volume::new(header.dimensions, samples)?
            .with_spacing(header.spacing)?
            .with_origin(header.origin)
            .with_direction(header.direction);
        info!("Loaded {}", volume);
        Ok(volume)
    }
}

impl Default for MetaImageReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Data file names are relative to the header's directory
fn resolve_data_path(header_path: &str, name: &str) -> PathBuf {
    let candidate = Path::new(name);
    if candidate.is_absolute() {
        return candidate.to_path_buf();
    }
    match Path::new(header_path).parent() {
        Some(dir) => dir.join(candidate),
        None => candidate.to_path_buf(),
    }
}

fn read_external(data_path: &Path, header: &MetaHeader) -> VolumeResult<Vec<u8>> {
    let mut file = File::open(data_path)?;
    match header.header_size {
        Some(-1) => {
            // payload occupies the tail of the file
            let tail = if header.compressed {
                header.compressed_size.ok_or_else(|| {
                    VolumeError::InvalidHeader(
                        "HeaderSize = -1 on compressed data needs CompressedDataSize".to_string(),
                    )
                })?
            } else {
                header
                    .voxel_count()?
                    .checked_mul(header.element_kind.byte_size())
                    .ok_or_else(|| {
                        VolumeError::InvalidHeader(format!("{:?} payload overflows", header.dimensions))
                    })?
            };
            let length = file.metadata()?.len();
            let tail = tail as u64;
            if tail > length {
                return Err(VolumeError::InvalidHeader(format!(
                    "{} holds {} bytes, payload needs {}",
                    data_path.display(),
                    length,
                    tail
                )));
            }
            file.seek(SeekFrom::Start(length - tail))?;
        }
        Some(skip) if skip > 0 => {
            file.seek(SeekFrom::Start(skip as u64))?;
        }
        Some(skip) if skip < 0 => {
            return Err(VolumeError::InvalidHeader(format!("Invalid HeaderSize {}", skip)));
        }
        _ => {}
    }

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}
