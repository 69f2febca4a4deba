//! Volume format strategy definitions
//!
//! This module defines the strategy pattern for the on-disk volume formats,
//! and the factory that picks a strategy from a file extension.

use std::path::Path;
use log::{debug, error, info};

use crate::compression::CompressionKind;
use crate::metaimage::MetaImageFormat;
use crate::tiff::TiffVolumeFormat;
use crate::volume::errors::{VolumeError, VolumeResult};
use crate::volume::Volume;

/// Options applied when a volume is serialised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Codec for the voxel payload
    pub compression: CompressionKind,
}

impl WriteOptions {
    pub fn uncompressed() -> Self {
        WriteOptions { compression: CompressionKind::None }
    }

    pub fn compressed(compression: CompressionKind) -> Self {
        WriteOptions { compression }
    }

    pub fn is_compressed(&self) -> bool {
        self.compression != CompressionKind::None
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions::uncompressed()
    }
}

/// Strategy for reading and writing one volume file format
pub trait VolumeFormat {
    /// Human-readable format name
    fn name(&self) -> &'static str;

    /// Lower-case file extensions handled by this format
    fn extensions(&self) -> &'static [&'static str];

    /// Load a complete volume; never returns a partially decoded volume
    fn read(&self, path: &str) -> VolumeResult<Volume>;

    /// Serialise a volume, creating or overwriting `path`
    fn write(&self, volume: &Volume, path: &str, options: &WriteOptions) -> VolumeResult<()>;

    /// Check if this strategy handles the given file
    fn supports_format(&self, file_path: &str) -> bool {
        let extension = file_extension(file_path);
        self.extensions().contains(&extension.as_str())
    }
}

/// Lower-case extension of a path, empty when there is none
pub fn file_extension(file_path: &str) -> String {
    Path::new(file_path)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("")
        .to_lowercase()
}

/// Factory for creating format strategies
pub struct FormatFactory;

impl FormatFactory {
    /// All known format strategies
    pub fn available_formats() -> Vec<Box<dyn VolumeFormat>> {
        vec![Box::new(MetaImageFormat::new()), Box::new(TiffVolumeFormat::new())]
    }

    /// Create an appropriate strategy for the given file path
    pub fn create_strategy(file_path: &str) -> VolumeResult<Box<dyn VolumeFormat>> {
        debug!("Determining format for {}", file_path);

        match Self::available_formats()
            .into_iter()
            .find(|format| format.supports_format(file_path))
        {
            Some(format) => {
                info!("Using {} format for {}", format.name(), file_path);
                Ok(format)
            }
            None => {
                let extension = file_extension(file_path);
                error!("Unsupported file format: '{}' ({})", extension, file_path);
                Err(VolumeError::UnsupportedFormat(format!(
                    "no reader/writer for extension '{}' ({})",
                    extension, file_path
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_format_by_extension() {
        assert_eq!(FormatFactory::create_strategy("a/b/scan.MHA").unwrap().name(), "MetaImage");
        assert_eq!(FormatFactory::create_strategy("scan.mhd").unwrap().name(), "MetaImage");
        assert_eq!(FormatFactory::create_strategy("stack.tif").unwrap().name(), "TIFF");
        assert_eq!(FormatFactory::create_strategy("stack.tiff").unwrap().name(), "TIFF");
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        assert!(matches!(
            FormatFactory::create_strategy("scan.nii"),
            Err(VolumeError::UnsupportedFormat(_))
        ));
        assert!(FormatFactory::create_strategy("no_extension").is_err());
    }

    #[test]
    fn write_options_report_compression() {
        assert!(!WriteOptions::default().is_compressed());
        assert!(WriteOptions::compressed(CompressionKind::Deflate).is_compressed());
        assert!(!WriteOptions::compressed(CompressionKind::None).is_compressed());
    }
}
