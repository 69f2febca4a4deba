//! MetaImage volume format strategy

use crate::io::format_strategy::{VolumeFormat, WriteOptions};
use crate::volume::errors::VolumeResult;
use crate::volume::Volume;

use super::reader::MetaImageReader;
use super::writer::MetaImageWriter;

/// `.mha` / `.mhd` volumes
pub struct MetaImageFormat {
    reader: MetaImageReader,
    writer: MetaImageWriter,
}

impl MetaImageFormat {
    pub fn new() -> Self {
        MetaImageFormat {
            reader: MetaImageReader::new(),
            writer: MetaImageWriter::new(),
        }
    }
}

impl Default for MetaImageFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeFormat for MetaImageFormat {
    fn name(&self) -> &'static str {
        "MetaImage"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["mha", "mhd"]
    }

    fn read(&self, path: &str) -> VolumeResult<Volume> {
        self.reader.read(path)
    }

    fn write(&self, volume: &Volume, path: &str, options: &WriteOptions) -> VolumeResult<()> {
        self.writer.write(volume, path, options)
    }
}
