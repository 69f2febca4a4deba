//! MetaImage (`.mha` / `.mhd`) support
//!
//! Reads any scalar element type into float samples and always writes
//! little-endian `MET_FLOAT`, optionally zlib-compressed.

pub mod keys;
pub mod header;
pub mod reader;
pub mod writer;
mod format;

pub use format::MetaImageFormat;
pub use header::{DataFile, MetaHeader};
pub use reader::MetaImageReader;
pub use writer::MetaImageWriter;
