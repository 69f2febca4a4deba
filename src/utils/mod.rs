//! Utility modules for common functionality
//!
//! Logging, progress reporting and the low-level TIFF helpers shared by
//! the reader and the writer.

pub mod logger;
pub(crate) mod progress;
pub(crate) mod write_utils;
pub(crate) mod ifd_utils;
pub(crate) mod string_utils;
pub(crate) mod format_utils;
pub(crate) mod tag_utils;
