//! Error types for volume loading, extraction and writing

use std::error::Error;
use std::fmt;
use std::io;

/// Errors raised anywhere in the load → extract → write pipeline
#[derive(Debug)]
pub enum VolumeError {
    /// I/O error
    IoError(io::Error),
    /// Malformed or missing command-line input
    ArgumentParse {
        argument: String,
        message: String,
    },
    /// The source volume could not be read or decoded
    ImageLoad {
        path: String,
        cause: Box<VolumeError>,
    },
    /// Requested index + size exceeds the volume on some axis
    RegionOutOfBounds {
        axis: usize,
        index: usize,
        size: usize,
        dimension: usize,
    },
    /// A zero-extent axis that the target representation cannot hold
    EmptyRegion { axis: usize },
    /// The destination could not be written
    ImageWrite {
        path: String,
        cause: Box<VolumeError>,
    },
    /// File extension or layout not handled by any format strategy
    UnsupportedFormat(String),
    /// Unsupported compression method
    UnsupportedCompression(u64),
    /// Stored element type that cannot be converted to the pipeline sample type
    UnsupportedSampleType(String),
    /// Header present but inconsistent or incomplete
    InvalidHeader(String),
    /// Generic error with message
    GenericError(String),
}

const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];

fn axis_name(axis: usize) -> &'static str {
    AXIS_NAMES.get(axis).copied().unwrap_or("?")
}

impl fmt::Display for VolumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeError::IoError(e) => write!(f, "I/O error: {}", e),
            VolumeError::ArgumentParse { argument, message } => {
                write!(f, "Invalid argument '{}': {}", argument, message)
            }
            VolumeError::ImageLoad { path, cause } => {
                write!(f, "Failed to load image '{}': {}", path, cause)
            }
            VolumeError::RegionOutOfBounds { axis, index, size, dimension } => write!(
                f,
                "Region out of bounds on axis {} ({}): index {} + size {} = {} exceeds dimension {}",
                axis,
                axis_name(*axis),
                index,
                size,
                index.saturating_add(*size),
                dimension
            ),
            VolumeError::EmptyRegion { axis } => write!(
                f,
                "Empty region: axis {} ({}) has zero extent, which the output format cannot represent",
                axis,
                axis_name(*axis)
            ),
            VolumeError::ImageWrite { path, cause } => {
                write!(f, "Failed to write image '{}': {}", path, cause)
            }
            VolumeError::UnsupportedFormat(what) => write!(f, "Unsupported file format: {}", what),
            VolumeError::UnsupportedCompression(c) => {
                write!(f, "Unsupported compression method: {}", c)
            }
            VolumeError::UnsupportedSampleType(t) => write!(f, "Unsupported sample type: {}", t),
            VolumeError::InvalidHeader(msg) => write!(f, "Invalid header: {}", msg),
            VolumeError::GenericError(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for VolumeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            VolumeError::IoError(e) => Some(e),
            VolumeError::ImageLoad { cause, .. } | VolumeError::ImageWrite { cause, .. } => {
                Some(cause.as_ref())
            }
            _ => None,
        }
    }
}

impl From<io::Error> for VolumeError {
    fn from(error: io::Error) -> Self {
        VolumeError::IoError(error)
    }
}

impl From<String> for VolumeError {
    fn from(msg: String) -> Self {
        VolumeError::GenericError(msg)
    }
}

/// Result type for volume operations
pub type VolumeResult<T> = Result<T, VolumeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_message_names_axis_and_extent() {
        let err = VolumeError::RegionOutOfBounds { axis: 0, index: 8, size: 4, dimension: 10 };
        let msg = err.to_string();
        assert!(msg.contains("axis 0 (x)"));
        assert!(msg.contains("8 + size 4 = 12"));
        assert!(msg.contains("dimension 10"));
    }

    #[test]
    fn load_error_exposes_cause() {
        let err = VolumeError::ImageLoad {
            path: "missing.mha".to_string(),
            cause: Box::new(VolumeError::IoError(io::Error::new(io::ErrorKind::NotFound, "gone"))),
        };
        assert!(err.to_string().starts_with("Failed to load image 'missing.mha'"));
        assert!(err.source().is_some());
    }
}
