//! Bounding-box extraction from 3D volumes
//!
//! This module holds the region type, the extraction routine, and the
//! request that turns command-line input into a region.

mod region;
mod region_extractor;
pub mod request;

pub use region::Region;
pub use region_extractor::extract;
pub use request::{ExtractionRequest, NO_OUTPUT_SENTINEL};
