//! Volume data model
//!
//! This module defines the in-memory 3D scalar volume, its orientation
//! matrix, and the error type shared by the whole crate.

pub mod errors;
pub mod direction;
pub mod types;

pub use direction::Direction;
pub use errors::{VolumeError, VolumeResult};
pub use types::{Sample, Volume};
